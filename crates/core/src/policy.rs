//! Role-based authorization policy.
//!
//! Every API operation is listed in [`Operation`]; [`allowed`] is the single
//! table deciding which roles may perform it. Handlers never branch on roles
//! themselves.

use crate::types::Role;

/// An operation exposed by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Read the caller's own profile.
    ViewProfile,
    /// Change the caller's own password.
    UpdatePassword,
    /// List and filter all accounts.
    ListUsers,
    /// Read system-wide counts.
    ViewAdminDashboard,
    /// Read any account.
    ViewUser,
    /// Create an account with any role.
    CreateUser,
    /// Edit any account.
    UpdateUser,
    /// Delete any account.
    DeleteUser,
    /// Browse stores.
    ListStores,
    /// Read one store with its ratings.
    ViewStore,
    /// Read aggregated ratings for the caller's own stores.
    ViewOwnerDashboard,
    /// Register a store.
    CreateStore,
    /// Edit a store.
    UpdateStore,
    /// Remove a store.
    DeleteStore,
    /// Create or overwrite the caller's rating of a store.
    SubmitRating,
    /// Read the caller's rating of a store.
    ViewOwnRating,
    /// Remove a rating. Open to every role so a missing rating is reported
    /// as such; the ledger then allows only the author or an admin.
    DeleteRating,
}

impl Operation {
    /// Message returned with a 403 when [`allowed`] says no.
    #[must_use]
    pub const fn denial_message(self) -> &'static str {
        match self {
            Self::ViewOwnerDashboard => "Store owner access required",
            Self::SubmitRating | Self::ViewOwnRating => "User access required",
            Self::ViewProfile
            | Self::UpdatePassword
            | Self::ListStores
            | Self::ViewStore
            | Self::DeleteRating => "Access denied",
            Self::ListUsers
            | Self::ViewAdminDashboard
            | Self::ViewUser
            | Self::CreateUser
            | Self::UpdateUser
            | Self::DeleteUser
            | Self::CreateStore
            | Self::UpdateStore
            | Self::DeleteStore => "Admin access required",
        }
    }
}

/// Whether `role` may perform `operation`.
#[must_use]
pub const fn allowed(role: Role, operation: Operation) -> bool {
    match operation {
        Operation::ViewProfile
        | Operation::UpdatePassword
        | Operation::ListStores
        | Operation::ViewStore
        | Operation::DeleteRating => true,
        Operation::ListUsers
        | Operation::ViewAdminDashboard
        | Operation::ViewUser
        | Operation::CreateUser
        | Operation::UpdateUser
        | Operation::DeleteUser
        | Operation::CreateStore
        | Operation::UpdateStore
        | Operation::DeleteStore => matches!(role, Role::Admin),
        Operation::ViewOwnerDashboard => matches!(role, Role::StoreOwner),
        Operation::SubmitRating | Operation::ViewOwnRating => matches!(role, Role::User),
    }
}
