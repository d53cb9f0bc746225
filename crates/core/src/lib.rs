//! Store Ratings Core - Shared domain library.
//!
//! This crate provides the types and rules used across all Store Ratings components:
//! - `server` - JSON API for users, stores and ratings
//! - `cli` - Command-line tools for migrations, seeding and bootstrap admins
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP. Everything here can be unit tested without a database.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, emails, roles and rating values
//! - [`validation`] - Field rules for names, addresses and passwords
//! - [`aggregate`] - Rating averages and per-owner rollups
//! - [`policy`] - Which role may perform which operation

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod aggregate;
pub mod policy;
pub mod types;
pub mod validation;

pub use aggregate::{RatingSummary, owner_overall_average};
pub use policy::{Operation, allowed};
pub use types::*;
pub use validation::{FieldError, ValidationErrors};
