//! # Ordo Core
//!
//! Core types shared by every Ordo crate.
//!
//! This crate provides the vocabulary the pipeline is built from:
//!
//! - [`ContributorKey`] - Stable type identity used as an ordering target
//! - [`stages`] - Well-known stage markers (`Begin`, `ResponseCoding`, ...)
//! - [`Continuation`] - The signal an action returns to steer traversal
//! - [`RequestContext`] - Per-request mutable state passed to every action
//! - [`ContributorError`] / [`ServerError`] - Contributor failures and their recorded form
//! - [`CallGraphStrategy`] - Selection of the call-graph generator

#![doc(html_root_url = "https://docs.rs/ordo-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod context;
mod continuation;
mod error;
mod key;
pub mod stages;
mod strategy;

pub use context::{RequestContext, RequestId};
pub use continuation::Continuation;
pub use error::{ContributorError, ContributorResult, ServerError};
pub use key::ContributorKey;
pub use strategy::CallGraphStrategy;
