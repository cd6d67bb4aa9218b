//! studydash-core — score ledger, model-response validation, and the tutor.
//!
//! This crate owns the rules for how a student's quiz statistics evolve and
//! the boundary that turns untrusted model text into typed responses. Storage
//! and the completion backend are collaborators behind the traits in
//! [`traits`].

pub mod error;
pub mod ledger;
pub mod model;
pub mod prompt;
pub mod traits;
pub mod tutor;
pub mod validator;
