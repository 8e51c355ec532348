//! # Sigil Core
//!
//! The domain layer of the Sigil credential service.
//! This crate holds the account model, the error taxonomy, the ports that
//! infrastructure implements, and the auth flow that orchestrates them.

pub mod domain;
pub mod error;
pub mod ports;
pub mod service;

pub use error::{DomainError, StoreError};
pub use service::{AuthFlow, AuthFlowConfig};
