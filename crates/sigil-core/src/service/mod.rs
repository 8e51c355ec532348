//! Use-case services built on top of the ports.

mod auth_flow;

pub use auth_flow::{AuthFlow, AuthFlowConfig, Introspection, SignedIn};
