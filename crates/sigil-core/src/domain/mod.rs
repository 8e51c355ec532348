//! Domain entities - the core business objects.

mod credential;

pub use credential::{Credential, mask_identifier};
