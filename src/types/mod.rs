mod identity;
mod identity_error;

pub use identity::{Identity, IdentityRow};
pub use identity_error::{IdentityError, Result};
