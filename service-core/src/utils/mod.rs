pub mod signature;
pub mod validation;

pub use signature::{sign_hmac_sha256, verify_hmac_sha256};
pub use validation::ValidatedJson;
