//! Wire types and errors shared by the `sealer` service crates.

pub mod error;
pub mod protocol;

pub use error::ServiceError;
