// tkv-common - Shared value objects for TypedKV
//
// These types are used by the byte-level client and by the typed operation
// layer alike, so they carry no I/O and no serialization dependencies.

pub mod convert;
pub mod error;
pub mod expiration;
pub mod range;
pub mod types;
pub mod weights;

// Re-export for convenience
pub use error::*;
pub use expiration::*;
pub use range::*;
pub use types::*;
pub use weights::*;
