//! nf-core: stable foundation for netfunc.
//!
//! Contains:
//! - ids (compact vertex/edge ids and the external network id type)
//! - numeric (float helpers and weight checks)
//! - timing (phase timers reported through tracing)
//! - error (shared error types)

pub mod error;
pub mod ids;
pub mod numeric;
pub mod timing;

pub use error::{NfError, NfResult};
pub use ids::*;
pub use numeric::*;
