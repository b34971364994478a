// Application layer - use cases over worker entries.
// Input validation lives here; fee and summary rules stay in the domain.

pub mod error;
pub mod reporting;
pub mod service;

pub use error::*;
pub use reporting::*;
pub use service::*;
