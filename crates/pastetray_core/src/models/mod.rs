//! Paste request/result models.

/// Validated request for one submission.
pub mod request;
/// Normalized submission outcome.
pub mod result;

pub use request::{PasteRequest, PasteRequestBuilder};
pub use result::{FailureKind, PasteResult};

#[cfg(test)]
mod tests;
