//! Crowdin API client and request types.

pub mod client;
pub mod error;
pub mod form;

pub use client::{CrowdinClient, DEFAULT_PACKAGE};
pub use error::RemoteError;
pub use form::Form;
