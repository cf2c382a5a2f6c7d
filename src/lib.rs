//! # crowdin-api
//!
//! Async client for the Crowdin project REST API.
//!
//! ## Features
//!
//! - **Authentication**: project API key or account login + account key,
//!   chosen per client and attached to every request.
//! - **Source files**: add, update and delete files, with uploads streamed
//!   from disk.
//! - **Branches**: create version branches and keep a file in a branch up to
//!   date with `create_or_update_versioned_file`.
//! - **Status**: project info tree, translation and language progress.
//! - **Exports**: rebuild packages, download single files or whole zip
//!   archives, optionally scoped to a branch.
//!
//! Every call issues exactly one HTTP exchange (two-step operations issue
//! them in order). Failures surface as [`CrowdinError`]; nothing is retried.
//!
//! ## Example
//!
//! ```no_run
//! use crowdin_api::{ClientConfig, Credentials, CrowdinClient};
//!
//! # async fn example() -> crowdin_api::Result<()> {
//! let config = ClientConfig::new("my-project", Credentials::api_key("0123456789abcdef"))?;
//! let client = CrowdinClient::new(config);
//!
//! // Keep `strings.json` current in the `v2` branch
//! client
//!     .create_or_update_versioned_file(
//!         "v2",
//!         "strings.json",
//!         "locales/en/strings.json",
//!         "/%two_letters_code%/%original_file_name%",
//!     )
//!     .await?;
//!
//! // Fetch the branch translations as a zip archive
//! let archive = client.download_translations(None, Some("v2")).await?;
//! println!("downloaded {} bytes", archive.len());
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod http;
pub mod info;

// Re-export commonly used types
pub use api::{CrowdinClient, DEFAULT_PACKAGE, Form, RemoteError};
pub use config::{ClientConfig, ClientOptions, Credentials, DEFAULT_API_BASE};
pub use error::{CrowdinError, Result};
pub use http::{EndpointRequest, FormPart, HttpMethod, HttpTransport, RawResponse, ReqwestTransport};
pub use info::NodeType;
