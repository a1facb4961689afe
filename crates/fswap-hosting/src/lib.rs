//! Transient file hosting for the face-swap backend.
//!
//! The swap provider only accepts publicly reachable URLs, so local inputs
//! are first pushed to a throwaway host. Backends are tried in a fixed
//! order and the first success wins; the caller never learns which backend
//! served the upload, only the resulting URL.

pub mod error;
pub mod uploader;

pub use error::{HostingError, HostingResult};
pub use uploader::{HostingBackend, HostingConfig, TempHostUploader};
