//! Version marker sources for tagwatch
//!
//! A version marker is a small plain-text object, one per application,
//! holding the currently published image tag. This crate reads those
//! markers from a blob store:
//!
//! - [`GcsVersionSource`] - Google Cloud Storage JSON API
//! - [`LocalVersionSource`] - a directory laid out as `<bucket>/<object>`
//!
//! Raw bytes are compared only after [`normalize_version`].

pub mod error;
pub mod gcs;
pub mod local;
pub mod source;
pub mod token;

pub use error::{Error, Result};
pub use gcs::{GcsOptions, GcsVersionSource};
pub use local::LocalVersionSource;
pub use source::{VersionSource, normalize_version};
pub use token::TokenSource;
