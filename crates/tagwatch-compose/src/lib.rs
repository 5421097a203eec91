//! Compose manifest lookup and deployment for tagwatch
//!
//! - [`ManifestLocator`] checks that a synced checkout contains its manifest
//! - [`DeploymentInvoker`] brings the manifest's services up with a new tag
//!
//! The default [`ComposeInvoker`] shells out to `docker-compose`; anything
//! that can apply a manifest with variables can stand in for it.

pub mod error;
pub mod invoker;
pub mod locator;

pub use error::{Error, Result};
pub use invoker::{ComposeInvoker, DeployOutput, DeployRequest, DeploymentInvoker, TAG_VARIABLE};
pub use locator::{DEFAULT_MANIFEST_NAME, FileManifestLocator, ManifestLocator};
