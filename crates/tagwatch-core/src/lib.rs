//! Watch targets and the reconcile loop for tagwatch
//!
//! This crate ties the capability crates together:
//!
//! ```text
//!                 tagwatch-cli
//!                      |
//!                tagwatch-core
//!                      |
//!     +----------------+----------------+
//!     |                |                |
//! tagwatch-store  tagwatch-git  tagwatch-compose
//! ```
//!
//! - **config**: the watch file and the [`WatchTargetSet`] it describes
//! - **reconcile**: one pass over all targets, see [`Reconciler`]

pub mod config;
pub mod error;
pub mod reconcile;

pub use config::{WatchFile, WatchTarget, WatchTargetSet, load_watch_file, validate_app_name};
pub use error::{Error, Result};
pub use reconcile::{
    AppFailure, AppOutcome, FailureKind, FailurePolicy, PassReport, ReconcileSettings, Reconciler,
};
