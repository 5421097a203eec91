//! Shared test utilities for the tagwatch workspace.
//!
//! This crate provides standardised test fixtures to eliminate duplication
//! across crate test suites. It is a dev-dependency only and never published.
//!
//! # Modules
//!
//! - [`git`]: manifest repositories with real history, usable as remotes
//! - [`watch`]: watch files and version marker directories

pub mod git;
pub mod watch;
