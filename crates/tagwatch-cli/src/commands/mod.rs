//! Command implementations for tagwatch CLI

mod check;
mod run;

pub use check::run_check;
pub use run::{run_once, run_watch};
