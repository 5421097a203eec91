//! Check command implementation

use std::path::Path;

use colored::Colorize;
use tagwatch_core::load_watch_file;

use crate::error::Result;

/// Load and validate the watch file, then list its applications.
pub fn run_check(config: &Path) -> Result<()> {
    let targets = load_watch_file(config)?;

    println!(
        "{} {} ({} application{})",
        "=>".blue().bold(),
        config.display().to_string().cyan(),
        targets.len(),
        if targets.len() == 1 { "" } else { "s" }
    );
    for target in targets.iter() {
        println!("   {} {}", "-".dimmed(), target.name.bold());
        println!("     repository: {}", target.manifest_repository);
        println!("     bucket:     {}", target.version_bucket);
        if !target.frequency.is_empty() {
            println!("     frequency:  {}", target.frequency);
        }
    }
    println!("{} Watch file is valid.", "OK".green().bold());

    Ok(())
}
