//! Version command - show version information.

use anyhow::Result;
use dllist_core::list::{LIST_VARIANT, LIST_VERSION};

/// Version information.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Run the version command.
pub fn run() -> Result<()> {
    println!("dllist - download list generator");
    println!();
    println!("Version:     {}", VERSION);
    println!("List format: {}.{}", LIST_VERSION, LIST_VARIANT);
    println!(
        "Platform:    {} / {}",
        std::env::consts::OS,
        std::env::consts::ARCH
    );
    println!();
    println!("Components:");
    println!("  dllist-core      List model, encoding, checksum, LZ10");
    println!("  dllist-executor  Data source, storage, build orchestration");
    println!("  dllist-cli       Command-line interface");

    Ok(())
}
