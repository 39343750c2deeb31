//! Verify command - check a stored list the way the console does.

use anyhow::{Context, Result};
use dllist_core::compress::{Compressor, Lz10};
use dllist_core::list::{ListHeader, TableKind, verify_payload};
use std::path::Path;

/// Run the verify command.
pub async fn run(file: &Path) -> Result<()> {
    tracing::info!(file = %file.display(), "Verifying list");

    let compressed = tokio::fs::read(file)
        .await
        .with_context(|| format!("Failed to read list: {}", file.display()))?;
    let payload = Lz10::new()
        .decompress(&compressed)
        .context("List is not a valid LZ10 stream")?;
    let verified = verify_payload(&payload)?;
    let header = ListHeader::from_bytes(&payload).context("Failed to read list header")?;

    println!("List: {}", file.display());
    println!("  Compressed:  {} bytes", compressed.len());
    println!("  Filesize:    {} bytes", verified.filesize);
    println!("  Checksum:    {:#010x}", verified.checksum);
    println!("  Version:     {}.{}", header.version, header.variant);
    println!("  List ID:     {}", header.list_id);
    println!("  Country:     {}", header.country_code);
    println!("  Language:    {}", header.language_code);
    println!();
    println!("  {:<24} {:>6} {:>10}", "TABLE", "ROWS", "OFFSET");
    for kind in TableKind::ALL {
        let slot = header.slot(kind);
        println!("  {:<24} {:>6} {:>10}", kind.name(), slot.count, slot.offset);
    }
    println!();
    println!("OK");

    Ok(())
}
