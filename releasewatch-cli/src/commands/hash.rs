//! Hash command - print a file's SHA-256.

use std::path::Path;

use releasewatch::download::calculate_file_checksum;

use crate::error::CliError;

/// Run the hash command.
pub fn run(file: &Path) -> Result<(), CliError> {
    let hash = calculate_file_checksum(file)?;
    println!("{}  {}", hash, file.display());
    Ok(())
}
