//! Init command - write a configuration file with every setting.

use std::path::Path;

use releasewatch::config::config_file_path;

use crate::error::CliError;
use crate::runner::load_config;

/// Run the init command.
///
/// Existing values are kept; missing keys are filled with defaults.
pub fn run(config_path: Option<&Path>) -> Result<(), CliError> {
    let path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(config_file_path);

    let config = load_config(Some(path.as_path()))?;
    config.save_to(&path)?;

    println!("Configuration file: {}", path.display());
    println!();
    println!("Edit this file to customize ReleaseWatch settings.");
    println!("Use 'releasewatch config list' to see the current values.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use releasewatch::config::ConfigFile;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_init_keeps_existing_values() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.ini");
        fs::write(&path, "[download]\nworkers = 3\n").unwrap();

        run(Some(path.as_path())).unwrap();

        let config = ConfigFile::load_from(&path).unwrap();
        assert_eq!(config.download.workers, 3);
        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("fallback_version"));
    }
}
