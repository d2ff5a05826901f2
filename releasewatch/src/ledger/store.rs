//! Persisted version history.
//!
//! The ledger maps each platform to its observed releases, newest first.
//! It is stored as pretty-printed JSON and rewritten in full after every
//! mutation. Writes go to a temp file that is then renamed over the ledger,
//! so a crash mid-write leaves the previous history intact.

use std::collections::BTreeMap;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::error::{LedgerError, LedgerResult};
use super::record::{Platform, VersionRecord};

/// Platform-keyed release history backed by a JSON file.
#[derive(Debug, Clone)]
pub struct VersionLedger {
    path: PathBuf,
    entries: BTreeMap<Platform, Vec<VersionRecord>>,
}

impl VersionLedger {
    /// An empty ledger that will be saved to `path`.
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: BTreeMap::new(),
        }
    }

    /// Load the ledger at `path`.
    ///
    /// Never fails: a missing file yields an empty ledger, and an unreadable
    /// or corrupt file is logged and also yields an empty ledger.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();

        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No version history yet");
                return Self::empty(path);
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to read version history, starting empty");
                return Self::empty(path);
            }
        };

        match serde_json::from_str::<BTreeMap<Platform, Vec<VersionRecord>>>(&contents) {
            Ok(mut entries) => {
                for records in entries.values_mut() {
                    sort_newest_first(records);
                }
                Self { path, entries }
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Version history is corrupt, starting empty");
                Self::empty(path)
            }
        }
    }

    /// Location of the ledger file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Most recent record for `platform`.
    pub fn latest(&self, platform: Platform) -> Option<&VersionRecord> {
        self.entries.get(&platform).and_then(|records| records.first())
    }

    /// All records for `platform`, newest first.
    pub fn records(&self, platform: Platform) -> &[VersionRecord] {
        self.entries
            .get(&platform)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Total number of records across platforms.
    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Insert `record`, or refresh the existing record with the same key.
    ///
    /// The platform's history is re-sorted newest first and the whole ledger
    /// is saved before returning. If saving fails the ledger is left as it
    /// was.
    pub fn upsert(&mut self, record: VersionRecord) -> LedgerResult<()> {
        if record.is_unknown() {
            return Err(LedgerError::UnknownVersion {
                platform: record.platform,
            });
        }

        let platform = record.platform;
        let previous = self.entries.get(&platform).cloned();

        let records = self.entries.entry(platform).or_default();
        let key = record.key();

        match records.iter_mut().find(|existing| existing.key() == key) {
            Some(existing) => *existing = record,
            None => records.push(record),
        }
        sort_newest_first(records);

        if let Err(e) = self.save() {
            // Memory must never hold a record the file does not.
            match previous {
                Some(records) => self.entries.insert(platform, records),
                None => self.entries.remove(&platform),
            };
            return Err(e);
        }
        Ok(())
    }

    /// Write the ledger to disk.
    pub fn save(&self) -> LedgerResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| LedgerError::CreateDir {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let temp_path = self.path.with_extension("json.tmp");
        let write_err = |source: std::io::Error| LedgerError::Write {
            path: temp_path.clone(),
            source,
        };

        let file = fs::File::create(&temp_path).map_err(write_err)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &self.entries)?;
        writer.flush().map_err(write_err)?;
        drop(writer);

        fs::rename(&temp_path, &self.path).map_err(|e| LedgerError::Write {
            path: self.path.clone(),
            source: e,
        })?;

        debug!(path = %self.path.display(), records = self.len(), "Version history saved");
        Ok(())
    }
}

fn sort_newest_first(records: &mut [VersionRecord]) {
    records.sort_by(|a, b| b.update_time.cmp(&a.update_time));
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    fn record_at(platform: Platform, version: &str, day: u32) -> VersionRecord {
        VersionRecord::new(platform, version)
            .with_update_time(Utc.with_ymd_and_hms(2025, 1, day, 12, 0, 0).unwrap())
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let temp = TempDir::new().unwrap();
        let ledger = VersionLedger::load(temp.path().join("version_history.json"));
        assert!(ledger.is_empty());
        assert!(ledger.latest(Platform::Windows).is_none());
    }

    #[test]
    fn test_load_corrupt_file_is_empty() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("version_history.json");
        fs::write(&path, "{ not json").unwrap();

        let ledger = VersionLedger::load(&path);
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_upsert_same_key_replaces() {
        let temp = TempDir::new().unwrap();
        let mut ledger = VersionLedger::empty(temp.path().join("history.json"));

        ledger.upsert(record_at(Platform::Windows, "21900", 1)).unwrap();
        let refreshed = record_at(Platform::Windows, "21900", 2).with_download_url("http://x/a.exe");
        ledger.upsert(refreshed.clone()).unwrap();

        assert_eq!(ledger.records(Platform::Windows).len(), 1);
        assert_eq!(ledger.latest(Platform::Windows), Some(&refreshed));
    }

    #[test]
    fn test_upsert_new_key_appends_and_sorts() {
        let temp = TempDir::new().unwrap();
        let mut ledger = VersionLedger::empty(temp.path().join("history.json"));

        ledger.upsert(record_at(Platform::Windows, "21915", 5)).unwrap();
        ledger.upsert(record_at(Platform::Windows, "21900", 1)).unwrap();
        ledger.upsert(record_at(Platform::MacOs, "7.2.1", 3)).unwrap();

        let versions: Vec<_> = ledger
            .records(Platform::Windows)
            .iter()
            .map(|r| r.version.as_str())
            .collect();
        assert_eq!(versions, vec!["21915", "21900"]);
        assert_eq!(ledger.records(Platform::MacOs).len(), 1);
        assert_eq!(ledger.len(), 3);
    }

    #[test]
    fn test_upsert_persists_synchronously() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("state").join("history.json");
        let mut ledger = VersionLedger::empty(&path);

        ledger.upsert(record_at(Platform::MacOs, "7.2.1", 3)).unwrap();

        let reloaded = VersionLedger::load(&path);
        assert_eq!(reloaded.records(Platform::MacOs), ledger.records(Platform::MacOs));
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_upsert_rejects_unknown_version() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("history.json");
        let mut ledger = VersionLedger::empty(&path);

        let result = ledger.upsert(VersionRecord::unknown(Platform::Windows, "boom"));

        assert!(matches!(result, Err(LedgerError::UnknownVersion { .. })));
        assert!(ledger.is_empty());
        assert!(!path.exists());
    }

    #[test]
    fn test_failed_save_leaves_ledger_unchanged() {
        let temp = TempDir::new().unwrap();
        let blocker = temp.path().join("blocker");
        fs::write(&blocker, b"not a directory").unwrap();
        let mut ledger = VersionLedger::empty(blocker.join("version_history.json"));

        let result = ledger.upsert(record_at(Platform::Windows, "21915", 2));

        assert!(matches!(result, Err(LedgerError::CreateDir { .. })));
        assert!(ledger.latest(Platform::Windows).is_none());
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_failed_save_restores_previous_history() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("state");
        let mut ledger = VersionLedger::empty(dir.join("version_history.json"));
        ledger.upsert(record_at(Platform::Windows, "21900", 1)).unwrap();

        fs::remove_dir_all(&dir).unwrap();
        fs::write(&dir, b"now a file").unwrap();
        let result = ledger.upsert(record_at(Platform::Windows, "21915", 2));

        assert!(result.is_err());
        let versions: Vec<_> = ledger
            .records(Platform::Windows)
            .iter()
            .map(|r| r.version.as_str())
            .collect();
        assert_eq!(versions, vec!["21900"]);
    }

    #[test]
    fn test_load_sorts_hand_edited_history() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("history.json");
        let mut entries = BTreeMap::new();
        entries.insert(
            Platform::Windows,
            vec![
                record_at(Platform::Windows, "21900", 1),
                record_at(Platform::Windows, "21915", 9),
            ],
        );
        fs::write(&path, serde_json::to_string(&entries).unwrap()).unwrap();

        let ledger = VersionLedger::load(&path);
        assert_eq!(ledger.latest(Platform::Windows).unwrap().version, "21915");
    }
}
