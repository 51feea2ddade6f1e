//! File-backed storage of a single saved battle.

use std::{
    ffi::OsString,
    fs, io,
    path::{Path, PathBuf},
};

use skirmish_core::BattleRecord;
use thiserror::Error;

use crate::codec::{self, CodecError};

/// Errors raised while saving or restoring a battle file.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// The file could not be read, written or renamed.
    #[error("failed to access {}: {source}", path.display())]
    Io {
        /// File being accessed.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The file exists but does not hold a valid battle.
    #[error("{} does not hold a valid battle: {source}", path.display())]
    Corrupt {
        /// File being decoded.
        path: PathBuf,
        /// Decoding failure.
        #[source]
        source: CodecError,
    },
    /// The battle cannot be expressed in the file layout.
    #[error("battle cannot be encoded: {0}")]
    Encode(#[source] CodecError),
}

/// Saves and restores a battle at a fixed path.
///
/// Saves go to a temporary sibling first and are renamed into place, so a
/// failed save never leaves a half-written file behind.
#[derive(Clone, Debug)]
pub struct BattleStore {
    path: PathBuf,
}

impl BattleStore {
    /// Creates a store backed by `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the saved battle.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes the battle, replacing any previous save.
    pub fn save(&self, record: &BattleRecord) -> Result<(), PersistenceError> {
        let bytes = codec::encode(record).map_err(PersistenceError::Encode)?;
        let temp_path = self.temp_path();

        fs::write(&temp_path, &bytes).map_err(|source| PersistenceError::Io {
            path: temp_path.clone(),
            source,
        })?;
        if let Err(source) = fs::rename(&temp_path, &self.path) {
            if let Err(error) = fs::remove_file(&temp_path) {
                tracing::warn!(
                    path = %temp_path.display(),
                    %error,
                    "failed to remove temporary save"
                );
            }
            return Err(PersistenceError::Io {
                path: self.path.clone(),
                source,
            });
        }

        tracing::debug!(
            path = %self.path.display(),
            bytes = bytes.len(),
            "saved battle"
        );
        Ok(())
    }

    /// Reads and fully decodes the saved battle.
    pub fn load(&self) -> Result<BattleRecord, PersistenceError> {
        let bytes = fs::read(&self.path).map_err(|source| PersistenceError::Io {
            path: self.path.clone(),
            source,
        })?;
        let record = codec::decode(&bytes).map_err(|source| PersistenceError::Corrupt {
            path: self.path.clone(),
            source,
        })?;

        tracing::debug!(path = %self.path.display(), "loaded battle");
        Ok(record)
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(OsString::from)
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skirmish_core::{
        CombatantProfile, Health, Position, Recruit, SideColor, SideRecord, Speed, Stealth,
        Strength, Traits,
    };

    fn record() -> BattleRecord {
        let side = |name: &str, recruits| SideRecord {
            name: name.to_owned(),
            color: SideColor::new(0.5, 0.5, 0.5, 1.0),
            recruits,
        };
        BattleRecord {
            sides: [
                side(
                    "Light",
                    vec![Recruit {
                        profile: CombatantProfile {
                            name: Some("Hobbit0".to_owned()),
                            health: Health::new(80.0),
                            strength: Strength::new(45.5),
                            speed: Speed::new(60.0),
                            traits: Traits::Hobbit {
                                stealth: Stealth::new(20.0),
                            },
                        },
                        position: Position::new(450.0, 170.0),
                    }],
                ),
                side("Dark", Vec::new()),
            ],
        }
    }

    #[test]
    fn saved_battle_loads_back() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = BattleStore::new(dir.path().join("battlefield.ser"));

        assert!(!store.path().exists());
        store.save(&record()).expect("save");
        assert!(store.path().exists());
        assert_eq!(store.load().expect("load"), record());
        assert!(!dir.path().join("battlefield.ser.tmp").exists());
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = BattleStore::new(dir.path().join("absent.ser"));
        assert!(matches!(store.load(), Err(PersistenceError::Io { .. })));
    }

    #[test]
    fn corrupt_file_is_reported() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("battlefield.ser");
        fs::write(&path, b"SKRM\x00\x01garbage").expect("write");

        let store = BattleStore::new(&path);
        assert!(matches!(
            store.load(),
            Err(PersistenceError::Corrupt { .. })
        ));
    }

    #[test]
    fn failed_rename_removes_temporary_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("battlefield.ser");
        fs::create_dir(&path).expect("mkdir");
        fs::write(path.join("occupant"), b"keep").expect("write");

        let store = BattleStore::new(&path);
        assert!(matches!(
            store.save(&record()),
            Err(PersistenceError::Io { .. })
        ));
        assert!(!dir.path().join("battlefield.ser.tmp").exists());
        assert!(path.is_dir());
    }

    #[test]
    fn save_replaces_previous_battle() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = BattleStore::new(dir.path().join("battlefield.ser"));

        let mut first = record();
        first.sides[1].name = "Mordor".to_owned();
        store.save(&first).expect("first save");
        store.save(&record()).expect("second save");

        assert_eq!(store.load().expect("load").sides[1].name, "Dark");
    }
}
