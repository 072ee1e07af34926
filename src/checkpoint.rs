//! Versioned on-disk format for trained agents

use std::{
    fs::{self, File},
    io::{BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use log::info;
use serde::{Deserialize, Serialize};

use crate::{
    discretize::Discretizer,
    ds::ValueTable,
    error::{Error, Result},
};

/// Element type tag written for every table
pub const DTYPE: &str = "f32";

/// A dense Q-table tagged with its shape and element type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedTable {
    /// State bin counts followed by the number of actions
    pub shape: Vec<usize>,
    pub dtype: String,
    /// Row-major contents
    pub values: Vec<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hyperparameters {
    pub learning_rate: f32,
    pub discount_factor: f32,
    pub epsilon_decay: f32,
    pub epsilon_min: f32,
}

/// Everything needed to resume training or evaluate a [`QTableAgent`](crate::algo::QTableAgent)
///
/// Every field is required when reading; a record missing one is rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedAgent {
    pub version: u32,
    pub table: SavedTable,
    pub epsilon: f32,
    pub bin_counts: Vec<usize>,
    pub state_bounds: Vec<(f32, f32)>,
    pub hyperparameters: Hyperparameters,
}

impl SavedAgent {
    pub const VERSION: u32 = 1;

    pub fn new(
        table: &ValueTable,
        epsilon: f32,
        discretizer: &Discretizer,
        hyperparameters: Hyperparameters,
    ) -> Self {
        Self {
            version: Self::VERSION,
            table: SavedTable {
                shape: table.shape().to_vec(),
                dtype: DTYPE.to_string(),
                values: table.values().to_vec(),
            },
            epsilon,
            bin_counts: discretizer.bins().to_vec(),
            state_bounds: discretizer.bounds().to_vec(),
            hyperparameters,
        }
    }

    /// Check the version, dtype, and that the table shape agrees with the bin counts
    pub fn check_format(&self) -> Result<()> {
        if self.version != Self::VERSION {
            return Err(Error::UnsupportedVersion {
                found: self.version,
                expected: Self::VERSION,
            });
        }
        if self.table.dtype != DTYPE {
            return Err(Error::UnsupportedDtype(self.table.dtype.clone()));
        }
        let shape = &self.table.shape;
        let dims = self.bin_counts.len();
        if shape.len() != dims + 1 || shape[..dims] != self.bin_counts[..] {
            let n_actions = shape.last().copied().unwrap_or_default();
            return Err(Error::ShapeMismatch {
                expected: self.bin_counts.iter().copied().chain([n_actions]).collect(),
                found: shape.clone(),
            });
        }
        Ok(())
    }

    /// Write the record as JSON
    ///
    /// The record is written to a temporary sibling file first and then renamed over `path`,
    /// so an interrupted write leaves any previous checkpoint intact.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|source| Error::Io {
                operation: "create directory",
                path: dir.to_path_buf(),
                source,
            })?;
        }

        let tmp = tmp_path(path);
        self.write_and_rename(&tmp, path).inspect_err(|_| {
            // the temporary file may not exist if its creation failed
            let _ = fs::remove_file(&tmp);
        })?;

        info!("Agent saved to {}", path.display());
        Ok(())
    }

    fn write_and_rename(&self, tmp: &Path, path: &Path) -> Result<()> {
        let file = File::create(tmp).map_err(|source| Error::Io {
            operation: "create",
            path: tmp.to_path_buf(),
            source,
        })?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self).map_err(|source| Error::Serialization {
            path: tmp.to_path_buf(),
            source,
        })?;
        writer
            .flush()
            .and_then(|()| writer.get_ref().sync_all())
            .map_err(|source| Error::Io {
                operation: "write",
                path: tmp.to_path_buf(),
                source,
            })?;
        drop(writer);

        fs::rename(tmp, path).map_err(|source| Error::Io {
            operation: "rename checkpoint into",
            path: path.to_path_buf(),
            source,
        })
    }

    /// Read a record written by [`SavedAgent::save_to_file`] and check its format
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| Error::Io {
            operation: "open",
            path: path.to_path_buf(),
            source,
        })?;
        let saved: Self = serde_json::from_reader(BufReader::new(file)).map_err(|source| {
            Error::Serialization {
                path: path.to_path_buf(),
                source,
            }
        })?;
        saved.check_format()?;

        info!("Agent loaded from {}", path.display());
        Ok(saved)
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;
    use crate::error::ErrorKind;

    fn sample() -> SavedAgent {
        let discretizer = Discretizer::new(vec![(-1.2, 0.6), (-0.07, 0.07)], vec![2, 3]).unwrap();
        let mut table = ValueTable::new(discretizer.bins(), 2);
        table.set(&[1, 2], 1, -0.123_456_79);
        table.set(&[0, 0], 0, 1.0e-7);
        SavedAgent::new(
            &table,
            0.3,
            &discretizer,
            Hyperparameters {
                learning_rate: 0.1,
                discount_factor: 0.99,
                epsilon_decay: 0.995,
                epsilon_min: 0.01,
            },
        )
    }

    #[test]
    fn file_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/agent.json");
        let saved = sample();
        saved.save_to_file(&path).unwrap();
        assert!(!tmp_path(&path).exists(), "Temporary file is renamed away");
        assert_eq!(SavedAgent::load_from_file(&path).unwrap(), saved);
    }

    #[test]
    fn failed_save_removes_temporary_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("agent.json");
        fs::create_dir(&path).unwrap();

        let err = sample().save_to_file(&path).unwrap_err();
        assert!(matches!(err, Error::Io { .. }), "{err}");
        assert!(!tmp_path(&path).exists(), "Temporary file is cleaned up");
        assert!(path.is_dir(), "Existing target is left alone");
    }

    #[test]
    fn missing_field_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("agent.json");
        let mut json = serde_json::to_value(sample()).unwrap();
        json.as_object_mut().unwrap().remove("state_bounds");
        fs::write(&path, json.to_string()).unwrap();

        let err = SavedAgent::load_from_file(&path).unwrap_err();
        assert!(matches!(err, Error::Serialization { .. }), "{err}");
        assert_eq!(err.kind(), ErrorKind::Storage);
    }

    #[test]
    fn missing_file_is_storage_error() {
        let dir = tempdir().unwrap();
        let err = SavedAgent::load_from_file(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, Error::Io { operation: "open", .. }));
        assert_eq!(err.kind(), ErrorKind::Storage);
    }

    #[test]
    fn format_checks() {
        let mut saved = sample();
        saved.version = 2;
        assert!(matches!(
            saved.check_format(),
            Err(Error::UnsupportedVersion { found: 2, .. })
        ));

        let mut saved = sample();
        saved.table.dtype = "f64".into();
        assert!(matches!(saved.check_format(), Err(Error::UnsupportedDtype(_))));

        let mut saved = sample();
        saved.bin_counts = vec![3, 2];
        assert!(matches!(
            saved.check_format(),
            Err(Error::ShapeMismatch { .. })
        ));

        let mut saved = sample();
        saved.table.shape = vec![2, 3];
        assert!(matches!(
            saved.check_format(),
            Err(Error::ShapeMismatch { .. })
        ));
    }
}
