// src/storage/store.rs
//
// Namespaced recording storage under a data root:
//
//   <root>/baseline/         newest calibration only
//   <root>/subject_<id>/     every saved recording for one reed
//   <root>/archive/<stamp>/  rotated-out baseline directories
//   <root>/.staging/         new baselines before they replace the current one

use log::{debug, info};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::archive::{read_archive, write_archive, ARCHIVE_EXTENSION};
use super::fingerprint::Fingerprint;
use crate::core::PcmBuffer;
use crate::error::{ReedError, Result};

/// Logical storage bucket
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Namespace {
    Baseline,
    Subject(String),
    Archive,
}

impl Namespace {
    /// Namespace for one reed. Ids must be usable as a single path component.
    pub fn subject(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if id.is_empty() || id == "." || id == ".." || id.contains(['/', '\\']) {
            return Err(ReedError::InvalidConfig(format!("invalid reed id {:?}", id)));
        }
        Ok(Self::Subject(id))
    }

    pub fn dir_name(&self) -> String {
        match self {
            Namespace::Baseline => "baseline".to_string(),
            Namespace::Subject(id) => format!("subject_{}", id),
            Namespace::Archive => "archive".to_string(),
        }
    }
}

/// One archive file and the save time parsed from its name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordingEntry {
    pub save_time: u64,
    pub path: PathBuf,
}

/// Shape and metadata of a stored recording
#[derive(Debug, Clone)]
pub struct RecordingSummary {
    pub path: PathBuf,
    pub fingerprint: Fingerprint,
    pub frames: usize,
    pub channels: usize,
    pub duration_secs: f64,
}

const STAGING_DIR: &str = ".staging";

/// File name for a save time: the decimal timestamp plus the archive extension
pub fn archive_file_name(save_time: u64) -> String {
    format!("{}.{}", save_time, ARCHIVE_EXTENSION)
}

/// Numeric save time from an archive file name, with or without extension
pub fn parse_save_time(file_name: &str) -> Option<u64> {
    let stem = file_name
        .strip_suffix(ARCHIVE_EXTENSION)
        .and_then(|s| s.strip_suffix('.'))
        .unwrap_or(file_name);
    if stem.is_empty() || !stem.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    stem.parse().ok()
}

#[derive(Debug, Clone)]
pub struct RecordingStore {
    root: PathBuf,
}

impl RecordingStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn namespace_dir(&self, namespace: &Namespace) -> PathBuf {
        self.root.join(namespace.dir_name())
    }

    /// Create the namespace directory if needed. An existing directory is success.
    pub fn ensure_namespace(&self, namespace: &Namespace) -> Result<PathBuf> {
        let dir = self.namespace_dir(namespace);
        fs::create_dir_all(&dir).map_err(|e| ReedError::io(&dir, e))?;
        Ok(dir)
    }

    /// Persist a recording under its fingerprint's save time. Same timestamp overwrites.
    pub fn save(&self, namespace: &Namespace, buffer: &PcmBuffer, fingerprint: &Fingerprint) -> Result<PathBuf> {
        let dir = self.ensure_namespace(namespace)?;
        let path = dir.join(archive_file_name(fingerprint.save_time));

        if path.exists() {
            debug!("overwriting {}", path.display());
        }

        write_archive(&path, buffer, fingerprint)?;
        info!("saved {}", path.display());
        Ok(path)
    }

    pub fn load(&self, path: &Path) -> Result<(PcmBuffer, Fingerprint)> {
        read_archive(path)
    }

    /// Recordings in a namespace, oldest first. A missing directory is empty.
    pub fn list(&self, namespace: &Namespace) -> Result<Vec<RecordingEntry>> {
        let dir = self.namespace_dir(namespace);
        let read_dir = match fs::read_dir(&dir) {
            Ok(rd) => rd,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(ReedError::io(&dir, e)),
        };

        let mut entries = Vec::new();
        for entry in read_dir {
            let entry = entry.map_err(|e| ReedError::io(&dir, e))?;
            if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
                continue;
            }

            let name = entry.file_name();
            match name.to_str().and_then(parse_save_time) {
                Some(save_time) => entries.push(RecordingEntry {
                    save_time,
                    path: entry.path(),
                }),
                None => debug!("ignoring {} in {}", name.to_string_lossy(), dir.display()),
            }
        }

        entries.sort_by_key(|e| e.save_time);
        Ok(entries)
    }

    /// Most recent recording by parsed save time
    pub fn newest(&self, namespace: &Namespace) -> Result<Option<RecordingEntry>> {
        Ok(self.list(namespace)?.pop())
    }

    pub fn inspect(&self, path: &Path) -> Result<RecordingSummary> {
        let (buffer, fingerprint) = self.load(path)?;
        Ok(RecordingSummary {
            path: path.to_path_buf(),
            frames: buffer.frames(),
            channels: buffer.channels(),
            duration_secs: buffer.duration_secs(),
            fingerprint,
        })
    }

    /// Install a new baseline, rotating the current one into the archive.
    ///
    /// The archive is written to the staging area first. If that write fails
    /// the current baseline is left untouched.
    pub fn replace_baseline(&self, buffer: &PcmBuffer, fingerprint: &Fingerprint) -> Result<PathBuf> {
        let staging = self.root.join(STAGING_DIR);
        fs::create_dir_all(&staging).map_err(|e| ReedError::io(&staging, e))?;

        let file_name = archive_file_name(fingerprint.save_time);
        let staged = staging.join(&file_name);
        if let Err(e) = write_archive(&staged, buffer, fingerprint) {
            if staged.is_file() {
                let _ = fs::remove_file(&staged);
            }
            return Err(e);
        }

        self.archive_baseline()?;

        let path = self.ensure_namespace(&Namespace::Baseline)?.join(file_name);
        fs::rename(&staged, &path).map_err(|e| ReedError::io(&path, e))?;
        info!("saved baseline {}", path.display());
        Ok(path)
    }

    /// Move the whole baseline directory to `archive/<newest stamp>`.
    ///
    /// Returns the archived directory, or `None` when there was no baseline to move.
    pub fn archive_baseline(&self) -> Result<Option<PathBuf>> {
        let Some(newest) = self.newest(&Namespace::Baseline)? else {
            return Ok(None);
        };

        let archive_dir = self.ensure_namespace(&Namespace::Archive)?;
        let target = archive_dir.join(newest.save_time.to_string());
        let baseline_dir = self.namespace_dir(&Namespace::Baseline);

        fs::rename(&baseline_dir, &target).map_err(|e| ReedError::io(&target, e))?;
        info!("archived baseline to {}", target.display());
        Ok(Some(target))
    }
}
