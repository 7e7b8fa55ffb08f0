use std::fs::{self, OpenOptions};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::Utc;
use tempfile::NamedTempFile;
use tracing::{info, warn};

use crate::thresholds::{DEFAULT_THRESHOLDS, Performance, ThresholdSet, Thresholds};

const CURRENT_POINTER: &str = "CURRENT";
const LOCK_FILE: &str = ".store.lock";
const VERSION_PREFIX: &str = "thresholds_v";
const VERSION_SUFFIX: &str = ".json";

/// Append-only directory of threshold versions with a `CURRENT` pointer.
///
/// Appends hold an exclusive lock file for their duration, write the new
/// version through a temp file and a no-clobber rename, then replace the
/// pointer. Reads validate that versions are contiguous from 1, that each
/// file's embedded version matches its name and that the pointer names the
/// latest version; anything else is reported as corruption.
#[derive(Debug, Clone)]
pub struct ThresholdStore {
    dir: PathBuf,
}

impl ThresholdStore {
    pub fn open(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn version_path(&self, version: u32) -> PathBuf {
        self.dir.join(version_file_name(version))
    }

    /// Sorted version numbers present on disk.
    pub fn versions(&self) -> Result<Vec<u32>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }
        let mut versions = Vec::new();
        for entry in fs::read_dir(&self.dir)
            .with_context(|| format!("failed to list threshold store {}", self.dir.display()))?
        {
            let entry = entry?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            if !name.starts_with(VERSION_PREFIX) {
                continue;
            }
            match parse_version_file_name(name) {
                Some(v) => versions.push(v),
                None => bail!(
                    "threshold store {}: malformed version file name '{}'",
                    self.dir.display(),
                    name
                ),
            }
        }
        versions.sort_unstable();
        for (idx, v) in versions.iter().enumerate() {
            let expected = idx as u32 + 1;
            if *v != expected {
                bail!(
                    "threshold store {}: versions out of order (expected v{:03}, found v{:03})",
                    self.dir.display(),
                    expected,
                    v
                );
            }
        }
        Ok(versions)
    }

    pub fn load_version(&self, version: u32) -> Result<ThresholdSet> {
        let path = self.version_path(version);
        let content = fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let set: ThresholdSet = serde_json::from_str(&content)
            .with_context(|| format!("malformed threshold record {}", path.display()))?;
        if set.version != version {
            bail!(
                "{} declares version {} but is named v{:03}",
                path.display(),
                set.version,
                version
            );
        }
        set.thresholds
            .validate()
            .with_context(|| format!("invalid thresholds in {}", path.display()))?;
        Ok(set)
    }

    /// Current threshold set, or `None` for an empty store.
    pub fn load_current(&self) -> Result<Option<ThresholdSet>> {
        let versions = self.versions()?;
        let pointer = self.read_pointer()?;
        let Some(&latest) = versions.last() else {
            if let Some(p) = pointer {
                bail!(
                    "threshold store {}: pointer names v{:03} but no versions exist",
                    self.dir.display(),
                    p
                );
            }
            return Ok(None);
        };
        match pointer {
            Some(p) if p == latest => {}
            Some(p) => bail!(
                "threshold store {}: pointer names v{:03} but latest version is v{:03}",
                self.dir.display(),
                p,
                latest
            ),
            None => bail!(
                "threshold store {}: versions exist but {} is missing",
                self.dir.display(),
                CURRENT_POINTER
            ),
        }
        self.load_version(latest).map(Some)
    }

    /// Current set, seeding the store with the default table on first use.
    /// The flag reports whether this call created the seed version.
    pub fn load_or_init(&self) -> Result<(ThresholdSet, bool)> {
        if let Some(set) = self.load_current()? {
            info!(version = set.version, "thresholds loaded");
            return Ok((set, false));
        }
        let set = self.append(DEFAULT_THRESHOLDS, None, None, true)?;
        info!(version = set.version, "store initialized with default thresholds");
        Ok((set, true))
    }

    pub fn history(&self) -> Result<Vec<ThresholdSet>> {
        self.versions()?
            .into_iter()
            .map(|v| self.load_version(v))
            .collect()
    }

    pub fn append(
        &self,
        thresholds: Thresholds,
        performance: Option<Performance>,
        source_hash: Option<String>,
        is_initial: bool,
    ) -> Result<ThresholdSet> {
        thresholds.validate()?;
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("failed to create threshold store {}", self.dir.display()))?;
        let _lock = StoreLock::acquire(&self.dir)?;

        let versions = self.versions()?;
        let version = versions.last().copied().unwrap_or(0) + 1;
        let set = ThresholdSet {
            version,
            created_at: Utc::now(),
            thresholds,
            performance,
            source_hash,
            is_initial,
        };

        let path = self.version_path(version);
        let mut tmp = NamedTempFile::new_in(&self.dir)
            .with_context(|| format!("failed to stage {}", path.display()))?;
        {
            let mut w = BufWriter::new(tmp.as_file_mut());
            serde_json::to_writer_pretty(&mut w, &set)?;
            w.write_all(b"\n")?;
            w.flush()?;
        }
        tmp.as_file().sync_all()?;
        tmp.persist_noclobber(&path)
            .map_err(|e| anyhow::anyhow!("failed to publish {}: {}", path.display(), e.error))?;

        // An unpointed version would read back as corruption, so retract it
        // while the lock is still held.
        if let Err(err) = self.write_pointer(version) {
            if let Err(rm_err) = fs::remove_file(&path) {
                warn!(
                    path = %path.display(),
                    error = %rm_err,
                    "failed to retract unpublished threshold version"
                );
            }
            return Err(err);
        }
        info!(version, path = %path.display(), "threshold version saved");
        Ok(set)
    }

    fn read_pointer(&self) -> Result<Option<u32>> {
        let path = self.dir.join(CURRENT_POINTER);
        match fs::read_to_string(&path) {
            Ok(content) => {
                let v = content
                    .trim()
                    .parse::<u32>()
                    .with_context(|| format!("malformed pointer {}", path.display()))?;
                Ok(Some(v))
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err).with_context(|| format!("failed to read {}", path.display())),
        }
    }

    fn write_pointer(&self, version: u32) -> Result<()> {
        let path = self.dir.join(CURRENT_POINTER);
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        writeln!(tmp, "{}", version)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path)
            .map_err(|e| anyhow::anyhow!("failed to update {}: {}", path.display(), e.error))?;
        Ok(())
    }
}

pub fn version_file_name(version: u32) -> String {
    format!("{}{:03}{}", VERSION_PREFIX, version, VERSION_SUFFIX)
}

pub fn parse_version_file_name(name: &str) -> Option<u32> {
    let digits = name.strip_prefix(VERSION_PREFIX)?.strip_suffix(VERSION_SUFFIX)?;
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok().filter(|v| *v > 0)
}

struct StoreLock {
    path: PathBuf,
}

impl StoreLock {
    fn acquire(dir: &Path) -> Result<Self> {
        let path = dir.join(LOCK_FILE);
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(mut file) => {
                writeln!(file, "{}", std::process::id())?;
                Ok(Self { path })
            }
            Err(err) if err.kind() == ErrorKind::AlreadyExists => bail!(
                "threshold store {} is locked by another writer (remove {} if stale)",
                dir.display(),
                path.display()
            ),
            Err(err) => {
                Err(err).with_context(|| format!("failed to lock {}", path.display()))
            }
        }
    }
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}
