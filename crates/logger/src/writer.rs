//! Rotating file sink
//!
//! Owns the active log file: appends whole records, rotates the file into
//! timestamped backups when it outgrows the size threshold (or on demand),
//! optionally gzip-compresses backups, and prunes old backups by count and
//! age.

use crate::config::LogConfig;
use crate::error::{Error, Result};
use chrono::{Local, NaiveDateTime};
use flate2::Compression;
use flate2::write::GzEncoder;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};

/// Name of the active log file inside the configured directory.
pub(crate) const FILE_NAME: &str = "servicebase.log";

/// Prefix of rotated backup files.
const BACKUP_PREFIX: &str = "servicebase-";

/// Timestamp layout embedded in backup file names; sorts lexically.
const BACKUP_TIMESTAMP: &str = "%Y-%m-%dT%H-%M-%S%.3f";

const BYTES_PER_MB: u64 = 1024 * 1024;

/// Appends records to the active file and rotates it into backups.
#[derive(Debug)]
pub(crate) struct RotatingFileWriter {
    directory: PathBuf,
    path: PathBuf,
    file: Option<File>,
    size: u64,
    max_bytes: u64,
    max_backups: usize,
    max_age_days: u64,
    compress: bool,
    closed: bool,
}

impl RotatingFileWriter {
    /// Creates the log directory if needed and opens the active file for
    /// appending.
    pub(crate) fn open(config: &LogConfig) -> Result<Self> {
        fs::create_dir_all(&config.directory).map_err(|source| Error::CreateDirectory {
            path: config.directory.clone(),
            source,
        })?;

        let path = config.directory.join(FILE_NAME);
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let size = file.metadata()?.len();

        Ok(Self {
            directory: config.directory.clone(),
            path,
            file: Some(file),
            size,
            max_bytes: config.max_size * BYTES_PER_MB,
            max_backups: config.max_backups,
            max_age_days: config.max_age,
            compress: config.compress,
            closed: false,
        })
    }

    /// Appends one record, rotating first when the write would push the
    /// active file past the size threshold.
    ///
    /// After [`close`](Self::close) records are silently dropped.
    pub(crate) fn write_line(&mut self, line: &str) -> Result<()> {
        if self.closed {
            return Ok(());
        }

        let len = line.len() as u64 + 1;
        if self.max_bytes > 0 && self.size > 0 && self.size + len > self.max_bytes {
            self.rotate()?;
        }

        let file = self.file.as_mut().ok_or(Error::Closed)?;
        file.write_all(line.as_bytes())?;
        file.write_all(b"\n")?;
        self.size += len;
        Ok(())
    }

    /// Archives the active file as a timestamped backup and opens a fresh
    /// one, applying the compression and retention policy.
    ///
    /// Rotating an empty active file is a no-op.
    pub(crate) fn rotate(&mut self) -> Result<()> {
        if self.closed {
            return Err(Error::Closed);
        }
        if self.size == 0 {
            return Ok(());
        }

        // The handle must be released before the rename on platforms that
        // lock open files.
        self.file.take();

        let backup = self.backup_path();
        if let Err(e) = fs::rename(&self.path, &backup) {
            self.reopen()?;
            return Err(Error::Rotation(format!(
                "archiving {}: {e}",
                self.path.display()
            )));
        }

        self.reopen()?;

        if self.compress {
            compress_backup(&backup)?;
        }
        self.prune_backups()?;
        Ok(())
    }

    /// Flushes and releases the file handle; later records are dropped.
    pub(crate) fn close(&mut self) {
        if let Some(mut file) = self.file.take() {
            let _ = file.flush();
        }
        self.closed = true;
    }

    fn reopen(&mut self) -> Result<()> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        self.size = file.metadata()?.len();
        self.file = Some(file);
        Ok(())
    }

    fn backup_path(&self) -> PathBuf {
        let ts = Local::now().format(BACKUP_TIMESTAMP).to_string();
        let mut backup = self.directory.join(format!("{BACKUP_PREFIX}{ts}.log"));

        // Two rotations inside one millisecond would collide on the name.
        let mut seq = 1;
        while backup.exists() || gz_sibling(&backup).exists() {
            backup = self.directory.join(format!("{BACKUP_PREFIX}{ts}.{seq}.log"));
            seq += 1;
        }
        backup
    }

    /// Removes backups beyond the configured count and older than the
    /// configured age; zero values disable the respective limit.
    fn prune_backups(&self) -> Result<()> {
        if self.max_backups == 0 && self.max_age_days == 0 {
            return Ok(());
        }

        let mut backups = Vec::new();
        for entry in fs::read_dir(&self.directory)? {
            let entry = entry?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if let Some(ts) = backup_timestamp(name) {
                backups.push((ts, entry.path()));
            }
        }

        // Newest first.
        backups.sort_by(|a, b| b.0.cmp(&a.0));

        let mut expired = Vec::new();
        if self.max_backups > 0 && backups.len() > self.max_backups {
            expired.extend(backups.split_off(self.max_backups));
        }
        if self.max_age_days > 0 {
            let days = i64::try_from(self.max_age_days).unwrap_or(i64::MAX);
            if let Some(age) = chrono::Duration::try_days(days) {
                let cutoff = (Local::now() - age).naive_local();
                expired.extend(backups.into_iter().filter(|(ts, _)| *ts < cutoff));
            }
        }

        for (_, path) in expired {
            if let Err(e) = fs::remove_file(&path) {
                tracing::warn!(path = %path.display(), error = %e, "failed to remove expired log backup");
            }
        }
        Ok(())
    }
}

/// Parses the timestamp out of a backup file name; `None` for files that are
/// not rotated backups.
fn backup_timestamp(name: &str) -> Option<NaiveDateTime> {
    let rest = name.strip_prefix(BACKUP_PREFIX)?;
    let ts = rest
        .strip_suffix(".log")
        .or_else(|| rest.strip_suffix(".log.gz"))?;
    NaiveDateTime::parse_from_str(ts, BACKUP_TIMESTAMP).ok()
}

fn gz_sibling(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".gz");
    PathBuf::from(name)
}

/// Gzip-compresses a rotated backup, replacing it with `<name>.gz`.
fn compress_backup(path: &Path) -> Result<()> {
    let context = |e: io::Error| Error::Rotation(format!("compressing {}: {e}", path.display()));

    let source = File::open(path).map_err(context)?;
    let target = File::create(gz_sibling(path)).map_err(context)?;

    let mut encoder = GzEncoder::new(target, Compression::default());
    io::copy(&mut BufReader::new(source), &mut encoder).map_err(context)?;
    encoder.finish().map_err(context)?;

    fs::remove_file(path).map_err(context)?;
    Ok(())
}
