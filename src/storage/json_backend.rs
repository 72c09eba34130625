use chrono::{DateTime, NaiveDateTime, Utc};
use std::{
    cmp::Reverse,
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, warn};

use crate::{
    core::utils::{ensure_dir, write_atomic, PathResolver},
    errors::{LedgerError, Result},
};

use super::{DocumentKey, DocumentStore};

const DOCUMENT_EXTENSION: &str = "json";
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
const DEFAULT_RETENTION: usize = 5;
const DEFAULT_PREFIX: &str = "ledger";

/// Describes a backup copy of one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupInfo {
    pub key: DocumentKey,
    pub file_name: String,
    pub created_at: Option<DateTime<Utc>>,
    pub path: PathBuf,
}

/// One JSON file per document under `root`, written via temp file + rename.
/// The previous version of a document is copied to `root/backups` before it
/// is replaced, keeping at most `retention` copies per document.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    root: PathBuf,
    backups_dir: PathBuf,
    prefix: String,
    retention: usize,
}

impl JsonFileStore {
    pub fn new(root: PathBuf, prefix: &str) -> Result<Self> {
        Self::with_retention(root, prefix, DEFAULT_RETENTION)
    }

    pub fn with_retention(root: PathBuf, prefix: &str, retention: usize) -> Result<Self> {
        ensure_dir(&root)?;
        let backups_dir = PathResolver::backup_dir_in(&root);
        ensure_dir(&backups_dir)?;
        Ok(Self {
            root,
            backups_dir,
            prefix: canonical_name(prefix),
            retention: retention.max(1),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn document_path(&self, key: DocumentKey) -> PathBuf {
        self.root.join(format!(
            "{}.{}",
            self.document_stem(key),
            DOCUMENT_EXTENSION
        ))
    }

    /// Backups of `key`, newest first.
    pub fn list_backups(&self, key: DocumentKey) -> Result<Vec<BackupInfo>> {
        if !self.backups_dir.exists() {
            return Ok(Vec::new());
        }
        let stem = self.document_stem(key);
        let mut entries = Vec::new();
        for entry in fs::read_dir(&self.backups_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(DOCUMENT_EXTENSION) {
                continue;
            }
            let Some(file_name) = path.file_name().and_then(|name| name.to_str()) else {
                continue;
            };
            let Some(timestamp) = backup_timestamp_part(file_name, &stem) else {
                continue;
            };
            entries.push(BackupInfo {
                key,
                file_name: file_name.to_string(),
                created_at: parse_backup_timestamp(timestamp),
                path: path.clone(),
            });
        }
        entries.sort_by_key(|info| Reverse((info.created_at, info.file_name.clone())));
        Ok(entries)
    }

    /// Puts a backup back in place of the live document.
    pub fn restore_backup(&self, backup: &BackupInfo) -> Result<()> {
        if !backup.path.exists() {
            return Err(LedgerError::Persistence(format!(
                "backup `{}` not found",
                backup.file_name
            )));
        }
        let contents = fs::read_to_string(&backup.path)?;
        self.write(backup.key, &contents)
    }

    fn document_stem(&self, key: DocumentKey) -> String {
        format!("{}_{}", self.prefix, key.as_str())
    }

    fn backup_existing_file(&self, key: DocumentKey, path: &Path) -> Result<()> {
        if !path.exists() {
            return Ok(());
        }
        ensure_dir(&self.backups_dir)?;
        let timestamp = Utc::now().format(BACKUP_TIMESTAMP_FORMAT).to_string();
        let file_name = format!(
            "{}_{}.{}",
            self.document_stem(key),
            timestamp,
            DOCUMENT_EXTENSION
        );
        fs::copy(path, self.backups_dir.join(&file_name))?;
        self.prune_backups(key)
    }

    fn prune_backups(&self, key: DocumentKey) -> Result<()> {
        for entry in self.list_backups(key)?.into_iter().skip(self.retention) {
            if let Err(err) = fs::remove_file(&entry.path) {
                warn!(path = %entry.path.display(), error = %err, "backup not pruned");
            }
        }
        Ok(())
    }
}

impl DocumentStore for JsonFileStore {
    fn read(&self, key: DocumentKey) -> Result<Option<String>> {
        let path = self.document_path(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(path)?))
    }

    fn write(&self, key: DocumentKey, contents: &str) -> Result<()> {
        let path = self.document_path(key);
        self.backup_existing_file(key, &path)?;
        write_atomic(&path, contents)?;
        debug!(document = %key, path = %path.display(), "document written");
        Ok(())
    }

    fn describe(&self) -> String {
        self.root.display().to_string()
    }
}

fn canonical_name(name: &str) -> String {
    let sanitized: String = name
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'a'..='z' | '0'..='9' => c,
            _ => '_',
        })
        .collect();
    if sanitized.trim_matches('_').is_empty() {
        DEFAULT_PREFIX.into()
    } else {
        sanitized
    }
}

/// Extracts `YYYYmmdd_HHMMSS` from `<stem>_<timestamp>.json`.
fn backup_timestamp_part<'a>(file_name: &'a str, stem: &str) -> Option<&'a str> {
    let rest = file_name.strip_prefix(stem)?.strip_prefix('_')?;
    let timestamp = rest.strip_suffix(&format!(".{}", DOCUMENT_EXTENSION))?;
    let (date, time) = timestamp.split_once('_')?;
    if is_digits(date, 8) && is_digits(time, 6) {
        Some(timestamp)
    } else {
        None
    }
}

fn parse_backup_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(raw, BACKUP_TIMESTAMP_FORMAT)
        .ok()
        .map(|naive| DateTime::from_naive_utc_and_offset(naive, Utc))
}

fn is_digits(value: &str, len: usize) -> bool {
    value.len() == len && value.chars().all(|c| c.is_ascii_digit())
}
