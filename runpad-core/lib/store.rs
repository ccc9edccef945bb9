//! Versioned snapshot store.
//!
//! Snapshots are plain files: one directory per note under the persistent
//! root, one file per saved version named by its nanosecond creation
//! timestamp. The filename is both identity and sort key. Nothing is cached
//! in memory; every read re-scans the note's directory, so the history
//! survives process restarts unchanged.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone, Utc};
use getset::Getters;
use tokio::{fs, sync::Mutex};

use crate::{config::StoreConfig, CoreError, CoreResult};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// One immutable saved version of a note's code.
#[derive(Debug, Clone, Getters)]
#[getset(get = "pub with_prefix")]
pub struct Snapshot {
    /// The saved source text.
    content: String,

    /// Creation time; identity and sort key within the note.
    timestamp: DateTime<Utc>,
}

/// Append-only, time-ordered history of code snapshots per note.
pub struct VersionStore {
    root: PathBuf,
    extension: String,
    retention: usize,
    // Highest nanosecond timestamp issued per note. Keeps filenames unique
    // and strictly increasing even when two saves land in the same tick.
    issued: Mutex<HashMap<String, i64>>,
}

//--------------------------------------------------------------------------------------------------
// Implementations
//--------------------------------------------------------------------------------------------------

impl VersionStore {
    /// Store rooted at the configured persistent directory. Snapshot files
    /// carry `extension`.
    pub fn new(config: &StoreConfig, extension: &str) -> Self {
        Self {
            root: config.get_persist_dir().clone(),
            extension: extension.to_string(),
            retention: *config.get_retention(),
            issued: Mutex::new(HashMap::new()),
        }
    }

    /// Persist `content` as the newest snapshot of `note_id` and return the
    /// assigned timestamp. Versions beyond the retention count are pruned
    /// afterwards; pruning failures are logged and never fail the save.
    pub async fn save(&self, note_id: &str, content: &str) -> CoreResult<DateTime<Utc>> {
        validate_note_id(note_id)?;

        let dir = self.root.join(note_id);
        fs::create_dir_all(&dir).await?;

        let nanos = self.next_nanos(note_id).await;
        let path = dir.join(format!("{}.{}", nanos, self.extension));
        fs::write(&path, content).await?;

        if let Err(err) = self.prune(&dir).await {
            tracing::warn!("pruning {} failed: {}", dir.display(), err);
        }

        Ok(Utc.timestamp_nanos(nanos))
    }

    /// All snapshots of `note_id`, newest first. A note that was never
    /// saved yields an empty list, not an error.
    pub async fn list(&self, note_id: &str) -> CoreResult<Vec<Snapshot>> {
        validate_note_id(note_id)?;

        let dir = self.root.join(note_id);
        let mut snapshots = Vec::new();
        for (nanos, path) in self.scan(&dir).await? {
            let content = fs::read_to_string(&path).await?;
            snapshots.push(Snapshot {
                content,
                timestamp: Utc.timestamp_nanos(nanos),
            });
        }

        Ok(snapshots)
    }

    /// The most recent snapshot of `note_id`, if any.
    pub async fn latest(&self, note_id: &str) -> CoreResult<Option<Snapshot>> {
        Ok(self.list(note_id).await?.into_iter().next())
    }

    /// Snapshot entries of a note directory as `(timestamp, path)`, newest
    /// first. A missing directory reads as empty; entries with the snapshot
    /// extension but an unparsable name are corrupt.
    async fn scan(&self, dir: &Path) -> CoreResult<Vec<(i64, PathBuf)>> {
        let mut read_dir = match fs::read_dir(dir).await {
            Ok(read_dir) => read_dir,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        let suffix = format!(".{}", self.extension);
        let mut entries = Vec::new();
        while let Some(entry) = read_dir.next_entry().await? {
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                return Err(CoreError::CorruptSnapshot(entry.path()));
            };
            let Some(stem) = name.strip_suffix(&suffix) else {
                continue;
            };
            let nanos: i64 = stem
                .parse()
                .map_err(|_| CoreError::CorruptSnapshot(entry.path()))?;
            entries.push((nanos, entry.path()));
        }

        entries.sort_by(|a, b| b.0.cmp(&a.0));
        Ok(entries)
    }

    /// Delete versions beyond the retention count, oldest first. Individual
    /// deletion failures are logged and skipped.
    async fn prune(&self, dir: &Path) -> CoreResult<()> {
        let entries = self.scan(dir).await?;
        for (_, path) in entries.into_iter().skip(self.retention) {
            if let Err(err) = fs::remove_file(&path).await {
                tracing::warn!("failed to remove old version {}: {}", path.display(), err);
            }
        }
        Ok(())
    }

    async fn next_nanos(&self, note_id: &str) -> i64 {
        let mut issued = self.issued.lock().await;
        let now = Utc::now().timestamp_nanos_opt().unwrap_or_default();
        let next = match issued.get(note_id) {
            Some(last) => now.max(last + 1),
            None => now,
        };
        issued.insert(note_id.to_string(), next);
        next
    }
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Reject identifiers that are empty or could escape the snapshot root.
fn validate_note_id(note_id: &str) -> CoreResult<()> {
    let ok = !note_id.is_empty()
        && note_id != "."
        && note_id != ".."
        && !note_id.contains(['/', '\\', '\0']);
    if ok {
        Ok(())
    } else {
        Err(CoreError::InvalidNoteId(note_id.to_string()))
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
