use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeDelta, Utc};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use super::error::{NotifyError, Result};
use super::types::Notification;

/// Extension of notification record files.
const RECORD_EXTENSION: &str = "json";

/// Directory of notification records, one `<id>.json` file per notification.
///
/// Several hook processes may write and sweep the same directory at once.
/// Records are written atomically and every read tolerates files that
/// vanish between listing and opening.
#[derive(Debug, Clone)]
pub struct NotificationStore {
    dir: PathBuf,
}

/// Result of a retention sweep.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SweepReport {
    /// Records removed because they were too old.
    pub expired: usize,
    /// Records removed because they could not be parsed.
    pub corrupted: usize,
    /// Records kept.
    pub kept: usize,
    /// Records that should have been removed but could not be.
    pub failed: usize,
}

impl SweepReport {
    pub fn removed(&self) -> usize {
        self.expired + self.corrupted
    }
}

impl NotificationStore {
    /// Opens the store at `dir`, creating the directory if it doesn't exist.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| NotifyError::io(&dir, e))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the file path for a notification ID.
    ///
    /// Rejects IDs with path separators to prevent path traversal.
    pub fn record_path(&self, id: &str) -> Result<PathBuf> {
        if id.is_empty() || id.contains('/') || id.contains('\\') || id.contains("..") {
            return Err(NotifyError::InvalidId(id.to_string()));
        }
        Ok(self.dir.join(format!("{id}.{RECORD_EXTENSION}")))
    }

    /// Writes `notification` to `<id>.json` via a temporary file and rename.
    pub fn save(&self, notification: &Notification) -> Result<PathBuf> {
        let path = self.record_path(&notification.id)?;
        let content =
            serde_json::to_string_pretty(notification).map_err(NotifyError::Serialize)?;

        let mut temp = NamedTempFile::new_in(&self.dir).map_err(|e| NotifyError::io(&self.dir, e))?;
        temp.write_all(content.as_bytes())
            .and_then(|()| temp.as_file().sync_all())
            .map_err(|e| NotifyError::io(temp.path(), e))?;
        temp.persist(&path)
            .map_err(|e| NotifyError::io(&path, e.error))?;

        Ok(path)
    }

    /// Loads a notification by ID. Returns `Ok(None)` if it doesn't exist
    /// and `CorruptRecord` if the file exists but cannot be parsed.
    pub fn load(&self, id: &str) -> Result<Option<Notification>> {
        let path = self.record_path(id)?;
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(NotifyError::io(&path, e)),
        };
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|source| NotifyError::CorruptRecord { path, source })
    }

    /// Lists all parsable notifications, newest first.
    pub fn list(&self) -> Result<Vec<Notification>> {
        let mut notifications: Vec<Notification> = self
            .record_files()?
            .iter()
            .filter_map(|path| fs::read_to_string(path).ok())
            .filter_map(|content| serde_json::from_str(&content).ok())
            .collect();

        notifications.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(notifications)
    }

    /// Removes records older than `max_age` as of `now`, and records that
    /// cannot be parsed. Files deleted concurrently are skipped silently.
    pub fn sweep(&self, max_age: TimeDelta, now: DateTime<Utc>) -> Result<SweepReport> {
        let mut report = SweepReport::default();

        for path in self.record_files()? {
            let content = match fs::read_to_string(&path) {
                Ok(content) => content,
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "failed to read notification");
                    report.failed += 1;
                    continue;
                }
            };

            match serde_json::from_str::<Notification>(&content) {
                Ok(notification) if now - notification.timestamp > max_age => {
                    if remove_record(&path) {
                        report.expired += 1;
                    } else {
                        report.failed += 1;
                    }
                }
                Ok(_) => report.kept += 1,
                Err(e) => {
                    debug!(path = %path.display(), error = %e, "removing unparsable notification");
                    if remove_record(&path) {
                        report.corrupted += 1;
                    } else {
                        report.failed += 1;
                    }
                }
            }
        }

        Ok(report)
    }

    /// Paths of all `*.json` files in the store.
    fn record_files(&self) -> Result<Vec<PathBuf>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(NotifyError::io(&self.dir, e)),
        };

        Ok(entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.extension().is_some_and(|ext| ext == RECORD_EXTENSION))
            .collect())
    }
}

/// Deletes a record file. A file that is already gone counts as deleted.
fn remove_record(path: &Path) -> bool {
    match fs::remove_file(path) {
        Ok(()) => true,
        Err(e) if e.kind() == ErrorKind::NotFound => true,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to remove notification");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::types::SessionContext;
    use crate::testing::factories::notification_at;
    use chrono::TimeZone;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    struct TempStore {
        #[expect(dead_code, reason = "kept alive to prevent cleanup until dropped")]
        temp_dir: TempDir,
        store: NotificationStore,
    }

    #[fixture]
    fn temp_store() -> TempStore {
        let temp_dir = TempDir::new().unwrap();
        let store = NotificationStore::open(temp_dir.path().join("notifications")).unwrap();
        TempStore { temp_dir, store }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap()
    }

    #[rstest]
    fn open_creates_directory(temp_store: TempStore) {
        assert!(temp_store.store.dir().is_dir());
    }

    #[rstest]
    fn save_then_load_round_trips_every_field(temp_store: TempStore) {
        let mut notification = notification_at("round-trip", now());
        notification.message = "Tests failed: 3 errors".to_string();
        notification.is_immediate = true;
        notification.transcript_path = "/tmp/t.jsonl".to_string();
        notification.session = Some(SessionContext::from_location("main:1.2", "edit", "%4"));

        let path = temp_store.store.save(&notification).unwrap();
        let loaded = temp_store.store.load("round-trip").unwrap();

        assert_eq!(path, temp_store.store.dir().join("round-trip.json"));
        assert_eq!(loaded, Some(notification));
    }

    #[rstest]
    fn save_leaves_no_temporary_files(temp_store: TempStore) {
        temp_store.store.save(&notification_at("only", now())).unwrap();

        let names: Vec<_> = fs::read_dir(temp_store.store.dir())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec!["only.json"]);
    }

    #[rstest]
    fn load_missing_returns_none(temp_store: TempStore) {
        assert_eq!(temp_store.store.load("missing").unwrap(), None);
    }

    #[rstest]
    fn load_corrupt_record_is_an_error(temp_store: TempStore) {
        let path = temp_store.store.dir().join("broken.json");
        fs::write(&path, "{\"id\":").unwrap();

        let err = temp_store.store.load("broken").unwrap_err();

        assert!(matches!(err, NotifyError::CorruptRecord { path: p, .. } if p == path));
    }

    #[rstest]
    #[case::parent_dir("../etc/passwd")]
    #[case::slash("foo/bar")]
    #[case::backslash("foo\\bar")]
    #[case::dots("..")]
    #[case::empty("")]
    fn record_path_rejects_unsafe_ids(temp_store: TempStore, #[case] id: &str) {
        assert!(matches!(
            temp_store.store.record_path(id),
            Err(NotifyError::InvalidId(_))
        ));
    }

    #[rstest]
    fn list_returns_newest_first_and_skips_garbage(temp_store: TempStore) {
        let store = &temp_store.store;
        store.save(&notification_at("old", now() - TimeDelta::hours(2))).unwrap();
        store.save(&notification_at("new", now())).unwrap();
        fs::write(store.dir().join("broken.json"), "{").unwrap();
        fs::write(store.dir().join("hook-debug.log"), "log line").unwrap();

        let ids: Vec<_> = store.list().unwrap().into_iter().map(|n| n.id).collect();

        assert_eq!(ids, vec!["new", "old"]);
    }

    #[rstest]
    fn sweep_removes_records_past_retention(temp_store: TempStore) {
        let store = &temp_store.store;
        store.save(&notification_at("stale", now() - TimeDelta::hours(25))).unwrap();
        store.save(&notification_at("fresh", now() - TimeDelta::hours(23))).unwrap();

        let report = store.sweep(TimeDelta::hours(24), now()).unwrap();

        assert_eq!(
            report,
            SweepReport {
                expired: 1,
                corrupted: 0,
                kept: 1,
                failed: 0
            }
        );
        assert_eq!(store.load("stale").unwrap(), None);
        assert!(store.load("fresh").unwrap().is_some());
    }

    #[rstest]
    #[case::truncated("{\"id\":")]
    #[case::empty("")]
    #[case::missing_timestamp(r#"{"id":"x","type":"error","message":"m","cwd":"","session_id":"","is_immediate":true}"#)]
    #[case::bad_timestamp(r#"{"id":"x","timestamp":"soon","type":"error","message":"m","cwd":"","session_id":"","is_immediate":true}"#)]
    fn sweep_treats_corrupted_records_as_expired(temp_store: TempStore, #[case] content: &str) {
        let path = temp_store.store.dir().join("corrupt.json");
        fs::write(&path, content).unwrap();

        let report = temp_store.store.sweep(TimeDelta::hours(24), now()).unwrap();

        assert_eq!(report.corrupted, 1);
        assert_eq!(report.removed(), 1);
        assert!(!path.exists());
    }

    #[rstest]
    fn sweep_ignores_non_record_files(temp_store: TempStore) {
        let log = temp_store.store.dir().join("hook-debug.log");
        fs::write(&log, "not json").unwrap();

        let report = temp_store.store.sweep(TimeDelta::hours(24), now()).unwrap();

        assert_eq!(report, SweepReport::default());
        assert!(log.exists());
    }

    #[rstest]
    fn sweep_ages_legacy_naive_timestamps(temp_store: TempStore) {
        let path = temp_store.store.dir().join("legacy.json");
        fs::write(
            &path,
            r#"{"id":"legacy","timestamp":"2020-01-01T00:00:00.000000","type":"Stop",
                "message":"done","cwd":"/repo","session_id":"s","is_immediate":true,"read":true}"#,
        )
        .unwrap();

        let report = temp_store.store.sweep(TimeDelta::hours(24), now()).unwrap();

        assert_eq!(report.expired, 1);
        assert!(!path.exists());
    }

    /// A dangling link is listed like a record but reads as NotFound,
    /// the same as a record deleted by a concurrent sweep.
    #[cfg(unix)]
    #[rstest]
    fn sweep_skips_records_that_vanish_before_reading(temp_store: TempStore) {
        let store = &temp_store.store;
        store.save(&notification_at("fresh", now())).unwrap();
        std::os::unix::fs::symlink(
            store.dir().join("deleted-elsewhere.json"),
            store.dir().join("vanished.json"),
        )
        .unwrap();

        let report = store.sweep(TimeDelta::hours(24), now()).unwrap();

        assert_eq!(
            report,
            SweepReport {
                expired: 0,
                corrupted: 0,
                kept: 1,
                failed: 0
            }
        );
    }

    #[test]
    fn sweep_on_vanished_directory_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let store = NotificationStore::open(temp_dir.path().join("gone")).unwrap();
        fs::remove_dir(store.dir()).unwrap();

        let report = store.sweep(TimeDelta::hours(24), now()).unwrap();

        assert_eq!(report, SweepReport::default());
    }

    #[test]
    fn remove_record_treats_missing_file_as_removed() {
        let temp_dir = TempDir::new().unwrap();
        assert!(remove_record(&temp_dir.path().join("already-gone.json")));
    }
}
