use crate::date_key::DateKey;
use crate::errors::{ImportError, StorageError};
use crate::models::Item;
use crate::theme::Theme;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, error, warn};

/// Outcome of reading the item slot. `items` is empty whenever `problem` is set.
#[derive(Debug, Default)]
pub struct Loaded {
    pub items: Vec<Item>,
    pub skipped: usize,
    pub problem: Option<StorageError>,
}

impl Loaded {
    pub fn is_clean(&self) -> bool {
        self.skipped == 0 && self.problem.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct Storage {
    items_path: PathBuf,
    theme_path: PathBuf,
}

impl Storage {
    pub fn new(items_path: impl Into<PathBuf>, theme_path: impl Into<PathBuf>) -> Self {
        Self {
            items_path: items_path.into(),
            theme_path: theme_path.into(),
        }
    }

    pub fn items_path(&self) -> &Path {
        &self.items_path
    }

    pub fn theme_path(&self) -> &Path {
        &self.theme_path
    }

    /// Reads the item slot. A missing slot is an empty list; an unreadable one or
    /// one that is not an array is also an empty list, with the failure in `problem`.
    pub async fn load(&self) -> Loaded {
        self.try_load().await.unwrap_or_else(|err| {
            error!("{err}");
            Loaded {
                problem: Some(err),
                ..Loaded::default()
            }
        })
    }

    pub async fn try_load(&self) -> Result<Loaded, StorageError> {
        match fs::read(&self.items_path).await {
            Ok(bytes) => {
                let (items, skipped) =
                    read_slot(&bytes).map_err(|source| StorageError::Parse {
                        path: self.items_path.clone(),
                        source,
                    })?;
                Ok(Loaded {
                    items,
                    skipped,
                    problem: None,
                })
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Loaded::default()),
            Err(source) => Err(StorageError::Read {
                path: self.items_path.clone(),
                source,
            }),
        }
    }

    pub async fn save(&self, items: &[Item]) -> Result<(), StorageError> {
        let payload = serde_json::to_vec_pretty(items)?;
        write_replace(&self.items_path, &payload).await?;
        debug!(count = items.len(), path = %self.items_path.display(), "saved items");
        Ok(())
    }

    pub async fn load_theme(&self) -> Option<Theme> {
        match fs::read_to_string(&self.theme_path).await {
            Ok(raw) => match raw.parse() {
                Ok(theme) => Some(theme),
                Err(err) => {
                    warn!("ignoring stored theme: {err}");
                    None
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => None,
            Err(err) => {
                warn!("failed to read theme file: {err}");
                None
            }
        }
    }

    pub async fn save_theme(&self, theme: Theme) -> Result<(), StorageError> {
        write_replace(&self.theme_path, theme.as_str().as_bytes()).await
    }

    pub async fn back_up(&self, now: DateTime<Utc>) -> Result<PathBuf, StorageError> {
        let mut copy = self.items_path.as_os_str().to_owned();
        copy.push(format!(".unreadable-{}", now.format("%Y%m%dT%H%M%S%.3f")));
        let copy = PathBuf::from(copy);
        fs::copy(&self.items_path, &copy)
            .await
            .map_err(|source| StorageError::Backup {
                path: copy.clone(),
                source,
            })?;
        warn!(path = %copy.display(), "kept a copy of the item slot");
        Ok(copy)
    }
}

async fn write_replace(path: &Path, payload: &[u8]) -> Result<(), StorageError> {
    let mut staging = path.as_os_str().to_owned();
    staging.push(".tmp");
    let staging = PathBuf::from(staging);
    let write_err = |source| StorageError::Write {
        path: path.to_path_buf(),
        source,
    };
    fs::write(&staging, payload).await.map_err(write_err)?;
    fs::rename(&staging, path).await.map_err(write_err)?;
    Ok(())
}

pub fn export_snapshot(items: &[Item]) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec_pretty(items)
}

pub fn export_filename(date: DateKey) -> String {
    format!("pixel-habits-{date}.json")
}

pub fn import_snapshot(bytes: &[u8]) -> Result<Vec<Item>, ImportError> {
    parse_records(bytes)?
        .into_iter()
        .enumerate()
        .map(|(index, record)| {
            serde_json::from_value(record)
                .map_err(|source| ImportError::InvalidRecord { index, source })
        })
        .collect()
}

fn read_slot(bytes: &[u8]) -> Result<(Vec<Item>, usize), ImportError> {
    let mut skipped = 0;
    let items = parse_records(bytes)?
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| match serde_json::from_value(record) {
            Ok(item) => Some(item),
            Err(err) => {
                warn!(index, "leaving out unreadable stored record: {err}");
                skipped += 1;
                None
            }
        })
        .collect();
    Ok((items, skipped))
}

fn parse_records(bytes: &[u8]) -> Result<Vec<Value>, ImportError> {
    match serde_json::from_slice(bytes).map_err(ImportError::Syntax)? {
        Value::Array(records) => Ok(records),
        _ => Err(ImportError::NotAnArray),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ItemKind;
    use crate::store::ItemStore;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn unique_path(name: &str) -> PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let mut path = std::env::temp_dir();
        path.push(format!("pixel_habits_{name}_{}_{nanos}", std::process::id()));
        path
    }

    fn storage() -> Storage {
        Storage::new(unique_path("items.json"), unique_path("theme"))
    }

    fn sample() -> Vec<Item> {
        let mut store = ItemStore::new();
        let habit = store.add_habit("Drink Water", 8, Utc::now()).unwrap().id().clone();
        let task = store.add_task("Ship App", 5, Utc::now()).unwrap().id().clone();
        store.adjust_habit_today(&habit, 3, DateKey::today()).unwrap();
        store.adjust_task_progress(&task, 2).unwrap();
        store.archive(&task).unwrap();
        store.items().to_vec()
    }

    #[test]
    fn export_then_import_preserves_items() {
        let items = sample();
        let blob = export_snapshot(&items).unwrap();
        assert!(String::from_utf8_lossy(&blob).contains("\n  {"));
        assert_eq!(import_snapshot(&blob).unwrap(), items);
    }

    #[test]
    fn import_rejects_non_arrays() {
        assert!(matches!(
            import_snapshot(b"{not an array}"),
            Err(ImportError::Syntax(_))
        ));
        assert!(matches!(
            import_snapshot(br#"{"id": "x"}"#),
            Err(ImportError::NotAnArray)
        ));
    }

    #[test]
    fn import_reports_the_bad_record() {
        let blob = br#"[{"id":"a","type":"habit","name":"ok","target":1},{"id":"b","name":"no type"}]"#;
        assert!(matches!(
            import_snapshot(blob),
            Err(ImportError::InvalidRecord { index: 1, .. })
        ));
    }

    #[test]
    fn slot_leaves_out_bad_records_that_import_rejects() {
        let blob = br#"[{"id":"a","type":"habit","name":"ok","target":1},{"id":"b","name":"no type"},7]"#;
        let (items, skipped) = read_slot(blob).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name(), "ok");
        assert_eq!(skipped, 2);
        assert!(import_snapshot(blob).is_err());

        assert!(matches!(read_slot(br#"{"a": 1}"#), Err(ImportError::NotAnArray)));
    }

    #[test]
    fn export_filename_carries_the_date() {
        let date = "2026-10-18".parse().unwrap();
        assert_eq!(export_filename(date), "pixel-habits-2026-10-18.json");
    }

    #[tokio::test]
    async fn missing_slot_loads_empty_without_problem() {
        let loaded = storage().load().await;
        assert!(loaded.items.is_empty());
        assert!(loaded.problem.is_none());
    }

    #[tokio::test]
    async fn corrupt_slot_loads_empty_with_problem() {
        let storage = storage();
        fs::write(storage.items_path(), b"{{{ nope").await.unwrap();
        let loaded = storage.load().await;
        assert!(loaded.items.is_empty());
        assert!(matches!(loaded.problem, Some(StorageError::Parse { .. })));
        fs::remove_file(storage.items_path()).await.unwrap();
    }

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let storage = storage();
        let items = sample();
        storage.save(&items).await.unwrap();
        assert_eq!(storage.try_load().await.unwrap().items, items);

        storage.save(&items[..1]).await.unwrap();
        assert_eq!(storage.try_load().await.unwrap().items.len(), 1);
        fs::remove_file(storage.items_path()).await.unwrap();
    }

    #[tokio::test]
    async fn partly_readable_slot_is_not_clean() {
        let storage = storage();
        let blob = r#"[{"id":"a","type":"task","name":"keep","target":3,"progress":{"__task":1.5}},{"id":"b"}]"#;
        fs::write(storage.items_path(), blob).await.unwrap();
        let loaded = storage.load().await;
        assert_eq!(loaded.items.len(), 1);
        assert_eq!(loaded.items[0].task_count(), 2);
        assert_eq!(loaded.skipped, 1);
        assert!(loaded.problem.is_none());
        assert!(!loaded.is_clean());
        fs::remove_file(storage.items_path()).await.unwrap();
    }

    #[tokio::test]
    async fn back_up_copies_the_slot_verbatim() {
        let storage = storage();
        fs::write(storage.items_path(), b"half a [file").await.unwrap();
        let copy = storage.back_up(Utc::now()).await.unwrap();
        assert_eq!(fs::read(&copy).await.unwrap(), b"half a [file");
        assert!(copy.to_string_lossy().contains(".unreadable-"));
        fs::remove_file(&copy).await.unwrap();
        fs::remove_file(storage.items_path()).await.unwrap();

        assert!(matches!(
            storage.back_up(Utc::now()).await,
            Err(StorageError::Backup { .. })
        ));
    }

    #[tokio::test]
    async fn theme_slot_round_trips() {
        let storage = storage();
        assert_eq!(storage.load_theme().await, None);
        storage.save_theme(Theme::Light).await.unwrap();
        assert_eq!(storage.load_theme().await, Some(Theme::Light));
        fs::write(storage.theme_path(), "purple").await.unwrap();
        assert_eq!(storage.load_theme().await, None);
        fs::remove_file(storage.theme_path()).await.unwrap();
    }

    #[tokio::test]
    async fn save_to_missing_directory_fails_with_write_error() {
        let mut dir = unique_path("nodir");
        dir.push("items.json");
        let storage = Storage::new(dir, unique_path("theme"));
        assert!(matches!(
            storage.save(&[]).await,
            Err(StorageError::Write { .. })
        ));
    }

    fn item_spec() -> impl Strategy<Value = (bool, String, i64, Vec<(u64, i64)>, bool)> {
        (
            any::<bool>(),
            "[A-Za-z][A-Za-z ]{0,11}",
            -3i64..40,
            prop::collection::vec((0u64..30, -5i64..60), 0..6),
            any::<bool>(),
        )
    }

    proptest! {
        #[test]
        fn import_of_export_gives_back_the_same_items(specs in prop::collection::vec(item_spec(), 0..12)) {
            let today = DateKey::new(NaiveDate::from_ymd_opt(2026, 10, 18).unwrap());
            let mut store = ItemStore::new();
            for (is_task, name, target, deltas, archived) in specs {
                let kind = if is_task { ItemKind::Task } else { ItemKind::Habit };
                let id = store.add(kind, &name, target, Utc::now()).unwrap().id().clone();
                for (days_back, delta) in deltas {
                    let day = today.days_before(days_back).unwrap();
                    let adjusted = match kind {
                        ItemKind::Habit => store.adjust_habit_today(&id, delta, day),
                        ItemKind::Task => store.adjust_task_progress(&id, delta),
                    };
                    adjusted.unwrap();
                }
                if archived {
                    store.archive(&id).unwrap();
                }
            }
            let items = store.items().to_vec();
            let blob = export_snapshot(&items).unwrap();
            prop_assert_eq!(import_snapshot(&blob).unwrap(), items);
        }
    }
}
