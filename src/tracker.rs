use crate::date_key::DateKey;
use crate::errors::TrackerError;
use crate::models::{Item, ItemId, ItemKind};
use crate::storage::{export_snapshot, import_snapshot, Loaded, Storage};
use crate::store::{Adjustment, ItemStore};
use crate::theme::Theme;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use tracing::{error, info, warn};

/// Every mutation that changes the store is saved before the call returns; a
/// failed save is logged and the in-memory change stands.
#[derive(Debug)]
pub struct Tracker {
    store: ItemStore,
    storage: Storage,
    theme: Option<Theme>,
    notice: Option<String>,
    recovered: bool,
    slot_locked: bool,
}

impl Tracker {
    /// A slot that could not be fully read is copied aside before anything can
    /// overwrite it. If the copy fails, the slot is never written this session.
    pub async fn open(storage: Storage) -> Self {
        let loaded = storage.load().await;
        let theme = storage.load_theme().await;
        let recovered = !loaded.is_clean();
        let mut slot_locked = false;
        let notice = if recovered {
            let copy = match storage.back_up(Utc::now()).await {
                Ok(copy) => Some(copy),
                Err(err) => {
                    error!("{err}");
                    slot_locked = true;
                    None
                }
            };
            Some(recovery_notice(&loaded, copy))
        } else {
            None
        };
        let store = ItemStore::from_items(loaded.items);
        info!(items = store.len(), "loaded items");
        Self {
            store,
            storage,
            theme,
            notice,
            recovered,
            slot_locked,
        }
    }

    pub fn items(&self) -> &[Item] {
        self.store.items()
    }

    pub fn theme(&self) -> Option<Theme> {
        self.theme
    }

    pub fn take_notice(&mut self) -> Option<String> {
        self.notice.take()
    }

    /// Fills an empty store with sample items, unless the slot could not be
    /// fully read at startup. Returns whether anything was added.
    pub async fn seed_demo(
        &mut self,
        today: DateKey,
        now: DateTime<Utc>,
    ) -> Result<bool, TrackerError> {
        if self.recovered || !self.store.is_empty() {
            return Ok(false);
        }
        let water = self.store.add_habit("Drink Water", 8, now)?.id().clone();
        self.store.add_habit("Read", 1, now)?;
        let ship = self.store.add_task("Ship Habit App", 5, now)?.id().clone();
        self.store.adjust_habit_today(&water, 3, today)?;
        self.store.adjust_task_progress(&ship, 2)?;
        self.persist().await;
        info!("seeded demo items");
        Ok(true)
    }

    pub async fn add_habit(
        &mut self,
        name: &str,
        target: i64,
        now: DateTime<Utc>,
    ) -> Result<Item, TrackerError> {
        self.add(ItemKind::Habit, name, target, now).await
    }

    pub async fn add_task(
        &mut self,
        name: &str,
        target: i64,
        now: DateTime<Utc>,
    ) -> Result<Item, TrackerError> {
        self.add(ItemKind::Task, name, target, now).await
    }

    pub async fn add(
        &mut self,
        kind: ItemKind,
        name: &str,
        target: i64,
        now: DateTime<Utc>,
    ) -> Result<Item, TrackerError> {
        let item = self.store.add(kind, name, target, now)?.clone();
        self.persist().await;
        info!(id = %item.id(), %kind, "added item");
        Ok(item)
    }

    pub async fn adjust(
        &mut self,
        id: &ItemId,
        delta: i64,
        today: DateKey,
    ) -> Result<(Item, Adjustment), TrackerError> {
        let adjustment = self.store.adjust(id, delta, today)?;
        if adjustment.changed {
            self.persist().await;
        }
        Ok((self.item(id)?, adjustment))
    }

    pub async fn rename(
        &mut self,
        id: &ItemId,
        name: &str,
        target: i64,
    ) -> Result<Item, TrackerError> {
        let item = self.store.rename(id, name, target)?.clone();
        self.persist().await;
        Ok(item)
    }

    pub async fn archive(&mut self, id: &ItemId) -> Result<Item, TrackerError> {
        if self.store.archive(id)? {
            self.persist().await;
        }
        self.item(id)
    }

    pub async fn restore(&mut self, id: &ItemId) -> Result<Item, TrackerError> {
        if self.store.restore(id)? {
            self.persist().await;
        }
        self.item(id)
    }

    pub async fn remove(&mut self, id: &ItemId) -> Option<Item> {
        let removed = self.store.remove(id)?;
        self.persist().await;
        info!(%id, "removed item");
        Some(removed)
    }

    pub async fn import(&mut self, bytes: &[u8]) -> Result<usize, TrackerError> {
        let items = import_snapshot(bytes)?;
        self.store.replace_all(items)?;
        self.persist().await;
        info!(items = self.store.len(), "imported snapshot");
        Ok(self.store.len())
    }

    pub fn export(&self) -> Result<Vec<u8>, serde_json::Error> {
        export_snapshot(self.store.items())
    }

    pub async fn set_theme(&mut self, theme: Theme) -> Theme {
        self.theme = Some(theme);
        if let Err(err) = self.storage.save_theme(theme).await {
            error!("failed to save theme: {err}");
        }
        theme
    }

    /// With nothing stored yet, dark is assumed current.
    pub async fn toggle_theme(&mut self) -> Theme {
        let next = self.theme.unwrap_or(Theme::Dark).toggled();
        self.set_theme(next).await
    }

    fn item(&self, id: &ItemId) -> Result<Item, TrackerError> {
        self.store
            .get(id)
            .cloned()
            .ok_or_else(|| TrackerError::NotFound(id.clone()))
    }

    async fn persist(&self) {
        if self.slot_locked {
            warn!("not saving items over a slot that could not be copied aside");
            return;
        }
        if let Err(err) = self.storage.save(self.store.items()).await {
            error!("failed to save items: {err}");
        }
    }
}

fn recovery_notice(loaded: &Loaded, copy: Option<PathBuf>) -> String {
    let what = match &loaded.problem {
        Some(err) => format!("Saved data could not be read ({err})"),
        None => format!("{} saved item(s) could not be read and were left out", loaded.skipped),
    };
    match copy {
        Some(copy) => format!("{what}. The original file was kept at {}", copy.display()),
        None => format!("{what}. The original file could not be copied, so changes will not be saved"),
    }
}
