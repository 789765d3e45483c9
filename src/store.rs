use crate::date_key::DateKey;
use crate::errors::{ImportError, TrackerError, ValidationError};
use crate::models::{clamp_target, Item, ItemId, ItemKind, Progress, MAX_HABIT_COUNT};
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Adjustment {
    pub count: u32,
    pub changed: bool,
    pub reached_target: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ItemStore {
    items: Vec<Item>,
}

impl ItemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_items(items: Vec<Item>) -> Self {
        let mut seen = HashSet::new();
        let items = items
            .into_iter()
            .filter(|item| {
                let fresh = seen.insert(item.id.clone());
                if !fresh {
                    warn!(id = %item.id, "skipping duplicate item id");
                }
                fresh
            })
            .collect();
        Self { items }
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: &ItemId) -> Option<&Item> {
        self.items.iter().find(|item| &item.id == id)
    }

    pub fn active(&self) -> impl Iterator<Item = &Item> {
        self.items.iter().filter(|item| !item.archived)
    }

    pub fn archived(&self) -> impl Iterator<Item = &Item> {
        self.items.iter().filter(|item| item.archived)
    }

    pub fn add_habit(
        &mut self,
        name: &str,
        target: i64,
        now: DateTime<Utc>,
    ) -> Result<&Item, ValidationError> {
        self.add(ItemKind::Habit, name, target, now)
    }

    pub fn add_task(
        &mut self,
        name: &str,
        target: i64,
        now: DateTime<Utc>,
    ) -> Result<&Item, ValidationError> {
        self.add(ItemKind::Task, name, target, now)
    }

    pub fn add(
        &mut self,
        kind: ItemKind,
        name: &str,
        target: i64,
        now: DateTime<Utc>,
    ) -> Result<&Item, ValidationError> {
        let name = validate_name(name)?;
        let mut item = Item::new(kind, name, clamp_target(target), now);
        while self.get(&item.id).is_some() {
            item.id = ItemId::generate();
        }
        self.items.push(item);
        let index = self.items.len() - 1;
        Ok(&self.items[index])
    }

    /// Adds `delta` to the count logged on `today`, clamped to `[0, MAX_HABIT_COUNT]`.
    pub fn adjust_habit_today(
        &mut self,
        id: &ItemId,
        delta: i64,
        today: DateKey,
    ) -> Result<Adjustment, TrackerError> {
        let item = self.get_mut(id)?;
        let Progress::Habit { counts } = &mut item.progress else {
            return Err(kind_mismatch(id, ItemKind::Habit, ItemKind::Task));
        };
        let current = counts.get(&today).copied().unwrap_or(0);
        let next = clamp_count(current, delta, MAX_HABIT_COUNT);
        if next != current {
            counts.insert(today, next);
        }
        Ok(Adjustment {
            count: next,
            changed: next != current,
            reached_target: false,
        })
    }

    /// Adds `delta` to a task's cumulative count, clamped to `[0, target]`.
    pub fn adjust_task_progress(
        &mut self,
        id: &ItemId,
        delta: i64,
    ) -> Result<Adjustment, TrackerError> {
        let item = self.get_mut(id)?;
        let target = item.target;
        let Progress::Task { count } = &mut item.progress else {
            return Err(kind_mismatch(id, ItemKind::Task, ItemKind::Habit));
        };
        let current = *count;
        let next = clamp_count(current, delta, target);
        *count = next;
        Ok(Adjustment {
            count: next,
            changed: next != current,
            reached_target: delta > 0 && next == target,
        })
    }

    pub fn adjust(
        &mut self,
        id: &ItemId,
        delta: i64,
        today: DateKey,
    ) -> Result<Adjustment, TrackerError> {
        match self.get(id).map(Item::kind) {
            Some(ItemKind::Habit) => self.adjust_habit_today(id, delta, today),
            Some(ItemKind::Task) => self.adjust_task_progress(id, delta),
            None => Err(TrackerError::NotFound(id.clone())),
        }
    }

    /// Renames and retargets. A task's count is pulled down to a lowered target.
    pub fn rename(
        &mut self,
        id: &ItemId,
        name: &str,
        target: i64,
    ) -> Result<&Item, TrackerError> {
        let name = validate_name(name)?;
        let item = self.get_mut(id)?;
        item.name = name;
        item.target = clamp_target(target);
        if let Progress::Task { count } = &mut item.progress {
            *count = (*count).min(item.target);
        }
        Ok(&*item)
    }

    pub fn archive(&mut self, id: &ItemId) -> Result<bool, TrackerError> {
        self.set_archived(id, true)
    }

    pub fn restore(&mut self, id: &ItemId) -> Result<bool, TrackerError> {
        self.set_archived(id, false)
    }

    /// Deletes the item. Unknown ids are ignored.
    pub fn remove(&mut self, id: &ItemId) -> Option<Item> {
        let index = self.items.iter().position(|item| &item.id == id)?;
        Some(self.items.remove(index))
    }

    /// Swaps in a whole new sequence. Nothing changes if the ids are not unique.
    pub fn replace_all(&mut self, items: Vec<Item>) -> Result<(), ImportError> {
        let mut seen = HashSet::new();
        for item in &items {
            if !seen.insert(&item.id) {
                return Err(ImportError::DuplicateId(item.id.clone()));
            }
        }
        self.items = items;
        Ok(())
    }

    fn set_archived(&mut self, id: &ItemId, archived: bool) -> Result<bool, TrackerError> {
        let item = self.get_mut(id)?;
        let changed = item.archived != archived;
        item.archived = archived;
        Ok(changed)
    }

    fn get_mut(&mut self, id: &ItemId) -> Result<&mut Item, TrackerError> {
        self.items
            .iter_mut()
            .find(|item| &item.id == id)
            .ok_or_else(|| TrackerError::NotFound(id.clone()))
    }
}

fn validate_name(name: &str) -> Result<String, ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    Ok(trimmed.to_string())
}

fn clamp_count(current: u32, delta: i64, max: u32) -> u32 {
    i64::from(current)
        .saturating_add(delta)
        .clamp(0, i64::from(max)) as u32
}

fn kind_mismatch(id: &ItemId, expected: ItemKind, actual: ItemKind) -> TrackerError {
    TrackerError::KindMismatch {
        id: id.clone(),
        expected,
        actual,
    }
}
