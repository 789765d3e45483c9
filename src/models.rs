use crate::date_key::DateKey;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::{collections::BTreeMap, fmt};
use tracing::warn;
use uuid::Uuid;

/// Upper bound for a single day's habit count.
pub const MAX_HABIT_COUNT: u32 = 9999;

const TASK_PROGRESS_KEY: &str = "__task";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ItemId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ItemId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Habit,
    Task,
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Habit => f.write_str("habit"),
            Self::Task => f.write_str("task"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Progress {
    Habit { counts: BTreeMap<DateKey, u32> },
    Task { count: u32 },
}

impl Progress {
    pub fn empty(kind: ItemKind) -> Self {
        match kind {
            ItemKind::Habit => Self::Habit {
                counts: BTreeMap::new(),
            },
            ItemKind::Task => Self::Task { count: 0 },
        }
    }

    pub fn kind(&self) -> ItemKind {
        match self {
            Self::Habit { .. } => ItemKind::Habit,
            Self::Task { .. } => ItemKind::Task,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "StoredItem", from = "StoredItem")]
pub struct Item {
    pub(crate) id: ItemId,
    pub(crate) name: String,
    pub(crate) target: u32,
    pub(crate) progress: Progress,
    pub(crate) archived: bool,
    pub(crate) created_at: DateTime<Utc>,
}

impl Item {
    pub(crate) fn new(kind: ItemKind, name: String, target: u32, created_at: DateTime<Utc>) -> Self {
        Self {
            id: ItemId::generate(),
            name,
            target,
            progress: Progress::empty(kind),
            archived: false,
            created_at,
        }
    }

    pub fn id(&self) -> &ItemId {
        &self.id
    }

    pub fn kind(&self) -> ItemKind {
        self.progress.kind()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn target(&self) -> u32 {
        self.target
    }

    pub fn progress(&self) -> &Progress {
        &self.progress
    }

    pub fn is_archived(&self) -> bool {
        self.archived
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn count_on(&self, day: DateKey) -> u32 {
        match &self.progress {
            Progress::Habit { counts } => counts.get(&day).copied().unwrap_or(0),
            Progress::Task { .. } => 0,
        }
    }

    pub fn task_count(&self) -> u32 {
        match self.progress {
            Progress::Task { count } => count,
            Progress::Habit { .. } => 0,
        }
    }
}

pub(crate) fn clamp_target(target: i64) -> u32 {
    target.clamp(1, i64::from(u32::MAX)) as u32
}

/// Numbers are read wide and normalized on the way in; a fractional value is
/// rounded to the nearest integer.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredItem {
    id: ItemId,
    #[serde(rename = "type")]
    kind: ItemKind,
    name: String,
    target: WholeNumber,
    #[serde(default)]
    progress: BTreeMap<String, WholeNumber>,
    #[serde(default)]
    archived: bool,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(transparent)]
struct WholeNumber(i64);

impl<'de> Deserialize<'de> for WholeNumber {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let number = serde_json::Number::deserialize(deserializer)?;
        let whole = match (number.as_i64(), number.as_f64()) {
            (Some(whole), _) => whole,
            (None, Some(float)) => float.round() as i64,
            (None, None) => return Err(serde::de::Error::custom(format!("unusable number {number}"))),
        };
        Ok(Self(whole))
    }
}

impl From<Item> for StoredItem {
    fn from(item: Item) -> Self {
        let kind = item.kind();
        let progress = match item.progress {
            Progress::Habit { counts } => counts
                .into_iter()
                .map(|(day, count)| (day.to_string(), WholeNumber(i64::from(count))))
                .collect(),
            Progress::Task { count } => {
                BTreeMap::from([(TASK_PROGRESS_KEY.to_string(), WholeNumber(i64::from(count)))])
            }
        };
        Self {
            id: item.id,
            kind,
            name: item.name,
            target: WholeNumber(i64::from(item.target)),
            progress,
            archived: item.archived,
            created_at: Some(item.created_at),
        }
    }
}

impl From<StoredItem> for Item {
    fn from(stored: StoredItem) -> Self {
        let target = clamp_target(stored.target.0);
        let progress = match stored.kind {
            ItemKind::Habit => {
                let mut counts = BTreeMap::new();
                for (key, value) in stored.progress {
                    match key.parse::<DateKey>() {
                        Ok(day) => {
                            let count = value.0.clamp(0, i64::from(MAX_HABIT_COUNT));
                            counts.insert(day, count as u32);
                        }
                        Err(err) => warn!(id = %stored.id, "dropping habit progress entry: {err}"),
                    }
                }
                Progress::Habit { counts }
            }
            ItemKind::Task => {
                let count = stored.progress.get(TASK_PROGRESS_KEY).map_or(0, |value| value.0);
                Progress::Task {
                    count: count.clamp(0, i64::from(target)) as u32,
                }
            }
        };
        let name = match stored.name.trim() {
            "" => "Untitled".to_string(),
            trimmed => trimmed.to_string(),
        };
        Self {
            id: stored.id,
            name,
            target,
            progress,
            archived: stored.archived,
            created_at: stored.created_at.unwrap_or_else(Utc::now),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct NewItemRequest {
    #[serde(rename = "type")]
    pub kind: ItemKind,
    pub name: String,
    pub target: i64,
}

#[derive(Debug, Deserialize)]
pub struct AdjustRequest {
    pub delta: i64,
}

#[derive(Debug, Deserialize)]
pub struct RenameRequest {
    pub name: String,
    pub target: i64,
}

#[derive(Debug, Serialize)]
pub struct AdjustResponse {
    pub item: Item,
    pub count: u32,
    pub percent: u8,
    pub reached_target: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ImportResponse {
    pub imported: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DayMark {
    pub date: DateKey,
    pub count: u32,
    pub met: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Arena {
    pub percent: u8,
    pub hearts: u8,
    pub hearts_filled: u8,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ItemView {
    pub id: ItemId,
    #[serde(rename = "type")]
    pub kind: ItemKind,
    pub name: String,
    pub target: u32,
    pub archived: bool,
    /// Today's count for a habit, cumulative count for a task.
    pub count: u32,
    pub percent: u8,
    pub week: Vec<DayMark>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SummaryResponse {
    pub today: DateKey,
    pub overall_percent: u8,
    pub arena: Arena,
    pub items: Vec<ItemView>,
    pub notice: Option<String>,
}
