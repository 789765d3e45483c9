use crate::date_key::{last_n_days_from, DateKey};
use crate::models::{Arena, DayMark, Item, ItemKind, ItemView, SummaryResponse};

pub const WINDOW_DAYS: usize = 7;

pub const HEARTS: u8 = 10;

pub fn habit_percent(item: &Item) -> u8 {
    habit_percent_at(item, DateKey::today())
}

pub fn habit_percent_at(item: &Item, today: DateKey) -> u8 {
    ratio_percent(item.count_on(today), item.target())
}

pub fn task_percent(item: &Item) -> u8 {
    ratio_percent(item.task_count(), item.target())
}

pub fn item_percent_at(item: &Item, today: DateKey) -> u8 {
    match item.kind() {
        ItemKind::Habit => habit_percent_at(item, today),
        ItemKind::Task => task_percent(item),
    }
}

pub fn overall_percent(items: &[Item]) -> u8 {
    overall_percent_at(items, DateKey::today())
}

/// Mean completion over non-archived items; zero when none are active.
pub fn overall_percent_at(items: &[Item], today: DateKey) -> u8 {
    let (sum, active) = items
        .iter()
        .filter(|item| !item.is_archived())
        .fold((0u32, 0u32), |(sum, active), item| {
            (sum + u32::from(item_percent_at(item, today)), active + 1)
        });
    if active == 0 {
        return 0;
    }
    (f64::from(sum) / f64::from(active)).round() as u8
}

pub fn habit_week(item: &Item, today: DateKey) -> Vec<DayMark> {
    let goal = item.target().max(1);
    last_n_days_from(today, WINDOW_DAYS)
        .into_iter()
        .map(|date| {
            let count = item.count_on(date);
            DayMark {
                date,
                count,
                met: count >= goal,
            }
        })
        .collect()
}

pub fn arena(percent: u8) -> Arena {
    let percent = percent.min(100);
    let filled = (f64::from(percent) / 100.0 * f64::from(HEARTS)).round() as u8;
    Arena {
        percent,
        hearts: HEARTS,
        hearts_filled: filled,
    }
}

pub fn item_view(item: &Item, today: DateKey) -> ItemView {
    let (count, week) = match item.kind() {
        ItemKind::Habit => (item.count_on(today), habit_week(item, today)),
        ItemKind::Task => (item.task_count(), Vec::new()),
    };
    ItemView {
        id: item.id().clone(),
        kind: item.kind(),
        name: item.name().to_string(),
        target: item.target(),
        archived: item.is_archived(),
        count,
        percent: item_percent_at(item, today),
        week,
    }
}

pub fn build_summary_at(today: DateKey, items: &[Item], notice: Option<String>) -> SummaryResponse {
    let overall_percent = overall_percent_at(items, today);
    SummaryResponse {
        today,
        overall_percent,
        arena: arena(overall_percent),
        items: items.iter().map(|item| item_view(item, today)).collect(),
        notice,
    }
}

fn ratio_percent(count: u32, target: u32) -> u8 {
    let ratio = (f64::from(count) / f64::from(target.max(1))).clamp(0.0, 1.0);
    (ratio * 100.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::ItemStore;
    use chrono::{NaiveDate, Utc};
    use proptest::prelude::*;

    fn today() -> DateKey {
        DateKey::new(NaiveDate::from_ymd_opt(2026, 1, 5).unwrap())
    }

    #[test]
    fn three_of_eight_rounds_up() {
        let mut store = ItemStore::new();
        let id = store.add_habit("Drink Water", 8, Utc::now()).unwrap().id().clone();
        store.adjust_habit_today(&id, 3, today()).unwrap();
        let item = store.get(&id).unwrap();
        assert_eq!(habit_percent_at(item, today()), 38);
        assert_eq!(habit_percent_at(item, today().days_before(1).unwrap()), 0);
    }

    #[test]
    fn habit_percent_reads_the_current_day() {
        let mut store = ItemStore::new();
        let id = store.add_habit("Stretch", 2, Utc::now()).unwrap().id().clone();
        store.adjust_habit_today(&id, 1, DateKey::today()).unwrap();
        let percent = habit_percent(store.get(&id).unwrap());
        // 0 only if the clock crossed midnight between the two calls
        assert!(percent == 50 || percent == 0);
    }

    #[test]
    fn finished_task_is_full() {
        let mut store = ItemStore::new();
        let id = store.add_task("Ship App", 5, Utc::now()).unwrap().id().clone();
        for _ in 0..5 {
            store.adjust_task_progress(&id, 1).unwrap();
        }
        let item = store.get(&id).unwrap();
        assert_eq!(item.task_count(), 5);
        assert_eq!(task_percent(item), 100);
    }

    #[test]
    fn overall_is_zero_without_active_items() {
        assert_eq!(overall_percent(&[]), 0);

        let mut store = ItemStore::new();
        let id = store.add_task("Done", 1, Utc::now()).unwrap().id().clone();
        store.adjust_task_progress(&id, 1).unwrap();
        store.archive(&id).unwrap();
        assert_eq!(overall_percent_at(store.items(), today()), 0);
    }

    #[test]
    fn overall_averages_active_items_only() {
        let mut store = ItemStore::new();
        let habit = store.add_habit("Water", 8, Utc::now()).unwrap().id().clone();
        let task = store.add_task("Ship", 5, Utc::now()).unwrap().id().clone();
        let shelved = store.add_task("Old", 1, Utc::now()).unwrap().id().clone();
        store.adjust_habit_today(&habit, 3, today()).unwrap();
        store.adjust_task_progress(&task, 2).unwrap();
        store.archive(&shelved).unwrap();

        // (38 + 40) / 2
        assert_eq!(overall_percent_at(store.items(), today()), 39);
    }

    #[test]
    fn week_marks_days_that_met_the_target() {
        let mut store = ItemStore::new();
        let id = store.add_habit("Read", 2, Utc::now()).unwrap().id().clone();
        store.adjust_habit_today(&id, 2, today()).unwrap();
        store.adjust_habit_today(&id, 1, today().days_before(2).unwrap()).unwrap();
        store.adjust_habit_today(&id, 5, today().days_before(9).unwrap()).unwrap();

        let week = habit_week(store.get(&id).unwrap(), today());
        assert_eq!(week.len(), WINDOW_DAYS);
        assert_eq!(week[6].date, today());
        assert!(week[6].met);
        assert_eq!(week[4].count, 1);
        assert!(!week[4].met);
        assert_eq!(week.iter().filter(|day| day.met).count(), 1);
    }

    #[test]
    fn arena_fills_hearts_by_percent() {
        assert_eq!(arena(0).hearts_filled, 0);
        assert_eq!(arena(38).hearts_filled, 4);
        assert_eq!(arena(100).hearts_filled, HEARTS);
    }

    #[test]
    fn summary_lists_every_item_with_views() {
        let mut store = ItemStore::new();
        store.add_habit("Water", 8, Utc::now()).unwrap();
        let task = store.add_task("Ship", 4, Utc::now()).unwrap().id().clone();
        store.adjust_task_progress(&task, 1).unwrap();
        store.archive(&task).unwrap();

        let summary = build_summary_at(today(), store.items(), Some("heads up".into()));
        assert_eq!(summary.items.len(), 2);
        assert_eq!(summary.items[0].week.len(), WINDOW_DAYS);
        assert!(summary.items[1].week.is_empty());
        assert_eq!(summary.items[1].percent, 25);
        assert!(summary.items[1].archived);
        assert_eq!(summary.overall_percent, 0);
        assert_eq!(summary.notice.as_deref(), Some("heads up"));
    }

    proptest! {
        #[test]
        fn percents_stay_bounded(target in -10i64..20, deltas in prop::collection::vec(-30i64..30, 0..30)) {
            let mut store = ItemStore::new();
            let habit = store.add_habit("h", target, Utc::now()).unwrap().id().clone();
            let task = store.add_task("t", target, Utc::now()).unwrap().id().clone();
            for delta in deltas {
                store.adjust_habit_today(&habit, delta, today()).unwrap();
                store.adjust_task_progress(&task, delta).unwrap();
                let items = store.items();
                prop_assert!(habit_percent_at(&items[0], today()) <= 100);
                prop_assert!(task_percent(&items[1]) <= 100);
                prop_assert!(overall_percent_at(items, today()) <= 100);
            }
        }
    }
}
