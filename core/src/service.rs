use std::path::Path;

use anyhow::Result;
use chrono::{Local, NaiveDate, NaiveDateTime};

use crate::aggregate;
use crate::chart::{self, ChartProjection};
use crate::db::{Database, KeyValueStore};
use crate::entries::{EntryStore, LoadSource, SeedProvider};
use crate::goals::GoalStore;
use crate::models::{Category, CategoryReport, DailyPoint, Entry};

/// The tracker as the presentation layer sees it: one entry store and one
/// goal store over a single storage handle.
///
/// Callers hold this value explicitly; there is no process-wide instance.
pub struct ReportService<S: KeyValueStore> {
    storage: S,
    entries: EntryStore,
    goals: GoalStore,
}

impl ReportService<Database> {
    pub fn new(db_path: &str, seed: &dyn SeedProvider) -> Result<Self> {
        let db = Database::open(Path::new(db_path))?;
        Self::open(db, seed)
    }

    pub fn new_in_memory(seed: &dyn SeedProvider) -> Result<Self> {
        let db = Database::open_in_memory()?;
        Self::open(db, seed)
    }
}

impl<S: KeyValueStore> ReportService<S> {
    pub fn open(storage: S, seed: &dyn SeedProvider) -> Result<Self> {
        Self::open_at(storage, seed, Local::now().naive_local())
    }

    /// Like `open`, with an explicit "now" for seed timestamps.
    pub fn open_at(storage: S, seed: &dyn SeedProvider, now: NaiveDateTime) -> Result<Self> {
        let entries = EntryStore::load(&storage, seed, now)?;
        let goals = GoalStore::load(&storage)?;
        Ok(Self {
            storage,
            entries,
            goals,
        })
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn load_source(&self) -> LoadSource {
        self.entries.source()
    }

    pub fn entries(&self, category: Category) -> &[Entry] {
        self.entries.entries(category)
    }

    // --- Entries ---

    pub fn log_entry(
        &mut self,
        category: Category,
        label: &str,
        value: f64,
        timestamp: NaiveDateTime,
    ) -> Result<Entry> {
        self.entries
            .add(&self.storage, category, label, value, timestamp)
    }

    pub fn log_food(&mut self, food: &str, grams: f64, timestamp: NaiveDateTime) -> Result<Entry> {
        self.entries.add_food(&self.storage, food, grams, timestamp)
    }

    pub fn delete_entry(&mut self, category: Category, id: &str) -> Result<bool> {
        self.entries.remove(&self.storage, category, id)
    }

    pub fn clear_entries(&mut self, category: Category) -> Result<usize> {
        self.entries.clear(&self.storage, category)
    }

    // --- Goals ---

    pub fn goal(&self, category: Category) -> f64 {
        self.goals.get(category)
    }

    pub fn goals(&self) -> Vec<(Category, f64)> {
        self.goals.all()
    }

    pub fn set_goal(&mut self, category: Category, value: f64) -> Result<bool> {
        self.goals.set(&self.storage, category, value)
    }

    // --- Aggregation ---

    pub fn today_total(&self, category: Category, today: NaiveDate) -> f64 {
        aggregate::today_total(self.entries(category), category.mode(), today)
    }

    pub fn rolling_series(&self, category: Category, today: NaiveDate) -> Vec<DailyPoint> {
        aggregate::rolling_series(self.entries(category), category.mode(), today)
    }

    pub fn report(&self, category: Category, today: NaiveDate) -> CategoryReport {
        let info = category.info();
        CategoryReport {
            category,
            label: info.label,
            unit: info.unit,
            color: info.color,
            mode: info.mode,
            progress: aggregate::progress(self.today_total(category, today), self.goal(category)),
            series: self.rolling_series(category, today),
        }
    }

    pub fn chart(&self, category: Category, today: NaiveDate) -> ChartProjection {
        let info = category.info();
        chart::project(&self.rolling_series(category, today), info.color, info.unit)
    }
}
