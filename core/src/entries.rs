use std::collections::BTreeMap;

use anyhow::{Result, bail};
use chrono::{Duration, NaiveDateTime};
use serde::Serialize;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::db::KeyValueStore;
use crate::foods::{SEED_FOODS, display_name, grams_to_kcal, kcal_per_100g};
use crate::models::{Category, Entry};

/// Storage key holding the whole per-category entry map.
pub const DATA_KEY: &str = "fitsphere_data";

pub type Snapshot = BTreeMap<Category, Vec<Entry>>;

/// Remote source of per-food energy estimates used on first run.
///
/// The CLI implements this over HTTP; tests use canned providers.
pub trait SeedProvider {
    /// kcal per 100g for `food`, `Ok(None)` when the source has nothing usable.
    fn energy_per_100g(&self, food: &str) -> Result<Option<f64>>;
}

/// Provider for when no remote source is configured.
pub struct NoRemoteSeed;

impl SeedProvider for NoRemoteSeed {
    fn energy_per_100g(&self, _food: &str) -> Result<Option<f64>> {
        Ok(None)
    }
}

/// Which layer produced the entries a store started with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadSource {
    Snapshot,
    RemoteSeed,
    StaticDefault,
}

#[derive(Debug)]
pub struct EntryStore {
    entries: Snapshot,
    source: LoadSource,
}

impl EntryStore {
    /// Resolve the starting entries: persisted snapshot, else remote seed,
    /// else static defaults. Seeded data is written back immediately.
    pub fn load(
        storage: &dyn KeyValueStore,
        seed: &dyn SeedProvider,
        now: NaiveDateTime,
    ) -> Result<Self> {
        if let Some(entries) = read_snapshot(storage)? {
            return Ok(Self {
                entries,
                source: LoadSource::Snapshot,
            });
        }

        let (entries, source) = seed_entries(seed, now);
        let store = Self { entries, source };
        write_snapshot(storage, &store.entries)?;
        debug!(?source, "seeded entry store");
        Ok(store)
    }

    #[must_use]
    pub fn source(&self) -> LoadSource {
        self.source
    }

    #[must_use]
    pub fn entries(&self, category: Category) -> &[Entry] {
        self.entries
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    #[must_use]
    pub fn snapshot(&self) -> &Snapshot {
        &self.entries
    }

    pub fn add(
        &mut self,
        storage: &dyn KeyValueStore,
        category: Category,
        label: &str,
        value: f64,
        timestamp: NaiveDateTime,
    ) -> Result<Entry> {
        if !value.is_finite() {
            bail!("Entry value must be a finite number");
        }
        let label = label.trim();
        let entry = Entry {
            id: Uuid::new_v4().to_string(),
            label: if label.is_empty() {
                category.info().label.to_string()
            } else {
                label.to_string()
            },
            value,
            timestamp,
        };
        let mut next = self.entries.clone();
        next.entry(category).or_default().push(entry.clone());
        self.commit(storage, next)?;
        debug!(%category, id = %entry.id, value, "added entry");
        Ok(entry)
    }

    /// Log a calories entry from a weight of food, valued through the food table.
    pub fn add_food(
        &mut self,
        storage: &dyn KeyValueStore,
        food: &str,
        grams: f64,
        timestamp: NaiveDateTime,
    ) -> Result<Entry> {
        if food.trim().is_empty() {
            bail!("Food name must not be empty");
        }
        let kcal = grams_to_kcal(grams, food);
        self.add(storage, Category::Calories, food, kcal, timestamp)
    }

    /// Remove one entry from `category`. Unknown ids are a no-op.
    pub fn remove(
        &mut self,
        storage: &dyn KeyValueStore,
        category: Category,
        id: &str,
    ) -> Result<bool> {
        let Some(list) = self.entries.get(&category) else {
            return Ok(false);
        };
        if !list.iter().any(|e| e.id == id) {
            return Ok(false);
        }
        let mut next = self.entries.clone();
        if let Some(list) = next.get_mut(&category) {
            list.retain(|e| e.id != id);
        }
        self.commit(storage, next)?;
        debug!(%category, id, "removed entry");
        Ok(true)
    }

    /// Drop every entry in `category`, returning how many were removed.
    /// Irreversible; callers confirm with the user first.
    pub fn clear(&mut self, storage: &dyn KeyValueStore, category: Category) -> Result<usize> {
        let removed = self.entries(category).len();
        let mut next = self.entries.clone();
        next.insert(category, Vec::new());
        self.commit(storage, next)?;
        debug!(%category, removed, "cleared entries");
        Ok(removed)
    }

    /// Adopt `next` only after it is written; on error memory still matches disk.
    fn commit(&mut self, storage: &dyn KeyValueStore, next: Snapshot) -> Result<()> {
        write_snapshot(storage, &next)?;
        self.entries = next;
        Ok(())
    }
}

fn write_snapshot(storage: &dyn KeyValueStore, snapshot: &Snapshot) -> Result<()> {
    let json = serde_json::to_string(snapshot)?;
    storage.set(DATA_KEY, &json)
}

/// Read the persisted snapshot. An unparsable snapshot counts as absent.
fn read_snapshot(storage: &dyn KeyValueStore) -> Result<Option<Snapshot>> {
    let Some(raw) = storage.get(DATA_KEY)? else {
        return Ok(None);
    };
    match serde_json::from_str::<Snapshot>(&raw) {
        Ok(snapshot) => Ok(Some(snapshot)),
        Err(e) => {
            warn!(error = %e, "ignoring malformed entry snapshot");
            Ok(None)
        }
    }
}

/// Energy for one seed food: the remote value when usable, else the table.
fn resolve_seed_energy(seed: &dyn SeedProvider, food: &str) -> (f64, bool) {
    match seed.energy_per_100g(food) {
        Ok(Some(kcal)) if kcal.is_finite() && kcal > 0.0 => (kcal, true),
        Ok(_) => (kcal_per_100g(food), false),
        Err(e) => {
            warn!(food, error = %e, "remote seed lookup failed, using food table");
            (kcal_per_100g(food), false)
        }
    }
}

/// First-run example data. Deterministic for a given `now` and provider.
#[must_use]
pub fn seed_entries(seed: &dyn SeedProvider, now: NaiveDateTime) -> (Snapshot, LoadSource) {
    let mut any_remote = false;
    let mut energy: BTreeMap<&str, f64> = BTreeMap::new();
    for food in SEED_FOODS {
        let (kcal, remote) = resolve_seed_energy(seed, food);
        any_remote |= remote;
        energy.insert(food, kcal);
    }

    let t0 = now;
    let t1 = now - Duration::days(1);
    let t2 = now - Duration::days(2);
    let entry = |id: &str, label: &str, value: f64, timestamp: NaiveDateTime| Entry {
        id: id.to_string(),
        label: label.to_string(),
        value,
        timestamp,
    };
    let food = |id: &str, name: &str, timestamp: NaiveDateTime| {
        entry(id, &display_name(name), energy[name], timestamp)
    };

    let mut snapshot = Snapshot::new();
    snapshot.insert(
        Category::Calories,
        vec![
            food("1", "rice", t2),
            food("2", "chicken", t1),
            food("3", "wheat", t1),
            food("4", "salmon", t0),
            food("5", "broccoli", t0),
            food("6", "banana", t0),
        ],
    );
    snapshot.insert(
        Category::Water,
        vec![entry("7", "Bottle", 1000.0, t1), entry("8", "Glass", 250.0, t0)],
    );
    snapshot.insert(
        Category::Steps,
        vec![entry("9", "Walk", 5000.0, t1), entry("10", "Run", 8000.0, t0)],
    );
    snapshot.insert(Category::Sleep, vec![entry("11", "Night", 7.0, t1)]);
    snapshot.insert(Category::Workout, vec![entry("12", "Gym", 45.0, t1)]);
    snapshot.insert(
        Category::Weight,
        vec![entry("13", "Scale", 70.0, t1), entry("14", "Scale", 69.5, t0)],
    );

    let source = if any_remote {
        LoadSource::RemoteSeed
    } else {
        LoadSource::StaticDefault
    };
    (snapshot, source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use chrono::NaiveDate;
    use std::cell::Cell;
    use std::collections::HashMap;

    struct FailingSeed {
        calls: Cell<usize>,
    }

    impl SeedProvider for FailingSeed {
        fn energy_per_100g(&self, _food: &str) -> Result<Option<f64>> {
            self.calls.set(self.calls.get() + 1);
            anyhow::bail!("connection refused")
        }
    }

    struct CannedSeed(HashMap<&'static str, f64>);

    impl SeedProvider for CannedSeed {
        fn energy_per_100g(&self, food: &str) -> Result<Option<f64>> {
            Ok(self.0.get(food).copied())
        }
    }

    /// Accepts writes until `read_only` is flipped on.
    #[derive(Default)]
    struct LockableStore {
        inner: MemoryStore,
        read_only: Cell<bool>,
    }

    impl KeyValueStore for LockableStore {
        fn get(&self, key: &str) -> Result<Option<String>> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<()> {
            if self.read_only.get() {
                anyhow::bail!("disk I/O error");
            }
            self.inner.set(key, value)
        }
    }

    fn failing() -> FailingSeed {
        FailingSeed {
            calls: Cell::new(0),
        }
    }

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 10)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn values(store: &EntryStore, category: Category) -> Vec<f64> {
        store.entries(category).iter().map(|e| e.value).collect()
    }

    #[test]
    fn test_fresh_load_with_failing_remote_uses_table() {
        let storage = MemoryStore::new();
        let seed = failing();
        let store = EntryStore::load(&storage, &seed, now()).unwrap();

        assert_eq!(store.source(), LoadSource::StaticDefault);
        assert_eq!(seed.calls.get(), SEED_FOODS.len());
        assert_eq!(
            values(&store, Category::Calories),
            vec![130.0, 165.0, 340.0, 208.0, 34.0, 89.0]
        );
        let labels: Vec<&str> = store
            .entries(Category::Calories)
            .iter()
            .map(|e| e.label.as_str())
            .collect();
        assert_eq!(
            labels,
            vec!["Rice", "Chicken", "Wheat", "Salmon", "Broccoli", "Banana"]
        );
        assert_eq!(values(&store, Category::Weight), vec![70.0, 69.5]);
        assert_eq!(values(&store, Category::Sleep), vec![7.0]);
    }

    #[test]
    fn test_fallback_is_deterministic() {
        let first = EntryStore::load(&MemoryStore::new(), &failing(), now()).unwrap();
        let second = EntryStore::load(&MemoryStore::new(), &failing(), now()).unwrap();
        assert_eq!(first.snapshot(), second.snapshot());
    }

    #[test]
    fn test_seed_timestamps_relative_to_now() {
        let store = EntryStore::load(&MemoryStore::new(), &NoRemoteSeed, now()).unwrap();
        let rice = &store.entries(Category::Calories)[0];
        assert_eq!(rice.timestamp, now() - Duration::days(2));
        let glass = &store.entries(Category::Water)[1];
        assert_eq!(glass.timestamp, now());
    }

    #[test]
    fn test_remote_values_used_when_available() {
        let seed = CannedSeed(HashMap::from([("chicken", 239.0), ("banana", 0.0)]));
        let store = EntryStore::load(&MemoryStore::new(), &seed, now()).unwrap();

        assert_eq!(store.source(), LoadSource::RemoteSeed);
        let calories = values(&store, Category::Calories);
        assert_eq!(calories[1], 239.0);
        // Zero from the remote is unusable and falls back to the table
        assert_eq!(calories[5], 89.0);
        assert_eq!(calories[0], 130.0);
    }

    #[test]
    fn test_seed_is_persisted_and_snapshot_wins() {
        let storage = MemoryStore::new();
        let mut store = EntryStore::load(&storage, &NoRemoteSeed, now()).unwrap();
        store
            .add(&storage, Category::Water, "Cup", 200.0, now())
            .unwrap();

        let seed = failing();
        let reloaded = EntryStore::load(&storage, &seed, now()).unwrap();
        assert_eq!(reloaded.source(), LoadSource::Snapshot);
        assert_eq!(seed.calls.get(), 0, "remote must not be called");
        assert_eq!(values(&reloaded, Category::Water), vec![1000.0, 250.0, 200.0]);
    }

    #[test]
    fn test_malformed_snapshot_treated_as_absent() {
        let storage = MemoryStore::new();
        storage.set(DATA_KEY, "{not json").unwrap();
        let store = EntryStore::load(&storage, &NoRemoteSeed, now()).unwrap();
        assert_eq!(store.source(), LoadSource::StaticDefault);
        // The seed replaced the broken snapshot
        let raw = storage.get(DATA_KEY).unwrap().unwrap();
        assert!(serde_json::from_str::<Snapshot>(&raw).is_ok());
    }

    #[test]
    fn test_snapshot_with_unknown_category_is_malformed() {
        let storage = MemoryStore::new();
        storage.set(DATA_KEY, "{\"protein\":[]}").unwrap();
        let store = EntryStore::load(&storage, &NoRemoteSeed, now()).unwrap();
        assert_eq!(store.source(), LoadSource::StaticDefault);
    }

    #[test]
    fn test_partial_snapshot_adopted_verbatim() {
        let storage = MemoryStore::new();
        storage.set(DATA_KEY, "{\"water\":[]}").unwrap();
        let store = EntryStore::load(&storage, &NoRemoteSeed, now()).unwrap();
        assert_eq!(store.source(), LoadSource::Snapshot);
        assert!(store.entries(Category::Calories).is_empty());
        assert!(store.entries(Category::Water).is_empty());
    }

    #[test]
    fn test_add_generates_unique_ids_and_persists() {
        let storage = MemoryStore::new();
        let mut store = EntryStore::load(&storage, &NoRemoteSeed, now()).unwrap();
        let a = store
            .add(&storage, Category::Steps, "Walk", 1200.0, now())
            .unwrap();
        let b = store
            .add(&storage, Category::Steps, "Walk", 1200.0, now())
            .unwrap();
        assert_ne!(a.id, b.id);

        let raw = storage.get(DATA_KEY).unwrap().unwrap();
        let persisted: Snapshot = serde_json::from_str(&raw).unwrap();
        assert_eq!(persisted[&Category::Steps].len(), 4);
        assert_eq!(persisted[&Category::Steps].last(), Some(&b));
    }

    #[test]
    fn test_add_empty_label_uses_category_label() {
        let storage = MemoryStore::new();
        let mut store = EntryStore::load(&storage, &NoRemoteSeed, now()).unwrap();
        let entry = store
            .add(&storage, Category::Sleep, "  ", 1.5, now())
            .unwrap();
        assert_eq!(entry.label, "Sleep");
    }

    #[test]
    fn test_add_rejects_non_finite() {
        let storage = MemoryStore::new();
        let mut store = EntryStore::load(&storage, &NoRemoteSeed, now()).unwrap();
        assert!(
            store
                .add(&storage, Category::Water, "x", f64::NAN, now())
                .is_err()
        );
        assert_eq!(store.entries(Category::Water).len(), 2);
    }

    #[test]
    fn test_add_food_values_through_table() {
        let storage = MemoryStore::new();
        let mut store = EntryStore::load(&storage, &NoRemoteSeed, now()).unwrap();
        let entry = store.add_food(&storage, "chicken", 150.0, now()).unwrap();
        assert_eq!(entry.value, 248.0);
        assert_eq!(entry.label, "chicken");

        let unknown = store.add_food(&storage, "mystery stew", 300.0, now()).unwrap();
        assert_eq!(unknown.value, 0.0);
        assert!(store.add_food(&storage, "", 100.0, now()).is_err());
    }

    #[test]
    fn test_add_then_remove_restores_content() {
        let storage = MemoryStore::new();
        let mut store = EntryStore::load(&storage, &NoRemoteSeed, now()).unwrap();
        let before = store.entries(Category::Workout).to_vec();

        let entry = store
            .add(&storage, Category::Workout, "Yoga", 30.0, now())
            .unwrap();
        assert!(store.remove(&storage, Category::Workout, &entry.id).unwrap());
        assert_eq!(store.entries(Category::Workout), before.as_slice());
    }

    #[test]
    fn test_remove_is_scoped_to_category() {
        let storage = MemoryStore::new();
        let mut store = EntryStore::load(&storage, &NoRemoteSeed, now()).unwrap();
        // Seed id "7" lives in water, not steps
        assert!(!store.remove(&storage, Category::Steps, "7").unwrap());
        assert_eq!(store.entries(Category::Water).len(), 2);
        assert!(store.remove(&storage, Category::Water, "7").unwrap());
        assert_eq!(store.entries(Category::Water).len(), 1);
    }

    #[test]
    fn test_remove_unknown_id_is_noop() {
        let storage = MemoryStore::new();
        let mut store = EntryStore::load(&storage, &NoRemoteSeed, now()).unwrap();
        let before = store.snapshot().clone();
        assert!(!store.remove(&storage, Category::Calories, "nope").unwrap());
        assert_eq!(store.snapshot(), &before);
    }

    #[test]
    fn test_clear_only_touches_one_category() {
        let storage = MemoryStore::new();
        let mut store = EntryStore::load(&storage, &NoRemoteSeed, now()).unwrap();
        assert_eq!(store.clear(&storage, Category::Calories).unwrap(), 6);
        assert!(store.entries(Category::Calories).is_empty());
        assert_eq!(store.entries(Category::Steps).len(), 2);
        assert_eq!(store.clear(&storage, Category::Calories).unwrap(), 0);

        let reloaded = EntryStore::load(&storage, &NoRemoteSeed, now()).unwrap();
        assert!(reloaded.entries(Category::Calories).is_empty());
        assert_eq!(reloaded.entries(Category::Steps).len(), 2);
    }

    #[test]
    fn test_failed_write_leaves_entries_unchanged() {
        let storage = LockableStore::default();
        let mut store = EntryStore::load(&storage, &NoRemoteSeed, now()).unwrap();
        let before = store.snapshot().clone();
        storage.read_only.set(true);

        assert!(store.add(&storage, Category::Water, "Cup", 200.0, now()).is_err());
        assert!(store.remove(&storage, Category::Water, "7").is_err());
        assert!(store.clear(&storage, Category::Steps).is_err());
        assert_eq!(store.snapshot(), &before);

        let raw = storage.get(DATA_KEY).unwrap().unwrap();
        let persisted: Snapshot = serde_json::from_str(&raw).unwrap();
        assert_eq!(&persisted, store.snapshot());
    }
}
