use std::collections::BTreeMap;

use anyhow::Result;
use serde_json::Value;
use tracing::{debug, warn};

use crate::db::KeyValueStore;
use crate::models::Category;

/// Storage key holding the goal map.
pub const GOALS_KEY: &str = "fitsphere_goals";

/// Per-category targets. Only overrides are stored; every other category
/// reads its catalog default, so each category always has exactly one goal.
#[derive(Debug, Default)]
pub struct GoalStore {
    overrides: BTreeMap<Category, f64>,
}

impl GoalStore {
    pub fn load(storage: &dyn KeyValueStore) -> Result<Self> {
        let Some(raw) = storage.get(GOALS_KEY)? else {
            return Ok(Self::default());
        };
        let map = match serde_json::from_str::<BTreeMap<String, Value>>(&raw) {
            Ok(map) => map,
            Err(e) => {
                warn!(error = %e, "ignoring malformed goal map");
                return Ok(Self::default());
            }
        };

        let mut overrides = BTreeMap::new();
        for (key, value) in map {
            let Ok(category) = key.parse::<Category>() else {
                warn!(%key, "ignoring goal for unknown category");
                continue;
            };
            match value.as_f64() {
                Some(goal) if is_valid_goal(goal) => {
                    overrides.insert(category, goal);
                }
                _ => warn!(%category, %value, "ignoring invalid persisted goal"),
            }
        }
        Ok(Self { overrides })
    }

    #[must_use]
    pub fn get(&self, category: Category) -> f64 {
        self.overrides
            .get(&category)
            .copied()
            .unwrap_or_else(|| category.default_goal())
    }

    /// Store a new goal. Non-positive or non-finite values leave the goal
    /// untouched and return `false`.
    pub fn set(
        &mut self,
        storage: &dyn KeyValueStore,
        category: Category,
        value: f64,
    ) -> Result<bool> {
        if !is_valid_goal(value) {
            debug!(%category, value, "rejected goal");
            return Ok(false);
        }
        let mut next = self.overrides.clone();
        next.insert(category, value);
        let json = serde_json::to_string(&next)?;
        storage.set(GOALS_KEY, &json)?;
        self.overrides = next;
        debug!(%category, value, "goal updated");
        Ok(true)
    }

    /// Every category with its effective goal, in catalog order.
    #[must_use]
    pub fn all(&self) -> Vec<(Category, f64)> {
        Category::ALL.into_iter().map(|c| (c, self.get(c))).collect()
    }
}

fn is_valid_goal(value: f64) -> bool {
    value.is_finite() && value > 0.0
}
