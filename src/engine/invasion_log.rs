//! Durable-log stand-in for invasion notifications.

use crate::TerritoryInvasion;

/// Append-only list of invasions with a per-entry `seen` flag.
#[derive(Debug, Default)]
pub struct InvasionLog {
    entries: Vec<TerritoryInvasion>,
}

impl InvasionLog {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn append(&mut self, invasions: impl IntoIterator<Item = TerritoryInvasion>) {
        self.entries.extend(invasions);
    }

    /// Invasions suffered by a user, oldest first.
    pub fn for_user(&self, user_id: &str) -> Vec<&TerritoryInvasion> {
        self.entries
            .iter()
            .filter(|i| i.invaded_user_id == user_id)
            .collect()
    }

    /// Invasions the user hasn't acknowledged yet.
    pub fn unseen_for(&self, user_id: &str) -> Vec<&TerritoryInvasion> {
        self.entries
            .iter()
            .filter(|i| i.invaded_user_id == user_id && !i.seen)
            .collect()
    }

    /// Mark one invasion as seen. Returns false for unknown ids.
    pub fn mark_seen(&mut self, invasion_id: &str) -> bool {
        match self.entries.iter_mut().find(|i| i.id == invasion_id) {
            Some(invasion) => {
                invasion.mark_seen();
                true
            }
            None => false,
        }
    }

    /// Mark everything a user has suffered as seen; returns how many changed.
    pub fn mark_all_seen(&mut self, user_id: &str) -> usize {
        let mut changed = 0;
        for invasion in self
            .entries
            .iter_mut()
            .filter(|i| i.invaded_user_id == user_id && !i.seen)
        {
            invasion.mark_seen();
            changed += 1;
        }
        changed
    }

    pub fn iter(&self) -> impl Iterator<Item = &TerritoryInvasion> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
