use std::collections::BTreeMap;

use crate::dao::models::GameRecord;

/// Favorite games keyed by catalog identifier.
///
/// Entries are kept ordered by identifier so the serialized form only depends on
/// membership.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FavoriteSet {
    entries: BTreeMap<String, GameRecord>,
}

impl FavoriteSet {
    /// Empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from persisted records; later duplicates replace earlier ones.
    pub fn from_records(records: Vec<GameRecord>) -> Self {
        let entries = records
            .into_iter()
            .map(|record| (record.id.clone(), record))
            .collect();
        Self { entries }
    }

    /// Whether `id` is a favorite.
    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Insert `game`; returns `false` when it was already a favorite.
    pub fn add(&mut self, game: &GameRecord) -> bool {
        if self.contains(&game.id) {
            return false;
        }
        self.entries.insert(game.id.clone(), game.clone());
        true
    }

    /// Remove by identifier; returns `true` when something was removed.
    pub fn remove(&mut self, id: &str) -> bool {
        self.entries.remove(id).is_some()
    }

    /// Flip membership of `game` and return whether it is now a favorite.
    pub fn toggle(&mut self, game: &GameRecord) -> bool {
        if self.remove(&game.id) {
            false
        } else {
            self.entries.insert(game.id.clone(), game.clone());
            true
        }
    }

    /// Number of favorites.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no favorites.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Records ordered by id.
    pub fn records(&self) -> impl Iterator<Item = &GameRecord> {
        self.entries.values()
    }

    /// Owned copy in persisted order.
    pub fn to_records(&self) -> Vec<GameRecord> {
        self.records().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::models::{Category, Difficulty, fixtures::game};

    fn uno() -> GameRecord {
        game("uno", "UNO", Category::CardGames, Difficulty::Easy)
    }

    fn poker() -> GameRecord {
        game("poker", "Poker", Category::CardGames, Difficulty::Hard)
    }

    #[test]
    fn membership_is_by_identifier() {
        let mut set = FavoriteSet::new();
        set.add(&uno());

        let mut renamed = uno();
        renamed.name = "Uno (travel edition)".into();
        assert!(set.contains(&renamed.id));
        assert!(!set.add(&renamed));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn toggle_twice_restores_membership_and_serialization() {
        for start in [vec![], vec![uno()], vec![uno(), poker()], vec![poker()]] {
            let mut set = FavoriteSet::from_records(start);
            let before = serde_json::to_string(&set.to_records()).unwrap();

            set.toggle(&uno());
            set.toggle(&uno());

            let after = serde_json::to_string(&set.to_records()).unwrap();
            assert_eq!(before, after);
        }
    }

    #[test]
    fn toggle_reports_new_state() {
        let mut set = FavoriteSet::new();
        assert!(set.toggle(&uno()));
        assert!(!set.toggle(&uno()));
        assert!(set.is_empty());
    }

    #[test]
    fn remove_missing_is_a_no_op() {
        let mut set = FavoriteSet::from_records(vec![poker()]);
        assert!(!set.remove("uno"));
        assert_eq!(set.len(), 1);
    }
}
