//! Catalog browsing: filtering, sponsored strip and lookups.

use crate::{
    dao::{
        catalog::Catalog,
        models::{Category, Difficulty, GameRecord},
    },
    state::SharedState,
};

/// Active browse criteria. Every set criterion must hold for a game to match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameFilter {
    /// Case-insensitive substring; empty matches everything.
    pub query: String,
    /// Exact category.
    pub category: Option<Category>,
    /// Exact difficulty.
    pub difficulty: Option<Difficulty>,
    /// Party size; 0 counts as unset.
    pub players: Option<u32>,
}

impl GameFilter {
    /// Whether `game` satisfies every set criterion.
    pub fn matches(&self, game: &GameRecord) -> bool {
        self.matches_query(game)
            && self.category.is_none_or(|category| game.category == category)
            && self
                .difficulty
                .is_none_or(|difficulty| game.difficulty == difficulty)
            && self
                .players
                .filter(|players| *players > 0)
                .is_none_or(|players| game.accepts_players(players))
    }

    fn matches_query(&self, game: &GameRecord) -> bool {
        let needle = self.query.to_lowercase();
        if needle.is_empty() {
            return true;
        }

        game.name.to_lowercase().contains(&needle)
            || game.description.to_lowercase().contains(&needle)
            || game
                .tags
                .iter()
                .any(|tag| tag.to_lowercase().contains(&needle))
    }
}

/// Catalog subsequence matching `filter`, in catalog order.
pub fn filter_games<'a>(games: &'a [GameRecord], filter: &GameFilter) -> Vec<&'a GameRecord> {
    games.iter().filter(|game| filter.matches(game)).collect()
}

/// Sponsored games, highest priority first; ties keep catalog order.
pub fn sponsored_games(games: &[GameRecord]) -> Vec<&GameRecord> {
    let mut sponsored: Vec<_> = games.iter().filter(|game| game.is_sponsored()).collect();
    sponsored.sort_by_key(|game| std::cmp::Reverse(game.sponsor_priority.unwrap_or_default()));
    sponsored
}

/// Look a game up by identifier, then by slug.
pub fn find_game<'a>(catalog: &'a Catalog, key: &str) -> Option<&'a GameRecord> {
    catalog
        .get(key)
        .or_else(|| catalog.games().iter().find(|game| game.slug() == key))
}

/// Client route of a game detail page.
pub fn game_path(game: &GameRecord) -> String {
    format!("/game/{}", game.slug())
}

/// Owned [`filter_games`] over the loaded catalog.
pub fn search(state: &SharedState, filter: &GameFilter) -> Vec<GameRecord> {
    filter_games(state.catalog().games(), filter)
        .into_iter()
        .cloned()
        .collect()
}

/// Owned [`sponsored_games`] over the loaded catalog.
pub fn sponsored(state: &SharedState) -> Vec<GameRecord> {
    sponsored_games(state.catalog().games())
        .into_iter()
        .cloned()
        .collect()
}

/// Game by id or slug.
pub fn get_game(state: &SharedState, key: &str) -> Option<GameRecord> {
    find_game(state.catalog(), key).cloned()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn catalog() -> Catalog {
        Catalog::embedded().unwrap()
    }

    fn ids(games: &[&GameRecord]) -> Vec<String> {
        games.iter().map(|game| game.id.clone()).collect()
    }

    #[test]
    fn empty_filter_returns_whole_catalog_in_order() {
        let catalog = catalog();
        let all = filter_games(catalog.games(), &GameFilter::default());
        assert_eq!(all.len(), catalog.len());
        assert_eq!(
            ids(&all),
            catalog
                .games()
                .iter()
                .map(|game| game.id.clone())
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn query_matches_name_description_or_tags_case_insensitively() {
        let catalog = catalog();
        let by_tag = GameFilter {
            query: "COLORS".into(),
            ..GameFilter::default()
        };
        assert_eq!(ids(&filter_games(catalog.games(), &by_tag)), vec!["uno"]);

        let by_name = GameFilter {
            query: "hold'em".into(),
            ..GameFilter::default()
        };
        assert_eq!(ids(&filter_games(catalog.games(), &by_name)), vec!["poker"]);
    }

    #[test]
    fn query_is_matched_verbatim_including_spaces() {
        let catalog = catalog();
        let padded = GameFilter {
            query: " uno ".into(),
            ..GameFilter::default()
        };
        assert!(filter_games(catalog.games(), &padded).is_empty());
    }

    #[test]
    fn result_is_the_conjunction_of_active_predicates() {
        let catalog = catalog();
        let games = catalog.games();
        let queries = ["", "card", "game", "zzz"];
        let categories = [
            None,
            Some(Category::CardGames),
            Some(Category::BoardGames),
            Some(Category::IcebreakerGames),
            Some(Category::GetTogetherGames),
        ];
        let difficulties = [
            None,
            Some(Difficulty::Easy),
            Some(Difficulty::Medium),
            Some(Difficulty::Hard),
        ];
        let party_sizes = [None, Some(0), Some(1), Some(2), Some(5), Some(12)];

        let single = |filter: GameFilter| -> HashSet<String> {
            filter_games(games, &filter)
                .into_iter()
                .map(|game| game.id.clone())
                .collect()
        };

        for query in queries {
            for category in categories {
                for difficulty in difficulties {
                    for players in party_sizes {
                        let combined = filter_games(
                            games,
                            &GameFilter {
                                query: query.into(),
                                category,
                                difficulty,
                                players,
                            },
                        );

                        let expected: HashSet<String> = single(GameFilter {
                            query: query.into(),
                            ..GameFilter::default()
                        })
                        .intersection(&single(GameFilter {
                            category,
                            ..GameFilter::default()
                        }))
                        .cloned()
                        .collect::<HashSet<_>>()
                        .intersection(&single(GameFilter {
                            difficulty,
                            ..GameFilter::default()
                        }))
                        .cloned()
                        .collect::<HashSet<_>>()
                        .intersection(&single(GameFilter {
                            players,
                            ..GameFilter::default()
                        }))
                        .cloned()
                        .collect();

                        assert_eq!(
                            combined.iter().map(|game| game.id.clone()).collect::<HashSet<_>>(),
                            expected,
                            "query={query:?} category={category:?} difficulty={difficulty:?} players={players:?}"
                        );
                        // Catalog order is preserved.
                        let positions: Vec<_> = combined
                            .iter()
                            .map(|game| games.iter().position(|g| g.id == game.id))
                            .collect();
                        assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
                    }
                }
            }
        }
    }

    #[test]
    fn zero_party_size_counts_as_unset() {
        let catalog = catalog();
        let zero = GameFilter {
            players: Some(0),
            ..GameFilter::default()
        };
        assert_eq!(filter_games(catalog.games(), &zero).len(), catalog.len());
    }

    #[test]
    fn party_size_bounds_are_inclusive() {
        let catalog = catalog();
        let uno = catalog.get("uno").unwrap();
        for players in [uno.min_players, uno.max_players] {
            let filter = GameFilter {
                players: Some(players),
                ..GameFilter::default()
            };
            assert!(filter.matches(uno));
        }
        let too_many = GameFilter {
            players: Some(uno.max_players + 1),
            ..GameFilter::default()
        };
        assert!(!too_many.matches(uno));
    }

    #[test]
    fn sponsored_strip_orders_by_priority() {
        let catalog = catalog();
        assert_eq!(
            ids(&sponsored_games(catalog.games())),
            vec!["monopoly", "uno"]
        );
    }

    #[test]
    fn sponsored_ties_keep_catalog_order() {
        use crate::dao::models::fixtures::game;

        let mut first = game("a", "A", Category::CardGames, Difficulty::Easy);
        let mut second = game("b", "B", Category::CardGames, Difficulty::Easy);
        let mut top = game("c", "C", Category::CardGames, Difficulty::Easy);
        first.sponsor_priority = Some(1);
        second.sponsor_priority = Some(1);
        top.sponsor_priority = Some(3);
        let games = vec![first, second, top];

        assert_eq!(ids(&sponsored_games(&games)), vec!["c", "a", "b"]);
    }

    #[test]
    fn games_are_found_by_id_or_slug() {
        let catalog = catalog();
        assert_eq!(find_game(&catalog, "poker").unwrap().id, "poker");
        assert_eq!(
            find_game(&catalog, "texas-hold'em-poker").unwrap().id,
            "poker"
        );
        assert!(find_game(&catalog, "solitaire").is_none());
        assert_eq!(game_path(catalog.get("uno").unwrap()), "/game/uno");
    }
}
