//! Loading of the static game catalog.

use std::{collections::HashSet, path::Path, sync::Arc};

use thiserror::Error;
use tracing::info;
use validator::{Validate, ValidationErrors};

use crate::dao::models::GameRecord;

/// Catalog shipped with the binary, used when no override file is configured.
const EMBEDDED_CATALOG: &str = include_str!("../../data/catalog.json");

/// Failures raised while reading or validating catalog definitions.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The override file could not be read.
    #[error("failed to read catalog file `{path}`")]
    Read {
        /// File that failed to read.
        path: String,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The JSON document is not a list of game records.
    #[error("failed to parse catalog definitions")]
    Parse(#[source] serde_json::Error),
    /// A record violates the catalog invariants.
    #[error("invalid catalog entry `{id}`: {source}")]
    Invalid {
        /// Identifier of the offending record.
        id: String,
        /// Violated constraints.
        #[source]
        source: ValidationErrors,
    },
    /// Two records share the same identifier.
    #[error("duplicate catalog id `{0}`")]
    DuplicateId(String),
}

/// Read-only, ordered collection of game records.
#[derive(Debug, Clone)]
pub struct Catalog {
    games: Arc<[GameRecord]>,
}

impl Catalog {
    /// Build a catalog from records, enforcing per-record validation and unique ids.
    pub fn new(games: Vec<GameRecord>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::with_capacity(games.len());
        for game in &games {
            game.validate().map_err(|source| CatalogError::Invalid {
                id: game.id.clone(),
                source,
            })?;
            if !seen.insert(game.id.as_str()) {
                return Err(CatalogError::DuplicateId(game.id.clone()));
            }
        }

        Ok(Self {
            games: games.into(),
        })
    }

    /// Parse a JSON array of game records.
    pub fn from_json(contents: &str) -> Result<Self, CatalogError> {
        let games = serde_json::from_str::<Vec<GameRecord>>(contents).map_err(CatalogError::Parse)?;
        Self::new(games)
    }

    /// Catalog compiled into the binary.
    pub fn embedded() -> Result<Self, CatalogError> {
        Self::from_json(EMBEDDED_CATALOG)
    }

    /// Load the catalog from `path`, or the embedded one when no path is configured.
    pub async fn load(path: Option<&Path>) -> Result<Self, CatalogError> {
        let Some(path) = path else {
            let catalog = Self::embedded()?;
            info!(count = catalog.len(), "loaded embedded game catalog");
            return Ok(catalog);
        };

        let contents =
            tokio::fs::read_to_string(path)
                .await
                .map_err(|source| CatalogError::Read {
                    path: path.display().to_string(),
                    source,
                })?;
        let catalog = Self::from_json(&contents)?;
        info!(path = %path.display(), count = catalog.len(), "loaded game catalog");
        Ok(catalog)
    }

    /// All records in catalog order.
    pub fn games(&self) -> &[GameRecord] {
        &self.games
    }

    /// Number of games.
    pub fn len(&self) -> usize {
        self.games.len()
    }

    /// Whether the catalog holds no games.
    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    /// Exact identifier lookup.
    pub fn get(&self, id: &str) -> Option<&GameRecord> {
        self.games.iter().find(|game| game.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::models::{Category, Difficulty, fixtures::game};

    #[test]
    fn embedded_catalog_is_valid_and_ordered() {
        let catalog = Catalog::embedded().unwrap();
        let ids: Vec<_> = catalog.games().iter().map(|g| g.id.as_str()).collect();
        assert_eq!(
            ids,
            [
                "uno",
                "charades",
                "monopoly",
                "two-truths-one-lie",
                "poker",
                "scavenger-hunt"
            ]
        );
        assert_eq!(catalog.get("uno").unwrap().category, Category::CardGames);
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let a = game("dup", "A", Category::CardGames, Difficulty::Easy);
        let b = game("dup", "B", Category::BoardGames, Difficulty::Hard);
        assert!(matches!(
            Catalog::new(vec![a, b]),
            Err(CatalogError::DuplicateId(id)) if id == "dup"
        ));
    }

    #[test]
    fn invalid_records_are_rejected() {
        let mut bad = game("bad", "Bad", Category::CardGames, Difficulty::Easy);
        bad.min_players = 0;
        assert!(matches!(
            Catalog::new(vec![bad]),
            Err(CatalogError::Invalid { id, .. }) if id == "bad"
        ));
    }

    #[tokio::test]
    async fn load_reads_override_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        let games = vec![game("chess", "Chess", Category::BoardGames, Difficulty::Hard)];
        std::fs::write(&path, serde_json::to_string(&games).unwrap()).unwrap();

        let catalog = Catalog::load(Some(&path)).await.unwrap();
        assert_eq!(catalog.len(), 1);
        assert!(catalog.get("chess").is_some());
    }
}
