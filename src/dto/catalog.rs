use serde::{Deserialize, Serialize};
use serde_with::{NoneAsEmptyString, serde_as};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::{
    dao::models::{Category, Difficulty, GameRecord},
    services::catalog_service::GameFilter,
};

/// Query string of `GET /games`; empty values count as unset.
#[serde_as]
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct GameQuery {
    /// Case-insensitive substring of name, description or tags.
    #[serde(default)]
    pub query: Option<String>,
    /// Category wire name, e.g. `card-games`.
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    #[param(value_type = Option<Category>)]
    pub category: Option<Category>,
    /// `Easy`, `Medium` or `Hard`.
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    #[param(value_type = Option<Difficulty>)]
    pub difficulty: Option<Difficulty>,
    /// Party size; 0 counts as unset.
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    #[param(value_type = Option<u32>)]
    pub players: Option<u32>,
}

impl From<GameQuery> for GameFilter {
    fn from(query: GameQuery) -> Self {
        GameFilter {
            query: query.query.unwrap_or_default(),
            category: query.category,
            difficulty: query.difficulty,
            players: query.players.filter(|players| *players > 0),
        }
    }
}

/// Body of `POST /games/recommend`.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct RecommendRequest {
    /// What the user is looking for, in their own words.
    #[validate(length(min = 1, max = 500))]
    pub query: String,
}

/// Outcome of an "ask AI" recommendation.
#[derive(Debug, Serialize, ToSchema)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RecommendationResponse {
    /// The model named a catalog game; the client navigates to `path`.
    Match {
        /// Identifier of the recommended game.
        game_id: String,
        /// Client route, `/game/{slug}`.
        path: String,
        /// Full record of the recommended game.
        game: GameRecord,
    },
    /// The model reply did not name a catalog game.
    NoMatch {
        /// Text to show instead of a game.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_strings_are_unset() {
        let query: GameQuery =
            serde_urlencoded_like("query=&category=&difficulty=&players=");
        let filter = GameFilter::from(query);
        assert_eq!(filter, GameFilter::default());
    }

    #[test]
    fn zero_players_is_unset() {
        let query: GameQuery = serde_urlencoded_like("players=0&category=card-games");
        let filter = GameFilter::from(query);
        assert_eq!(filter.players, None);
        assert_eq!(filter.category, Some(Category::CardGames));
    }

    #[test]
    fn recommendation_outcome_is_tagged() {
        let body = serde_json::to_value(RecommendationResponse::NoMatch {
            message: "none".into(),
        })
        .unwrap();
        assert_eq!(body["outcome"], "no_match");
        assert_eq!(body["message"], "none");
    }

    fn serde_urlencoded_like(raw: &str) -> GameQuery {
        let uri: axum::http::Uri = format!("/games?{raw}").parse().unwrap();
        axum::extract::Query::<GameQuery>::try_from_uri(&uri)
            .unwrap()
            .0
    }
}
