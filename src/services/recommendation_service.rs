//! "Ask AI": let the hosted model pick one catalog game for a free-text request.

use std::fmt::Write as _;

use tracing::{error, info};

use crate::{
    config::CatalogDetail,
    dao::{
        catalog::Catalog,
        models::GameRecord,
        provider::{Content, ContentRole, GenerateRequest},
    },
    error::ServiceError,
    services::catalog_service,
    state::SharedState,
};

/// Shown when the reply names no catalog game.
pub const NO_MATCH_MESSAGE: &str =
    "No matching game found. Try describing what you're looking for differently.";
/// 500 message for any provider failure.
pub const RECOMMENDATION_FAILED: &str = "Failed to get a recommendation. Please try again.";

/// What the model's answer resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recommendation {
    /// The reply named this game.
    Match(GameRecord),
    /// No catalog game was named.
    NoMatch,
}

/// Prompt embedding the catalog and the user's request.
pub fn build_prompt(catalog: &Catalog, detail: CatalogDetail, query: &str) -> String {
    let mut prompt = String::from(
        "You help people pick a game to play. Choose the single best game from the catalog \
         below for the request. Reply with the game id only, with no other text.\n\nCatalog:\n",
    );

    match detail {
        CatalogDetail::Summary => {
            for game in catalog.games() {
                let _ = writeln!(
                    prompt,
                    "- id: {} | name: {} | category: {} | players: {}-{} | difficulty: {} | tags: {} | {}",
                    game.id,
                    game.name,
                    game.category,
                    game.min_players,
                    game.max_players,
                    game.difficulty,
                    game.tags.join(", "),
                    game.description,
                );
            }
        }
        CatalogDetail::Full => {
            let json = serde_json::to_string_pretty(catalog.games()).unwrap_or_default();
            prompt.push_str(&json);
            prompt.push('\n');
        }
    }

    let _ = write!(prompt, "\nRequest: {}\n", query.trim());
    prompt
}

/// Strip decoration models like to add around a bare identifier.
pub fn normalize_reply(reply: &str) -> &str {
    let is_quote = |c: char| c == '"' || c == '\'' || c == '`';
    reply
        .trim()
        .trim_end_matches('.')
        .trim_matches(is_quote)
        .trim_end_matches('.')
        .trim()
}

/// Resolve the model reply against the catalog, by id then slug.
pub fn resolve_reply<'a>(catalog: &'a Catalog, reply: &str) -> Option<&'a GameRecord> {
    let candidate = normalize_reply(reply);
    if candidate.is_empty() {
        return None;
    }
    catalog_service::find_game(catalog, candidate)
        .or_else(|| catalog_service::find_game(catalog, &candidate.to_lowercase()))
}

/// Ask the recommendation model for a game matching `query`.
pub async fn recommend(state: &SharedState, query: &str) -> Result<Recommendation, ServiceError> {
    let query = query.trim();
    if query.is_empty() {
        return Err(ServiceError::InvalidInput("query must not be empty".into()));
    }
    let model = state.model().ok_or(ServiceError::Degraded)?;

    let settings = state.config().provider();
    let prompt = build_prompt(state.catalog(), state.config().recommendation_catalog(), query);
    let reply = model
        .generate(GenerateRequest {
            model: settings.recommendation_model.clone(),
            system_instruction: None,
            contents: vec![Content::text(ContentRole::User, prompt)],
        })
        .await
        .map_err(|err| {
            error!(error = %err, "recommendation request failed");
            ServiceError::Upstream(RECOMMENDATION_FAILED.into())
        })?;

    match resolve_reply(state.catalog(), &reply) {
        Some(game) => {
            info!(game_id = %game.id, "recommendation matched catalog game");
            Ok(Recommendation::Match(game.clone()))
        }
        None => {
            info!(reply = %reply.trim(), "recommendation did not match the catalog");
            Ok(Recommendation::NoMatch)
        }
    }
}
