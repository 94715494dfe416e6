use std::fmt;

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

/// Catalog grouping a game belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    /// Played with a deck of cards.
    CardGames,
    /// Played on a board with pieces.
    BoardGames,
    /// Short games to help people get to know each other.
    IcebreakerGames,
    /// Party games for groups.
    GetTogetherGames,
}

/// How demanding the rules are to learn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum Difficulty {
    /// Learned in a few minutes.
    Easy,
    /// Needs one practice round.
    Medium,
    /// Several rounds before it clicks.
    Hard,
}

impl Category {
    /// Wire name used by the catalog JSON and query strings.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::CardGames => "card-games",
            Category::BoardGames => "board-games",
            Category::IcebreakerGames => "icebreaker-games",
            Category::GetTogetherGames => "get-together-games",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Difficulty {
    /// Wire name used by the catalog JSON and query strings.
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = serde::de::value::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::deserialize(serde::de::value::StrDeserializer::new(s))
    }
}

impl std::str::FromStr for Difficulty {
    type Err = serde::de::value::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::deserialize(serde::de::value::StrDeserializer::new(s))
    }
}

/// Immutable catalog entry describing one game and how to play it.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_player_range"))]
pub struct GameRecord {
    /// Stable catalog identifier.
    #[validate(length(min = 1))]
    pub id: String,
    /// Display name.
    #[validate(length(min = 1))]
    pub name: String,
    /// Catalog section.
    pub category: Category,
    /// Smallest supported party.
    #[validate(range(min = 1))]
    pub min_players: u32,
    /// Largest supported party.
    pub max_players: u32,
    /// Recommended ages, e.g. `7+`.
    pub age_range: String,
    /// Typical length of one game.
    pub duration: String,
    /// How hard it is to learn.
    pub difficulty: Difficulty,
    /// One-paragraph pitch.
    pub description: String,
    /// What you need to play.
    #[serde(default)]
    pub equipment: Vec<String>,
    /// Rules in play order.
    #[serde(default)]
    pub basic_rules: Vec<String>,
    /// Free-form search keywords.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Higher values are shown more prominently in the sponsored strip.
    #[validate(range(min = 1))]
    pub sponsor_priority: Option<u32>,
    /// Sponsor landing page.
    #[validate(url)]
    pub sponsor_website: Option<String>,
}

impl GameRecord {
    /// URL-friendly form of the display name (`"Two Truths"` → `"two-truths"`).
    pub fn slug(&self) -> String {
        self.name
            .to_lowercase()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("-")
    }

    /// Whether the game appears in the sponsored strip.
    pub fn is_sponsored(&self) -> bool {
        self.sponsor_priority.is_some_and(|priority| priority > 0)
    }

    /// Sponsor website, only when the game carries both sponsorship fields.
    pub fn sponsor_link(&self) -> Option<&str> {
        if self.is_sponsored() {
            self.sponsor_website.as_deref()
        } else {
            None
        }
    }

    /// True when `players` falls within the supported party size.
    pub fn accepts_players(&self, players: u32) -> bool {
        self.min_players <= players && players <= self.max_players
    }
}

fn validate_player_range(game: &GameRecord) -> Result<(), ValidationError> {
    if game.min_players > game.max_players {
        let mut err = ValidationError::new("player_range");
        err.message = Some(
            format!(
                "minPlayers ({}) must not exceed maxPlayers ({})",
                game.min_players, game.max_players
            )
            .into(),
        );
        return Err(err);
    }
    Ok(())
}
