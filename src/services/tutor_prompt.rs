use std::fmt::Write as _;

use crate::{dao::models::GameRecord, state::tutor::TutorContext};

/// Context anchoring a tutor conversation to `game`.
pub fn tutor_context(game: &GameRecord) -> TutorContext {
    TutorContext {
        game_id: game.id.clone(),
        instruction: instruction(game),
        kickoff: kickoff(game),
    }
}

/// Instruction sent out of band with every completion request of the session.
pub fn instruction(game: &GameRecord) -> String {
    let mut text = format!(
        "You are a friendly and patient game tutor helping people learn to play {name}. \
         Answer questions about the rules, setup, strategy and variations of {name}, and \
         gently steer unrelated questions back to the game.\n\n\
         Formatting rules:\n\
         - Format every reply in Markdown, using short paragraphs, lists and bold text where helpful.\n\
         - Do not use emojis.\n\
         - Write URLs as Markdown links, like [text](https://example.com).\n",
        name = game.name,
    );

    if let Some(website) = game.sponsor_link() {
        let _ = write!(
            text,
            "\n{name} is a sponsored game. When it fits naturally, mention the official \
             website as a Markdown link: [{name}]({website}).\n",
            name = game.name,
        );
    }

    let record = serde_json::to_string_pretty(game).unwrap_or_default();
    let _ = write!(text, "\nGame information:\n```json\n{record}\n```\n");
    text
}

/// Synthetic first user turn requesting the welcome.
pub fn kickoff(game: &GameRecord) -> String {
    format!(
        "Please welcome me and give me a brief overview of {}: what it is, who it's for, \
         and how a round works.",
        game.name
    )
}
