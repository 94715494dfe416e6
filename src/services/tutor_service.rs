//! Server-hosted tutor sessions, kept in memory only.

use std::{sync::Arc, time::Duration};

use tokio::time::{Instant, interval};
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    error::ServiceError,
    services::{catalog_service, chat_proxy::InProcessCompletions, tutor_controller::TutorController},
    state::{SharedState, tutor::TutorSnapshot},
};

const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

fn lookup(state: &SharedState, id: Uuid) -> Result<Arc<TutorController>, ServiceError> {
    let controller = state
        .tutor_sessions()
        .get(&id)
        .map(|entry| Arc::clone(entry.value()))
        .ok_or_else(|| ServiceError::NotFound(format!("tutor session {id}")))?;
    controller.touch();
    Ok(controller)
}

async fn discard(state: &SharedState, id: Uuid) -> bool {
    match state.tutor_sessions().remove(&id) {
        Some((_, controller)) => {
            controller.close().await;
            true
        }
        None => false,
    }
}

/// Close every session idle for longer than the configured timeout.
///
/// Returns how many sessions were closed.
pub async fn expire_idle_sessions(state: &SharedState) -> usize {
    let timeout = state.config().tutor_session_idle_timeout();
    let now = Instant::now();
    let expired: Vec<Uuid> = state
        .tutor_sessions()
        .iter()
        .filter(|entry| now.saturating_duration_since(entry.value().last_active()) >= timeout)
        .map(|entry| *entry.key())
        .collect();

    let mut closed = 0;
    for id in expired {
        if discard(state, id).await {
            info!(session_id = %id, "tutor session expired");
            closed += 1;
        }
    }
    closed
}

/// Evict the least recently active sessions until a new one fits under the cap.
async fn make_room(state: &SharedState) {
    let cap = state.config().max_tutor_sessions().max(1);
    while state.tutor_sessions().len() >= cap {
        let oldest = state
            .tutor_sessions()
            .iter()
            .min_by_key(|entry| entry.value().last_active())
            .map(|entry| *entry.key());
        let Some(id) = oldest else { break };
        if discard(state, id).await {
            info!(session_id = %id, cap, "tutor session evicted");
        }
    }
}

/// Expire idle sessions periodically; runs until the process exits.
pub async fn run_session_sweeper(state: SharedState) {
    let mut ticker = interval(SWEEP_INTERVAL);
    loop {
        ticker.tick().await;
        let closed = expire_idle_sessions(&state).await;
        if closed > 0 {
            debug!(closed, remaining = state.tutor_sessions().len(), "tutor session sweep");
        }
    }
}

/// Open a session for a game id or slug and wait for its welcome turn.
pub async fn open_session(
    state: &SharedState,
    game_key: &str,
) -> Result<(Uuid, TutorSnapshot), ServiceError> {
    let game = catalog_service::get_game(state, game_key)
        .ok_or_else(|| ServiceError::NotFound(format!("game `{game_key}`")))?;

    expire_idle_sessions(state).await;
    make_room(state).await;

    let controller = Arc::new(TutorController::new(Arc::new(InProcessCompletions::new(
        state,
    ))));
    let id = Uuid::new_v4();
    state.tutor_sessions().insert(id, Arc::clone(&controller));
    info!(session_id = %id, game_id = %game.id, "tutor session created");

    let snapshot = controller.open(&game).await?;
    Ok((id, snapshot))
}

/// Current snapshot of a session.
pub async fn get_session(state: &SharedState, id: Uuid) -> Result<TutorSnapshot, ServiceError> {
    Ok(lookup(state, id)?.snapshot().await)
}

/// Send a user turn; 409 while the previous round trip is still pending.
pub async fn send_message(
    state: &SharedState,
    id: Uuid,
    content: &str,
) -> Result<TutorSnapshot, ServiceError> {
    let controller = lookup(state, id)?;
    controller.send_message(content).await?;
    Ok(controller.snapshot().await)
}

/// Clear a session and request a fresh welcome.
pub async fn reset_session(state: &SharedState, id: Uuid) -> Result<TutorSnapshot, ServiceError> {
    let controller = lookup(state, id)?;
    controller.reset().await?;
    Ok(controller.snapshot().await)
}

/// Close and forget a session.
pub async fn close_session(state: &SharedState, id: Uuid) -> Result<(), ServiceError> {
    let (_, controller) = state
        .tutor_sessions()
        .remove(&id)
        .ok_or_else(|| ServiceError::NotFound(format!("tutor session {id}")))?;
    controller.close().await;
    info!(session_id = %id, "tutor session closed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::AppConfig,
        state::tutor::{APOLOGY_MESSAGE, TutorPhase},
        test_support::{FakeLanguageModel, degraded_state, state_with_config, state_with_model},
    };

    fn limited_state(config: &str) -> SharedState {
        state_with_config(
            AppConfig::from_json(config).unwrap(),
            Arc::new(FakeLanguageModel::replying(["Welcome!"])),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn opening_past_the_cap_evicts_least_recently_active_session() {
        let state = limited_state(r#"{ "max_tutor_sessions": 2 }"#);

        let (first, _) = open_session(&state, "uno").await.unwrap();
        tokio::time::advance(Duration::from_secs(1)).await;
        let (second, _) = open_session(&state, "poker").await.unwrap();
        tokio::time::advance(Duration::from_secs(1)).await;
        get_session(&state, first).await.unwrap();
        tokio::time::advance(Duration::from_secs(1)).await;

        let (third, _) = open_session(&state, "charades").await.unwrap();
        assert_eq!(state.tutor_sessions().len(), 2);
        assert!(state.tutor_sessions().contains_key(&first));
        assert!(state.tutor_sessions().contains_key(&third));
        assert!(matches!(
            get_session(&state, second).await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn idle_sessions_expire() {
        let state = limited_state(r#"{ "tutor_session_idle_secs": 60 }"#);

        let (stale, _) = open_session(&state, "uno").await.unwrap();
        tokio::time::advance(Duration::from_secs(45)).await;
        let (recent, _) = open_session(&state, "poker").await.unwrap();
        assert_eq!(expire_idle_sessions(&state).await, 0);

        tokio::time::advance(Duration::from_secs(20)).await;
        assert_eq!(expire_idle_sessions(&state).await, 1);
        assert!(!state.tutor_sessions().contains_key(&stale));
        assert!(state.tutor_sessions().contains_key(&recent));
    }

    #[tokio::test]
    async fn session_lifecycle() {
        let model = Arc::new(FakeLanguageModel::replying(["Welcome!", "Deal seven cards."]));
        let state = state_with_model(model.clone());

        let (id, snapshot) = open_session(&state, "uno").await.unwrap();
        assert_eq!(snapshot.phase, TutorPhase::Active);
        assert_eq!(snapshot.game_id.as_deref(), Some("uno"));

        let snapshot = send_message(&state, id, "How do I start?").await.unwrap();
        assert_eq!(snapshot.transcript.last().unwrap().content, "Deal seven cards.");

        let request = model.requests().remove(1);
        assert!(request.system_instruction.unwrap().contains("UNO"));
        assert_eq!(request.contents.len(), 3);

        close_session(&state, id).await.unwrap();
        assert!(matches!(
            get_session(&state, id).await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn unknown_game_is_not_found() {
        let state = state_with_model(Arc::new(FakeLanguageModel::replying(["unused"])));
        assert!(matches!(
            open_session(&state, "solitaire").await,
            Err(ServiceError::NotFound(_))
        ));
        assert!(state.tutor_sessions().is_empty());
    }

    #[tokio::test]
    async fn degraded_provider_yields_apology_turn() {
        let state = degraded_state();
        let (_, snapshot) = open_session(&state, "monopoly").await.unwrap();
        assert_eq!(snapshot.phase, TutorPhase::Active);
        assert_eq!(snapshot.transcript.last().unwrap().content, APOLOGY_MESSAGE);
    }

    #[tokio::test]
    async fn empty_message_is_invalid_input() {
        let state = state_with_model(Arc::new(FakeLanguageModel::replying(["Hi"])));
        let (id, _) = open_session(&state, "uno").await.unwrap();
        assert!(matches!(
            send_message(&state, id, "  ").await,
            Err(ServiceError::InvalidInput(_))
        ));
    }
}
