use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

/// Turn appended in place of a reply whenever a round trip fails.
pub const APOLOGY_MESSAGE: &str = "Sorry, I encountered an error. Please try again.";

/// Time-ordered identifier of a conversation turn.
pub type TurnId = Uuid;
/// Unique identifier of one request/response exchange with the completion endpoint.
pub type RoundTripId = Uuid;

/// Author of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The person learning the game.
    User,
    /// The tutor; also accepted as `model`.
    #[serde(alias = "model")]
    Assistant,
}

/// One message of a tutor conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    /// Time-ordered identifier.
    pub id: TurnId,
    /// Author of the turn.
    pub role: Role,
    /// Markdown text.
    pub content: String,
    /// Creation time.
    pub created_at: SystemTime,
}

impl Turn {
    /// Turn stamped with a fresh v7 id and the current time.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            role,
            content: content.into(),
            created_at: SystemTime::now(),
        }
    }

    /// User turn.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Assistant turn.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// Lifecycle of one tutor panel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TutorPhase {
    /// Panel closed; no transcript.
    #[default]
    Idle,
    /// Panel opened; the welcome request is pending or about to be issued.
    Initializing,
    /// Welcome received (or apologized for); user turns are accepted.
    Active,
}

/// Whether a round trip greets the user or answers a user turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundTripKind {
    /// Welcome requested when the panel opens.
    Initialization,
    /// Answer to a user turn.
    Reply,
}

/// Payload for the completion endpoint: the out-of-band instruction plus the full transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    /// Persona and game data, sent out of band.
    pub instruction: Option<String>,
    /// Transcript so far, oldest first.
    pub turns: Vec<Turn>,
}

/// Ticket for a round trip that has been started but not yet resolved.
#[derive(Debug, Clone)]
pub struct RoundTrip {
    /// Ticket resolving this round trip.
    pub id: RoundTripId,
    /// What the answer will be used for.
    pub kind: RoundTripKind,
    /// Payload for the completion client.
    pub request: CompletionRequest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingRoundTrip {
    id: RoundTripId,
    kind: RoundTripKind,
}

/// Game-specific context fixed when the panel opens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TutorContext {
    /// Game being taught.
    pub game_id: String,
    /// Anchors the assistant to the game; sent alongside every request.
    pub instruction: String,
    /// Synthetic first user turn asking for the welcome.
    pub kickoff: String,
}

/// Errors raised when an operation does not fit the current phase.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TutorError {
    /// The session is already open.
    #[error("tutor panel is already open")]
    NotIdle,
    /// The session is closed.
    #[error("tutor panel is not open")]
    NotOpen,
    /// Still waiting for the welcome.
    #[error("tutor panel is not accepting messages yet")]
    NotActive,
    /// Another round trip is in flight.
    #[error("a response is still pending")]
    Busy,
    /// Blank after trimming.
    #[error("message is empty")]
    EmptyMessage,
}

/// Errors raised when resolving a round trip ticket.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoundTripError {
    /// No round trip is pending (the panel was closed meanwhile).
    #[error("no round trip is pending")]
    NoPending,
    /// The ticket belongs to an earlier round trip or panel-open.
    #[error("round trip {got} does not match pending {expected}")]
    IdMismatch {
        /// Ticket currently pending.
        expected: RoundTripId,
        /// Ticket that was presented.
        got: RoundTripId,
    },
}

/// Read-only view of a tutor session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TutorSnapshot {
    /// Lifecycle phase.
    pub phase: TutorPhase,
    /// Game being taught while open.
    pub game_id: Option<String>,
    /// A round trip is in flight.
    pub busy: bool,
    /// Turns, oldest first.
    pub transcript: Vec<Turn>,
}

/// Conversation state for one tutor panel.
///
/// Round trips follow a start/resolve protocol: starting returns a [`RoundTrip`]
/// ticket, the caller performs the network exchange without holding the session,
/// and then resolves the ticket with [`TutorSession::complete`] or
/// [`TutorSession::fail`]. Tickets that no longer match are rejected so late
/// results from a closed panel never reach a newer transcript.
#[derive(Debug, Clone, Default)]
pub struct TutorSession {
    phase: TutorPhase,
    context: Option<TutorContext>,
    transcript: Vec<Turn>,
    initialization_started: bool,
    pending: Option<PendingRoundTrip>,
}

impl TutorSession {
    /// Closed session with an empty transcript.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> TutorPhase {
        self.phase
    }

    /// Turns, oldest first.
    pub fn transcript(&self) -> &[Turn] {
        &self.transcript
    }

    /// True while a round trip is in flight.
    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    /// Owned copy of the visible state.
    pub fn snapshot(&self) -> TutorSnapshot {
        TutorSnapshot {
            phase: self.phase,
            game_id: self.context.as_ref().map(|context| context.game_id.clone()),
            busy: self.is_busy(),
            transcript: self.transcript.clone(),
        }
    }

    /// Idle → Initializing.
    pub fn open(&mut self, context: TutorContext) -> Result<(), TutorError> {
        if self.phase != TutorPhase::Idle {
            return Err(TutorError::NotIdle);
        }

        self.phase = TutorPhase::Initializing;
        self.context = Some(context);
        self.transcript.clear();
        self.initialization_started = false;
        self.pending = None;
        Ok(())
    }

    /// Start the welcome round trip.
    ///
    /// Returns `None` when initialization was already started for this panel-open
    /// or the panel is past initialization, so repeated triggers issue one request.
    pub fn begin_initialization(&mut self) -> Result<Option<RoundTrip>, TutorError> {
        let context = match (&self.phase, &self.context) {
            (TutorPhase::Idle, _) | (_, None) => return Err(TutorError::NotOpen),
            (TutorPhase::Active, _) => return Ok(None),
            (TutorPhase::Initializing, Some(context)) => context,
        };
        if self.initialization_started {
            return Ok(None);
        }

        let instruction = context.instruction.clone();
        let kickoff = Turn::user(context.kickoff.clone());
        self.initialization_started = true;
        self.transcript.push(kickoff);

        Ok(Some(self.start(RoundTripKind::Initialization, instruction)))
    }

    /// Append a user turn and start its round trip.
    pub fn begin_reply(&mut self, text: &str) -> Result<RoundTrip, TutorError> {
        match self.phase {
            TutorPhase::Idle => return Err(TutorError::NotOpen),
            TutorPhase::Initializing => return Err(TutorError::NotActive),
            TutorPhase::Active => {}
        }
        if self.is_busy() {
            return Err(TutorError::Busy);
        }

        let text = text.trim();
        if text.is_empty() {
            return Err(TutorError::EmptyMessage);
        }

        let instruction = self
            .context
            .as_ref()
            .map(|context| context.instruction.clone())
            .ok_or(TutorError::NotOpen)?;
        self.transcript.push(Turn::user(text));

        Ok(self.start(RoundTripKind::Reply, instruction))
    }

    /// Resolve a round trip with the assistant reply.
    pub fn complete(&mut self, id: RoundTripId, reply: String) -> Result<Turn, RoundTripError> {
        self.resolve(id, Turn::assistant(reply))
    }

    /// Resolve a round trip that failed, appending the apology turn.
    ///
    /// A failed initialization still activates the panel and clears the
    /// initialization guard.
    pub fn fail(&mut self, id: RoundTripId) -> Result<Turn, RoundTripError> {
        let kind = self.pending_kind(id)?;
        if kind == RoundTripKind::Initialization {
            self.initialization_started = false;
        }
        self.resolve(id, Turn::assistant(APOLOGY_MESSAGE))
    }

    /// Active → Initializing with an empty transcript, so the welcome can be requested again.
    pub fn reset(&mut self) -> Result<(), TutorError> {
        match self.phase {
            TutorPhase::Idle => return Err(TutorError::NotOpen),
            TutorPhase::Initializing => return Err(TutorError::NotActive),
            TutorPhase::Active => {}
        }
        if self.is_busy() {
            return Err(TutorError::Busy);
        }

        self.phase = TutorPhase::Initializing;
        self.transcript.clear();
        self.initialization_started = false;
        Ok(())
    }

    /// Any phase → Idle, discarding the transcript and any pending ticket.
    pub fn close(&mut self) {
        self.phase = TutorPhase::Idle;
        self.context = None;
        self.transcript.clear();
        self.initialization_started = false;
        self.pending = None;
    }

    fn start(&mut self, kind: RoundTripKind, instruction: String) -> RoundTrip {
        let id = Uuid::new_v4();
        self.pending = Some(PendingRoundTrip { id, kind });
        RoundTrip {
            id,
            kind,
            request: CompletionRequest {
                instruction: Some(instruction),
                turns: self.transcript.clone(),
            },
        }
    }

    fn pending_kind(&self, id: RoundTripId) -> Result<RoundTripKind, RoundTripError> {
        let pending = self.pending.ok_or(RoundTripError::NoPending)?;
        if pending.id != id {
            return Err(RoundTripError::IdMismatch {
                expected: pending.id,
                got: id,
            });
        }
        Ok(pending.kind)
    }

    fn resolve(&mut self, id: RoundTripId, turn: Turn) -> Result<Turn, RoundTripError> {
        self.pending_kind(id)?;
        self.pending = None;
        self.phase = TutorPhase::Active;
        self.transcript.push(turn.clone());
        Ok(turn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> TutorContext {
        TutorContext {
            game_id: "uno".into(),
            instruction: "You teach UNO.".into(),
            kickoff: "Welcome me.".into(),
        }
    }

    fn opened() -> TutorSession {
        let mut session = TutorSession::new();
        session.open(context()).unwrap();
        session
    }

    fn active() -> TutorSession {
        let mut session = opened();
        let trip = session.begin_initialization().unwrap().unwrap();
        session.complete(trip.id, "Hi!".into()).unwrap();
        session
    }

    #[test]
    fn initial_state_is_idle() {
        let session = TutorSession::new();
        assert_eq!(session.phase(), TutorPhase::Idle);
        assert!(session.transcript().is_empty());
    }

    #[test]
    fn initialization_is_issued_once_per_open() {
        let mut session = opened();

        let first = session.begin_initialization().unwrap();
        assert!(first.is_some());
        for _ in 0..5 {
            assert!(session.begin_initialization().unwrap().is_none());
        }
        assert_eq!(session.transcript().len(), 1);
    }

    #[test]
    fn initialization_request_carries_instruction_and_kickoff() {
        let mut session = opened();
        let trip = session.begin_initialization().unwrap().unwrap();

        assert_eq!(trip.kind, RoundTripKind::Initialization);
        assert_eq!(trip.request.instruction.as_deref(), Some("You teach UNO."));
        assert_eq!(trip.request.turns.len(), 1);
        assert_eq!(trip.request.turns[0].role, Role::User);
        assert_eq!(trip.request.turns[0].content, "Welcome me.");
    }

    #[test]
    fn successful_initialization_activates_panel() {
        let session = active();
        assert_eq!(session.phase(), TutorPhase::Active);
        assert!(!session.is_busy());
        let last = session.transcript().last().unwrap();
        assert_eq!(last.role, Role::Assistant);
        assert_eq!(last.content, "Hi!");
    }

    #[test]
    fn failed_initialization_leaves_usable_panel_with_one_apology() {
        let mut session = opened();
        let trip = session.begin_initialization().unwrap().unwrap();
        session.fail(trip.id).unwrap();

        assert_eq!(session.phase(), TutorPhase::Active);
        let apologies = session
            .transcript()
            .iter()
            .filter(|turn| turn.content == APOLOGY_MESSAGE)
            .count();
        assert_eq!(apologies, 1);
        // Re-render after failure does not silently retry.
        assert!(session.begin_initialization().unwrap().is_none());

        let reply = session.begin_reply("How do I win?").unwrap();
        assert_eq!(reply.request.turns.len(), 3);
    }

    #[test]
    fn user_turn_is_appended_before_round_trip() {
        let mut session = active();
        let trip = session.begin_reply("  What is a wild card?  ").unwrap();

        let last = session.transcript().last().unwrap();
        assert_eq!(last.role, Role::User);
        assert_eq!(last.content, "What is a wild card?");
        assert_eq!(trip.request.turns.last(), Some(last));
        assert!(session.is_busy());
    }

    #[test]
    fn no_pipelining_while_busy() {
        let mut session = active();
        session.begin_reply("first").unwrap();
        assert_eq!(session.begin_reply("second").unwrap_err(), TutorError::Busy);
        assert_eq!(session.reset(), Err(TutorError::Busy));
    }

    #[test]
    fn empty_messages_are_rejected() {
        let mut session = active();
        assert_eq!(
            session.begin_reply("   ").unwrap_err(),
            TutorError::EmptyMessage
        );
        assert!(!session.is_busy());
    }

    #[test]
    fn messages_require_active_phase() {
        let mut idle = TutorSession::new();
        assert_eq!(idle.begin_reply("hi").unwrap_err(), TutorError::NotOpen);

        let mut initializing = opened();
        assert_eq!(
            initializing.begin_reply("hi").unwrap_err(),
            TutorError::NotActive
        );
    }

    #[test]
    fn failed_reply_appends_apology_and_accepts_next_turn() {
        let mut session = active();
        let trip = session.begin_reply("rules?").unwrap();
        let turn = session.fail(trip.id).unwrap();

        assert_eq!(turn.content, APOLOGY_MESSAGE);
        assert!(!session.is_busy());
        assert!(session.begin_reply("again?").is_ok());
    }

    #[test]
    fn close_discards_transcript_and_late_results() {
        let mut session = active();
        let trip = session.begin_reply("rules?").unwrap();
        session.close();

        assert_eq!(session.phase(), TutorPhase::Idle);
        assert!(session.transcript().is_empty());
        assert_eq!(
            session.complete(trip.id, "late".into()),
            Err(RoundTripError::NoPending)
        );
    }

    #[test]
    fn stale_ticket_from_previous_open_is_rejected() {
        let mut session = opened();
        let stale = session.begin_initialization().unwrap().unwrap();
        session.close();
        session.open(context()).unwrap();
        let fresh = session.begin_initialization().unwrap().unwrap();

        match session.complete(stale.id, "late".into()) {
            Err(RoundTripError::IdMismatch { expected, got }) => {
                assert_eq!(expected, fresh.id);
                assert_eq!(got, stale.id);
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert_eq!(session.transcript().len(), 1);
    }

    #[test]
    fn reset_allows_a_new_initialization() {
        let mut session = opened();
        let trip = session.begin_initialization().unwrap().unwrap();
        session.fail(trip.id).unwrap();

        session.reset().unwrap();
        assert_eq!(session.phase(), TutorPhase::Initializing);
        assert!(session.transcript().is_empty());
        assert!(session.begin_initialization().unwrap().is_some());
    }

    #[test]
    fn open_twice_is_rejected() {
        let mut session = opened();
        assert_eq!(session.open(context()), Err(TutorError::NotIdle));
    }

    #[test]
    fn role_accepts_model_alias() {
        let role: Role = serde_json::from_str("\"model\"").unwrap();
        assert_eq!(role, Role::Assistant);
        assert_eq!(serde_json::to_string(&Role::Assistant).unwrap(), "\"assistant\"");
    }
}
