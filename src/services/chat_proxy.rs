//! Stateless completion proxy in front of the hosted chat model.

use std::sync::{Arc, Weak};

use futures::future::BoxFuture;
use tracing::{debug, error};

use crate::{
    dao::{
        provider::{Content, ContentRole, GenerateRequest},
        proxy::{CompletionClient, ProxyClientError, ProxyClientResult},
    },
    dto::chat::{ChatRequest, ChatResponse},
    error::ServiceError,
    state::{
        AppState, SharedState,
        tutor::{CompletionRequest, Role},
    },
};

/// 400 message for a request without messages.
pub const NO_MESSAGES: &str = "No messages provided";
/// 500 message for any provider failure.
pub const CHAT_FAILED: &str = "Failed to process chat request";

fn content_role(role: Role) -> ContentRole {
    match role {
        Role::User => ContentRole::User,
        Role::Assistant => ContentRole::Model,
    }
}

/// Forward one chat request to the provider.
///
/// Every provider failure collapses to [`CHAT_FAILED`]; details are only logged.
pub async fn complete_chat(
    state: &SharedState,
    request: ChatRequest,
) -> Result<ChatResponse, ServiceError> {
    let messages = request
        .messages
        .filter(|messages| !messages.is_empty())
        .ok_or_else(|| ServiceError::InvalidInput(NO_MESSAGES.into()))?;

    let Some(model) = state.model() else {
        error!("chat request received without a configured provider");
        return Err(ServiceError::Upstream(CHAT_FAILED.into()));
    };

    let generate = GenerateRequest {
        model: state.config().provider().chat_model.clone(),
        system_instruction: request
            .instruction
            .filter(|instruction| !instruction.trim().is_empty()),
        contents: messages
            .into_iter()
            .map(|message| Content::text(content_role(message.role), message.content))
            .collect(),
    };
    debug!(turns = generate.contents.len(), "forwarding chat request");

    match model.generate(generate).await {
        Ok(content) if !content.trim().is_empty() => Ok(ChatResponse { content }),
        Ok(_) => {
            error!("chat model returned an empty reply");
            Err(ServiceError::Upstream(CHAT_FAILED.into()))
        }
        Err(err) => {
            error!(error = %err, "chat request failed");
            Err(ServiceError::Upstream(CHAT_FAILED.into()))
        }
    }
}

/// [`CompletionClient`] that calls [`complete_chat`] in-process.
///
/// Holds a weak reference so sessions stored in the state do not keep it alive.
#[derive(Clone)]
pub struct InProcessCompletions {
    state: Weak<AppState>,
}

impl InProcessCompletions {
    /// Completions backed by the configured provider.
    pub fn new(state: &SharedState) -> Self {
        Self {
            state: Arc::downgrade(state),
        }
    }
}

impl CompletionClient for InProcessCompletions {
    fn complete(&self, request: CompletionRequest) -> BoxFuture<'static, ProxyClientResult<String>> {
        let state = self.state.clone();
        Box::pin(async move {
            let state = state
                .upgrade()
                .ok_or_else(|| ProxyClientError::Service("application is shutting down".into()))?;
            complete_chat(&state, ChatRequest::from(request))
                .await
                .map(|response| response.content)
                .map_err(|err| ProxyClientError::Service(err.to_string()))
        })
    }
}
