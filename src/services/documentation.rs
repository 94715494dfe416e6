use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Game Tutor Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::games::list_games,
        crate::routes::games::sponsored_games,
        crate::routes::games::get_game,
        crate::routes::games::recommend_game,
        crate::routes::favorites::list_favorites,
        crate::routes::favorites::add_favorite,
        crate::routes::favorites::remove_favorite,
        crate::routes::favorites::toggle_favorite,
        crate::routes::api::chat,
        crate::routes::api::transcribe,
        crate::routes::tutor::open_session,
        crate::routes::tutor::get_session,
        crate::routes::tutor::send_message,
        crate::routes::tutor::reset_session,
        crate::routes::tutor::close_session,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::health::HealthStatus,
            crate::dao::models::GameRecord,
            crate::dao::models::Category,
            crate::dao::models::Difficulty,
            crate::dto::catalog::RecommendRequest,
            crate::dto::catalog::RecommendationResponse,
            crate::dto::favorites::FavoritesResponse,
            crate::dto::favorites::ToggleFavoriteResponse,
            crate::dto::chat::ChatRequest,
            crate::dto::chat::ChatMessage,
            crate::dto::chat::ChatResponse,
            crate::dto::chat::TranscriptionResponse,
            crate::dto::chat::TranscriptionUpload,
            crate::dto::tutor::OpenSessionRequest,
            crate::dto::tutor::SendMessageRequest,
            crate::dto::tutor::TurnDto,
            crate::dto::tutor::TutorSessionResponse,
            crate::state::tutor::Role,
            crate::state::tutor::TutorPhase,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "games", description = "Catalog browsing and recommendations"),
        (name = "favorites", description = "Favorite games"),
        (name = "proxy", description = "Completion and transcription proxies"),
        (name = "tutor", description = "Server-hosted tutor sessions"),
    )
)]
pub struct ApiDoc;
