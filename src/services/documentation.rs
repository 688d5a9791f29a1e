use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Chicken Box Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::websocket::ws_handler,
        crate::routes::auth::register,
        crate::routes::auth::me,
        crate::routes::game::submit_guess,
        crate::routes::game::my_guesses,
        crate::routes::game::submit_ranking,
        crate::routes::game::my_rankings,
        crate::routes::game::list_places,
        crate::routes::game::answers,
        crate::routes::game::event_results,
        crate::routes::admin::seed_event,
        crate::routes::admin::set_phase,
        crate::routes::admin::set_box_mapping,
        crate::routes::admin::event_detail,
        crate::routes::admin::list_events,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::common::Ack,
            crate::dto::auth::RegisterRequest,
            crate::dto::auth::RegisterResponse,
            crate::dto::auth::MeResponse,
            crate::dto::auth::UserSummary,
            crate::dto::auth::EventSummary,
            crate::dto::game::GuessRequest,
            crate::dto::game::GuessView,
            crate::dto::game::GuessesResponse,
            crate::dto::game::RankRequest,
            crate::dto::game::RankingView,
            crate::dto::game::RankingsResponse,
            crate::dto::game::PlacesResponse,
            crate::dto::game::AnswerView,
            crate::dto::game::AnswersResponse,
            crate::dto::results::ResultsPayload,
            crate::dto::results::BoxStatus,
            crate::dto::results::BoxResult,
            crate::dto::results::RankCounts,
            crate::dto::results::UserAccuracy,
            crate::dto::results::UserProgress,
            crate::dto::ws::ClientMessage,
            crate::dto::ws::ServerMessage,
            crate::dto::admin::SeedRequest,
            crate::dto::admin::PhaseRequest,
            crate::dto::admin::MappingRequest,
            crate::dto::admin::AdminBoxView,
            crate::dto::admin::EventDetail,
            crate::dto::admin::EventListItem,
            crate::dto::admin::EventsResponse,
            crate::state::phase::EventPhase,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Registration and session endpoints"),
        (name = "game", description = "Participant gameplay endpoints"),
        (name = "admin", description = "Event administration endpoints"),
        (name = "realtime", description = "WebSocket room for live results"),
    )
)]
pub struct ApiDoc;
