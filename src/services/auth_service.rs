//! Registration and session resolution.

use uuid::Uuid;
use validator::Validate;

use crate::{
    dao::models::{EventEntity, UserEntity},
    dto::auth::{MeResponse, RegisterRequest, RegisterResponse},
    error::ServiceError,
    state::SharedState,
};

/// Register a participant into an event and mint their anonymous session
/// token.
pub async fn register(
    state: &SharedState,
    request: RegisterRequest,
) -> Result<RegisterResponse, ServiceError> {
    request
        .validate()
        .map_err(|err| ServiceError::Validation(format!("validation failed: {err}")))?;

    let event = state
        .store()
        .find_event_by_code(&request.event_code)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Event not found".into()))?;

    if state
        .store()
        .find_user_by_username(event.id, &request.username)
        .await?
        .is_some()
    {
        return Err(ServiceError::Conflict(
            "Username already taken in this event".into(),
        ));
    }

    let user = UserEntity {
        id: Uuid::new_v4(),
        event_id: event.id,
        username: request.username,
        token: Uuid::new_v4().to_string(),
    };
    state.store().create_user(user.clone()).await?;

    Ok(RegisterResponse {
        user: (&user).into(),
        event: (&event).into(),
        token: user.token,
    })
}

/// Resolve a session token to its user and event, or fail as
/// unauthenticated.
pub async fn authenticate(
    state: &SharedState,
    token: Option<&str>,
) -> Result<(UserEntity, EventEntity), ServiceError> {
    let token = token.ok_or_else(|| ServiceError::Unauthorized("Not authenticated".into()))?;
    let user = state
        .store()
        .find_user_by_token(token)
        .await?
        .ok_or_else(|| ServiceError::Unauthorized("Not authenticated".into()))?;
    let event = state
        .store()
        .find_event(user.event_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound("event for this session no longer exists".into()))?;
    Ok((user, event))
}

/// Describe the calling session.
pub async fn me(state: &SharedState, token: Option<&str>) -> Result<MeResponse, ServiceError> {
    let (user, event) = authenticate(state, token).await?;
    Ok(MeResponse {
        user: (&user).into(),
        event: (&event).into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::{
        config::AppConfig,
        dao::{memory::MemoryStore, models::EventEntity, store::EventStore},
        state::AppState,
    };

    async fn state_with_event(code: &str) -> SharedState {
        let store = MemoryStore::new();
        store
            .seed_event(EventEntity::new(code, "Wing Night"), vec![], 6)
            .await
            .unwrap();
        AppState::new(Arc::new(store), AppConfig::default())
    }

    fn request(code: &str, username: &str) -> RegisterRequest {
        RegisterRequest {
            event_code: code.into(),
            username: username.into(),
        }
    }

    #[tokio::test]
    async fn register_then_authenticate_round_trip() {
        let state = state_with_event("WINGS").await;
        let response = register(&state, request("WINGS", "alice")).await.unwrap();
        assert_eq!(response.user.username, "alice");
        assert_eq!(response.event.code, "WINGS");

        let (user, event) = authenticate(&state, Some(&response.token)).await.unwrap();
        assert_eq!(user.username, "alice");
        assert_eq!(event.code, "WINGS");
    }

    #[tokio::test]
    async fn register_unknown_event_is_not_found() {
        let state = state_with_event("WINGS").await;
        let err = register(&state, request("NOPE", "alice")).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn duplicate_username_is_a_conflict() {
        let state = state_with_event("WINGS").await;
        register(&state, request("WINGS", "alice")).await.unwrap();
        let err = register(&state, request("WINGS", "alice")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
    }

    #[tokio::test]
    async fn malformed_username_is_rejected() {
        let state = state_with_event("WINGS").await;
        let err = register(&state, request("WINGS", "al ice"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn missing_or_bogus_token_is_unauthorized() {
        let state = state_with_event("WINGS").await;
        assert!(matches!(
            authenticate(&state, None).await.unwrap_err(),
            ServiceError::Unauthorized(_)
        ));
        assert!(matches!(
            authenticate(&state, Some("not-a-token")).await.unwrap_err(),
            ServiceError::Unauthorized(_)
        ));
    }
}
