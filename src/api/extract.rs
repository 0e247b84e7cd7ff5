//! Request extractors: the signed-in user, plus query and JSON bodies whose
//! rejections use the API error envelope.

use axum::extract::{FromRequest, FromRequestParts, Query, Request};
use axum::http::request::Parts;
use axum::Json;
use serde::de::DeserializeOwned;

use crate::app_state::AppState;
use crate::domain::{Profile, UserId};
use crate::error::TouchlineError;

/// The signed-in user, with their profile provisioned on first access.
///
/// Rejects anonymous requests with [`TouchlineError::Unauthenticated`].
#[derive(Debug, Clone)]
pub struct AuthUser(pub Profile);

impl AuthUser {
    /// The user's id.
    #[must_use]
    pub const fn id(&self) -> UserId {
        self.0.id
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = TouchlineError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let principal = state
            .identity
            .current_user(&parts.headers)
            .ok_or(TouchlineError::Unauthenticated)?;
        let profile = state.profiles.ensure_profile(&principal).await?;
        Ok(Self(profile))
    }
}

/// The viewer of a read endpoint, if anyone is signed in.
#[derive(Debug, Clone, Copy)]
pub struct MaybeUser(pub Option<UserId>);

impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = TouchlineError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self(
            state
                .identity
                .current_user(&parts.headers)
                .map(|principal| principal.id),
        ))
    }
}

/// [`Query`] that rejects malformed parameters with
/// [`TouchlineError::InvalidRequest`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = TouchlineError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| TouchlineError::InvalidRequest(rejection.body_text()))?;
        Ok(Self(value))
    }
}

/// [`Json`] body that rejects malformed input with
/// [`TouchlineError::InvalidRequest`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = TouchlineError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| TouchlineError::InvalidRequest(rejection.body_text()))?;
        Ok(Self(value))
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request as HttpRequest;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Params {
        page: u32,
    }

    #[tokio::test]
    async fn bad_query_is_an_invalid_request() {
        let Ok(req) = HttpRequest::builder().uri("/feed?page=two").body(()) else {
            panic!("request build failed");
        };
        let (mut parts, ()) = req.into_parts();
        let outcome = ApiQuery::<Params>::from_request_parts(&mut parts, &()).await;
        assert!(matches!(outcome, Err(TouchlineError::InvalidRequest(_))));

        let Ok(req) = HttpRequest::builder().uri("/feed?page=2").body(()) else {
            panic!("request build failed");
        };
        let (mut parts, ()) = req.into_parts();
        let Ok(ApiQuery(params)) = ApiQuery::<Params>::from_request_parts(&mut parts, &()).await
        else {
            panic!("valid query rejected");
        };
        assert_eq!(params.page, 2);
    }

    #[tokio::test]
    async fn bad_json_is_an_invalid_request() {
        let Ok(req) = HttpRequest::builder()
            .uri("/logs")
            .header("content-type", "application/json")
            .body(Body::from("{\"page\":"))
        else {
            panic!("request build failed");
        };
        let outcome = ApiJson::<Params>::from_request(req, &()).await;
        assert!(matches!(outcome, Err(TouchlineError::InvalidRequest(_))));
    }
}
