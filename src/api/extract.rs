use axum::{
    async_trait,
    extract::{FromRequestParts, Path, Query},
    http::{request::Parts, StatusCode},
};
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// `Path<T>` whose rejections are reported with the API error envelope
#[derive(Debug)]
pub struct ApiPath<T>(pub T);

/// `Query<T>` whose rejections are reported with the API error envelope
#[derive(Debug)]
pub struct ApiQuery<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ApiPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<T>::from_request_parts(parts, state).await {
            Ok(Path(value)) => Ok(ApiPath(value)),
            Err(rejection) => Err(rejection_to_error(rejection.status(), rejection.body_text())),
        }
    }
}

#[async_trait]
impl<T, S> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(ApiQuery(value)),
            Err(rejection) => Err(rejection_to_error(rejection.status(), rejection.body_text())),
        }
    }
}

// A 5xx rejection means the route and extractor disagree, not a bad request
fn rejection_to_error(status: StatusCode, text: String) -> ApiError {
    if status.is_server_error() {
        tracing::error!("Extractor misconfigured: {}", text);
        return ApiError::internal_server_error("An error occurred while processing your request");
    }
    ApiError::bad_request(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Window {
        days: Option<i32>,
    }

    async fn query_of(uri: &str) -> Result<ApiQuery<Window>, ApiError> {
        let (mut parts, _) = Request::builder().uri(uri).body(()).unwrap().into_parts();
        ApiQuery::<Window>::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn query_parses_into_target() {
        let ApiQuery(window) = query_of("/api/checkins/summary?days=30").await.unwrap();
        assert_eq!(window.days, Some(30));
    }

    #[tokio::test]
    async fn bad_query_uses_error_envelope() {
        let err = query_of("/api/checkins/summary?days=abc").await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        let body = err.to_json();
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "BAD_REQUEST");
    }

    #[test]
    fn server_side_rejections_stay_internal() {
        let err = rejection_to_error(StatusCode::INTERNAL_SERVER_ERROR, "no params".into());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
