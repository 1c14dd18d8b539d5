//! # Request Body Extraction
//!
//! [`ValidatedJson`] deserializes a JSON body and then runs the DTO's
//! own field checks before the handler sees the value. A body that does
//! not parse is a 400; a parsed body with a bad field is a 422 naming
//! the field, via [`khata_core::ValidationError`].

use axum::extract::{FromRequest, Request};
use axum::Json;
use serde::de::DeserializeOwned;

use khata_core::ValidationError;

use crate::error::AppError;

/// Field checks a request DTO applies after deserialization.
///
/// Serde guarantees shape and types; this trait covers the rules serde
/// cannot express, like "amount is positive" or "kind is one of the
/// ledger's four". Implementations report the first failing field.
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

/// JSON extractor that rejects bad bodies before the handler runs.
#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

#[axum::async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
        value.validate()?;
        Ok(Self(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request as HttpRequest, StatusCode};
    use axum::routing::post;
    use axum::Router;
    use serde::Deserialize;
    use tower::ServiceExt;

    #[derive(Deserialize)]
    struct NameBody {
        name: String,
    }

    impl Validate for NameBody {
        fn validate(&self) -> Result<(), ValidationError> {
            if self.name.trim().is_empty() {
                return Err(ValidationError::Required { field: "name" });
            }
            Ok(())
        }
    }

    fn app() -> Router {
        Router::new().route(
            "/echo",
            post(|ValidatedJson(body): ValidatedJson<NameBody>| async move { body.name }),
        )
    }

    async fn send(body: &str) -> (StatusCode, String) {
        let response = app()
            .oneshot(
                HttpRequest::builder()
                    .method("POST")
                    .uri("/echo")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_owned()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = http_body_util::BodyExt::collect(response.into_body())
            .await
            .unwrap()
            .to_bytes();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn valid_body_reaches_the_handler() {
        let (status, body) = send(r#"{"name": "Asha"}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "Asha");
    }

    #[tokio::test]
    async fn malformed_json_is_a_bad_request() {
        let (status, body) = send("{not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("BAD_REQUEST"), "body: {body}");
    }

    #[tokio::test]
    async fn field_failure_is_unprocessable_and_names_the_field() {
        let (status, body) = send(r#"{"name": "  "}"#).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body.contains("name"), "body: {body}");
    }
}
