use axum::{
    extract::{FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::error::AppError;

/// JSON body extractor that runs `validator` rules after deserializing.
///
/// Both malformed JSON and failed validation reject with a 400-class
/// `AppError`; handlers that need their own envelope message can take
/// `Result<ValidatedJson<T>, AppError>` instead.
pub struct ValidatedJson<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate + 'static,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| AppError::BadRequest(anyhow::anyhow!("Json parse error: {}", e)))?;

        value.validate()?;

        Ok(ValidatedJson(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, Validate)]
    struct Signup {
        #[validate(email)]
        email: String,
    }

    fn json_request(body: &str) -> Request {
        Request::builder()
            .method("POST")
            .uri("/")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn accepts_valid_body() {
        let ValidatedJson(signup) =
            ValidatedJson::<Signup>::from_request(json_request(r#"{"email":"a@b.co"}"#), &())
                .await
                .unwrap();
        assert_eq!(signup.email, "a@b.co");
    }

    #[tokio::test]
    async fn rejects_invalid_email() {
        let result =
            ValidatedJson::<Signup>::from_request(json_request(r#"{"email":"nope"}"#), &()).await;
        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }

    #[tokio::test]
    async fn rejects_malformed_json() {
        let result = ValidatedJson::<Signup>::from_request(json_request("{"), &()).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }
}
