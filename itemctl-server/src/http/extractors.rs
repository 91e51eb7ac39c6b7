//! Custom Axum extractors

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::Json;
use serde::de::DeserializeOwned;

use super::error::ApiError;
use crate::models::ValidationError;

/// JSON body extractor that reports unusable bodies as 422 validation errors.
///
/// Axum's own `Json` answers 400 for syntax errors and 415 for a missing
/// content type. Both become 422 here, as do data errors. Other rejections
/// (oversized or unreadable bodies) keep axum's status.
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(reject)?;

        Ok(Self(value))
    }
}

fn reject(rejection: JsonRejection) -> ApiError {
    tracing::debug!(status = %rejection.status(), "rejected request body");
    match rejection {
        JsonRejection::JsonDataError(_)
        | JsonRejection::JsonSyntaxError(_)
        | JsonRejection::MissingJsonContentType(_) => {
            ApiError::Validation(ValidationError::Body {
                reason: rejection.body_text(),
            })
        }
        other => ApiError::Rejected {
            status: other.status(),
            detail: other.body_text(),
        },
    }
}
