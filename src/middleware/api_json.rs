use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;

use crate::error::BuddyError;

/// `Json<T>` whose rejections use the API error envelope instead of axum's
/// plain-text bodies.
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(body)) => Ok(ApiJson(body)),
            Err(rejection) => Err(rejection_to_error(rejection).into_response()),
        }
    }
}

fn rejection_to_error(rejection: JsonRejection) -> BuddyError {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return BuddyError::PayloadTooLarge;
    }
    BuddyError::InvalidInput(rejection.body_text())
}
