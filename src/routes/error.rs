use rocket::{http::Status, serde::json::Json, Catcher, Request};

use crate::routes::api::ErrorBody;

#[must_use]
pub fn catchers() -> Vec<Catcher> {
    catchers![fallback]
}

/// Answers everything no route handled with the same JSON shape the API uses for its errors.
#[catch(default)]
pub fn fallback(status: Status, request: &Request<'_>) -> (Status, Json<ErrorBody>) {
    log::debug!("Nothing handled {} {}: {status}", request.method(), request.uri());
    (
        status,
        Json(ErrorBody {
            error: status.reason().unwrap_or("Unknown error").to_string(),
        }),
    )
}
