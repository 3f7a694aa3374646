use rocket::{
    http::Status,
    request::Request,
    response::{self, Responder},
    serde::json::Json,
    Route, State,
};
use rusqlite::Connection;
use serde::Serialize;
use thiserror::Error;

use crate::{
    config::{Config, LoadOptions},
    registrations::{self, Registration},
    server_error, sql_interface, RegistrationsDBConn,
};

#[must_use]
pub fn routes() -> Vec<Route> {
    routes![list]
}

/// What a caller of the API gets to see when something went wrong. Details stay in the log.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ApiError {
    #[error("No registrations found")]
    NoRegistrations,
    #[error("Failed to fetch registrations")]
    FetchFailed,
}

impl ApiError {
    #[must_use]
    pub fn status(self) -> Status {
        match self {
            Self::NoRegistrations => Status::NotFound,
            Self::FetchFailed => Status::InternalServerError,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl<'r> Responder<'r, 'static> for ApiError {
    fn respond_to(self, request: &'r Request<'_>) -> response::Result<'static> {
        let body = Json(ErrorBody {
            error: self.to_string(),
        });
        (self.status(), body).respond_to(request)
    }
}

/// Loads all registrations as view models, newest first.
pub fn load(conn: &mut Connection, options: LoadOptions) -> Result<Vec<Registration>, ApiError> {
    let stored = sql_interface::list_registrations(conn)
        .map_err(|err| server_error(format!("Database error while listing registrations: {err}")))?;

    if stored.is_empty() && options.empty_as_not_found {
        return Err(ApiError::NoRegistrations);
    }

    stored
        .into_iter()
        .map(|registration| {
            registrations::classify(registration, options.discrimination)
                .map_err(|err| server_error(format!("Inconsistent registration: {err}")))
        })
        .collect()
}

/// Runs [`load`] on a pooled connection. Having none available at all counts as a failed fetch,
/// too.
pub async fn fetch(
    conn: Option<RegistrationsDBConn>,
    options: LoadOptions,
) -> Result<Vec<Registration>, ApiError> {
    let conn = conn.ok_or_else(|| server_error("No database connection available"))?;
    // the pooled connection goes back to the pool once `conn` is dropped, whatever happens
    conn.run(move |c| load(c, options)).await
}

#[get("/api")]
async fn list(
    conn: Option<RegistrationsDBConn>,
    config: &State<Config>,
) -> Result<Json<Vec<Registration>>, ApiError> {
    let registrations = fetch(conn, config.load_options()).await?;
    Ok(Json(registrations))
}
