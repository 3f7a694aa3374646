#![allow(
    clippy::no_effect_underscore_binding, // Rocket heavily uses those in macros
    clippy::needless_pass_by_value,  // The request guards should take them by value anyways
)]

#[macro_use]
extern crate rocket;

pub mod config;
pub mod date_helpers;
pub mod presentation;
pub mod registrations;
pub mod routes;
pub mod sql_interface;

use std::fmt;

use rocket::{
    fairing::AdHoc,
    fs::{relative, FileServer},
    Build, Rocket, Route,
};
use rocket_dyn_templates::{handlebars::handlebars_helper, Template};
use rocket_sync_db_pools::database;

use crate::{routes::api::ApiError, sql_interface::DatabaseStatus};

pub use routes::routes;

/// A shorthand function for logging an internal server error and handing back the opaque error
/// the caller gets to see.
#[inline]
pub fn server_error(admin_err: impl fmt::Display) -> ApiError {
    log::error!("{}", admin_err);
    ApiError::FetchFailed
}

#[database("registrations")]
pub struct RegistrationsDBConn(rusqlite::Connection);

pub fn flatten_routes(routes: impl IntoIterator<Item = Vec<Route>>) -> Vec<Route> {
    routes.into_iter().flatten().collect()
}

/// Creates the tables on ignition in case the database is still empty.
fn init_schema() -> AdHoc {
    AdHoc::try_on_ignite("Registrations schema", |rocket| async move {
        let Some(conn) = RegistrationsDBConn::get_one(&rocket).await else {
            log::error!("No database connection available to check the schema with");
            return Err(rocket);
        };

        match conn.run(sql_interface::init_db_if_necessary).await {
            Ok(DatabaseStatus::Created) => log::info!("Created registration tables"),
            Ok(DatabaseStatus::AlreadyExistent) => (),
            Err(err) => {
                log::error!("Error while creating registration tables: {err}");
                return Err(rocket);
            }
        }

        Ok(rocket)
    })
}

/// Attaches everything the dashboard needs to a not yet launched instance.
#[must_use]
pub fn assemble(rocket: Rocket<Build>) -> Rocket<Build> {
    rocket
        .attach(Template::custom(|engines| {
            engines
                .handlebars
                .register_escape_fn(ammonia::clean_text);

            handlebars_helper!(equals: |left_hand: String, right_hand: String| left_hand == right_hand);

            engines.handlebars.register_helper("equals", Box::new(equals));
        }))
        .attach(AdHoc::config::<config::Config>())
        .attach(RegistrationsDBConn::fairing())
        .attach(init_schema())
        .mount("/", routes())
        .register("/", routes::catchers())
        .mount("/static", FileServer::from(relative!("static")))
}
