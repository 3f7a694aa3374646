use rocket::{Catcher, Route};

pub mod api;
pub mod dashboard;
pub mod error;

#[must_use]
pub fn routes() -> Vec<Route> {
    crate::flatten_routes([api::routes(), dashboard::routes()])
}

#[must_use]
pub fn catchers() -> Vec<Catcher> {
    error::catchers()
}
