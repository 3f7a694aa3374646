use rocket::{Route, State};
use rocket_dyn_templates::Template;

use crate::{
    config::Config,
    presentation::{Dashboard, FetchFailure, Formatting},
    routes::api,
    RegistrationsDBConn,
};

#[must_use]
pub fn routes() -> Vec<Route> {
    routes![dashboard]
}

/// The registration table, with the detail dialog of `selected` opened if given.
#[get("/?<selected>")]
pub async fn dashboard(
    conn: Option<RegistrationsDBConn>,
    config: &State<Config>,
    selected: Option<String>,
) -> Template {
    let mut dashboard = Dashboard::default();

    if dashboard.start_loading() {
        let outcome = api::fetch(conn, config.load_options())
            .await
            .map_err(FetchFailure::from);
        dashboard.finish(outcome);
    }

    if let Some(id) = selected {
        dashboard.select(&id);
    }

    Template::render(
        "dashboard",
        dashboard.context(Formatting::from(config.inner())),
    )
}
