#![allow(clippy::no_effect_underscore_binding)] // rocket heavily uses those in macros

use rocket::launch;

#[launch]
fn rocket() -> _ {
    registrations_dashboard::assemble(rocket::build())
}
