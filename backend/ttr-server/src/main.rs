// Launches a HTTP server, and routes incoming requests to the Controller.

#[macro_use]
extern crate rocket;

mod config;
mod controller;
mod identity;
mod request_types;
mod response_types;
mod router;

#[cfg(test)]
mod router_tests;

use config::ServerConfig;
use controller::GameIdSessionMapping;
use rocket::fairing::AdHoc;
use rocket::figment::Figment;
use rocket::{Build, Rocket};
use router::*;

/// Builds the server out of the given configuration.
fn build(figment: Figment) -> Rocket<Build> {
    rocket::custom(figment)
        .mount(
            "/",
            routes![
                claim_route,
                create_game,
                draw_card,
                get_game_state,
                join_game,
                start_game,
            ],
        )
        .manage(GameIdSessionMapping::new())
        .attach(AdHoc::config::<ServerConfig>())
        .attach(config::board_fairing())
}

#[launch]
fn rocket() -> _ {
    build(rocket::Config::figment())
}
