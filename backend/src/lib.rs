pub mod catchers;
pub mod config;
pub mod cors;
pub mod error;
pub mod processor;
pub mod queries;
pub mod routes;
pub mod store;
pub mod utils;

use std::sync::Arc;
use rocket::{Build, Rocket, catchers, routes};
use crate::{config::AppConfig, cors::CORS, processor::PollProcessor, routes::AppState, store::PollStore};

/// Assembles the API around any `PollStore`.
pub fn build_rocket(store: Arc<dyn PollStore>, config: AppConfig) -> Rocket<Build> {
    let processor = PollProcessor::new(store, &config);

    rocket::build()
        .attach(CORS::new(config.allowed_origin.clone()))
        .manage(AppState::new(processor))
        .mount(
            "/api",
            routes![
                routes::me,
                routes::list_votes,
                routes::get_vote,
                routes::create_vote,
                routes::update_vote,
                routes::cast_ballot,
                routes::summary,
                routes::all_options,
            ],
        )
        .register(
            "/",
            catchers![
                catchers::bad_request,
                catchers::unauthorized,
                catchers::forbidden,
                catchers::not_found,
                catchers::conflict,
                catchers::unprocessable,
                catchers::internal_error,
            ],
        )
}

#[cfg(test)]
mod tests;
