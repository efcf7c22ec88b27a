use crate::config::ServerConfig;
use crate::controller::{GameIdSessionMapping, ReadController, WriteController};
use crate::request_types::*;
use crate::response_types::*;

use rocket::http::{CookieJar, Status};
use rocket::serde::json::Json;
use rocket::State;
use ttr_engine::board::Board;
use ttr_engine::snapshot::GameSnapshot;
use uuid::Uuid;

#[post("/create")]
pub fn create_game(
    state: &State<GameIdSessionMapping>,
    board: &State<Board>,
    config: &State<ServerConfig>,
) -> Result<Json<CreateGameResponse>, Status> {
    match WriteController::create_game(state, board, &config.game) {
        Ok(game_id) => Ok(Json(CreateGameResponse { game_id })),
        Err(e) => {
            log::error!("Cannot create a game: {}", e);
            Err(Status::InternalServerError)
        }
    }
}

#[post("/game/<game_id>/join", format = "json", data = "<join_request>")]
pub fn join_game(
    game_id: Uuid,
    cookies: &CookieJar<'_>,
    state: &State<GameIdSessionMapping>,
    join_request: Json<JoinRequest>,
) -> Option<Json<ActionResponse>> {
    WriteController::join_game(state, game_id, cookies, join_request.into_inner()).map(Json)
}

#[post("/game/<game_id>/start")]
pub fn start_game(
    game_id: Uuid,
    cookies: &CookieJar<'_>,
    state: &State<GameIdSessionMapping>,
) -> Result<Json<ActionResponse>, Status> {
    let mut write_controller = WriteController::new(state, game_id, cookies)?;

    Ok(Json(write_controller.start_game()))
}

#[post("/game/<game_id>/draw", format = "json", data = "<draw_request>")]
pub fn draw_card(
    game_id: Uuid,
    cookies: &CookieJar<'_>,
    state: &State<GameIdSessionMapping>,
    draw_request: Json<DrawRequest>,
) -> Result<Json<ActionResponse>, Status> {
    let mut write_controller = WriteController::new(state, game_id, cookies)?;

    Ok(Json(write_controller.draw_card(draw_request.into_inner())))
}

#[post("/game/<game_id>/claim", format = "json", data = "<claim_request>")]
pub fn claim_route(
    game_id: Uuid,
    cookies: &CookieJar<'_>,
    state: &State<GameIdSessionMapping>,
    claim_request: Json<ClaimRequest>,
) -> Result<Json<ActionResponse>, Status> {
    let mut write_controller = WriteController::new(state, game_id, cookies)?;

    Ok(Json(write_controller.claim_route(claim_request.into_inner())))
}

#[get("/game/<game_id>/state")]
pub fn get_game_state(
    game_id: Uuid,
    cookies: &CookieJar<'_>,
    state: &State<GameIdSessionMapping>,
) -> Result<Json<GameSnapshot>, Status> {
    let read_controller = ReadController::new(state, game_id, cookies)?;

    Ok(Json(read_controller.get_game_state()))
}
