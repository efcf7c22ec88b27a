use rocket::serde::{Deserialize, Serialize};
use ttr_engine::error::{ActionError, ActionResult};
use ttr_engine::snapshot::GameSnapshot;
use uuid::Uuid;

/// Response of every request acting on a game.
///
/// A rejected action is not an HTTP error: it is reported with `success: false`, and
/// only to the player who made the request.
#[derive(Debug, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct ActionResponse {
    pub success: bool,
    pub error_code: Option<ActionError>,
    pub error_message: Option<String>,
    /// The new state of the game, as seen by the requester.
    pub state: Option<GameSnapshot>,
}

impl ActionResponse {
    pub fn new(result: ActionResult<GameSnapshot>) -> Self {
        match result {
            Ok(state) => Self {
                success: true,
                error_code: None,
                error_message: None,
                state: Some(state),
            },
            Err(e) => Self {
                success: false,
                error_code: Some(e),
                error_message: Some(e.to_string()),
                state: None,
            },
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct CreateGameResponse {
    pub game_id: Uuid,
}
