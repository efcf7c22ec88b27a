use rocket::serde::{Deserialize, Serialize};
use ttr_engine::board::RouteId;
use ttr_engine::card::TrainColor;
use ttr_engine::turn::DrawSlot;

#[derive(Deserialize, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct JoinRequest {
    pub name: String,
}

#[derive(Deserialize, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct DrawRequest {
    /// Either `"pile"`, or `{"face_up": <index>}`.
    pub slot: DrawSlot,
}

/// How a player designates the route to claim: `{"route": 3}`, or
/// `{"from": "Denver", "to": "Dallas"}` in either order.
#[derive(Deserialize, Serialize)]
#[serde(crate = "rocket::serde", untagged)]
pub enum RouteSelector {
    Id { route: RouteId },
    Cities { from: String, to: String },
}

#[derive(Deserialize, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct ClaimRequest {
    #[serde(flatten)]
    pub route: RouteSelector,
    /// When absent, the color is picked from the player's hand.
    #[serde(default)]
    pub color: Option<TrainColor>,
}
