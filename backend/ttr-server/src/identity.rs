//! Which seat of which game a request comes from.
//!
//! A player gets a seat when joining a game, and keeps it in a private (encrypted) cookie.
//! Handlers check that cookie against the `<game_id>` of the path they were routed on.

use parse_display::{Display, FromStr};
use rocket::http::{Cookie, CookieJar, Status};
use thiserror::Error;
use ttr_engine::player::PlayerId;
use uuid::Uuid;

pub(crate) const SEAT_COOKIE_NAME: &str = "identifier";

/// A player's seat in a game.
///
/// The game ID is part of the cookie so that a seat cannot be replayed in another game,
/// where the same player ID belongs to someone else.
#[derive(Clone, Copy, Debug, Display, FromStr, PartialEq)]
#[display("{game_id}/{player_id}")]
pub(crate) struct Seat {
    pub game_id: Uuid,
    pub player_id: PlayerId,
}

#[derive(Debug, Error, PartialEq)]
pub(crate) enum SeatError {
    #[error("no seat cookie")]
    Missing,
    #[error("seat cookie is not `<game_id>/<player_id>`")]
    Malformed,
    #[error("seat cookie belongs to game {0}")]
    OtherGame(Uuid),
}

impl From<SeatError> for Status {
    fn from(_: SeatError) -> Self {
        Status::Unauthorized
    }
}

impl Seat {
    pub(crate) fn new(game_id: Uuid, player_id: PlayerId) -> Self {
        Self { game_id, player_id }
    }

    /// Reads the seat held by the request's cookies, if it belongs to `game_id`.
    pub(crate) fn find(cookies: &CookieJar<'_>, game_id: Uuid) -> Result<Self, SeatError> {
        let cookie = cookies
            .get_private(SEAT_COOKIE_NAME)
            .ok_or(SeatError::Missing)?;
        let seat: Seat = cookie.value().parse().map_err(|_| SeatError::Malformed)?;

        if seat.game_id != game_id {
            return Err(SeatError::OtherGame(seat.game_id));
        }

        Ok(seat)
    }

    /// Hands the seat over to the player's browser.
    ///
    /// The cookie is only sent back on the game's own paths, so one browser can sit
    /// in several games at once.
    pub(crate) fn give(self, cookies: &CookieJar<'_>) {
        let path = format!("/game/{}", self.game_id);

        cookies.add_private(Cookie::build((SEAT_COOKIE_NAME, self.to_string())).path(path));
    }
}
