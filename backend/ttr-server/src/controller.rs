//! The middleman between the [`crate::router`] handlers, the players' [`Seat`]s, and the
//! [`GameSession`] of each game.

use crate::identity::Seat;
use crate::request_types::*;
use crate::response_types::*;

use dashmap::{mapref::one::Ref, mapref::one::RefMut, DashMap};
use rocket::http::{CookieJar, Status};
use ttr_engine::board::Board;
use ttr_engine::config::GameConfig;
use ttr_engine::error::{ActionError, ConfigError};
use ttr_engine::player::PlayerId;
use ttr_engine::session::{Action, GameSession};
use ttr_engine::snapshot::GameSnapshot;
use uuid::Uuid;

/// Maps a game ID to its session in a shared concurrent hash map.
pub type GameIdSessionMapping = DashMap<Uuid, GameSession>;

/// Checks that the request holds a seat in the game, before looking the game up.
///
/// Fails with `401 Unauthorized` without a valid seat, and `404 Not Found` for an
/// unknown game.
fn seat_in_game(cookies: &CookieJar<'_>, game_id: Uuid) -> Result<PlayerId, Status> {
    match Seat::find(cookies, game_id) {
        Ok(seat) => Ok(seat.player_id),
        Err(e) => {
            log::debug!("Rejected a request on game {}: {}", game_id, e);
            Err(e.into())
        }
    }
}

/// Entrypoint of read-only requests on a game, after routing.
///
/// Holds a shared reference to the [`GameSession`], so reads of the same game can
/// happen concurrently.
pub struct ReadController<'a> {
    session: Ref<'a, Uuid, GameSession>,
    /// The player initiating the request.
    player_id: PlayerId,
}

impl<'a> ReadController<'a> {
    pub(crate) fn new(
        state: &'a GameIdSessionMapping,
        game_id: Uuid,
        cookies: &CookieJar<'_>,
    ) -> Result<Self, Status> {
        let player_id = seat_in_game(cookies, game_id)?;
        let session = state.get(&game_id).ok_or(Status::NotFound)?;

        Ok(Self { session, player_id })
    }

    /// The state of the game, as seen by the requester.
    #[inline]
    pub(crate) fn get_game_state(&self) -> GameSnapshot {
        self.session.snapshot(Some(self.player_id))
    }
}

/// Entrypoint of requests acting on a game, after routing.
///
/// Holds a mutable reference to the [`GameSession`]. The entry stays locked for as long
/// as the controller lives, so actions on the same game are applied one at a time.
pub struct WriteController<'a> {
    session: RefMut<'a, Uuid, GameSession>,
    /// The player initiating the request.
    player_id: PlayerId,
}

impl<'a> WriteController<'a> {
    pub(crate) fn new(
        state: &'a GameIdSessionMapping,
        game_id: Uuid,
        cookies: &CookieJar<'_>,
    ) -> Result<Self, Status> {
        let player_id = seat_in_game(cookies, game_id)?;
        let session = state.get_mut(&game_id).ok_or(Status::NotFound)?;

        Ok(Self { session, player_id })
    }

    #[inline]
    fn submit(&mut self, action: Action) -> ActionResponse {
        ActionResponse::new(self.session.submit(self.player_id, action))
    }

    /// Creates a new game in the lobby, played on its own copy of `board`.
    pub(crate) fn create_game(
        state: &GameIdSessionMapping,
        board: &Board,
        config: &GameConfig,
    ) -> Result<Uuid, ConfigError> {
        let session = GameSession::new(board.clone(), config.clone(), config.rng())?;
        let game_id = Uuid::new_v4();

        state.insert(game_id, session);
        log::info!("Created game {}.", game_id);

        Ok(game_id)
    }

    /// Seats a new player in the game.
    ///
    /// Joining is idempotent: if the request already holds a seat in this game,
    /// nothing changes and the current state is returned.
    pub(crate) fn join_game(
        state: &GameIdSessionMapping,
        game_id: Uuid,
        cookies: &CookieJar<'_>,
        join_request: JoinRequest,
    ) -> Option<ActionResponse> {
        let mut session = state.get_mut(&game_id)?;

        if let Ok(seat) = Seat::find(cookies, game_id) {
            return Some(ActionResponse::new(Ok(session.snapshot(Some(seat.player_id)))));
        }

        let response = match session.join(&join_request.name) {
            Ok(player_id) => {
                Seat::new(game_id, player_id).give(cookies);
                Ok(session.snapshot(Some(player_id)))
            }
            Err(e) => Err(e),
        };

        Some(ActionResponse::new(response))
    }

    #[inline]
    pub(crate) fn start_game(&mut self) -> ActionResponse {
        self.submit(Action::Start)
    }

    #[inline]
    pub(crate) fn draw_card(&mut self, draw_request: DrawRequest) -> ActionResponse {
        self.submit(Action::DrawCard {
            slot: draw_request.slot,
        })
    }

    /// Claims the requested route, designated either by its ID or by the cities it connects.
    pub(crate) fn claim_route(&mut self, claim_request: ClaimRequest) -> ActionResponse {
        let route = match claim_request.route {
            RouteSelector::Id { route } => route,
            RouteSelector::Cities { from, to } => {
                match self.session.board().find_route(&from, &to) {
                    Some(route) => route.id(),
                    None => return ActionResponse::new(Err(ActionError::UnknownRoute)),
                }
            }
        };

        self.submit(Action::ClaimRoute {
            route,
            color: claim_request.color,
        })
    }
}
