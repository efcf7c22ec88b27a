use crate::board::Board;
use crate::card::{TrainColor, NUM_FACE_UP_CARDS};
use crate::config::MAX_PLAYERS;
use crate::player::{Hand, Player, PlayerId};
use crate::session::{GamePhase, GameSession};
use crate::turn::TurnAction;

use serde::Serialize;
use smallvec::SmallVec;

/// Information about a player, as seen by a given viewer.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PlayerSnapshot {
    pub id: PlayerId,
    pub name: String,
    pub score: u16,
    pub wagons: u8,
    /// Always visible, even when the hand itself is not.
    pub hand_size: usize,
    /// Only populated for the viewer's own hand.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hand: Option<Hand>,
}

impl PlayerSnapshot {
    fn new(player: &Player, show_hand: bool) -> Self {
        Self {
            id: player.id(),
            name: String::from(player.name()),
            score: player.score(),
            wagons: player.wagons(),
            hand_size: player.hand().len(),
            hand: show_hand.then(|| player.hand().clone()),
        }
    }
}

/// All the information about a game's current state, returned by [`GameSession::snapshot`].
///
/// This is an owned copy of the state: it stays valid after the session moves on.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GameSnapshot {
    pub phase: GamePhase,
    pub players: Vec<PlayerSnapshot>,
    /// Cities and routes, with the current owner of each route.
    pub board: Board,
    pub face_up: SmallVec<[TrainColor; NUM_FACE_UP_CARDS]>,
    pub draw_pile_size: usize,
    pub discard_pile_size: usize,
    /// Whose turn it is. `None` before the game starts and once it is finished.
    pub turn: Option<PlayerId>,
    pub action: Option<TurnAction>,
    pub last_action: Option<String>,
    /// Only populated once the game is finished.
    pub winners: Option<SmallVec<[PlayerId; MAX_PLAYERS]>>,
}

impl GameSnapshot {
    pub(crate) fn new(session: &GameSession, viewer: Option<PlayerId>) -> Self {
        let deck = session.deck();

        Self {
            phase: session.phase(),
            players: session
                .players()
                .iter()
                .map(|player| {
                    PlayerSnapshot::new(player, viewer.map_or(true, |id| id == player.id()))
                })
                .collect(),
            board: session.board().clone(),
            face_up: deck.face_up().iter().copied().collect(),
            draw_pile_size: deck.draw_pile_len(),
            discard_pile_size: deck.discard_pile_len(),
            turn: session.current_player(),
            action: session.current_action(),
            last_action: session.last_action().map(String::from),
            winners: session.winners(),
        }
    }
}
