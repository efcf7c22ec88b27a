use serde::Serialize;
use strum_macros::IntoStaticStr;
use thiserror::Error;

/// Every reason for which a player's request can be rejected.
///
/// A rejection never mutates the session: it is only reported back to the player
/// who made the request.
///
/// # JSON
/// Errors are serialized as their code, e.g. `"RouteTaken"`.
#[derive(Clone, Copy, Debug, Eq, Error, Hash, IntoStaticStr, PartialEq, Serialize)]
pub enum ActionError {
    #[error("It is not your turn.")]
    NotYourTurn,
    #[error("This route has already been claimed.")]
    RouteTaken,
    #[error("You do not have enough wagons left to claim this route.")]
    InsufficientWagons,
    #[error("You do not have enough matching train cards to claim this route.")]
    InsufficientCards,
    #[error("Cannot take a face-up wild card after having already drawn a card this turn.")]
    WildcardAsSecondDraw,
    #[error("Cannot claim a route after having started to draw cards this turn.")]
    ActionInProgress,
    #[error("There is no face-up card at this slot.")]
    InvalidSlot,
    #[error("There are no train cards left to draw.")]
    DeckExhausted,
    #[error("No such route exists on this board.")]
    UnknownRoute,
    #[error("No such player is part of this game.")]
    UnknownPlayer,
    #[error("This color cannot be used to claim this route.")]
    InvalidColor,
    #[error("This action is not allowed in the current phase of the game.")]
    WrongPhase,
    #[error("Only the host can start the game.")]
    NotHost,
    #[error("The game is already full.")]
    LobbyFull,
    #[error("Another player already uses this name.")]
    NameTaken,
    #[error("Player names cannot be blank.")]
    InvalidName,
    #[error("Not enough players have joined to start the game.")]
    NotEnoughPlayers,
}

impl ActionError {
    /// The stable code of this error, as sent over the wire.
    ///
    /// # Example
    /// ```
    /// use ttr_engine::error::ActionError;
    ///
    /// assert_eq!(ActionError::RouteTaken.code(), "RouteTaken");
    /// ```
    #[inline]
    pub fn code(&self) -> &'static str {
        self.into()
    }
}

/// All player actions share the same `Result`: either the action was accepted,
/// or it was rejected for the given reason.
pub type ActionResult<T = ()> = Result<T, ActionError>;

/// Invalid [`crate::config::GameConfig`] values.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("a game needs at least 2 players, but min_players is {0}")]
    TooFewPlayers(usize),
    #[error("max_players ({max}) must be between min_players ({min}) and {limit}")]
    InvalidPlayerRange { min: usize, max: usize, limit: usize },
    #[error("dealing {hand_size} cards to {players} players leaves no cards to display")]
    HandTooLarge { hand_size: usize, players: usize },
    #[error("players need at least one wagon to start with")]
    NoWagons,
}

/// Errors raised while building a session from scratch with [`crate::session::GameSession::init`].
#[derive(Clone, Debug, Error, PartialEq)]
pub enum SetupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Action(#[from] ActionError),
}
