//! Rule engine of a _Ticket to Ride_ game.
//!
//! Players draw train cards from a shared deck, and spend them alongside their wagons to
//! claim routes on a board, scoring points by route length. Once a player runs low on
//! wagons, everyone else plays one last turn, and the highest score wins.
//!
//! A [`session::GameSession`] owns everything about one game, and is the only entry point
//! that mutates it:
//!
//! ```
//! use rand::{rngs::StdRng, SeedableRng};
//! use ttr_engine::board::Board;
//! use ttr_engine::config::GameConfig;
//! use ttr_engine::error::ActionError;
//! use ttr_engine::session::{Action, GameSession};
//! use ttr_engine::turn::{DrawSlot, TurnAction};
//!
//! let mut session = GameSession::init(
//!     ["Alice", "Bob"],
//!     Board::classic().unwrap(),
//!     GameConfig::default(),
//!     StdRng::seed_from_u64(1),
//! )
//! .unwrap();
//!
//! let draw = Action::DrawCard { slot: DrawSlot::Pile };
//! assert_eq!(session.submit(1, draw), Err(ActionError::NotYourTurn));
//!
//! let snapshot = session.submit(0, draw).unwrap();
//! assert_eq!(snapshot.action, Some(TurnAction::Drawing { cards_drawn: 1 }));
//! ```

pub mod board;
pub mod card;
pub mod claim;
pub mod config;
pub mod error;
pub mod player;
pub mod session;
pub mod snapshot;
pub mod turn;
