//! Server configuration, extracted from rocket's figment (`Rocket.toml`, `ROCKET_*` variables).

use rocket::fairing::AdHoc;
use rocket::serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;
use ttr_engine::board::{Board, BoardError};
use ttr_engine::config::GameConfig;
use ttr_engine::error::ConfigError;

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(crate = "rocket::serde")]
pub struct ServerConfig {
    /// JSON board data to play on. Without it, games use the built-in board.
    #[serde(default)]
    pub map_path: Option<PathBuf>,
    /// Policy of every game created by this server.
    #[serde(default)]
    pub game: GameConfig,
}

/// Types of error preventing the server from launching.
#[derive(Debug, Error)]
pub enum ServerConfigError {
    #[error("cannot read board data from {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Board(#[from] BoardError),
    #[error(transparent)]
    Game(#[from] ConfigError),
}

impl ServerConfig {
    /// Loads the board that every game is played on, and verifies the game policy.
    pub fn load_board(&self) -> Result<Board, ServerConfigError> {
        self.game.validate()?;

        let board = match &self.map_path {
            Some(path) => {
                let json = std::fs::read_to_string(path).map_err(|source| ServerConfigError::Io {
                    path: path.clone(),
                    source,
                })?;
                Board::from_json(&json)?
            }
            None => Board::classic()?,
        };

        Ok(board)
    }
}

/// Loads the board once the [`ServerConfig`] is extracted, and makes it available as
/// managed state. Aborts the launch if it cannot be loaded.
pub fn board_fairing() -> AdHoc {
    AdHoc::try_on_ignite("Board", |rocket| async move {
        match rocket.state::<ServerConfig>().map(ServerConfig::load_board) {
            Some(Ok(board)) => {
                log::info!(
                    "Loaded a board with {} cities and {} routes.",
                    board.cities().len(),
                    board.routes().len()
                );
                Ok(rocket.manage(board))
            }
            Some(Err(e)) => {
                log::error!("Invalid server configuration: {}", e);
                Err(rocket)
            }
            None => {
                log::error!("No `ServerConfig` is managed: attach `AdHoc::config` first.");
                Err(rocket)
            }
        }
    })
}
