use crate::card::{NUM_FACE_UP_CARDS, TOTAL_NUM_TRAIN_CARDS};
use crate::error::ConfigError;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// Hard upper bound on the number of players in a game.
pub const MAX_PLAYERS: usize = 5;

/// Policy values of a game.
///
/// Every field has a default, so a partial configuration (e.g. a `[game]` table in
/// `Rocket.toml` only overriding the seed) is valid.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct GameConfig {
    /// How many wagons each player starts with.
    pub starting_wagons: u8,
    /// How many train cards are dealt to each player before the first turn.
    pub initial_hand_size: usize,
    /// Once a player is left with this many wagons or less after claiming a route,
    /// every other player has one turn left.
    pub end_game_wagon_threshold: u8,
    pub min_players: usize,
    pub max_players: usize,
    /// Fixes the shuffles of the game, for reproducible games.
    /// When absent, the shuffles are seeded from the OS.
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            starting_wagons: 45,
            initial_hand_size: 4,
            end_game_wagon_threshold: 2,
            min_players: 2,
            max_players: MAX_PLAYERS,
            seed: None,
        }
    }
}

impl GameConfig {
    /// Verifies that a game can be played with this configuration.
    ///
    /// # Example
    /// ```
    /// use ttr_engine::config::GameConfig;
    ///
    /// assert!(GameConfig::default().validate().is_ok());
    ///
    /// let config = GameConfig { min_players: 1, ..GameConfig::default() };
    /// assert!(config.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_players < 2 {
            return Err(ConfigError::TooFewPlayers(self.min_players));
        }

        if self.max_players < self.min_players || self.max_players > MAX_PLAYERS {
            return Err(ConfigError::InvalidPlayerRange {
                min: self.min_players,
                max: self.max_players,
                limit: MAX_PLAYERS,
            });
        }

        // The initial deal must leave enough cards to fill the face-up display.
        let num_cards_needed = self
            .initial_hand_size
            .checked_mul(self.max_players)
            .and_then(|num_dealt| num_dealt.checked_add(NUM_FACE_UP_CARDS));
        if num_cards_needed.map_or(true, |num_cards| num_cards > TOTAL_NUM_TRAIN_CARDS) {
            return Err(ConfigError::HandTooLarge {
                hand_size: self.initial_hand_size,
                players: self.max_players,
            });
        }

        if self.starting_wagons == 0 {
            return Err(ConfigError::NoWagons);
        }

        Ok(())
    }

    /// The random source used to shuffle the train cards of a new game.
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}
