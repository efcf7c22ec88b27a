use crate::board::{Board, RouteId};
use crate::card::{CardDeck, TrainColor};
use crate::claim::ClaimPlan;
use crate::config::{GameConfig, MAX_PLAYERS};
use crate::error::{ActionError, ActionResult, ConfigError, SetupError};
use crate::player::{Player, PlayerId};
use crate::snapshot::GameSnapshot;
use crate::turn::{DrawOutcome, DrawSlot, TurnAction, TurnStateMachine};

use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use strum_macros::Display;

/// Phases of the game, which act as states in the session's finite-state machine.
///
/// # JSON
/// Phases are serialized in snake_case.
#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum GamePhase {
    /// Initial phase of the game: players are joining, and the host has not started the game yet.
    InLobby,
    /// The main, turn-based phase of the game.
    Playing,
    /// A player went down to the wagon threshold: every other player has one turn left.
    LastRound,
    /// No actions can be taken at this point.
    Finished,
}

/// Every request a player can make once they have joined a game.
///
/// # JSON
/// Tagged by `type`, e.g. `{"type": "claim_route", "route": 3, "color": "red"}`.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    Start,
    DrawCard {
        slot: DrawSlot,
    },
    ClaimRoute {
        route: RouteId,
        /// Only useful on routes of any color, to pick a color other than the one
        /// that would be selected automatically.
        #[serde(default)]
        color: Option<TrainColor>,
    },
}

/// In charge of holding all the state of a game, and of applying the players' actions.
///
/// A session is the sole owner of the deck, the board and the players. Every action is
/// validated before anything is mutated, so a rejected action leaves the session as it was.
#[derive(Debug)]
pub struct GameSession {
    phase: GamePhase,
    config: GameConfig,
    board: Board,
    deck: CardDeck,
    /// A player's ID matches their index in this list, which is also the turn order.
    players: SmallVec<[Player; MAX_PLAYERS]>,
    /// Only populated once the game has started.
    turns: Option<TurnStateMachine>,
    /// The player whose claim triggered the last round.
    /// Once the turn comes back to them, the game is over.
    last_round_trigger: Option<PlayerId>,
    /// Human-readable description of the last successful action.
    /// This is shared with every player, so no private information is put in it.
    last_action: Option<String>,
}

impl GameSession {
    /// Creates a new session in the [`GamePhase::InLobby`], waiting for players to join.
    ///
    /// The train cards are shuffled with `rng` right away, and the face-up display filled.
    pub fn new(board: Board, config: GameConfig, rng: StdRng) -> Result<Self, ConfigError> {
        config.validate()?;

        Ok(Self {
            phase: GamePhase::InLobby,
            config,
            board,
            deck: CardDeck::new(rng),
            players: SmallVec::new(),
            turns: None,
            last_round_trigger: None,
            last_action: None,
        })
    }

    /// Creates a session with the given players, and starts it right away.
    ///
    /// Every player is dealt their initial hand, one card at a time in turn order,
    /// and the first turn goes to the first player.
    ///
    /// # Example
    /// ```
    /// use rand::{rngs::StdRng, SeedableRng};
    /// use ttr_engine::board::Board;
    /// use ttr_engine::config::GameConfig;
    /// use ttr_engine::session::{GamePhase, GameSession};
    ///
    /// let session = GameSession::init(
    ///     ["Alice", "Bob"],
    ///     Board::classic().unwrap(),
    ///     GameConfig::default(),
    ///     StdRng::seed_from_u64(5),
    /// )
    /// .unwrap();
    ///
    /// assert_eq!(session.phase(), GamePhase::Playing);
    /// assert_eq!(session.current_player(), Some(0));
    /// assert!(session.players().iter().all(|player| player.hand().len() == 4));
    /// ```
    pub fn init<I, S>(
        names: I,
        board: Board,
        config: GameConfig,
        rng: StdRng,
    ) -> Result<Self, SetupError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut session = Self::new(board, config, rng)?;
        for name in names {
            session.join(name.as_ref())?;
        }
        session.start(0)?;

        Ok(session)
    }

    #[inline]
    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    #[inline]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[inline]
    pub fn deck(&self) -> &CardDeck {
        &self.deck
    }

    #[inline]
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, player_id: PlayerId) -> ActionResult<&Player> {
        self.players
            .get(player_id)
            .ok_or(ActionError::UnknownPlayer)
    }

    /// Whose turn it is. `None` until the game has started, and once it is finished.
    pub fn current_player(&self) -> Option<PlayerId> {
        if self.phase == GamePhase::Finished {
            return None;
        }

        self.turns.as_ref().map(TurnStateMachine::current)
    }

    /// What the current player has done so far this turn.
    pub fn current_action(&self) -> Option<TurnAction> {
        if self.phase == GamePhase::Finished {
            return None;
        }

        self.turns.as_ref().map(TurnStateMachine::action)
    }

    #[inline]
    pub fn last_action(&self) -> Option<&str> {
        self.last_action.as_deref()
    }

    /// Every player sharing the highest score, once the game is finished.
    pub fn winners(&self) -> Option<SmallVec<[PlayerId; MAX_PLAYERS]>> {
        if self.phase != GamePhase::Finished {
            return None;
        }

        let best_score = self.players.iter().map(Player::score).max()?;
        Some(
            self.players
                .iter()
                .filter(|player| player.score() == best_score)
                .map(Player::id)
                .collect(),
        )
    }

    /// The state of the game, as seen by `viewer`.
    ///
    /// A player only gets to see their own hand; with no viewer, every hand is revealed.
    pub fn snapshot(&self, viewer: Option<PlayerId>) -> GameSnapshot {
        GameSnapshot::new(self, viewer)
    }

    /// Applies an action on behalf of `player`, and returns the new state as seen by them.
    pub fn submit(&mut self, player: PlayerId, action: Action) -> ActionResult<GameSnapshot> {
        match action {
            Action::Start => self.start(player)?,
            Action::DrawCard { slot } => {
                self.draw_card(player, slot)?;
            }
            Action::ClaimRoute { route, color } => {
                self.claim_route(player, route, color)?;
            }
        }

        Ok(self.snapshot(Some(player)))
    }

    /// Adds a new player to the game, and returns their ID.
    ///
    /// Returns an `Err` if either:
    ///   * We are not in [`GamePhase::InLobby`].
    ///   * The name is blank.
    ///   * The game is full.
    ///   * A player already has the same name.
    pub fn join(&mut self, name: &str) -> ActionResult<PlayerId> {
        if self.phase != GamePhase::InLobby {
            return Err(ActionError::WrongPhase);
        }

        let name = name.trim();
        if name.is_empty() {
            return Err(ActionError::InvalidName);
        }

        if self.players.len() >= self.config.max_players {
            return Err(ActionError::LobbyFull);
        }

        if self.players.iter().any(|player| player.name() == name) {
            return Err(ActionError::NameTaken);
        }

        let player_id = self.players.len();
        self.players.push(Player::new(
            player_id,
            String::from(name),
            self.config.starting_wagons,
        ));

        self.record(format!("{} joined the game.", name));
        Ok(player_id)
    }

    /// Starts the game, which only the host (the first player to join) can do.
    ///
    /// Every player is dealt their initial hand, one card at a time in turn order, and
    /// we transition to [`GamePhase::Playing`].
    pub fn start(&mut self, requester: PlayerId) -> ActionResult {
        if self.phase != GamePhase::InLobby {
            return Err(ActionError::WrongPhase);
        }

        self.player(requester)?;
        if requester != 0 {
            return Err(ActionError::NotHost);
        }

        if self.players.len() < self.config.min_players {
            return Err(ActionError::NotEnoughPlayers);
        }

        // The configuration guarantees that the draw pile holds enough cards for this.
        for _ in 0..self.config.initial_hand_size {
            for player in self.players.iter_mut() {
                player.receive(self.deck.draw()?);
            }
        }

        self.turns = Some(TurnStateMachine::new(self.players.len()));
        self.phase = GamePhase::Playing;

        self.record(format!(
            "{} started the game with {} players.",
            self.players[requester].name(),
            self.players.len()
        ));
        Ok(())
    }

    /// Draws a train card for `player`, from the draw pile or the face-up display.
    pub fn draw_card(&mut self, player_id: PlayerId, slot: DrawSlot) -> ActionResult<DrawOutcome> {
        self.ensure_playing()?;

        let turns = self.turns.as_mut().ok_or(ActionError::WrongPhase)?;
        let player = self
            .players
            .get_mut(player_id)
            .ok_or(ActionError::UnknownPlayer)?;

        let outcome = turns.draw(player, &mut self.deck, slot)?;

        let description = Self::drew_card_description(player.name(), slot, &outcome);
        self.record(description);

        if outcome.turn_over {
            self.end_turn();
        }

        Ok(outcome)
    }

    fn drew_card_description(name: &str, slot: DrawSlot, outcome: &DrawOutcome) -> String {
        match (slot, outcome.card) {
            (_, None) => format!("{} could not draw any train card.", name),
            (DrawSlot::Pile, Some(_)) => {
                format!("{} drew a train card from the draw pile.", name)
            }
            (DrawSlot::FaceUp(_), Some(card)) if outcome.display_reset => format!(
                "{} drew a {} train card from the face-up cards. The face-up cards were then \
                 reset because there were three wild cards.",
                name, card
            ),
            (DrawSlot::FaceUp(_), Some(card)) => {
                format!("{} drew a {} train card from the face-up cards.", name, card)
            }
        }
    }

    /// Claims a route for `player`.
    ///
    /// If the claim leaves the player with few enough wagons, every other player gets one
    /// last turn. If it takes the last unclaimed route of the board, the game is over
    /// right away.
    pub fn claim_route(
        &mut self,
        player_id: PlayerId,
        route: RouteId,
        declared_color: Option<TrainColor>,
    ) -> ActionResult<ClaimPlan> {
        self.ensure_playing()?;

        let turns = self.turns.as_mut().ok_or(ActionError::WrongPhase)?;
        let player = self
            .players
            .get_mut(player_id)
            .ok_or(ActionError::UnknownPlayer)?;

        let plan = turns.claim(
            player,
            &mut self.board,
            &mut self.deck,
            route,
            declared_color,
        )?;

        let wagons_left = player.wagons();
        let description = self.claimed_route_description(player_id, &plan);
        self.record(description);

        // Nothing is left to play for once every route is taken.
        if self.board.is_fully_claimed() {
            log::info!("Every route has been claimed.");
            self.finish();
            return Ok(plan);
        }

        if self.phase == GamePhase::Playing
            && wagons_left <= self.config.end_game_wagon_threshold
        {
            self.phase = GamePhase::LastRound;
            self.last_round_trigger = Some(player_id);
            log::info!(
                "Last round: {} is down to {} wagons.",
                self.players[player_id].name(),
                wagons_left
            );
        }

        self.end_turn();
        Ok(plan)
    }

    fn claimed_route_description(&self, player_id: PlayerId, plan: &ClaimPlan) -> String {
        let name = self.players[player_id].name();
        let (from, to) = self
            .board
            .route(plan.route)
            .map(|route| (route.from(), route.to()))
            .unwrap_or_default();

        match (plan.colored_cards, plan.wild_cards) {
            (_, 0) => format!(
                "{} claimed the route from {} to {} using {} {} cards.",
                name, from, to, plan.colored_cards, plan.color
            ),
            (0, _) => format!(
                "{} claimed the route from {} to {} using {} wild cards.",
                name, from, to, plan.wild_cards
            ),
            _ => format!(
                "{} claimed the route from {} to {} using {} {} cards and {} wild cards.",
                name, from, to, plan.colored_cards, plan.color, plan.wild_cards
            ),
        }
    }

    #[inline]
    fn ensure_playing(&self) -> ActionResult {
        match self.phase {
            GamePhase::Playing | GamePhase::LastRound => Ok(()),
            GamePhase::InLobby | GamePhase::Finished => Err(ActionError::WrongPhase),
        }
    }

    /// Called once the turn pointer has moved to the next player.
    fn end_turn(&mut self) {
        let next_player = self.turns.as_ref().map(TurnStateMachine::current);

        if self.phase == GamePhase::LastRound && next_player == self.last_round_trigger {
            self.finish();
        }
    }

    fn finish(&mut self) {
        self.phase = GamePhase::Finished;

        let winners = self.winners().unwrap_or_default();
        log::info!("Game over, won by players {:?}.", winners.as_slice());
    }

    fn record(&mut self, description: String) {
        log::info!("{}", description);
        self.last_action = Some(description);
    }
}
