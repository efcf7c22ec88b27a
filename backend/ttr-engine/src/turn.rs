use crate::board::{Board, RouteId};
use crate::card::{CardDeck, TrainColor};
use crate::claim::{self, ClaimPlan};
use crate::error::{ActionError, ActionResult};
use crate::player::{Player, PlayerId};

use serde::{Deserialize, Serialize};

/// What the current player has done so far this turn.
///
/// # JSON
/// Serialized with a `state` tag, e.g. `{"state": "drawing", "cards_drawn": 1}`.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TurnAction {
    /// Nothing yet: the player can either draw cards or claim a route.
    #[default]
    Idle,
    /// The player started drawing train cards, and must finish drawing.
    Drawing { cards_drawn: u8 },
}

/// Where a train card is drawn from.
///
/// # JSON
/// Either `"pile"`, or `{"face_up": index}`.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawSlot {
    /// The top of the draw pile, face down.
    Pile,
    /// One of the face-up cards, by index.
    FaceUp(usize),
}

/// The result of a successful draw request.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct DrawOutcome {
    /// The card that made it to the player's hand.
    ///
    /// This is `None` only when nothing was left to draw at all.
    pub card: Option<TrainColor>,
    /// Whether the face-up display was reset because of the wild card limit.
    pub display_reset: bool,
    /// Whether drawing ended the player's turn.
    pub turn_over: bool,
}

/// Enforces that a turn consists of one coherent action: either drawing two train cards
/// (or a single face-up wild card), or claiming one route.
///
/// Also holds the turn pointer, which moves to the next player, circularly, whenever
/// a turn is over.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TurnStateMachine {
    num_players: usize,
    current: PlayerId,
    action: TurnAction,
}

impl TurnStateMachine {
    /// The first turn belongs to player 0.
    pub fn new(num_players: usize) -> Self {
        debug_assert!(num_players > 0);

        Self {
            num_players,
            current: 0,
            action: TurnAction::Idle,
        }
    }

    /// Whose turn it is.
    #[inline]
    pub fn current(&self) -> PlayerId {
        self.current
    }

    #[inline]
    pub fn action(&self) -> TurnAction {
        self.action
    }

    #[inline]
    pub fn num_players(&self) -> usize {
        self.num_players
    }

    /// Draws a train card for `player`, from the given slot.
    ///
    /// Returns an `Err` if either:
    ///   * It is not the player's turn.
    ///   * There is no face-up card at this slot.
    ///   * The player already drew a card this turn, and the face-up card is wild.
    ///   * The player has not drawn yet, and the draw pile and discard pile are both empty.
    ///
    /// A face-up wild card ends the turn right away when drawn first. Any other first
    /// draw leaves the player [`TurnAction::Drawing`], unless nothing could legally be
    /// drawn next, in which case the turn is over. A second draw always ends the turn,
    /// even if the piles turned out to be empty and no card was received.
    pub fn draw(
        &mut self,
        player: &mut Player,
        deck: &mut CardDeck,
        slot: DrawSlot,
    ) -> ActionResult<DrawOutcome> {
        if player.id() != self.current {
            return Err(ActionError::NotYourTurn);
        }

        match self.action {
            TurnAction::Idle => self.first_draw(player, deck, slot),
            TurnAction::Drawing { .. } => self.second_draw(player, deck, slot),
        }
    }

    fn first_draw(
        &mut self,
        player: &mut Player,
        deck: &mut CardDeck,
        slot: DrawSlot,
    ) -> ActionResult<DrawOutcome> {
        let (card, display_reset) = match slot {
            DrawSlot::Pile => match deck.draw() {
                Ok(card) => (card, false),
                // Nothing can be drawn from anywhere: the turn is skipped, rather than
                // leaving the game stuck.
                Err(ActionError::DeckExhausted) if deck.face_up().is_empty() => {
                    self.end_turn();
                    return Ok(DrawOutcome {
                        card: None,
                        display_reset: false,
                        turn_over: true,
                    });
                }
                Err(error) => return Err(error),
            },
            DrawSlot::FaceUp(index) => deck.take_face_up(index)?,
        };

        player.receive(card);

        let turn_over =
            (matches!(slot, DrawSlot::FaceUp(_)) && card.is_wild()) || !deck.can_draw_again();
        if turn_over {
            self.end_turn();
        } else {
            self.action = TurnAction::Drawing { cards_drawn: 1 };
        }

        Ok(DrawOutcome {
            card: Some(card),
            display_reset,
            turn_over,
        })
    }

    fn second_draw(
        &mut self,
        player: &mut Player,
        deck: &mut CardDeck,
        slot: DrawSlot,
    ) -> ActionResult<DrawOutcome> {
        let (card, display_reset) = match slot {
            DrawSlot::Pile => (deck.draw().ok(), false),
            DrawSlot::FaceUp(index) => {
                if deck.peek_face_up(index)?.is_wild() {
                    return Err(ActionError::WildcardAsSecondDraw);
                }

                let (card, display_reset) = deck.take_face_up(index)?;
                (Some(card), display_reset)
            }
        };

        if let Some(card) = card {
            player.receive(card);
        }
        self.end_turn();

        Ok(DrawOutcome {
            card,
            display_reset,
            turn_over: true,
        })
    }

    /// Claims a route for `player`, which ends their turn.
    ///
    /// Returns [`ActionError::ActionInProgress`] if a player started drawing cards this
    /// turn, or any rejection from [`claim::validate`].
    pub fn claim(
        &mut self,
        player: &mut Player,
        board: &mut Board,
        deck: &mut CardDeck,
        route: RouteId,
        declared_color: Option<TrainColor>,
    ) -> ActionResult<ClaimPlan> {
        if self.action != TurnAction::Idle {
            return Err(ActionError::ActionInProgress);
        }

        let plan = claim::validate(board, player, self.current, route, declared_color)?;
        claim::settle(&plan, player, board, deck);
        self.end_turn();

        Ok(plan)
    }

    fn end_turn(&mut self) {
        self.current = (self.current + 1) % self.num_players;
        self.action = TurnAction::Idle;
    }
}
