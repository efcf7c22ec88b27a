use crate::error::{ActionError, ActionResult};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::iter::repeat;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter};

pub const NUM_FACE_UP_CARDS: usize = 5;
const NUM_WILD_CARDS: usize = 14;
const NUM_NON_WILD_CARDS: usize = 12;
const WILD_CARD_LIMIT: usize = 3;
/// 9 regular colors of 12 cards each, plus the wild cards.
pub const TOTAL_NUM_TRAIN_CARDS: usize = 9 * NUM_NON_WILD_CARDS + NUM_WILD_CARDS;

/// Represents the different variants of train cards.
///
/// The declaration order is the palette order: whenever a color has to be picked
/// amongst equally good candidates, the first one in this order wins.
#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    Display,
    EnumIter,
    Eq,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TrainColor {
    /// Also known as the *Hopper train*.
    Black,
    /// Also known as the *Tanker train*.
    Blue,
    /// Also known as the *Flatcar train*.
    Gray,
    /// Also known as the *Caboose train*.
    Green,
    /// Also known as the *Freight train*.
    Orange,
    /// Also known as the *Box train*.
    Pink,
    /// Also known as the *Coal train*.
    Red,
    /// Also known as the *Passenger train*.
    White,
    /// Also known as the *Locomotive*.
    /// This is a special train that matches with any color.
    Wild,
    /// Also known as the *Reefer train*.
    Yellow,
}

impl TrainColor {
    /// Whether the current color is wild, i.e. matches with any color.
    ///
    /// # Examples:
    /// ```
    /// use ttr_engine::card::TrainColor;
    ///
    /// let color = TrainColor::Black;
    /// assert!(!color.is_wild());
    ///
    /// let wild_color = TrainColor::Wild;
    /// assert!(wild_color.is_wild());
    /// ```
    #[inline]
    pub fn is_wild(&self) -> bool {
        *self == TrainColor::Wild
    }

    /// The opposite of `is_wild`.
    #[inline]
    pub fn is_not_wild(&self) -> bool {
        !self.is_wild()
    }

    /// All the non-wild colors, in palette order.
    ///
    /// # Examples:
    /// ```
    /// use ttr_engine::card::TrainColor;
    ///
    /// assert_eq!(TrainColor::regular_colors().count(), 9);
    /// assert_eq!(TrainColor::regular_colors().next(), Some(TrainColor::Black));
    /// ```
    pub fn regular_colors() -> impl Iterator<Item = TrainColor> {
        TrainColor::iter().filter(TrainColor::is_not_wild)
    }

    /// How many cards of this color exist in a game.
    #[inline]
    pub fn num_cards_in_game(&self) -> usize {
        if self.is_wild() {
            NUM_WILD_CARDS
        } else {
            NUM_NON_WILD_CARDS
        }
    }
}

/// The train cards not held by any player: the draw pile, the discard pile,
/// and the face-up display.
///
/// All shuffles go through the random source given at creation, which makes a
/// deck fully reproducible when seeded.
#[derive(Debug)]
pub struct CardDeck {
    face_up: SmallVec<[TrainColor; NUM_FACE_UP_CARDS]>,
    /// Cards are drawn from the end.
    draw_pile: Vec<TrainColor>,
    /// Insertion order in the discard pile does not matter.
    discard_pile: Vec<TrainColor>,
    rng: StdRng,
}

impl CardDeck {
    /// Creates a new `CardDeck` holding every train card of the game, shuffled,
    /// with the face-up display filled.
    ///
    /// The display never starts with three wild cards or more.
    ///
    /// # Example
    /// ```
    /// use rand::{rngs::StdRng, SeedableRng};
    /// use ttr_engine::card::CardDeck;
    ///
    /// let deck = CardDeck::new(StdRng::seed_from_u64(3));
    /// assert_eq!(deck.face_up().len(), 5);
    /// assert_eq!(deck.draw_pile_len() + deck.discard_pile_len(), 117);
    /// ```
    pub fn new(rng: StdRng) -> Self {
        let mut all_train_cards = Vec::with_capacity(TOTAL_NUM_TRAIN_CARDS);
        for color in TrainColor::iter() {
            all_train_cards.extend(repeat(color).take(color.num_cards_in_game()));
        }

        let mut deck = Self {
            face_up: SmallVec::new(),
            draw_pile: all_train_cards,
            discard_pile: Vec::new(),
            rng,
        };

        deck.draw_pile.shuffle(&mut deck.rng);
        deck.refill_face_up();

        deck
    }

    /// Draws the top card of the draw pile.
    ///
    /// If the draw pile is empty, the discard pile is first shuffled and becomes the new
    /// draw pile. If both are empty, returns [`ActionError::DeckExhausted`] without
    /// changing anything.
    pub fn draw(&mut self) -> ActionResult<TrainColor> {
        if self.draw_pile.is_empty() {
            self.reshuffle_discard_pile();
        }

        self.draw_pile.pop().ok_or(ActionError::DeckExhausted)
    }

    /// Takes the face-up card at `index`, and returns it alongside whether the display
    /// had to be reset because of the wild card limit.
    ///
    /// The slot is refilled right away with a drawn card. If nothing can be drawn, the
    /// slot is removed and the display shrinks.
    ///
    /// Returns [`ActionError::InvalidSlot`] if there is no card at `index`.
    pub fn take_face_up(&mut self, index: usize) -> ActionResult<(TrainColor, bool)> {
        let card = self.peek_face_up(index)?;

        match self.draw() {
            Ok(replacement) => self.face_up[index] = replacement,
            Err(_) => {
                self.face_up.remove(index);
            }
        }

        Ok((card, self.enforce_wild_card_limit()))
    }

    /// Looks at the face-up card at `index`, without taking it.
    #[inline]
    pub fn peek_face_up(&self, index: usize) -> ActionResult<TrainColor> {
        self.face_up
            .get(index)
            .copied()
            .ok_or(ActionError::InvalidSlot)
    }

    /// Draws until the display holds five cards or no card is left, then applies the
    /// wild card limit.
    ///
    /// Returns whether the display had to be reset.
    pub fn refill_face_up(&mut self) -> bool {
        self.fill_face_up();
        self.enforce_wild_card_limit()
    }

    /// Adds the given cards to the discard pile.
    pub fn discard<I>(&mut self, train_cards: I)
    where
        I: IntoIterator<Item = TrainColor>,
    {
        self.discard_pile.extend(train_cards);
    }

    /// Whether a player who already drew one card this turn has anything left to draw.
    ///
    /// That is false when both piles are empty and the display only shows wild cards (or
    /// nothing at all), as face-up wild cards cannot be taken as a second draw.
    #[inline]
    pub fn can_draw_again(&self) -> bool {
        !self.draw_pile.is_empty()
            || !self.discard_pile.is_empty()
            || self.face_up.iter().any(TrainColor::is_not_wild)
    }

    #[inline]
    pub fn face_up(&self) -> &[TrainColor] {
        &self.face_up
    }

    #[inline]
    pub fn draw_pile_len(&self) -> usize {
        self.draw_pile.len()
    }

    #[inline]
    pub fn discard_pile_len(&self) -> usize {
        self.discard_pile.len()
    }

    /// How many cards of `color` are in the deck, across all piles and the display.
    pub fn count_color(&self, color: TrainColor) -> usize {
        self.draw_pile
            .iter()
            .chain(&self.discard_pile)
            .chain(&self.face_up)
            .filter(|card| **card == color)
            .count()
    }

    fn reshuffle_discard_pile(&mut self) {
        if self.discard_pile.is_empty() {
            return;
        }

        std::mem::swap(&mut self.draw_pile, &mut self.discard_pile);
        self.draw_pile.shuffle(&mut self.rng);

        log::debug!(
            "Reshuffled {} discarded train cards into the draw pile.",
            self.draw_pile.len()
        );
    }

    fn fill_face_up(&mut self) {
        while self.face_up.len() < NUM_FACE_UP_CARDS {
            match self.draw() {
                Ok(card) => self.face_up.push(card),
                Err(_) => break,
            }
        }
    }

    fn should_reset_face_up(&self) -> bool {
        let num_wild_cards_face_up = self.face_up.iter().filter(|card| card.is_wild()).count();

        // If there is less than 3 wild cards face up, then we should not reset.
        if num_wild_cards_face_up < WILD_CARD_LIMIT {
            return false;
        }

        // Otherwise, we should reset as long as there are at least 3 non-wild cards left
        // outside of the players' hands. Without them, no display could satisfy the limit,
        // and we would reset ad infinitum.
        self.face_up
            .iter()
            .chain(&self.draw_pile)
            .chain(&self.discard_pile)
            .filter(|card| card.is_not_wild())
            .nth(WILD_CARD_LIMIT - 1)
            .is_some()
    }

    fn enforce_wild_card_limit(&mut self) -> bool {
        let mut reset = false;

        while self.should_reset_face_up() {
            self.discard_pile.extend(self.face_up.drain(..));
            self.fill_face_up();
            reset = true;
        }

        if reset {
            log::debug!("Reset the face-up display, as it showed too many wild cards.");
        }

        reset
    }

    #[cfg(test)]
    pub(crate) fn from_piles(
        draw_pile: Vec<TrainColor>,
        discard_pile: Vec<TrainColor>,
        face_up: Vec<TrainColor>,
        rng: StdRng,
    ) -> Self {
        Self {
            face_up: face_up.into_iter().collect(),
            draw_pile,
            discard_pile,
            rng,
        }
    }
}
