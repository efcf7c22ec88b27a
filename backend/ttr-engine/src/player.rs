use crate::card::TrainColor;

use serde::Serialize;
use std::collections::BTreeMap;
use std::iter::repeat;
use strum::IntoEnumIterator;

/// Players are identified by the order in which they joined the game, starting at 0.
pub type PlayerId = usize;

/// The train cards held by a player, counted per color.
///
/// It is guaranteed that the map has at all times an entry for every train color,
/// so iterating over a hand always goes through the palette in order.
///
/// # JSON
/// A hand is serialized as a map from color to count, e.g. `{"black": 0, "blue": 2, ...}`.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Hand {
    cards: BTreeMap<TrainColor, u8>,
}

impl Default for Hand {
    fn default() -> Self {
        Self {
            cards: TrainColor::iter().map(|color| (color, 0)).collect(),
        }
    }
}

impl FromIterator<TrainColor> for Hand {
    fn from_iter<I: IntoIterator<Item = TrainColor>>(iter: I) -> Self {
        let mut hand = Self::default();
        for card in iter {
            hand.add(card);
        }
        hand
    }
}

impl Hand {
    /// An empty hand.
    pub fn new() -> Self {
        Self::default()
    }

    /// How many cards of `color` are in the hand.
    #[inline]
    pub fn count(&self, color: TrainColor) -> u8 {
        self.cards.get(&color).copied().unwrap_or(0)
    }

    /// Total number of cards in the hand.
    pub fn len(&self) -> usize {
        self.cards.values().map(|&count| usize::from(count)).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates over every color with its count, in palette order.
    pub fn iter(&self) -> impl Iterator<Item = (TrainColor, u8)> + '_ {
        self.cards.iter().map(|(&color, &count)| (color, count))
    }

    /// Iterates over every single card of the hand.
    pub fn cards(&self) -> impl Iterator<Item = TrainColor> + '_ {
        self.iter()
            .flat_map(|(color, count)| repeat(color).take(usize::from(count)))
    }

    pub fn add(&mut self, card: TrainColor) {
        *self.cards.entry(card).or_insert(0) += 1;
    }

    /// Removes `num` cards of `color` from the hand.
    ///
    /// Callers must have verified beforehand that the hand holds enough of them.
    pub(crate) fn remove(&mut self, color: TrainColor, num: u8) {
        let count = self.cards.entry(color).or_insert(0);
        debug_assert!(*count >= num, "Cannot remove {num} {color} cards out of {count}.");
        *count = count.saturating_sub(num);
    }
}

/// Encapsulates all the per-player state of a game: identity, score, wagons and hand.
///
/// A [`Player`] is not aware of other players, nor of whose turn it is: the rules deciding
/// when a player may act are enforced by [`crate::turn::TurnStateMachine`] and
/// [`crate::session::GameSession`].
#[derive(Clone, Debug, PartialEq)]
pub struct Player {
    /// Unique to each player in the game.
    id: PlayerId,
    /// Unique to each player in the game.
    name: String,
    /// Points gained by claiming routes. Never decreases.
    score: u16,
    /// The currency used, alongside train cards, to claim routes.
    /// Every claim costs as many wagons as the route is long.
    wagons: u8,
    hand: Hand,
}

impl Player {
    /// Creates a new player, with an empty hand and no points.
    pub fn new(id: PlayerId, name: String, wagons: u8) -> Self {
        Self {
            id,
            name,
            score: 0,
            wagons,
            hand: Hand::new(),
        }
    }

    #[inline]
    pub fn id(&self) -> PlayerId {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn score(&self) -> u16 {
        self.score
    }

    #[inline]
    pub fn wagons(&self) -> u8 {
        self.wagons
    }

    #[inline]
    pub fn hand(&self) -> &Hand {
        &self.hand
    }

    /// Adds a drawn train card to the player's hand.
    pub(crate) fn receive(&mut self, card: TrainColor) {
        self.hand.add(card);
    }

    pub(crate) fn hand_mut(&mut self) -> &mut Hand {
        &mut self.hand
    }

    pub(crate) fn spend_wagons(&mut self, wagons: u8) {
        debug_assert!(self.wagons >= wagons);
        self.wagons = self.wagons.saturating_sub(wagons);
    }

    pub(crate) fn add_points(&mut self, points: u16) {
        self.score += points;
    }

    #[cfg(test)]
    pub(crate) fn set_wagons(&mut self, wagons: u8) {
        self.wagons = wagons;
    }
}
