//! Validation and settlement of route claims.
//!
//! A claim goes through two steps: [`validate`] checks every requirement without
//! touching anything and returns a [`ClaimPlan`], then [`settle`] applies that plan.
//! Settlement cannot fail, so a rejected claim never leaves the game half-mutated.

use crate::board::{Board, Route, RouteId};
use crate::card::{CardDeck, TrainColor};
use crate::error::{ActionError, ActionResult};
use crate::player::{Hand, Player, PlayerId};

use std::iter::repeat;

/// Points awarded for claiming a route, indexed by route length.
pub const ROUTE_SCORE: [u16; 7] = [0, 1, 2, 4, 7, 10, 15];

/// Points awarded for claiming a route of the given length.
///
/// Lengths without an entry in [`ROUTE_SCORE`] are worth nothing.
///
/// # Example
/// ```
/// use ttr_engine::claim::route_score;
///
/// assert_eq!(route_score(4), 7);
/// assert_eq!(route_score(6), 15);
/// assert_eq!(route_score(9), 0);
/// ```
#[inline]
pub fn route_score(length: u8) -> u16 {
    ROUTE_SCORE.get(usize::from(length)).copied().unwrap_or(0)
}

/// Which cards a validated claim consumes.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ClaimPlan {
    pub route: RouteId,
    /// The color the route is claimed with. Never wild.
    pub color: TrainColor,
    /// How many cards of `color` are spent.
    pub colored_cards: u8,
    /// How many wild cards make up for the rest.
    pub wild_cards: u8,
}

impl ClaimPlan {
    /// The number of cards spent, which is also the length of the route.
    #[inline]
    pub fn length(&self) -> u8 {
        self.colored_cards + self.wild_cards
    }
}

/// Checks whether `player` can claim `route` right now.
///
/// Rejections are checked in this order:
///   * [`ActionError::UnknownRoute`] if the route does not exist.
///   * [`ActionError::RouteTaken`] if someone already owns it.
///   * [`ActionError::NotYourTurn`] if `player` is not `turn_holder`.
///   * [`ActionError::InsufficientWagons`] if the player has fewer wagons than the route's length.
///   * [`ActionError::InvalidColor`] if the declared color is wild, or differs from the route's color.
///   * [`ActionError::InsufficientCards`] if the hand cannot pay for the route.
///
/// On a route of any color without a declared color, the color is picked with
/// [`auto_select_color`].
pub fn validate(
    board: &Board,
    player: &Player,
    turn_holder: PlayerId,
    route: RouteId,
    declared_color: Option<TrainColor>,
) -> ActionResult<ClaimPlan> {
    let route = board.route(route)?;

    if route.owner().is_some() {
        return Err(ActionError::RouteTaken);
    }

    if player.id() != turn_holder {
        return Err(ActionError::NotYourTurn);
    }

    let length = route.length();
    if player.wagons() < length {
        return Err(ActionError::InsufficientWagons);
    }

    let hand = player.hand();
    let color = resolve_color(route, hand, declared_color)?;

    let colored_cards = hand.count(color).min(length);
    let wild_cards = length - colored_cards;
    if hand.count(TrainColor::Wild) < wild_cards {
        return Err(ActionError::InsufficientCards);
    }

    Ok(ClaimPlan {
        route: route.id(),
        color,
        colored_cards,
        wild_cards,
    })
}

fn resolve_color(
    route: &Route,
    hand: &Hand,
    declared_color: Option<TrainColor>,
) -> ActionResult<TrainColor> {
    match (route.color(), declared_color) {
        (_, Some(declared)) if declared.is_wild() => Err(ActionError::InvalidColor),
        (Some(required), Some(declared)) if required != declared => {
            Err(ActionError::InvalidColor)
        }
        (Some(required), _) => Ok(required),
        (None, Some(declared)) => Ok(declared),
        (None, None) => {
            auto_select_color(hand, route.length()).ok_or(ActionError::InsufficientCards)
        }
    }
}

/// Picks the color to claim a route of any color with.
///
/// Amongst the colors that, together with the wild cards, cover `length`, picks the
/// one the hand holds the most of. Ties go to the earliest color in palette order.
/// Returns `None` if no color qualifies.
///
/// # Example
/// ```
/// use ttr_engine::card::TrainColor::*;
/// use ttr_engine::claim::auto_select_color;
/// use ttr_engine::player::Hand;
///
/// let hand: Hand = [Red, Red, Blue, Blue, Wild].into_iter().collect();
/// assert_eq!(auto_select_color(&hand, 3), Some(Blue));
/// assert_eq!(auto_select_color(&hand, 4), None);
/// ```
pub fn auto_select_color(hand: &Hand, length: u8) -> Option<TrainColor> {
    let num_wild_cards = hand.count(TrainColor::Wild);
    let mut best: Option<(TrainColor, u8)> = None;

    for color in TrainColor::regular_colors() {
        let count = hand.count(color);
        if count.saturating_add(num_wild_cards) < length {
            continue;
        }

        if best.map_or(true, |(_, best_count)| count > best_count) {
            best = Some((color, count));
        }
    }

    best.map(|(color, _)| color)
}

/// Applies a validated claim: spends the cards and wagons, awards the points, and
/// assigns the route to the player for the rest of the game.
///
/// The cards of the claimed color are spent first, and wild cards only make up for
/// the rest. Every spent card goes to the discard pile.
pub fn settle(plan: &ClaimPlan, player: &mut Player, board: &mut Board, deck: &mut CardDeck) {
    let hand = player.hand_mut();
    hand.remove(plan.color, plan.colored_cards);
    hand.remove(TrainColor::Wild, plan.wild_cards);

    deck.discard(
        repeat(plan.color)
            .take(usize::from(plan.colored_cards))
            .chain(repeat(TrainColor::Wild).take(usize::from(plan.wild_cards))),
    );

    let length = plan.length();
    player.spend_wagons(length);
    player.add_points(route_score(length));
    board.set_owner(plan.route, player.id());
}
