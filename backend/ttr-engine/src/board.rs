use crate::card::TrainColor;
use crate::error::{ActionError, ActionResult};
use crate::player::PlayerId;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::ops::RangeInclusive;
use thiserror::Error;

const ROUTE_LENGTHS: RangeInclusive<u8> = 1..=6;

/// The map shipped with the engine, a slice of the North American board.
const CLASSIC_BOARD_JSON: &str = include_str!("../maps/classic.json");

/// Routes are referred to by their index in the board data.
pub type RouteId = usize;

/// Where a city is drawn. The engine itself never looks at it.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct City {
    pub name: String,
    pub position: Position,
}

/// A route as described in board data, before it becomes part of a [`Board`].
///
/// # JSON
/// A missing or `null` color means that the route can be claimed with any color.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct RouteData {
    pub from: String,
    pub to: String,
    pub length: u8,
    #[serde(default)]
    pub color: Option<TrainColor>,
}

/// Read-only input describing a board: its cities and the routes connecting them.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct BoardData {
    pub cities: Vec<City>,
    pub routes: Vec<RouteData>,
}

/// Types of error when building a [`Board`] from [`BoardData`].
#[derive(Debug, Error)]
pub enum BoardError {
    #[error("board data is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("city `{0}` appears more than once")]
    DuplicateCity(String),
    #[error("route {route} references unknown city `{city}`")]
    UnknownCity { route: RouteId, city: String },
    #[error("route {0} starts and ends in the same city")]
    LoopingRoute(RouteId),
    #[error("route {route} has length {length}, but lengths go from 1 to 6")]
    InvalidLength { route: RouteId, length: u8 },
    #[error("route {0} cannot require wild cards")]
    WildRoute(RouteId),
}

/// A route between two cities on a given [`Board`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Route {
    id: RouteId,
    from: String,
    to: String,
    /// The number of train cards (and wagons) needed to claim the route.
    length: u8,
    /// `None` means that any color matches, as long as all cards used share it.
    color: Option<TrainColor>,
    /// By whom this route is claimed, if any.
    /// Once set, this never changes again.
    owner: Option<PlayerId>,
}

impl Route {
    #[inline]
    pub fn id(&self) -> RouteId {
        self.id
    }

    #[inline]
    pub fn from(&self) -> &str {
        &self.from
    }

    #[inline]
    pub fn to(&self) -> &str {
        &self.to
    }

    #[inline]
    pub fn length(&self) -> u8 {
        self.length
    }

    #[inline]
    pub fn color(&self) -> Option<TrainColor> {
        self.color
    }

    #[inline]
    pub fn owner(&self) -> Option<PlayerId> {
        self.owner
    }

    /// Whether this route connects the two cities, in either direction.
    pub fn connects(&self, city: &str, other_city: &str) -> bool {
        (self.from == city && self.to == other_city) || (self.from == other_city && self.to == city)
    }
}

/// The authoritative state of the board, per game.
///
/// Cities and routes are fixed at creation; only route ownership changes afterwards.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Board {
    cities: Vec<City>,
    routes: Vec<Route>,
}

impl Board {
    /// Builds a board out of board data, verifying that every route is well-formed.
    pub fn new(data: BoardData) -> Result<Self, BoardError> {
        let mut city_names = HashSet::with_capacity(data.cities.len());
        for city in &data.cities {
            if !city_names.insert(city.name.as_str()) {
                return Err(BoardError::DuplicateCity(city.name.clone()));
            }
        }

        for (id, route) in data.routes.iter().enumerate() {
            for city in [&route.from, &route.to] {
                if !city_names.contains(city.as_str()) {
                    return Err(BoardError::UnknownCity {
                        route: id,
                        city: city.clone(),
                    });
                }
            }

            if route.from == route.to {
                return Err(BoardError::LoopingRoute(id));
            }

            if !ROUTE_LENGTHS.contains(&route.length) {
                return Err(BoardError::InvalidLength {
                    route: id,
                    length: route.length,
                });
            }

            if route.color.map_or(false, |color| color.is_wild()) {
                return Err(BoardError::WildRoute(id));
            }
        }

        let routes = data
            .routes
            .into_iter()
            .enumerate()
            .map(|(id, route)| Route {
                id,
                from: route.from,
                to: route.to,
                length: route.length,
                color: route.color,
                owner: None,
            })
            .collect();

        Ok(Self {
            cities: data.cities,
            routes,
        })
    }

    /// Parses board data from JSON, then builds the board.
    pub fn from_json(json: &str) -> Result<Self, BoardError> {
        Self::new(serde_json::from_str(json)?)
    }

    /// The board shipped with the engine.
    ///
    /// # Example
    /// ```
    /// use ttr_engine::board::Board;
    ///
    /// let board = Board::classic().unwrap();
    /// assert!(board.find_route("Denver", "Omaha").is_some());
    /// assert!(board.find_route("Seattle", "Miami").is_none());
    /// ```
    pub fn classic() -> Result<Self, BoardError> {
        Self::from_json(CLASSIC_BOARD_JSON)
    }

    #[inline]
    pub fn cities(&self) -> &[City] {
        &self.cities
    }

    #[inline]
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Looks up a route, returning [`ActionError::UnknownRoute`] if it does not exist.
    #[inline]
    pub fn route(&self, route: RouteId) -> ActionResult<&Route> {
        self.routes.get(route).ok_or(ActionError::UnknownRoute)
    }

    /// Finds a route between two cities, in either direction.
    ///
    /// When parallel routes connect the same cities, unclaimed ones are preferred.
    pub fn find_route(&self, city: &str, other_city: &str) -> Option<&Route> {
        self.routes
            .iter()
            .filter(|route| route.connects(city, other_city))
            .min_by_key(|route| route.owner.is_some())
    }

    /// Whether every route of the board has an owner.
    #[inline]
    pub fn is_fully_claimed(&self) -> bool {
        self.routes.iter().all(|route| route.owner.is_some())
    }

    /// Marks the route as claimed by `player`.
    ///
    /// Ownership is permanent: if the route is already claimed, this has no effect.
    pub(crate) fn set_owner(&mut self, route: RouteId, player: PlayerId) {
        if let Some(route) = self.routes.get_mut(route) {
            debug_assert!(route.owner.is_none(), "Route {} is already claimed.", route.id);
            route.owner.get_or_insert(player);
        }
    }
}
