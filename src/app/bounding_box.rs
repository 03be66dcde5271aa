//! Longitude/latitude positions and axis-aligned bounding boxes
//!
//! Boxes are defined by their north-east and south-west corners. Containment
//! is inclusive on all edges. Sizes are only meaningful for ranking boxes
//! against each other, not as geodesic areas.

use std::fmt;

use geo::{Distance, Geodesic, Point};
use serde::{Deserialize, Serialize};

use crate::constants::geo::ANTIMERIDIAN_LONGITUDE;

/// A WGS-84 position in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub longitude: f64,
    pub latitude: f64,
}

impl Position {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }

    fn as_point(&self) -> Point<f64> {
        Point::new(self.longitude, self.latitude)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.longitude, self.latitude)
    }
}

/// An area defined by its north-east and south-west corners
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub north_east: Position,
    pub south_west: Position,
}

impl BoundingBox {
    pub fn new(north_east: Position, south_west: Position) -> Self {
        Self {
            north_east,
            south_west,
        }
    }

    /// Create a box from corner coordinates in north-east, south-west order
    pub fn from_coordinates(
        longitude_north_east: f64,
        latitude_north_east: f64,
        longitude_south_west: f64,
        latitude_south_west: f64,
    ) -> Self {
        Self::new(
            Position::new(longitude_north_east, latitude_north_east),
            Position::new(longitude_south_west, latitude_south_west),
        )
    }

    /// Smallest box enclosing all route positions, `None` for an empty route
    pub fn from_positions(positions: &[Position]) -> Option<Self> {
        let first = positions.first()?;
        let mut north_east = *first;
        let mut south_west = *first;

        for position in &positions[1..] {
            north_east.longitude = north_east.longitude.max(position.longitude);
            north_east.latitude = north_east.latitude.max(position.latitude);
            south_west.longitude = south_west.longitude.min(position.longitude);
            south_west.latitude = south_west.latitude.min(position.latitude);
        }

        Some(Self::new(north_east, south_west))
    }

    pub fn south_east(&self) -> Position {
        Position::new(self.north_east.longitude, self.south_west.latitude)
    }

    pub fn north_west(&self) -> Position {
        Position::new(self.south_west.longitude, self.north_east.latitude)
    }

    pub fn center(&self) -> Position {
        Position::new(
            (self.south_west.longitude + self.north_east.longitude) / 2.0,
            (self.south_west.latitude + self.north_east.latitude) / 2.0,
        )
    }

    /// Product of the longitude and latitude spans, for ranking only
    pub fn square_size(&self) -> f64 {
        (self.south_west.longitude - self.north_east.longitude)
            * (self.south_west.latitude - self.north_east.latitude)
    }

    pub fn contains_position(&self, position: &Position) -> bool {
        position.longitude >= self.south_west.longitude
            && position.longitude <= self.north_east.longitude
            && position.latitude >= self.south_west.latitude
            && position.latitude <= self.north_east.latitude
    }

    /// Whether all four corners of `other` lie inside this box
    pub fn contains(&self, other: &BoundingBox) -> bool {
        self.contains_position(&other.north_east)
            && self.contains_position(&other.south_east())
            && self.contains_position(&other.south_west)
            && self.contains_position(&other.north_west())
    }

    /// Geodesic distance in metres between the centers of both boxes
    pub fn distance_between_centers(&self, other: &BoundingBox) -> f64 {
        Geodesic::distance(self.center().as_point(), other.center().as_point())
    }

    /// Boxes touching the antimeridian are unreliable and must not take part in containment decisions
    pub fn is_valid(&self) -> bool {
        !(self.north_east.longitude.abs() >= ANTIMERIDIAN_LONGITUDE
            || self.south_west.longitude.abs() >= ANTIMERIDIAN_LONGITUDE)
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NE{} SW{}", self.north_east, self.south_west)
    }
}
