//! Data model shared by the parser, the session and the renderers

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A campus building
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Building {
    /// Campus-wide unique identifier, used as the selection key
    pub short_name: String,
    /// Human readable label
    pub long_name: String,
}

impl Building {
    pub fn new(short_name: impl Into<String>, long_name: impl Into<String>) -> Self {
        Self {
            short_name: short_name.into(),
            long_name: long_name.into(),
        }
    }
}

/// Sort buildings by long name, ignoring case
pub fn sort_by_long_name(buildings: &mut [Building]) {
    buildings.sort_by_cached_key(|b| b.long_name.to_lowercase());
}

/// Colors a path can be drawn with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathColor {
    Black,
    Orange,
    Blue,
    Purple,
    Green,
}

impl PathColor {
    pub const PALETTE: [PathColor; 5] = [
        PathColor::Black,
        PathColor::Orange,
        PathColor::Blue,
        PathColor::Purple,
        PathColor::Green,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PathColor::Black => "black",
            PathColor::Orange => "orange",
            PathColor::Blue => "blue",
            PathColor::Purple => "purple",
            PathColor::Green => "green",
        }
    }
}

impl fmt::Display for PathColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Picks the color for a freshly computed path
pub trait ColorPolicy: Send {
    fn choose(&mut self) -> PathColor;
}

/// Uniformly random choice from the palette
#[derive(Debug, Default)]
pub struct RandomColor;

impl ColorPolicy for RandomColor {
    fn choose(&mut self) -> PathColor {
        *PathColor::PALETTE
            .choose(&mut rand::thread_rng())
            .unwrap_or(&PathColor::Black)
    }
}

/// Always the same color
#[derive(Debug, Clone, Copy)]
pub struct FixedColor(pub PathColor);

impl ColorPolicy for FixedColor {
    fn choose(&mut self) -> PathColor {
        self.0
    }
}

/// One straight segment of a walking route, in campus units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathSegment {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub color: PathColor,
    /// 0-based position in the route
    pub label: String,
}

/// A marker drawn at the start or end of a route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub x: f64,
    pub y: f64,
    pub label: String,
}

impl Waypoint {
    /// Waypoint labelled with its own `x,y` coordinates
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            label: format!("{},{}", x, y),
        }
    }
}

/// Decoded path: ordered segments plus their start/end markers
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DecodedPath {
    pub segments: Vec<PathSegment>,
    /// Empty, or exactly `[start, end]`
    pub waypoints: Vec<Waypoint>,
}

impl DecodedPath {
    /// Tag raw coordinate quadruples with color and position, then derive
    /// the markers. The end marker is the origin of the last segment.
    pub fn from_quads(quads: Vec<[f64; 4]>, color: PathColor) -> Self {
        let segments: Vec<PathSegment> = quads
            .into_iter()
            .enumerate()
            .map(|(i, [x1, y1, x2, y2])| PathSegment {
                x1,
                y1,
                x2,
                y2,
                color,
                label: i.to_string(),
            })
            .collect();

        let waypoints = match (segments.first(), segments.last()) {
            (Some(first), Some(last)) => {
                vec![Waypoint::at(first.x1, first.y1), Waypoint::at(last.x1, last.y1)]
            }
            _ => Vec::new(),
        };

        Self { segments, waypoints }
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

/// The (start, end) pair a route is requested for
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RouteRequest {
    pub start: String,
    pub end: String,
}

impl fmt::Display for RouteRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.start, self.end)
    }
}

/// A fully resolved route for one request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub request: RouteRequest,
    pub path: DecodedPath,
    pub directions: String,
}
