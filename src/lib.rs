//! campus-paths - terminal client for the campus pathfinder
//!
//! Fetches buildings, shortest paths and walking directions from the
//! pathfinder server and draws the route over the campus map.

pub mod api;
pub mod app;
pub mod config;
pub mod controller;
pub mod error;
pub mod logging;
pub mod model;
pub mod parser;
pub mod projection;
pub mod session;
pub mod tui;

pub use api::{HttpPathService, PathService};
pub use config::Config;
pub use controller::{fetch_route, Controller, PendingRoute};
pub use error::{PathError, Result, ValidationError};
pub use model::{Building, ColorPolicy, FixedColor, PathColor, PathSegment, RandomColor, Route, Waypoint};
pub use parser::{ResponseParser, WireFormat};
pub use projection::{LatLon, Projection};
pub use session::{Phase, Session};
