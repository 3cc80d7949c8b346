//! Selection and result state
//!
//! Everything here is plain data with transitions that do no I/O. The
//! [`Controller`](crate::controller::Controller) does the fetching and hands
//! results back in.

use crate::error::{PathError, Result, ValidationError};
use crate::model::{Building, PathSegment, Route, RouteRequest, Waypoint};
use serde::Serialize;
use tracing::debug;

/// Where the session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    /// Start or end missing, or both the same
    Idle,
    /// A valid selection with no route for it yet
    Selected,
    /// A route is available for the current selection
    Resolved,
}

#[derive(Debug, Clone, Default)]
pub struct Session {
    buildings: Vec<Building>,
    start: Option<String>,
    end: Option<String>,
    route: Option<Route>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn buildings(&self) -> &[Building] {
        &self.buildings
    }

    /// Replace the known buildings (expects them already sorted)
    pub fn set_buildings(&mut self, buildings: Vec<Building>) {
        debug!("Loaded {} buildings", buildings.len());
        self.buildings = buildings;
    }

    pub fn building(&self, short_name: &str) -> Option<&Building> {
        self.buildings.iter().find(|b| b.short_name == short_name)
    }

    pub fn start(&self) -> Option<&str> {
        self.start.as_deref()
    }

    pub fn end(&self) -> Option<&str> {
        self.end.as_deref()
    }

    pub fn select_start(&mut self, short_name: &str) -> Result<()> {
        self.ensure_known(short_name)?;
        self.start = Some(short_name.to_string());
        Ok(())
    }

    pub fn select_end(&mut self, short_name: &str) -> Result<()> {
        self.ensure_known(short_name)?;
        self.end = Some(short_name.to_string());
        Ok(())
    }

    fn ensure_known(&self, short_name: &str) -> Result<()> {
        if self.building(short_name).is_none() {
            return Err(ValidationError::UnknownBuilding(short_name.to_string()).into());
        }
        Ok(())
    }

    /// The request for the current selection, if it is complete and distinct
    pub fn route_request(&self) -> Result<RouteRequest> {
        match (self.start.as_deref(), self.end.as_deref()) {
            (Some(start), Some(end)) if start == end => Err(ValidationError::SameBuilding.into()),
            (Some(start), Some(end)) => Ok(RouteRequest {
                start: start.to_string(),
                end: end.to_string(),
            }),
            _ => Err(ValidationError::MissingSelection.into()),
        }
    }

    /// Commit a route, unless the selection moved on while it was fetched
    pub fn resolve(&mut self, route: Route) -> Result<()> {
        let current = self.route_request().ok();
        if current.as_ref() != Some(&route.request) {
            return Err(PathError::Stale {
                requested: route.request.to_string(),
                current: current.map_or_else(|| "incomplete".to_string(), |r| r.to_string()),
            });
        }
        self.route = Some(route);
        Ok(())
    }

    /// Clear selection and route; buildings are kept
    pub fn reset(&mut self) {
        self.start = None;
        self.end = None;
        self.route = None;
    }

    pub fn phase(&self) -> Phase {
        match (self.route_request(), &self.route) {
            (Ok(request), Some(route)) if route.request == request => Phase::Resolved,
            (Ok(_), _) => Phase::Selected,
            (Err(_), _) => Phase::Idle,
        }
    }

    /// Last resolved route, possibly for an earlier selection
    pub fn route(&self) -> Option<&Route> {
        self.route.as_ref()
    }

    pub fn segments(&self) -> &[PathSegment] {
        match &self.route {
            Some(route) => &route.path.segments,
            None => &[],
        }
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        match &self.route {
            Some(route) => &route.path.waypoints,
            None => &[],
        }
    }

    pub fn directions(&self) -> &str {
        self.route.as_ref().map_or("", |r| r.directions.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DecodedPath, PathColor};

    fn session() -> Session {
        let mut session = Session::new();
        session.set_buildings(vec![
            Building::new("A", "Alpha Hall"),
            Building::new("B", "Beta Center"),
            Building::new("C", "Gamma Library"),
        ]);
        session
    }

    fn route(start: &str, end: &str) -> Route {
        Route {
            request: RouteRequest {
                start: start.to_string(),
                end: end.to_string(),
            },
            path: DecodedPath::from_quads(vec![[0.0, 0.0, 10.0, 5.0]], PathColor::Orange),
            directions: "East".to_string(),
        }
    }

    #[test]
    fn test_phases() {
        let mut s = session();
        assert_eq!(s.phase(), Phase::Idle);

        s.select_start("A").unwrap();
        assert_eq!(s.phase(), Phase::Idle);

        s.select_end("A").unwrap();
        assert_eq!(s.phase(), Phase::Idle);

        s.select_end("B").unwrap();
        assert_eq!(s.phase(), Phase::Selected);

        s.resolve(route("A", "B")).unwrap();
        assert_eq!(s.phase(), Phase::Resolved);

        s.select_end("C").unwrap();
        assert_eq!(s.phase(), Phase::Selected);
        assert_eq!(s.segments().len(), 1, "old overlay stays until replaced");
    }

    #[test]
    fn test_missing_selection() {
        let mut s = session();
        assert!(matches!(
            s.route_request(),
            Err(PathError::Validation(ValidationError::MissingSelection))
        ));
        s.select_end("B").unwrap();
        assert!(matches!(
            s.route_request(),
            Err(PathError::Validation(ValidationError::MissingSelection))
        ));
    }

    #[test]
    fn test_same_building() {
        let mut s = session();
        s.select_start("C").unwrap();
        s.select_end("C").unwrap();
        assert!(matches!(
            s.route_request(),
            Err(PathError::Validation(ValidationError::SameBuilding))
        ));
    }

    #[test]
    fn test_unknown_building_leaves_selection() {
        let mut s = session();
        s.select_start("A").unwrap();
        let err = s.select_start("ZZZ").unwrap_err();
        assert!(err.is_validation());
        assert_eq!(s.start(), Some("A"));
    }

    #[test]
    fn test_stale_route_discarded() {
        let mut s = session();
        s.select_start("A").unwrap();
        s.select_end("B").unwrap();
        s.resolve(route("A", "B")).unwrap();

        s.select_end("C").unwrap();
        let err = s.resolve(route("A", "B")).unwrap_err();
        assert!(matches!(err, PathError::Stale { .. }));
        assert_eq!(s.route().unwrap().request.end, "B");
    }

    #[test]
    fn test_reset_clears_everything_but_buildings() {
        let mut s = session();
        s.select_start("A").unwrap();
        s.select_end("B").unwrap();
        s.resolve(route("A", "B")).unwrap();

        s.reset();
        assert_eq!(s.phase(), Phase::Idle);
        assert!(s.segments().is_empty());
        assert!(s.waypoints().is_empty());
        assert_eq!(s.directions(), "");
        assert_eq!(s.start(), None);
        assert_eq!(s.end(), None);
        assert_eq!(s.buildings().len(), 3);
    }
}
