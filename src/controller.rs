//! Orchestrates server calls around a [`Session`]

use crate::api::PathService;
use crate::error::Result;
use crate::model::{ColorPolicy, PathColor, RandomColor, Route, RouteRequest};
use crate::parser::ResponseParser;
use crate::session::Session;
use tracing::{info, warn};

/// A validated request waiting to be fetched
#[derive(Debug, Clone, PartialEq)]
pub struct PendingRoute {
    pub request: RouteRequest,
    pub color: PathColor,
}

/// Fetch path then directions for `pending`. Directions are only requested
/// once the path came back and decoded.
pub async fn fetch_route<S: PathService>(
    service: &S,
    parser: ResponseParser,
    pending: PendingRoute,
) -> Result<Route> {
    let PendingRoute { request, color } = pending;
    info!("Finding path {}", request);

    let body = service.find_path(&request).await?;
    let path = parser.path(&body, color)?;
    if path.is_empty() {
        warn!("Server returned an empty path for {}", request);
    }

    let body = service.directions(&request).await?;
    let directions = parser.directions(&body)?;

    Ok(Route {
        request,
        path,
        directions,
    })
}

pub struct Controller<S> {
    service: S,
    parser: ResponseParser,
    colors: Box<dyn ColorPolicy>,
    session: Session,
}

impl<S: PathService> Controller<S> {
    pub fn new(service: S, parser: ResponseParser) -> Self {
        Self {
            service,
            parser,
            colors: Box::new(RandomColor),
            session: Session::new(),
        }
    }

    /// Replace the random path color with another policy
    pub fn with_color_policy(mut self, policy: impl ColorPolicy + 'static) -> Self {
        self.colors = Box::new(policy);
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn parser(&self) -> ResponseParser {
        self.parser
    }

    /// Fetch the building list. On failure the current list is kept.
    pub async fn load_buildings(&mut self) -> Result<usize> {
        let body = self.service.buildings().await?;
        let buildings = self.parser.buildings(&body)?;
        let count = buildings.len();
        self.session.set_buildings(buildings);
        info!("Loaded {} buildings", count);
        Ok(count)
    }

    pub fn select_start(&mut self, short_name: &str) -> Result<()> {
        self.session.select_start(short_name)
    }

    pub fn select_end(&mut self, short_name: &str) -> Result<()> {
        self.session.select_end(short_name)
    }

    /// Validate the selection and pick the color for the next route
    pub fn begin_find_path(&mut self) -> Result<PendingRoute> {
        let request = self.session.route_request()?;
        Ok(PendingRoute {
            request,
            color: self.colors.choose(),
        })
    }

    /// Commit a fetched route to the session
    pub fn complete(&mut self, route: Route) -> Result<()> {
        self.session.resolve(route)
    }

    /// Resolve a route for the current selection. Nothing in the session
    /// changes unless both requests and both decodes succeed.
    pub async fn find_path(&mut self) -> Result<()> {
        let pending = self.begin_find_path()?;
        let route = fetch_route(&self.service, self.parser, pending).await?;
        self.complete(route)
    }

    pub fn reset(&mut self) {
        info!("Reset selection");
        self.session.reset();
    }
}
