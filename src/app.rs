//! Application state for the campus-paths TUI

use crate::api::PathService;
use crate::config::Config;
use crate::controller::{fetch_route, Controller};
use crate::error::{PathError, Result};
use crate::model::{Building, Route, RouteRequest};
use crate::session::Session;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Which building picker has keyboard focus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Start,
    End,
}

/// Application state
pub struct App<S> {
    /// Selection and route state plus the server client
    controller: Controller<S>,
    /// Configuration
    config: Config,
    /// Focused picker
    focus: Focus,
    /// Highlighted row in the start picker
    start_cursor: usize,
    /// Highlighted row in the end picker
    end_cursor: usize,
    /// Request currently being fetched in the background
    in_flight: Option<RouteRequest>,
    results_tx: mpsc::UnboundedSender<Result<Route>>,
    results_rx: mpsc::UnboundedReceiver<Result<Route>>,
    /// Status message
    status: Option<String>,
    /// Should quit
    should_quit: bool,
}

impl<S: PathService + Clone + 'static> App<S> {
    /// Create a new application
    pub fn new(controller: Controller<S>, config: Config) -> Self {
        let (results_tx, results_rx) = mpsc::unbounded_channel();
        Self {
            controller,
            config,
            focus: Focus::Start,
            start_cursor: 0,
            end_cursor: 0,
            in_flight: None,
            results_tx,
            results_rx,
            status: None,
            should_quit: false,
        }
    }

    pub fn session(&self) -> &Session {
        self.controller.session()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Start => Focus::End,
            Focus::End => Focus::Start,
        };
    }

    /// Highlighted row of a picker
    pub fn cursor(&self, focus: Focus) -> usize {
        match focus {
            Focus::Start => self.start_cursor,
            Focus::End => self.end_cursor,
        }
    }

    /// Move the focused picker's highlight, clamped to the list
    pub fn move_cursor(&mut self, delta: isize) {
        let len = self.session().buildings().len();
        if len == 0 {
            return;
        }
        let cursor = match self.focus {
            Focus::Start => &mut self.start_cursor,
            Focus::End => &mut self.end_cursor,
        };
        *cursor = cursor.saturating_add_signed(delta).min(len - 1);
    }

    /// Jump the focused picker to the first building whose long name
    /// starts with `c`
    pub fn jump_to(&mut self, c: char) {
        let needle = c.to_lowercase().to_string();
        let Some(index) = self
            .session()
            .buildings()
            .iter()
            .position(|b| b.long_name.to_lowercase().starts_with(&needle))
        else {
            return;
        };
        match self.focus {
            Focus::Start => self.start_cursor = index,
            Focus::End => self.end_cursor = index,
        }
    }

    /// Select the highlighted building in the focused picker
    pub fn confirm_selection(&mut self) {
        let Some(building) = self
            .session()
            .buildings()
            .get(self.cursor(self.focus))
            .map(|b| b.short_name.clone())
        else {
            self.status = Some("No buildings loaded".to_string());
            return;
        };

        let result = match self.focus {
            Focus::Start => self.controller.select_start(&building),
            Focus::End => self.controller.select_end(&building),
        };
        match result {
            Ok(()) => {
                debug!("Selected {:?} as {:?}", building, self.focus);
                if self.focus == Focus::Start {
                    self.focus = Focus::End;
                }
                self.status = None;
            }
            Err(e) => self.report(e),
        }
    }

    /// Fetch the building list; failure leaves it empty
    pub async fn load_buildings(&mut self) {
        match self.controller.load_buildings().await {
            Ok(count) => self.status = Some(format!("{} buildings", count)),
            Err(e) => self.report(e),
        }
    }

    /// Start fetching a route for the current selection in the background
    pub fn request_path(&mut self) {
        if let Some(request) = &self.in_flight {
            self.status = Some(format!("Still finding {}...", request));
            return;
        }

        let pending = match self.controller.begin_find_path() {
            Ok(pending) => pending,
            Err(e) => return self.report(e),
        };

        info!("Requesting route {}", pending.request);
        self.in_flight = Some(pending.request.clone());
        self.status = Some(format!("Finding {}...", pending.request));

        let service = self.controller.service().clone();
        let parser = self.controller.parser();
        let tx = self.results_tx.clone();
        tokio::spawn(async move {
            let result = fetch_route(&service, parser, pending).await;
            // Receiver only goes away when the app is shutting down
            let _ = tx.send(result);
        });
    }

    /// Apply any finished background fetch without blocking
    pub fn poll_results(&mut self) {
        while let Ok(result) = self.results_rx.try_recv() {
            self.apply(result);
        }
    }

    /// Wait for the in-flight fetch, if any, and apply it
    pub async fn settle(&mut self) {
        if self.in_flight.is_some() {
            if let Some(result) = self.results_rx.recv().await {
                self.apply(result);
            }
        }
    }

    fn apply(&mut self, result: Result<Route>) {
        self.in_flight = None;
        let outcome = result.and_then(|route| {
            let steps = route.path.segments.len();
            self.controller.complete(route).map(|()| steps)
        });
        match outcome {
            Ok(0) => self.status = Some("No path between those buildings".to_string()),
            Ok(steps) => self.status = Some(format!("Found path with {} segments", steps)),
            Err(e) => self.report(e),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Clear selection, route and directions
    pub fn reset(&mut self) {
        self.controller.reset();
        self.focus = Focus::Start;
        self.status = Some("Cleared".to_string());
    }

    /// Building chosen in a picker
    pub fn selected(&self, focus: Focus) -> Option<&Building> {
        let id = match focus {
            Focus::Start => self.session().start(),
            Focus::End => self.session().end(),
        }?;
        self.session().building(id)
    }

    /// Get status message
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// Should quit
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Request quit
    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    fn report(&mut self, error: PathError) {
        match &error {
            PathError::Validation(_) => debug!("{}", error),
            _ => warn!("{}", error),
        }
        self.status = Some(error.to_string());
    }
}
