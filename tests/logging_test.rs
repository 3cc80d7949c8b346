//! Log output while the TUI owns the terminal

use campus_paths::app::App;
use campus_paths::logging::HeldLog;
use campus_paths::model::RouteRequest;
use campus_paths::{Config, Controller, PathError, PathService, ResponseParser, Result};
use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;

/// Server that is always down
#[derive(Clone)]
struct Unavailable;

impl Unavailable {
    fn fail(endpoint: &str) -> Result<String> {
        Err(PathError::Status {
            endpoint: endpoint.to_string(),
            status: 503,
            body: String::new(),
        })
    }
}

impl PathService for Unavailable {
    async fn buildings(&self) -> Result<String> {
        Self::fail("buildings")
    }

    async fn find_path(&self, _request: &RouteRequest) -> Result<String> {
        Self::fail("findPath")
    }

    async fn directions(&self, _request: &RouteRequest) -> Result<String> {
        Self::fail("directions")
    }
}

/// Shared in-memory sink usable as a `MakeWriter` target
#[derive(Clone)]
struct Sink(Arc<Mutex<Vec<u8>>>);

impl Write for Sink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for Sink {
    type Writer = Sink;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

fn captured(sink: &Arc<Mutex<Vec<u8>>>) -> String {
    String::from_utf8(sink.lock().unwrap().clone()).unwrap()
}

#[tokio::test]
async fn test_warnings_wait_for_terminal_restore() {
    let sink = Arc::new(Mutex::new(Vec::new()));
    let held = HeldLog::new(Sink(sink.clone()));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("warn"))
        .with_ansi(false)
        .with_writer(held.clone())
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let controller = Controller::new(Unavailable, ResponseParser::default());
    let mut app = App::new(controller, Config::default());
    app.load_buildings().await;

    assert_eq!(
        app.status(),
        Some("buildings: the status expects 200, but got 503")
    );
    assert!(held.pending() > 0);
    assert_eq!(captured(&sink), "");

    held.release().unwrap();
    assert!(captured(&sink).contains("the status expects 200, but got 503"));
}
