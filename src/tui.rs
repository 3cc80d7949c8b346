//! Terminal user interface for campus-paths

use crate::api::PathService;
use crate::app::{App, Focus};
use crate::model::{PathColor, PathSegment, Waypoint};
use crate::projection::{LatLon, Projection};
use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Line as CanvasLine, Points},
        Block, Borders, List, ListItem, ListState, Paragraph, Wrap,
    },
    Frame, Terminal,
};
use std::io;
use std::time::Duration;
use tracing::info;

/// Run the TUI
pub async fn run<S: PathService + Clone + 'static>(mut app: App<S>) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    terminal.draw(|f| draw(f, &app))?;
    app.load_buildings().await;

    // Main loop
    let result = run_loop(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    info!("Bye");
    result
}

/// Main event loop
async fn run_loop<B: ratatui::backend::Backend, S: PathService + Clone + 'static>(
    terminal: &mut Terminal<B>,
    app: &mut App<S>,
) -> Result<()> {
    let tick = Duration::from_millis(app.config().tui.tick_ms);
    loop {
        app.poll_results();
        terminal.draw(|f| draw(f, app))?;

        // Let background fetches make progress between polls
        if event::poll(tick)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    handle_key(app, key.code);
                }
            }
        }
        tokio::task::yield_now().await;

        if app.should_quit() {
            break;
        }
    }

    Ok(())
}

fn handle_key<S: PathService + Clone + 'static>(app: &mut App<S>, code: KeyCode) {
    match code {
        KeyCode::Char('q') | KeyCode::Esc => app.quit(),
        KeyCode::Tab | KeyCode::BackTab => app.toggle_focus(),
        KeyCode::Char('j') | KeyCode::Down => app.move_cursor(1),
        KeyCode::Char('k') | KeyCode::Up => app.move_cursor(-1),
        KeyCode::PageDown => app.move_cursor(10),
        KeyCode::PageUp => app.move_cursor(-10),
        KeyCode::Enter | KeyCode::Char(' ') => app.confirm_selection(),
        KeyCode::Char('f') => app.request_path(),
        KeyCode::Char('r') => app.reset(),
        KeyCode::Char(c) if c.is_ascii_uppercase() => app.jump_to(c),
        _ => {}
    }
}

/// Draw the UI
fn draw<S: PathService + Clone + 'static>(f: &mut Frame, app: &App<S>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Header
            Constraint::Min(8),    // Content
            Constraint::Length(1), // Status
        ])
        .split(f.size());

    draw_header(f, app, chunks[0]);

    let content = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(32), Constraint::Percentage(68)])
        .split(chunks[1]);

    let controls = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(35),
            Constraint::Percentage(35),
            Constraint::Percentage(30),
        ])
        .split(content[0]);

    draw_picker(f, app, Focus::Start, controls[0]);
    draw_picker(f, app, Focus::End, controls[1]);
    draw_directions(f, app, controls[2]);
    draw_map(f, app, content[1]);
    draw_status(f, app, chunks[2]);
}

fn draw_header<S: PathService + Clone + 'static>(f: &mut Frame, app: &App<S>, area: Rect) {
    let name = |focus: Focus| {
        app.selected(focus)
            .map(|b| b.long_name.as_str())
            .unwrap_or("--")
    };

    let header = Line::from(vec![
        Span::styled(" campus-paths ", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
        Span::raw("│ "),
        Span::styled(name(Focus::Start), Style::default().fg(Color::White)),
        Span::raw(" → "),
        Span::styled(name(Focus::End), Style::default().fg(Color::White)),
        Span::raw(" │ "),
        Span::styled(format!("{:?}", app.session().phase()), Style::default().fg(Color::Yellow)),
    ]);

    f.render_widget(Paragraph::new(header), area);
}

fn draw_picker<S: PathService + Clone + 'static>(
    f: &mut Frame,
    app: &App<S>,
    picker: Focus,
    area: Rect,
) {
    let chosen = match picker {
        Focus::Start => app.session().start(),
        Focus::End => app.session().end(),
    };

    let items: Vec<ListItem> = app
        .session()
        .buildings()
        .iter()
        .map(|b| {
            let style = if chosen == Some(b.short_name.as_str()) {
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            ListItem::new(Line::from(vec![
                Span::styled(b.long_name.clone(), style),
                Span::styled(format!(" ({})", b.short_name), Style::default().fg(Color::DarkGray)),
            ]))
        })
        .collect();

    let title = match picker {
        Focus::Start => " Start Building ",
        Focus::End => " End Building ",
    };
    let border = if app.focus() == picker {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let list = List::new(items)
        .block(Block::default().title(title).borders(Borders::ALL).border_style(border))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");

    let mut state = ListState::default();
    if !app.session().buildings().is_empty() {
        state.select(Some(app.cursor(picker)));
    }
    f.render_stateful_widget(list, area, &mut state);
}

fn draw_directions<S: PathService + Clone + 'static>(f: &mut Frame, app: &App<S>, area: Rect) {
    let lines: Vec<Line> = app
        .session()
        .directions()
        .lines()
        .enumerate()
        .map(|(i, step)| Line::from(format!("{:>2}. {}", i + 1, step)))
        .collect();

    let directions = Paragraph::new(lines)
        .block(
            Block::default()
                .title(" Walking Directions ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        )
        .wrap(Wrap { trim: true });

    f.render_widget(directions, area);
}

fn draw_map<S: PathService + Clone + 'static>(f: &mut Frame, app: &App<S>, area: Rect) {
    let config = app.config();
    let projection = config.map.projection;
    let segments = app.session().segments();
    let waypoints = app.session().waypoints();
    let show_labels = config.tui.show_labels;

    let (x_bounds, y_bounds) = viewport(
        &projection,
        segments,
        config.map.center(),
        config.map.span_deg,
    );

    let canvas = Canvas::default()
        .block(
            Block::default()
                .title(" Campus Map ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        )
        .marker(marker(&config.tui.marker))
        .x_bounds(x_bounds)
        .y_bounds(y_bounds)
        .paint(move |ctx| {
            for segment in segments {
                let from = projection.project(segment.x1, segment.y1);
                let to = projection.project(segment.x2, segment.y2);
                ctx.draw(&CanvasLine {
                    x1: from.lon,
                    y1: from.lat,
                    x2: to.lon,
                    y2: to.lat,
                    color: path_color(segment.color),
                });
            }
            ctx.layer();
            draw_waypoints(ctx, &projection, waypoints, show_labels);
        });

    f.render_widget(canvas, area);
}

fn draw_waypoints(
    ctx: &mut ratatui::widgets::canvas::Context<'_>,
    projection: &Projection,
    waypoints: &[Waypoint],
    show_labels: bool,
) {
    for (i, waypoint) in waypoints.iter().enumerate() {
        let at = projection.project(waypoint.x, waypoint.y);
        let color = if i == 0 { Color::Green } else { Color::Red };
        ctx.draw(&Points {
            coords: &[(at.lon, at.lat)],
            color,
        });
        if show_labels {
            ctx.print(
                at.lon,
                at.lat,
                Span::styled(format!(" {}", waypoint.label), Style::default().fg(color)),
            );
        }
    }
}

fn draw_status<S: PathService + Clone + 'static>(f: &mut Frame, app: &App<S>, area: Rect) {
    let (badge, badge_style) = if app.is_busy() {
        (" BUSY ", Style::default().fg(Color::Black).bg(Color::Yellow))
    } else {
        (" READY ", Style::default().fg(Color::Black).bg(Color::Blue))
    };

    let status = Line::from(vec![
        Span::styled(badge, badge_style),
        Span::raw(" "),
        Span::styled(app.status().unwrap_or(""), Style::default().fg(Color::White)),
        Span::raw(" │ "),
        Span::styled(
            "[tab] picker [enter] select [f]ind [r]eset [q]uit",
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    f.render_widget(Paragraph::new(status), area);
}

fn marker(name: &str) -> Marker {
    match name {
        "dot" => Marker::Dot,
        "block" => Marker::Block,
        "bar" => Marker::Bar,
        _ => Marker::Braille,
    }
}

fn path_color(color: PathColor) -> Color {
    match color {
        // black disappears on dark terminals
        PathColor::Black => Color::Gray,
        PathColor::Orange => Color::Rgb(255, 165, 0),
        PathColor::Blue => Color::Blue,
        PathColor::Purple => Color::Magenta,
        PathColor::Green => Color::Green,
    }
}

/// Canvas bounds as `([min_lon, max_lon], [min_lat, max_lat])`. Fits the
/// route with a margin when there is one, else centers on the campus.
fn viewport(
    projection: &Projection,
    segments: &[PathSegment],
    center: LatLon,
    span_deg: f64,
) -> ([f64; 2], [f64; 2]) {
    let points = segments.iter().flat_map(|s| {
        [
            projection.project(s.x1, s.y1),
            projection.project(s.x2, s.y2),
        ]
    });

    let mut bounds: Option<(f64, f64, f64, f64)> = None;
    for p in points {
        bounds = Some(match bounds {
            None => (p.lon, p.lon, p.lat, p.lat),
            Some((x0, x1, y0, y1)) => (x0.min(p.lon), x1.max(p.lon), y0.min(p.lat), y1.max(p.lat)),
        });
    }

    match bounds {
        Some((x0, x1, y0, y1)) => {
            // Never zoom in further than a tenth of the default span
            let half = ((x1 - x0).max(y1 - y0) / 2.0 * 1.2).max(span_deg / 10.0);
            let (cx, cy) = ((x0 + x1) / 2.0, (y0 + y1) / 2.0);
            ([cx - half, cx + half], [cy - half, cy + half])
        }
        None => (
            [center.lon - span_deg, center.lon + span_deg],
            [center.lat - span_deg, center.lat + span_deg],
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::controller::Controller;
    use crate::error::Result;
    use crate::model::{DecodedPath, FixedColor, RouteRequest};
    use crate::parser::ResponseParser;
    use crate::session::Phase;

    #[derive(Clone)]
    struct Campus;

    impl PathService for Campus {
        async fn buildings(&self) -> Result<String> {
            Ok(r#"{"A":"Alpha Hall","B":"Beta Center"}"#.to_string())
        }

        async fn find_path(&self, _request: &RouteRequest) -> Result<String> {
            Ok(r#"[{"x1":0.0,"y1":0.0,"x2":4.0,"y2":3.0}]"#.to_string())
        }

        async fn directions(&self, _request: &RouteRequest) -> Result<String> {
            Ok(r#"["North"]"#.to_string())
        }
    }

    fn identity() -> Projection {
        Projection {
            ref_lon: 0.0,
            ref_lat: 0.0,
            lon_offset: 0.0,
            lat_offset: 0.0,
            lon_scale: 1.0,
            lat_scale: 1.0,
        }
    }

    #[test]
    fn test_viewport_without_route_is_centered() {
        let (x, y) = viewport(&identity(), &[], LatLon { lat: 47.0, lon: -122.0 }, 0.5);
        assert_eq!(x, [-122.5, -121.5]);
        assert_eq!(y, [46.5, 47.5]);
    }

    #[test]
    fn test_viewport_contains_route() {
        let path = DecodedPath::from_quads(
            vec![[0.0, 0.0, 10.0, 5.0], [10.0, 5.0, 20.0, 5.0]],
            PathColor::Blue,
        );
        let (x, y) = viewport(&identity(), &path.segments, LatLon { lat: 0.0, lon: 0.0 }, 1.0);
        assert!(x[0] < 0.0 && x[1] > 20.0);
        assert!(y[0] < 0.0 && y[1] > 5.0);
    }

    #[test]
    fn test_unknown_marker_falls_back_to_braille() {
        assert_eq!(marker("sparkles"), Marker::Braille);
        assert_eq!(marker("dot"), Marker::Dot);
    }

    #[tokio::test]
    async fn test_keys_drive_the_app() {
        let controller = Controller::new(Campus, ResponseParser::default())
            .with_color_policy(FixedColor(PathColor::Orange));
        let mut app = App::new(controller, Config::default());
        app.load_buildings().await;

        handle_key(&mut app, KeyCode::Enter);
        assert_eq!(app.focus(), Focus::End);
        handle_key(&mut app, KeyCode::Char('j'));
        handle_key(&mut app, KeyCode::Char(' '));
        assert_eq!(app.session().end(), Some("B"));

        handle_key(&mut app, KeyCode::Char('f'));
        assert!(app.is_busy());
        app.settle().await;
        assert_eq!(app.session().phase(), Phase::Resolved);

        handle_key(&mut app, KeyCode::Char('r'));
        assert_eq!(app.session().phase(), Phase::Idle);
        assert_eq!(app.status(), Some("Cleared"));

        handle_key(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit());
    }
}
