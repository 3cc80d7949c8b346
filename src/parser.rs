//! Decoders for the pathfinder server's response bodies
//!
//! Two wire formats are understood:
//! 1. `legacy` - fixed-position slicing of the brace/quote text, exactly the way
//!    the first web client consumed it. Names cannot contain `,` or `"`.
//! 2. `json` - the same payloads decoded as structured data.
//!
//! Both yield identical records for well-formed bodies.

use crate::error::{PathError, Result};
use crate::model::{sort_by_long_name, Building, DecodedPath, PathColor};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Width of the `"x1":` tag in front of every legacy path field
const FIELD_TAG_WIDTH: usize = 5;

/// Separator between legacy path records
const RECORD_SEPARATOR: &str = "},{";

/// Longest fragment quoted back in a parse error
const MAX_FRAGMENT: usize = 60;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireFormat {
    Legacy,
    #[default]
    Json,
}

impl fmt::Display for WireFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireFormat::Legacy => f.write_str("legacy"),
            WireFormat::Json => f.write_str("json"),
        }
    }
}

impl FromStr for WireFormat {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "legacy" => Ok(WireFormat::Legacy),
            "json" => Ok(WireFormat::Json),
            other => Err(PathError::Config(format!("unknown wire format: {}", other))),
        }
    }
}

/// Decodes server bodies in one wire format
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseParser {
    format: WireFormat,
}

impl ResponseParser {
    pub fn new(format: WireFormat) -> Self {
        Self { format }
    }

    pub fn format(&self) -> WireFormat {
        self.format
    }

    /// Decode the building list, sorted by long name
    pub fn buildings(&self, body: &str) -> Result<Vec<Building>> {
        let mut buildings = match self.format {
            WireFormat::Legacy => legacy_buildings(body)?,
            WireFormat::Json => json_buildings(body)?,
        };
        sort_by_long_name(&mut buildings);
        Ok(buildings)
    }

    /// Decode a path, tagging every segment with `color`
    pub fn path(&self, body: &str, color: PathColor) -> Result<DecodedPath> {
        let quads = match self.format {
            WireFormat::Legacy => legacy_path(body)?,
            WireFormat::Json => json_path(body)?,
        };
        Ok(DecodedPath::from_quads(quads, color))
    }

    /// Decode walking directions into one line per step
    pub fn directions(&self, body: &str) -> Result<String> {
        match self.format {
            WireFormat::Legacy => Ok(body.replace(',', "\n")),
            WireFormat::Json => {
                let steps: Vec<String> =
                    serde_json::from_str(body).map_err(|e| json_error("directions", body, &e))?;
                Ok(steps.join("\n"))
            }
        }
    }
}

fn legacy_buildings(body: &str) -> Result<Vec<Building>> {
    let inner = strip_wrapper(body.trim(), "{", "}", "building list")?;
    if inner.is_empty() {
        return Ok(Vec::new());
    }

    inner
        .split(',')
        .map(|entry| {
            let (short, long) = entry
                .split_once(':')
                .ok_or_else(|| PathError::parse("building entry", entry))?;
            Ok(Building::new(
                strip_wrapper(short, "\"", "\"", "building short name")?,
                strip_wrapper(long, "\"", "\"", "building long name")?,
            ))
        })
        .collect()
}

fn legacy_path(body: &str) -> Result<Vec<[f64; 4]>> {
    let body = body.trim();
    if body.is_empty() || body == "[]" {
        return Ok(Vec::new());
    }

    let inner = strip_wrapper(body, "[{", "}]", "path")?;
    inner.split(RECORD_SEPARATOR).map(legacy_record).collect()
}

fn legacy_record(record: &str) -> Result<[f64; 4]> {
    let fields: Vec<&str> = record.split(',').collect();
    if fields.len() != 4 {
        return Err(PathError::parse("path record", record));
    }

    let mut quad = [0.0; 4];
    for (slot, field) in quad.iter_mut().zip(fields) {
        *slot = field
            .get(FIELD_TAG_WIDTH..)
            .and_then(|value| value.trim().parse::<f64>().ok())
            .filter(|value| value.is_finite())
            .ok_or_else(|| PathError::parse("path field", field))?;
    }
    Ok(quad)
}

fn json_buildings(body: &str) -> Result<Vec<Building>> {
    let names: BTreeMap<String, String> =
        serde_json::from_str(body).map_err(|e| json_error("building list", body, &e))?;
    Ok(names
        .into_iter()
        .map(|(short, long)| Building::new(short, long))
        .collect())
}

#[derive(Deserialize)]
struct WireSegment {
    x1: f64,
    y1: f64,
    x2: f64,
    y2: f64,
}

fn json_path(body: &str) -> Result<Vec<[f64; 4]>> {
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }
    let segments: Vec<WireSegment> =
        serde_json::from_str(body).map_err(|e| json_error("path", body, &e))?;
    Ok(segments
        .into_iter()
        .map(|s| [s.x1, s.y1, s.x2, s.y2])
        .collect())
}

/// Strip one `open` prefix and one `close` suffix, or fail with the input
fn strip_wrapper<'a>(
    text: &'a str,
    open: &str,
    close: &str,
    context: &'static str,
) -> Result<&'a str> {
    text.strip_prefix(open)
        .and_then(|rest| rest.strip_suffix(close))
        .ok_or_else(|| PathError::parse(context, clip(text, 0)))
}

/// Quote the part of the body the JSON decoder choked on
fn json_error(context: &'static str, body: &str, err: &serde_json::Error) -> PathError {
    let line = body.lines().nth(err.line().saturating_sub(1)).unwrap_or(body);
    let at = err.column().saturating_sub(1).saturating_sub(MAX_FRAGMENT / 2);
    PathError::parse(context, clip(line, at))
}

fn clip(text: &str, from: usize) -> String {
    text.chars().skip(from).take(MAX_FRAGMENT).collect()
}
