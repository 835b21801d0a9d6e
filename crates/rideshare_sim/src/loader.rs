//! Event file loader.
//!
//! # Format
//!
//! One request per line, whitespace separated. Blank lines and lines starting
//! with `#` are ignored. Positions are written `row,column`.
//!
//! ```text
//! # timestamp  kind           id      position  speed
//! 0            DriverRequest  Amaranth  1,1     1
//! # timestamp  kind           id      origin    destination  patience
//! 10           RiderRequest   Cerise    4,2     1,5          15
//! ```
//!
//! The loader only produces well-typed records; it never touches the world.

use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ecs::{DriverId, RiderId};
use crate::geo::Position;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("line {line}: expected {expected} fields for {kind}, found {found}")]
    FieldCount {
        line: usize,
        kind: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("line {line}: unknown event type {token:?}")]
    UnknownEvent { line: usize, token: String },

    #[error("line {line}: {field} {value:?} is not a non-negative integer")]
    NotANumber {
        line: usize,
        field: &'static str,
        value: String,
    },

    #[error("line {line}: {source}")]
    Position {
        line: usize,
        #[source]
        source: crate::geo::ParsePositionError,
    },

    #[error("line {line}: driver {id} has zero speed")]
    ZeroSpeed { line: usize, id: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// One parsed line of the event file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub timestamp: u64,
    pub request: RequestRecord,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestRecord {
    Driver {
        id: DriverId,
        location: Position,
        speed: u64,
    },
    Rider {
        id: RiderId,
        origin: Position,
        destination: Position,
        patience: u64,
    },
}

impl EventRecord {
    pub fn driver(timestamp: u64, id: &str, location: Position, speed: u64) -> Self {
        Self {
            timestamp,
            request: RequestRecord::Driver {
                id: DriverId::new(id),
                location,
                speed,
            },
        }
    }

    pub fn rider(
        timestamp: u64,
        id: &str,
        origin: Position,
        destination: Position,
        patience: u64,
    ) -> Self {
        Self {
            timestamp,
            request: RequestRecord::Rider {
                id: RiderId::new(id),
                origin,
                destination,
                patience,
            },
        }
    }
}

/// Load records from the event file at `path`.
pub fn load_events_path(path: &Path) -> Result<Vec<EventRecord>, LoadError> {
    let file = std::fs::File::open(path)?;
    load_events_reader(file)
}

/// Like [load_events_path] but accepts any `Read` source.
pub fn load_events_reader<R: Read>(reader: R) -> Result<Vec<EventRecord>, LoadError> {
    let mut records = Vec::new();
    for (index, line) in BufReader::new(reader).lines().enumerate() {
        let line = line?;
        if let Some(record) = parse_line(index + 1, &line)? {
            records.push(record);
        }
    }
    Ok(records)
}

/// Load records from an in-memory string.
pub fn load_events_str(input: &str) -> Result<Vec<EventRecord>, LoadError> {
    load_events_reader(input.as_bytes())
}

fn parse_line(line: usize, raw: &str) -> Result<Option<EventRecord>, LoadError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }

    let tokens: Vec<&str> = trimmed.split_whitespace().collect();
    if tokens.len() < 2 {
        return Err(LoadError::FieldCount {
            line,
            kind: "an event",
            expected: 2,
            found: tokens.len(),
        });
    }
    let timestamp = parse_number(line, "timestamp", tokens[0])?;

    let request = match tokens[1] {
        "DriverRequest" => {
            expect_fields(line, "DriverRequest", &tokens, 5)?;
            let id = tokens[2];
            let speed = parse_number(line, "speed", tokens[4])?;
            if speed == 0 {
                return Err(LoadError::ZeroSpeed {
                    line,
                    id: id.to_string(),
                });
            }
            RequestRecord::Driver {
                id: DriverId::new(id),
                location: parse_position(line, tokens[3])?,
                speed,
            }
        }
        "RiderRequest" => {
            expect_fields(line, "RiderRequest", &tokens, 6)?;
            RequestRecord::Rider {
                id: RiderId::new(tokens[2]),
                origin: parse_position(line, tokens[3])?,
                destination: parse_position(line, tokens[4])?,
                patience: parse_number(line, "patience", tokens[5])?,
            }
        }
        other => {
            return Err(LoadError::UnknownEvent {
                line,
                token: other.to_string(),
            })
        }
    };

    Ok(Some(EventRecord { timestamp, request }))
}

fn expect_fields(
    line: usize,
    kind: &'static str,
    tokens: &[&str],
    expected: usize,
) -> Result<(), LoadError> {
    if tokens.len() == expected {
        Ok(())
    } else {
        Err(LoadError::FieldCount {
            line,
            kind,
            expected,
            found: tokens.len(),
        })
    }
}

fn parse_number(line: usize, field: &'static str, value: &str) -> Result<u64, LoadError> {
    value.parse::<u64>().map_err(|_| LoadError::NotANumber {
        line,
        field,
        value: value.to_string(),
    })
}

fn parse_position(line: usize, value: &str) -> Result<Position, LoadError> {
    value
        .parse::<Position>()
        .map_err(|source| LoadError::Position { line, source })
}
