//! Step trace rendering: the human-readable verbose log and a JSONL form.

use crate::vm::{DebugEvent, Registers};
use crescent_core::Value;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{self, Write};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraceFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for TraceFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(TraceFormat::Text),
            "json" | "jsonl" => Ok(TraceFormat::Json),
            other => Err(format!("unknown trace format '{}' (expected text or json)", other)),
        }
    }
}

impl fmt::Display for TraceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraceFormat::Text => f.write_str("text"),
            TraceFormat::Json => f.write_str("json"),
        }
    }
}

/// A value as it appears in the JSON trace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum TraceValue {
    Integer(String),
    Text(String),
}

impl From<&Value> for TraceValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Integer(n) => TraceValue::Integer(n.to_string()),
            Value::Text(s) => TraceValue::Text(s.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceRegisters {
    pub accumulator: TraceValue,
    pub cell: TraceValue,
}

impl From<&Registers> for TraceRegisters {
    fn from(regs: &Registers) -> Self {
        Self {
            accumulator: TraceValue::from(&regs.accumulator),
            cell: TraceValue::from(&regs.cell),
        }
    }
}

/// One journey in the JSON trace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceRecord {
    pub seq: u64,
    pub ip: usize,
    pub line: usize,
    pub source: String,
    pub location: String,
    pub before: TraceRegisters,
    pub after: TraceRegisters,
}

/// Writes debug events to `out` in the chosen format.
pub struct TraceWriter<W: Write> {
    format: TraceFormat,
    seq: u64,
    out: W,
}

impl<W: Write> TraceWriter<W> {
    pub fn new(format: TraceFormat, out: W) -> Self {
        Self {
            format,
            seq: 0,
            out,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Record one event. Emit events are not part of the trace; the value
    /// already goes to the program output.
    pub fn record(&mut self, event: &DebugEvent) -> io::Result<()> {
        let DebugEvent::Step {
            ip,
            line,
            source,
            location,
            before,
            after,
        } = event
        else {
            return Ok(());
        };
        self.seq += 1;
        match self.format {
            TraceFormat::Text => {
                writeln!(self.out, "[{}] {}", ip, source)?;
                writeln!(
                    self.out,
                    "Before: {} ({})",
                    before.accumulator.display_quoted(),
                    before.cell.display_quoted()
                )?;
                writeln!(
                    self.out,
                    "After:  {} ({})",
                    after.accumulator.display_quoted(),
                    after.cell.display_quoted()
                )?;
                writeln!(self.out)
            }
            TraceFormat::Json => {
                let record = TraceRecord {
                    seq: self.seq,
                    ip: *ip,
                    line: *line,
                    source: source.clone(),
                    location: location.to_string(),
                    before: TraceRegisters::from(before),
                    after: TraceRegisters::from(after),
                };
                let json = serde_json::to_string(&record).map_err(io::Error::other)?;
                writeln!(self.out, "{}", json)
            }
        }
    }
}
