//! Driving a whole run: input handling, tracing, and the static checker.

use crescent_core::{Program, Topology, TopologyError, Value};
use crescent_vm::{DebugEvent, Machine, OperationTable, TraceFormat, TraceWriter, VmError};
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use tracing::{debug, warn};

/// Read the initial accumulator: one line, without its line terminator.
/// An empty stream gives empty Text.
pub fn read_input_line(mut reader: impl BufRead) -> io::Result<Value> {
    let mut line = String::new();
    reader.read_line(&mut line)?;
    if line.ends_with('\n') {
        line.pop();
        if line.ends_with('\r') {
            line.pop();
        }
    }
    Ok(Value::Text(line))
}

/// The result of a run, including output emitted before any failure.
#[derive(Debug)]
pub struct RunReport {
    pub output: Vec<String>,
    pub steps: u64,
    pub result: Result<(), VmError>,
}

/// Where the verbose trace goes, if anywhere.
pub struct TraceSink {
    pub format: TraceFormat,
    pub out: Box<dyn Write>,
}

/// Run `program` to completion. Emitted lines go to `emit` as they happen,
/// so they interleave with the trace; the report keeps them as well.
pub fn run_program(
    program: Program,
    topology: Arc<Topology>,
    operations: Arc<OperationTable>,
    input: Value,
    emit: Option<Box<dyn Write>>,
    trace: Option<TraceSink>,
) -> RunReport {
    let mut machine = Machine::new(program, topology, operations, input);
    if emit.is_some() || trace.is_some() {
        let mut emit = emit;
        let mut writer = trace.map(|sink| TraceWriter::new(sink.format, sink.out));
        machine = machine.with_debug_callback(move |event| {
            if let (Some(out), DebugEvent::Emit { value }) = (emit.as_mut(), event) {
                if let Err(e) = writeln!(out, "{}", value).and_then(|()| out.flush()) {
                    warn!(error = %e, "failed to write output");
                }
            }
            if let Some(writer) = writer.as_mut() {
                if let Err(e) = writer.record(event) {
                    warn!(error = %e, "failed to write trace");
                }
            }
        });
    }
    let result = machine.run();
    debug!(steps = machine.steps(), ok = result.is_ok(), "run finished");
    RunReport {
        output: machine.take_output(),
        steps: machine.steps(),
        result,
    }
}

/// A journey that can never be taken on this network, found without
/// running anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckIssue {
    pub ip: usize,
    pub line: usize,
    pub source: String,
    pub error: TopologyError,
}

/// Report every instruction naming a line or station the network doesn't
/// have. Connectivity depends on where the program is when it gets there,
/// so it is left to the run.
pub fn check(program: &Program, topology: &Topology) -> Vec<CheckIssue> {
    program
        .iter()
        .enumerate()
        .filter_map(|(ip, instruction)| {
            let error = if !topology.contains_route(instruction.route.as_str()) {
                TopologyError::UnknownRoute(instruction.route.clone())
            } else if !topology.contains_location(instruction.destination.as_str()) {
                TopologyError::UnknownLocation(instruction.destination.clone())
            } else {
                return None;
            };
            Some(CheckIssue {
                ip,
                line: instruction.line,
                source: instruction.source.clone(),
                error,
            })
        })
        .collect()
}
