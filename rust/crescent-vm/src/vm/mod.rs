//! The stepping machine: execution state, the stepper and the halting check.

mod ops;

use crate::operations::OperationTable;
use crescent_core::{Instruction, LocationId, Program, Topology, TopologyError, Value};
use ops::Effect;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, trace};

/// Type alias for debug callback to simplify type signatures
pub type DebugCallback = Option<Box<dyn FnMut(&DebugEvent)>>;

/// Debug events emitted during execution. Used for the verbose trace.
#[derive(Debug, Clone)]
pub enum DebugEvent {
    /// One journey, with the accumulator and destination cell on either side.
    Step {
        ip: usize,
        line: usize,
        source: String,
        location: LocationId,
        before: Registers,
        after: Registers,
    },
    /// The accumulator was written to the output.
    Emit { value: Value },
}

/// Accumulator and destination cell at one instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registers {
    pub accumulator: Value,
    pub cell: Value,
}

/// A mark on the call stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallFrame {
    /// Instruction pointer of the marking journey.
    pub ip: usize,
    /// Station the mark was made at.
    pub location: LocationId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Topology,
    Control,
    Structural,
    Operand,
}

#[derive(Debug, Error)]
pub enum VmError {
    #[error(transparent)]
    Topology(#[from] TopologyError),
    #[error("call stack is empty")]
    EmptyStack,
    #[error("program ended at {location}; you have to end at {home}")]
    UnterminatedProgram { location: LocationId, home: LocationId },
    #[error("no instruction at index {ip} (program has {len})")]
    InstructionOutOfRange { ip: usize, len: usize },
    #[error("invalid operand: {0}")]
    InvalidOperand(String),
    #[error("{source}\n  at instruction {ip} (line {line}): {text}")]
    AtInstruction {
        ip: usize,
        line: usize,
        text: String,
        source: Box<VmError>,
    },
}

impl VmError {
    /// Attach the offending instruction. Errors already carrying one are
    /// returned unchanged.
    pub fn at_instruction(self, ip: usize, instruction: &Instruction) -> Self {
        if matches!(self, VmError::AtInstruction { .. }) {
            return self;
        }
        VmError::AtInstruction {
            ip,
            line: instruction.line,
            text: instruction.source.clone(),
            source: Box::new(self),
        }
    }

    /// The underlying error, looking through `AtInstruction`.
    pub fn kind(&self) -> &VmError {
        match self {
            VmError::AtInstruction { source, .. } => source.kind(),
            other => other,
        }
    }

    /// Index of the instruction that failed, if known.
    pub fn instruction_index(&self) -> Option<usize> {
        match self {
            VmError::AtInstruction { ip, .. } => Some(*ip),
            _ => None,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            VmError::AtInstruction { source, .. } => source.category(),
            VmError::Topology(_) => ErrorCategory::Topology,
            VmError::EmptyStack => ErrorCategory::Control,
            VmError::UnterminatedProgram { .. } | VmError::InstructionOutOfRange { .. } => {
                ErrorCategory::Structural
            }
            VmError::InvalidOperand(_) => ErrorCategory::Operand,
        }
    }

    pub fn topology_error(&self) -> Option<&TopologyError> {
        match self.kind() {
            VmError::Topology(e) => Some(e),
            _ => None,
        }
    }

    pub fn is_empty_stack(&self) -> bool {
        matches!(self.kind(), VmError::EmptyStack)
    }

    pub fn is_unterminated(&self) -> bool {
        matches!(self.kind(), VmError::UnterminatedProgram { .. })
    }

    pub fn is_invalid_operand(&self) -> bool {
        matches!(self.kind(), VmError::InvalidOperand(_))
    }
}

/// A single run of one program.
///
/// The topology and station roles are shared and read-only; everything else
/// belongs to this run alone.
pub struct Machine {
    program: Arc<Program>,
    topology: Arc<Topology>,
    operations: Arc<OperationTable>,
    location: LocationId,
    accumulator: Value,
    cells: BTreeMap<LocationId, Value>,
    call_stack: Vec<CallFrame>,
    ip: usize,
    steps: u64,
    /// Emitted values, one line each, in order.
    pub output: Vec<String>,
    /// Optional debug callback for step tracing
    pub debug_callback: DebugCallback,
}

impl Machine {
    /// Set up a run at the home station. Every station's cell starts out
    /// holding its own name.
    pub fn new(
        program: impl Into<Arc<Program>>,
        topology: Arc<Topology>,
        operations: Arc<OperationTable>,
        accumulator: Value,
    ) -> Self {
        let cells = topology
            .locations()
            .map(|location| (location.clone(), Value::Text(location.to_string())))
            .collect();
        Self {
            program: program.into(),
            location: topology.home().clone(),
            topology,
            operations,
            accumulator,
            cells,
            call_stack: Vec::new(),
            ip: 0,
            steps: 0,
            output: Vec::new(),
            debug_callback: None,
        }
    }

    pub fn with_debug_callback(mut self, callback: impl FnMut(&DebugEvent) + 'static) -> Self {
        self.debug_callback = Some(Box::new(callback));
        self
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn location(&self) -> &LocationId {
        &self.location
    }

    pub fn accumulator(&self) -> &Value {
        &self.accumulator
    }

    pub fn cell(&self, location: &str) -> Option<&Value> {
        self.cells.get(location)
    }

    pub fn cells(&self) -> &BTreeMap<LocationId, Value> {
        &self.cells
    }

    pub fn call_stack(&self) -> &[CallFrame] {
        &self.call_stack
    }

    pub fn instruction_pointer(&self) -> usize {
        self.ip
    }

    /// Number of journeys taken so far.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Drain the output captured so far.
    pub fn take_output(&mut self) -> Vec<String> {
        std::mem::take(&mut self.output)
    }

    /// Whether the program has come home.
    ///
    /// Running off the end of the program anywhere but home is an error, not
    /// a normal stop. The starting state is at home too, but nothing has run
    /// yet, so it doesn't count (unless there is nothing to run at all).
    pub fn has_finished(&self) -> Result<bool, VmError> {
        let at_home = self.location == *self.topology.home();
        if self.ip >= self.program.len() {
            if !at_home {
                return Err(VmError::UnterminatedProgram {
                    location: self.location.clone(),
                    home: self.topology.home().clone(),
                });
            }
            return Ok(true);
        }
        Ok(at_home && self.ip > 0)
    }

    /// Execute the instruction at the instruction pointer.
    pub fn step(&mut self) -> Result<(), VmError> {
        let program = Arc::clone(&self.program);
        let ip = self.ip;
        let instruction = program.get(ip).ok_or(VmError::InstructionOutOfRange {
            ip,
            len: program.len(),
        })?;
        self.execute(instruction)
            .map_err(|e| e.at_instruction(ip, instruction))
    }

    /// Step until the program comes home.
    pub fn run(&mut self) -> Result<(), VmError> {
        while !self.has_finished()? {
            self.step()?;
        }
        Ok(())
    }

    fn execute(&mut self, instruction: &Instruction) -> Result<(), VmError> {
        let ip = self.ip;
        let destination = &instruction.destination;
        self.topology.validate_trip(
            self.location.as_str(),
            destination.as_str(),
            instruction.route.as_str(),
        )?;

        let operation = self.operations.get(destination.as_str());
        let cell = self
            .cells
            .get(destination)
            .ok_or_else(|| TopologyError::UnknownLocation(destination.clone()))?;
        let effect = ops::plan(operation, &self.accumulator, cell, &self.call_stack)?;
        debug!(
            ip,
            station = %destination,
            role = operation.map_or("swap", |op| op.name()),
            "journey"
        );
        trace!(?effect, "planned");

        let before = self.debug_callback.as_ref().map(|_| Registers {
            accumulator: self.accumulator.clone(),
            cell: cell.clone(),
        });

        self.location = destination.clone();
        self.apply(effect, destination);

        if let Some(before) = before {
            let after = Registers {
                accumulator: self.accumulator.clone(),
                cell: self.cells.get(destination).cloned().unwrap_or_else(Value::empty_text),
            };
            self.emit_debug_event(DebugEvent::Step {
                ip,
                line: instruction.line,
                source: instruction.source.clone(),
                location: destination.clone(),
                before,
                after,
            });
        }

        self.ip += 1;
        self.steps += 1;
        Ok(())
    }

    fn apply(&mut self, effect: Effect, destination: &LocationId) {
        match effect {
            Effect::Swap => self.swap(destination),
            Effect::Combine(result) => {
                let previous = std::mem::replace(&mut self.accumulator, result);
                self.set_cell(destination, previous);
            }
            Effect::Load(value) => self.accumulator = value,
            Effect::Split { accumulator, cell } => {
                self.accumulator = accumulator;
                self.set_cell(destination, cell);
            }
            Effect::Store { alias } => {
                self.swap(destination);
                if let Some(stored) = self.cells.get(destination).cloned() {
                    self.set_cell(&alias, stored);
                }
            }
            Effect::Retrieve => {
                if let Some(value) = self.cells.get(destination) {
                    self.accumulator = value.clone();
                }
            }
            Effect::Mark => self.call_stack.push(CallFrame {
                ip: self.ip,
                location: destination.clone(),
            }),
            Effect::Jump(frame) => {
                trace!(target_ip = frame.ip, location = %frame.location, "branch taken");
                self.location = frame.location;
                self.ip = frame.ip;
            }
            Effect::Unmark => {
                self.call_stack.pop();
            }
            Effect::Emit => {
                let value = self.accumulator.clone();
                self.output.push(value.to_string());
                self.emit_debug_event(DebugEvent::Emit { value });
            }
            Effect::Stay => {}
        }
    }

    fn swap(&mut self, location: &LocationId) {
        if let Some(cell) = self.cells.get_mut(location) {
            std::mem::swap(&mut self.accumulator, cell);
        }
    }

    /// Cells exist for exactly the stations of the topology; writes to
    /// anything else are dropped.
    fn set_cell(&mut self, location: &LocationId, value: Value) {
        if let Some(cell) = self.cells.get_mut(location) {
            *cell = value;
        }
    }

    fn emit_debug_event(&mut self, event: DebugEvent) {
        if let Some(ref mut cb) = self.debug_callback {
            cb(&event);
        }
    }
}
