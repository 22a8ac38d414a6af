//! Crescent VM: the stepping machine for Mornington Crescent programs.
//!
//! A [`Machine`](vm::Machine) walks a loaded [`Program`](crescent_core::Program)
//! across a [`Topology`](crescent_core::Topology), one journey per step, and
//! applies the role of each station it arrives at (see [`operations`]).

pub mod operations;
pub mod trace;
pub mod vm;

pub use operations::{BinaryOp, Operation, OperationTable, UnaryOp, LONDON_HOME};
pub use trace::{TraceFormat, TraceRecord, TraceWriter};
pub use vm::{CallFrame, DebugEvent, ErrorCategory, Machine, Registers, VmError};
