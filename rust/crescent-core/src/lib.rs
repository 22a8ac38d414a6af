//! Crescent Core
//!
//! Shared types for the Mornington Crescent interpreter: runtime values, the
//! network topology with its connectivity checks, and the program loader.

pub mod program;
pub mod topology;
pub mod values;

pub use program::{load, Instruction, Program};
pub use topology::{LocationId, RouteId, Topology, TopologyBuilder, TopologyError};
pub use values::Value;
