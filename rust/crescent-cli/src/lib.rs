//! Crescent CLI library.
//!
//! Everything the `crescent` binary does apart from argument parsing, so it
//! can be tested without spawning a process.

pub mod colors;
pub mod config;
pub mod error;
pub mod languages;
pub mod logging;
pub mod network;
pub mod runner;
