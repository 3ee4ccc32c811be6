//! Frequency relay library.
//!
//! Exposes the pure-logic modules for integration testing and external
//! inspection. The binary in `main.rs` wires them to a simulated
//! frequency analyser and an interactive operator terminal.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod deriver;
pub mod fsm;
pub mod history;
pub mod loads;
pub mod queue;
pub mod reaction;
pub mod sampler;
pub mod stability;
pub mod threshold;
pub mod trip;

mod error;

pub use error::{Error, LoadError, Result, SampleError};
