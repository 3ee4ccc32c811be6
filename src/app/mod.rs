//! Application layer — the hexagonal core of the relay.
//!
//! [`service::RelayService`] orchestrates the decision cycle; everything
//! it touches outside the domain goes through the port traits in
//! [`ports`], so the whole relay runs identically against real I/O and
//! against mocks in the integration tests.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
