//! Inbound commands to the application service.
//!
//! These represent actions requested by the outside world (the operator
//! terminal, the maintenance button) that the
//! [`RelayService`](super::service::RelayService) interprets and acts
//! upon.

use crate::threshold::Threshold;

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone)]
pub enum RelayCommand {
    /// Replace both tripping thresholds.
    SetThreshold(Threshold),

    /// The operator pressed the maintenance toggle.
    ToggleMaintenance,
}
