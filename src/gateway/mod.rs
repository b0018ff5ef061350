//! Gateway abstraction for the light groups the engine drives.
//!
//! The `LightGateway` trait hides whatever actually switches the lights
//! behind group enumeration and a sparse `apply`. The engine never talks to
//! hardware directly and never caches light state; it emits decisions and
//! lets the gateway reconcile.
//!
//! ## Available gateways
//!
//! - **Dry-run gateway**: logs every command instead of sending it, with the
//!   group list taken from the configured rule table. Useful for shaking out
//!   a schedule before pointing the engine at real hardware.

use anyhow::Result;
use std::time::Duration;

use crate::config::{Config, GatewayKind};
use crate::rules::Decision;

pub mod dry_run;

/// A controllable collection of lights, as the gateway reports it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    /// Gateway-assigned identifier.
    pub id: u32,
    /// Human name, matched against rule and override group names.
    pub name: String,
    /// Member device identifiers, informational.
    pub device_ids: Vec<u32>,
}

/// Per-field outcome of applying a decision.
///
/// A field is `None` when the decision did not set it, `Some(false)` when
/// the gateway failed to apply it. Failures are logged, never retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ApplyReport {
    pub power: Option<bool>,
    pub color_temp: Option<bool>,
    pub color: Option<bool>,
}

impl ApplyReport {
    pub fn all_ok(&self) -> bool {
        [self.power, self.color_temp, self.color]
            .iter()
            .all(|field| *field != Some(false))
    }
}

/// Trait for gateways that can enumerate groups and apply decisions.
pub trait LightGateway {
    /// Establish the gateway session. Called once before the engine loop.
    fn connect(&mut self) -> Result<()>;

    /// Fetch the current group list from the gateway.
    fn groups(&mut self) -> Result<Vec<Group>>;

    /// Apply a sparse decision to one group.
    ///
    /// Only the populated fields of the decision are sent. The transition
    /// duration applies to the power change where the gateway supports it.
    /// Partial failure is reported per field, not as an error.
    fn apply(
        &mut self,
        group: &Group,
        decision: &Decision,
        transition: Duration,
    ) -> Result<ApplyReport>;

    /// Keep-alive probe; failures are logged by the caller, not fatal.
    fn ping(&mut self) -> Result<()>;

    /// Human-readable gateway name for logs.
    fn gateway_name(&self) -> &'static str;
}

/// Create the gateway the configuration asks for.
pub fn create_gateway(config: &Config) -> Result<Box<dyn LightGateway>> {
    match config.gateway {
        GatewayKind::DryRun => Ok(Box::new(dry_run::DryRunGateway::new(config))),
    }
}
