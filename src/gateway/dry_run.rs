//! Gateway that logs commands instead of sending them.

use anyhow::Result;
use std::time::Duration;

use crate::config::Config;
use crate::rules::Decision;

use super::{ApplyReport, Group, LightGateway};

/// Stand-in gateway whose group list mirrors the configured rule table.
pub struct DryRunGateway {
    groups: Vec<Group>,
}

impl DryRunGateway {
    pub fn new(config: &Config) -> Self {
        let mut names = config.schedule().group_names();
        for name in config
            .away
            .primary_groups
            .iter()
            .chain(&config.away.secondary_groups)
        {
            if !names.contains(name) {
                names.push(name.clone());
            }
        }
        let groups = names
            .into_iter()
            .enumerate()
            .map(|(i, name)| Group {
                id: i as u32 + 1,
                name,
                device_ids: Vec::new(),
            })
            .collect();
        Self { groups }
    }
}

impl LightGateway for DryRunGateway {
    fn connect(&mut self) -> Result<()> {
        Ok(())
    }

    fn groups(&mut self) -> Result<Vec<Group>> {
        Ok(self.groups.clone())
    }

    fn apply(
        &mut self,
        group: &Group,
        decision: &Decision,
        transition: Duration,
    ) -> Result<ApplyReport> {
        let mut report = ApplyReport::default();
        let mut parts = Vec::new();
        if let Some(power) = decision.power {
            parts.push(format!("power={power}"));
            report.power = Some(true);
        }
        if let Some(temp) = decision.color_temp {
            parts.push(format!("color_temp={}", temp.as_percent()));
            report.color_temp = Some(true);
        }
        if let Some(color) = &decision.color {
            parts.push(format!("color={color}"));
            report.color = Some(true);
        }
        log_indented!(
            "COMMAND {} <- {} (transition {}s)",
            group.name,
            parts.join(" "),
            transition.as_secs()
        );
        Ok(report)
    }

    fn ping(&mut self) -> Result<()> {
        Ok(())
    }

    fn gateway_name(&self) -> &'static str {
        "dry-run"
    }
}
