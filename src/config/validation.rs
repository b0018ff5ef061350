//! Configuration validation.
//!
//! All range and consistency checks live here; loading calls
//! `validate_config` on every parse, including hot reloads.

use anyhow::Result;

use super::{Config, RuleConfig};
use crate::constants::*;

/// Validate a full configuration, failing on the first problem found.
pub fn validate_config(config: &Config) -> Result<()> {
    validate_location(config)?;
    validate_sun_offsets(config)?;
    validate_away(config)?;
    validate_presence(config)?;
    validate_engine(config)?;
    for rule in &config.rules {
        validate_rule(rule)?;
    }
    Ok(())
}

fn validate_location(config: &Config) -> Result<()> {
    // Coordinates come as a pair or not at all.
    match (config.latitude, config.longitude) {
        (Some(lat), Some(lon)) => {
            if !(MIN_LATITUDE..=MAX_LATITUDE).contains(&lat) {
                anyhow::bail!(
                    "latitude must be between {MIN_LATITUDE} and {MAX_LATITUDE}, got {lat}"
                );
            }
            if !(MIN_LONGITUDE..=MAX_LONGITUDE).contains(&lon) {
                anyhow::bail!(
                    "longitude must be between {MIN_LONGITUDE} and {MAX_LONGITUDE}, got {lon}"
                );
            }
            Ok(())
        }
        (None, None) => Ok(()),
        _ => anyhow::bail!("latitude and longitude must be set together"),
    }
}

fn validate_sun_offsets(config: &Config) -> Result<()> {
    for (name, offset) in [
        ("sunrise_offset_minutes", config.sunrise_offset_minutes),
        ("sunset_offset_minutes", config.sunset_offset_minutes),
    ] {
        if let Some(offset) = offset
            && offset.unsigned_abs() >= MINUTES_PER_DAY
        {
            anyhow::bail!("{name} must stay within a day, got {offset}");
        }
    }
    Ok(())
}

fn validate_away(config: &Config) -> Result<()> {
    let away = &config.away;
    if away.fastest_change_minutes == 0 {
        anyhow::bail!("away.fastest_change_minutes must be at least 1");
    }
    if away.slowest_change_minutes >= MINUTES_PER_DAY {
        anyhow::bail!(
            "away.slowest_change_minutes must stay below {MINUTES_PER_DAY}, got {}",
            away.slowest_change_minutes
        );
    }
    if away.fastest_change_minutes > away.slowest_change_minutes {
        anyhow::bail!(
            "away.fastest_change_minutes ({}) must not exceed away.slowest_change_minutes ({})",
            away.fastest_change_minutes,
            away.slowest_change_minutes
        );
    }
    if away.welcome_power > MAX_POWER {
        anyhow::bail!(
            "away.welcome_power must be at most {MAX_POWER}, got {}",
            away.welcome_power
        );
    }
    for group in away.primary_groups.iter().chain(&away.secondary_groups) {
        if group.trim().is_empty() {
            anyhow::bail!("away group names must not be empty");
        }
    }
    Ok(())
}

fn validate_presence(config: &Config) -> Result<()> {
    let presence = &config.presence;
    if presence.away_seconds == 0 {
        anyhow::bail!("presence.away_seconds must be at least 1");
    }
    if presence.rescan_seconds == 0 {
        anyhow::bail!("presence.rescan_seconds must be at least 1");
    }
    for source in &presence.sources {
        if source.trim().is_empty() {
            anyhow::bail!("presence.sources entries must not be empty");
        }
    }
    Ok(())
}

fn validate_engine(config: &Config) -> Result<()> {
    let engine = &config.engine;
    if engine.rule_poll_seconds == 0 {
        anyhow::bail!("engine.rule_poll_seconds must be at least 1");
    }
    if engine.override_poll_seconds == 0 {
        anyhow::bail!("engine.override_poll_seconds must be at least 1");
    }
    if engine.keepalive_seconds == 0 {
        anyhow::bail!("engine.keepalive_seconds must be at least 1");
    }
    if engine.override_dir.trim().is_empty() {
        anyhow::bail!("engine.override_dir must not be empty");
    }
    Ok(())
}

fn validate_rule(rule: &RuleConfig) -> Result<()> {
    if rule.group.trim().is_empty() {
        anyhow::bail!("rule group names must not be empty");
    }
    match (rule.at, rule.sun) {
        (Some(_), Some(_)) => {
            anyhow::bail!(
                "rule for '{}' sets both 'at' and 'sun', use exactly one",
                rule.group
            )
        }
        (None, None) => {
            anyhow::bail!(
                "rule for '{}' needs a trigger, set 'at' or 'sun'",
                rule.group
            )
        }
        _ => {}
    }
    if rule.at.is_some() && rule.offset_minutes != 0 {
        anyhow::bail!(
            "rule for '{}' sets offset_minutes with a fixed 'at' trigger",
            rule.group
        );
    }
    if rule.offset_minutes.unsigned_abs() >= MINUTES_PER_DAY {
        anyhow::bail!(
            "rule for '{}' sets offset_minutes {}, must stay within a day",
            rule.group,
            rule.offset_minutes
        );
    }
    if rule.power.is_none() && rule.color_temp.is_none() && rule.color.is_none() {
        anyhow::bail!(
            "rule for '{}' decides nothing, set power, color_temp or color",
            rule.group
        );
    }
    if let Some(power) = rule.power
        && power > MAX_POWER
    {
        anyhow::bail!(
            "rule for '{}' sets power {power}, maximum is {MAX_POWER}",
            rule.group
        );
    }
    if let Some(temp) = rule.color_temp
        && !matches!(temp, 0 | 63 | 100)
    {
        anyhow::bail!(
            "rule for '{}' sets color_temp {temp}, expected 0, 63 or 100",
            rule.group
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml: &str) -> Config {
        toml::from_str(toml).unwrap()
    }

    #[test]
    fn default_config_is_valid() {
        validate_config(&Config::default()).unwrap();
    }

    #[test]
    fn rejects_lone_latitude() {
        let config = parse("latitude = 59.0");
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn rejects_out_of_range_coordinates() {
        let config = parse("latitude = 95.0\nlongitude = 18.0");
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn rejects_inverted_rotation_interval() {
        let config = parse("[away]\nfastest_change_minutes = 60\nslowest_change_minutes = 30");
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn rejects_rotation_interval_of_a_day_or_more() {
        let config = parse("[away]\nfastest_change_minutes = 10\nslowest_change_minutes = 1440");
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn rejects_sun_offsets_of_a_day_or_more() {
        let config = parse("latitude = 59.0\nlongitude = 18.0\nsunrise_offset_minutes = -1500");
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn rejects_rule_offsets_of_a_day_or_more() {
        let config =
            parse("[[rule]]\ngroup = \"Outdoor\"\nsun = \"sunset\"\noffset_minutes = 2000\npower = 0");
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn rejects_rule_with_both_triggers() {
        let config = parse("[[rule]]\ngroup = \"Hall\"\nat = \"16:00\"\nsun = \"sunset\"\npower = 1");
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn rejects_rule_without_decision() {
        let config = parse("[[rule]]\ngroup = \"Hall\"\nat = \"16:00\"");
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn rejects_offset_on_fixed_trigger() {
        let config =
            parse("[[rule]]\ngroup = \"Hall\"\nat = \"16:00\"\noffset_minutes = 5\npower = 1");
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn rejects_invalid_color_temp() {
        let config = parse("[[rule]]\ngroup = \"Hall\"\nat = \"16:00\"\ncolor_temp = 50");
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn accepts_sun_rule_with_offset() {
        let config =
            parse("[[rule]]\ngroup = \"Outdoor\"\nsun = \"sunrise\"\noffset_minutes = -30\npower = 0");
        validate_config(&config).unwrap();
    }
}
