//! The scheduled rule table: pure per-group, per-minute lighting decisions.
//!
//! A `Schedule` is an ordered series of exclusive conditions. Evaluating it
//! for a group at a given minute walks the rules top to bottom and returns
//! the decision of the first rule whose group and trigger both match, or
//! nothing when no trigger fires. Triggers match exactly one wall-clock
//! minute, either a fixed `HH:MM` or a sun-relative offset resolved against
//! the cached sun times, so the poller never repeats a decision: the next
//! minute simply stops matching.
//!
//! Evaluation is a pure function of `(group name, minute, sun times)`.

use rand::Rng;
use serde::Deserialize;

use crate::hhmm::HhMm;
use crate::sun::SunInfo;

/// A sparse set of target light attributes.
///
/// Absent fields mean "leave unchanged"; a decision with every field absent
/// is a no-op and is never handed to the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Decision {
    /// Combined on/off and dimmer: 0 is off, 1-100 is brightness percent.
    pub power: Option<u8>,
    pub color_temp: Option<ColorTemp>,
    /// Opaque hue value passed through to the gateway.
    pub color: Option<String>,
}

impl Decision {
    /// Decision that only sets a power level.
    pub fn power(power: u8) -> Self {
        Self {
            power: Some(power),
            ..Self::default()
        }
    }

    /// True when no field is set; such decisions must not be emitted.
    pub fn is_noop(&self) -> bool {
        self.power.is_none() && self.color_temp.is_none() && self.color.is_none()
    }
}

/// The three color temperature stops the gateway understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorTemp {
    Cold,
    Neutral,
    Warm,
}

impl ColorTemp {
    /// Gateway wire value (percent warmth).
    pub fn as_percent(self) -> u8 {
        match self {
            ColorTemp::Cold => 0,
            ColorTemp::Neutral => 63,
            ColorTemp::Warm => 100,
        }
    }
}

impl TryFrom<u8> for ColorTemp {
    type Error = anyhow::Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ColorTemp::Cold),
            63 => Ok(ColorTemp::Neutral),
            100 => Ok(ColorTemp::Warm),
            other => anyhow::bail!("Invalid color_temp {other}, expected 0, 63 or 100"),
        }
    }
}

/// The sun events a rule can anchor to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SunEvent {
    Sunrise,
    Sunset,
}

/// When a rule fires: a fixed minute, or a sun event plus a minute offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    At(HhMm),
    Sun { event: SunEvent, offset_minutes: i32 },
}

impl Trigger {
    /// Resolve the trigger to a concrete minute for today's sun times.
    pub fn resolve(&self, sun: &SunInfo) -> HhMm {
        match *self {
            Trigger::At(time) => time,
            Trigger::Sun {
                event: SunEvent::Sunrise,
                offset_minutes,
            } => sun.sunrise.add_minutes(offset_minutes),
            Trigger::Sun {
                event: SunEvent::Sunset,
                offset_minutes,
            } => sun.sunset.add_minutes(offset_minutes),
        }
    }

    fn matches(&self, now: HhMm, sun: &SunInfo) -> bool {
        self.resolve(sun) == now
    }
}

/// One entry of the rule table.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub group: String,
    pub trigger: Trigger,
    pub decision: Decision,
}

/// Ordered rule table, evaluated first-match-wins per group.
#[derive(Debug, Clone, Default)]
pub struct Schedule {
    rules: Vec<Rule>,
}

impl Schedule {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Evaluate the table for one group at one minute.
    ///
    /// Returns the first matching rule's decision. Groups are independent:
    /// two groups sharing a trigger minute each get their own evaluation.
    pub fn evaluate(&self, group_name: &str, now: HhMm, sun: &SunInfo) -> Option<Decision> {
        self.rules
            .iter()
            .find(|rule| rule.group == group_name && rule.trigger.matches(now, sun))
            .map(|rule| rule.decision.clone())
    }

    /// The built-in table used when the configuration declares no rules.
    ///
    /// Evening wind-down in the living room, nightly off for the bedroom and
    /// living room (with a late repeat for lights turned back on manually and
    /// a morning catch for lights left on), a low hall light around the edges
    /// of the day, and outdoor lighting tracking the sun.
    pub fn builtin() -> Self {
        let rule = |group: &str, trigger: Trigger, decision: Decision| Rule {
            group: group.to_string(),
            trigger,
            decision,
        };
        let soft_evening = Decision {
            power: Some(50),
            color_temp: Some(ColorTemp::Warm),
            color: None,
        };

        let mut rules = vec![rule(
            "Living room",
            Trigger::At(HhMm::new(19, 0)),
            soft_evening,
        )];
        for group in ["Bed room", "Living room"] {
            for time in [HhMm::new(23, 15), HhMm::new(0, 30), HhMm::new(9, 0)] {
                rules.push(rule(group, Trigger::At(time), Decision::power(0)));
            }
        }
        for time in [HhMm::new(16, 0), HhMm::new(23, 15)] {
            rules.push(rule("Hall", Trigger::At(time), Decision::power(1)));
        }
        rules.push(rule("Hall", Trigger::At(HhMm::new(8, 0)), Decision::power(0)));
        rules.push(rule(
            "Outdoor",
            Trigger::Sun {
                event: SunEvent::Sunset,
                offset_minutes: 0,
            },
            Decision::power(95),
        ));
        rules.push(rule(
            "Outdoor",
            Trigger::Sun {
                event: SunEvent::Sunrise,
                offset_minutes: 0,
            },
            Decision::power(0),
        ));

        Self::new(rules)
    }

    /// Group names referenced by the table, in first-appearance order.
    pub fn group_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for rule in &self.rules {
            if !names.contains(&rule.group) {
                names.push(rule.group.clone());
            }
        }
        names
    }
}

/// Dim level for the lit-while-away group: 30-60 percent, drawn fresh on
/// every rotation so the house never settles into a pattern.
pub fn away_power(rng: &mut impl Rng) -> u8 {
    30 + (rng.r#gen::<f64>() * 30.0).round() as u8
}
