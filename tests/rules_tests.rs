//! Integration tests for rule table evaluation.

use luxr::hhmm::HhMm;
use luxr::rules::{ColorTemp, Decision, Schedule};
use luxr::sun::SunInfo;

fn sun(sunrise: HhMm, sunset: HhMm) -> SunInfo {
    SunInfo { sunrise, sunset }
}

#[test]
fn outdoor_sunset_scenario() {
    // Sunset at 19:32: the outdoor rule fires exactly at that minute and
    // never again.
    let schedule = Schedule::builtin();
    let sun = sun(HhMm::new(6, 0), HhMm::new(19, 32));

    assert_eq!(
        schedule.evaluate("Outdoor", HhMm::new(19, 32), &sun),
        Some(Decision::power(95))
    );
    assert_eq!(schedule.evaluate("Outdoor", HhMm::new(19, 33), &sun), None);
    assert_eq!(schedule.evaluate("Outdoor", HhMm::new(19, 31), &sun), None);
}

#[test]
fn evaluation_is_idempotent() {
    let schedule = Schedule::builtin();
    let sun = sun(HhMm::new(6, 10), HhMm::new(18, 40));
    for group in ["Living room", "Bed room", "Hall", "Outdoor"] {
        for minute in [HhMm::new(19, 0), HhMm::new(23, 15), HhMm::new(6, 10)] {
            let first = schedule.evaluate(group, minute, &sun);
            let second = schedule.evaluate(group, minute, &sun);
            assert_eq!(first, second, "{group} at {minute}");
        }
    }
}

#[test]
fn builtin_table_reproduces_the_daily_pattern() {
    let schedule = Schedule::builtin();
    let sun = sun(HhMm::new(7, 45), HhMm::new(16, 20));

    // Evening wind-down: living room dims warm at 19:00.
    let decision = schedule
        .evaluate("Living room", HhMm::new(19, 0), &sun)
        .unwrap();
    assert_eq!(decision.power, Some(50));
    assert_eq!(decision.color_temp, Some(ColorTemp::Warm));

    // Night off at 23:15, late repeat at 00:30, morning catch at 09:00.
    for minute in [HhMm::new(23, 15), HhMm::new(0, 30), HhMm::new(9, 0)] {
        for group in ["Bed room", "Living room"] {
            assert_eq!(
                schedule.evaluate(group, minute, &sun),
                Some(Decision::power(0)),
                "{group} at {minute}"
            );
        }
    }

    // Hall night light around the edges of the day.
    assert_eq!(
        schedule.evaluate("Hall", HhMm::new(16, 0), &sun),
        Some(Decision::power(1))
    );
    assert_eq!(
        schedule.evaluate("Hall", HhMm::new(23, 15), &sun),
        Some(Decision::power(1))
    );
    assert_eq!(
        schedule.evaluate("Hall", HhMm::new(8, 0), &sun),
        Some(Decision::power(0))
    );

    // Outdoor follows the sun.
    assert_eq!(
        schedule.evaluate("Outdoor", HhMm::new(16, 20), &sun),
        Some(Decision::power(95))
    );
    assert_eq!(
        schedule.evaluate("Outdoor", HhMm::new(7, 45), &sun),
        Some(Decision::power(0))
    );
}

#[test]
fn groups_are_evaluated_independently() {
    // 23:15 triggers three groups; each gets its own decision.
    let schedule = Schedule::builtin();
    let sun = sun(HhMm::new(6, 0), HhMm::new(18, 0));
    let minute = HhMm::new(23, 15);

    assert_eq!(
        schedule.evaluate("Hall", minute, &sun),
        Some(Decision::power(1))
    );
    assert_eq!(
        schedule.evaluate("Bed room", minute, &sun),
        Some(Decision::power(0))
    );
    assert_eq!(schedule.evaluate("Outdoor", minute, &sun), None);
}
