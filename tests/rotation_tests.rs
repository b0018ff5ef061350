//! Integration tests for the away-mode rotation scheduler.

use chrono::{DateTime, Local, TimeZone};
use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

use luxr::hhmm::HhMm;
use luxr::rotation::RotationScheduler;

fn at(hour: u32, minute: u32) -> DateTime<Local> {
    Local.with_ymd_and_hms(2026, 3, 1, hour, minute, 0).unwrap()
}

fn groups(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

#[test]
fn startup_scenario_first_poll_rotates_and_schedules_ahead() {
    // Fresh state, two primaries, 15/45 bounds: the first poll must rotate
    // and schedule the next change 15-45 minutes out.
    let mut scheduler = RotationScheduler::new(at(10, 0), 15, 45);
    let mut rng = StdRng::seed_from_u64(1);
    let candidates = groups(&["Living room", "Bed room"]);

    assert!(scheduler.should_rotate(at(10, 0)));
    let picked = scheduler
        .rotate(&candidates, at(10, 0), &mut rng)
        .map(str::to_string);
    assert!(picked.is_some());
    assert!(candidates.contains(&picked.unwrap()));

    let next = scheduler.state().next_change;
    assert!(next >= HhMm::new(10, 15));
    assert!(next <= HhMm::new(10, 45));
    assert!(!scheduler.should_rotate(at(10, 14)));
}

#[test]
fn rotation_lags_until_the_next_poll_at_or_after_the_deadline() {
    let mut scheduler = RotationScheduler::new(at(10, 0), 20, 20);
    let mut rng = StdRng::seed_from_u64(2);
    scheduler.rotate(&groups(&["a", "b"]), at(10, 0), &mut rng);

    // Deadline is exactly 10:20. Seconds are ignored, polls within the
    // deadline minute already count as due.
    assert!(!scheduler.should_rotate(at(10, 19)));
    assert!(scheduler.should_rotate(at(10, 20)));
    assert!(scheduler.should_rotate(at(10, 37)));
}

proptest! {
    /// For all fastest <= slowest, the scheduled interval stays in bounds.
    #[test]
    fn interval_always_within_configured_bounds(
        fastest in 1u32..120,
        spread in 0u32..120,
        seed in any::<u64>(),
    ) {
        let slowest = fastest + spread;
        let start = at(8, 0);
        let mut scheduler = RotationScheduler::new(start, fastest, slowest);
        let mut rng = StdRng::seed_from_u64(seed);
        scheduler.rotate(&groups(&["a", "b", "c"]), start, &mut rng);

        let last = scheduler.state().last_change.unwrap();
        prop_assert_eq!(last, HhMm::from(start));
        let lower = last.add_minutes(fastest as i32);
        let upper = last.add_minutes(slowest as i32);
        let next = scheduler.state().next_change;
        // Bounds that wrap past midnight make the HH:MM comparison
        // meaningless, restrict the property to same-day schedules.
        prop_assume!(lower >= HhMm::from(start) && upper >= lower);
        prop_assert!(next >= lower && next <= upper);
    }

    /// With at least two candidates the same group is never picked twice
    /// in a row.
    #[test]
    fn never_reselects_current_with_two_or_more_candidates(seed in any::<u64>()) {
        let mut scheduler = RotationScheduler::new(at(8, 0), 15, 45);
        let mut rng = StdRng::seed_from_u64(seed);
        let candidates = groups(&["a", "b"]);

        let mut previous: Option<String> = None;
        for _ in 0..20 {
            let picked = scheduler
                .rotate(&candidates, at(8, 0), &mut rng)
                .map(str::to_string);
            if let (Some(prev), Some(cur)) = (&previous, &picked) {
                prop_assert_ne!(prev, cur);
            }
            previous = picked;
        }
    }
}
