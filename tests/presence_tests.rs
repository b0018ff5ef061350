//! Integration tests for occupancy tracking.

use chrono::{DateTime, Duration as ChronoDuration, Local, TimeZone};
use std::time::Duration;

use luxr::presence::{PresenceTracker, PresenceTransition};

fn t0() -> DateTime<Local> {
    Local.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
}

fn tracker(sources: &[&str], away_seconds: u64, warmup_seconds: u64) -> PresenceTracker {
    PresenceTracker::new(
        sources.iter().map(|s| s.to_string()).collect(),
        Duration::from_secs(away_seconds),
        Duration::from_secs(warmup_seconds),
        t0(),
    )
}

#[test]
fn away_boundary_scenario() {
    // away_seconds = 360: still home at T+359, away at T+361.
    let mut tracker = tracker(&["phone"], 360, 0);
    tracker.record_alive("phone", t0());

    assert!(tracker.is_home(t0() + ChronoDuration::seconds(359)));
    assert!(tracker.is_home(t0() + ChronoDuration::seconds(360)));
    assert!(!tracker.is_home(t0() + ChronoDuration::seconds(361)));
}

#[test]
fn a_full_leave_and_return_cycle_emits_two_transitions() {
    let mut tracker = tracker(&["phone", "tablet"], 360, 0);
    tracker.record_alive("phone", t0());

    // Baseline only.
    assert_eq!(tracker.check_transition(t0()), None);

    // Still home while the sighting is fresh: no events.
    for secs in [60, 180, 300] {
        assert_eq!(
            tracker.check_transition(t0() + ChronoDuration::seconds(secs)),
            None
        );
    }

    // Sighting lapses: exactly one departure.
    assert_eq!(
        tracker.check_transition(t0() + ChronoDuration::seconds(400)),
        Some(PresenceTransition::Departed)
    );
    assert_eq!(
        tracker.check_transition(t0() + ChronoDuration::seconds(430)),
        None
    );

    // Any source returning flips back once.
    let back = t0() + ChronoDuration::seconds(900);
    tracker.record_alive("tablet", back);
    assert_eq!(
        tracker.check_transition(back),
        Some(PresenceTransition::Arrived)
    );
    assert_eq!(
        tracker.check_transition(back + ChronoDuration::seconds(30)),
        None
    );
}

#[test]
fn warmup_never_reports_a_departure_for_a_fresh_start() {
    // No sightings at all yet; a 120s warm-up must keep the first minutes
    // quiet even though is_home already reads false.
    let mut tracker = tracker(&["phone"], 60, 120);

    assert_eq!(tracker.check_transition(t0()), None);
    assert_eq!(
        tracker.check_transition(t0() + ChronoDuration::seconds(90)),
        None
    );

    // After warm-up the tracker behaves normally again.
    let seen = t0() + ChronoDuration::seconds(150);
    tracker.record_alive("phone", seen);
    assert_eq!(
        tracker.check_transition(seen),
        Some(PresenceTransition::Arrived)
    );
}

#[test]
fn rescan_hysteresis_uses_half_the_away_interval() {
    let mut tracker = tracker(&["phone", "tablet"], 360, 0);
    tracker.record_alive("phone", t0());

    // tablet was never seen, it is always due. phone is skipped until
    // 180s (half of 360) have passed.
    assert_eq!(
        tracker.stale_sources(t0() + ChronoDuration::seconds(60)),
        vec!["tablet".to_string()]
    );
    assert_eq!(
        tracker.stale_sources(t0() + ChronoDuration::seconds(200)),
        vec!["phone".to_string(), "tablet".to_string()]
    );
}
