//! Rotating "somebody looks home" group selection for away mode.
//!
//! While the house is empty, one primary group at a time is kept lit and the
//! lit group changes at a randomized interval. The scheduler is lazy: nothing
//! fires on its own, the engine's rule tick asks `should_rotate` and calls
//! `rotate` when it answers yes.
//!
//! Due-ness is a wall-clock `HH:MM` comparison with no date attached. A next
//! change scheduled across midnight therefore compares as already past and
//! fires on the first poll after scheduling; the selection just changes
//! earlier than drawn, which is harmless for a randomized schedule.

use chrono::{DateTime, Local};
use rand::Rng;

use crate::hhmm::HhMm;

/// The active selection and when it last changed and should next change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationState {
    pub selected: Option<String>,
    pub last_change: Option<HhMm>,
    pub next_change: HhMm,
}

pub struct RotationScheduler {
    state: RotationState,
    fastest_minutes: u32,
    slowest_minutes: u32,
}

impl RotationScheduler {
    /// A fresh scheduler is immediately due, so the first away poll selects
    /// a group right away.
    pub fn new(now: DateTime<Local>, fastest_minutes: u32, slowest_minutes: u32) -> Self {
        Self {
            state: RotationState {
                selected: None,
                last_change: None,
                next_change: HhMm::from(now),
            },
            fastest_minutes,
            slowest_minutes,
        }
    }

    pub fn selected(&self) -> Option<&str> {
        self.state.selected.as_deref()
    }

    pub fn state(&self) -> &RotationState {
        &self.state
    }

    /// Whether the next change time has been reached (minute resolution).
    pub fn should_rotate(&self, now: DateTime<Local>) -> bool {
        HhMm::from(now) >= self.state.next_change
    }

    /// Pick the next lit group and draw the next change time.
    ///
    /// The current group is excluded from the draw whenever another candidate
    /// exists, so consecutive selections always differ. With no candidates
    /// the selection is left alone but the next change is still drawn, which
    /// keeps the poll from re-rotating every tick.
    pub fn rotate(
        &mut self,
        candidates: &[String],
        now: DateTime<Local>,
        rng: &mut impl Rng,
    ) -> Option<&str> {
        let pool: Vec<&String> = candidates
            .iter()
            .filter(|name| Some(name.as_str()) != self.selected())
            .collect();
        let pool = if pool.is_empty() {
            candidates.iter().collect()
        } else {
            pool
        };

        if !pool.is_empty() {
            let pick = pool[rng.gen_range(0..pool.len())].clone();
            self.state.selected = Some(pick);
        }

        let minutes = rng.gen_range(self.fastest_minutes..=self.slowest_minutes);
        self.state.last_change = Some(HhMm::from(now));
        self.state.next_change = HhMm::from(now).add_minutes(minutes as i32);
        self.state.selected.as_deref()
    }

    /// Drop the selection, used when arriving home ends away mode.
    pub fn clear(&mut self, now: DateTime<Local>) {
        self.state.selected = None;
        self.state.last_change = None;
        self.state.next_change = HhMm::from(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn at(hour: u32, minute: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 3, 1, hour, minute, 0).unwrap()
    }

    fn groups(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn fresh_scheduler_rotates_on_first_poll() {
        let scheduler = RotationScheduler::new(at(12, 0), 15, 45);
        assert!(scheduler.should_rotate(at(12, 0)));
    }

    #[test]
    fn not_due_until_next_change() {
        let mut scheduler = RotationScheduler::new(at(12, 0), 15, 45);
        let mut rng = StdRng::seed_from_u64(7);
        scheduler.rotate(&groups(&["a", "b"]), at(12, 0), &mut rng);
        assert!(!scheduler.should_rotate(at(12, 1)));
        assert!(scheduler.should_rotate(at(12, 45)));
    }

    #[test]
    fn consecutive_selections_always_differ() {
        let mut scheduler = RotationScheduler::new(at(12, 0), 15, 45);
        let mut rng = StdRng::seed_from_u64(42);
        let candidates = groups(&["a", "b", "c"]);
        let mut previous: Option<String> = None;
        for _ in 0..50 {
            let picked = scheduler
                .rotate(&candidates, at(12, 0), &mut rng)
                .map(str::to_string);
            assert!(picked.is_some());
            if previous.is_some() {
                assert_ne!(picked, previous);
            }
            previous = picked;
        }
    }

    #[test]
    fn single_candidate_is_reselected() {
        let mut scheduler = RotationScheduler::new(at(12, 0), 15, 45);
        let mut rng = StdRng::seed_from_u64(1);
        let only = groups(&["solo"]);
        assert_eq!(scheduler.rotate(&only, at(12, 0), &mut rng), Some("solo"));
        assert_eq!(scheduler.rotate(&only, at(12, 30), &mut rng), Some("solo"));
    }

    #[test]
    fn empty_candidates_keep_selection_but_reschedule() {
        let mut scheduler = RotationScheduler::new(at(12, 0), 15, 45);
        let mut rng = StdRng::seed_from_u64(3);
        scheduler.rotate(&groups(&["a"]), at(12, 0), &mut rng);
        scheduler.rotate(&[], at(13, 0), &mut rng);
        assert_eq!(scheduler.selected(), Some("a"));
        assert!(!scheduler.should_rotate(at(13, 1)));
    }

    #[test]
    fn interval_stays_within_bounds() {
        let mut rng = StdRng::seed_from_u64(9);
        for seed in 0..100u64 {
            let mut scheduler = RotationScheduler::new(at(10, 0), 15, 45);
            let mut rng2 = StdRng::seed_from_u64(seed);
            scheduler.rotate(&groups(&["a", "b"]), at(10, 0), &mut rng2);
            let next = scheduler.state().next_change;
            assert!(next >= HhMm::new(10, 15) && next <= HhMm::new(10, 45));
        }
        // Bounds can coincide.
        let mut scheduler = RotationScheduler::new(at(10, 0), 20, 20);
        scheduler.rotate(&groups(&["a"]), at(10, 0), &mut rng);
        assert_eq!(scheduler.state().next_change, HhMm::new(10, 20));
    }

    #[test]
    fn clear_makes_the_scheduler_due_again() {
        let mut scheduler = RotationScheduler::new(at(12, 0), 15, 45);
        let mut rng = StdRng::seed_from_u64(5);
        scheduler.rotate(&groups(&["a", "b"]), at(12, 0), &mut rng);
        scheduler.clear(at(12, 5));
        assert_eq!(scheduler.selected(), None);
        assert!(scheduler.should_rotate(at(12, 5)));
    }
}
