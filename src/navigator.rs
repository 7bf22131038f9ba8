//! One-at-a-time slide navigation for the project gallery.
//!
//! The navigator owns the current index and the animation lock. Time is passed in
//! by the caller, which also owns the timers: it calls [`SlideNavigator::swap`],
//! [`SlideNavigator::finish`] and [`SlideNavigator::settle`] when the corresponding
//! animation step fires. Input that arrives while a transition is in flight is
//! dropped, never queued.

use crate::config::{Millis, SlideTiming};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    /// Positive wheel delta scrolls forward.
    pub fn from_wheel(delta_y: f64) -> Option<Self> {
        if delta_y > 0.0 {
            Some(Self::Forward)
        } else if delta_y < 0.0 {
            Some(Self::Backward)
        } else {
            None
        }
    }

    /// Vertical travel of the outgoing slide: forward moves it up.
    pub fn exit_sign(self) -> f64 {
        match self {
            Self::Forward => -1.0,
            Self::Backward => 1.0,
        }
    }

    fn step(self, index: usize, len: usize) -> usize {
        match self {
            Self::Forward => (index + 1) % len,
            Self::Backward => (index + len - 1) % len,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub id: u64,
    pub from: usize,
    pub to: usize,
    pub direction: Direction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// First mount: the opening reveal runs and input is inert.
    Initializing,
    Idle,
    /// Outgoing slide is leaving, index not yet swapped.
    Exiting(Transition),
    /// Index swapped, incoming slide and its text are animating in.
    Entering(Transition),
    /// Entrance done, waiting out the buffer before input is re-enabled.
    Settling(Transition),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlidePosition {
    Active,
    Outgoing,
    Incoming,
    OffScreen,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    Empty,
    Animating,
    InputLocked,
    Cooldown { remaining: Millis },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SlideNavigator {
    len: usize,
    current: usize,
    phase: Phase,
    mounted_at: Millis,
    last_transition_at: Option<Millis>,
    next_id: u64,
    timing: SlideTiming,
}

impl SlideNavigator {
    pub fn mount(len: usize, timing: SlideTiming, now: Millis) -> Self {
        Self {
            len,
            current: 0,
            phase: Phase::Initializing,
            mounted_at: now,
            last_transition_at: None,
            next_id: 1,
            timing,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn timing(&self) -> &SlideTiming {
        &self.timing
    }

    pub fn is_animating(&self) -> bool {
        matches!(self.phase, Phase::Exiting(_) | Phase::Entering(_))
    }

    pub fn scroll_allowed(&self) -> bool {
        matches!(self.phase, Phase::Idle)
    }

    /// When the opening hold ends, for scheduling [`Self::release_input`].
    pub fn ready_at(&self) -> Millis {
        self.mounted_at + self.timing.initial_hold_ms
    }

    /// Ends the opening hold. Has no effect before the hold has elapsed or after
    /// it has already been released.
    pub fn release_input(&mut self, now: Millis) -> bool {
        if self.phase != Phase::Initializing || now < self.ready_at() {
            return false;
        }
        self.phase = Phase::Idle;
        if self.timing.hold_starts_cooldown {
            self.last_transition_at = Some(now);
        }
        true
    }

    pub fn can_transition(&self, now: Millis) -> Result<(), Rejection> {
        if self.len == 0 {
            return Err(Rejection::Empty);
        }
        if self.is_animating() {
            return Err(Rejection::Animating);
        }
        if !self.scroll_allowed() {
            return Err(Rejection::InputLocked);
        }
        if let Some(last) = self.last_transition_at {
            let elapsed = now.saturating_sub(last);
            if elapsed < self.timing.cooldown_ms {
                return Err(Rejection::Cooldown {
                    remaining: self.timing.cooldown_ms - elapsed,
                });
            }
        }
        Ok(())
    }

    pub fn request_transition(&mut self, direction: Direction, now: Millis) -> Option<Transition> {
        if let Err(reason) = self.can_transition(now) {
            log::debug!("slide input dropped: {reason:?}");
            return None;
        }
        let transition = Transition {
            id: self.next_id,
            from: self.current,
            to: direction.step(self.current, self.len),
            direction,
        };
        self.next_id += 1;
        self.last_transition_at = Some(now);
        self.phase = Phase::Exiting(transition);
        log::debug!(
            "slide transition {} -> {} ({direction:?})",
            transition.from,
            transition.to
        );
        Some(transition)
    }

    /// Swap phase: the incoming slide becomes current.
    pub fn swap(&mut self, id: u64) -> bool {
        match self.phase {
            Phase::Exiting(t) if t.id == id => {
                self.current = t.to;
                self.phase = Phase::Entering(t);
                true
            }
            _ => false,
        }
    }

    /// The entrance timeline completed.
    pub fn finish(&mut self, id: u64) -> bool {
        match self.phase {
            Phase::Entering(t) if t.id == id => {
                self.phase = Phase::Settling(t);
                true
            }
            _ => false,
        }
    }

    /// The settle buffer elapsed: input is accepted again and the cooldown restarts.
    pub fn settle(&mut self, id: u64, now: Millis) -> bool {
        match self.phase {
            Phase::Settling(t) if t.id == id => {
                self.phase = Phase::Idle;
                self.last_transition_at = Some(now);
                true
            }
            _ => false,
        }
    }

    pub fn position_of(&self, index: usize) -> SlidePosition {
        match self.phase {
            Phase::Exiting(t) if index == t.from => SlidePosition::Outgoing,
            Phase::Exiting(_) => SlidePosition::OffScreen,
            Phase::Entering(t) if index == t.to => SlidePosition::Incoming,
            Phase::Entering(t) if index == t.from => SlidePosition::Outgoing,
            Phase::Entering(_) => SlidePosition::OffScreen,
            _ if index == self.current => SlidePosition::Active,
            _ => SlidePosition::OffScreen,
        }
    }
}

/// Turns a vertical touch drag into a direction.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SwipeTracker {
    start_y: Option<f64>,
}

impl SwipeTracker {
    pub fn begin(&mut self, y: f64) {
        self.start_y = Some(y);
    }

    /// Dragging the finger up moves forward.
    pub fn end(&mut self, y: f64, threshold: f64) -> Option<Direction> {
        let start = self.start_y.take()?;
        let travel = start - y;
        if travel.abs() < threshold {
            return None;
        }
        if travel > 0.0 {
            Some(Direction::Forward)
        } else {
            Some(Direction::Backward)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ready(len: usize) -> SlideNavigator {
        let mut nav = SlideNavigator::mount(len, SlideTiming::default(), 0);
        assert!(nav.release_input(1500));
        nav
    }

    fn run(nav: &mut SlideNavigator, t: Transition, settle_at: Millis) {
        assert!(nav.swap(t.id));
        assert!(nav.finish(t.id));
        assert!(nav.settle(t.id, settle_at));
    }

    #[test]
    fn test_initial_hold() {
        let mut nav = SlideNavigator::mount(6, SlideTiming::default(), 0);
        assert_eq!(nav.phase(), Phase::Initializing);
        assert!(!nav.scroll_allowed());
        for now in [0, 10, 500, 1499] {
            assert!(nav.request_transition(Direction::Forward, now).is_none());
        }
        assert!(!nav.release_input(1000));
        assert!(nav.release_input(1500));
        assert!(!nav.release_input(1600));
        assert!(nav.request_transition(Direction::Forward, 1500).is_some());
    }

    #[test]
    fn test_hold_can_start_cooldown() {
        let timing = SlideTiming {
            hold_starts_cooldown: true,
            ..SlideTiming::default()
        };
        let mut nav = SlideNavigator::mount(4, timing, 0);
        assert!(nav.release_input(1500));
        assert_eq!(
            nav.can_transition(1500),
            Err(Rejection::Cooldown { remaining: 1000 })
        );
        assert!(nav.request_transition(Direction::Forward, 2499).is_none());
        assert!(nav.request_transition(Direction::Forward, 2500).is_some());
    }

    #[test]
    fn test_rapid_fire_only_first_accepted() {
        let mut nav = ready(6);
        let first = nav.request_transition(Direction::Forward, 2000);
        assert!(first.is_some());
        for _ in 0..4 {
            assert!(nav.request_transition(Direction::Forward, 2000).is_none());
        }
        let t = first.unwrap();
        assert_eq!((t.from, t.to), (0, 1));
        assert_eq!(nav.can_transition(2000), Err(Rejection::Animating));
        assert!(nav.swap(t.id));
        assert_eq!(nav.current_index(), 1);
        assert!(nav.request_transition(Direction::Forward, 2600).is_none());
        assert_eq!(nav.current_index(), 1);
    }

    #[test]
    fn test_rejected_input_leaves_state_untouched() {
        let mut nav = SlideNavigator::mount(3, SlideTiming::default(), 0);
        let before = nav.clone();
        assert!(nav.request_transition(Direction::Forward, 100).is_none());
        assert_eq!(nav, before);

        assert!(nav.release_input(1500));
        let t = nav.request_transition(Direction::Forward, 1600).unwrap();
        let before = nav.clone();
        assert!(nav.request_transition(Direction::Backward, 1700).is_none());
        assert!(!nav.swap(t.id + 1));
        assert!(!nav.finish(t.id));
        assert_eq!(nav, before);
    }

    #[test]
    fn test_wraps_in_both_directions() {
        let mut nav = ready(6);
        let t = nav.request_transition(Direction::Backward, 3000).unwrap();
        assert_eq!(t.to, 5);
        run(&mut nav, t, 5000);
        assert_eq!(nav.current_index(), 5);

        let t = nav.request_transition(Direction::Forward, 6000).unwrap();
        assert_eq!(t.to, 0);
        run(&mut nav, t, 8000);
        assert_eq!(nav.current_index(), 0);
    }

    #[test]
    fn test_step_is_modular_for_every_index() {
        for len in 1..8 {
            for i in 0..len {
                assert_eq!(Direction::Forward.step(i, len), (i + 1) % len);
                assert_eq!(Direction::Backward.step(i, len), (i + len - 1) % len);
            }
        }
    }

    #[test]
    fn test_cooldown_restarts_after_settle() {
        let mut nav = ready(3);
        let t = nav.request_transition(Direction::Forward, 2000).unwrap();
        run(&mut nav, t, 4100);
        assert!(!nav.is_animating());
        assert_eq!(
            nav.can_transition(4500),
            Err(Rejection::Cooldown { remaining: 600 })
        );
        assert!(nav.request_transition(Direction::Forward, 5000).is_none());
        assert!(nav.request_transition(Direction::Forward, 5100).is_some());
    }

    #[test]
    fn test_not_accepting_while_settling() {
        let mut nav = ready(3);
        let t = nav.request_transition(Direction::Forward, 2000).unwrap();
        nav.swap(t.id);
        nav.finish(t.id);
        assert!(!nav.is_animating());
        assert!(!nav.scroll_allowed());
        assert_eq!(nav.can_transition(9000), Err(Rejection::InputLocked));
    }

    #[test]
    fn test_stale_callbacks_are_ignored() {
        let mut nav = ready(4);
        let t = nav.request_transition(Direction::Forward, 2000).unwrap();
        assert!(!nav.finish(t.id));
        assert!(!nav.swap(t.id + 7));
        assert_eq!(nav.current_index(), 0);
        run(&mut nav, t, 4000);
        assert!(!nav.swap(t.id));
        assert!(!nav.settle(t.id, 9000));
        assert_eq!(nav.phase(), Phase::Idle);
        assert_eq!(nav.current_index(), 1);
    }

    #[test]
    fn test_exactly_one_active_after_transition() {
        let mut nav = ready(6);
        let t = nav.request_transition(Direction::Forward, 2000).unwrap();
        assert_eq!(nav.position_of(0), SlidePosition::Outgoing);
        nav.swap(t.id);
        assert_eq!(nav.position_of(1), SlidePosition::Incoming);
        assert_eq!(nav.position_of(0), SlidePosition::Outgoing);
        nav.finish(t.id);
        nav.settle(t.id, 4000);
        let active = (0..6)
            .filter(|&i| nav.position_of(i) == SlidePosition::Active)
            .count();
        assert_eq!(active, 1);
        assert!((0..6)
            .filter(|&i| i != 1)
            .all(|i| nav.position_of(i) == SlidePosition::OffScreen));
    }

    #[test]
    fn test_empty_collection_never_transitions() {
        let mut nav = ready(0);
        assert!(nav.is_empty());
        assert_eq!(nav.can_transition(5000), Err(Rejection::Empty));
        assert!(nav.request_transition(Direction::Forward, 5000).is_none());
    }

    #[test]
    fn test_wheel_and_swipe_directions() {
        assert_eq!(Direction::from_wheel(12.0), Some(Direction::Forward));
        assert_eq!(Direction::from_wheel(-0.5), Some(Direction::Backward));
        assert_eq!(Direction::from_wheel(0.0), None);

        let mut swipe = SwipeTracker::default();
        assert_eq!(swipe.end(100.0, 50.0), None);
        swipe.begin(400.0);
        assert_eq!(swipe.end(300.0, 50.0), Some(Direction::Forward));
        swipe.begin(300.0);
        assert_eq!(swipe.end(330.0, 50.0), None);
        swipe.begin(100.0);
        assert_eq!(swipe.end(220.0, 50.0), Some(Direction::Backward));
    }
}
