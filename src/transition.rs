//! Page transition coordinator.
//!
//! Links ask the coordinator to begin a navigation; the overlay owns the timers and
//! drives the remaining phases. Only one navigation runs at a time.

use crate::config::{Millis, PageTiming};
use crate::motion::{Ease, Frame, Length, Pose, Transform, Tween};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub id: u64,
    pub from: String,
    pub to: String,
    pub started_at: Millis,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PagePhase {
    #[default]
    Idle,
    /// Overlay is sliding in over the current page.
    Covering(Navigation),
    /// Page is hidden and the router is swapping routes.
    Navigating(Navigation),
    /// New page is mounted, overlay is sliding out.
    Revealing(Navigation),
    /// Overlay is gone; links stay disabled for a short buffer.
    Cooling(Navigation),
}

impl PagePhase {
    pub fn navigation(&self) -> Option<&Navigation> {
        match self {
            Self::Idle => None,
            Self::Covering(n) | Self::Navigating(n) | Self::Revealing(n) | Self::Cooling(n) => {
                Some(n)
            }
        }
    }
}

/// Paths compare without query, fragment or trailing slash.
pub fn same_path(a: &str, b: &str) -> bool {
    fn path(s: &str) -> &str {
        let s = s.split(['?', '#']).next().unwrap_or_default();
        match s.trim_end_matches('/') {
            "" => "/",
            trimmed => trimmed,
        }
    }
    path(a) == path(b)
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageTransitions {
    phase: PagePhase,
    next_id: u64,
    timing: PageTiming,
}

impl PageTransitions {
    pub fn new(timing: PageTiming) -> Self {
        Self {
            phase: PagePhase::Idle,
            next_id: 1,
            timing,
        }
    }

    pub fn phase(&self) -> &PagePhase {
        &self.phase
    }

    pub fn timing(&self) -> &PageTiming {
        &self.timing
    }

    pub fn is_busy(&self) -> bool {
        self.phase != PagePhase::Idle
    }

    /// The overlay is in front of the page until the new route has mounted.
    pub fn overlay_shown(&self) -> bool {
        matches!(
            self.phase,
            PagePhase::Covering(_) | PagePhase::Navigating(_)
        )
    }

    /// Overlay waits below the page, slides up to cover it and leaves through the top.
    pub fn overlay_frame(&self) -> Frame {
        let at = |percent: f64| Pose {
            transform: Transform::translate_y(Length::Percent(percent)),
            opacity: 1.0,
        };
        match self.phase {
            PagePhase::Idle | PagePhase::Cooling(_) => Frame::instant(at(100.0)),
            PagePhase::Covering(_) | PagePhase::Navigating(_) => Frame::animated(
                at(0.0),
                Tween::new(self.timing.cover_ms, Ease::Power3InOut),
            ),
            PagePhase::Revealing(_) => Frame::animated(
                at(-100.0),
                Tween::new(self.timing.reveal_ms, Ease::Power3InOut),
            ),
        }
    }

    /// Page content fades out while covered.
    pub fn content_frame(&self) -> Frame {
        let opacity = if self.overlay_shown() { 0.0 } else { 1.0 };
        Frame::animated(
            Pose {
                opacity,
                ..Pose::default()
            },
            Tween::new(self.timing.fade_ms, Ease::Power2Out),
        )
    }

    pub fn begin(&mut self, current: &str, href: &str, now: Millis) -> Option<Navigation> {
        if self.is_busy() {
            log::debug!("navigation to {href} dropped: transition running");
            return None;
        }
        if same_path(current, href) {
            return None;
        }
        let navigation = Navigation {
            id: self.next_id,
            from: current.to_string(),
            to: href.to_string(),
            started_at: now,
        };
        self.next_id += 1;
        self.phase = PagePhase::Covering(navigation.clone());
        log::debug!("page transition {current} -> {href}");
        Some(navigation)
    }

    /// The overlay fully covers the page; the caller navigates now.
    pub fn covered(&mut self, id: u64) -> Option<Navigation> {
        match &self.phase {
            PagePhase::Covering(n) if n.id == id => {
                let n = n.clone();
                self.phase = PagePhase::Navigating(n.clone());
                Some(n)
            }
            _ => None,
        }
    }

    /// The router reports the location changed to `path`.
    pub fn arrived(&mut self, path: &str) -> Option<Navigation> {
        match &self.phase {
            PagePhase::Navigating(n) if same_path(&n.to, path) => {
                let n = n.clone();
                self.phase = PagePhase::Revealing(n.clone());
                Some(n)
            }
            _ => None,
        }
    }

    pub fn revealed(&mut self, id: u64) -> bool {
        match &self.phase {
            PagePhase::Revealing(n) if n.id == id => {
                self.phase = PagePhase::Cooling(n.clone());
                true
            }
            _ => false,
        }
    }

    pub fn idle(&mut self, id: u64) -> bool {
        match &self.phase {
            PagePhase::Cooling(n) if n.id == id => {
                self.phase = PagePhase::Idle;
                true
            }
            _ => false,
        }
    }

    fn timed_out(&self, n: &Navigation, now: Millis) -> bool {
        now.saturating_sub(n.started_at) >= self.timing.safety_timeout_ms
    }

    /// The cover never reported completion: navigate anyway.
    /// Returns true when the phase moved on.
    pub fn cover_timed_out(&mut self, id: u64, now: Millis) -> bool {
        match &self.phase {
            PagePhase::Covering(n) if n.id == id && self.timed_out(n, now) => {
                log::warn!("page transition to {} timed out while covering", n.to);
                self.phase = PagePhase::Navigating(n.clone());
                true
            }
            _ => false,
        }
    }

    /// The router never reported the new path: reveal whatever is mounted.
    /// Returns true when the phase moved on.
    pub fn route_timed_out(&mut self, id: u64, now: Millis) -> bool {
        match &self.phase {
            PagePhase::Navigating(n) if n.id == id && self.timed_out(n, now) => {
                log::warn!("page transition to {} timed out while navigating", n.to);
                self.phase = PagePhase::Revealing(n.clone());
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> PageTransitions {
        PageTransitions::new(PageTiming::default())
    }

    #[test]
    fn test_same_path() {
        assert!(same_path("/work", "/work/"));
        assert!(same_path("/", ""));
        assert!(same_path("/about#skills", "/about"));
        assert!(same_path("/work?x=1", "/work"));
        assert!(!same_path("/work", "/about"));
    }

    #[test]
    fn test_full_cycle() {
        let mut pt = service();
        let nav = pt.begin("/", "/work", 0).unwrap();
        assert!(pt.overlay_shown());
        assert_eq!(pt.covered(nav.id), Some(nav.clone()));
        assert!(pt.arrived("/about").is_none());
        assert_eq!(pt.arrived("/work").map(|n| n.id), Some(nav.id));
        assert!(!pt.overlay_shown());
        assert!(pt.is_busy());
        assert!(pt.revealed(nav.id));
        assert!(pt.begin("/work", "/about", 1300).is_none());
        assert!(pt.idle(nav.id));
        assert!(!pt.is_busy());
        assert!(pt.begin("/work", "/about", 1400).is_some());
    }

    #[test]
    fn test_rejects_same_path_and_overlap() {
        let mut pt = service();
        assert!(pt.begin("/work", "/work/", 0).is_none());
        assert!(!pt.is_busy());
        let first = pt.begin("/work", "/", 0).unwrap();
        assert!(pt.begin("/work", "/about", 10).is_none());
        assert_eq!(pt.phase(), &PagePhase::Covering(first));
    }

    #[test]
    fn test_rejected_begin_leaves_state_untouched() {
        let mut pt = service();
        let before = pt.clone();
        assert!(pt.begin("/work", "/work", 0).is_none());
        assert_eq!(pt, before);

        pt.begin("/work", "/", 0).unwrap();
        let before = pt.clone();
        assert!(pt.begin("/", "/about", 5).is_none());
        assert_eq!(pt, before);
    }

    #[test]
    fn test_stale_ids_change_nothing() {
        let mut pt = service();
        let nav = pt.begin("/", "/about", 0).unwrap();
        assert!(pt.covered(nav.id + 1).is_none());
        assert!(!pt.revealed(nav.id));
        assert!(!pt.idle(nav.id));
        assert_eq!(pt.phase(), &PagePhase::Covering(nav));
    }

    #[test]
    fn test_overlay_frames_follow_phase() {
        let mut pt = service();
        let parked = pt.overlay_frame();
        assert!(parked.tween.is_none());
        assert!(parked.to_style().contains("100%"));
        assert_eq!(pt.content_frame().pose.opacity, 1.0);

        let nav = pt.begin("/", "/work", 0).unwrap();
        assert_eq!(pt.overlay_frame().tween.map(|t| t.duration_ms), Some(500));
        assert_eq!(pt.content_frame().pose.opacity, 0.0);
        pt.covered(nav.id);
        pt.arrived("/work");
        assert!(pt.overlay_frame().to_style().contains("-100%"));
        assert_eq!(pt.content_frame().pose.opacity, 1.0);
    }

    #[test]
    fn test_safety_timeout() {
        let mut pt = service();
        let nav = pt.begin("/", "/about", 100).unwrap();
        assert!(!pt.cover_timed_out(nav.id, 900));
        assert!(pt.cover_timed_out(nav.id, 1100));
        assert_eq!(pt.phase(), &PagePhase::Navigating(nav.clone()));
        // a late cover callback is ignored
        assert!(pt.covered(nav.id).is_none());
        assert!(!pt.cover_timed_out(nav.id, 1200));
        assert!(pt.route_timed_out(nav.id, 2100));
        assert_eq!(pt.phase(), &PagePhase::Revealing(nav));
    }

    #[test]
    fn test_slow_route_reveals_after_cover_timer_fires() {
        let mut pt = service();
        let nav = pt.begin("/", "/work", 0).unwrap();
        assert!(pt.covered(nav.id).is_some());
        // the cover timer leaves a navigation in progress alone
        assert!(!pt.cover_timed_out(nav.id, 1000));
        assert_eq!(pt.phase(), &PagePhase::Navigating(nav.clone()));
        // the navigating timer, scheduled when the cover completed, forces the reveal
        assert!(pt.route_timed_out(nav.id, 1500));
        assert_eq!(pt.phase(), &PagePhase::Revealing(nav.clone()));
        assert!(!pt.route_timed_out(nav.id, 1600));
        assert!(pt.revealed(nav.id));
        assert!(pt.idle(nav.id));
        assert!(!pt.is_busy());
    }
}
