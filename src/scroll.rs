//! Scroll-linked choreography for the home page sections.
//!
//! Sections report where their top edge sits in the viewport. This module turns
//! that into scrubbed progress or a reveal decision, and progress into poses.

use crate::config::Millis;
use crate::motion::{Ease, Frame, Length, Pose, Transform, Tween};
use crate::pointer::Rect;

/// At or below this width the home sections skip pinning and scrubbed motion.
pub const MOBILE_BREAKPOINT_PX: f64 = 768.0;

pub const INTRO_PIN_VIEWPORTS: f64 = 1.0;
pub const OUTRO_PIN_VIEWPORTS: f64 = 3.0;

pub const HERO_TITLE_FADE: ViewportRange = ViewportRange::new(0.9, 0.3);
pub const SCROLL_HINT_FADE: ViewportRange = ViewportRange::new(0.85, 0.65);
/// Outro strips drift from the section entering at the bottom through six viewports.
pub const STRIP_RANGE: ViewportRange = ViewportRange::new(1.0, -5.0);
pub const STRIP_SPEEDS: [f64; 6] = [0.3, 0.4, 0.25, 0.35, 0.2, 0.25];

pub const SERVICES_TRIGGER: f64 = 0.8;
pub const SERVICES_LIST_TRIGGER: f64 = 0.85;
pub const SKILLS_TITLE_TRIGGER: f64 = 0.8;
pub const SKILLS_GRID_TRIGGER: f64 = 0.75;

const GRID_STAGGER_MS: Millis = 600;
const GRID_ITEM_MS: Millis = 800;

/// Scrubbed motion needs a known viewport wider than a phone.
pub fn scrubbed(viewport_width: f64) -> bool {
    viewport_width.is_finite() && viewport_width > MOBILE_BREAKPOINT_PX
}

/// A section pinned while the page scrolls `distance` pixels past its top.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinnedRange {
    pub distance: f64,
}

impl PinnedRange {
    pub fn viewports(viewport_height: f64, count: f64) -> Self {
        Self {
            distance: viewport_height * count,
        }
    }

    pub fn progress(&self, top: f64) -> f64 {
        if !self.distance.is_finite() || self.distance <= 0.0 {
            return 0.0;
        }
        (-top / self.distance).clamp(0.0, 1.0)
    }
}

/// Progress while an element's top edge travels between two viewport lines, given
/// as fractions of the viewport height from its top edge (`1.0` is the bottom).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportRange {
    pub start: f64,
    pub end: f64,
}

impl ViewportRange {
    pub const fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    pub fn progress(&self, top: f64, viewport_height: f64) -> f64 {
        if !viewport_height.is_finite() || self.start <= self.end {
            return 0.0;
        }
        let from = self.start * viewport_height;
        let to = self.end * viewport_height;
        ((from - top) / (from - to)).clamp(0.0, 1.0)
    }
}

/// An element has entered once its top edge passes `line` of the viewport.
pub fn has_entered(top: f64, viewport_height: f64, line: f64) -> bool {
    viewport_height.is_finite() && top <= viewport_height * line
}

fn offset(x: f64, y: f64, scale: f64) -> Transform {
    Transform {
        x: Length::Px(x),
        y: Length::Px(y),
        scale,
        ..Transform::default()
    }
}

/// Fades out while lifting by `rise` pixels.
pub fn fade_up(progress: f64, rise: f64) -> Pose {
    let t = Ease::Power2Out.apply(progress);
    Pose {
        transform: Transform::translate_y(Length::Px(-rise * t)),
        opacity: 1.0 - t,
    }
}

/// Intro cards fade in and rise over the first third of the pinned range, then
/// grow to full size over the rest.
pub fn intro_card_pose(progress: f64) -> Pose {
    let t = progress.clamp(0.0, 1.0) * 3.0;
    let appear = Ease::Power2Out.apply(t);
    let grow = Ease::Power2Out.apply((t - 1.0) / 2.0);
    Pose {
        transform: offset(0.0, 50.0 * (1.0 - appear), 0.8 + 0.2 * grow),
        opacity: appear,
    }
}

/// Words light up in order across the middle half of the pinned range.
pub fn word_opacity(index: usize, total: usize, progress: f64) -> f64 {
    if total == 0 || progress < 0.25 {
        return 0.0;
    }
    if progress > 0.75 {
        return 1.0;
    }
    let text = (progress - 0.25) / 0.5;
    if text >= index as f64 / total as f64 {
        1.0
    } else {
        0.0
    }
}

/// Horizontal drift of strip `index` in percent of its width. Even strips move right.
pub fn strip_offset(index: usize, progress: f64) -> f64 {
    let Some(speed) = STRIP_SPEEDS.get(index) else {
        return 0.0;
    };
    let sign = if index % 2 == 0 { 1.0 } else { -1.0 };
    progress.clamp(0.0, 1.0) * 100.0 * speed * sign
}

/// Deals `items` into `strips` rows of `per_strip`, cycling when they run out.
pub fn fill_strips<T: Clone>(items: &[T], strips: usize, per_strip: usize) -> Vec<Vec<T>> {
    (0..strips)
        .map(|s| {
            if items.is_empty() {
                return Vec::new();
            }
            (0..per_strip)
                .map(|k| items[(s * per_strip + k) % items.len()].clone())
                .collect()
        })
        .collect()
}

/// A one-off entrance: hidden at `from`, animated to rest at `opacity` once shown.
/// Hiding again plays back to `from` without the delay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Entrance {
    pub from: Pose,
    pub opacity: f64,
    pub tween: Tween,
}

impl Entrance {
    fn rising(y: f64, tween: Tween) -> Self {
        Self::new(offset(0.0, y, 1.0), tween)
    }

    fn new(from: Transform, tween: Tween) -> Self {
        Self {
            from: Pose {
                transform: from,
                opacity: 0.0,
            },
            opacity: 1.0,
            tween,
        }
    }

    pub fn frame(&self, shown: bool) -> Frame {
        if shown {
            let pose = Pose {
                opacity: self.opacity,
                ..Pose::default()
            };
            Frame::animated(pose, self.tween)
        } else {
            Frame::animated(self.from, self.tween.delayed(0))
        }
    }
}

pub fn services_header() -> Entrance {
    Entrance::rising(30.0, Tween::new(1000, Ease::Power3Out))
}

pub fn services_list() -> Entrance {
    Entrance::rising(40.0, Tween::new(1000, Ease::Power3Out).delayed(200))
}

pub fn service_item(index: usize) -> Entrance {
    let delay = 300 + 150 * index as Millis;
    Entrance::new(
        offset(-30.0, 0.0, 1.0),
        Tween::new(800, Ease::Power3Out).delayed(delay),
    )
}

pub fn skills_title_line(index: usize) -> Entrance {
    Entrance::rising(
        100.0,
        Tween::new(1200, Ease::Power4Out).delayed(200 * index as Millis),
    )
}

pub fn skills_subtitle() -> Entrance {
    Entrance {
        opacity: 0.7,
        ..Entrance::rising(50.0, Tween::new(1000, Ease::Power3Out).delayed(600))
    }
}

/// Staggered entrance of the skills grid. The whole stagger spans a fixed window,
/// so the last item starts at the same time however many there are.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridReveal {
    items: usize,
}

impl GridReveal {
    pub fn new(items: usize) -> Self {
        Self { items }
    }

    pub fn delay(&self, index: usize) -> Millis {
        if self.items <= 1 {
            return 0;
        }
        GRID_STAGGER_MS * index.min(self.items - 1) as Millis / (self.items - 1) as Millis
    }

    pub fn item(&self, index: usize) -> Entrance {
        Entrance::new(
            offset(0.0, 30.0, 0.8),
            Tween::new(GRID_ITEM_MS, Ease::Power3Out).delayed(self.delay(index)),
        )
    }

    /// When the last item has landed, measured from the trigger.
    pub fn complete_ms(&self) -> Millis {
        match self.items {
            0 => 0,
            n => self.delay(n - 1) + GRID_ITEM_MS,
        }
    }
}

/// Box that slides to whichever grid item is under the pointer. Locked until the
/// grid has finished revealing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridHighlight {
    locked: bool,
    target: Option<Rect>,
}

impl Default for GridHighlight {
    fn default() -> Self {
        Self {
            locked: true,
            target: None,
        }
    }
}

impl GridHighlight {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn lock(&mut self) -> bool {
        !std::mem::replace(&mut self.locked, true)
    }

    pub fn unlock(&mut self) -> bool {
        std::mem::replace(&mut self.locked, false)
    }

    /// Moves onto `item`, both rects in viewport coordinates. Returns true when the
    /// highlight moved.
    pub fn move_to(&mut self, item: Rect, container: Rect) -> bool {
        if self.locked {
            return false;
        }
        let local = Rect::new(
            item.left - container.left,
            item.top - container.top,
            item.width,
            item.height,
        );
        if self.target == Some(local) {
            return false;
        }
        self.target = Some(local);
        true
    }

    /// Hidden until the pointer has reached an item once.
    pub fn is_visible(&self) -> bool {
        self.target.is_some()
    }

    pub fn style(&self) -> String {
        match self.target {
            Some(r) => format!(
                "transform: translate({:.1}px, {:.1}px); width: {:.1}px; height: {:.1}px;",
                r.left, r.top, r.width, r.height
            ),
            None => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_pinned_progress() {
        let range = PinnedRange::viewports(900.0, OUTRO_PIN_VIEWPORTS);
        assert_eq!(range.distance, 2700.0);
        assert_eq!(range.progress(200.0), 0.0);
        assert_eq!(range.progress(-1350.0), 0.5);
        assert_eq!(range.progress(-5000.0), 1.0);
        assert_eq!(PinnedRange::viewports(f64::INFINITY, 1.0).progress(-10.0), 0.0);
    }

    #[test]
    fn test_viewport_range() {
        // 85% to 65% of an 800 px viewport: 680 px down to 520 px
        assert_eq!(SCROLL_HINT_FADE.progress(700.0, 800.0), 0.0);
        assert!(close(SCROLL_HINT_FADE.progress(600.0, 800.0), 0.5));
        assert_eq!(SCROLL_HINT_FADE.progress(100.0, 800.0), 1.0);
        assert_eq!(SCROLL_HINT_FADE.progress(100.0, f64::INFINITY), 0.0);

        assert!(close(STRIP_RANGE.progress(800.0, 800.0), 0.0));
        assert!(close(STRIP_RANGE.progress(-1600.0, 800.0), 0.5));
    }

    #[test]
    fn test_entered() {
        assert!(!has_entered(700.0, 800.0, SERVICES_TRIGGER));
        assert!(has_entered(600.0, 800.0, SERVICES_TRIGGER));
        assert!(has_entered(-3000.0, 800.0, SERVICES_TRIGGER));
        assert!(!has_entered(0.0, f64::INFINITY, SERVICES_TRIGGER));
    }

    #[test]
    fn test_scrubbing_needs_known_desktop_width() {
        assert!(scrubbed(1280.0));
        assert!(!scrubbed(MOBILE_BREAKPOINT_PX));
        assert!(!scrubbed(f64::INFINITY));
    }

    #[test]
    fn test_intro_timeline() {
        let start = intro_card_pose(0.0);
        assert_eq!(start.opacity, 0.0);
        assert_eq!(start.transform.y, Length::Px(50.0));
        assert!(close(start.transform.scale, 0.8));

        // appear finishes a third of the way in, before the card grows
        let appeared = intro_card_pose(1.0 / 3.0);
        assert!(close(appeared.opacity, 1.0));
        assert!(close(appeared.transform.scale, 0.8));

        let end = intro_card_pose(1.0);
        assert_eq!(end.opacity, 1.0);
        assert_eq!(end.transform.y, Length::Px(0.0));
        assert!(close(end.transform.scale, 1.0));
    }

    #[test]
    fn test_fade_up() {
        assert_eq!(fade_up(0.0, 30.0), Pose::default());
        let gone = fade_up(1.0, 30.0);
        assert_eq!(gone.opacity, 0.0);
        assert_eq!(gone.transform.y, Length::Px(-30.0));
    }

    #[test]
    fn test_words_light_in_order() {
        let total = 8;
        assert!((0..total).all(|i| word_opacity(i, total, 0.2) == 0.0));
        assert!((0..total).all(|i| word_opacity(i, total, 0.8) == 1.0));
        // halfway through the text window, the first half of the words are lit
        let lit = (0..total)
            .filter(|&i| word_opacity(i, total, 0.5) == 1.0)
            .count();
        assert_eq!(lit, 5);
        assert_eq!(word_opacity(0, total, 0.25), 1.0);
        assert_eq!(word_opacity(0, 0, 0.9), 0.0);
    }

    #[test]
    fn test_strip_drift() {
        assert_eq!(strip_offset(0, 0.0), 0.0);
        assert!(close(strip_offset(0, 1.0), 30.0));
        assert!(close(strip_offset(1, 1.0), -40.0));
        assert!(close(strip_offset(4, 0.5), 10.0));
        assert_eq!(strip_offset(6, 1.0), 0.0);
    }

    #[test]
    fn test_fill_strips_cycles() {
        let strips = fill_strips(&["a", "b", "c"], 2, 4);
        assert_eq!(strips, vec![vec!["a", "b", "c", "a"], vec!["b", "c", "a", "b"]]);
        let empty = fill_strips::<&str>(&[], 3, 4);
        assert_eq!(empty.len(), 3);
        assert!(empty.iter().all(Vec::is_empty));
    }

    #[test]
    fn test_entrances() {
        let item = service_item(2);
        assert_eq!(item.tween.delay_ms, 600);
        let hidden = item.frame(false);
        assert_eq!(hidden.pose.opacity, 0.0);
        assert_eq!(hidden.pose.transform.x, Length::Px(-30.0));
        assert_eq!(hidden.tween.map(|t| t.delay_ms), Some(0));

        let shown = item.frame(true);
        assert_eq!(shown.pose.transform, Transform::default());
        assert_eq!(shown.tween.map(|t| t.end_ms()), Some(1400));

        assert_eq!(skills_subtitle().frame(true).pose.opacity, 0.7);
        assert_eq!(skills_title_line(1).tween.delay_ms, 200);
        assert_eq!(services_list().tween.delay_ms, 200);
        assert_eq!(services_header().frame(false).pose.transform.y, Length::Px(30.0));
    }

    #[test]
    fn test_grid_stagger() {
        let reveal = GridReveal::new(7);
        assert_eq!(reveal.delay(0), 0);
        assert_eq!(reveal.delay(3), 300);
        assert_eq!(reveal.delay(6), 600);
        assert_eq!(reveal.complete_ms(), 1400);
        assert_eq!(reveal.item(6).tween.end_ms(), reveal.complete_ms());
        assert!(close(reveal.item(0).frame(false).pose.transform.scale, 0.8));

        assert_eq!(GridReveal::new(1).complete_ms(), 800);
        assert_eq!(GridReveal::new(0).complete_ms(), 0);
    }

    #[test]
    fn test_highlight_locked_until_unlocked() {
        let container = Rect::new(100.0, 200.0, 800.0, 400.0);
        let item = Rect::new(300.0, 250.0, 150.0, 120.0);

        let mut highlight = GridHighlight::new();
        assert!(highlight.is_locked());
        assert!(!highlight.move_to(item, container));
        assert!(!highlight.is_visible());
        assert!(highlight.style().is_empty());

        assert!(highlight.unlock());
        assert!(!highlight.unlock());
        assert!(highlight.move_to(item, container));
        assert!(highlight.is_visible());
        assert_eq!(
            highlight.style(),
            "transform: translate(200.0px, 50.0px); width: 150.0px; height: 120.0px;"
        );
        // same item again is not a change
        assert!(!highlight.move_to(item, container));

        assert!(highlight.lock());
        assert!(!highlight.move_to(Rect::new(0.0, 0.0, 10.0, 10.0), container));
        assert!(highlight.is_visible());
    }
}
