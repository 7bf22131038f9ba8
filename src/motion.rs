//! Easing, transform composition and choreography shared by the animated views.
//!
//! Animations are expressed as target styles plus CSS transitions; the browser
//! interpolates. Everything here is plain data so the timing can be tested.

use std::collections::VecDeque;
use std::fmt::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::config::{Millis, RevealTiming, SlideTiming};
use crate::navigator::Direction;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ease {
    Linear,
    Power2In,
    Power2Out,
    Power2InOut,
    Power3Out,
    Power3InOut,
    Power4Out,
    Power4InOut,
}

impl Ease {
    /// Progress at time `t` in `[0, 1]`.
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::Power2In => t.powi(3),
            Self::Power2Out => out(t, 3),
            Self::Power2InOut => in_out(t, 3),
            Self::Power3Out => out(t, 4),
            Self::Power3InOut => in_out(t, 4),
            Self::Power4Out => out(t, 5),
            Self::Power4InOut => in_out(t, 5),
        }
    }

    /// Closest `cubic-bezier` for use in CSS transitions.
    pub fn css(self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::Power2In => "cubic-bezier(0.55, 0.055, 0.675, 0.19)",
            Self::Power2Out => "cubic-bezier(0.215, 0.61, 0.355, 1)",
            Self::Power2InOut => "cubic-bezier(0.645, 0.045, 0.355, 1)",
            Self::Power3Out => "cubic-bezier(0.165, 0.84, 0.44, 1)",
            Self::Power3InOut => "cubic-bezier(0.77, 0, 0.175, 1)",
            Self::Power4Out => "cubic-bezier(0.23, 1, 0.32, 1)",
            Self::Power4InOut => "cubic-bezier(0.86, 0, 0.07, 1)",
        }
    }
}

fn out(t: f64, power: i32) -> f64 {
    1.0 - (1.0 - t).powi(power)
}

fn in_out(t: f64, power: i32) -> f64 {
    if t < 0.5 {
        (2.0 * t).powi(power) / 2.0
    } else {
        1.0 - (2.0 * (1.0 - t)).powi(power) / 2.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Length {
    Px(f64),
    Percent(f64),
    Vh(f64),
}

impl Default for Length {
    fn default() -> Self {
        Self::Px(0.0)
    }
}

impl std::fmt::Display for Length {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Px(v) => write!(f, "{v}px"),
            Self::Percent(v) => write!(f, "{v}%"),
            Self::Vh(v) => write!(f, "{v}vh"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub x: Length,
    pub y: Length,
    pub scale: f64,
    /// Degrees.
    pub rotate: f64,
    pub rotate_x: f64,
    pub rotate_y: f64,
    pub perspective: Option<f64>,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            x: Length::default(),
            y: Length::default(),
            scale: 1.0,
            rotate: 0.0,
            rotate_x: 0.0,
            rotate_y: 0.0,
            perspective: None,
        }
    }
}

impl Transform {
    pub fn translate_y(y: Length) -> Self {
        Self {
            y,
            ..Self::default()
        }
    }

    pub fn scaled(scale: f64) -> Self {
        Self {
            scale,
            ..Self::default()
        }
    }

    /// Always starts with `translate3d` so the element keeps its own layer.
    pub fn to_css(&self) -> String {
        let mut css = String::new();
        if let Some(p) = self.perspective {
            let _ = write!(css, "perspective({p}px) ");
        }
        let _ = write!(css, "translate3d({}, {}, 0)", self.x, self.y);
        if self.rotate != 0.0 {
            let _ = write!(css, " rotate({}deg)", self.rotate);
        }
        if self.rotate_x != 0.0 {
            let _ = write!(css, " rotateX({}deg)", self.rotate_x);
        }
        if self.rotate_y != 0.0 {
            let _ = write!(css, " rotateY({}deg)", self.rotate_y);
        }
        if self.scale != 1.0 {
            let _ = write!(css, " scale({})", self.scale);
        }
        css
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub transform: Transform,
    pub opacity: f64,
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            transform: Transform::default(),
            opacity: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tween {
    pub duration_ms: Millis,
    pub delay_ms: Millis,
    pub ease: Ease,
}

impl Tween {
    pub fn new(duration_ms: Millis, ease: Ease) -> Self {
        Self {
            duration_ms,
            delay_ms: 0,
            ease,
        }
    }

    pub fn delayed(self, delay_ms: Millis) -> Self {
        Self { delay_ms, ..self }
    }

    pub fn end_ms(&self) -> Millis {
        self.delay_ms + self.duration_ms
    }

    pub fn to_css(&self, properties: &[&str]) -> String {
        properties
            .iter()
            .map(|p| {
                format!(
                    "{p} {}ms {} {}ms",
                    self.duration_ms,
                    self.ease.css(),
                    self.delay_ms
                )
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// A pose and how to get there. No tween means the pose applies instantly.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Frame {
    pub pose: Pose,
    pub tween: Option<Tween>,
}

impl Frame {
    pub fn instant(pose: Pose) -> Self {
        Self { pose, tween: None }
    }

    pub fn animated(pose: Pose, tween: Tween) -> Self {
        Self {
            pose,
            tween: Some(tween),
        }
    }

    pub fn to_style(&self) -> String {
        let transition = match &self.tween {
            Some(t) => t.to_css(&["transform", "opacity"]),
            None => "none".to_string(),
        };
        format!(
            "transform: {}; opacity: {}; transition: {transition};",
            self.pose.transform.to_css(),
            self.pose.opacity
        )
    }
}

/// Resting pose of the current slide.
pub fn slide_rest() -> Frame {
    Frame::instant(Pose::default())
}

/// Parked below the viewport and hidden.
pub fn slide_offscreen() -> Frame {
    Frame::instant(Pose {
        transform: Transform::translate_y(Length::Vh(100.0)),
        opacity: 0.0,
    })
}

/// The outgoing slide shrinks, tilts and leaves in the direction of travel.
pub fn slide_exit(direction: Direction, timing: &SlideTiming) -> Frame {
    Frame::animated(
        Pose {
            transform: Transform {
                y: Length::Vh(100.0 * direction.exit_sign()),
                scale: 0.5,
                rotate: 15.0,
                ..Transform::default()
            },
            opacity: 0.0,
        },
        Tween::new(timing.exit_ms, Ease::Power4InOut),
    )
}

/// Where the incoming slide starts: the side opposite to the exit.
pub fn slide_entry_start(direction: Direction) -> Frame {
    Frame::instant(Pose {
        transform: Transform::translate_y(Length::Vh(-100.0 * direction.exit_sign())),
        opacity: 1.0,
    })
}

pub fn slide_entry(timing: &SlideTiming) -> Frame {
    Frame::animated(
        Pose::default(),
        Tween::new(timing.entrance_ms, Ease::Power4Out),
    )
}

pub fn image_zoomed() -> Frame {
    Frame::instant(Pose {
        transform: Transform::scaled(2.0),
        opacity: 1.0,
    })
}

pub fn image_settle(timing: &SlideTiming) -> Frame {
    Frame::animated(
        Pose::default(),
        Tween::new(timing.entrance_ms, Ease::Power4Out),
    )
}

/// Style of a masked word or line. Hidden items sit one line-height below their mask.
pub fn reveal_style(shown: bool, delay_ms: Millis, timing: &RevealTiming) -> String {
    if shown {
        let tween = Tween::new(timing.duration_ms, Ease::Power4Out).delayed(delay_ms);
        format!(
            "transform: translate3d(0, 0%, 0); transition: {};",
            tween.to_css(&["transform"])
        )
    } else {
        "transform: translate3d(0, 100%, 0); transition: none;".to_string()
    }
}

pub fn split_words(text: &str) -> Vec<&str> {
    text.split_whitespace().collect()
}

/// Start offsets of a slide's staggered text reveal, relative to the start of the
/// entrance. Title words go first, then the detail lines, then the call to action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevealPlan {
    pub words: Vec<Millis>,
    pub lines: Vec<Millis>,
    pub link: Millis,
    pub total: Millis,
}

impl RevealPlan {
    pub fn new(words: usize, lines: usize, timing: &RevealTiming) -> Self {
        let staggered = |start: Millis, count: usize, stagger: Millis| -> Vec<Millis> {
            (0..count as Millis).map(|i| start + i * stagger).collect()
        };
        let group_end = |starts: &[Millis], fallback: Millis| -> Millis {
            starts
                .last()
                .map(|s| s + timing.duration_ms)
                .unwrap_or(fallback)
        };

        let words = staggered(timing.title_offset_ms, words, timing.word_stagger_ms);
        let title_end = group_end(&words, timing.title_offset_ms);

        let lines_start = title_end.saturating_sub(timing.lines_overlap_ms);
        let lines = staggered(lines_start, lines, timing.line_stagger_ms);
        let lines_end = group_end(&lines, lines_start);

        let link = lines_end.saturating_sub(timing.link_overlap_ms);
        let total = title_end.max(lines_end).max(link + timing.duration_ms);
        Self {
            words,
            lines,
            link,
            total,
        }
    }

    pub fn word(&self, i: usize) -> Millis {
        self.words.get(i).copied().unwrap_or(0)
    }

    pub fn line(&self, i: usize) -> Millis {
        self.lines.get(i).copied().unwrap_or(0)
    }
}

/// Anything started by a scope that can be stopped early.
pub trait Cancel {
    fn cancel(self);
}

/// Shared flag checked by every deferred step of a scope.
#[derive(Debug, Clone, Default)]
pub struct ScopeToken(Arc<AtomicBool>);

impl ScopeToken {
    pub fn is_live(&self) -> bool {
        !self.0.load(Ordering::Acquire)
    }
}

const MAX_TRACKED: usize = 32;

/// Owns the pending animation steps of one mounted view. Revoking the scope
/// cancels what can be cancelled and turns every guarded callback into a no-op.
#[derive(Debug)]
pub struct AnimationScope<H: Cancel> {
    token: ScopeToken,
    pending: VecDeque<H>,
}

impl<H: Cancel> Default for AnimationScope<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: Cancel> AnimationScope<H> {
    pub fn new() -> Self {
        Self {
            token: ScopeToken::default(),
            pending: VecDeque::new(),
        }
    }

    pub fn token(&self) -> ScopeToken {
        self.token.clone()
    }

    pub fn is_live(&self) -> bool {
        self.token.is_live()
    }

    pub fn guard<F: FnOnce()>(&self, f: F) -> impl FnOnce() {
        let token = self.token();
        move || {
            if token.is_live() {
                f()
            }
        }
    }

    /// Oldest handles are dropped once the cap is hit; by then they have fired.
    pub fn track(&mut self, handle: H) {
        if !self.is_live() {
            handle.cancel();
            return;
        }
        if self.pending.len() == MAX_TRACKED {
            self.pending.pop_front();
        }
        self.pending.push_back(handle);
    }

    pub fn revoke(&mut self) {
        self.token.0.store(true, Ordering::Release);
        for handle in self.pending.drain(..) {
            handle.cancel();
        }
    }
}
