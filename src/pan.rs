use crate::projects::index_label;

/// At or below this width the featured strip stacks vertically instead of panning.
pub const BREAKPOINT_PX: f64 = 1000.0;
/// Pinned scroll distance, in viewport heights.
pub const SCROLL_HEIGHT: f64 = 5.0;
pub const INDICATOR_SECTIONS: usize = 3;
pub const TICKS_PER_SECTION: usize = 10;
pub const DIM_OPACITY: f64 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanLayout {
    pub viewport_width: f64,
    pub viewport_height: f64,
    pub cards: usize,
}

impl PanLayout {
    pub fn new(viewport_width: f64, viewport_height: f64, cards: usize) -> Self {
        Self {
            viewport_width,
            viewport_height,
            cards,
        }
    }

    /// Off while the viewport is still unknown (infinite) during server rendering.
    pub fn is_enabled(&self) -> bool {
        self.viewport_width.is_finite()
            && self.viewport_height.is_finite()
            && self.viewport_width > BREAKPOINT_PX
    }

    pub fn scroll_distance(&self) -> f64 {
        self.viewport_height * SCROLL_HEIGHT
    }

    /// Height of the section that hosts the sticky strip.
    pub fn section_height(&self) -> f64 {
        self.viewport_height + self.scroll_distance()
    }

    /// Progress through the pinned range from the section's viewport top.
    pub fn progress(&self, section_top: f64) -> f64 {
        let distance = self.scroll_distance();
        if !self.is_enabled() || distance <= 0.0 {
            return 0.0;
        }
        (-section_top / distance).clamp(0.0, 1.0)
    }

    pub fn offset_x(&self, progress: f64) -> f64 {
        if !self.is_enabled() {
            return 0.0;
        }
        -self.viewport_width * self.cards as f64 * progress.clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndicatorItem {
    Label(String),
    Tick(usize),
}

/// Section labels (`01`, `02`, ...) each followed by their ticks.
pub fn indicator_items() -> Vec<IndicatorItem> {
    let mut items = Vec::with_capacity(INDICATOR_SECTIONS * (TICKS_PER_SECTION + 1));
    for section in 0..INDICATOR_SECTIONS {
        items.push(IndicatorItem::Label(index_label(section + 1)));
        for t in 0..TICKS_PER_SECTION {
            items.push(IndicatorItem::Tick(section * TICKS_PER_SECTION + t));
        }
    }
    items
}

pub fn total_ticks() -> usize {
    INDICATOR_SECTIONS * TICKS_PER_SECTION
}

/// A tick lights up once progress has passed its start.
pub fn tick_opacity(tick: usize, total: usize, progress: f64) -> f64 {
    if total == 0 {
        return DIM_OPACITY;
    }
    let start = tick as f64 / total as f64;
    if progress > start {
        1.0
    } else {
        DIM_OPACITY
    }
}
