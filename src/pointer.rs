//! Pointer tracking and hover hit-testing.
//!
//! Pointer moves only record coordinates. Once per animation frame the consumer
//! refreshes the region rectangles (they move while the strip pans) and asks the
//! tracker which region is under the pointer.

use crate::motion::Transform;

const MAX_TILT_DEG: f64 = 10.0;
const MAX_SHIFT_PX: f64 = 20.0;
const PERSPECTIVE_PX: f64 = 1000.0;
const DEPTH_STEP: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Edges count as inside.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.left && p.x <= self.right() && p.y >= self.top && p.y <= self.bottom()
    }

    pub fn to_local(&self, p: Point) -> Point {
        Point::new(p.x - self.left, p.y - self.top)
    }
}

pub type RegionId = usize;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hover {
    pub id: RegionId,
    pub rect: Rect,
    /// Pointer position relative to the region's top-left corner.
    pub local: Point,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HoverChange {
    Unchanged,
    Enter(Hover),
    Leave(RegionId),
    Switch { from: RegionId, to: Hover },
    Move(Hover),
}

#[derive(Debug, Clone, Default)]
pub struct PointerTracker {
    pointer: Option<Point>,
    regions: Vec<(RegionId, Rect)>,
    hovered: Option<RegionId>,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_pointer(&mut self, p: Point) {
        self.pointer = Some(p);
    }

    /// Pointer left the document.
    pub fn clear_pointer(&mut self) {
        self.pointer = None;
    }

    pub fn pointer(&self) -> Option<Point> {
        self.pointer
    }

    pub fn hovered(&self) -> Option<RegionId> {
        self.hovered
    }

    pub fn register(&mut self, id: RegionId, rect: Rect) {
        match self.regions.iter_mut().find(|(rid, _)| *rid == id) {
            Some((_, r)) => *r = rect,
            None => self.regions.push((id, rect)),
        }
    }

    pub fn unregister(&mut self, id: RegionId) {
        self.regions.retain(|(rid, _)| *rid != id);
    }

    /// Later registrations win where regions overlap.
    pub fn region_at(&self, p: Point) -> Option<(RegionId, Rect)> {
        self.regions
            .iter()
            .rev()
            .find(|(_, rect)| rect.contains(p))
            .copied()
    }

    /// Hit-tests the current pointer and reports how the hover changed since the
    /// previous frame.
    pub fn frame(&mut self) -> HoverChange {
        let hit = self.pointer.and_then(|p| {
            self.region_at(p).map(|(id, rect)| Hover {
                id,
                rect,
                local: rect.to_local(p),
            })
        });
        let change = match (self.hovered, hit) {
            (None, None) => HoverChange::Unchanged,
            (None, Some(h)) => HoverChange::Enter(h),
            (Some(prev), None) => HoverChange::Leave(prev),
            (Some(prev), Some(h)) if prev == h.id => HoverChange::Move(h),
            (Some(prev), Some(h)) => HoverChange::Switch { from: prev, to: h },
        };
        self.hovered = hit.map(|h| h.id);
        change
    }
}

/// Card response to the pointer: a 3D tilt, a spotlight that follows the pointer
/// and a parallax shift for the overlay content.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Tilt {
    pub rotate_x: f64,
    pub rotate_y: f64,
    pub shift_x: f64,
    pub shift_y: f64,
    pub spotlight_x: f64,
    pub spotlight_y: f64,
}

impl Tilt {
    pub fn at(hover: &Hover) -> Self {
        let cx = hover.rect.width / 2.0;
        let cy = hover.rect.height / 2.0;
        if cx <= 0.0 || cy <= 0.0 {
            return Self::rest();
        }
        let dx = (hover.local.x - cx) / cx;
        let dy = (hover.local.y - cy) / cy;
        Self {
            rotate_x: -dy * MAX_TILT_DEG,
            rotate_y: dx * MAX_TILT_DEG,
            shift_x: dx * MAX_SHIFT_PX,
            shift_y: dy * MAX_SHIFT_PX,
            spotlight_x: hover.local.x - cx,
            spotlight_y: hover.local.y - cy,
        }
    }

    pub fn rest() -> Self {
        Self::default()
    }

    pub fn card_transform(&self) -> Transform {
        Transform {
            rotate_x: self.rotate_x,
            rotate_y: self.rotate_y,
            perspective: Some(PERSPECTIVE_PX),
            ..Transform::default()
        }
    }

    /// Overlay children sit at increasing depth.
    pub fn overlay_offset(&self, child: usize) -> (f64, f64) {
        let depth = (child + 1) as f64 * DEPTH_STEP;
        (self.shift_x * depth, self.shift_y * depth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hover_at(x: f64, y: f64) -> Hover {
        let rect = Rect::new(100.0, 50.0, 200.0, 100.0);
        Hover {
            id: 0,
            rect,
            local: rect.to_local(Point::new(x, y)),
        }
    }

    #[test]
    fn test_rect_contains_edges() {
        let r = Rect::new(10.0, 10.0, 20.0, 20.0);
        assert!(r.contains(Point::new(10.0, 10.0)));
        assert!(r.contains(Point::new(30.0, 30.0)));
        assert!(!r.contains(Point::new(30.1, 20.0)));
        assert!(!r.contains(Point::new(20.0, 9.9)));
    }

    #[test]
    fn test_hover_lifecycle() {
        let mut tracker = PointerTracker::new();
        tracker.register(0, Rect::new(0.0, 0.0, 100.0, 100.0));
        tracker.register(1, Rect::new(200.0, 0.0, 100.0, 100.0));
        assert_eq!(tracker.frame(), HoverChange::Unchanged);

        tracker.set_pointer(Point::new(50.0, 50.0));
        match tracker.frame() {
            HoverChange::Enter(h) => {
                assert_eq!(h.id, 0);
                assert_eq!(h.local, Point::new(50.0, 50.0));
            }
            other => panic!("expected enter, got {other:?}"),
        }
        assert_eq!(tracker.hovered(), Some(0));

        // the strip pans underneath a still pointer
        tracker.register(0, Rect::new(-20.0, 0.0, 100.0, 100.0));
        match tracker.frame() {
            HoverChange::Move(h) => assert_eq!(h.local, Point::new(70.0, 50.0)),
            other => panic!("expected move, got {other:?}"),
        }

        tracker.set_pointer(Point::new(250.0, 10.0));
        tracker.register(0, Rect::new(0.0, 0.0, 100.0, 100.0));
        assert!(matches!(
            tracker.frame(),
            HoverChange::Switch { from: 0, to: Hover { id: 1, .. } }
        ));
        tracker.set_pointer(Point::new(50.0, 10.0));
        assert!(matches!(
            tracker.frame(),
            HoverChange::Switch { from: 1, to: Hover { id: 0, .. } }
        ));

        tracker.clear_pointer();
        assert_eq!(tracker.frame(), HoverChange::Leave(0));
        assert_eq!(tracker.hovered(), None);
    }

    #[test]
    fn test_overlapping_regions_prefer_latest() {
        let mut tracker = PointerTracker::new();
        tracker.register(3, Rect::new(0.0, 0.0, 100.0, 100.0));
        tracker.register(4, Rect::new(50.0, 0.0, 100.0, 100.0));
        assert_eq!(tracker.region_at(Point::new(75.0, 5.0)).map(|r| r.0), Some(4));
        tracker.unregister(4);
        assert_eq!(tracker.region_at(Point::new(75.0, 5.0)).map(|r| r.0), Some(3));
        assert!(tracker.region_at(Point::new(175.0, 5.0)).is_none());
    }

    #[test]
    fn test_tilt_math() {
        let centre = Tilt::at(&hover_at(200.0, 100.0));
        assert_eq!(centre, Tilt::rest());

        let right_edge = Tilt::at(&hover_at(300.0, 100.0));
        assert_eq!(right_edge.rotate_y, 10.0);
        assert_eq!(right_edge.rotate_x, 0.0);
        assert_eq!(right_edge.shift_x, 20.0);
        assert_eq!(right_edge.spotlight_x, 100.0);

        let top_left = Tilt::at(&hover_at(100.0, 50.0));
        assert_eq!(top_left.rotate_x, 10.0);
        assert_eq!(top_left.rotate_y, -10.0);
        assert_eq!(top_left.overlay_offset(0), (-10.0, -10.0));
        assert_eq!(top_left.overlay_offset(2), (-30.0, -30.0));
    }

    #[test]
    fn test_degenerate_rect_rests() {
        let hover = Hover {
            id: 0,
            rect: Rect::new(0.0, 0.0, 0.0, 10.0),
            local: Point::new(0.0, 5.0),
        };
        assert_eq!(Tilt::at(&hover), Tilt::rest());
        let t = Tilt::rest().card_transform();
        assert_eq!(t.perspective, Some(1000.0));
    }
}
