//! Falling skill tags.
//!
//! A small fixed-step simulation of axis-aligned boxes dropped into a container
//! with a floor and two side walls. Units follow the usual browser physics
//! conventions: pixels for positions, pixels per step for velocities, one step
//! every 1000/60 ms. Rotation is cosmetic: tags keep their drop angle while
//! falling and flatten out once they touch something.

use std::f64::consts::PI;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

pub const STEP_MS: f64 = 1000.0 / 60.0;
const GRAVITY_SCALE: f64 = 0.001;
const MAX_SUBSTEPS: f64 = 5.0;
const VELOCITY_ITERATIONS: usize = 6;
const POSITION_ITERATIONS: usize = 10;
const CORRECTION_PERCENT: f64 = 0.8;
const SLOP: f64 = 0.02;
/// Impacts slower than this don't bounce.
const RESTING_SPEED: f64 = 1.0;
const WAKE_SPEED: f64 = 2.0;
const SLEEP_SPEED: f64 = 0.08;
const SLEEP_STEPS: u32 = 60;
const CONTACT_FLATTEN: f64 = 0.85;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn dot(self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y
    }

    pub fn length(self) -> f64 {
        self.dot(self).sqrt()
    }

    fn perp(self) -> Self {
        Self::new(-self.y, self.x)
    }
}

impl Add for Vec2 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Vec2 {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Vec2 {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl SubAssign for Vec2 {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicsConfig {
    pub gravity: Vec2,
    pub restitution: f64,
    pub friction: f64,
    pub friction_air: f64,
    pub density: f64,
    pub wall_thickness: f64,
    /// Gap between the floor and the container's bottom edge.
    pub floor_offset: f64,
    pub max_speed: f64,
    /// The lid closes the box once every tag is inside, not before this.
    pub lid_delay_ms: f64,
    pub nudge_interval_ms: f64,
    pub nudge_probability: f64,
    pub drop_height: f64,
    pub drop_spacing: f64,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: Vec2::new(0.0, 1.0),
            restitution: 0.5,
            friction: 0.15,
            friction_air: 0.02,
            density: 0.002,
            wall_thickness: 200.0,
            floor_offset: 8.0,
            max_speed: 250.0,
            lid_delay_ms: 3000.0,
            nudge_interval_ms: 2000.0,
            nudge_probability: 0.3,
            drop_height: 500.0,
            drop_spacing: 150.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Aabb {
    center: Vec2,
    half: Vec2,
}

impl Aabb {
    fn from_edges(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            center: Vec2::new((left + right) / 2.0, (top + bottom) / 2.0),
            half: Vec2::new((right - left) / 2.0, (bottom - top) / 2.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Body {
    pub position: Vec2,
    pub velocity: Vec2,
    pub half: Vec2,
    pub angle: f64,
    inv_mass: f64,
    sleeping: bool,
    still_steps: u32,
}

impl Body {
    fn new(position: Vec2, width: f64, height: f64, angle: f64, density: f64) -> Self {
        let mass = (width * height * density).max(f64::EPSILON);
        Self {
            position,
            velocity: Vec2::ZERO,
            half: Vec2::new(width / 2.0, height / 2.0),
            angle,
            inv_mass: 1.0 / mass,
            sleeping: false,
            still_steps: 0,
        }
    }

    pub fn is_sleeping(&self) -> bool {
        self.sleeping
    }

    pub fn top(&self) -> f64 {
        self.position.y - self.half.y
    }

    pub fn bottom(&self) -> f64 {
        self.position.y + self.half.y
    }

    pub fn left(&self) -> f64 {
        self.position.x - self.half.x
    }

    pub fn right(&self) -> f64 {
        self.position.x + self.half.x
    }

    fn wake(&mut self) {
        self.sleeping = false;
        self.still_steps = 0;
    }

    fn aabb(&self) -> Aabb {
        Aabb {
            center: self.position,
            half: self.half,
        }
    }

    /// Sleeping bodies hold still like walls until something wakes them.
    fn effective_inv_mass(&self) -> f64 {
        if self.sleeping {
            0.0
        } else {
            self.inv_mass
        }
    }
}

/// Where to draw a tag: top-left corner inside the container, and rotation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyPose {
    pub left: f64,
    pub top: f64,
    pub angle: f64,
}

impl BodyPose {
    pub fn to_style(&self) -> String {
        format!(
            "left: {:.2}px; top: {:.2}px; transform: rotate({:.4}rad);",
            self.left, self.top, self.angle
        )
    }
}

#[derive(Debug, Clone, Copy)]
struct Contact {
    normal: Vec2,
    depth: f64,
}

/// Contact normal points from `a` to `b`.
fn collide(a: &Aabb, b: &Aabb) -> Option<Contact> {
    let d = b.center - a.center;
    let overlap_x = a.half.x + b.half.x - d.x.abs();
    let overlap_y = a.half.y + b.half.y - d.y.abs();
    if overlap_x <= 0.0 || overlap_y <= 0.0 {
        return None;
    }
    let sign = |v: f64| if v >= 0.0 { 1.0 } else { -1.0 };
    if overlap_x < overlap_y {
        Some(Contact {
            normal: Vec2::new(sign(d.x), 0.0),
            depth: overlap_x,
        })
    } else {
        Some(Contact {
            normal: Vec2::new(0.0, sign(d.y)),
            depth: overlap_y,
        })
    }
}

#[derive(Debug, Clone)]
pub struct World {
    config: PhysicsConfig,
    width: f64,
    height: f64,
    bodies: Vec<Body>,
    walls: Vec<Aabb>,
    has_lid: bool,
    elapsed_ms: f64,
    next_nudge_ms: f64,
    accumulator: f64,
    rng: SmallRng,
}

impl World {
    /// Drops one body per `(width, height)` above a `width` x `height` container.
    pub fn new(
        width: f64,
        height: f64,
        sizes: &[(f64, f64)],
        config: PhysicsConfig,
        seed: u64,
    ) -> Self {
        let mut rng = SmallRng::seed_from_u64(seed);
        let wall = config.wall_thickness;
        let floor_top = height - config.floor_offset;
        let walls = vec![
            Aabb::from_edges(-wall, floor_top, width + wall, floor_top + wall),
            Aabb::from_edges(-wall, -wall, 0.0, height + wall),
            Aabb::from_edges(width, -wall, width + wall, height + wall),
        ];

        let bodies = sizes
            .iter()
            .enumerate()
            .map(|(i, &(w, h))| {
                let x = if width > w {
                    rng.random_range(w / 2.0..width - w / 2.0)
                } else {
                    width / 2.0
                };
                let y = -config.drop_height - i as f64 * config.drop_spacing;
                let angle = (rng.random::<f64>() - 0.5) * PI;
                Body::new(Vec2::new(x, y), w, h, angle, config.density)
            })
            .collect();

        Self {
            config,
            width,
            height,
            bodies,
            walls,
            has_lid: false,
            elapsed_ms: 0.0,
            next_nudge_ms: config.nudge_interval_ms,
            accumulator: 0.0,
            rng,
        }
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn has_lid(&self) -> bool {
        self.has_lid
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed_ms
    }

    pub fn is_settled(&self) -> bool {
        self.bodies.iter().all(Body::is_sleeping)
    }

    /// Runs as many fixed steps as fit into `delta_ms`, carrying the remainder.
    /// Long gaps (a background tab) are capped rather than replayed.
    pub fn advance(&mut self, delta_ms: f64) -> u32 {
        self.accumulator += delta_ms.clamp(0.0, STEP_MS * MAX_SUBSTEPS);
        let mut steps = 0;
        while self.accumulator >= STEP_MS {
            self.step();
            self.accumulator -= STEP_MS;
            steps += 1;
        }
        steps
    }

    pub fn step(&mut self) {
        self.elapsed_ms += STEP_MS;
        self.maybe_close_lid();
        self.maybe_nudge();
        self.integrate();

        let PhysicsConfig {
            restitution,
            friction,
            ..
        } = self.config;
        let mut touching = vec![false; self.bodies.len()];
        for _ in 0..VELOCITY_ITERATIONS {
            self.for_each_contact(&mut touching, |a, b, contact| {
                resolve_velocity(a, b, contact, restitution, friction)
            });
        }
        for _ in 0..POSITION_ITERATIONS {
            self.for_each_contact(&mut touching, correct_position);
        }

        for (body, touched) in self.bodies.iter_mut().zip(touching) {
            if touched {
                body.angle *= CONTACT_FLATTEN;
            }
            if body.sleeping {
                continue;
            }
            if body.velocity.length() < SLEEP_SPEED {
                body.still_steps += 1;
                if body.still_steps >= SLEEP_STEPS {
                    body.sleeping = true;
                    body.velocity = Vec2::ZERO;
                }
            } else {
                body.still_steps = 0;
            }
        }
    }

    /// Draw positions, clamped to the visible container.
    pub fn poses(&self) -> Vec<BodyPose> {
        self.bodies
            .iter()
            .map(|b| {
                let w = b.half.x * 2.0;
                let h = b.half.y * 2.0;
                let max_left = (self.width - w).max(0.0);
                let min_top = -h * 3.0;
                let max_top = (self.height - h - self.config.floor_offset).max(min_top);
                BodyPose {
                    left: b.left().clamp(0.0, max_left),
                    top: b.top().clamp(min_top, max_top),
                    angle: b.angle,
                }
            })
            .collect()
    }

    fn maybe_close_lid(&mut self) {
        if self.has_lid || self.elapsed_ms < self.config.lid_delay_ms {
            return;
        }
        if self.bodies.iter().any(|b| b.top() < 0.0) {
            return;
        }
        let wall = self.config.wall_thickness;
        self.walls
            .push(Aabb::from_edges(-wall, -wall, self.width + wall, 0.0));
        self.has_lid = true;
        log::debug!("physics lid closed after {:.0}ms", self.elapsed_ms);
    }

    fn maybe_nudge(&mut self) {
        if self.elapsed_ms < self.next_nudge_ms {
            return;
        }
        self.next_nudge_ms += self.config.nudge_interval_ms;
        if self.bodies.is_empty() || self.rng.random::<f64>() >= self.config.nudge_probability {
            return;
        }
        let i = self.rng.random_range(0..self.bodies.len());
        let force = Vec2::new(
            (self.rng.random::<f64>() - 0.5) * 0.02,
            (self.rng.random::<f64>() - 0.5) * 0.01,
        );
        // bodies resting on the nudged one must be free to follow it
        self.bodies.iter_mut().for_each(Body::wake);
        let body = &mut self.bodies[i];
        body.velocity += force * (body.inv_mass * STEP_MS * STEP_MS);
    }

    fn integrate(&mut self) {
        let gravity = self.config.gravity * (GRAVITY_SCALE * STEP_MS * STEP_MS);
        let damping = 1.0 - self.config.friction_air;
        let max = self.config.max_speed;
        for body in self.bodies.iter_mut().filter(|b| !b.sleeping) {
            body.velocity = body.velocity * damping + gravity;
            body.velocity.x = body.velocity.x.clamp(-max, max);
            body.velocity.y = body.velocity.y.clamp(-max, max);
            body.position += body.velocity;
        }
    }

    fn for_each_contact<F>(&mut self, touching: &mut [bool], mut f: F)
    where
        F: FnMut(&mut Body, &mut Body, Contact),
    {
        let n = self.bodies.len();
        for i in 0..n {
            for j in (i + 1)..n {
                let (head, tail) = self.bodies.split_at_mut(j);
                let (a, b) = (&mut head[i], &mut tail[0]);
                if a.sleeping && b.sleeping {
                    continue;
                }
                if let Some(contact) = collide(&a.aabb(), &b.aabb()) {
                    touching[i] = true;
                    touching[j] = true;
                    f(a, b, contact);
                }
            }
            for w in 0..self.walls.len() {
                let wall = self.walls[w];
                let body = &mut self.bodies[i];
                if body.sleeping {
                    continue;
                }
                if let Some(contact) = collide(&body.aabb(), &wall) {
                    touching[i] = true;
                    let mut anchor = Body {
                        position: wall.center,
                        velocity: Vec2::ZERO,
                        half: wall.half,
                        angle: 0.0,
                        inv_mass: 0.0,
                        sleeping: false,
                        still_steps: 0,
                    };
                    f(body, &mut anchor, contact);
                }
            }
        }
    }
}

fn wake_on_impact(a: &mut Body, b: &mut Body, normal: Vec2) {
    let closing = -(b.velocity - a.velocity).dot(normal);
    if closing > WAKE_SPEED {
        if a.sleeping {
            a.wake();
        }
        if b.sleeping {
            b.wake();
        }
    }
}

fn resolve_velocity(a: &mut Body, b: &mut Body, contact: Contact, restitution: f64, friction: f64) {
    wake_on_impact(a, b, contact.normal);
    let (ia, ib) = (a.effective_inv_mass(), b.effective_inv_mass());
    let total = ia + ib;
    if total <= 0.0 {
        return;
    }
    let vn = (b.velocity - a.velocity).dot(contact.normal);
    if vn >= 0.0 {
        return;
    }
    let e = if -vn > RESTING_SPEED { restitution } else { 0.0 };
    let j = -(1.0 + e) * vn / total;
    a.velocity -= contact.normal * (j * ia);
    b.velocity += contact.normal * (j * ib);

    let tangent = contact.normal.perp();
    let vt = (b.velocity - a.velocity).dot(tangent);
    let limit = friction * j;
    let jt = (-vt / total).clamp(-limit, limit);
    a.velocity -= tangent * (jt * ia);
    b.velocity += tangent * (jt * ib);
}

fn correct_position(a: &mut Body, b: &mut Body, contact: Contact) {
    let (ia, ib) = (a.effective_inv_mass(), b.effective_inv_mass());
    let total = ia + ib;
    if total <= 0.0 {
        return;
    }
    let amount = (contact.depth - SLOP).max(0.0) / total * CORRECTION_PERCENT;
    a.position -= contact.normal * (amount * ia);
    b.position += contact.normal * (amount * ib);
}

#[cfg(test)]
mod tests {
    use super::*;

    const TAGS: [(f64, f64); 14] = [(120.0, 44.0); 14];

    fn quiet() -> PhysicsConfig {
        PhysicsConfig {
            nudge_probability: 0.0,
            ..PhysicsConfig::default()
        }
    }

    fn run_for(world: &mut World, ms: f64) {
        let frames = (ms / STEP_MS).ceil() as usize;
        for _ in 0..frames {
            world.step();
        }
    }

    #[test]
    fn test_drop_positions() {
        let world = World::new(800.0, 600.0, &TAGS, PhysicsConfig::default(), 7);
        for (i, body) in world.bodies().iter().enumerate() {
            assert!(body.left() >= 0.0 && body.right() <= 800.0);
            assert_eq!(body.position.y, -500.0 - 150.0 * i as f64);
            assert!(body.angle.abs() <= PI / 2.0);
        }
    }

    #[test]
    fn test_same_seed_same_world() {
        let mut a = World::new(800.0, 600.0, &TAGS, PhysicsConfig::default(), 42);
        let mut b = World::new(800.0, 600.0, &TAGS, PhysicsConfig::default(), 42);
        run_for(&mut a, 4000.0);
        run_for(&mut b, 4000.0);
        assert_eq!(a.poses(), b.poses());
    }

    #[test]
    fn test_tags_come_to_rest_inside_the_box() {
        let mut world = World::new(800.0, 600.0, &TAGS, PhysicsConfig::default(), 3);
        run_for(&mut world, 20_000.0);
        assert!(world.has_lid());
        let floor = 600.0 - 8.0;
        for body in world.bodies() {
            assert!(body.bottom() <= floor + 4.0, "below floor: {body:?}");
            assert!(body.top() >= -4.0, "above lid: {body:?}");
            assert!(body.left() >= -4.0 && body.right() <= 804.0, "outside walls: {body:?}");
        }
    }

    #[test]
    fn test_single_tag_falls_asleep_on_the_floor() {
        let mut world = World::new(400.0, 300.0, &[(100.0, 40.0)], quiet(), 1);
        run_for(&mut world, 10_000.0);
        let body = world.bodies()[0];
        assert!(world.is_settled());
        assert!((body.bottom() - 292.0).abs() < 1.0, "{body:?}");
        assert!(body.angle.abs() < 0.01);
    }

    #[test]
    fn test_lid_waits_for_every_tag() {
        let mut world = World::new(800.0, 600.0, &TAGS, quiet(), 11);
        run_for(&mut world, 3500.0);
        // the last tag starts almost 2.5k px up and is still falling
        assert!(world.bodies().iter().any(|b| b.top() < 0.0));
        assert!(!world.has_lid());
        run_for(&mut world, 10_000.0);
        assert!(world.has_lid());
        assert!(world.bodies().iter().all(|b| b.top() >= -1.0));
    }

    #[test]
    fn test_advance_uses_fixed_steps() {
        let mut world = World::new(400.0, 300.0, &[(100.0, 40.0)], quiet(), 1);
        assert_eq!(world.advance(STEP_MS * 2.5), 2);
        assert_eq!(world.advance(STEP_MS * 0.75), 1);
        // a long pause is not replayed in full
        assert_eq!(world.advance(10_000.0), 5);
        assert!((world.elapsed_ms() - STEP_MS * 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_poses_are_clamped() {
        let world = World::new(400.0, 300.0, &[(100.0, 40.0)], quiet(), 1);
        let pose = world.poses()[0];
        assert_eq!(pose.top, -120.0);
        assert!(pose.left >= 0.0 && pose.left <= 300.0);
        assert!(pose.to_style().starts_with("left: "));
    }
}
