//! Collision Detection and Resolution
//!
//! Narrow-phase collision between one dynamic capsule (the actor) and
//! one static oriented box (an obstacle), invoked once per pair per
//! frame by the physics pass. The resolver is stateless: it reports the
//! deepest penetration it can find, and the caller applies the
//! positional correction, velocity slide, and grounded classification.
//!
//! Two complementary passes, because a single axis clamp test misses
//! box-edge contacts and a single edge test misses deep face contacts:
//!
//! 1. Face/interior pass in box-local space - sample the capsule segment
//!    and clamp each sample to the extents box.
//! 2. Edge pass in world space - closest distance between the capsule
//!    segment and each of the box's 12 edges.
//!
//! Deepest penetration wins across both passes. Overlaps with multiple
//! obstacles are resolved one pair at a time, in iteration order, with
//! no joint solve - a deliberate simplification: corner-wedging against
//! two obstacles settles over a few frames instead of one.

use log::trace;

use crate::components::{KinematicBody, Transform};
use crate::math::{Vec3, mat4_rotation};

/// Contact normals steeper than this y component count as standable
/// ground; mirrored below -WALKABLE_SLOPE they count as ceiling.
pub const WALKABLE_SLOPE: f32 = 0.6;

/// Guard for normalization and the parametric segment solve.
const EPSILON: f32 = 1e-6;

// =============================================================================
// Shapes
// =============================================================================

/// A line segment swept by a sphere - the dynamic actor's shape.
#[derive(Debug, Clone, Copy)]
pub struct Capsule {
    /// Bottom sphere center
    pub a: Vec3,
    /// Top sphere center
    pub b: Vec3,
    pub radius: f32,
}

impl Capsule {
    /// Build a capsule standing on `base` (the actor's feet position),
    /// extending `height` along `up`. The centerline runs between the
    /// two sphere centers: `max(0, height - 2 * radius)` long, so a
    /// too-short capsule degenerates to a sphere rather than inverting.
    pub fn from_base(base: Vec3, up: Vec3, radius: f32, height: f32) -> Self {
        let up = up.normalize();
        let segment = (height - 2.0 * radius).max(0.0);
        let a = base + up * radius;
        Self {
            a,
            b: a + up * segment,
            radius,
        }
    }
}

/// A rectangular box with arbitrary world rotation - a static obstacle.
#[derive(Debug, Clone, Copy)]
pub struct OrientedBox {
    pub center: Vec3,
    /// Unit local axes in world space
    pub axes: [Vec3; 3],
    pub half_extents: Vec3,
}

/// Box corner pairs forming the 12 edges. Corners are indexed by sign
/// bits: bit 0 = +x, bit 1 = +y, bit 2 = +z; edges connect corners
/// differing in exactly one bit.
const BOX_EDGES: [(usize, usize); 12] = [
    (0, 1), (0, 2), (0, 4),
    (1, 3), (1, 5),
    (2, 3), (2, 6),
    (3, 7),
    (4, 5), (4, 6),
    (5, 7),
    (6, 7),
];

impl OrientedBox {
    /// Build from a world position, euler rotation (degrees) and local
    /// half-extents.
    pub fn from_position_rotation(center: Vec3, rotation: Vec3, half_extents: Vec3) -> Self {
        let m = mat4_rotation(rotation);
        Self {
            center,
            axes: [
                Vec3::new(m[0][0], m[1][0], m[2][0]),
                Vec3::new(m[0][1], m[1][1], m[2][1]),
                Vec3::new(m[0][2], m[1][2], m[2][2]),
            ],
            half_extents,
        }
    }

    /// Axis-aligned box at a position.
    pub fn axis_aligned(center: Vec3, half_extents: Vec3) -> Self {
        Self::from_position_rotation(center, Vec3::ZERO, half_extents)
    }

    /// World point to box-local coordinates.
    pub fn to_local(&self, p: Vec3) -> Vec3 {
        let d = p - self.center;
        Vec3::new(d.dot(self.axes[0]), d.dot(self.axes[1]), d.dot(self.axes[2]))
    }

    /// Box-local point to world coordinates.
    pub fn to_world(&self, p: Vec3) -> Vec3 {
        self.center + self.axes[0] * p.x + self.axes[1] * p.y + self.axes[2] * p.z
    }

    /// Box-local direction to world coordinates (no translation).
    pub fn to_world_dir(&self, d: Vec3) -> Vec3 {
        self.axes[0] * d.x + self.axes[1] * d.y + self.axes[2] * d.z
    }

    /// The 8 corners in world space, indexed by sign bits (see BOX_EDGES).
    pub fn corners(&self) -> [Vec3; 8] {
        let h = self.half_extents;
        let mut out = [Vec3::ZERO; 8];
        for (i, corner) in out.iter_mut().enumerate() {
            let sx = if i & 1 != 0 { h.x } else { -h.x };
            let sy = if i & 2 != 0 { h.y } else { -h.y };
            let sz = if i & 4 != 0 { h.z } else { -h.z };
            *corner = self.to_world(Vec3::new(sx, sy, sz));
        }
        out
    }
}

/// A computed capsule-vs-box overlap: push the capsule `magnitude` units
/// along `direction` to separate the pair.
#[derive(Debug, Clone, Copy)]
pub struct PenetrationCandidate {
    /// Unit push direction, pointing from the box surface toward the capsule
    pub direction: Vec3,
    /// Penetration depth, always >= 0
    pub magnitude: f32,
    /// Approximate contact point on the box surface
    pub contact: Vec3,
}

// =============================================================================
// Narrow Phase
// =============================================================================

/// Find the deepest penetration between a capsule and an oriented box.
/// Returns `None` when every sub-test finds a gap of at least `radius`.
pub fn resolve_capsule_box(capsule: &Capsule, obb: &OrientedBox) -> Option<PenetrationCandidate> {
    if capsule.radius <= EPSILON {
        return None;
    }

    let mut best: Option<PenetrationCandidate> = None;

    face_pass(capsule, obb, &mut best);
    edge_pass(capsule, obb, &mut best);

    if let Some(hit) = &best {
        trace!(
            "capsule-box hit: dir ({:.3},{:.3},{:.3}) depth {:.4}",
            hit.direction.x, hit.direction.y, hit.direction.z, hit.magnitude
        );
    }
    best
}

fn consider(best: &mut Option<PenetrationCandidate>, candidate: PenetrationCandidate) {
    // Deepest penetration wins; ties keep the earlier candidate
    match best {
        Some(current) if current.magnitude >= candidate.magnitude => {}
        _ => *best = Some(candidate),
    }
}

/// Face/interior pass, in box-local space where the box is axis-aligned.
/// Samples along the capsule centerline approximate continuous coverage;
/// step count scales with segment length over half a radius so adjacent
/// sample spheres overlap.
fn face_pass(capsule: &Capsule, obb: &OrientedBox, best: &mut Option<PenetrationCandidate>) {
    let la = obb.to_local(capsule.a);
    let lb = obb.to_local(capsule.b);
    let h = obb.half_extents;

    let seg_len = (lb - la).len();
    let steps = ((seg_len / (capsule.radius * 0.5)).ceil() as usize).max(2);

    for i in 0..steps {
        let t = i as f32 / (steps - 1) as f32;
        let p = la + (lb - la) * t;

        let clamped = Vec3::new(
            p.x.clamp(-h.x, h.x),
            p.y.clamp(-h.y, h.y),
            p.z.clamp(-h.z, h.z),
        );
        let delta = p - clamped;
        let dist = delta.len();
        if dist >= capsule.radius {
            continue;
        }

        let dir_local = if dist > EPSILON {
            delta.scale(1.0 / dist)
        } else {
            nearest_face_direction(p, h)
        };

        consider(best, PenetrationCandidate {
            direction: obb.to_world_dir(dir_local),
            magnitude: capsule.radius - dist,
            contact: obb.to_world(clamped),
        });
    }
}

/// Push direction for a sample on or inside the box: toward whichever
/// face is closest, by comparing per-axis depths.
fn nearest_face_direction(p: Vec3, h: Vec3) -> Vec3 {
    let dx = h.x - p.x.abs();
    let dy = h.y - p.y.abs();
    let dz = h.z - p.z.abs();

    if dx <= dy && dx <= dz {
        Vec3::new(if p.x >= 0.0 { 1.0 } else { -1.0 }, 0.0, 0.0)
    } else if dy <= dz {
        Vec3::new(0.0, if p.y >= 0.0 { 1.0 } else { -1.0 }, 0.0)
    } else {
        Vec3::new(0.0, 0.0, if p.z >= 0.0 { 1.0 } else { -1.0 })
    }
}

/// Edge pass, in world space: capsule segment against each box edge.
fn edge_pass(capsule: &Capsule, obb: &OrientedBox, best: &mut Option<PenetrationCandidate>) {
    let corners = obb.corners();

    for &(i, j) in &BOX_EDGES {
        let (on_capsule, on_edge) = closest_points_segments(capsule.a, capsule.b, corners[i], corners[j]);
        let delta = on_capsule - on_edge;
        let dist = delta.len();
        // dist below epsilon means the centerline crosses the edge
        // exactly; the face pass owns that configuration
        if dist >= capsule.radius || dist <= EPSILON {
            continue;
        }

        consider(best, PenetrationCandidate {
            direction: delta.scale(1.0 / dist),
            magnitude: capsule.radius - dist,
            contact: on_edge,
        });
    }
}

/// Closest points between segments [p1,q1] and [p2,q2].
///
/// Clamped parametric solve with degenerate fallbacks for segments whose
/// direction vector is near zero (point-capsules, crushed edges).
pub fn closest_points_segments(p1: Vec3, q1: Vec3, p2: Vec3, q2: Vec3) -> (Vec3, Vec3) {
    let d1 = q1 - p1;
    let d2 = q2 - p2;
    let r = p1 - p2;
    let a = d1.len_sq();
    let e = d2.len_sq();
    let f = d2.dot(r);

    if a <= EPSILON && e <= EPSILON {
        // Both segments are points
        return (p1, p2);
    }

    let mut s;
    let t;
    if a <= EPSILON {
        // First segment is a point
        s = 0.0;
        t = (f / e).clamp(0.0, 1.0);
    } else {
        let c = d1.dot(r);
        if e <= EPSILON {
            // Second segment is a point
            t = 0.0;
            s = (-c / a).clamp(0.0, 1.0);
        } else {
            let b = d1.dot(d2);
            let denom = a * e - b * b;

            // Parallel segments pick s = 0 and let t follow
            s = if denom > EPSILON {
                ((b * f - c * e) / denom).clamp(0.0, 1.0)
            } else {
                0.0
            };

            let t_nom = b * s + f;
            if t_nom < 0.0 {
                t = 0.0;
                s = (-c / a).clamp(0.0, 1.0);
            } else if t_nom > e {
                t = 1.0;
                s = ((b - c) / a).clamp(0.0, 1.0);
            } else {
                t = t_nom / e;
            }
        }
    }

    (p1 + d1 * s, p2 + d2 * t)
}

// =============================================================================
// Resolution
// =============================================================================

/// Apply a winning candidate to the actor: positional correction,
/// velocity slide, and grounded/ceiling classification.
///
/// - Position moves out along the push direction, no iteration.
/// - Velocity into the surface is removed, so the actor slides.
/// - A push steeper than [`WALKABLE_SLOPE`] grounds the actor; a push
///   steeper downward than -WALKABLE_SLOPE while moving up is a ceiling
///   hit and zeroes the vertical velocity.
pub fn apply_penetration(
    transform: &mut Transform,
    body: &mut KinematicBody,
    hit: &PenetrationCandidate,
) {
    transform.position = transform.position + hit.direction * hit.magnitude;

    let into = body.velocity.dot(hit.direction);
    if into < 0.0 {
        body.velocity = body.velocity - hit.direction * into;
    }

    if hit.direction.y > WALKABLE_SLOPE {
        body.grounded = true;
    } else if hit.direction.y < -WALKABLE_SLOPE && body.velocity.y > 0.0 {
        body.velocity.y = 0.0;
    }
}
