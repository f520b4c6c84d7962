//! Core Components
//!
//! The plain data records exchanged between the registry and its
//! collaborators. Components carry no behavior - movement and collision
//! systems read and write them, renderers read them.
//!
//! The core assigns no further semantics to these: a renderer is free to
//! interpret `Transform.scale`, an animation layer is free to read
//! `KinematicBody.grounded`. Register each with the registry at startup,
//! in a fixed order.

use serde::{Serialize, Deserialize};
use crate::math::{Mat4, Vec3, mat4_from_position_rotation};

// =============================================================================
// Transform
// =============================================================================

/// World-space placement of an entity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Transform {
    /// Position in world space
    pub position: Vec3,
    /// Rotation in euler angles (degrees), order Z * Y * X
    pub rotation: Vec3,
    /// Uniform scale factor
    pub scale: f32,
}

impl Transform {
    /// Identity transform (origin, no rotation, scale 1)
    pub const IDENTITY: Transform = Transform {
        position: Vec3::ZERO,
        rotation: Vec3::ZERO,
        scale: 1.0,
    };

    /// Create transform at a position
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            rotation: Vec3::ZERO,
            scale: 1.0,
        }
    }

    /// Create transform with position and rotation
    pub fn from_position_rotation(position: Vec3, rotation: Vec3) -> Self {
        Self {
            position,
            rotation,
            scale: 1.0,
        }
    }

    /// Convert to a 4x4 transformation matrix
    pub fn to_matrix(&self) -> Mat4 {
        let base = mat4_from_position_rotation(self.position, self.rotation);
        if (self.scale - 1.0).abs() < 0.0001 {
            base
        } else {
            let mut result = base;
            for row in result.iter_mut().take(3) {
                for cell in row.iter_mut().take(3) {
                    *cell *= self.scale;
                }
            }
            result
        }
    }

    /// Translate by an offset
    pub fn translate(&mut self, offset: Vec3) {
        self.position = self.position + offset;
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

// =============================================================================
// Collider Shapes
// =============================================================================

/// Static obstacle shape: a box with the entity's transform applied.
/// Half-extents are in local space, before rotation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BoxCollider {
    pub half_extents: Vec3,
}

impl BoxCollider {
    pub fn new(hx: f32, hy: f32, hz: f32) -> Self {
        Self {
            half_extents: Vec3::new(hx, hy, hz),
        }
    }
}

/// Dynamic actor shape: a vertical capsule standing on the entity's
/// position. Total height includes both sphere caps; factories should
/// keep `height >= 2.0 * radius` (shorter capsules degenerate to a
/// sphere, which the resolver handles but movement code rarely wants).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CapsuleCollider {
    pub radius: f32,
    pub height: f32,
}

impl CapsuleCollider {
    pub fn new(radius: f32, height: f32) -> Self {
        Self { radius, height }
    }
}

// =============================================================================
// Movement
// =============================================================================

/// Movement state for a dynamic actor.
///
/// `grounded` is re-derived every frame: the movement pass clears it,
/// the physics pass sets it when a sufficiently upward-facing contact
/// supports the actor. Animation and jump logic read it after physics.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct KinematicBody {
    /// World-space velocity, units per second
    pub velocity: Vec3,
    /// Supported by a walkable surface this frame?
    pub grounded: bool,
}

impl KinematicBody {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_velocity(velocity: Vec3) -> Self {
        Self {
            velocity,
            grounded: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_to_matrix() {
        let t = Transform::from_position(Vec3::new(10.0, 20.0, 30.0));
        let m = t.to_matrix();

        // Translation should be in the last column
        assert!((m[0][3] - 10.0).abs() < 0.001);
        assert!((m[1][3] - 20.0).abs() < 0.001);
        assert!((m[2][3] - 30.0).abs() < 0.001);
    }

    #[test]
    fn test_transform_scale_leaves_translation() {
        let mut t = Transform::from_position(Vec3::new(1.0, 2.0, 3.0));
        t.scale = 2.0;
        let m = t.to_matrix();
        assert!((m[0][0] - 2.0).abs() < 0.001);
        assert!((m[0][3] - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_body_defaults_airborne() {
        let body = KinematicBody::new();
        assert!(!body.grounded);
        assert_eq!(body.velocity, Vec3::ZERO);
    }
}
