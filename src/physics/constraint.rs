use nalgebra::{UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

use super::arena::ArenaIndex;
use super::body::BodyHandle;

/// Handle to a constraint living in a [`super::PhysicsScene`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConstraintHandle(pub(crate) ArenaIndex);

/// Bodies a constraint acts on. A single-body constraint ties its body to
/// world space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintBodies {
    Pair {
        primary: BodyHandle,
        secondary: BodyHandle,
    },
    Single(BodyHandle),
}

impl ConstraintBodies {
    pub fn involves(&self, body: BodyHandle) -> bool {
        match *self {
            ConstraintBodies::Pair { primary, secondary } => primary == body || secondary == body,
            ConstraintBodies::Single(single) => single == body,
        }
    }
}

/// Keeps the secondary anchor at `offset` from the primary anchor when
/// measured along `direction` (primary body frame).
#[derive(Debug, Clone, PartialEq)]
pub struct MatchDirectionOffset {
    pub primary_radius: Vector3<f64>,
    pub secondary_radius: Vector3<f64>,
    pub direction: Vector3<f64>,
    pub offset: f64,
}

impl Default for MatchDirectionOffset {
    fn default() -> Self {
        Self {
            primary_radius: Vector3::zeros(),
            secondary_radius: Vector3::zeros(),
            direction: Vector3::x(),
            offset: 0.0,
        }
    }
}

impl MatchDirectionOffset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_primary_radius(mut self, radius: Vector3<f64>) -> Self {
        self.primary_radius = radius;
        self
    }

    pub fn with_secondary_radius(mut self, radius: Vector3<f64>) -> Self {
        self.secondary_radius = radius;
        self
    }

    pub fn with_direction(mut self, direction: Vector3<f64>) -> Self {
        self.direction = unit_or(direction, Vector3::x());
        self
    }

    pub fn with_offset(mut self, offset: f64) -> Self {
        self.offset = offset;
        self
    }
}

/// Rotates the secondary body until its `secondary_direction` matches the
/// primary body's `primary_direction`. Rotation about the matched axis is free.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchDirections {
    primary_direction: Vector3<f64>,
    secondary_direction: Vector3<f64>,
}

impl Default for MatchDirections {
    fn default() -> Self {
        Self {
            primary_direction: Vector3::z(),
            secondary_direction: Vector3::z(),
        }
    }
}

impl MatchDirections {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_primary_direction(mut self, direction: Vector3<f64>) -> Self {
        self.set_primary_direction(direction);
        self
    }

    pub fn with_secondary_direction(mut self, direction: Vector3<f64>) -> Self {
        self.secondary_direction = unit_or(direction, self.secondary_direction);
        self
    }

    /// Retargets the constraint. Degenerate input keeps the previous target.
    pub fn set_primary_direction(&mut self, direction: Vector3<f64>) {
        self.primary_direction = unit_or(direction, self.primary_direction);
    }

    pub fn primary_direction(&self) -> Vector3<f64> {
        self.primary_direction
    }

    pub fn secondary_direction(&self) -> Vector3<f64> {
        self.secondary_direction
    }
}

/// Locks the relative orientation of the two bodies to what it was when the
/// constraint was created.
#[derive(Debug, Clone, PartialEq)]
pub struct CopyRotation {
    pub(crate) relative: Option<UnitQuaternion<f64>>,
}

impl CopyRotation {
    pub fn new() -> Self {
        Self { relative: None }
    }
}

impl Default for CopyRotation {
    fn default() -> Self {
        Self::new()
    }
}

/// Keeps the anchor offset measured along `direction` (primary frame) inside
/// `[min, max]`. Inactive while inside the range.
#[derive(Debug, Clone, PartialEq)]
pub struct ClampDirectionOffset {
    pub primary_radius: Vector3<f64>,
    pub secondary_radius: Vector3<f64>,
    pub direction: Vector3<f64>,
    pub min: f64,
    pub max: f64,
}

impl ClampDirectionOffset {
    pub fn new(direction: Vector3<f64>, min: f64, max: f64) -> Self {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        Self {
            primary_radius: Vector3::zeros(),
            secondary_radius: Vector3::zeros(),
            direction: unit_or(direction, Vector3::y()),
            min,
            max,
        }
    }
}

/// Fixed-length massless rod between the two body origins.
#[derive(Debug, Clone, PartialEq)]
pub struct HingedRod {
    length: f64,
}

impl HingedRod {
    pub fn new(length: f64) -> Self {
        Self {
            length: length.max(0.0),
        }
    }

    pub fn length(&self) -> f64 {
        self.length
    }
}

/// Pins a point of a single body to a world-space anchor.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedPosition {
    pub anchor: Vector3<f64>,
    pub radius: Vector3<f64>,
}

impl FixedPosition {
    pub fn new(anchor: Vector3<f64>) -> Self {
        Self {
            anchor,
            radius: Vector3::zeros(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConstraintKind {
    MatchDirectionOffset(MatchDirectionOffset),
    MatchDirections(MatchDirections),
    CopyRotation(CopyRotation),
    ClampDirectionOffset(ClampDirectionOffset),
    HingedRod(HingedRod),
    FixedPosition(FixedPosition),
}

impl From<MatchDirectionOffset> for ConstraintKind {
    fn from(value: MatchDirectionOffset) -> Self {
        ConstraintKind::MatchDirectionOffset(value)
    }
}

impl From<MatchDirections> for ConstraintKind {
    fn from(value: MatchDirections) -> Self {
        ConstraintKind::MatchDirections(value)
    }
}

impl From<CopyRotation> for ConstraintKind {
    fn from(value: CopyRotation) -> Self {
        ConstraintKind::CopyRotation(value)
    }
}

impl From<ClampDirectionOffset> for ConstraintKind {
    fn from(value: ClampDirectionOffset) -> Self {
        ConstraintKind::ClampDirectionOffset(value)
    }
}

impl From<HingedRod> for ConstraintKind {
    fn from(value: HingedRod) -> Self {
        ConstraintKind::HingedRod(value)
    }
}

impl From<FixedPosition> for ConstraintKind {
    fn from(value: FixedPosition) -> Self {
        ConstraintKind::FixedPosition(value)
    }
}

#[derive(Debug, Clone)]
pub struct Constraint {
    pub bodies: ConstraintBodies,
    pub kind: ConstraintKind,
}

/// The three world-axis offset locks that pin a point of `secondary` to a
/// point of `primary`.
pub fn positional_lock(primary_radius: Vector3<f64>) -> [MatchDirectionOffset; 3] {
    [Vector3::x(), Vector3::z(), Vector3::y()].map(|axis| {
        MatchDirectionOffset::new()
            .with_primary_radius(primary_radius)
            .with_secondary_radius(Vector3::zeros())
            .with_direction(axis)
            .with_offset(0.0)
    })
}

fn unit_or(direction: Vector3<f64>, fallback: Vector3<f64>) -> Vector3<f64> {
    direction.try_normalize(1e-9).unwrap_or(fallback)
}
