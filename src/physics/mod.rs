//! Compact rigid-body scene: arena-owned bodies and constraints, a
//! sequential-impulse solver, sphere/box contacts and flat-plate aerodynamics.

pub mod aerodynamics;
mod arena;
mod body;
mod collision;
mod constraint;
mod scene;
mod solver;

pub use arena::ArenaIndex;
pub use body::{
    AerodynamicSurface, Body, BodyDefinition, BodyDefinitionHandle, BodyHandle, BodyInfo,
    CollisionGroup, CollisionShape, MomentOfInertia,
};
pub use collision::BodyCollision;
pub use constraint::{
    positional_lock, ClampDirectionOffset, Constraint, ConstraintBodies, ConstraintHandle,
    ConstraintKind, CopyRotation, FixedPosition, HingedRod, MatchDirectionOffset,
    MatchDirections,
};
pub use scene::{PhysicsScene, SolverSettings};
