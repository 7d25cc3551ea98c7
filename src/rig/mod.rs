//! Builders that turn authored skeletons into constrained body assemblies.

mod airplane;
mod ball;
mod error;
pub mod parts;
mod skeleton;

pub use airplane::{counterweight_offset, AirplaneRig};
pub use ball::BallRig;
pub use error::RigError;
pub use skeleton::{AirplaneNodes, BallNodes, ModelSkeleton, PlayData, ResolvedNode, SkeletonNode};
