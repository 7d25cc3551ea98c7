use nalgebra::{UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::error::RigError;
use crate::resources::ConfigError;

/// One named attachment point of an authored model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkeletonNode {
    pub name: String,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default = "Vector3::zeros")]
    pub translation: Vector3<f64>,
    #[serde(default = "UnitQuaternion::identity")]
    pub rotation: UnitQuaternion<f64>,
}

impl SkeletonNode {
    pub fn new(name: &str, translation: Vector3<f64>) -> Self {
        Self {
            name: name.to_string(),
            parent: None,
            translation,
            rotation: UnitQuaternion::identity(),
        }
    }

    pub fn with_parent(mut self, parent: &str) -> Self {
        self.parent = Some(parent.to_string());
        self
    }
}

/// Node resolved to model space.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedNode {
    pub name: String,
    pub translation: Vector3<f64>,
    pub rotation: UnitQuaternion<f64>,
}

/// Named node hierarchy of a model, with local transforms relative to the
/// parent node (or the model origin for roots).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSkeleton {
    pub name: String,
    pub nodes: Vec<SkeletonNode>,
}

impl ModelSkeleton {
    pub fn new(name: &str, nodes: Vec<SkeletonNode>) -> Self {
        Self {
            name: name.to_string(),
            nodes,
        }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&contents)?)
    }

    pub fn find(&self, name: &str) -> Option<&SkeletonNode> {
        self.nodes.iter().find(|node| node.name == name)
    }

    /// Model-space transform of the named node.
    pub fn resolve(&self, name: &str) -> Result<ResolvedNode, RigError> {
        let mut node = self.find(name).ok_or_else(|| RigError::MissingNode {
            model: self.name.clone(),
            node: name.to_string(),
        })?;

        let mut translation = node.translation;
        let mut rotation = node.rotation;
        let mut depth = 0;
        while let Some(parent_name) = &node.parent {
            depth += 1;
            let parent = self.find(parent_name).filter(|_| depth <= self.nodes.len());
            let Some(parent) = parent else {
                return Err(RigError::BrokenHierarchy {
                    model: self.name.clone(),
                    node: name.to_string(),
                });
            };
            translation = parent.translation + parent.rotation * translation;
            rotation = parent.rotation * rotation;
            node = parent;
        }

        Ok(ResolvedNode {
            name: name.to_string(),
            translation,
            rotation,
        })
    }

    /// Authored airplane layout: +Z forward, +X towards the left wing, +Y up.
    pub fn airplane() -> Self {
        Self::new(
            "Airplane",
            vec![
                SkeletonNode::new("Body", Vector3::zeros()),
                SkeletonNode::new("LeftAileron", Vector3::new(6.0, 0.0, -2.9)).with_parent("Body"),
                SkeletonNode::new("RightAileron", Vector3::new(-6.0, 0.0, -2.9))
                    .with_parent("Body"),
                SkeletonNode::new("Elevators", Vector3::new(0.0, 0.75, -9.6)).with_parent("Body"),
                SkeletonNode::new("Rudder", Vector3::new(0.0, 1.8, -9.6)).with_parent("Body"),
                SkeletonNode::new("Propeller", Vector3::new(0.0, 0.0, 6.1)).with_parent("Body"),
            ],
        )
    }

    /// Authored tether layout: hinge at the origin, ball eight metres below.
    pub fn ball() -> Self {
        Self::new(
            "Ball",
            vec![
                SkeletonNode::new("UpperNode", Vector3::zeros()),
                SkeletonNode::new("LowerNode", Vector3::new(0.0, -8.0, 0.0))
                    .with_parent("UpperNode"),
                SkeletonNode::new("BallNode", Vector3::zeros()).with_parent("LowerNode"),
            ],
        )
    }
}

/// Airplane nodes, resolved up front so a missing name fails before any body
/// exists.
#[derive(Debug, Clone, PartialEq)]
pub struct AirplaneNodes {
    pub body: ResolvedNode,
    pub left_aileron: ResolvedNode,
    pub right_aileron: ResolvedNode,
    pub elevators: ResolvedNode,
    pub rudder: ResolvedNode,
    pub propeller: ResolvedNode,
}

impl AirplaneNodes {
    pub fn resolve(skeleton: &ModelSkeleton) -> Result<Self, RigError> {
        Ok(Self {
            body: skeleton.resolve("Body")?,
            left_aileron: skeleton.resolve("LeftAileron")?,
            right_aileron: skeleton.resolve("RightAileron")?,
            elevators: skeleton.resolve("Elevators")?,
            rudder: skeleton.resolve("Rudder")?,
            propeller: skeleton.resolve("Propeller")?,
        })
    }

    /// Offset of a node from the torso origin.
    pub fn offset(&self, node: &ResolvedNode) -> Vector3<f64> {
        node.translation - self.body.translation
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BallNodes {
    pub upper: ResolvedNode,
    pub lower: ResolvedNode,
    pub ball: ResolvedNode,
}

impl BallNodes {
    pub fn resolve(skeleton: &ModelSkeleton) -> Result<Self, RigError> {
        Ok(Self {
            upper: skeleton.resolve("UpperNode")?,
            lower: skeleton.resolve("LowerNode")?,
            ball: skeleton.resolve("BallNode")?,
        })
    }

    /// Hinge-to-ball vector as authored.
    pub fn tether(&self) -> Vector3<f64> {
        self.lower.translation - self.upper.translation
    }
}

/// Authored models a play session is assembled from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayData {
    pub airplane: ModelSkeleton,
    pub ball: ModelSkeleton,
}

impl Default for PlayData {
    fn default() -> Self {
        Self {
            airplane: ModelSkeleton::airplane(),
            ball: ModelSkeleton::ball(),
        }
    }
}

impl PlayData {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&contents)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_resolve_walks_parent_chain() {
        let skeleton = ModelSkeleton::new(
            "Test",
            vec![
                SkeletonNode {
                    name: "Root".to_string(),
                    parent: None,
                    translation: Vector3::new(1.0, 0.0, 0.0),
                    rotation: UnitQuaternion::from_axis_angle(
                        &Vector3::y_axis(),
                        std::f64::consts::FRAC_PI_2,
                    ),
                },
                SkeletonNode::new("Child", Vector3::new(0.0, 0.0, 2.0)).with_parent("Root"),
            ],
        );
        let child = skeleton.resolve("Child").unwrap();
        // +Z turned a quarter about +Y points along +X.
        assert_relative_eq!(child.translation, Vector3::new(3.0, 0.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn test_missing_node_is_reported() {
        let mut skeleton = ModelSkeleton::airplane();
        skeleton.nodes.retain(|node| node.name != "Rudder");
        assert_eq!(
            AirplaneNodes::resolve(&skeleton),
            Err(RigError::MissingNode {
                model: "Airplane".to_string(),
                node: "Rudder".to_string(),
            })
        );
    }

    #[test]
    fn test_parent_cycle_is_reported() {
        let skeleton = ModelSkeleton::new(
            "Loop",
            vec![
                SkeletonNode::new("A", Vector3::zeros()).with_parent("B"),
                SkeletonNode::new("B", Vector3::zeros()).with_parent("A"),
            ],
        );
        assert!(matches!(
            skeleton.resolve("A"),
            Err(RigError::BrokenHierarchy { .. })
        ));
    }

    #[test]
    fn test_default_ball_tether_length() {
        let nodes = BallNodes::resolve(&ModelSkeleton::ball()).unwrap();
        assert_relative_eq!(nodes.tether().norm(), 8.0);
        assert_eq!(nodes.ball.translation, nodes.lower.translation);
    }

    #[test]
    fn test_skeleton_yaml_round_trip() {
        let yaml = r#"
name: Ball
nodes:
  - name: UpperNode
  - name: LowerNode
    parent: UpperNode
    translation: [0.0, -5.0, 0.0]
  - name: BallNode
    parent: LowerNode
"#;
        let skeleton: ModelSkeleton = serde_yaml::from_str(yaml).unwrap();
        let nodes = BallNodes::resolve(&skeleton).unwrap();
        assert_relative_eq!(nodes.tether().norm(), 5.0);
    }

    #[test]
    fn test_play_data_loads_from_yaml() {
        let yaml = r#"
airplane:
  name: Airplane
  nodes:
    - name: Body
    - name: LeftAileron
      parent: Body
      translation: [6.0, 0.0, -2.9]
    - name: RightAileron
      parent: Body
      translation: [-6.0, 0.0, -2.9]
    - name: Elevators
      parent: Body
      translation: [0.0, 0.75, -9.6]
    - name: Rudder
      parent: Body
      translation: [0.0, 1.8, -9.6]
    - name: Propeller
      parent: Body
      translation: [0.0, 0.0, 6.1]
ball:
  name: Ball
  nodes:
    - name: UpperNode
    - name: LowerNode
      parent: UpperNode
      translation: [0.0, -6.0, 0.0]
    - name: BallNode
      parent: LowerNode
"#;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, yaml.as_bytes()).unwrap();

        let data = PlayData::load(file.path()).unwrap();
        assert_eq!(data.airplane, ModelSkeleton::airplane());
        let nodes = BallNodes::resolve(&data.ball).unwrap();
        assert_relative_eq!(nodes.tether(), Vector3::new(0.0, -6.0, 0.0));
    }
}
