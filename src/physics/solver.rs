use nalgebra::{Matrix3, UnitQuaternion, Vector3};

use super::collision::Contact;
use super::constraint::{Constraint, ConstraintKind};

/// Per-step copy of the body quantities the solver reads and writes.
#[derive(Debug, Clone)]
pub(crate) struct SolverBody {
    pub position: Vector3<f64>,
    pub rotation: UnitQuaternion<f64>,
    pub velocity: Vector3<f64>,
    pub angular_velocity: Vector3<f64>,
    pub inverse_mass: f64,
    /// World frame.
    pub inverse_inertia: Matrix3<f64>,
}

impl SolverBody {
    pub fn anchor(&self, radius: &Vector3<f64>) -> (Vector3<f64>, Vector3<f64>) {
        let arm = self.rotation * radius;
        (self.position + arm, arm)
    }
}

/// One scalar velocity constraint `J v + bias = 0` with bounded impulse.
#[derive(Debug, Clone)]
pub(crate) struct Row {
    a: Option<usize>,
    b: usize,
    linear_a: Vector3<f64>,
    angular_a: Vector3<f64>,
    linear_b: Vector3<f64>,
    angular_b: Vector3<f64>,
    bias: f64,
    lower: f64,
    upper: f64,
    effective_mass: f64,
    accumulated: f64,
}

/// Slot lookup for the two bodies of a constraint. `None` means the body is
/// gone and the constraint is skipped.
pub(crate) type Endpoints = (Option<usize>, usize);

pub(crate) struct RowBuilder<'a> {
    bodies: &'a [SolverBody],
    /// Baumgarte factor divided by the step.
    stiffness: f64,
    rows: Vec<Row>,
}

impl<'a> RowBuilder<'a> {
    pub fn new(bodies: &'a [SolverBody], baumgarte: f64, dt: f64) -> Self {
        Self {
            bodies,
            stiffness: baumgarte / dt,
            rows: Vec::new(),
        }
    }

    pub fn finish(self) -> Vec<Row> {
        self.rows
    }

    #[allow(clippy::too_many_arguments)]
    fn push(
        &mut self,
        (a, b): Endpoints,
        linear_a: Vector3<f64>,
        angular_a: Vector3<f64>,
        linear_b: Vector3<f64>,
        angular_b: Vector3<f64>,
        error: f64,
        lower: f64,
        upper: f64,
    ) {
        let body_b = &self.bodies[b];
        let mut k = body_b.inverse_mass * linear_b.norm_squared()
            + angular_b.dot(&(body_b.inverse_inertia * angular_b));
        if let Some(a) = a {
            let body_a = &self.bodies[a];
            k += body_a.inverse_mass * linear_a.norm_squared()
                + angular_a.dot(&(body_a.inverse_inertia * angular_a));
        }
        if k <= 1e-12 {
            return;
        }
        self.rows.push(Row {
            a,
            b,
            linear_a,
            angular_a,
            linear_b,
            angular_b,
            bias: self.stiffness * error,
            lower,
            upper,
            effective_mass: 1.0 / k,
            accumulated: 0.0,
        });
    }

    fn linear(
        &mut self,
        endpoints: Endpoints,
        arm_a: Vector3<f64>,
        arm_b: Vector3<f64>,
        direction: Vector3<f64>,
        error: f64,
        lower: f64,
        upper: f64,
    ) {
        self.push(
            endpoints,
            -direction,
            -arm_a.cross(&direction),
            direction,
            arm_b.cross(&direction),
            error,
            lower,
            upper,
        );
    }

    fn angular(&mut self, endpoints: Endpoints, axis: Vector3<f64>, error: f64) {
        self.push(
            endpoints,
            Vector3::zeros(),
            -axis,
            Vector3::zeros(),
            axis,
            error,
            f64::NEG_INFINITY,
            f64::INFINITY,
        );
    }

    pub fn add_constraint(&mut self, constraint: &Constraint, endpoints: Endpoints) {
        let (a, b) = endpoints;
        let bodies = self.bodies;
        let body_b = &bodies[b];
        let body_a = a.map(|a| &bodies[a]);

        match (&constraint.kind, body_a) {
            (ConstraintKind::MatchDirectionOffset(c), Some(body_a)) => {
                let (point_a, arm_a) = body_a.anchor(&c.primary_radius);
                let (point_b, arm_b) = body_b.anchor(&c.secondary_radius);
                let direction = body_a.rotation * c.direction;
                let error = direction.dot(&(point_b - point_a)) - c.offset;
                self.linear(
                    endpoints,
                    arm_a,
                    arm_b,
                    direction,
                    error,
                    f64::NEG_INFINITY,
                    f64::INFINITY,
                );
            }
            (ConstraintKind::ClampDirectionOffset(c), Some(body_a)) => {
                let (point_a, arm_a) = body_a.anchor(&c.primary_radius);
                let (point_b, arm_b) = body_b.anchor(&c.secondary_radius);
                let direction = body_a.rotation * c.direction;
                let value = direction.dot(&(point_b - point_a));
                if value < c.min {
                    self.linear(
                        endpoints,
                        arm_a,
                        arm_b,
                        direction,
                        value - c.min,
                        0.0,
                        f64::INFINITY,
                    );
                } else if value > c.max {
                    self.linear(
                        endpoints,
                        arm_a,
                        arm_b,
                        direction,
                        value - c.max,
                        f64::NEG_INFINITY,
                        0.0,
                    );
                }
            }
            (ConstraintKind::MatchDirections(c), Some(body_a)) => {
                let primary = body_a.rotation * c.primary_direction();
                let secondary = body_b.rotation * c.secondary_direction();
                let misalignment = primary.cross(&secondary);
                let (first, second) = tangent_basis(&primary);
                self.angular(endpoints, first, first.dot(&misalignment));
                self.angular(endpoints, second, second.dot(&misalignment));
            }
            (ConstraintKind::CopyRotation(c), Some(body_a)) => {
                let relative = c.relative.unwrap_or_else(UnitQuaternion::identity);
                let target = body_a.rotation * relative;
                let misalignment = (body_b.rotation * target.inverse()).scaled_axis();
                for axis in [Vector3::x(), Vector3::y(), Vector3::z()] {
                    self.angular(endpoints, axis, axis.dot(&misalignment));
                }
            }
            (ConstraintKind::HingedRod(c), Some(body_a)) => {
                let delta = body_b.position - body_a.position;
                let distance = delta.norm();
                if let Some(direction) = delta.try_normalize(1e-9) {
                    self.linear(
                        endpoints,
                        Vector3::zeros(),
                        Vector3::zeros(),
                        direction,
                        distance - c.length(),
                        f64::NEG_INFINITY,
                        f64::INFINITY,
                    );
                }
            }
            (ConstraintKind::FixedPosition(c), None) => {
                let (point_b, arm_b) = body_b.anchor(&c.radius);
                let delta = point_b - c.anchor;
                for axis in [Vector3::x(), Vector3::y(), Vector3::z()] {
                    self.linear(
                        endpoints,
                        Vector3::zeros(),
                        arm_b,
                        axis,
                        axis.dot(&delta),
                        f64::NEG_INFINITY,
                        f64::INFINITY,
                    );
                }
            }
            // Pair kinds on a single body (and vice versa) carry no meaning.
            _ => {}
        }
    }

    pub fn add_contact(&mut self, endpoints: Endpoints, contact: &Contact, restitution: f64) {
        let (a, b) = endpoints;
        let arm_b = contact.point - self.bodies[b].position;
        let arm_a = a
            .map(|a| contact.point - self.bodies[a].position)
            .unwrap_or_else(Vector3::zeros);

        // Bounce only off the approach speed; penetration is handled by bias.
        let approach = self.relative_normal_velocity(endpoints, &arm_a, &arm_b, &contact.normal);
        let bounce = if approach < -1.0 {
            restitution * approach
        } else {
            0.0
        };
        let error = -contact.depth + bounce / self.stiffness.max(1e-9);
        self.linear(
            endpoints,
            arm_a,
            arm_b,
            contact.normal,
            error,
            0.0,
            f64::INFINITY,
        );
    }

    fn relative_normal_velocity(
        &self,
        (a, b): Endpoints,
        arm_a: &Vector3<f64>,
        arm_b: &Vector3<f64>,
        normal: &Vector3<f64>,
    ) -> f64 {
        let body_b = &self.bodies[b];
        let mut relative = body_b.velocity + body_b.angular_velocity.cross(arm_b);
        if let Some(a) = a {
            let body_a = &self.bodies[a];
            relative -= body_a.velocity + body_a.angular_velocity.cross(arm_a);
        }
        relative.dot(normal)
    }
}

/// Projected Gauss-Seidel over the rows.
pub(crate) fn solve(rows: &mut [Row], bodies: &mut [SolverBody], iterations: usize) {
    for _ in 0..iterations {
        for row in rows.iter_mut() {
            let mut jv = row.linear_b.dot(&bodies[row.b].velocity)
                + row.angular_b.dot(&bodies[row.b].angular_velocity);
            if let Some(a) = row.a {
                jv += row.linear_a.dot(&bodies[a].velocity)
                    + row.angular_a.dot(&bodies[a].angular_velocity);
            }

            let lambda = -(jv + row.bias) * row.effective_mass;
            let previous = row.accumulated;
            row.accumulated = (previous + lambda).clamp(row.lower, row.upper);
            let delta = row.accumulated - previous;
            if delta == 0.0 {
                continue;
            }

            let body_b = &mut bodies[row.b];
            body_b.velocity += row.linear_b * (body_b.inverse_mass * delta);
            body_b.angular_velocity += body_b.inverse_inertia * row.angular_b * delta;
            if let Some(a) = row.a {
                let body_a = &mut bodies[a];
                body_a.velocity += row.linear_a * (body_a.inverse_mass * delta);
                body_a.angular_velocity += body_a.inverse_inertia * row.angular_a * delta;
            }
        }
    }
}

/// Two unit vectors orthogonal to `normal` and to each other.
fn tangent_basis(normal: &Vector3<f64>) -> (Vector3<f64>, Vector3<f64>) {
    let helper = if normal.x.abs() < 0.9 {
        Vector3::x()
    } else {
        Vector3::y()
    };
    let first = normal.cross(&helper).normalize();
    let second = normal.cross(&first);
    (first, second)
}
