//! Rigid-body state for a single actor.

use crate::geom::{DVec2, from_polar, normalize_angle};

/// Position, velocity and heading of an actor.
///
/// `thrust` is a force along `dir` and `dir_vel` an angular velocity in
/// radians per second; both are written by the controller each tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Solid {
    /// Position.
    pub pos: DVec2,
    /// Velocity.
    pub vel: DVec2,
    /// Heading in `[0, TAU)`.
    pub dir: f64,
    /// Angular velocity.
    pub dir_vel: f64,
    /// Forward force.
    pub thrust: f64,
    /// Total mass.
    pub mass: f64,
}

impl Solid {
    /// A solid at rest in rotation with no engine force.
    #[must_use]
    pub fn new(mass: f64, dir: f64, pos: DVec2, vel: DVec2) -> Self {
        Self {
            pos,
            vel,
            dir: normalize_angle(dir),
            dir_vel: 0.0,
            thrust: 0.0,
            mass,
        }
    }

    /// Semi-implicit Euler step: heading, then velocity, then position.
    pub fn update(&mut self, dt: f64) {
        self.dir = normalize_angle(self.dir + self.dir_vel * dt);
        if self.mass > 0.0 {
            self.vel += from_polar(self.thrust / self.mass, self.dir) * dt;
        }
        self.pos += self.vel * dt;
    }

    /// Current speed.
    #[must_use]
    pub fn speed(&self) -> f64 {
        self.vel.length()
    }

    /// Pull the speed back towards `limit` without clipping it instantly.
    pub fn limit_speed(&mut self, limit: f64, dt: f64) {
        let speed = self.speed();
        if speed > limit {
            let decayed = (speed - limit) * (1.0 - 3.0 * dt).max(0.0) + limit;
            self.vel *= decayed / speed;
        }
    }
}
