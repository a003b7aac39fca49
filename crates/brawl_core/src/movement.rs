//! Fighter kinematics: walking, jumping, dashing, gravity and stage bounds.
//!
//! Velocities are in units per second and integrated once per tick.

use serde::{Deserialize, Serialize};

use crate::config::CombatConfig;
use crate::data::FighterDefinition;
use crate::fighter::Facing;
use crate::math::{fixed_serde, Fixed, Vec2Fixed};

/// Horizontal speeds below this snap to zero under friction.
fn rest_threshold() -> Fixed {
    Fixed::from_num(1) / Fixed::from_num(100)
}

/// Position and velocity of a fighter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Body {
    /// World position of the fighter's feet.
    pub position: Vec2Fixed,
    /// Velocity in units per second.
    pub velocity: Vec2Fixed,
    /// Standing on the ground.
    pub grounded: bool,
    /// Ticks of dash left.
    pub dash_ticks: u32,
    /// Dash direction, `1` or `-1`.
    #[serde(with = "fixed_serde")]
    pub dash_direction: Fixed,
}

impl Body {
    /// A grounded body at rest.
    #[must_use]
    pub const fn at(position: Vec2Fixed) -> Self {
        Self {
            position,
            velocity: Vec2Fixed::ZERO,
            grounded: true,
            dash_ticks: 0,
            dash_direction: Fixed::ZERO,
        }
    }

    /// Whether a dash is in progress.
    #[must_use]
    pub const fn is_dashing(&self) -> bool {
        self.dash_ticks > 0
    }

    /// Add an instantaneous velocity change.
    pub fn apply_impulse(&mut self, impulse: Vec2Fixed) {
        self.velocity += impulse;
        if impulse.y > Fixed::ZERO {
            self.grounded = false;
        }
    }

    /// Begin a dash lasting `ticks`.
    ///
    /// Dashes follow the movement axis, or go backward when it is neutral.
    pub fn start_dash(&mut self, axis: Fixed, facing: Facing, ticks: u32) {
        self.dash_direction = if axis > Fixed::ZERO {
            Fixed::ONE
        } else if axis < Fixed::ZERO {
            -Fixed::ONE
        } else {
            -facing.sign()
        };
        self.dash_ticks = ticks;
    }
}

/// Per-tick movement input for one fighter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MovementInput {
    /// Horizontal axis in `[-1, 1]`.
    pub axis: Fixed,
    /// Jump requested.
    pub jump: bool,
    /// Whether the fighter may walk and jump.
    pub can_act: bool,
    /// Combined status speed multiplier.
    pub speed_multiplier: Fixed,
}

/// Integrate one tick of movement.
pub fn integrate(
    body: &mut Body,
    input: MovementInput,
    definition: &FighterDefinition,
    config: &CombatConfig,
) {
    let dt = config.tick_seconds();
    let axis = input.axis.clamp(-Fixed::ONE, Fixed::ONE);

    // Step 1: horizontal velocity
    if body.is_dashing() {
        body.velocity.x = body.dash_direction * definition.dash_speed;
        body.dash_ticks -= 1;
    } else if input.can_act && axis != Fixed::ZERO {
        let control = if body.grounded {
            Fixed::ONE
        } else {
            config.air_control
        };
        body.velocity.x = axis
            .saturating_mul(definition.move_speed)
            .saturating_mul(input.speed_multiplier)
            .saturating_mul(control);
    } else if body.grounded {
        body.velocity.x *= config.friction;
        if body.velocity.x.abs() < rest_threshold() {
            body.velocity.x = Fixed::ZERO;
        }
    }

    // Step 2: jump
    if input.jump && input.can_act && body.grounded {
        body.velocity.y = definition.jump_force;
        body.grounded = false;
    }

    // Step 3: gravity
    if !body.grounded {
        body.velocity.y -= config.gravity * dt;
        body.velocity.y = body.velocity.y.max(-config.max_fall_speed);
    }

    // Step 4: integrate position
    body.position += body.velocity.scale(dt);

    // Step 5: floor
    if body.position.y <= config.ground_level && body.velocity.y <= Fixed::ZERO {
        body.position.y = config.ground_level;
        body.velocity.y = Fixed::ZERO;
        body.grounded = true;
    }

    // Step 6: walls
    let half_width = config.stage_half_width;
    if body.position.x < -half_width || body.position.x > half_width {
        body.position.x = body.position.x.clamp(-half_width, half_width);
        body.velocity.x = Fixed::ZERO;
    }
}

/// Facing toward `opponent_x`, keeping the current facing when level.
#[must_use]
pub fn face_toward(current: Facing, own_x: Fixed, opponent_x: Fixed) -> Facing {
    if opponent_x > own_x {
        Facing::Right
    } else if opponent_x < own_x {
        Facing::Left
    } else {
        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn definition() -> FighterDefinition {
        FighterDefinition::new("dummy", "jab", "haymaker")
    }

    fn walking(axis: i32) -> MovementInput {
        MovementInput {
            axis: Fixed::from_num(axis),
            jump: false,
            can_act: true,
            speed_multiplier: Fixed::ONE,
        }
    }

    #[test]
    fn test_walk_speed() {
        let config = CombatConfig::default();
        let mut body = Body::at(Vec2Fixed::ZERO);
        for _ in 0..60 {
            integrate(&mut body, walking(1), &definition(), &config);
        }
        // 5 units per second for one second
        assert!((body.position.x - Fixed::from_num(5)).abs() < Fixed::from_num(0.001));
    }

    #[test]
    fn test_cannot_walk_while_locked() {
        let config = CombatConfig::default();
        let mut body = Body::at(Vec2Fixed::ZERO);
        let input = MovementInput {
            can_act: false,
            ..walking(1)
        };
        integrate(&mut body, input, &definition(), &config);
        assert_eq!(body.position, Vec2Fixed::ZERO);
    }

    #[test]
    fn test_jump_lands() {
        let config = CombatConfig::default();
        let mut body = Body::at(Vec2Fixed::ZERO);
        let jump = MovementInput {
            jump: true,
            ..walking(0)
        };
        integrate(&mut body, jump, &definition(), &config);
        assert!(!body.grounded);
        assert!(body.position.y > Fixed::ZERO);

        let mut ticks = 1;
        while !body.grounded && ticks < 600 {
            integrate(&mut body, walking(0), &definition(), &config);
            ticks += 1;
        }
        assert!(body.grounded);
        assert_eq!(body.position.y, Fixed::ZERO);
        // Roughly 2 × jump_force / gravity seconds of airtime
        assert!((35..=45).contains(&ticks), "airtime {ticks}");
    }

    #[test]
    fn test_friction_stops_knockback() {
        let config = CombatConfig::default();
        let mut body = Body::at(Vec2Fixed::ZERO);
        body.apply_impulse(Vec2Fixed::from_ints(6, 0));
        for _ in 0..100 {
            integrate(&mut body, walking(0), &definition(), &config);
        }
        assert_eq!(body.velocity.x, Fixed::ZERO);
        assert!(body.position.x > Fixed::ZERO);
    }

    #[test]
    fn test_dash_defaults_backward() {
        let config = CombatConfig::default();
        let mut body = Body::at(Vec2Fixed::ZERO);
        body.start_dash(Fixed::ZERO, Facing::Right, 18);
        integrate(&mut body, walking(0), &definition(), &config);
        assert_eq!(body.velocity.x, -definition().dash_speed);
        assert_eq!(body.dash_ticks, 17);
    }

    #[test]
    fn test_stage_bounds() {
        let config = CombatConfig::default();
        let mut body = Body::at(Vec2Fixed::from_ints(10, 0));
        integrate(&mut body, walking(1), &definition(), &config);
        assert_eq!(body.position.x, config.stage_half_width);
        assert_eq!(body.velocity.x, Fixed::ZERO);
    }

    #[test]
    fn test_face_toward() {
        assert_eq!(
            face_toward(Facing::Right, Fixed::ONE, Fixed::ZERO),
            Facing::Left
        );
        assert_eq!(
            face_toward(Facing::Left, Fixed::ZERO, Fixed::ZERO),
            Facing::Left
        );
    }
}
