//! Vehicle tuning configuration.
//!
//! Vehicles are defined as data: every struct here (de)serializes with
//! serde so a complete vehicle can be described in a RON file and loaded by
//! a host. Defaults describe the stock city bus.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// Which axle receives motor torque.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axle {
    /// Front-wheel drive (the simpler vehicle variant).
    Front,
    /// Rear-wheel drive.
    Rear,
}

/// Drivetrain and pedal-response configuration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct DriveConfig {
    /// Motor torque at full throttle.
    pub motor_force: f32,
    /// Brake torque at full brake.
    pub brake_force: f32,
    /// Reverse motor torque at full (brake) pedal.
    pub reverse_force: f32,
    /// Passive decelerating torque while coasting.
    pub engine_brake_force: f32,
    /// Pedal-level rise rate toward 1, per second.
    pub acceleration_rate: f32,
    /// Pedal-level fall rate toward 0, per second.
    pub deceleration_rate: f32,
    /// Hard speed governor: motor torque cuts to zero at this speed (km/h).
    pub max_speed_kph: f32,
    /// Brake hold time required to engage reverse (seconds).
    pub time_to_reverse: f32,
    /// Axle that receives motor torque.
    pub driven_axle: Axle,
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            motor_force: 3000.0,
            brake_force: 8000.0,
            reverse_force: 1500.0,
            engine_brake_force: 200.0,
            acceleration_rate: 2.0,
            deceleration_rate: 5.0,
            max_speed_kph: 80.0,
            time_to_reverse: 1.5,
            driven_axle: Axle::Rear,
        }
    }
}

/// Steering response configuration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct SteeringConfig {
    /// Front-wheel steer angle at full lock (degrees).
    pub max_steer_angle: f32,
    /// Time constant of the critically damped steering filter (seconds).
    pub smooth_time: f32,
    /// Body-roll impulse scale on steering direction changes.
    pub bounce_strength: f32,
}

impl Default for SteeringConfig {
    fn default() -> Self {
        Self {
            max_steer_angle: 25.0,
            smooth_time: 0.2,
            bounce_strength: 3.0,
        }
    }
}

/// Raycast suspension configuration, shared by all four corners.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct SuspensionConfig {
    /// Spring force per unit of compression ratio.
    pub spring_stiffness: f32,
    /// Damper force per unit of suspension point velocity.
    pub damper_stiffness: f32,
    /// Spring length at rest (meters).
    pub rest_length: f32,
    /// Usable spring travel (meters). Must be positive.
    pub spring_travel: f32,
    /// Wheel radius (meters).
    pub wheel_radius: f32,
    /// Corner mount offsets in chassis space, in [`crate::Wheel`] order:
    /// front-left, front-right, rear-left, rear-right.
    pub mounts: [Vec3; 4],
}

impl Default for SuspensionConfig {
    fn default() -> Self {
        Self {
            spring_stiffness: 30_000.0,
            damper_stiffness: 3_500.0,
            rest_length: 0.6,
            spring_travel: 0.3,
            wheel_radius: 0.45,
            mounts: [
                Vec3::new(-1.1, -0.2, -3.0),
                Vec3::new(1.1, -0.2, -3.0),
                Vec3::new(-1.1, -0.2, 3.0),
                Vec3::new(1.1, -0.2, 3.0),
            ],
        }
    }
}

/// Arcade lateral traction configuration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct LateralDragConfig {
    /// Opposing force per unit of sideways velocity.
    pub friction_strength: f32,
    /// Forward speed below which no lateral drag is applied (m/s).
    pub threshold_speed: f32,
}

impl Default for LateralDragConfig {
    fn default() -> Self {
        Self {
            friction_strength: 300.0,
            threshold_speed: 5.0,
        }
    }
}

/// Cosmetic body-lean configuration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct BodyLeanConfig {
    /// Peak roll into turns (degrees).
    pub max_roll_angle: f32,
    /// Peak nose-down squat under braking (degrees).
    pub max_squat_angle: f32,
    /// Lean spring stiffness at full speed scale.
    pub spring_stiffness: f32,
    /// Lean damping at full speed scale.
    pub damping: f32,
    /// Below this speed the lean decays to zero (m/s).
    pub min_lean_speed: f32,
    /// At and above this speed the lean spring runs at full strength (m/s).
    pub max_lean_speed: f32,
}

impl Default for BodyLeanConfig {
    fn default() -> Self {
        Self {
            max_roll_angle: 15.0,
            max_squat_angle: 1.5,
            spring_stiffness: 60.0,
            damping: 6.0,
            min_lean_speed: 2.0,
            max_lean_speed: 30.0,
        }
    }
}

/// Chassis rigid-body setup, applied by the host at spawn.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ChassisConfig {
    /// Chassis mass (kg).
    pub mass: f32,
    /// Linear velocity damping coefficient.
    pub linear_damping: f32,
    /// Angular velocity damping coefficient.
    pub angular_damping: f32,
    /// Center of mass offset in chassis space. Lowered for stability.
    pub center_of_mass: Vec3,
}

impl Default for ChassisConfig {
    fn default() -> Self {
        Self {
            mass: 1500.0,
            linear_damping: 0.1,
            angular_damping: 0.5,
            center_of_mass: Vec3::new(0.0, -0.5, 0.0),
        }
    }
}

/// Complete tuning for one vehicle.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleConfig {
    pub drive: DriveConfig,
    pub steering: SteeringConfig,
    pub suspension: SuspensionConfig,
    pub lateral_drag: LateralDragConfig,
    pub body_lean: BodyLeanConfig,
    pub chassis: ChassisConfig,
}

impl VehicleConfig {
    /// Check the setup invariants the per-step math assumes.
    ///
    /// The step path divides by `spring_travel` and by the lean-speed band
    /// width and scales pedal motion by the two rates; none of those may be
    /// zero or negative, and a controller is refused construction rather
    /// than allowed to run on them.
    pub fn validate(&self) -> ConfigResult<()> {
        let positive = [
            ("drive.acceleration_rate", self.drive.acceleration_rate),
            ("drive.deceleration_rate", self.drive.deceleration_rate),
            ("drive.max_speed_kph", self.drive.max_speed_kph),
            ("drive.time_to_reverse", self.drive.time_to_reverse),
            ("steering.smooth_time", self.steering.smooth_time),
            ("suspension.spring_travel", self.suspension.spring_travel),
            ("suspension.wheel_radius", self.suspension.wheel_radius),
            ("chassis.mass", self.chassis.mass),
        ];
        for (field, value) in positive {
            if value <= 0.0 {
                return Err(ConfigError::NonPositive { field, value });
            }
        }
        if self.body_lean.min_lean_speed >= self.body_lean.max_lean_speed {
            return Err(ConfigError::LeanBandEmpty {
                min: self.body_lean.min_lean_speed,
                max: self.body_lean.max_lean_speed,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        assert!(VehicleConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_spring_travel_rejected() {
        let mut config = VehicleConfig::default();
        config.suspension.spring_travel = 0.0;
        assert_eq!(
            config.validate(),
            Err(ConfigError::NonPositive {
                field: "suspension.spring_travel",
                value: 0.0
            })
        );
    }

    #[test]
    fn test_empty_lean_band_rejected() {
        let mut config = VehicleConfig::default();
        config.body_lean.min_lean_speed = 30.0;
        config.body_lean.max_lean_speed = 30.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::LeanBandEmpty { .. })
        ));
    }

    #[test]
    fn test_negative_rate_rejected() {
        let mut config = VehicleConfig::default();
        config.drive.deceleration_rate = -1.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonPositive {
                field: "drive.deceleration_rate",
                ..
            })
        ));
    }

    #[test]
    fn test_ron_round_trip() {
        let config = VehicleConfig::default();
        let text = ron::to_string(&config).unwrap();
        let back: VehicleConfig = ron::from_str(&text).unwrap();
        assert!((back.drive.motor_force - config.drive.motor_force).abs() < f32::EPSILON);
        assert_eq!(back.drive.driven_axle, Axle::Rear);
        assert!((back.suspension.mounts[3].z - 3.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_partial_ron_uses_defaults() {
        let text = "(drive: (motor_force: 4200.0, driven_axle: Front))";
        let config: VehicleConfig = ron::from_str(text).unwrap();
        assert!((config.drive.motor_force - 4200.0).abs() < f32::EPSILON);
        assert_eq!(config.drive.driven_axle, Axle::Front);
        // Everything unspecified falls back to the stock bus.
        assert!((config.drive.brake_force - 8000.0).abs() < f32::EPSILON);
        assert!((config.steering.max_steer_angle - 25.0).abs() < f32::EPSILON);
    }
}
