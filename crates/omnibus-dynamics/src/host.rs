//! The injected boundary between the dynamics model and its host.
//!
//! The controller never touches an engine directly. Everything it needs
//! from the outside world — ground raycasts, chassis velocity, force
//! application, wheel actuators, the gear display — comes through
//! [`VehicleHost`], so a real physics engine and a deterministic test
//! harness are interchangeable.

use glam::{Quat, Vec3};

use crate::state::Gear;

/// World-space pose of the chassis body.
///
/// Axis convention follows the chassis frame: `+Y` up, `+X` right,
/// `-Z` forward.
#[derive(Debug, Clone, Copy)]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Pose {
    /// Chassis up axis in world space.
    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    /// Chassis right axis in world space.
    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    /// Chassis forward axis in world space.
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    /// Transform a chassis-space point into world space.
    pub fn transform_point(&self, local: Vec3) -> Vec3 {
        self.position + self.rotation * local
    }
}

/// Result of a ground raycast.
#[derive(Debug, Clone, Copy)]
pub struct RayHit {
    /// Distance from the ray origin to the hit, along the ray direction.
    pub distance: f32,
    /// World-space hit point.
    pub point: Vec3,
}

/// Suspension/actuator corner, in fixed order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wheel {
    FrontLeft,
    FrontRight,
    RearLeft,
    RearRight,
}

impl Wheel {
    /// All corners, in index order.
    pub const ALL: [Self; 4] = [
        Self::FrontLeft,
        Self::FrontRight,
        Self::RearLeft,
        Self::RearRight,
    ];

    /// Index into per-corner arrays.
    pub fn index(self) -> usize {
        match self {
            Self::FrontLeft => 0,
            Self::FrontRight => 1,
            Self::RearLeft => 2,
            Self::RearRight => 3,
        }
    }

    /// Whether this corner belongs to the front axle.
    pub fn is_front(self) -> bool {
        matches!(self, Self::FrontLeft | Self::FrontRight)
    }
}

/// Host-side capabilities the controller steps against.
///
/// Force applications accumulate on the host and are integrated by the
/// host's own physics update after the controller step, so the chassis
/// velocity observed during a step is the velocity at the start of that
/// step. Actuator writes latch: a torque or steer angle stays in effect
/// until overwritten.
pub trait VehicleHost {
    /// Current world-space chassis pose.
    fn chassis_pose(&self) -> Pose;

    /// Chassis linear velocity.
    fn linear_velocity(&self) -> Vec3;

    /// Velocity of the chassis body at a world-space point.
    fn point_velocity(&self, point: Vec3) -> Vec3;

    /// Accumulate a central force on the chassis.
    fn apply_force(&mut self, force: Vec3);

    /// Accumulate a force at a world-space point on the chassis.
    fn apply_force_at(&mut self, force: Vec3, point: Vec3);

    /// Raycast against drivable ground. Returns the nearest hit within
    /// `max_distance`, or `None`.
    fn cast_ray(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<RayHit>;

    /// Set the motor torque on a wheel.
    fn set_motor_torque(&mut self, wheel: Wheel, torque: f32);

    /// Set the brake torque on a wheel.
    fn set_brake_torque(&mut self, wheel: Wheel, torque: f32);

    /// Set the steer angle on a wheel, in degrees.
    fn set_steer_angle(&mut self, wheel: Wheel, degrees: f32);

    /// Write the cosmetic body-lean pose, in degrees.
    fn set_body_lean(&mut self, pitch: f32, roll: f32);

    /// Push the current gear to the display. One-way, fire-and-forget.
    fn show_gear(&mut self, gear: Gear);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wheel_indices_match_all_order() {
        for (i, wheel) in Wheel::ALL.iter().enumerate() {
            assert_eq!(wheel.index(), i);
        }
    }

    #[test]
    fn test_pose_axes_identity() {
        let pose = Pose {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        };
        assert_eq!(pose.up(), Vec3::Y);
        assert_eq!(pose.right(), Vec3::X);
        assert_eq!(pose.forward(), Vec3::NEG_Z);
    }

    #[test]
    fn test_pose_transform_point() {
        let pose = Pose {
            position: Vec3::new(0.0, 2.0, 0.0),
            rotation: Quat::from_rotation_y(std::f32::consts::FRAC_PI_2),
        };
        let world = pose.transform_point(Vec3::new(1.0, 0.0, 0.0));
        assert!((world - Vec3::new(0.0, 2.0, -1.0)).length() < 1e-5);
    }
}
