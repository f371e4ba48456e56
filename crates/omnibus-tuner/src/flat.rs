//! Deterministic flat-plane host.
//!
//! A minimal stand-in for a real physics engine: drivable ground is the
//! plane y = 0, the chassis is a point mass with yaw-only heading, and
//! forces accumulate during the controller step and are integrated here
//! afterwards. Good enough to measure pedal response, governor behavior,
//! and lean settling without an engine in the loop.

use glam::{Quat, Vec3};
use omnibus_dynamics::{Gear, Pose, RayHit, VehicleConfig, VehicleHost, Wheel};

/// Gravitational acceleration (m/s²).
const GRAVITY: f32 = 9.81;

/// Flat-ground implementation of [`VehicleHost`].
pub struct FlatGroundHost {
    mass: f32,
    linear_damping: f32,
    wheel_radius: f32,
    mounts: [Vec3; 4],
    suspension_range: f32,
    wheelbase: f32,

    pose: Pose,
    velocity: Vec3,
    yaw: f32,

    motor_torque: [f32; 4],
    brake_torque: [f32; 4],
    steer_angle: [f32; 4],
    lean: (f32, f32),
    gear: Gear,
    pending_force: Vec3,
}

impl FlatGroundHost {
    /// Spawn a chassis at static suspension equilibrium over the plane.
    pub fn new(config: &VehicleConfig) -> Self {
        let chassis = config.chassis;
        let sus = config.suspension;

        // Static per-corner load sets the resting compression ratio.
        let compression = (chassis.mass * GRAVITY / (4.0 * sus.spring_stiffness)).clamp(0.0, 1.0);
        let spring_length = sus.rest_length - compression * sus.spring_travel;
        let mount_height = spring_length + sus.wheel_radius;
        let chassis_height = mount_height - sus.mounts[0].y;

        let wheelbase = (sus.mounts[2].z - sus.mounts[0].z).abs().max(0.1);

        Self {
            mass: chassis.mass,
            linear_damping: chassis.linear_damping,
            wheel_radius: sus.wheel_radius,
            mounts: sus.mounts,
            suspension_range: sus.rest_length + sus.spring_travel + sus.wheel_radius,
            wheelbase,
            pose: Pose {
                position: Vec3::new(0.0, chassis_height, 0.0),
                rotation: Quat::IDENTITY,
            },
            velocity: Vec3::ZERO,
            yaw: 0.0,
            motor_torque: [0.0; 4],
            brake_torque: [0.0; 4],
            steer_angle: [0.0; 4],
            lean: (0.0, 0.0),
            gear: Gear::Drive,
            pending_force: Vec3::ZERO,
        }
    }

    /// Integrate one fixed step: wheel torques become longitudinal forces
    /// at grounded corners, accumulated forces become velocity changes,
    /// the steer angle becomes a kinematic yaw rate.
    pub fn integrate(&mut self, dt: f32) {
        let mut force = self.pending_force;
        self.pending_force = Vec3::ZERO;

        force.y -= GRAVITY * self.mass;

        let forward = self.pose.forward();
        let forward_speed = self.velocity.dot(forward);
        let mut braking = false;
        for wheel in Wheel::ALL {
            if !self.wheel_grounded(wheel) {
                continue;
            }
            force += forward * (self.motor_torque[wheel.index()] / self.wheel_radius);

            let brake = self.brake_torque[wheel.index()] / self.wheel_radius;
            if brake > 0.0 && forward_speed.abs() > 1e-3 {
                force -= forward * forward_speed.signum() * brake;
                braking = true;
            }
        }

        // Forces as velocity changes, then exponential chassis damping.
        self.velocity += force / self.mass * dt;
        self.velocity *= (-self.linear_damping * dt).exp();

        // Brakes stop the chassis; they never push it backwards.
        let new_forward_speed = self.velocity.dot(forward);
        if braking && forward_speed * new_forward_speed < 0.0 {
            self.velocity -= forward * new_forward_speed;
        }

        // Kinematic steering: front steer angle sets the yaw rate.
        // Positive (right) steer turns clockwise, so yaw decreases.
        let steer_rad = self.steer_angle[Wheel::FrontLeft.index()].to_radians();
        if steer_rad.abs() > 1e-5 {
            self.yaw -= self.velocity.dot(forward) / self.wheelbase * steer_rad.tan() * dt;
            self.pose.rotation = Quat::from_rotation_y(self.yaw);
        }

        // Grounded traction realigns travel with the nose, standing in for
        // a tire model: the signed forward speed is preserved, sideways
        // velocity is dropped.
        if Wheel::ALL.iter().any(|&w| self.wheel_grounded(w)) {
            let signed = self.velocity.dot(forward);
            let new_forward = self.pose.forward();
            self.velocity = new_forward * signed + Vec3::Y * self.velocity.y;
        }

        self.pose.position += self.velocity * dt;
    }

    fn wheel_grounded(&self, wheel: Wheel) -> bool {
        let origin = self.pose.transform_point(self.mounts[wheel.index()]);
        origin.y >= 0.0 && origin.y <= self.suspension_range
    }

    /// Chassis speed magnitude (m/s).
    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }

    /// Chassis speed in km/h.
    pub fn speed_kph(&self) -> f32 {
        self.speed() * 3.6
    }

    /// Signed speed along the chassis forward axis (m/s).
    pub fn forward_speed(&self) -> f32 {
        self.velocity.dot(self.pose.forward())
    }

    /// Last gear pushed to the display.
    pub fn displayed_gear(&self) -> Gear {
        self.gear
    }

    /// Last body-lean pose written, as (pitch, roll) degrees.
    pub fn body_lean(&self) -> (f32, f32) {
        self.lean
    }
}

impl VehicleHost for FlatGroundHost {
    fn chassis_pose(&self) -> Pose {
        self.pose
    }

    fn linear_velocity(&self) -> Vec3 {
        self.velocity
    }

    fn point_velocity(&self, _point: Vec3) -> Vec3 {
        // Point mass: rotational contribution is ignored.
        self.velocity
    }

    fn apply_force(&mut self, force: Vec3) {
        self.pending_force += force;
    }

    fn apply_force_at(&mut self, force: Vec3, _point: Vec3) {
        self.pending_force += force;
    }

    fn cast_ray(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<RayHit> {
        if direction.y >= 0.0 {
            return None;
        }
        let distance = origin.y / -direction.y;
        (distance >= 0.0 && distance <= max_distance).then(|| RayHit {
            distance,
            point: origin + direction * distance,
        })
    }

    fn set_motor_torque(&mut self, wheel: Wheel, torque: f32) {
        self.motor_torque[wheel.index()] = torque;
    }

    fn set_brake_torque(&mut self, wheel: Wheel, torque: f32) {
        self.brake_torque[wheel.index()] = torque;
    }

    fn set_steer_angle(&mut self, wheel: Wheel, degrees: f32) {
        self.steer_angle[wheel.index()] = degrees;
    }

    fn set_body_lean(&mut self, pitch: f32, roll: f32) {
        self.lean = (pitch, roll);
    }

    fn show_gear(&mut self, gear: Gear) {
        self.gear = gear;
    }
}
