//! The per-vehicle dynamics controller.
//!
//! One controller owns one vehicle's state and advances it once per fixed
//! time step against a [`VehicleHost`]. Commands latch at arbitrary times
//! between steps; the step reads whatever is latched when it starts.
//!
//! The step pipeline runs in a fixed order, later stages depending on
//! earlier ones: pedal smoothing, reverse check, motor and brake torques,
//! steering, the steering-bounce impulse, body lean, suspension, ground
//! check, lateral drag.

use glam::Vec3;
use tracing::trace;

use crate::{
    config::{Axle, VehicleConfig},
    error::ConfigError,
    host::{Pose, VehicleHost, Wheel},
    smoothing::{lerp, move_towards, smooth_damp},
    state::{VehicleState, WheelContact},
};

/// Speed below which the brake-hold reverse timer may run (m/s).
const REVERSE_ENGAGE_SPEED: f32 = 0.5;

/// Speed below which engine braking is suppressed, so passive drag alone
/// never torque-locks the bus to a stop (m/s).
const ENGINE_BRAKE_CUTOFF_SPEED: f32 = 10.0;

/// Minimum steer-command change that injects a body-roll bounce impulse.
const STEER_BOUNCE_EPSILON: f32 = 0.01;

/// km/h per m/s.
const MS_TO_KPH: f32 = 3.6;

/// A latched input command.
///
/// The press/release pairs mirror the dash pedal buttons; `Steer` carries a
/// continuous wheel position and is clamped to [-1, 1] on entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    AcceleratePressed,
    AccelerateReleased,
    BrakePressed,
    BrakeReleased,
    SteerLeft,
    SteerRight,
    SteerReleased,
    Steer(f32),
}

/// Dynamics controller for a single vehicle.
pub struct VehicleController {
    config: VehicleConfig,
    state: VehicleState,
}

impl VehicleController {
    /// Build a controller from a validated configuration.
    ///
    /// Fails fast on any configuration the step math cannot run on; see
    /// [`VehicleConfig::validate`].
    pub fn new(config: VehicleConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            state: VehicleState::default(),
        })
    }

    /// Latch an input command. May be called at any time between steps;
    /// each channel is a single scalar, last write wins.
    pub fn on_command(&mut self, command: Command) {
        match command {
            Command::AcceleratePressed => self.state.throttle_pressed = true,
            Command::AccelerateReleased => self.state.throttle_pressed = false,
            Command::BrakePressed => self.state.brake_pressed = true,
            Command::BrakeReleased => self.state.brake_pressed = false,
            Command::SteerLeft => self.state.steer_command = -1.0,
            Command::SteerRight => self.state.steer_command = 1.0,
            Command::SteerReleased => self.state.steer_command = 0.0,
            Command::Steer(value) => self.state.steer_command = value.clamp(-1.0, 1.0),
        }
    }

    /// The latched steer command, for UI readback.
    pub fn steer_command(&self) -> f32 {
        self.state.steer_command
    }

    /// Current vehicle state.
    pub fn state(&self) -> &VehicleState {
        &self.state
    }

    /// Tuning this controller was built with.
    pub fn config(&self) -> &VehicleConfig {
        &self.config
    }

    /// Advance one fixed time step.
    ///
    /// Forces are accumulated on the host; the host integrates them after
    /// this returns. A non-positive `dt` is a no-op.
    pub fn step<H: VehicleHost>(&mut self, host: &mut H, dt: f32) {
        if dt <= 0.0 {
            return;
        }

        let pose = host.chassis_pose();
        let velocity = host.linear_velocity();
        let speed = velocity.length();
        self.state.speed = speed;

        self.update_pedals(dt);
        self.check_reverse(speed, dt);
        self.apply_motor(host, speed, dt);
        self.apply_steering(host, dt);
        self.steer_bounce();
        self.body_lean(host, speed, dt);
        self.suspension(host, &pose);
        self.ground_check();
        self.lateral_drag(host, &pose, velocity);
    }

    /// Move both pedal levels toward their latched commands at bounded
    /// rates: up at the acceleration rate, back down at the deceleration
    /// rate.
    fn update_pedals(&mut self, dt: f32) {
        let drive = self.config.drive;
        let s = &mut self.state;
        s.throttle_level = if s.throttle_pressed {
            move_towards(s.throttle_level, 1.0, drive.acceleration_rate * dt)
        } else {
            move_towards(s.throttle_level, 0.0, drive.deceleration_rate * dt)
        };
        s.brake_level = if s.brake_pressed {
            move_towards(s.brake_level, 1.0, drive.acceleration_rate * dt)
        } else {
            move_towards(s.brake_level, 0.0, drive.deceleration_rate * dt)
        };
    }

    /// Reverse engages after the brake is held with an idle throttle at
    /// near-zero speed for the configured hold time. Any throttle exits
    /// reverse immediately and resets the hold; releasing the brake resets
    /// the hold but keeps the current gear.
    fn check_reverse(&mut self, speed: f32, dt: f32) {
        let drive = self.config.drive;
        let s = &mut self.state;
        if s.brake_level > 0.0 && s.throttle_level <= 0.0 && speed < REVERSE_ENGAGE_SPEED {
            s.reverse_hold += dt;
            if s.reverse_hold >= drive.time_to_reverse && !s.reversing {
                s.reversing = true;
                trace!("reverse engaged after {:.2}s brake hold", s.reverse_hold);
            }
        } else if s.throttle_level > 0.0 {
            s.reversing = false;
            s.reverse_hold = 0.0;
        } else if s.brake_level <= 0.0 {
            s.reverse_hold = 0.0;
        }
    }

    /// Drive the motor and brake torques and push the gear label.
    fn apply_motor<H: VehicleHost>(&mut self, host: &mut H, speed: f32, dt: f32) {
        let drive = self.config.drive;
        let s = &mut self.state;

        // Second throttle filter, gated off while reversing. Feeding the
        // already-smoothed pedal level through the same rates again gives
        // the deliberately soft, bus-like torque onset.
        s.current_throttle = if s.throttle_level > 0.0 && !s.reversing {
            move_towards(s.current_throttle, 1.0, drive.acceleration_rate * dt)
        } else {
            move_towards(s.current_throttle, 0.0, drive.deceleration_rate * dt)
        };

        let speed_kph = speed * MS_TO_KPH;
        let motor_torque = if s.reversing {
            // The brake pedal doubles as the reverse throttle.
            s.brake_level * -drive.reverse_force
        } else if speed_kph < drive.max_speed_kph {
            s.current_throttle * drive.motor_force
        } else {
            // Hard governor: torque cut, not tapered.
            0.0
        };

        host.show_gear(s.gear());

        let driven: [Wheel; 2] = match drive.driven_axle {
            Axle::Front => [Wheel::FrontLeft, Wheel::FrontRight],
            Axle::Rear => [Wheel::RearLeft, Wheel::RearRight],
        };
        for wheel in driven {
            host.set_motor_torque(wheel, motor_torque);
        }

        let mut brake_torque = 0.0;
        if !s.reversing {
            brake_torque = s.brake_level * drive.brake_force;

            // Engine drag while coasting, cut at low speed so the bus can
            // still creep.
            if s.current_throttle <= 0.0 && s.brake_level <= 0.0 {
                brake_torque += drive.engine_brake_force;
                if speed < ENGINE_BRAKE_CUTOFF_SPEED {
                    brake_torque = 0.0;
                }
            }
        }
        for wheel in Wheel::ALL {
            host.set_brake_torque(wheel, brake_torque);
        }
    }

    /// Track the steer command through the critically damped filter and
    /// write the front-wheel steer angles.
    fn apply_steering<H: VehicleHost>(&mut self, host: &mut H, dt: f32) {
        let steering = self.config.steering;
        let s = &mut self.state;
        s.steering_angle = smooth_damp(
            s.steering_angle,
            s.steer_command,
            &mut s.steering_velocity,
            steering.smooth_time,
            dt,
        );
        let angle = s.steering_angle * steering.max_steer_angle;
        host.set_steer_angle(Wheel::FrontLeft, angle);
        host.set_steer_angle(Wheel::FrontRight, angle);
    }

    /// A sharp steer-command change kicks the roll spring in the opposite
    /// direction, giving a brief overshoot-and-settle on reversals.
    fn steer_bounce(&mut self) {
        let s = &mut self.state;
        let delta = s.steer_command - s.prev_steer_command;
        if delta.abs() > STEER_BOUNCE_EPSILON {
            s.body_roll_velocity +=
                -delta * self.config.body_lean.max_roll_angle * self.config.steering.bounce_strength;
        }
        s.prev_steer_command = s.steer_command;
    }

    /// Cosmetic chassis lean: spring-damper roll toward the steer command
    /// and squat toward the brake level, speed-scaled; below the minimum
    /// lean speed both axes decay to zero with their velocities cleared.
    fn body_lean<H: VehicleHost>(&mut self, host: &mut H, speed: f32, dt: f32) {
        let lean = self.config.body_lean;
        let s = &mut self.state;

        if speed < lean.min_lean_speed {
            // Recentre without the spring so nothing rings at rest.
            let k = lean.damping * dt;
            s.body_roll = lerp(s.body_roll, 0.0, k);
            s.body_pitch = lerp(s.body_pitch, 0.0, k);
            s.body_roll_velocity = 0.0;
            s.body_pitch_velocity = 0.0;
            host.set_body_lean(s.body_pitch, s.body_roll);
            return;
        }

        let target_roll = -s.steer_command * lean.max_roll_angle;
        let target_pitch = s.brake_level * lean.max_squat_angle;

        let band = lean.max_lean_speed - lean.min_lean_speed;
        let t = ((speed - lean.min_lean_speed) / band).clamp(0.0, 1.0);
        let mut spring = lean.spring_stiffness * t;
        let mut damping = lean.damping * t;

        // Stiffen both axes once the brake is fully released so the nose
        // comes back up quickly.
        if s.brake_level <= 0.0 {
            spring *= 3.0;
            damping *= 3.0;
        }

        let roll_accel = (target_roll - s.body_roll) * spring - s.body_roll_velocity * damping;
        s.body_roll_velocity += roll_accel * dt;
        s.body_roll += s.body_roll_velocity * dt;

        let pitch_accel = (target_pitch - s.body_pitch) * spring - s.body_pitch_velocity * damping;
        s.body_pitch_velocity += pitch_accel * dt;
        s.body_pitch += s.body_pitch_velocity * dt;

        host.set_body_lean(s.body_pitch, s.body_roll);
    }

    /// Per-corner raycast spring-damper. Each corner casts down along the
    /// chassis up-axis; a miss marks the corner airborne with zero force.
    fn suspension<H: VehicleHost>(&mut self, host: &mut H, pose: &Pose) {
        let sus = self.config.suspension;
        let up = pose.up();
        let ray_dir = -up;
        let max_distance = sus.rest_length + sus.spring_travel + sus.wheel_radius;

        for wheel in Wheel::ALL {
            let origin = pose.transform_point(sus.mounts[wheel.index()]);
            let contact = match host.cast_ray(origin, ray_dir, max_distance) {
                Some(hit) => {
                    let spring_length = hit.distance - sus.wheel_radius;
                    let compression = (sus.rest_length - spring_length) / sus.spring_travel;
                    // Damping acts on the raw point-velocity projection,
                    // not the compression rate.
                    let spring_velocity = host.point_velocity(origin).dot(up);
                    let force =
                        sus.spring_stiffness * compression - sus.damper_stiffness * spring_velocity;
                    host.apply_force_at(up * force, origin);
                    trace!(
                        "{wheel:?} contact: distance {:.3} compression {compression:.3} force {force:.1}",
                        hit.distance
                    );
                    WheelContact {
                        grounded: true,
                        hit_distance: hit.distance,
                        compression,
                        force,
                        contact_point: hit.point,
                    }
                }
                None => WheelContact::airborne(),
            };
            self.state.contacts[wheel.index()] = contact;
        }
    }

    /// Grounded when more than one corner is in contact.
    fn ground_check(&mut self) {
        self.state.grounded = self.state.grounded_corners() > 1;
    }

    /// Arcade traction: above the threshold forward speed, oppose the
    /// sideways velocity component. Inactive below threshold and in
    /// reverse travel.
    fn lateral_drag<H: VehicleHost>(&mut self, host: &mut H, pose: &Pose, velocity: Vec3) {
        let drag = self.config.lateral_drag;
        let forward_speed = velocity.dot(pose.forward());
        if forward_speed > drag.threshold_speed {
            let right = pose.right();
            let lateral = right * velocity.dot(right);
            host.apply_force(-lateral * drag.friction_strength);
        }
    }
}
