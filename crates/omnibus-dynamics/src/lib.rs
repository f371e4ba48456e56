//! Fixed-step bus vehicle dynamics.
//!
//! This crate implements the dynamics model of a driveable bus: a
//! throttle/brake/reverse pedal state machine, per-corner raycast
//! suspension, critically damped steering smoothing, an arcade-style
//! lateral traction force, and a cosmetic body-lean spring-damper.
//!
//! The model is engine-agnostic. It is advanced by calling
//! [`VehicleController::step`] once per fixed time step, and it talks to the
//! outside world exclusively through the [`VehicleHost`] trait: ground
//! raycasts, chassis velocity and force application, per-wheel torque and
//! steer actuators, and the gear display. Inputs arrive at arbitrary times
//! between steps through [`VehicleController::on_command`]; the step always
//! reads the latest latched value.
//!
//! Because every external capability is injected, the whole simulation can
//! be driven deterministically in tests and headless harnesses without a
//! live physics world (see the `omnibus-tuner` crate).

pub mod config;
pub mod controller;
pub mod error;
pub mod host;
pub mod smoothing;
pub mod state;

pub use config::{
    Axle, BodyLeanConfig, ChassisConfig, DriveConfig, LateralDragConfig, SteeringConfig,
    SuspensionConfig, VehicleConfig,
};
pub use controller::{Command, VehicleController};
pub use error::{ConfigError, ConfigResult};
pub use host::{Pose, RayHit, VehicleHost, Wheel};
pub use state::{Gear, VehicleState, WheelContact};
