//! Runtime vehicle state.

use glam::Vec3;

/// Discrete drive direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gear {
    Drive,
    Reverse,
}

impl Gear {
    /// Display label, as shown on the dash.
    pub fn label(self) -> &'static str {
        match self {
            Self::Drive => "D",
            Self::Reverse => "R",
        }
    }
}

/// Per-corner suspension snapshot, recomputed every step.
#[derive(Debug, Clone, Copy)]
pub struct WheelContact {
    /// Whether the corner raycast hit drivable ground.
    pub grounded: bool,
    /// Raycast hit distance from the mount (meters). Infinite when airborne.
    pub hit_distance: f32,
    /// Normalized suspension travel consumed: 0 = fully extended,
    /// 1 = fully compressed.
    pub compression: f32,
    /// Net spring-damper force applied at the mount this step.
    pub force: f32,
    /// World-space ground contact point.
    pub contact_point: Vec3,
}

impl WheelContact {
    /// An airborne corner: no contact, zero force.
    pub fn airborne() -> Self {
        Self {
            grounded: false,
            hit_distance: f32::INFINITY,
            compression: 0.0,
            force: 0.0,
            contact_point: Vec3::ZERO,
        }
    }
}

impl Default for WheelContact {
    fn default() -> Self {
        Self::airborne()
    }
}

/// All mutable state of one vehicle.
///
/// Owned exclusively by its controller and mutated only inside the step;
/// command latches are plain scalars overwritten last-write-wins.
#[derive(Debug, Clone, Default)]
pub struct VehicleState {
    /// Latched accelerate-pedal command.
    pub throttle_pressed: bool,
    /// Latched brake-pedal command.
    pub brake_pressed: bool,
    /// Latched steer command in [-1, 1].
    pub steer_command: f32,

    /// Smoothed accelerate pedal in [0, 1].
    pub throttle_level: f32,
    /// Smoothed brake pedal in [0, 1].
    pub brake_level: f32,
    /// Doubly smoothed throttle feeding motor torque, in [0, 1].
    pub current_throttle: f32,

    /// Smoothed steering position in [-1, 1].
    pub steering_angle: f32,
    /// Steering filter velocity state.
    pub steering_velocity: f32,
    /// Steer command seen last step, for the bounce impulse.
    pub prev_steer_command: f32,

    /// Whether the gearbox is in reverse.
    pub reversing: bool,
    /// Accumulated brake-hold time toward reverse (seconds).
    pub reverse_hold: f32,

    /// Cosmetic body roll (degrees).
    pub body_roll: f32,
    /// Roll spring velocity (deg/s).
    pub body_roll_velocity: f32,
    /// Cosmetic body pitch (degrees).
    pub body_pitch: f32,
    /// Pitch spring velocity (deg/s).
    pub body_pitch_velocity: f32,

    /// Per-corner suspension contacts, in [`crate::Wheel`] order.
    pub contacts: [WheelContact; 4],
    /// True when more than one corner is in contact.
    pub grounded: bool,

    /// Chassis speed magnitude at the start of the last step (m/s).
    pub speed: f32,
}

impl VehicleState {
    /// Current gear, derived from the reverse flag.
    pub fn gear(&self) -> Gear {
        if self.reversing { Gear::Reverse } else { Gear::Drive }
    }

    /// Last observed speed in km/h, for dash display.
    pub fn speed_kph(&self) -> f32 {
        self.speed * 3.6
    }

    /// Number of corners currently in contact.
    pub fn grounded_corners(&self) -> usize {
        self.contacts.iter().filter(|c| c.grounded).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gear_labels() {
        assert_eq!(Gear::Drive.label(), "D");
        assert_eq!(Gear::Reverse.label(), "R");
    }

    #[test]
    fn test_default_state_is_at_rest() {
        let state = VehicleState::default();
        assert_eq!(state.gear(), Gear::Drive);
        assert!(!state.grounded);
        assert_eq!(state.grounded_corners(), 0);
        assert_eq!(state.throttle_level, 0.0);
        assert!(state.contacts.iter().all(|c| !c.grounded && c.force == 0.0));
    }
}
