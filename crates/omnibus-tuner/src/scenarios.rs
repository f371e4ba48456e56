//! Measurement scenarios.
//!
//! Each scenario drives a fresh controller against a [`FlatGroundHost`],
//! emits telemetry rows for every step, and prints a `#`-prefixed summary
//! on stderr. Reports are returned so the numbers are testable.

use omnibus_dynamics::{Command, Gear, VehicleConfig, VehicleController};

use crate::{
    flat::FlatGroundHost,
    telemetry::{TelemetryOutput, TelemetrySnapshot, emit_telemetry_to},
};

/// Time the vehicle is left settling on its suspension before a scenario
/// starts driving it.
const SETTLE_TIME: f32 = 1.0;

/// One controller + host step with telemetry.
fn tick(
    controller: &mut VehicleController,
    host: &mut FlatGroundHost,
    elapsed: f32,
    dt: f32,
    out: &mut dyn TelemetryOutput,
) {
    controller.step(host, dt);
    host.integrate(dt);
    let snapshot = TelemetrySnapshot::capture(elapsed, dt, controller.state());
    emit_telemetry_to(&snapshot, out);
}

/// Results of the reverse-engagement scenario.
pub struct ReverseReport {
    /// Brake-hold time until the gear read R, if it ever did.
    pub engaged_after: Option<f32>,
    /// Reverse creep speed reached while backing (m/s).
    pub creep_speed: f32,
    /// Whether a single throttle step returned the gear to D with the
    /// hold timer cleared.
    pub exit_immediate: bool,
}

/// Brake from rest until reverse engages, back up briefly, then blip the
/// throttle and confirm the immediate return to drive.
pub fn run_reverse(
    config: &VehicleConfig,
    dt: f32,
    out: &mut dyn TelemetryOutput,
) -> ReverseReport {
    let mut controller = VehicleController::new(*config).expect("validated config");
    let mut host = FlatGroundHost::new(config);
    let mut elapsed = 0.0;

    while elapsed < SETTLE_TIME {
        tick(&mut controller, &mut host, elapsed, dt, out);
        elapsed += dt;
    }

    controller.on_command(Command::BrakePressed);
    let hold_start = elapsed;
    let mut engaged_after = None;
    while elapsed - hold_start < config.drive.time_to_reverse + 2.0 {
        tick(&mut controller, &mut host, elapsed, dt, out);
        elapsed += dt;
        if controller.state().gear() == Gear::Reverse {
            engaged_after = Some(elapsed - hold_start);
            break;
        }
    }

    // Back up for half a second on the brake pedal.
    let mut creep_speed: f32 = 0.0;
    if engaged_after.is_some() {
        let reverse_start = elapsed;
        while elapsed - reverse_start < 0.5 {
            tick(&mut controller, &mut host, elapsed, dt, out);
            elapsed += dt;
            creep_speed = creep_speed.max(-host.forward_speed());
        }
    }

    controller.on_command(Command::AcceleratePressed);
    tick(&mut controller, &mut host, elapsed, dt, out);
    let exit_immediate =
        controller.state().gear() == Gear::Drive && controller.state().reverse_hold == 0.0;

    eprintln!("# === reverse ===");
    match engaged_after {
        Some(t) => eprintln!(
            "#   Engaged after {t:.2} s brake hold (configured {:.2} s)",
            config.drive.time_to_reverse
        ),
        None => eprintln!("#   Never engaged"),
    }
    eprintln!("#   Dash shows: {}", host.displayed_gear().label());
    eprintln!("#   Creep speed: {creep_speed:.2} m/s");
    eprintln!(
        "#   Throttle exit: {}",
        if exit_immediate { "immediate" } else { "NOT immediate" }
    );

    ReverseReport {
        engaged_after,
        creep_speed,
        exit_immediate,
    }
}

/// Results of the top-speed scenario.
pub struct TopSpeedReport {
    /// Highest speed reached (km/h).
    pub max_speed_kph: f32,
    /// Time from launch until the governor speed was first reached.
    pub governor_reached_at: Option<f32>,
}

/// Full throttle from rest until the speed stops climbing or the duration
/// runs out.
pub fn run_top_speed(
    config: &VehicleConfig,
    dt: f32,
    duration: f32,
    out: &mut dyn TelemetryOutput,
) -> TopSpeedReport {
    let mut controller = VehicleController::new(*config).expect("validated config");
    let mut host = FlatGroundHost::new(config);
    let mut elapsed = 0.0;

    while elapsed < SETTLE_TIME {
        tick(&mut controller, &mut host, elapsed, dt, out);
        elapsed += dt;
    }

    controller.on_command(Command::AcceleratePressed);
    let launch = elapsed;
    let mut max_speed_kph: f32 = 0.0;
    let mut governor_reached_at = None;
    let mut plateau_timer = 0.0;

    while elapsed - launch < duration {
        tick(&mut controller, &mut host, elapsed, dt, out);
        elapsed += dt;

        let kph = host.speed_kph();
        if kph > max_speed_kph + 0.01 {
            max_speed_kph = kph;
            plateau_timer = 0.0;
        } else {
            plateau_timer += dt;
        }
        if governor_reached_at.is_none() && kph >= config.drive.max_speed_kph {
            governor_reached_at = Some(elapsed - launch);
        }
        // Speed has stopped climbing; the governor (or drag) is holding it.
        if plateau_timer >= 2.0 {
            break;
        }
    }

    eprintln!("# === top-speed ===");
    eprintln!(
        "#   Max speed: {max_speed_kph:.1} km/h (governor {:.1} km/h)",
        config.drive.max_speed_kph
    );
    match governor_reached_at {
        Some(t) => eprintln!("#   Governor reached after {t:.2} s"),
        None => eprintln!("#   Governor not reached"),
    }

    TopSpeedReport {
        max_speed_kph,
        governor_reached_at,
    }
}

/// Results of the lean scenario.
pub struct LeanReport {
    /// Peak body roll during the slalom (degrees).
    pub peak_roll: f32,
    /// Peak body pitch during the brake-down (degrees).
    pub peak_pitch: f32,
    /// Time from dropping below the lean threshold until the roll settled
    /// under 0.05 degrees.
    pub settle_time: Option<f32>,
}

/// Accelerate, slalom to excite the roll spring, brake down, and measure
/// how quickly the lean recentres below the threshold speed.
pub fn run_lean(config: &VehicleConfig, dt: f32, out: &mut dyn TelemetryOutput) -> LeanReport {
    let mut controller = VehicleController::new(*config).expect("validated config");
    let mut host = FlatGroundHost::new(config);
    let mut elapsed = 0.0;

    while elapsed < SETTLE_TIME {
        tick(&mut controller, &mut host, elapsed, dt, out);
        elapsed += dt;
    }

    // Build speed.
    controller.on_command(Command::AcceleratePressed);
    let launch = elapsed;
    while elapsed - launch < 5.0 {
        tick(&mut controller, &mut host, elapsed, dt, out);
        elapsed += dt;
    }

    // Slalom: flip the wheel every 1.5 s.
    let slalom_start = elapsed;
    let mut peak_roll: f32 = 0.0;
    while elapsed - slalom_start < 6.0 {
        let phase = ((elapsed - slalom_start) / 1.5) as i32;
        controller.on_command(if phase % 2 == 0 {
            Command::SteerRight
        } else {
            Command::SteerLeft
        });
        tick(&mut controller, &mut host, elapsed, dt, out);
        elapsed += dt;
        // Read the roll back off the lean sink, as a viewer would.
        peak_roll = peak_roll.max(host.body_lean().1.abs());
    }

    // Brake down; release the brake once slow so reverse never engages.
    controller.on_command(Command::SteerReleased);
    controller.on_command(Command::AccelerateReleased);
    controller.on_command(Command::BrakePressed);
    let mut peak_pitch: f32 = 0.0;
    let mut below_threshold_at = None;
    let mut settle_time = None;
    let braking_start = elapsed;
    while elapsed - braking_start < 10.0 {
        if host.speed() < config.body_lean.min_lean_speed {
            controller.on_command(Command::BrakeReleased);
            below_threshold_at.get_or_insert(elapsed);
        }
        tick(&mut controller, &mut host, elapsed, dt, out);
        elapsed += dt;
        peak_pitch = peak_pitch.max(controller.state().body_pitch.abs());

        if let Some(t0) = below_threshold_at {
            let state = controller.state();
            if settle_time.is_none()
                && state.body_roll.abs() < 0.05
                && state.body_pitch.abs() < 0.05
            {
                settle_time = Some(elapsed - t0);
                break;
            }
        }
    }

    eprintln!("# === lean ===");
    eprintln!("#   Peak roll: {peak_roll:.1} deg");
    eprintln!("#   Peak pitch: {peak_pitch:.2} deg");
    match settle_time {
        Some(t) => eprintln!("#   Recentred {t:.2} s after dropping below the lean threshold"),
        None => eprintln!("#   Did not recentre"),
    }

    LeanReport {
        peak_roll,
        peak_pitch,
        settle_time,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::TelemetryOutput;

    struct NullOutput;

    impl TelemetryOutput for NullOutput {
        fn write_line(&mut self, _line: &str) {}
    }

    const DT: f32 = 1.0 / 60.0;

    #[test]
    fn test_reverse_scenario_matches_configured_hold() {
        let config = VehicleConfig::default();
        let report = run_reverse(&config, DT, &mut NullOutput);
        let engaged = report.engaged_after.expect("reverse should engage");
        assert!(
            (engaged - config.drive.time_to_reverse).abs() < 0.1,
            "engaged after {engaged}"
        );
        assert!(report.exit_immediate);
        assert!(report.creep_speed > 0.0);
    }

    #[test]
    fn test_top_speed_hits_governor() {
        let config = VehicleConfig::default();
        let report = run_top_speed(&config, DT, 30.0, &mut NullOutput);
        assert!(report.governor_reached_at.is_some());
        // The governor cuts torque; one step of overshoot is expected,
        // runaway is not.
        assert!(report.max_speed_kph >= config.drive.max_speed_kph);
        assert!(report.max_speed_kph < config.drive.max_speed_kph + 10.0);
    }

    #[test]
    fn test_lean_scenario_rolls_and_recentres() {
        let config = VehicleConfig::default();
        let report = run_lean(&config, DT, &mut NullOutput);
        assert!(report.peak_roll > 2.0, "peak roll {}", report.peak_roll);
        assert!(report.settle_time.is_some());
    }
}
