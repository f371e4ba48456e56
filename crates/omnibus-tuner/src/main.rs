//! Headless vehicle dynamics tuner.
//!
//! Loads a vehicle definition, drives it through measurement scenarios on
//! a flat plane, and reports the results: CSV telemetry on stdout (or a
//! file) and a `#`-prefixed summary on stderr.
//!
//! Run with: cargo run -p omnibus-tuner -- --scenario top-speed
//! Point `--vehicle` at any RON file to tune a custom definition.

mod flat;
mod scenarios;
mod telemetry;

use std::{fs, path::PathBuf};

use anyhow::Context;
use clap::{Parser, ValueEnum};
use omnibus_dynamics::VehicleConfig;

use telemetry::{FileTelemetryOutput, StdoutTelemetryOutput, TelemetryOutput, reset_telemetry_to};

/// The bundled rear-driven city bus.
const CITYBUS: &str = include_str!("../assets/vehicles/citybus.ron");

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Scenario {
    /// Run every scenario in sequence.
    All,
    /// Brake-hold reverse engagement and throttle exit.
    Reverse,
    /// Full-throttle run into the speed governor.
    TopSpeed,
    /// Slalom roll excitation and recentre timing.
    Lean,
}

#[derive(Parser)]
#[command(about = "Headless flat-plane tuner for omnibus vehicle definitions")]
struct Args {
    /// Vehicle definition (RON). Defaults to the bundled city bus.
    #[arg(long)]
    vehicle: Option<PathBuf>,

    /// Scenario to run.
    #[arg(long, value_enum, default_value_t = Scenario::All)]
    scenario: Scenario,

    /// Fixed timestep (seconds).
    #[arg(long, default_value_t = 1.0 / 60.0)]
    timestep: f32,

    /// Maximum duration of the top-speed run (seconds).
    #[arg(long, default_value_t = 30.0)]
    duration: f32,

    /// Write telemetry CSV to this file instead of stdout.
    #[arg(long)]
    telemetry: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    // Telemetry owns stdout; logs go to stderr with the summary.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    anyhow::ensure!(args.timestep > 0.0, "timestep must be positive");

    let text = match &args.vehicle {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("reading vehicle definition {}", path.display()))?,
        None => CITYBUS.to_string(),
    };
    let config: VehicleConfig = ron::from_str(&text).context("parsing vehicle definition")?;
    config.validate().context("invalid vehicle definition")?;
    tracing::info!(
        "vehicle loaded: {:?}-driven, {:.0} kg, governor {:.0} km/h",
        config.drive.driven_axle,
        config.chassis.mass,
        config.drive.max_speed_kph
    );

    let mut out: Box<dyn TelemetryOutput> = match &args.telemetry {
        Some(path) => Box::new(
            FileTelemetryOutput::create(path)
                .with_context(|| format!("creating telemetry file {}", path.display()))?,
        ),
        None => Box::new(StdoutTelemetryOutput),
    };
    reset_telemetry_to(out.as_mut());

    if matches!(args.scenario, Scenario::All | Scenario::Reverse) {
        scenarios::run_reverse(&config, args.timestep, out.as_mut());
    }
    if matches!(args.scenario, Scenario::All | Scenario::TopSpeed) {
        scenarios::run_top_speed(&config, args.timestep, args.duration, out.as_mut());
    }
    if matches!(args.scenario, Scenario::All | Scenario::Lean) {
        scenarios::run_lean(&config, args.timestep, out.as_mut());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIBUS: &str = include_str!("../assets/vehicles/minibus.ron");

    #[test]
    fn test_bundled_definitions_parse_and_validate() {
        for (name, text) in [("citybus", CITYBUS), ("minibus", MINIBUS)] {
            let config: VehicleConfig =
                ron::from_str(text).unwrap_or_else(|e| panic!("{name}: {e}"));
            config.validate().unwrap_or_else(|e| panic!("{name}: {e}"));
        }
    }

    #[test]
    fn test_minibus_is_front_driven() {
        let config: VehicleConfig = ron::from_str(MINIBUS).unwrap();
        assert_eq!(config.drive.driven_axle, omnibus_dynamics::Axle::Front);
    }
}
