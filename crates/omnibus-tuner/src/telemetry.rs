//! CSV telemetry for tuner runs.
//!
//! One macro defines the schema: column names, formats, and row
//! expressions stay in sync in a single place. Output goes through
//! [`TelemetryOutput`] so scenarios can write to stdout or a file.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use omnibus_dynamics::VehicleState;

/// Snapshot of controller state for one telemetry row.
pub struct TelemetrySnapshot {
    pub elapsed: f32,
    pub dt: f32,
    pub gear: &'static str,
    pub throttle_level: f32,
    pub brake_level: f32,
    pub current_throttle: f32,
    pub steer_command: f32,
    pub steering_angle: f32,
    pub speed: f32,
    pub grounded: bool,
    pub reverse_hold: f32,
    pub body_roll: f32,
    pub body_pitch: f32,
    pub compression: [f32; 4],
}

impl TelemetrySnapshot {
    /// Capture a row from the controller state.
    pub fn capture(elapsed: f32, dt: f32, state: &VehicleState) -> Self {
        let mut compression = [0.0; 4];
        for (slot, contact) in compression.iter_mut().zip(&state.contacts) {
            *slot = contact.compression;
        }
        Self {
            elapsed,
            dt,
            gear: state.gear().label(),
            throttle_level: state.throttle_level,
            brake_level: state.brake_level,
            current_throttle: state.current_throttle,
            steer_command: state.steer_command,
            steering_angle: state.steering_angle,
            speed: state.speed,
            grounded: state.grounded,
            reverse_hold: state.reverse_hold,
            body_roll: state.body_roll,
            body_pitch: state.body_pitch,
            compression,
        }
    }
}

/// Destination for telemetry lines.
pub trait TelemetryOutput {
    fn write_line(&mut self, line: &str);
}

/// Telemetry to stdout, leaving stderr for the summary.
pub struct StdoutTelemetryOutput;

impl TelemetryOutput for StdoutTelemetryOutput {
    fn write_line(&mut self, line: &str) {
        println!("{line}");
    }
}

/// Telemetry to a file.
pub struct FileTelemetryOutput {
    writer: BufWriter<File>,
}

impl FileTelemetryOutput {
    pub fn create(path: &Path) -> std::io::Result<Self> {
        Ok(Self {
            writer: BufWriter::new(File::create(path)?),
        })
    }
}

impl TelemetryOutput for FileTelemetryOutput {
    fn write_line(&mut self, line: &str) {
        let _ = writeln!(self.writer, "{line}");
    }
}

/// Macro to define the CSV schema and generate the telemetry functions.
///
/// Generates `reset_telemetry_to()` (header) and `emit_telemetry_to()`
/// (row) from a single schema definition, keeping column names and formats
/// in sync.
macro_rules! define_telemetry {
    (
        columns: { $( $name:ident : $fmt:literal ),* $(,)? },
        prelude: |$snapshot:ident| { $( $prelude:stmt );* $(;)? },
        row_values: { $( $val:expr ),* $(,)? }
    ) => {
        /// Write the CSV header (call once at the start of a run).
        pub fn reset_telemetry_to(out: &mut dyn TelemetryOutput) {
            const CSV_HEADER: &str = concat!( $( stringify!($name), "," ),* );
            out.write_line(CSV_HEADER.trim_end_matches(','));
        }

        /// Write one telemetry row.
        pub fn emit_telemetry_to($snapshot: &TelemetrySnapshot, out: &mut dyn TelemetryOutput) {
            // Compute derived values.
            $( $prelude )*

            // Generate the row from the schema, then trim the trailing comma.
            let line = format!( concat!( $( $fmt, "," ),* ), $( $val ),* );
            out.write_line(line.trim_end_matches(','));
        }
    };
}

define_telemetry! {
    columns: {
        t: "{:.4}",
        dt: "{:.5}",
        gear: "{}",
        throttle_level: "{:.3}",
        brake_level: "{:.3}",
        throttle: "{:.3}",
        steer_cmd: "{:.3}",
        steer: "{:.3}",
        speed: "{:.2}",
        speed_kph: "{:.2}",
        grounded: "{}",
        rev_hold: "{:.3}",
        roll_deg: "{:.2}",
        pitch_deg: "{:.2}",
        c_fl: "{:.3}",
        c_fr: "{:.3}",
        c_rl: "{:.3}",
        c_rr: "{:.3}",
    },
    prelude: |t| {
        let speed_kph = t.speed * 3.6;
        let [c_fl, c_fr, c_rl, c_rr] = t.compression;
    },
    row_values: {
        t.elapsed,
        t.dt,
        t.gear,
        t.throttle_level,
        t.brake_level,
        t.current_throttle,
        t.steer_command,
        t.steering_angle,
        t.speed,
        speed_kph,
        t.grounded as u8,
        t.reverse_hold,
        t.body_roll,
        t.body_pitch,
        c_fl,
        c_fr,
        c_rl,
        c_rr,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct VecOutput(Vec<String>);

    impl TelemetryOutput for VecOutput {
        fn write_line(&mut self, line: &str) {
            self.0.push(line.to_string());
        }
    }

    #[test]
    fn test_header_and_row_column_counts_match() {
        let mut out = VecOutput(Vec::new());
        reset_telemetry_to(&mut out);

        let state = VehicleState::default();
        let snapshot = TelemetrySnapshot::capture(0.5, 1.0 / 60.0, &state);
        emit_telemetry_to(&snapshot, &mut out);

        let header_cols = out.0[0].split(',').count();
        let row_cols = out.0[1].split(',').count();
        assert_eq!(header_cols, row_cols);
        assert!(out.0[0].starts_with("t,dt,gear,"));
    }

    #[test]
    fn test_row_carries_gear_label() {
        let mut out = VecOutput(Vec::new());
        let mut state = VehicleState::default();
        state.reversing = true;
        let snapshot = TelemetrySnapshot::capture(1.0, 0.1, &state);
        emit_telemetry_to(&snapshot, &mut out);
        let fields: Vec<&str> = out.0[0].split(',').collect();
        assert_eq!(fields[2], "R");
    }
}
