//! Scalar smoothing filters.
//!
//! The pedal, throttle, and steering paths are all built from two filters:
//! a bounded-rate approach ([`move_towards`]) and a critically damped
//! second-order filter with an explicit velocity state ([`smooth_damp`]).

/// Move `current` toward `target` by at most `max_delta`, snapping exactly
/// to `target` when within range.
pub fn move_towards(current: f32, target: f32, max_delta: f32) -> f32 {
    let delta = target - current;
    if delta.abs() <= max_delta {
        target
    } else {
        current + max_delta.copysign(delta)
    }
}

/// Linear interpolation with `t` clamped to `[0, 1]`.
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t.clamp(0.0, 1.0)
}

/// Critically damped approach of `current` toward `target`.
///
/// `velocity` is the filter's state and must be carried between calls.
/// `smooth_time` is the approximate time to close most of the gap; the
/// response never overshoots the target, which keeps abrupt command changes
/// from snapping the output past zero.
///
/// `dt` must be positive.
pub fn smooth_damp(
    current: f32,
    target: f32,
    velocity: &mut f32,
    smooth_time: f32,
    dt: f32,
) -> f32 {
    let smooth_time = smooth_time.max(1e-4);
    let omega = 2.0 / smooth_time;

    // Pade approximation of e^-x, stable for the step sizes we run at.
    let x = omega * dt;
    let exp = 1.0 / (1.0 + x + 0.48 * x * x + 0.235 * x * x * x);

    let change = current - target;
    let temp = (*velocity + omega * change) * dt;
    *velocity = (*velocity - omega * temp) * exp;
    let mut output = target + (change + temp) * exp;

    // Clamp any overshoot past the target.
    if (target - current > 0.0) == (output > target) {
        output = target;
        *velocity = (output - target) / dt;
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_towards_snaps_within_range() {
        assert_eq!(move_towards(0.9, 1.0, 0.2), 1.0);
        assert_eq!(move_towards(0.1, 0.0, 0.2), 0.0);
    }

    #[test]
    fn test_move_towards_bounded_step() {
        assert!((move_towards(0.0, 1.0, 0.25) - 0.25).abs() < 1e-6);
        assert!((move_towards(1.0, 0.0, 0.25) - 0.75).abs() < 1e-6);
        assert!((move_towards(-0.5, -1.0, 0.1) - -0.6).abs() < 1e-6);
    }

    #[test]
    fn test_lerp_clamps_factor() {
        assert_eq!(lerp(0.0, 10.0, 0.5), 5.0);
        assert_eq!(lerp(0.0, 10.0, 2.0), 10.0);
        assert_eq!(lerp(0.0, 10.0, -1.0), 0.0);
    }

    #[test]
    fn test_smooth_damp_converges() {
        let dt = 1.0 / 60.0;
        let mut value = 0.0;
        let mut velocity = 0.0;
        for _ in 0..120 {
            value = smooth_damp(value, 1.0, &mut velocity, 0.2, dt);
            assert!(value <= 1.0, "overshot: {value}");
        }
        assert!((value - 1.0).abs() < 0.01, "did not converge: {value}");
    }

    #[test]
    fn test_smooth_damp_decay_never_crosses_zero() {
        let dt = 1.0 / 60.0;
        let mut value = 1.0;
        let mut velocity = 0.0;
        let mut prev = value;
        for _ in 0..240 {
            value = smooth_damp(value, 0.0, &mut velocity, 0.2, dt);
            assert!(value >= 0.0, "crossed zero: {value}");
            assert!(value <= prev + 1e-6, "not monotonic: {prev} -> {value}");
            prev = value;
        }
        assert!(value < 1e-3);
    }
}
