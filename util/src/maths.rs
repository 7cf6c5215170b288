//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Map a value from one range into another.
pub fn lin_map<T>(source_range: (T, T), target_range: (T, T), value: T) -> T
where
    T: Float
{
    target_range.0
        + ((value - source_range.0)
        * (target_range.1 - target_range.0)
        / (source_range.1 - source_range.0))
}

/// Clamp a value between a minimum and maximum.
pub fn clamp<T>(value: &T, min: &T, max: &T) -> T
where
    T: Float
{
    let mut ret = *value;

    if ret > *max {
        ret = *max
    }
    if ret < *min {
        ret = *min
    }

    ret
}

/// Calculates the least nonnegative remainder of `lhs (mod rhs)`.
///
/// This function is taken from the std library as num is missing it.
pub fn rem_euclid<T>(lhs: T, rhs: T) -> T
where
    T: Float + std::ops::Rem
{
    let r = lhs % rhs;
    if r < T::from(0.0).unwrap() { r + rhs.abs() } else { r }
}

/// Normalise an angle into the range [-pi, pi).
pub fn norm_angle_rad<T>(angle: T) -> T
where
    T: Float
{
    let pi_t = T::from(std::f64::consts::PI).unwrap();
    let tau_t = T::from(std::f64::consts::TAU).unwrap();

    rem_euclid(angle + pi_t, tau_t) - pi_t
}

/// Get the shortest signed angular distance from `a` to `b`.
///
/// The result is in the range [-pi, pi), so that
/// `norm_angle_rad(a + ang_dist_rad(a, b)) == norm_angle_rad(b)`. Accounts
/// for wrapping, e.g. the distance from `0.1` to `tau - 0.1` is `-0.2` and
/// not `tau - 0.2`.
pub fn ang_dist_rad<T>(a: T, b: T) -> T
where
    T: Float
{
    norm_angle_rad(b - a)
}

/// Interpolate between two angles along the shortest arc.
///
/// `t = 0` gives `a`, `t = 1` gives `b`, values in between sweep along the
/// shorter of the two arcs joining the angles. The result is normalised into
/// [-pi, pi).
pub fn ang_lerp_rad<T>(a: T, b: T, t: T) -> T
where
    T: Float
{
    norm_angle_rad(a + ang_dist_rad(a, b) * t)
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    const PI: f64 = std::f64::consts::PI;
    const TAU: f64 = std::f64::consts::TAU;

    #[test]
    fn test_norm_angle_rad() {
        assert!((norm_angle_rad(0f64)).abs() < 1e-12);
        assert!((norm_angle_rad(PI) - (-PI)).abs() < 1e-12);
        assert!((norm_angle_rad(-PI) - (-PI)).abs() < 1e-12);
        assert!((norm_angle_rad(TAU + 1f64) - 1f64).abs() < 1e-12);
        assert!((norm_angle_rad(-TAU - 1f64) - (-1f64)).abs() < 1e-12);
        assert!((norm_angle_rad(3.0 * PI) - (-PI)).abs() < 1e-12);
    }

    #[test]
    fn test_ang_dist_rad() {
        assert!((ang_dist_rad(1f64, 2f64) - 1f64).abs() < 1e-12);
        assert!((ang_dist_rad(2f64, 1f64) - (-1f64)).abs() < 1e-12);
        assert!((ang_dist_rad(0f64, TAU)).abs() < 1e-12);
        assert!((ang_dist_rad(0.1f64, TAU - 0.1) - (-0.2)).abs() < 1e-12);
        assert!((ang_dist_rad(TAU - 1f64, 1f64) - 2f64).abs() < 1e-12);
    }

    #[test]
    fn test_ang_lerp_rad() {
        // Midpoint of a wrap-around lerp sits on the -x axis side
        let mid = ang_lerp_rad(0.75 * TAU, 0.25 * TAU + TAU, 0.5);
        assert!((mid - (-PI)).abs() < 1e-9);

        // Endpoints are exact
        assert!((ang_lerp_rad(0.3f64, 1.1, 0.0) - 0.3).abs() < 1e-12);
        assert!((ang_lerp_rad(0.3f64, 1.1, 1.0) - 1.1).abs() < 1e-12);
    }

    #[test]
    fn test_lin_map() {
        assert!((lin_map((0f64, 1f64), (0f64, 10f64), 0.5) - 5f64).abs() < 1e-12);
        assert!((lin_map((-1f64, 1f64), (0f64, 1f64), 0f64) - 0.5).abs() < 1e-12);
    }
}
