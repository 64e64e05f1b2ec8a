//! # Reference line
//!
//! The reference line is the sampled centerline of a road. It is stored as a
//! set of channels which all share one constantly spaced U axis:
//!
//! - `x` and `y` hold the centerline position at every U sample.
//! - `phi` holds the heading valid over the segment starting at each sample.
//!   It is a step function, it is never interpolated between samples.
//!
//! The centerline between two samples is a straight line, so the reference
//! line as a whole is a polyline. Lateral positions (`v`) are measured to the
//! left of the direction of travel.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
pub use params::*;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::debug;
use nalgebra::Vector2;
use ndarray::Array1;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Distance between the first and last centerline points under which the
/// reference line is considered closed.
///
/// Units: meters
pub const CLOSED_TOLERANCE_M: f64 = 1.0e-4;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A constantly spaced axis of U positions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UAxis {
    /// Position of the first sample.
    ///
    /// Units: meters
    pub first_m: f64,

    /// Spacing between two samples, always positive.
    ///
    /// Units: meters
    pub inc_m: f64,

    /// Number of samples, at least 2.
    pub num: usize,

    /// Position of the last sample.
    ///
    /// Units: meters
    pub last_m: f64,
}

/// One channel of per-sample values.
#[derive(Debug, Clone)]
pub struct Channel {
    data: Array1<f64>,
    valid: bool,
    first: f64,
    last: f64,
}

/// Values derived once from the channels and used by every evaluation.
#[derive(Debug, Clone, Copy, Default)]
pub struct RefLineUtil {
    /// True if the last centerline point coincides with the first one.
    pub is_closed: bool,

    /// Cosine of the heading at the first sample
    pub phi_first_cos: f64,

    /// Sine of the heading at the first sample
    pub phi_first_sin: f64,

    /// Cosine of the heading at the last sample
    pub phi_last_cos: f64,

    /// Sine of the heading at the last sample
    pub phi_last_sin: f64,
}

/// A sampled road reference line.
#[derive(Debug, Clone)]
pub struct ReferenceLine {
    pub(crate) u: UAxis,
    pub(crate) x: Channel,
    pub(crate) y: Channel,
    pub(crate) phi: Channel,
    pub(crate) util: RefLineUtil,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors which can occur while building a reference line.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum RefLineError {
    #[error("The U increment must be positive and finite, found {0}")]
    InvalidIncrement(f64),

    #[error("The first U position must be finite, found {0}")]
    InvalidFirstU(f64),

    #[error("A reference line needs at least 2 samples, found {0}")]
    NotEnoughSamples(usize),

    #[error("Channel {channel} has {found} samples, expected {expected}")]
    ChannelSizeMismatch {
        channel: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("Channel {channel} contains a non-finite value at sample {index}")]
    NonFiniteValue {
        channel: &'static str,
        index: usize,
    },

    #[error("Attempted to create a reference line from an empty curvature sequence")]
    EmptySequence,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl UAxis {
    fn new(first_m: f64, inc_m: f64, num: usize) -> Result<Self, RefLineError> {
        if !first_m.is_finite() {
            return Err(RefLineError::InvalidFirstU(first_m));
        }
        if !(inc_m > 0.0) || !inc_m.is_finite() {
            return Err(RefLineError::InvalidIncrement(inc_m));
        }
        if num < 2 {
            return Err(RefLineError::NotEnoughSamples(num));
        }

        Ok(Self {
            first_m,
            inc_m,
            num,
            last_m: first_m + (num - 1) as f64 * inc_m,
        })
    }
}

impl Channel {
    /// Build a valid channel from the given data, checking its size against
    /// the U axis.
    fn new(
        name: &'static str,
        data: Array1<f64>,
        u: &UAxis,
    ) -> Result<Self, RefLineError> {
        if data.len() != u.num {
            return Err(RefLineError::ChannelSizeMismatch {
                channel: name,
                expected: u.num,
                found: data.len(),
            });
        }

        if let Some(index) = data.iter().position(|v| !v.is_finite()) {
            return Err(RefLineError::NonFiniteValue {
                channel: name,
                index,
            });
        }

        Ok(Self {
            first: data[0],
            last: data[data.len() - 1],
            data,
            valid: true,
        })
    }

    /// An empty channel, marked as invalid.
    fn invalid() -> Self {
        Self {
            data: Array1::zeros(0),
            valid: false,
            first: 0.0,
            last: 0.0,
        }
    }

    /// Number of samples in the channel.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn first(&self) -> f64 {
        self.first
    }

    pub fn last(&self) -> f64 {
        self.last
    }

    pub fn data(&self) -> &Array1<f64> {
        &self.data
    }
}

impl ReferenceLine {
    /// Build a reference line from explicit centerline points.
    ///
    /// The heading of each sample is the direction of the segment starting at
    /// it, the last sample repeats the heading of the last segment.
    pub fn from_points(
        u_first_m: f64,
        u_inc_m: f64,
        x_m: Vec<f64>,
        y_m: Vec<f64>,
    ) -> Result<Self, RefLineError> {
        let u = UAxis::new(u_first_m, u_inc_m, x_m.len())?;

        if y_m.len() != u.num {
            return Err(RefLineError::ChannelSizeMismatch {
                channel: "y",
                expected: u.num,
                found: y_m.len(),
            });
        }

        let mut phi_rad: Vec<f64> = x_m
            .windows(2)
            .zip(y_m.windows(2))
            .map(|(x, y)| (y[1] - y[0]).atan2(x[1] - x[0]))
            .collect();
        phi_rad.push(phi_rad[phi_rad.len() - 1]);

        Self::from_channels(u, x_m.into(), y_m.into(), phi_rad.into())
    }

    /// Build a reference line from a start point and the heading of every
    /// sample.
    ///
    /// The centerline is integrated from the start point, advancing by the U
    /// increment along the heading of each sample. The heading of the last
    /// sample is only used for extrapolation beyond the end.
    pub fn from_headings(
        u_first_m: f64,
        u_inc_m: f64,
        x_first_m: f64,
        y_first_m: f64,
        phi_rad: Vec<f64>,
    ) -> Result<Self, RefLineError> {
        let u = UAxis::new(u_first_m, u_inc_m, phi_rad.len())?;

        let mut x_m = Array1::zeros(u.num);
        let mut y_m = Array1::zeros(u.num);
        x_m[0] = x_first_m;
        y_m[0] = y_first_m;

        for i in 1..u.num {
            x_m[i] = x_m[i - 1] + u.inc_m * phi_rad[i - 1].cos();
            y_m[i] = y_m[i - 1] + u.inc_m * phi_rad[i - 1].sin();
        }

        Self::from_channels(u, x_m, y_m, phi_rad.into())
    }

    /// A reference line with a U axis but no centerline geometry.
    ///
    /// Evaluations on it return the identity (`x = u`, `y = v`) and zero
    /// heading/curvature fallbacks.
    pub fn without_geometry(
        u_first_m: f64,
        u_inc_m: f64,
        num: usize,
    ) -> Result<Self, RefLineError> {
        Ok(Self {
            u: UAxis::new(u_first_m, u_inc_m, num)?,
            x: Channel::invalid(),
            y: Channel::invalid(),
            phi: Channel::invalid(),
            util: RefLineUtil::default(),
        })
    }

    fn from_channels(
        u: UAxis,
        x_m: Array1<f64>,
        y_m: Array1<f64>,
        phi_rad: Array1<f64>,
    ) -> Result<Self, RefLineError> {
        let x = Channel::new("x", x_m, &u)?;
        let y = Channel::new("y", y_m, &u)?;
        let phi = Channel::new("phi", phi_rad, &u)?;

        let closing_dist_m = (x.last - x.first).hypot(y.last - y.first);

        let util = RefLineUtil {
            is_closed: closing_dist_m < CLOSED_TOLERANCE_M,
            phi_first_cos: phi.first.cos(),
            phi_first_sin: phi.first.sin(),
            phi_last_cos: phi.last.cos(),
            phi_last_sin: phi.last.sin(),
        };

        debug!(
            "Reference line built: {} samples, u = [{}, {}], closed: {}",
            u.num, u.first_m, u.last_m, util.is_closed
        );

        Ok(Self { u, x, y, phi, util })
    }

    /// True if the x/y centerline is available for evaluation.
    pub fn has_geometry(&self) -> bool {
        self.x.is_valid() && !self.x.is_empty()
    }

    /// True if the end of the reference line connects back to its start.
    pub fn is_closed(&self) -> bool {
        self.util.is_closed
    }

    /// The first and last U position.
    pub fn u_range(&self) -> (f64, f64) {
        (self.u.first_m, self.u.last_m)
    }

    pub fn u_axis(&self) -> &UAxis {
        &self.u
    }

    pub fn num_samples(&self) -> usize {
        self.u.num
    }

    pub fn x(&self) -> &Channel {
        &self.x
    }

    pub fn y(&self) -> &Channel {
        &self.y
    }

    pub fn phi(&self) -> &Channel {
        &self.phi
    }

    pub fn util(&self) -> &RefLineUtil {
        &self.util
    }

    /// Centerline point at the given sample.
    ///
    /// The index must be below `num_samples()` and the line must have
    /// geometry.
    pub(crate) fn point(&self, index: usize) -> Vector2<f64> {
        Vector2::new(self.x.data[index], self.y.data[index])
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_from_points() {
        let rl = ReferenceLine::from_points(
            0.0,
            1.0,
            vec![0.0, 1.0, 1.0],
            vec![0.0, 0.0, 1.0],
        )
        .unwrap();

        assert_eq!(rl.num_samples(), 3);
        assert_eq!(rl.u_range(), (0.0, 2.0));
        assert!(rl.has_geometry());
        assert!(!rl.is_closed());

        assert_abs_diff_eq!(rl.phi().data()[0], 0.0);
        assert_abs_diff_eq!(rl.phi().data()[1], FRAC_PI_2);
        assert_abs_diff_eq!(rl.phi().last(), FRAC_PI_2);
        assert_abs_diff_eq!(rl.util().phi_last_cos, 0.0, epsilon = 1e-15);
        assert_abs_diff_eq!(rl.util().phi_last_sin, 1.0);
        assert_eq!(rl.x().last(), 1.0);
        assert_eq!(rl.y().last(), 1.0);
    }

    #[test]
    fn test_from_headings() {
        let rl = ReferenceLine::from_headings(
            5.0,
            2.0,
            1.0,
            1.0,
            vec![0.0, FRAC_PI_2, PI, PI],
        )
        .unwrap();

        assert_eq!(rl.u_range(), (5.0, 11.0));
        assert_abs_diff_eq!(rl.x().data()[1], 3.0);
        assert_abs_diff_eq!(rl.y().data()[2], 3.0);
        assert_abs_diff_eq!(rl.x().last(), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(rl.y().last(), 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_closed_detection() {
        // Square loop, 4 sides of 1 m returning to the origin
        let rl = ReferenceLine::from_headings(
            0.0,
            1.0,
            0.0,
            0.0,
            vec![0.0, FRAC_PI_2, PI, 3.0 * FRAC_PI_2, 0.0],
        )
        .unwrap();

        assert!(rl.is_closed());
    }

    #[test]
    fn test_validation() {
        assert_eq!(
            ReferenceLine::from_points(0.0, 0.0, vec![0.0, 1.0], vec![0.0, 0.0]).unwrap_err(),
            RefLineError::InvalidIncrement(0.0)
        );
        assert_eq!(
            ReferenceLine::from_points(0.0, 1.0, vec![0.0], vec![0.0]).unwrap_err(),
            RefLineError::NotEnoughSamples(1)
        );
        assert_eq!(
            ReferenceLine::from_points(0.0, 1.0, vec![0.0, 1.0], vec![0.0]).unwrap_err(),
            RefLineError::ChannelSizeMismatch {
                channel: "y",
                expected: 2,
                found: 1
            }
        );
        assert_eq!(
            ReferenceLine::from_points(0.0, 1.0, vec![0.0, f64::NAN], vec![0.0, 0.0])
                .unwrap_err(),
            RefLineError::NonFiniteValue {
                channel: "x",
                index: 1
            }
        );
    }

    #[test]
    fn test_without_geometry() {
        let rl = ReferenceLine::without_geometry(0.0, 0.5, 11).unwrap();

        assert!(!rl.has_geometry());
        assert!(!rl.is_closed());
        assert_eq!(rl.u_range(), (0.0, 5.0));
    }
}
