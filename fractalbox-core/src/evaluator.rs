use serde::{Deserialize, Serialize};

use crate::complex::Complex;
use crate::error::CoreError;

/// Parameters controlling escape-time iteration.
///
/// The cached squared fields are recomputed on deserialization so persisted
/// snapshots always stay consistent with their source values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EvalParams {
    /// Iteration budget before a point is declared non-escaping.
    /// Zero is legal: every point then classifies at iteration 0.
    pub max_iterations: u32,

    /// Escape radius — once `|z|` reaches this, the orbit has diverged.
    /// Stored directly; the loop compares against `escape_radius²`.
    pub escape_radius: f64,

    /// Cached `escape_radius * escape_radius`, precomputed to avoid
    /// redundant multiplication on every evaluation.
    #[serde(skip)]
    escape_radius_sq: f64,

    /// Convergence threshold: when consecutive orbit points are closer than
    /// this, the orbit is treated as settled and the point as non-escaping.
    pub epsilon: f64,

    /// Cached `epsilon * epsilon`.
    #[serde(skip)]
    epsilon_sq: f64,
}

/// Helper for deserialization — recomputes the cached squares on load.
impl<'de> Deserialize<'de> for EvalParams {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Raw {
            max_iterations: u32,
            escape_radius: f64,
            epsilon: f64,
        }
        let raw = Raw::deserialize(deserializer)?;
        Ok(Self {
            max_iterations: raw.max_iterations,
            escape_radius: raw.escape_radius,
            escape_radius_sq: raw.escape_radius * raw.escape_radius,
            epsilon: raw.epsilon,
            epsilon_sq: raw.epsilon * raw.epsilon,
        })
    }
}

impl EvalParams {
    pub const DEFAULT_MAX_ITERATIONS: u32 = 200;
    pub const DEFAULT_ESCAPE_RADIUS: f64 = 2.0;
    pub const DEFAULT_EPSILON: f64 = 3e-5;

    pub fn new(max_iterations: u32, escape_radius: f64, epsilon: f64) -> crate::Result<Self> {
        if escape_radius <= 0.0 || !escape_radius.is_finite() {
            return Err(CoreError::InvalidEscapeRadius(escape_radius));
        }
        if epsilon <= 0.0 || !epsilon.is_finite() {
            return Err(CoreError::InvalidEpsilon(epsilon));
        }
        Ok(Self {
            max_iterations,
            escape_radius,
            escape_radius_sq: escape_radius * escape_radius,
            epsilon,
            epsilon_sq: epsilon * epsilon,
        })
    }

    /// Pre-computed squared escape radius for the inner loop.
    #[inline]
    pub fn escape_radius_sq(&self) -> f64 {
        self.escape_radius_sq
    }

    /// Pre-computed squared convergence threshold for the inner loop.
    #[inline]
    pub fn epsilon_sq(&self) -> f64 {
        self.epsilon_sq
    }

    /// Return a copy with a different `max_iterations` value.
    pub fn with_max_iterations(self, max_iterations: u32) -> Self {
        Self {
            max_iterations,
            ..self
        }
    }
}

impl Default for EvalParams {
    fn default() -> Self {
        Self {
            max_iterations: Self::DEFAULT_MAX_ITERATIONS,
            escape_radius: Self::DEFAULT_ESCAPE_RADIUS,
            escape_radius_sq: Self::DEFAULT_ESCAPE_RADIUS * Self::DEFAULT_ESCAPE_RADIUS,
            epsilon: Self::DEFAULT_EPSILON,
            epsilon_sq: Self::DEFAULT_EPSILON * Self::DEFAULT_EPSILON,
        }
    }
}

/// The classification of a single plane point.
///
/// Converged orbits and orbits that exhaust the iteration budget are both
/// reported as `NonEscaping` — either way the point likely belongs to the
/// set interior and is drawn with the stable sentinel color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IterationOutcome {
    /// The orbit left the escape radius after `iterations` transitions.
    Escaped { iterations: u32 },

    /// The orbit settled (consecutive points within ε) or stayed bounded
    /// for the whole budget.
    NonEscaping { iterations: u32 },
}

impl IterationOutcome {
    /// The iteration count at which the classification was made.
    #[inline]
    pub fn iterations(&self) -> u32 {
        match *self {
            Self::Escaped { iterations } | Self::NonEscaping { iterations } => iterations,
        }
    }

    #[inline]
    pub fn is_escaped(&self) -> bool {
        matches!(self, Self::Escaped { .. })
    }
}

/// Which iteration family a point is evaluated under.
///
/// Both families share the recurrence `z ← z² + c`; they differ only in
/// where the parameter comes from. Mandelbrot takes `c` from the evaluated
/// point and starts at the origin; Julia carries a fixed constant and starts
/// at the point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Family {
    Mandelbrot,
    Julia { c: Complex },
}

impl Family {
    /// A visually interesting default Julia constant: `c = -0.7 + 0.27015i`.
    pub fn default_julia() -> Self {
        Self::Julia {
            c: Complex::new(-0.7, 0.27015),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Mandelbrot => "Mandelbrot",
            Self::Julia { .. } => "Julia",
        }
    }

    /// Classify a single plane point.
    ///
    /// Checked after every transition, in priority order: converged
    /// (distance to the previous orbit point below ε), escaped (|z| at or
    /// beyond the escape radius), exhausted budget. Points already outside
    /// the escape radius skip iteration and report `Escaped` at 0.
    ///
    /// Never panics; a NaN input also takes the immediate-escape path
    /// because the negated comparison below is false for NaN.
    pub fn evaluate(&self, point: Complex, params: &EvalParams) -> IterationOutcome {
        if !(point.norm_sq() < params.escape_radius_sq()) {
            return IterationOutcome::Escaped { iterations: 0 };
        }

        let (mut z, c) = match *self {
            Self::Mandelbrot => (Complex::ZERO, point),
            Self::Julia { c } => (point, c),
        };
        let mut previous = z;

        for n in 0..params.max_iterations {
            // z = z² + c
            z = z * z + c;

            if z.dist_sq(previous) < params.epsilon_sq() {
                return IterationOutcome::NonEscaping { iterations: n };
            }
            if z.norm_sq() >= params.escape_radius_sq() {
                return IterationOutcome::Escaped { iterations: n };
            }

            previous = z;
        }

        IterationOutcome::NonEscaping {
            iterations: params.max_iterations,
        }
    }
}
