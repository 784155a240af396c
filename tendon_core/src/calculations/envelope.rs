//! # Prestress Envelope
//!
//! Builds the eccentricity-indexed feasible range of total prestress force
//! for one governing moment case, and answers "which forces are admissible
//! at this eccentricity?" by interpolating it.
//!
//! ## Stress states
//!
//! Each limit state is the fiber stress equation
//!
//! ```text
//! σ = F/A ± F·e·y/i² / A ± M·y/I
//! ```
//!
//! solved for `1/F`. Four curves result, one per limit:
//!
//! | curve                       | stage        | fiber             | factor      |
//! |-----------------------------|--------------|-------------------|-------------|
//! | `construction_tension`      | transfer     | far from tendons  | 1           |
//! | `construction_compression`  | transfer     | near tendons      | 1           |
//! | `service_compression`       | service      | far from tendons  | `a`         |
//! | `crack_control`             | service      | near tendons      | `a · x`     |
//!
//! `a` is the prestress-loss factor and `x` the effectiveness factor.
//! The query reports `min_force = 1 / max(R1, R2, R3)` and
//! `max_force = 1 / R4`.
//!
//! ## Example
//!
//! ```rust
//! use tendon_core::calculations::envelope::{build, EnvelopeInput, MomentSet, Side, StressLimits};
//! use tendon_core::section::SectionGeometry;
//! use tendon_core::settings::EnvelopeSettings;
//!
//! let input = EnvelopeInput {
//!     section: SectionGeometry::rectangular(2.5, 2.8).unwrap(),
//!     moments: MomentSet::new(31000.0, 36700.0, 35600.0),
//!     limits: StressLimits::new(0.0, 22410.0, 0.0, 22400.0),
//!     side: None,
//! };
//! let envelope = build(&input, &EnvelopeSettings::default()).unwrap();
//! assert_eq!(envelope.side, Side::Bottom);
//!
//! let range = envelope.query(0.0).unwrap();
//! assert!(range.min_force < range.max_force);
//! ```

use std::fmt;
use std::str::FromStr;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::errors::{TendonError, TendonResult};
use crate::section::SectionGeometry;
use crate::settings::EnvelopeSettings;
use crate::units::{KiloPascals, MegaPascals};

// ============================================================================
// Governing side
// ============================================================================

/// The extreme fiber the tendons are placed against.
///
/// Serializes as `"Top"` / `"Bottom"`; deserializes from any selector
/// [`FromStr`] accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum Side {
    /// Top fiber (hogging moments)
    Top,
    /// Bottom fiber (sagging moments)
    Bottom,
}

impl Side {
    /// Sign of the inward direction from this fiber towards the centroid.
    ///
    /// Eccentricity is positive upwards, so moving inward from the bottom
    /// fiber increases it and moving inward from the top fiber decreases it.
    pub fn direction(&self) -> f64 {
        match self {
            Side::Top => -1.0,
            Side::Bottom => 1.0,
        }
    }

    pub fn opposite(&self) -> Side {
        match self {
            Side::Top => Side::Bottom,
            Side::Bottom => Side::Top,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Side::Top => "top",
            Side::Bottom => "bottom",
        }
    }

    /// Distance from the centroid to this side's fiber
    pub fn fiber_distance(&self, section: &SectionGeometry) -> f64 {
        match self {
            Side::Top => section.top_fiber_distance,
            Side::Bottom => section.bottom_fiber_distance,
        }
    }

    /// Eccentricity of a point `offset` metres inside this side's fiber
    pub fn eccentricity_at_offset(&self, section: &SectionGeometry, offset: f64) -> f64 {
        match self {
            Side::Top => section.top_fiber_distance - offset,
            Side::Bottom => offset - section.bottom_fiber_distance,
        }
    }

    /// True when `eccentricity` lies past the centroid, away from this fiber.
    pub fn is_past_centroid(&self, eccentricity: f64, tolerance: f64) -> bool {
        eccentricity * self.direction() > tolerance
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for Side {
    type Err = TendonError;

    /// Accepts `top`/`t`/`u` and `bottom`/`bot`/`b`, case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "top" | "t" | "u" | "upper" => Ok(Side::Top),
            "bottom" | "bot" | "b" | "lower" => Ok(Side::Bottom),
            _ => Err(TendonError::InvalidSideSelector { value: s.to_string() }),
        }
    }
}

impl TryFrom<String> for Side {
    type Error = TendonError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

// ============================================================================
// Inputs
// ============================================================================

/// Bending moments of one governing case (kN·m, sagging positive).
///
/// ## JSON Example
///
/// ```json
/// { "dead_load_knm": 31000.0, "elastic_knm": 36700.0, "short_term_knm": 35600.0 }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MomentSet {
    /// Construction stage (self-weight at transfer)
    pub dead_load_knm: f64,

    /// Elastic (characteristic) service combination
    pub elastic_knm: f64,

    /// Short-term (frequent) service combination
    pub short_term_knm: f64,
}

impl MomentSet {
    pub fn new(dead_load_knm: f64, elastic_knm: f64, short_term_knm: f64) -> Self {
        MomentSet {
            dead_load_knm,
            elastic_knm,
            short_term_knm,
        }
    }

    /// Sagging dead load puts the tendons at the bottom, anything else at the top.
    pub fn governing_side(&self) -> Side {
        if self.dead_load_knm > 0.0 {
            Side::Bottom
        } else {
            Side::Top
        }
    }

    /// Moments with the sign convention of `side`: as given for the bottom,
    /// negated for the top so hogging moments read positive.
    fn oriented(&self, side: Side) -> MomentSet {
        match side {
            Side::Bottom => *self,
            Side::Top => MomentSet::new(-self.dead_load_knm, -self.elastic_knm, -self.short_term_knm),
        }
    }

    pub fn validate(&self) -> TendonResult<()> {
        for (field, value) in [
            ("dead_load_knm", self.dead_load_knm),
            ("elastic_knm", self.elastic_knm),
            ("short_term_knm", self.short_term_knm),
        ] {
            if !value.is_finite() {
                return Err(TendonError::invalid_input(field, value.to_string(), "Moment must be finite"));
            }
        }
        Ok(())
    }
}

fn default_loss_factor() -> f64 {
    0.8
}

fn default_effectiveness_factor() -> f64 {
    0.85
}

/// Allowable concrete stresses (kPa, magnitudes) and prestress factors.
///
/// ## JSON Example
///
/// ```json
/// {
///   "construction_tension_kpa": 0.0,
///   "construction_compression_kpa": 22410.0,
///   "service_tension_kpa": 0.0,
///   "service_compression_kpa": 22400.0,
///   "loss_factor": 0.8,
///   "effectiveness_factor": 0.85
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StressLimits {
    /// Allowable tension at transfer
    pub construction_tension_kpa: f64,

    /// Allowable compression at transfer
    pub construction_compression_kpa: f64,

    /// Allowable tension in service (crack control)
    pub service_tension_kpa: f64,

    /// Allowable compression in service
    pub service_compression_kpa: f64,

    /// Ratio of effective to initial prestress after losses
    #[serde(default = "default_loss_factor")]
    pub loss_factor: f64,

    /// 0.85 for fully prestressed sections, 1.0 otherwise
    #[serde(default = "default_effectiveness_factor")]
    pub effectiveness_factor: f64,
}

impl StressLimits {
    /// Limits in kPa with the default loss (0.8) and effectiveness (0.85) factors.
    pub fn new(
        construction_tension_kpa: f64,
        construction_compression_kpa: f64,
        service_tension_kpa: f64,
        service_compression_kpa: f64,
    ) -> Self {
        StressLimits {
            construction_tension_kpa,
            construction_compression_kpa,
            service_tension_kpa,
            service_compression_kpa,
            loss_factor: default_loss_factor(),
            effectiveness_factor: default_effectiveness_factor(),
        }
    }

    /// Limits given in MPa.
    pub fn from_mpa(
        construction_tension: MegaPascals,
        construction_compression: MegaPascals,
        service_tension: MegaPascals,
        service_compression: MegaPascals,
    ) -> Self {
        let kpa = |s: MegaPascals| KiloPascals::from(s).0;
        StressLimits::new(
            kpa(construction_tension),
            kpa(construction_compression),
            kpa(service_tension),
            kpa(service_compression),
        )
    }

    /// Use effectiveness factor 1.0 (partially prestressed section).
    pub fn partially_prestressed(mut self) -> Self {
        self.effectiveness_factor = 1.0;
        self
    }

    pub fn validate(&self) -> TendonResult<()> {
        for (field, value) in [
            ("construction_tension_kpa", self.construction_tension_kpa),
            ("construction_compression_kpa", self.construction_compression_kpa),
            ("service_tension_kpa", self.service_tension_kpa),
            ("service_compression_kpa", self.service_compression_kpa),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(TendonError::invalid_input(
                    field,
                    value.to_string(),
                    "Allowable stress must be a non-negative magnitude",
                ));
            }
        }
        for (field, value) in [
            ("loss_factor", self.loss_factor),
            ("effectiveness_factor", self.effectiveness_factor),
        ] {
            if !value.is_finite() || value <= 0.0 || value > 1.0 {
                return Err(TendonError::invalid_input(
                    field,
                    value.to_string(),
                    "Factor must lie in (0, 1]",
                ));
            }
        }
        Ok(())
    }
}

/// Everything needed to build one envelope.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnvelopeInput {
    pub section: SectionGeometry,
    pub moments: MomentSet,
    pub limits: StressLimits,

    /// Force the governing side instead of deriving it from the dead-load sign
    #[serde(default)]
    pub side: Option<Side>,
}

impl EnvelopeInput {
    pub fn validate(&self) -> TendonResult<()> {
        self.section.validate()?;
        self.moments.validate()?;
        self.limits.validate()
    }
}

// ============================================================================
// Envelope
// ============================================================================

/// The four reciprocal-force bounds at one eccentricity (1/kN).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReciprocalBounds {
    pub construction_tension: f64,
    pub construction_compression: f64,
    pub service_compression: f64,
    pub crack_control: f64,
}

impl ReciprocalBounds {
    /// The largest of the first three bounds
    pub fn governing_lower(&self) -> f64 {
        self.construction_tension
            .max(self.construction_compression)
            .max(self.service_compression)
    }

    pub fn force_range(&self) -> ForceRange {
        ForceRange {
            min_force: 1.0 / self.governing_lower(),
            max_force: 1.0 / self.crack_control,
        }
    }
}

/// Admissible total prestress force at one eccentricity (kN).
///
/// No ordering is guaranteed: `min_force > max_force` marks an infeasible
/// eccentricity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForceRange {
    pub min_force: f64,
    pub max_force: f64,
}

impl ForceRange {
    /// Non-empty interval of real forces
    pub fn is_feasible(&self) -> bool {
        self.min_force <= self.max_force
    }

    /// `min < force < max`
    pub fn contains_strictly(&self, force: f64) -> bool {
        self.min_force < force && force < self.max_force
    }

    pub fn contains(&self, force: f64) -> bool {
        self.min_force <= force && force <= self.max_force
    }

    /// Overlap of two ranges, `None` when they are disjoint or either is empty.
    pub fn intersect(&self, other: &ForceRange) -> Option<ForceRange> {
        let range = ForceRange {
            min_force: self.min_force.max(other.min_force),
            max_force: self.max_force.min(other.max_force),
        };
        if self.is_feasible() && other.is_feasible() && range.is_feasible() {
            Some(range)
        } else {
            None
        }
    }
}

/// Stress-limit curves sampled over `[-bottom_fiber_distance, +top_fiber_distance]`.
///
/// Built once per moment case, immutable afterwards. The reciprocal values
/// may be negative or infinite where a limit state never binds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Side the tendons are placed against
    pub side: Side,

    /// Section the envelope was built for
    pub section: SectionGeometry,

    /// Eccentricity grid, ascending (m)
    pub eccentricities: Vec<f64>,

    /// R1: transfer tension limit (1/kN)
    pub construction_tension: Vec<f64>,

    /// R2: transfer compression limit (1/kN)
    pub construction_compression: Vec<f64>,

    /// R3: service compression limit (1/kN)
    pub service_compression: Vec<f64>,

    /// R4: service tension / crack-control limit (1/kN)
    pub crack_control: Vec<f64>,

    /// Query behaviour at the domain edges
    pub settings: EnvelopeSettings,
}

/// Build the envelope for `input`, deriving the side from the dead-load
/// moment unless `input.side` forces one.
pub fn build(input: &EnvelopeInput, settings: &EnvelopeSettings) -> TendonResult<Envelope> {
    input.validate()?;
    settings.validate()?;

    let side = input.side.unwrap_or_else(|| input.moments.governing_side());
    let section = &input.section;
    let limits = &input.limits;
    let m = input.moments.oriented(side);

    let area = section.area;
    let inertia = section.moment_of_inertia;
    let i2 = section.gyration_squared();
    // y_far: fiber opposite the tendons, y_near: fiber next to them
    let (y_far, y_near) = match side {
        Side::Bottom => (section.top_fiber_distance, section.bottom_fiber_distance),
        Side::Top => (section.bottom_fiber_distance, section.top_fiber_distance),
    };
    let a = limits.loss_factor;
    let x = limits.effectiveness_factor;

    let eccentricities = linspace(
        -section.bottom_fiber_distance,
        section.top_fiber_distance,
        settings.sample_count,
    );

    let n = eccentricities.len();
    let mut construction_tension = Vec::with_capacity(n);
    let mut construction_compression = Vec::with_capacity(n);
    let mut service_compression = Vec::with_capacity(n);
    let mut crack_control = Vec::with_capacity(n);

    for &e in &eccentricities {
        // eccentricity measured towards the tendon fiber
        let ep = -side.direction() * e;
        construction_tension.push(
            (ep * y_far / i2 - 1.0) / (area * (m.dead_load_knm * y_far / inertia - limits.construction_tension_kpa)),
        );
        construction_compression.push(
            (1.0 + ep * y_near / i2)
                / (area * (m.dead_load_knm * y_near / inertia + limits.construction_compression_kpa)),
        );
        service_compression.push(
            a * (1.0 - ep * y_far / i2) / (area * (limits.service_compression_kpa - m.elastic_knm * y_far / inertia)),
        );
        crack_control.push(
            x * a * (1.0 + ep * y_near / i2) / (area * (m.short_term_knm * y_near / inertia - limits.service_tension_kpa)),
        );
    }

    debug!(
        "built {} envelope: {} samples over [{:.3}, {:.3}] m",
        side,
        n,
        -section.bottom_fiber_distance,
        section.top_fiber_distance
    );

    Ok(Envelope {
        side,
        section: *section,
        eccentricities,
        construction_tension,
        construction_compression,
        service_compression,
        crack_control,
        settings: *settings,
    })
}

/// Build the envelope with the tendons forced to `side`, ignoring
/// `input.side`. Moments keep the sagging-positive convention.
pub fn build_for_side(input: &EnvelopeInput, side: Side, settings: &EnvelopeSettings) -> TendonResult<Envelope> {
    build(
        &EnvelopeInput {
            side: Some(side),
            ..*input
        },
        settings,
    )
}

impl Envelope {
    /// Sampled eccentricity domain `(min, max)`
    pub fn domain(&self) -> (f64, f64) {
        let lo = self.eccentricities.first().copied().unwrap_or(0.0);
        let hi = self.eccentricities.last().copied().unwrap_or(0.0);
        (lo, hi)
    }

    pub fn in_domain(&self, eccentricity: f64) -> bool {
        let (lo, hi) = self.domain();
        let tol = self.settings.domain_tolerance_m;
        eccentricity >= lo - tol && eccentricity <= hi + tol
    }

    /// Interpolated reciprocal bounds at `eccentricity`.
    ///
    /// Outside the domain the end segments are extrapolated linearly, or
    /// `EnvelopeDomainViolation` is returned in strict mode.
    pub fn reciprocal_bounds(&self, eccentricity: f64) -> TendonResult<ReciprocalBounds> {
        if !eccentricity.is_finite() {
            return Err(TendonError::invalid_input(
                "eccentricity",
                eccentricity.to_string(),
                "Eccentricity must be finite",
            ));
        }
        if !self.in_domain(eccentricity) {
            let (min, max) = self.domain();
            if self.settings.strict_domain {
                return Err(TendonError::EnvelopeDomainViolation { eccentricity, min, max });
            }
            warn!(
                "eccentricity {:.4} m outside envelope domain [{:.4}, {:.4}], extrapolating",
                eccentricity, min, max
            );
        }
        let xs = &self.eccentricities;
        Ok(ReciprocalBounds {
            construction_tension: interpolate(xs, &self.construction_tension, eccentricity),
            construction_compression: interpolate(xs, &self.construction_compression, eccentricity),
            service_compression: interpolate(xs, &self.service_compression, eccentricity),
            crack_control: interpolate(xs, &self.crack_control, eccentricity),
        })
    }

    /// Admissible force interval at `eccentricity`.
    pub fn query(&self, eccentricity: f64) -> TendonResult<ForceRange> {
        Ok(self.reciprocal_bounds(eccentricity)?.force_range())
    }

    /// Grid samples whose force interval is non-empty
    pub fn admissible_eccentricities(&self) -> Vec<f64> {
        self.eccentricities
            .iter()
            .enumerate()
            .filter(|&(i, _)| self.bounds_at_sample(i).force_range().is_feasible())
            .map(|(_, &e)| e)
            .collect()
    }

    fn bounds_at_sample(&self, i: usize) -> ReciprocalBounds {
        ReciprocalBounds {
            construction_tension: self.construction_tension[i],
            construction_compression: self.construction_compression[i],
            service_compression: self.service_compression[i],
            crack_control: self.crack_control[i],
        }
    }

    /// Curves and an optional `(eccentricity, force)` marker for a plotting front end.
    pub fn plot_data(&self, test_point: Option<(f64, f64)>) -> EnvelopePlot {
        EnvelopePlot {
            side: self.side,
            eccentricities: self.eccentricities.clone(),
            curves: vec![
                PlotCurve::new("construction_tension", &self.construction_tension),
                PlotCurve::new("construction_compression", &self.construction_compression),
                PlotCurve::new("service_compression", &self.service_compression),
                PlotCurve::new("crack_control", &self.crack_control),
            ],
            governing_lower: (0..self.eccentricities.len())
                .map(|i| self.bounds_at_sample(i).governing_lower())
                .collect(),
            test_point: test_point.map(|(e, force)| PlotPoint {
                eccentricity: e,
                reciprocal_force: 1.0 / force,
            }),
        }
    }
}

/// Plain data handed to an external plotter (1/kN over m).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvelopePlot {
    pub side: Side,
    pub eccentricities: Vec<f64>,
    pub curves: Vec<PlotCurve>,
    /// max(R1, R2, R3) per sample; the shaded band lies between it and R4
    pub governing_lower: Vec<f64>,
    pub test_point: Option<PlotPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotCurve {
    pub label: String,
    pub values: Vec<f64>,
}

impl PlotCurve {
    fn new(label: &str, values: &[f64]) -> Self {
        PlotCurve {
            label: label.to_string(),
            values: values.to_vec(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlotPoint {
    pub eccentricity: f64,
    pub reciprocal_force: f64,
}

// ============================================================================
// Numeric helpers
// ============================================================================

/// `count` evenly spaced points from `start` to `end` inclusive.
fn linspace(start: f64, end: f64, count: usize) -> Vec<f64> {
    if count < 2 {
        return vec![start];
    }
    let step = (end - start) / (count - 1) as f64;
    (0..count)
        .map(|i| if i == count - 1 { end } else { start + step * i as f64 })
        .collect()
}

/// Piecewise-linear interpolation over ascending `xs`, extrapolating the
/// end segments outside `[xs[0], xs[n-1]]`.
fn interpolate(xs: &[f64], ys: &[f64], x: f64) -> f64 {
    let n = xs.len().min(ys.len());
    match n {
        0 => f64::NAN,
        1 => ys[0],
        _ => {
            // index of the segment's right end, clamped to [1, n - 1]
            let right = xs[..n].partition_point(|&xi| xi < x).clamp(1, n - 1);
            let (x0, x1) = (xs[right - 1], xs[right]);
            let (y0, y1) = (ys[right - 1], ys[right]);
            let t = (x - x0) / (x1 - x0);
            y0 + t * (y1 - y0)
        }
    }
}
