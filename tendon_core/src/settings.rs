//! # Design Settings
//!
//! Explicit configuration for envelope construction and tendon placement.
//! Every operation takes its settings as an argument; there are no
//! process-wide defaults beyond the `Default` impls documented here.
//!
//! ## JSON Example
//!
//! Any field may be omitted and falls back to its default:
//!
//! ```json
//! {
//!   "envelope": { "sample_count": 51, "strict_domain": false },
//!   "layout": { "strands_per_group": 19, "vertical_spacing_m": 0.25 }
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{TendonError, TendonResult};
use crate::units::{KiloNewtons, MegaPascals, SqMillimeters};

/// Settings shared by every case of a batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DesignSettings {
    /// Envelope sampling and query behaviour
    pub envelope: EnvelopeSettings,

    /// Strand data and spacing rules
    pub layout: LayoutSettings,
}

impl DesignSettings {
    /// Validate both halves.
    pub fn validate(&self) -> TendonResult<()> {
        self.envelope.validate()?;
        self.layout.validate()
    }
}

/// How the envelope is sampled and how queries behave at its edges.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvelopeSettings {
    /// Number of eccentricity samples between the two extreme fibers
    pub sample_count: usize,

    /// Reject queries outside the sampled domain instead of extrapolating
    pub strict_domain: bool,

    /// Slack allowed past either end of the domain before a query counts
    /// as outside it (m)
    pub domain_tolerance_m: f64,
}

impl Default for EnvelopeSettings {
    fn default() -> Self {
        EnvelopeSettings {
            sample_count: 51,
            strict_domain: false,
            domain_tolerance_m: 1e-9,
        }
    }
}

impl EnvelopeSettings {
    pub fn validate(&self) -> TendonResult<()> {
        if self.sample_count < 2 {
            return Err(TendonError::invalid_input(
                "sample_count",
                self.sample_count.to_string(),
                "Envelope needs at least two samples",
            ));
        }
        if !self.domain_tolerance_m.is_finite() || self.domain_tolerance_m < 0.0 {
            return Err(TendonError::invalid_input(
                "domain_tolerance_m",
                self.domain_tolerance_m.to_string(),
                "Tolerance must be a non-negative finite number",
            ));
        }
        Ok(())
    }
}

/// Strand properties and spacing minimums for tendon placement.
///
/// Defaults correspond to 15.2 mm seven-wire strand (140 mm²) tensioned to
/// 1395 MPa, 22 strands per duct, and 0.2 m clearances throughout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutSettings {
    /// Area of one strand (mm²)
    pub strand_area_mm2: f64,

    /// Tensioning stress (MPa)
    pub tension_stress_mpa: f64,

    /// Minimum distance from the extreme fiber to the first row (m)
    pub vertical_edge_m: f64,

    /// Minimum vertical distance between rows (m)
    pub vertical_spacing_m: f64,

    /// Minimum distance from the side face to the outer group in a row (m)
    pub transverse_edge_m: f64,

    /// Minimum horizontal distance between groups in a row (m)
    pub transverse_spacing_m: f64,

    /// Strands per group (one duct / bundle)
    pub strands_per_group: i32,

    /// Row cap of the layout growth loop
    pub max_rows: usize,

    /// Step used to pull an infeasible seed row inward (m)
    pub seed_step_m: f64,

    /// Step of the inverse eccentricity scan (m)
    pub scan_step_m: f64,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        LayoutSettings {
            strand_area_mm2: 140.0,
            tension_stress_mpa: 1395.0,
            vertical_edge_m: 0.2,
            vertical_spacing_m: 0.2,
            transverse_edge_m: 0.2,
            transverse_spacing_m: 0.2,
            strands_per_group: 22,
            max_rows: 10,
            seed_step_m: 0.05,
            scan_step_m: 0.01,
        }
    }
}

impl LayoutSettings {
    pub fn validate(&self) -> TendonResult<()> {
        let positive = [
            ("strand_area_mm2", self.strand_area_mm2),
            ("tension_stress_mpa", self.tension_stress_mpa),
            ("vertical_spacing_m", self.vertical_spacing_m),
            ("transverse_spacing_m", self.transverse_spacing_m),
            ("seed_step_m", self.seed_step_m),
            ("scan_step_m", self.scan_step_m),
        ];
        for (field, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(TendonError::invalid_input(
                    field,
                    value.to_string(),
                    "Must be a positive finite number",
                ));
            }
        }
        for (field, value) in [
            ("vertical_edge_m", self.vertical_edge_m),
            ("transverse_edge_m", self.transverse_edge_m),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(TendonError::invalid_input(
                    field,
                    value.to_string(),
                    "Edge distance cannot be negative",
                ));
            }
        }
        if self.strands_per_group < 1 {
            return Err(TendonError::invalid_input(
                "strands_per_group",
                self.strands_per_group.to_string(),
                "A group needs at least one strand",
            ));
        }
        if self.max_rows == 0 {
            return Err(TendonError::invalid_input(
                "max_rows",
                "0",
                "At least one row must be allowed",
            ));
        }
        Ok(())
    }

    /// Force delivered by one strand (kN)
    pub fn strand_unit_force(&self) -> KiloNewtons {
        SqMillimeters(self.strand_area_mm2) * MegaPascals(self.tension_stress_mpa)
    }

    /// Force of one group of `strands` strands (kN)
    pub fn group_force(&self, strands: i32) -> KiloNewtons {
        self.strand_unit_force() * f64::from(strands)
    }

    /// How many groups fit side by side in `placement_width_m`.
    ///
    /// Zero means not even one group can be seated.
    pub fn groups_per_row(&self, placement_width_m: f64) -> u32 {
        let clear = placement_width_m - 2.0 * self.transverse_edge_m;
        if !clear.is_finite() || clear < 0.0 {
            return 0;
        }
        // 0.01 m slack so widths that are an exact multiple of the spacing
        // are not lost to rounding
        let count = ((clear + 0.01) / self.transverse_spacing_m).ceil();
        if count.is_finite() && count > 0.0 {
            count as u32
        } else {
            0
        }
    }
}
