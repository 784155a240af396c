//! # Sagging and Hogging Envelope Pair
//!
//! Members that see both moment signs (continuous girders, cantilever
//! roots) need tendons near both fibers. This module builds one envelope
//! per sign and checks a pair of tendon offsets against both at once.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::calculations::envelope::{build_for_side, Envelope, EnvelopeInput, ForceRange, MomentSet, Side, StressLimits};
use crate::errors::TendonResult;
use crate::section::SectionGeometry;
use crate::settings::{EnvelopeSettings, LayoutSettings};

/// Bottom envelope from the sagging moments, top envelope from the hogging ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DualEnvelope {
    pub bottom: Envelope,
    pub top: Envelope,
    sagging: MomentSet,
    hogging: MomentSet,
}

impl DualEnvelope {
    pub fn build(
        section: SectionGeometry,
        sagging: MomentSet,
        hogging: MomentSet,
        limits: StressLimits,
        settings: &EnvelopeSettings,
    ) -> TendonResult<Self> {
        let input = |moments: MomentSet| EnvelopeInput {
            section,
            moments,
            limits,
            side: None,
        };
        let bottom = build_for_side(&input(sagging), Side::Bottom, settings)?;
        let top = build_for_side(&input(hogging), Side::Top, settings)?;
        Ok(DualEnvelope {
            bottom,
            top,
            sagging,
            hogging,
        })
    }

    pub fn envelope(&self, side: Side) -> &Envelope {
        match side {
            Side::Top => &self.top,
            Side::Bottom => &self.bottom,
        }
    }

    /// Side with the larger short-term moment magnitude (ties go to the bottom)
    pub fn larger_side(&self) -> Side {
        if self.hogging.short_term_knm.abs() > self.sagging.short_term_knm.abs() {
            Side::Top
        } else {
            Side::Bottom
        }
    }

    pub fn smaller_side(&self) -> Side {
        self.larger_side().opposite()
    }

    /// Query the envelope on the side `eccentricity` falls on
    /// (positive: top, otherwise bottom).
    pub fn query(&self, eccentricity: f64) -> TendonResult<ForceRange> {
        let side = if eccentricity > 0.0 { Side::Top } else { Side::Bottom };
        self.envelope(side).query(eccentricity)
    }

    /// Check tendon resultants placed `bottom_offset_m` above the bottom
    /// fiber and `top_offset_m` below the top fiber.
    pub fn check_offsets(
        &self,
        bottom_offset_m: f64,
        top_offset_m: f64,
        settings: &LayoutSettings,
    ) -> TendonResult<OffsetCheck> {
        let section = &self.bottom.section;
        let e_bottom = Side::Bottom.eccentricity_at_offset(section, bottom_offset_m);
        let e_top = Side::Top.eccentricity_at_offset(section, top_offset_m);
        let bottom = self.bottom.query(e_bottom)?;
        let top = self.top.query(e_top)?;
        let unit = settings.strand_unit_force().0;

        let check = OffsetCheck {
            bottom: SideCheck::new(e_bottom, bottom, unit),
            top: SideCheck::new(e_top, top, unit),
            common: bottom.intersect(&top),
        };
        debug!(
            "offset check: bottom [{:.0}, {:.0}] kN, top [{:.0}, {:.0}] kN, overlap {}",
            bottom.min_force,
            bottom.max_force,
            top.min_force,
            top.max_force,
            check.common.is_some()
        );
        Ok(check)
    }
}

/// Force range at one side's tendon offset, with strand counts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SideCheck {
    pub eccentricity_m: f64,
    pub range: ForceRange,
    pub feasible: bool,
    /// Fewest strands reaching `range.min_force`
    pub min_strands: f64,
    /// Most strands staying under `range.max_force`
    pub max_strands: f64,
}

impl SideCheck {
    fn new(eccentricity_m: f64, range: ForceRange, strand_force: f64) -> Self {
        SideCheck {
            eccentricity_m,
            range,
            feasible: range.is_feasible(),
            min_strands: (range.min_force / strand_force).ceil(),
            max_strands: (range.max_force / strand_force).floor(),
        }
    }
}

/// Result of [`DualEnvelope::check_offsets`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OffsetCheck {
    pub bottom: SideCheck,
    pub top: SideCheck,
    /// Forces admissible on both sides, if any
    pub common: Option<ForceRange>,
}

impl OffsetCheck {
    pub fn passes(&self) -> bool {
        self.bottom.feasible && self.top.feasible && self.common.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn dual() -> DualEnvelope {
        DualEnvelope::build(
            SectionGeometry::rectangular(2.5, 2.8).unwrap(),
            MomentSet::new(31000.0, 36700.0, 35600.0),
            MomentSet::new(-46500.0, -54800.0, -53100.0),
            StressLimits::new(0.0, 22410.0, 0.0, 22400.0),
            &EnvelopeSettings::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_sides_and_ranking() {
        let d = dual();
        assert_eq!(d.bottom.side, Side::Bottom);
        assert_eq!(d.top.side, Side::Top);
        // |Ms| hogging 53100 > sagging 35600
        assert_eq!(d.larger_side(), Side::Top);
        assert_eq!(d.smaller_side(), Side::Bottom);
    }

    #[test]
    fn test_query_dispatches_on_sign() {
        let d = dual();
        assert_eq!(d.query(0.3).unwrap(), d.top.query(0.3).unwrap());
        assert_eq!(d.query(-0.3).unwrap(), d.bottom.query(-0.3).unwrap());
        assert_eq!(d.query(0.0).unwrap(), d.bottom.query(0.0).unwrap());
    }

    #[test]
    fn test_offsets_at_centroid() {
        let d = dual();
        // both resultants at the centroid of a 2.8 m section
        let check = d.check_offsets(1.4, 1.4, &LayoutSettings::default()).unwrap();
        assert_relative_eq!(check.bottom.eccentricity_m, 0.0);
        assert_relative_eq!(check.top.eccentricity_m, 0.0);
        assert!(check.bottom.feasible);
        assert!(check.top.feasible);
        // bottom [97 696, 112 185] sits inside top [49 214, 167 332]
        let common = check.common.unwrap();
        assert_relative_eq!(common.min_force, check.bottom.range.min_force);
        assert_relative_eq!(common.max_force, check.bottom.range.max_force);
        assert!(check.passes());
        // 195.3 kN per strand
        assert_eq!(check.bottom.min_strands, 501.0);
        assert_eq!(check.bottom.max_strands, 574.0);
    }

    #[test]
    fn test_offsets_near_fibers_fail() {
        let d = dual();
        let check = d.check_offsets(0.2, 0.2, &LayoutSettings::default()).unwrap();
        assert!(!check.bottom.feasible);
        assert!(!check.passes());
    }
}
