//! # Inverse Eccentricity Search
//!
//! For a required force and a fixed arrangement of group counts, find the
//! band of eccentricities at which the arrangement satisfies the envelope.
//!
//! The arrangement starts with its first row at the vertical edge distance
//! from the controlled fiber and the remaining rows stacked inward at the
//! vertical spacing. The whole stack is then shifted inward in
//! `scan_step_m` increments; every position where the target force lies
//! strictly inside the force range is admissible. The scan stops once the
//! resultant crosses the centroid.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::calculations::envelope::{Envelope, Side};
use crate::calculations::layout::{weighted_eccentricity, TendonRow};
use crate::errors::{TendonError, TendonResult};
use crate::settings::LayoutSettings;

/// ## JSON Example
///
/// ```json
/// { "force_kn": 100000.0, "group_counts": [2, 1] }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EccentricityInput {
    /// Total prestress force to place (kN)
    pub force_kn: f64,

    /// Groups per row, starting at the row nearest the controlled fiber
    pub group_counts: Vec<u32>,
}

impl EccentricityInput {
    pub fn validate(&self) -> TendonResult<()> {
        if !self.force_kn.is_finite() || self.force_kn <= 0.0 {
            return Err(TendonError::invalid_input(
                "force_kn",
                self.force_kn.to_string(),
                "Force must be positive",
            ));
        }
        if self.group_counts.iter().sum::<u32>() == 0 {
            return Err(TendonError::invalid_input(
                "group_counts",
                format!("{:?}", self.group_counts),
                "Arrangement needs at least one group",
            ));
        }
        Ok(())
    }
}

/// Admissible eccentricity band for a fixed arrangement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EccentricityBand {
    pub side: Side,
    pub force_kn: f64,

    /// Smallest admissible resultant eccentricity (m)
    pub min_eccentricity_m: f64,

    /// Largest admissible resultant eccentricity (m)
    pub max_eccentricity_m: f64,

    /// Closest and farthest admissible offsets of the first row from the
    /// controlled fiber (m)
    pub first_row_offset_range_m: (f64, f64),

    /// Median admissible trial
    pub representative_eccentricity_m: f64,

    /// Rows of the median trial, in input order
    pub representative_rows: Vec<TendonRow>,

    /// Trials that admitted the force
    pub admissible_count: usize,

    /// Trials scanned in total
    pub trial_count: usize,
}

struct Trial {
    offset: f64,
    eccentricity: f64,
    positions: Vec<f64>,
}

/// Scan the arrangement inward and collect the admissible band.
pub fn search(
    envelope: &Envelope,
    input: &EccentricityInput,
    settings: &LayoutSettings,
) -> TendonResult<EccentricityBand> {
    input.validate()?;
    settings.validate()?;

    let side = envelope.side;
    let section = &envelope.section;
    let dir = side.direction();
    let start = side.eccentricity_at_offset(section, settings.vertical_edge_m);
    let tolerance = envelope.settings.domain_tolerance_m;
    // the resultant moves one step per trial, so it crosses the centroid
    // within this many trials
    let max_trials = (section.height() / settings.scan_step_m).ceil() as usize + 1;

    let mut admissible: Vec<Trial> = Vec::new();
    let mut trials = 0usize;

    while trials <= max_trials {
        let shift = trials as f64 * settings.scan_step_m;
        let positions: Vec<f64> = (0..input.group_counts.len())
            .map(|i| start + dir * (i as f64 * settings.vertical_spacing_m + shift))
            .collect();
        let eccentricity = weighted_eccentricity(&positions, &input.group_counts);
        if side.is_past_centroid(eccentricity, tolerance) {
            break;
        }
        trials += 1;

        let range = envelope.query(eccentricity)?;
        if range.contains_strictly(input.force_kn) {
            debug!(
                "e = {:.3} m admits {:.0} kN ([{:.0}, {:.0}])",
                eccentricity, input.force_kn, range.min_force, range.max_force
            );
            admissible.push(Trial {
                offset: settings.vertical_edge_m + shift,
                eccentricity,
                positions,
            });
        }
    }

    if admissible.is_empty() {
        warn!(
            "no admissible eccentricity for {:.0} kN on the {} side after {} trials",
            input.force_kn, side, trials
        );
        return Err(TendonError::NoAdmissibleEccentricity {
            force_kn: input.force_kn,
            trials,
        });
    }

    let (min_e, max_e) = admissible
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), t| {
            (lo.min(t.eccentricity), hi.max(t.eccentricity))
        });
    let (min_off, max_off) = admissible
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), t| (lo.min(t.offset), hi.max(t.offset)));

    let median = &admissible[admissible.len() / 2];
    let representative_rows = input
        .group_counts
        .iter()
        .zip(&median.positions)
        .map(|(&g, &p)| TendonRow::new(section, g, p))
        .collect();

    info!(
        "{} side: {:.0} kN admissible for e in [{:.3}, {:.3}] m ({} of {} trials)",
        side,
        input.force_kn,
        min_e,
        max_e,
        admissible.len(),
        trials
    );

    Ok(EccentricityBand {
        side,
        force_kn: input.force_kn,
        min_eccentricity_m: min_e,
        max_eccentricity_m: max_e,
        first_row_offset_range_m: (min_off, max_off),
        representative_eccentricity_m: median.eccentricity,
        representative_rows,
        admissible_count: admissible.len(),
        trial_count: trials,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculations::envelope::{build, EnvelopeInput, MomentSet, StressLimits};
    use crate::section::SectionGeometry;
    use crate::settings::EnvelopeSettings;
    use approx::assert_relative_eq;

    fn envelope(moments: MomentSet) -> Envelope {
        build(
            &EnvelopeInput {
                section: SectionGeometry::rectangular(2.5, 2.8).unwrap(),
                moments,
                limits: StressLimits::new(0.0, 22410.0, 0.0, 22400.0),
                side: None,
            },
            &EnvelopeSettings::default(),
        )
        .unwrap()
    }

    fn hogging() -> Envelope {
        envelope(MomentSet::new(-46500.0, -54800.0, -53100.0))
    }

    #[test]
    fn test_single_row_band() {
        let env = hogging();
        let input = EccentricityInput {
            force_kn: 100000.0,
            group_counts: vec![1],
        };
        let band = search(&env, &input, &LayoutSettings::default()).unwrap();

        assert_eq!(band.side, Side::Top);
        // e = 0.23 m down to the centroid in 0.01 m steps
        assert_eq!(band.admissible_count, 24);
        assert_relative_eq!(band.max_eccentricity_m, 0.23, epsilon = 1e-9);
        assert_relative_eq!(band.min_eccentricity_m, 0.0, epsilon = 1e-9);
        assert_relative_eq!(band.first_row_offset_range_m.1, 1.4, epsilon = 1e-9);
        assert!(band.min_eccentricity_m <= band.representative_eccentricity_m);
        assert!(band.representative_eccentricity_m <= band.max_eccentricity_m);
    }

    #[test]
    fn test_band_endpoints_admit_force() {
        let env = hogging();
        let input = EccentricityInput {
            force_kn: 100000.0,
            group_counts: vec![2, 1],
        };
        let band = search(&env, &input, &LayoutSettings::default()).unwrap();
        for e in [band.min_eccentricity_m, band.max_eccentricity_m, band.representative_eccentricity_m] {
            assert!(env.query(e).unwrap().contains_strictly(input.force_kn));
        }
        // rows keep the input order and the vertical spacing
        let rows = &band.representative_rows;
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].groups, 2);
        assert_relative_eq!(rows[1].depth_from_top_m - rows[0].depth_from_top_m, 0.2, epsilon = 1e-9);
    }

    #[test]
    fn test_repeat_runs_are_identical() {
        let env = hogging();
        let input = EccentricityInput {
            force_kn: 60000.0,
            group_counts: vec![2, 1],
        };
        let a = search(&env, &input, &LayoutSettings::default()).unwrap();
        let b = search(&env, &input, &LayoutSettings::default()).unwrap();
        assert_eq!(a.min_eccentricity_m, b.min_eccentricity_m);
        assert_eq!(a.max_eccentricity_m, b.max_eccentricity_m);
        assert_eq!(a, b);
    }

    #[test]
    fn test_strict_domain_scan_matches_lenient() {
        // every trial resultant lies between the first row and the centroid
        let strict = build(
            &EnvelopeInput {
                section: SectionGeometry::rectangular(2.5, 2.8).unwrap(),
                moments: MomentSet::new(-46500.0, -54800.0, -53100.0),
                limits: StressLimits::new(0.0, 22410.0, 0.0, 22400.0),
                side: None,
            },
            &EnvelopeSettings {
                strict_domain: true,
                ..EnvelopeSettings::default()
            },
        )
        .unwrap();
        let input = EccentricityInput {
            force_kn: 100000.0,
            group_counts: vec![2, 1],
        };
        let settings = LayoutSettings {
            vertical_edge_m: 0.0,
            ..LayoutSettings::default()
        };
        let a = search(&strict, &input, &settings).unwrap();
        let b = search(&hogging(), &input, &settings).unwrap();
        assert_eq!(a.min_eccentricity_m, b.min_eccentricity_m);
        assert_eq!(a.max_eccentricity_m, b.max_eccentricity_m);
        assert_eq!(a.admissible_count, b.admissible_count);
        assert!(a.max_eccentricity_m <= strict.domain().1);
    }

    #[test]
    fn test_no_admissible_position() {
        let env = envelope(MomentSet::new(31000.0, 36700.0, 35600.0));
        let input = EccentricityInput {
            force_kn: 60000.0,
            group_counts: vec![7, 7, 3],
        };
        match search(&env, &input, &LayoutSettings::default()) {
            Err(TendonError::NoAdmissibleEccentricity { trials, .. }) => assert!(trials > 0),
            other => panic!("expected NoAdmissibleEccentricity, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_arrangements() {
        let env = hogging();
        let empty = EccentricityInput {
            force_kn: 1000.0,
            group_counts: vec![],
        };
        assert!(search(&env, &empty, &LayoutSettings::default()).is_err());
        let zeros = EccentricityInput {
            force_kn: 1000.0,
            group_counts: vec![0, 0],
        };
        assert!(search(&env, &zeros, &LayoutSettings::default()).is_err());
        let negative = EccentricityInput {
            force_kn: -1.0,
            group_counts: vec![1],
        };
        assert_eq!(
            search(&env, &negative, &LayoutSettings::default()).unwrap_err().error_code(),
            "INVALID_INPUT"
        );
    }
}
