//! # Tendon Layout Search
//!
//! Grows a discrete tendon arrangement (rows of strand groups at fixed
//! vertical spacing) from the controlled fiber inward until the delivered
//! force lies strictly inside the envelope's force range at the
//! arrangement's own eccentricity.
//!
//! ## Contract
//!
//! The search is greedy and never backtracks:
//!
//! 1. Seed one row at the vertical edge distance from the controlled fiber,
//!    pulling it inward in `seed_step_m` steps while the force range there
//!    is empty. Crossing the centroid first is `InfeasibleSeedEccentricity`.
//! 2. Below `min_force`: add one group, filling the newest row up to the
//!    transverse capacity before opening a new row one spacing further in.
//! 3. Above `max_force`: drop one strand from every group and try again.
//! 4. More than `max_rows` rows, or no strands left: `LayoutNotFound`.
//!
//! The first arrangement that fits is returned. It is not the one with the
//! fewest rows, strands, or cost.
//!
//! ## Example
//!
//! ```rust
//! use tendon_core::calculations::envelope::{build, EnvelopeInput, MomentSet, StressLimits};
//! use tendon_core::calculations::layout::{search, LayoutInput};
//! use tendon_core::section::SectionGeometry;
//! use tendon_core::settings::{EnvelopeSettings, LayoutSettings};
//!
//! let envelope = build(
//!     &EnvelopeInput {
//!         section: SectionGeometry::rectangular(2.5, 2.8).unwrap(),
//!         moments: MomentSet::new(31000.0, 36700.0, 35600.0),
//!         limits: StressLimits::new(0.0, 22410.0, 0.0, 22400.0),
//!         side: None,
//!     },
//!     &EnvelopeSettings::default(),
//! )
//! .unwrap();
//!
//! match search(&envelope, &LayoutInput::new(1.6), &LayoutSettings::default()) {
//!     Ok(layout) => {
//!         let range = envelope.query(layout.eccentricity_m).unwrap();
//!         assert!(range.contains(layout.total_force_kn));
//!     }
//!     Err(e) => assert!(e.is_infeasible()),
//! }
//! ```

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::calculations::envelope::{Envelope, ForceRange, Side};
use crate::errors::{TendonError, TendonResult};
use crate::section::SectionGeometry;
use crate::settings::LayoutSettings;

/// Per-call layout parameters.
///
/// ## JSON Example
///
/// ```json
/// { "placement_width_m": 1.6, "strands_per_group": 19 }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutInput {
    /// Transverse room available for tendon groups (m)
    pub placement_width_m: f64,

    /// Overrides `LayoutSettings::strands_per_group` for this call
    #[serde(default)]
    pub strands_per_group: Option<i32>,
}

impl LayoutInput {
    pub fn new(placement_width_m: f64) -> Self {
        LayoutInput {
            placement_width_m,
            strands_per_group: None,
        }
    }

    pub fn validate(&self) -> TendonResult<()> {
        if !self.placement_width_m.is_finite() || self.placement_width_m <= 0.0 {
            return Err(TendonError::invalid_input(
                "placement_width_m",
                self.placement_width_m.to_string(),
                "Placement width must be positive",
            ));
        }
        if let Some(n) = self.strands_per_group {
            if n < 1 {
                return Err(TendonError::invalid_input(
                    "strands_per_group",
                    n.to_string(),
                    "A group needs at least one strand",
                ));
            }
        }
        Ok(())
    }
}

/// One horizontal row of strand groups.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TendonRow {
    /// Groups (ducts) side by side in this row
    pub groups: u32,

    /// Eccentricity of the row (m, positive up)
    pub eccentricity_m: f64,

    /// Distance of the row below the top fiber (m)
    pub depth_from_top_m: f64,
}

impl TendonRow {
    pub(crate) fn new(section: &SectionGeometry, groups: u32, eccentricity_m: f64) -> Self {
        TendonRow {
            groups,
            eccentricity_m,
            depth_from_top_m: section.top_fiber_distance - eccentricity_m,
        }
    }
}

/// A converged arrangement.
///
/// `rows` run from the top fiber downwards whichever side was controlled,
/// so `rows[0]` is nearest the top and `depth_from_top_m` is measured from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutResult {
    /// Controlled side the arrangement was grown from
    pub side: Side,

    /// Delivered prestress force (kN)
    pub total_force_kn: f64,

    /// Resultant eccentricity (m)
    pub eccentricity_m: f64,

    /// Envelope range at the resultant eccentricity
    pub force_range: ForceRange,

    /// Strands in each group after any reductions
    pub strands_per_group: i32,

    /// Groups in all rows
    pub total_groups: u32,

    /// Strands in all groups
    pub total_strands: u32,

    /// Transverse capacity of one row
    pub groups_per_row_capacity: u32,

    /// Rows, top fiber first
    pub rows: Vec<TendonRow>,
}

impl LayoutResult {
    /// Group counts per row, top fiber first
    pub fn row_group_counts(&self) -> Vec<u32> {
        self.rows.iter().map(|r| r.groups).collect()
    }

    /// Row depths below the top fiber, top fiber first
    pub fn row_distances_from_top(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.depth_from_top_m).collect()
    }
}

/// Strand-count weighted eccentricity; falls back to the first position
/// while no group has been placed.
pub(crate) fn weighted_eccentricity(positions: &[f64], groups: &[u32]) -> f64 {
    let total: u32 = groups.iter().sum();
    if total == 0 {
        return positions.first().copied().unwrap_or(0.0);
    }
    let moment: f64 = positions
        .iter()
        .zip(groups)
        .map(|(&p, &g)| p * f64::from(g))
        .sum();
    moment / f64::from(total)
}

/// Find the seed eccentricity for the first row.
fn find_seed(envelope: &Envelope, settings: &LayoutSettings) -> TendonResult<f64> {
    let side = envelope.side;
    let start = side.eccentricity_at_offset(&envelope.section, settings.vertical_edge_m);
    let tolerance = envelope.settings.domain_tolerance_m;
    let step = side.direction() * settings.seed_step_m;

    let mut k = 0u32;
    loop {
        let e = start + step * f64::from(k);
        if side.is_past_centroid(e, tolerance) {
            warn!("no feasible seed on the {} side, crossed the centroid at e = {:.3} m", side, e);
            return Err(TendonError::InfeasibleSeedEccentricity {
                side,
                last_eccentricity: e,
            });
        }
        let range = envelope.query(e)?;
        if range.is_feasible() {
            debug!(
                "seed row at e = {:.3} m after {} step(s), range [{:.0}, {:.0}] kN",
                e, k, range.min_force, range.max_force
            );
            return Ok(e);
        }
        debug!(
            "seed e = {:.3} m infeasible ([{:.0}, {:.0}] kN), moving inward",
            e, range.min_force, range.max_force
        );
        k += 1;
    }
}

/// Search for a spacing-compliant arrangement on `envelope`.
pub fn search(envelope: &Envelope, input: &LayoutInput, settings: &LayoutSettings) -> TendonResult<LayoutResult> {
    input.validate()?;
    settings.validate()?;

    let side = envelope.side;
    let mut strands_per_group = input.strands_per_group.unwrap_or(settings.strands_per_group);
    let capacity = settings.groups_per_row(input.placement_width_m);
    if capacity == 0 {
        warn!(
            "placement width {:.3} m cannot seat a group between {:.3} m edge distances",
            input.placement_width_m, settings.transverse_edge_m
        );
        return Err(TendonError::layout_not_found(
            format!(
                "placement width {} m leaves no room inside the transverse edge distances",
                input.placement_width_m
            ),
            0,
            strands_per_group,
        ));
    }

    let seed = find_seed(envelope, settings)?;
    let unit_force = settings.strand_unit_force().0;
    let row_step = side.direction() * settings.vertical_spacing_m;

    // built from the controlled fiber inward
    let mut groups: Vec<u32> = vec![0];
    let mut positions: Vec<f64> = vec![seed];
    let mut eccentricity = seed;

    let (force, range) = loop {
        if groups.len() > settings.max_rows {
            warn!("layout search exceeded {} rows", settings.max_rows);
            return Err(TendonError::layout_not_found(
                format!("more than {} rows required", settings.max_rows),
                groups.len(),
                strands_per_group,
            ));
        }
        if strands_per_group <= 0 {
            warn!("layout search ran out of strands per group");
            return Err(TendonError::layout_not_found(
                "strands per group reduced to zero",
                groups.len(),
                strands_per_group,
            ));
        }

        let total_groups: u32 = groups.iter().sum();
        let force = f64::from(total_groups) * f64::from(strands_per_group) * unit_force;
        let range = envelope.query(eccentricity)?;
        debug!(
            "groups {:?} x {} strands: F = {:.0} kN at e = {:.3} m, range [{:.0}, {:.0}]",
            groups, strands_per_group, force, eccentricity, range.min_force, range.max_force
        );

        if range.contains_strictly(force) {
            break (force, range);
        }

        if force <= range.min_force {
            match groups.last_mut() {
                Some(last) if *last < capacity => *last += 1,
                _ => {
                    let next = positions.last().copied().unwrap_or(seed) + row_step;
                    groups.push(1);
                    positions.push(next);
                }
            }
            eccentricity = weighted_eccentricity(&positions, &groups);
        } else {
            strands_per_group -= 1;
        }
    };

    let section = &envelope.section;
    let mut rows: Vec<TendonRow> = groups
        .iter()
        .zip(&positions)
        .map(|(&g, &p)| TendonRow::new(section, g, p))
        .collect();
    if side == Side::Bottom {
        rows.reverse();
    }

    let total_groups: u32 = groups.iter().sum();
    // strands_per_group >= 1 here
    let total_strands = total_groups * strands_per_group.unsigned_abs();

    info!(
        "{} layout: {} rows, {} groups x {} strands, F = {:.0} kN at e = {:.3} m",
        side,
        rows.len(),
        total_groups,
        strands_per_group,
        force,
        eccentricity
    );

    Ok(LayoutResult {
        side,
        total_force_kn: force,
        eccentricity_m: eccentricity,
        force_range: range,
        strands_per_group,
        total_groups,
        total_strands,
        groups_per_row_capacity: capacity,
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculations::envelope::{build, EnvelopeInput, MomentSet, StressLimits};
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

    fn sagging() -> Envelope {
        envelope(MomentSet::new(31000.0, 36700.0, 35600.0))
    }

    fn hogging() -> Envelope {
        envelope(MomentSet::new(-46500.0, -54800.0, -53100.0))
    }

    #[test]
    fn test_weighted_eccentricity() {
        assert_relative_eq!(weighted_eccentricity(&[-1.2, -1.0], &[3, 1]), -1.15, epsilon = 1e-12);
        assert_relative_eq!(weighted_eccentricity(&[0.4], &[0]), 0.4);
    }

    #[test]
    fn test_sagging_layout_converges_inside_envelope() {
        let env = sagging();
        let result = search(&env, &LayoutInput::new(1.6), &LayoutSettings::default()).unwrap();

        assert_eq!(result.side, Side::Bottom);
        assert_eq!(result.groups_per_row_capacity, 7);
        assert!(result.total_groups > 0);
        assert_eq!(result.total_strands, result.total_groups * result.strands_per_group as u32);

        // round trip: the resultant sits inside the envelope at its own eccentricity
        let range = env.query(result.eccentricity_m).unwrap();
        assert!(range.min_force <= result.total_force_kn && result.total_force_kn <= range.max_force);

        // 18 groups of 22 strands at 195.3 kN
        assert_eq!(result.total_groups, 18);
        assert_eq!(result.strands_per_group, 22);
        assert_relative_eq!(result.total_force_kn, 77338.8, epsilon = 1e-6);
        // rows reported top fiber first: the partially filled inner row leads
        assert_eq!(result.row_group_counts(), vec![4, 7, 7]);
        let depths = result.row_distances_from_top();
        assert!(depths.windows(2).all(|w| w[0] < w[1]));
        assert_relative_eq!(depths[2] - depths[1], 0.2, epsilon = 1e-9);
    }

    #[test]
    fn test_hogging_layout_rows_from_top() {
        let env = hogging();
        let result = search(&env, &LayoutInput::new(1.6), &LayoutSettings::default()).unwrap();

        assert_eq!(result.side, Side::Top);
        assert_eq!(result.row_group_counts(), vec![7, 7, 2]);
        // seed pulled in from 0.2 m to 1.15 m below the top fiber
        assert_relative_eq!(result.rows[0].depth_from_top_m, 1.15, epsilon = 1e-9);
        assert!(env.query(result.eccentricity_m).unwrap().contains(result.total_force_kn));
    }

    #[test]
    fn test_narrow_width_cannot_seat_a_group() {
        let env = sagging();
        let err = search(&env, &LayoutInput::new(0.3), &LayoutSettings::default()).unwrap_err();
        assert_eq!(err.error_code(), "LAYOUT_NOT_FOUND");
        assert!(err.is_infeasible());
    }

    #[test]
    fn test_width_just_under_two_edges_is_rejected() {
        // 0.395 m against 2 x 0.2 m edges: the 0.01 m slack must not seat a group
        let env = sagging();
        match search(&env, &LayoutInput::new(0.395), &LayoutSettings::default()) {
            Err(TendonError::LayoutNotFound { rows, .. }) => assert_eq!(rows, 0),
            other => panic!("expected LayoutNotFound, got {:?}", other),
        }

        let small = build(
            &EnvelopeInput {
                section: SectionGeometry::rectangular(0.5, 0.6).unwrap(),
                moments: MomentSet::new(312.0, 312.0, 312.0),
                limits: StressLimits::new(1500.0, 22410.0, 1500.0, 22400.0),
                side: None,
            },
            &EnvelopeSettings::default(),
        )
        .unwrap();
        let err = search(&small, &LayoutInput::new(0.395), &LayoutSettings::default()).unwrap_err();
        assert_eq!(err.error_code(), "LAYOUT_NOT_FOUND");
    }

    #[test]
    fn test_strict_domain_stops_growth_outside_section() {
        let strict = build(
            &EnvelopeInput {
                section: SectionGeometry::rectangular(2.5, 2.8).unwrap(),
                moments: MomentSet::new(31000.0, 36700.0, 35600.0),
                limits: StressLimits::new(0.0, 22410.0, 0.0, 22400.0),
                side: None,
            },
            &EnvelopeSettings {
                strict_domain: true,
                ..EnvelopeSettings::default()
            },
        )
        .unwrap();
        // one strand per group and 1.5 m rows: seed at the centroid, the
        // third row puts the resultant at e = 1.5 m, above the 1.4 m fiber
        let input = LayoutInput {
            placement_width_m: 0.4,
            strands_per_group: Some(1),
        };
        let settings = LayoutSettings {
            vertical_spacing_m: 1.5,
            ..LayoutSettings::default()
        };
        match search(&strict, &input, &settings) {
            Err(TendonError::EnvelopeDomainViolation { eccentricity, max, .. }) => {
                assert_relative_eq!(eccentricity, 1.5, epsilon = 1e-9);
                assert_relative_eq!(max, 1.4, epsilon = 1e-12);
            }
            other => panic!("expected EnvelopeDomainViolation, got {:?}", other),
        }

        // lenient mode extrapolates through the same step
        let lenient = search(&sagging(), &input, &settings);
        assert!(!matches!(lenient, Err(TendonError::EnvelopeDomainViolation { .. })));
    }

    #[test]
    fn test_single_column_exhausts_rows_after_strand_reductions() {
        let env = sagging();
        match search(&env, &LayoutInput::new(0.4), &LayoutSettings::default()) {
            Err(TendonError::LayoutNotFound { rows, strands_per_group, .. }) => {
                assert_eq!(rows, 11);
                assert!(strands_per_group < 22);
            }
            other => panic!("expected LayoutNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_seed_past_centroid_is_infeasible() {
        let env = sagging();
        let settings = LayoutSettings {
            vertical_edge_m: 1.5,
            ..LayoutSettings::default()
        };
        let err = search(&env, &LayoutInput::new(1.6), &settings).unwrap_err();
        assert_eq!(err.error_code(), "INFEASIBLE_SEED_ECCENTRICITY");
    }

    #[test]
    fn test_search_is_deterministic() {
        let env = hogging();
        let a = search(&env, &LayoutInput::new(1.2), &LayoutSettings::default()).unwrap();
        let b = search(&env, &LayoutInput::new(1.2), &LayoutSettings::default()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_invalid_input() {
        let env = sagging();
        assert!(search(&env, &LayoutInput::new(-1.0), &LayoutSettings::default()).is_err());
        let input = LayoutInput {
            placement_width_m: 1.6,
            strands_per_group: Some(0),
        };
        assert!(search(&env, &input, &LayoutSettings::default()).is_err());
    }

    #[test]
    fn test_result_serialization() {
        let env = hogging();
        let result = search(&env, &LayoutInput::new(1.6), &LayoutSettings::default()).unwrap();
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"side\":\"Top\""));
        let roundtrip: LayoutResult = serde_json::from_str(&json).unwrap();
        assert_eq!(roundtrip.rows.len(), result.rows.len());
    }
}
