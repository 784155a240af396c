//! # Design Batches
//!
//! A [`DesignBatch`] groups the moment cases of one member (or one job)
//! with the settings they share. Batches serialize as human-readable JSON;
//! [`run_batch`] turns a batch into a [`BatchReport`] for the report
//! generator.
//!
//! ## Structure
//!
//! ```text
//! DesignBatch
//! ├── meta: BatchMetadata (version, id, engineer, job, timestamp)
//! ├── settings: DesignSettings (sampling, strand data, spacing rules)
//! └── cases: Vec<DesignCase> (section + moments + limits + requests)
//! ```
//!
//! Cases run independently: a case without a feasible design reports
//! its error and the remaining cases still run.
//!
//! ## Example
//!
//! ```rust
//! use tendon_core::batch::{run_batch, DesignBatch, DesignCase};
//! use tendon_core::calculations::{LayoutInput, MomentSet, StressLimits};
//! use tendon_core::section::SectionGeometry;
//!
//! let mut batch = DesignBatch::new("Jane Engineer", "26-014");
//! batch.add_case(
//!     DesignCase::new(
//!         "Pier 3 hogging",
//!         SectionGeometry::rectangular(2.5, 2.8).unwrap(),
//!         MomentSet::new(-46500.0, -54800.0, -53100.0),
//!         StressLimits::new(0.0, 22410.0, 0.0, 22400.0),
//!     )
//!     .with_layout(LayoutInput::new(1.6)),
//! );
//!
//! let report = run_batch(&batch);
//! assert_eq!(report.failed_count(), 0);
//! ```

use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calculations::eccentricity::{self, EccentricityBand, EccentricityInput};
use crate::calculations::envelope::{self, EnvelopeInput, ForceRange, MomentSet, Side, StressLimits};
use crate::calculations::flexure::{self, FlexureEstimate, FlexureInput};
use crate::calculations::layout::{self, LayoutInput, LayoutResult};
use crate::errors::{TendonError, TendonResult};
use crate::section::SectionGeometry;
use crate::settings::DesignSettings;

/// Current schema version for batch files
pub const SCHEMA_VERSION: &str = "0.1.0";

/// Root batch container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignBatch {
    pub meta: BatchMetadata,

    /// Settings applied to every case
    #[serde(default)]
    pub settings: DesignSettings,

    /// Cases in run order
    #[serde(default)]
    pub cases: Vec<DesignCase>,
}

impl DesignBatch {
    /// Create an empty batch with default settings.
    pub fn new(engineer: impl Into<String>, job_id: impl Into<String>) -> Self {
        DesignBatch {
            meta: BatchMetadata {
                version: SCHEMA_VERSION.to_string(),
                id: Uuid::new_v4(),
                engineer: engineer.into(),
                job_id: job_id.into(),
                created: Utc::now(),
            },
            settings: DesignSettings::default(),
            cases: Vec::new(),
        }
    }

    /// Append a case, returning its id.
    pub fn add_case(&mut self, case: DesignCase) -> Uuid {
        let id = case.id;
        self.cases.push(case);
        id
    }

    pub fn get_case(&self, id: &Uuid) -> Option<&DesignCase> {
        self.cases.iter().find(|c| &c.id == id)
    }

    pub fn case_count(&self) -> usize {
        self.cases.len()
    }

    /// Parse a batch file.
    ///
    /// Side selectors are checked before the typed parse so a bad one
    /// reports `InvalidSideSelector` instead of a generic serialization error.
    pub fn from_json(json: &str) -> TendonResult<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        let cases = value.get("cases").and_then(|c| c.as_array());
        for case in cases.into_iter().flatten() {
            for pointer in ["/side", "/flexure/side"] {
                if let Some(selector) = case.pointer(pointer).and_then(|s| s.as_str()) {
                    selector.parse::<Side>()?;
                }
            }
        }
        Ok(serde_json::from_value(value)?)
    }
}

/// Batch metadata stored in the file header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchMetadata {
    /// Schema version (for migration compatibility)
    pub version: String,

    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,

    /// Name of the responsible engineer
    #[serde(default)]
    pub engineer: String,

    /// Job/project number
    #[serde(default)]
    pub job_id: String,

    #[serde(default = "Utc::now")]
    pub created: DateTime<Utc>,
}

/// One governing moment case and what to compute for it.
///
/// The envelope is always built; `layout`, `eccentricity` and `flexure`
/// are optional requests on top of it.
///
/// ## JSON Example
///
/// ```json
/// {
///   "label": "Midspan sagging",
///   "section": {
///     "area": 7.0,
///     "centroid_height": 1.4,
///     "moment_of_inertia": 4.573333,
///     "radius_of_gyration": 0.808290,
///     "top_fiber_distance": 1.4,
///     "bottom_fiber_distance": 1.4
///   },
///   "moments": { "dead_load_knm": 31000, "elastic_knm": 36700, "short_term_knm": 35600 },
///   "limits": {
///     "construction_tension_kpa": 0,
///     "construction_compression_kpa": 22410,
///     "service_tension_kpa": 0,
///     "service_compression_kpa": 22400
///   },
///   "layout": { "placement_width_m": 1.6 }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignCase {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,

    /// User-facing label (e.g., "Span 2 midspan")
    pub label: String,

    pub section: SectionGeometry,
    pub moments: MomentSet,
    pub limits: StressLimits,

    /// Force the tendon side instead of deriving it from the dead load
    #[serde(default)]
    pub side: Option<Side>,

    #[serde(default)]
    pub layout: Option<LayoutInput>,

    #[serde(default)]
    pub eccentricity: Option<EccentricityInput>,

    #[serde(default)]
    pub flexure: Option<FlexureInput>,
}

impl DesignCase {
    /// A case that only builds its envelope.
    pub fn new(label: impl Into<String>, section: SectionGeometry, moments: MomentSet, limits: StressLimits) -> Self {
        DesignCase {
            id: Uuid::new_v4(),
            label: label.into(),
            section,
            moments,
            limits,
            side: None,
            layout: None,
            eccentricity: None,
            flexure: None,
        }
    }

    pub fn with_side(mut self, side: Side) -> Self {
        self.side = Some(side);
        self
    }

    pub fn with_layout(mut self, layout: LayoutInput) -> Self {
        self.layout = Some(layout);
        self
    }

    pub fn with_eccentricity(mut self, eccentricity: EccentricityInput) -> Self {
        self.eccentricity = Some(eccentricity);
        self
    }

    pub fn with_flexure(mut self, flexure: FlexureInput) -> Self {
        self.flexure = Some(flexure);
        self
    }
}

/// Results of every case, in batch order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub batch_id: Uuid,
    pub generated: DateTime<Utc>,
    pub cases: Vec<CaseReport>,
}

impl BatchReport {
    /// Cases with at least one failed step
    pub fn failed_count(&self) -> usize {
        self.cases.iter().filter(|c| !c.succeeded()).count()
    }
}

/// Outcome of one case.
///
/// When the envelope cannot be built, `envelope_error` is set and none of
/// the requests run. Otherwise each requested step carries its own result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseReport {
    pub case_id: Uuid,
    pub label: String,

    /// Side the tendons were placed against
    pub side: Option<Side>,

    /// Force range with the resultant at the centroid
    pub centroid_range: Option<ForceRange>,

    pub envelope_error: Option<TendonError>,
    pub layout: Option<Result<LayoutResult, TendonError>>,
    pub eccentricity: Option<Result<EccentricityBand, TendonError>>,
    pub flexure: Option<Result<FlexureEstimate, TendonError>>,
}

impl CaseReport {
    pub fn succeeded(&self) -> bool {
        self.envelope_error.is_none()
            && !matches!(self.layout, Some(Err(_)))
            && !matches!(self.eccentricity, Some(Err(_)))
            && !matches!(self.flexure, Some(Err(_)))
    }

    /// Every error this case produced
    pub fn errors(&self) -> Vec<&TendonError> {
        let mut errors: Vec<&TendonError> = self.envelope_error.iter().collect();
        if let Some(Err(e)) = &self.layout {
            errors.push(e);
        }
        if let Some(Err(e)) = &self.eccentricity {
            errors.push(e);
        }
        if let Some(Err(e)) = &self.flexure {
            errors.push(e);
        }
        errors
    }
}

/// Run one case with the batch settings.
pub fn run_case(case: &DesignCase, settings: &DesignSettings) -> CaseReport {
    let mut report = CaseReport {
        case_id: case.id,
        label: case.label.clone(),
        side: None,
        centroid_range: None,
        envelope_error: None,
        layout: None,
        eccentricity: None,
        flexure: None,
    };

    let input = EnvelopeInput {
        section: case.section,
        moments: case.moments,
        limits: case.limits,
        side: case.side,
    };
    let env = match envelope::build(&input, &settings.envelope) {
        Ok(env) => env,
        Err(e) => {
            warn!("case '{}': envelope not built: {}", case.label, e);
            report.envelope_error = Some(e);
            return report;
        }
    };
    report.side = Some(env.side);
    match env.query(0.0) {
        Ok(range) => report.centroid_range = Some(range),
        Err(e) => warn!("case '{}': centroid query failed: {}", case.label, e),
    }

    report.layout = case
        .layout
        .as_ref()
        .map(|request| layout::search(&env, request, &settings.layout));
    report.eccentricity = case
        .eccentricity
        .as_ref()
        .map(|request| eccentricity::search(&env, request, &settings.layout));
    report.flexure = case
        .flexure
        .as_ref()
        .map(|request| flexure::estimate_required_force(&case.section, request));

    for e in report.errors() {
        warn!("case '{}': {}", case.label, e);
    }
    report
}

/// Run every case of `batch`.
pub fn run_batch(batch: &DesignBatch) -> BatchReport {
    let cases: Vec<CaseReport> = batch.cases.iter().map(|c| run_case(c, &batch.settings)).collect();
    let report = BatchReport {
        batch_id: batch.meta.id,
        generated: Utc::now(),
        cases,
    };
    info!(
        "batch {}: {} cases, {} with failures",
        batch.meta.id,
        report.cases.len(),
        report.failed_count()
    );
    report
}
