//! # tendon_core - Prestress Envelope and Tendon Layout Engine
//!
//! `tendon_core` sizes the prestress of a concrete member from its section
//! properties, its governing moments and the allowable fiber stresses. All
//! inputs and outputs are JSON-serializable so the engine can sit behind a
//! CLI, a report generator or a plotting front end.
//!
//! ## Design Philosophy
//!
//! - **Stateless**: Pure functions that take input and settings, return results
//! - **JSON-First**: All types implement Serialize/Deserialize
//! - **Rich Errors**: Structured error types, never a process exit
//! - **Explicit Settings**: No global constants; [`settings::DesignSettings`]
//!   travels with every call
//!
//! ## Quick Start
//!
//! ```rust
//! use tendon_core::calculations::{envelope, layout, LayoutInput, MomentSet, StressLimits};
//! use tendon_core::section::SectionGeometry;
//! use tendon_core::settings::DesignSettings;
//!
//! let settings = DesignSettings::default();
//! let env = envelope::build(
//!     &envelope::EnvelopeInput {
//!         section: SectionGeometry::rectangular(2.5, 2.8).unwrap(),
//!         moments: MomentSet::new(31000.0, 36700.0, 35600.0),
//!         limits: StressLimits::new(0.0, 22410.0, 0.0, 22400.0),
//!         side: None,
//!     },
//!     &settings.envelope,
//! )
//! .unwrap();
//!
//! let result = layout::search(&env, &LayoutInput::new(1.6), &settings.layout).unwrap();
//! assert!(result.force_range.contains_strictly(result.total_force_kn));
//! ```
//!
//! ## Modules
//!
//! - [`calculations`] - Envelope, layout search, inverse search, dual envelope, flexure estimate
//! - [`batch`] - Batches of design cases and their reports
//! - [`section`] - Section properties
//! - [`settings`] - Sampling, strand and spacing settings
//! - [`units`] - Type-safe unit wrappers
//! - [`errors`] - Structured error types

pub mod batch;
pub mod calculations;
pub mod errors;
pub mod section;
pub mod settings;
pub mod units;

// Re-export commonly used types at crate root for convenience
pub use batch::{run_batch, BatchReport, DesignBatch, DesignCase};
pub use errors::{TendonError, TendonResult};
pub use section::SectionGeometry;
pub use settings::{DesignSettings, EnvelopeSettings, LayoutSettings};
