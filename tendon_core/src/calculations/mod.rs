//! # Prestress Calculations
//!
//! Each calculation follows the pattern:
//!
//! - `*Input` - Input parameters (JSON-serializable)
//! - `*Result` / `*Band` / `*Estimate` - Results (JSON-serializable)
//! - a pure function taking the input and settings, returning `TendonResult`
//!
//! ## Available Calculations
//!
//! - [`envelope`] - Feasible force range as a function of eccentricity
//! - [`layout`] - Row-by-row tendon placement satisfying the envelope
//! - [`eccentricity`] - Admissible eccentricity band for a fixed arrangement
//! - [`dual`] - Sagging and hogging envelopes checked together
//! - [`flexure`] - Stress-block estimate of the force for a factored moment

pub mod dual;
pub mod eccentricity;
pub mod envelope;
pub mod flexure;
pub mod layout;

// Re-export commonly used types
pub use dual::{DualEnvelope, OffsetCheck, SideCheck};
pub use eccentricity::{EccentricityBand, EccentricityInput};
pub use envelope::{Envelope, EnvelopeInput, EnvelopePlot, ForceRange, MomentSet, Side, StressLimits};
pub use flexure::{FlexureEstimate, FlexureInput};
pub use layout::{LayoutInput, LayoutResult, TendonRow};
