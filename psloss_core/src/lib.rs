//! # psloss_core - Prestress Loss Engine
//!
//! `psloss_core` computes prestress losses in pretensioned and post-tensioned
//! concrete girders, either with the code estimate methods (refined and
//! approximate estimates, lump sums) or with an interval-by-interval
//! time-step analysis over the construction and service history.
//!
//! ## Design Philosophy
//!
//! - **Provider-driven**: the bridge is read through small traits, so any
//!   model can be analysed; [`model::BridgeModel`] is the in-memory one
//! - **JSON-First**: inputs, results and errors implement Serialize/Deserialize
//! - **Forward only**: time-step results extend interval by interval and
//!   finalized intervals are never recomputed
//! - **Rich Errors**: structured error types, configuration problems reported
//!   to a status sink instead of failing
//!
//! ## Quick Start
//!
//! ```rust
//! use psloss_core::losses::{BeamType, PsLossEngineer};
//! use psloss_core::model::samples;
//! use psloss_core::status::StatusCenter;
//!
//! let model = samples::pretensioned_i_girder().unwrap();
//! let poi = model.girders[0].pois[5].poi.clone();
//!
//! let mut engineer = PsLossEngineer::default();
//! let mut status = StatusCenter::new();
//! let details = engineer
//!     .compute_losses(&model.inputs(), BeamType::IBeam, &poi, &mut status)
//!     .unwrap();
//! assert!(details.permanent_strand_fpe_ksi() > 150.0);
//! ```
//!
//! ## Modules
//!
//! - [`losses`] - Loss methods, dispatcher and time-step engine
//! - [`model`] - Keys, timeline, materials, strands, ducts, bridge model
//! - [`providers`] - Collaborator traits the engine reads the bridge through
//! - [`equations`] - Section and beam formulas, code references
//! - [`report`] - Report chapters in US or SI units
//! - [`project`] - Project container, metadata and settings
//! - [`status`] - Status sink and progress/cancellation
//! - [`units`] - Type-safe unit wrappers
//! - [`errors`] - Structured error types

pub mod equations;
pub mod errors;
pub mod losses;
pub mod model;
pub mod project;
pub mod providers;
pub mod report;
pub mod status;
pub mod units;

// Re-export commonly used types at crate root for convenience
pub use errors::{LossError, LossResult};
pub use losses::{BeamType, LossDetails, PsLossEngineer, TimeStepLossEngine};
pub use project::{LossProject, ProjectSettings};
pub use status::{StatusCenter, StatusSink};
