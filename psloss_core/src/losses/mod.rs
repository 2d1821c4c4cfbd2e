//! # Prestress Losses
//!
//! - [`engineer`] - Method dispatcher with as-built and design-trial caches
//! - [`method`] - Code editions, loss methods, specification library
//! - [`time_step`] - Interval-by-interval strain analysis of a girder line
//! - [`anchor_set`] - Seating penetration of post-tensioning tendons
//! - [`friction`] - Wobble and curvature friction along a duct
//! - [`refined`], [`approximate`], [`lump_sum`] - Code estimate methods
//! - [`parameters`] - Inputs shared by the estimate methods
//! - [`temporary`] - Elastic effects of temporary strands on the permanent strands
//! - [`details`] - Uniform loss record returned by every method
//!
//! ## Sign Conventions
//!
//! - Losses are positive when they reduce steel tension; gains are negative
//! - Concrete stress is positive in tension

pub mod anchor_set;
pub mod approximate;
pub mod details;
pub mod engineer;
pub mod friction;
pub mod lump_sum;
pub mod method;
pub mod options;
pub mod parameters;
pub mod refined;
pub mod temporary;
pub mod time_step;

pub use anchor_set::AnchorSetDetails;
pub use details::{LossComponents, LossDetails, MethodDetails, StageLosses, SteelElement, SteelLoss};
pub use engineer::{ComputeMode, PsLossEngineer};
pub use method::{Agency, LossMethod, LossStrategy, ShippingLoss, SpecEdition, SpecLibrary, SpecLibraryEntry};
pub use options::TimeStepOptions;
pub use parameters::{BeamType, LossParameters};
pub use temporary::TemporaryStrandEffects;
pub use time_step::{TimeStepDetails, TimeStepLossEngine};
