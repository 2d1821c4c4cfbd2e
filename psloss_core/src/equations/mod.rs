//! # Engineering Equations
//!
//! Section-property and beam formulas shared by the loss methods, plus code
//! references used in reports.
//!
//! ## Modules
//!
//! - [`beam`] - Simply-supported product-load moments
//! - [`section`] - Transformed and composite section properties
//! - [`registry`] - Code references for report citations
//!
//! ## Sign Conventions
//!
//! - **Moment**: positive causes tension on bottom fiber (sagging)
//! - **Axial force**: positive is tension
//! - **Depth**: measured downward from the top of the girder

pub mod beam;
pub mod registry;
pub mod section;

pub use registry::CodeReference;
pub use section::{
    composite_section, fiber_stress, transformed_stiffness, SectionElement, SectionProperties, Stiffness,
};
