//! # Bridge Model
//!
//! Keys, timeline, materials, prestressing and the in-memory bridge
//! description consumed by the loss engine.
//!
//! - [`keys`] - Girder, segment, POI and tendon identity keys
//! - [`interval`] - Construction/service interval timeline
//! - [`materials`] - Time-dependent concrete and prestressing steel
//! - [`profile`] - Polyline strand and duct profiles
//! - [`strands`] - Pretensioning strand groups and trial configurations
//! - [`tendon`] - Post-tensioning ducts
//! - [`bridge`] - In-memory model implementing the provider traits
//! - [`samples`] - Ready-made models for demos and tests

pub mod bridge;
pub mod interval;
pub mod keys;
pub mod materials;
pub mod profile;
pub mod samples;
pub mod strands;
pub mod tendon;

pub use bridge::BridgeModel;
pub use interval::{Interval, IntervalTimeline, Timeline};
pub use keys::{EndType, EventId, GirderKey, IntervalIndex, PoiId, PointOfInterest, SegmentKey, TendonKey};
pub use strands::{GirderConfig, StrandType};
