//! # Project Data Structures
//!
//! `LossProject` is the root container handed to the loss engine: metadata,
//! settings and the bridge model. It serializes to human-readable JSON.
//!
//! ```text
//! LossProject
//! ├── meta: ProjectMetadata (schema version, engineer, job, timestamps)
//! ├── settings: ProjectSettings (spec entry, beam type, display units)
//! └── bridge: BridgeModel
//! ```
//!
//! ## Example
//!
//! ```rust
//! use psloss_core::model::samples;
//! use psloss_core::project::LossProject;
//!
//! let project = LossProject::new("Jane Engineer", "25-042", samples::pretensioned_i_girder().unwrap());
//! let json = project.to_json().unwrap();
//! let back = LossProject::from_json(&json).unwrap();
//! assert_eq!(back.bridge, project.bridge);
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::LossResult;
use crate::losses::method::DEFAULT_SPEC_ENTRY;
use crate::losses::parameters::BeamType;
use crate::model::bridge::BridgeModel;
use crate::units::DisplayUnits;

/// Current schema version of project files
pub const SCHEMA_VERSION: &str = "0.1.0";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LossProject {
    pub meta: ProjectMetadata,
    #[serde(default)]
    pub settings: ProjectSettings,
    pub bridge: BridgeModel,
}

impl LossProject {
    pub fn new(engineer: impl Into<String>, job_id: impl Into<String>, bridge: BridgeModel) -> Self {
        let now = Utc::now();
        LossProject {
            meta: ProjectMetadata {
                version: SCHEMA_VERSION.to_string(),
                engineer: engineer.into(),
                job_id: job_id.into(),
                created: now,
                modified: now,
            },
            settings: ProjectSettings::default(),
            bridge,
        }
    }

    /// Update the modified timestamp.
    pub fn touch(&mut self) {
        self.meta.modified = Utc::now();
    }

    /// Set the relative humidity on the bridge model.
    pub fn set_relative_humidity(&mut self, humidity: f64) {
        self.bridge.relative_humidity = humidity;
        self.touch();
    }

    pub fn to_json(&self) -> LossResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a project and validate its bridge model.
    pub fn from_json(json: &str) -> LossResult<Self> {
        let project: LossProject = serde_json::from_str(json)?;
        project.bridge.validate()?;
        Ok(project)
    }
}

/// Project metadata stored in the file header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectMetadata {
    /// Schema version (for migration compatibility)
    pub version: String,
    #[serde(default)]
    pub engineer: String,
    #[serde(default)]
    pub job_id: String,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

fn default_spec_entry() -> String {
    DEFAULT_SPEC_ENTRY.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectSettings {
    /// Name of the specification library entry governing the design
    #[serde(default = "default_spec_entry")]
    pub spec_entry: String,
    #[serde(default)]
    pub beam_type: BeamType,
    #[serde(default)]
    pub units: DisplayUnits,
}

impl Default for ProjectSettings {
    fn default() -> Self {
        ProjectSettings {
            spec_entry: default_spec_entry(),
            beam_type: BeamType::default(),
            units: DisplayUnits::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::samples;

    #[test]
    fn test_project_roundtrip() {
        let mut project = LossProject::new("Engineer", "25-001", samples::spliced_two_duct_girder().unwrap());
        project.settings.units = DisplayUnits::Si;
        let json = project.to_json().unwrap();
        let back = LossProject::from_json(&json).unwrap();
        assert_eq!(back.bridge, project.bridge);
        assert_eq!(back.settings, project.settings);
        assert_eq!(back.meta.created, project.meta.created);
    }

    #[test]
    fn test_settings_default_when_missing() {
        let project = LossProject::new("", "", samples::pretensioned_i_girder().unwrap());
        let mut value = serde_json::to_value(&project).unwrap();
        value.as_object_mut().unwrap().remove("settings");
        let back: LossProject = serde_json::from_value(value).unwrap();
        assert_eq!(back.settings.spec_entry, DEFAULT_SPEC_ENTRY);
        assert_eq!(back.settings.beam_type, BeamType::IBeam);
    }

    #[test]
    fn test_touch_and_humidity() {
        let mut project = LossProject::new("", "", samples::pretensioned_i_girder().unwrap());
        let created = project.meta.created;
        project.set_relative_humidity(60.0);
        assert_eq!(project.bridge.relative_humidity, 60.0);
        assert!(project.meta.modified >= created);
    }

    #[test]
    fn test_invalid_json_rejected() {
        let err = LossProject::from_json("{\"meta\": 1}").unwrap_err();
        assert_eq!(err.error_code(), "SERIALIZATION_ERROR");
    }
}
