//! # Status and Progress
//!
//! Non-fatal diagnostics go to a [`StatusSink`]; every item is also logged
//! through the `log` facade. Long computations report through a caller-owned
//! [`Progress`] that may cancel between girders.

use chrono::{DateTime, Utc};
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::keys::GirderKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StatusSeverity {
    Information,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusItem {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub severity: StatusSeverity,
    #[serde(default)]
    pub girder: Option<GirderKey>,
    pub message: String,
}

impl StatusItem {
    pub fn new(severity: StatusSeverity, girder: Option<GirderKey>, message: impl Into<String>) -> Self {
        StatusItem {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            severity,
            girder,
            message: message.into(),
        }
    }

    pub fn warning(girder: Option<GirderKey>, message: impl Into<String>) -> Self {
        StatusItem::new(StatusSeverity::Warning, girder, message)
    }

    pub fn error(girder: Option<GirderKey>, message: impl Into<String>) -> Self {
        StatusItem::new(StatusSeverity::Error, girder, message)
    }
}

/// Receiver of non-fatal diagnostics.
pub trait StatusSink {
    fn add(&mut self, item: StatusItem);
}

/// Collects status items in memory.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusCenter {
    items: Vec<StatusItem>,
}

impl StatusCenter {
    pub fn new() -> Self {
        StatusCenter::default()
    }

    pub fn items(&self) -> &[StatusItem] {
        &self.items
    }

    pub fn count(&self, severity: StatusSeverity) -> usize {
        self.items.iter().filter(|i| i.severity == severity).count()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl StatusSink for StatusCenter {
    fn add(&mut self, item: StatusItem) {
        let girder = item.girder.map(|g| g.to_string()).unwrap_or_default();
        match item.severity {
            StatusSeverity::Information => info!("{} {}", girder, item.message),
            StatusSeverity::Warning => warn!("{} {}", girder, item.message),
            StatusSeverity::Error => error!("{} {}", girder, item.message),
        }
        self.items.push(item);
    }
}

/// Caller-owned progress reporting and cancellation.
pub trait Progress {
    fn update_message(&mut self, message: &str);

    /// Checked only between girders.
    fn is_cancelled(&self) -> bool;
}

/// Progress that never cancels and discards messages.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullProgress;

impl Progress for NullProgress {
    fn update_message(&mut self, _message: &str) {}

    fn is_cancelled(&self) -> bool {
        false
    }
}
