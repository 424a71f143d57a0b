//! Per-item outcomes and the run summary returned by every flow

use mediarecon_core::UpdateOutcome;

/// What happened to one record or file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    /// Probe returned both dimensions; nothing was written.
    Measured { width: u32, height: u32 },
    /// A merge-patch update was issued.
    Updated(UpdateOutcome),
    /// Probe succeeded without both dimensions; nothing was written.
    MissingDimensions,
    /// Extension is not handled by the flow; skipped without error.
    Unsupported,
    /// Uploaded, but the file type has no record fields to write.
    UploadedOnly,
    Failed(String),
}

impl ItemOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, ItemOutcome::Failed(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemReport {
    /// Record key, or the file path for uploads.
    pub key: String,
    pub outcome: ItemOutcome,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Count taken before iteration. May differ from `items.len()` if the store changed.
    pub total: u64,
    pub items: Vec<ItemReport>,
    /// Set when a scan-level error ended the run early.
    pub aborted: Option<String>,
}

impl RunSummary {
    pub fn new(total: u64) -> Self {
        Self {
            total,
            ..Default::default()
        }
    }

    pub fn push(&mut self, key: impl Into<String>, outcome: ItemOutcome) {
        self.items.push(ItemReport {
            key: key.into(),
            outcome,
        });
    }

    pub fn processed(&self) -> usize {
        self.items.len()
    }

    pub fn error_count(&self) -> usize {
        self.items
            .iter()
            .filter(|item| item.outcome.is_failure())
            .count()
    }

    pub fn updated_count(&self) -> usize {
        self.items
            .iter()
            .filter(|item| matches!(item.outcome, ItemOutcome::Updated(_)))
            .count()
    }

    pub fn outcome_for(&self, key: &str) -> Option<&ItemOutcome> {
        self.items
            .iter()
            .find(|item| item.key == key)
            .map(|item| &item.outcome)
    }
}
