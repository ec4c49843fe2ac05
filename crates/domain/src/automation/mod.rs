//! Automation definitions: the read-side view of a scheduled automation.
//!
//! A definition has an anchor ([`AutomationDefinition::next_execution_time`])
//! and an optional repeat interval in hours. Definitions are owned and mutated
//! by the automation store; this crate only reads them.

mod recurrence;

pub use recurrence::{InvalidInterval, Recurrence};

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{BizDeskError, ValidationError};
use crate::id::AutomationId;
use crate::time::Timestamp;

/// Whether a definition takes part in projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AutomationStatus {
    Schedulable,
    Disabled,
}

impl AutomationStatus {
    /// Wire representation used by the automation store.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Schedulable => "SCHEDULABLE",
            Self::Disabled => "DISABLED",
        }
    }
}

impl fmt::Display for AutomationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AutomationStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SCHEDULABLE" => Ok(Self::Schedulable),
            "DISABLED" => Ok(Self::Disabled),
            other => Err(ValidationError::UnknownStatus(other.to_owned())),
        }
    }
}

/// An automation as supplied by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutomationDefinition {
    pub id: AutomationId,
    pub name: String,
    pub status: AutomationStatus,
    /// Anchor occurrence. `None` when the store holds no usable value, in
    /// which case the definition is skipped by projection.
    pub next_execution_time: Option<Timestamp>,
    /// Hours between occurrences. Absent, zero or negative means one-shot.
    pub repeat_interval: Option<f64>,
}

impl AutomationDefinition {
    /// Create a builder for constructing an [`AutomationDefinition`].
    #[must_use]
    pub fn builder() -> AutomationDefinitionBuilder {
        AutomationDefinitionBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`BizDeskError::Validation`] when `name` is empty
    /// ([`ValidationError::EmptyName`]).
    pub fn validate(&self) -> Result<(), BizDeskError> {
        if self.name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        Ok(())
    }

    #[must_use]
    pub fn is_schedulable(&self) -> bool {
        self.status == AutomationStatus::Schedulable
    }

    /// Interpret [`repeat_interval`](Self::repeat_interval).
    ///
    /// # Errors
    ///
    /// Returns [`InvalidInterval`] when the interval is non-finite or cannot
    /// be represented as a duration.
    pub fn recurrence(&self) -> Result<Recurrence, InvalidInterval> {
        Recurrence::from_hours(self.repeat_interval)
    }
}

/// Step-by-step builder for [`AutomationDefinition`].
#[derive(Debug, Default)]
pub struct AutomationDefinitionBuilder {
    id: Option<AutomationId>,
    name: Option<String>,
    status: Option<AutomationStatus>,
    next_execution_time: Option<Timestamp>,
    repeat_interval: Option<f64>,
}

impl AutomationDefinitionBuilder {
    #[must_use]
    pub fn id(mut self, id: AutomationId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn status(mut self, status: AutomationStatus) -> Self {
        self.status = Some(status);
        self
    }

    #[must_use]
    pub fn next_execution_time(mut self, ts: Timestamp) -> Self {
        self.next_execution_time = Some(ts);
        self
    }

    #[must_use]
    pub fn repeat_interval(mut self, hours: f64) -> Self {
        self.repeat_interval = Some(hours);
        self
    }

    /// Consume the builder, validate, and return an [`AutomationDefinition`].
    ///
    /// The status defaults to [`AutomationStatus::Schedulable`].
    ///
    /// # Errors
    ///
    /// Returns [`BizDeskError::Validation`] if the id is missing or the name
    /// is missing or empty.
    pub fn build(self) -> Result<AutomationDefinition, BizDeskError> {
        let definition = AutomationDefinition {
            id: self.id.ok_or(ValidationError::EmptyId)?,
            name: self.name.unwrap_or_default(),
            status: self.status.unwrap_or(AutomationStatus::Schedulable),
            next_execution_time: self.next_execution_time,
            repeat_interval: self.repeat_interval,
        };
        definition.validate()?;
        Ok(definition)
    }
}
