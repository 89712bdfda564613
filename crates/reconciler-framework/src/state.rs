//! # State Model
//!
//! Desired and observed state share one representation: a map from attribute name to a
//! JSON value. What differs is ownership. [`DesiredState`] belongs to the orchestrator and is
//! only read here; [`ObservedState`] is built fresh from the remote API on every read and
//! thrown away once the pass is over.
//!
//! A [`LifecycleRecord`] tracks one operation in flight and enforces the lifecycle state
//! machine:
//!
//! ```text
//! Absent --create--> Creating --ok--> Present --update--> Present
//! Present --delete--> Deleting --ok--> Absent
//! Creating | Deleting --remote failure--> Error
//! ```

use crate::identity::ResourceIdentity;
use crate::schema::{Presence, ResourceSchema};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

/// Attribute name to value. `null` values are treated as unset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct State(BTreeMap<String, Value>);

/// Configuration declared by the user.
pub type DesiredState = State;

/// Last-known remote state, as fetched.
pub type ObservedState = State;

impl State {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`set`](Self::set).
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(name.into(), value.into());
    }

    /// Returns the value, treating `null` as absent.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name).filter(|v| !v.is_null())
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.0.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Names of attributes that hold a non-null value.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.iter().map(|(name, _)| name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0
            .iter()
            .filter(|(_, v)| !v.is_null())
            .map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Keeps only what a user could write in configuration: declared attributes that are not
    /// computed-only.
    pub fn retain_configurable(mut self, schema: &ResourceSchema) -> Self {
        self.0.retain(|name, _| {
            schema
                .attribute(name)
                .is_some_and(|attr| attr.presence != Presence::Computed)
        });
        self
    }
}

impl FromIterator<(String, Value)> for State {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl From<BTreeMap<String, Value>> for State {
    fn from(map: BTreeMap<String, Value>) -> Self {
        Self(map)
    }
}

/// Where one resource instance is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecyclePhase {
    Absent,
    Creating,
    Present,
    Deleting,
    /// Terminal for the current pass; the failure is surfaced, not retried.
    Error,
}

impl LifecyclePhase {
    /// Whether `self -> next` is an edge of the lifecycle state machine.
    pub fn can_transition_to(self, next: LifecyclePhase) -> bool {
        use LifecyclePhase::*;
        matches!(
            (self, next),
            (Absent, Creating)
                | (Creating, Present)
                | (Creating, Error)
                | (Present, Present)
                | (Present, Deleting)
                | (Deleting, Absent)
                | (Deleting, Error)
        )
    }
}

impl fmt::Display for LifecyclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LifecyclePhase::Absent => "absent",
            LifecyclePhase::Creating => "creating",
            LifecyclePhase::Present => "present",
            LifecyclePhase::Deleting => "deleting",
            LifecyclePhase::Error => "error",
        };
        f.write_str(name)
    }
}

/// Illegal lifecycle transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("illegal lifecycle transition {from} -> {to}")]
pub struct TransitionError {
    pub from: LifecyclePhase,
    pub to: LifecyclePhase,
}

/// Transient bookkeeping for a single lifecycle operation.
///
/// Created when the operation starts and dropped when it returns; nothing here is persisted.
#[derive(Debug, Clone)]
pub struct LifecycleRecord {
    pub identity: Option<ResourceIdentity>,
    pub desired: Option<DesiredState>,
    pub observed: Option<ObservedState>,
    pub last_error: Option<String>,
    phase: LifecyclePhase,
}

impl LifecycleRecord {
    pub fn new(phase: LifecyclePhase) -> Self {
        Self {
            identity: None,
            desired: None,
            observed: None,
            last_error: None,
            phase,
        }
    }

    pub fn phase(&self) -> LifecyclePhase {
        self.phase
    }

    pub fn transition(&mut self, next: LifecyclePhase) -> Result<(), TransitionError> {
        if !self.phase.can_transition_to(next) {
            return Err(TransitionError {
                from: self.phase,
                to: next,
            });
        }
        debug!(from = %self.phase, to = %next, "Phase");
        self.phase = next;
        Ok(())
    }

    /// Moves to [`LifecyclePhase::Error`], remembering the failure.
    pub fn fail(&mut self, error: impl fmt::Display) {
        self.last_error = Some(error.to_string());
        if self.phase.can_transition_to(LifecyclePhase::Error) {
            self.phase = LifecyclePhase::Error;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Attribute;
    use serde_json::json;

    #[test]
    fn test_null_is_unset() {
        let state = State::new().with("a", Value::Null).with("b", "x");
        assert!(!state.contains("a"));
        assert_eq!(state.len(), 1);
        assert_eq!(state.names().collect::<Vec<_>>(), ["b"]);
    }

    #[test]
    fn test_serializes_as_plain_map() {
        let state = State::new().with("name", "bot-a").with("count", 3);
        let encoded = serde_json::to_value(&state).unwrap();
        assert_eq!(encoded, json!({"name": "bot-a", "count": 3}));
        let decoded: State = serde_json::from_value(encoded).unwrap();
        assert_eq!(decoded, state);
    }

    #[test]
    fn test_retain_configurable() {
        let schema = ResourceSchema::new()
            .with_attribute("name", Attribute::required_string())
            .with_attribute("arn", Attribute::computed_string());
        let state = State::new()
            .with("name", "a")
            .with("arn", "arn:x")
            .with("extra", "b");
        let kept = state.retain_configurable(&schema);
        assert_eq!(kept, State::new().with("name", "a"));
        assert!(schema.validate(&kept).is_ok());
    }

    #[test]
    fn test_lifecycle_edges() {
        let mut record = LifecycleRecord::new(LifecyclePhase::Absent);
        record.transition(LifecyclePhase::Creating).unwrap();
        record.transition(LifecyclePhase::Present).unwrap();
        record.transition(LifecyclePhase::Present).unwrap();
        record.transition(LifecyclePhase::Deleting).unwrap();
        record.transition(LifecyclePhase::Absent).unwrap();

        assert!(record.transition(LifecyclePhase::Deleting).is_err());
    }

    #[test]
    fn test_fail_from_creating() {
        let mut record = LifecycleRecord::new(LifecyclePhase::Absent);
        record.transition(LifecyclePhase::Creating).unwrap();
        record.fail("boom");
        assert_eq!(record.phase(), LifecyclePhase::Error);
        assert_eq!(record.last_error.as_deref(), Some("boom"));
    }
}
