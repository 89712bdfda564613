//! # State Differ
//!
//! Compares desired configuration with observed remote state, one declared attribute at a
//! time, and reports which attributes drifted. Comparison follows the attribute type:
//! sets ignore order, JSON documents compare by parsed value, and empty collections are the
//! same as unset.
//!
//! Computed-only attributes never drift, and neither do optional+computed attributes the user
//! left unset: in both cases the remote owns the value.
//!
//! [`plan`] turns a change set into the action the orchestrator should take.

use crate::schema::{AttributeType, Presence, ResourceSchema};
use crate::state::State;
use serde_json::Value;
use std::collections::BTreeSet;

/// Returns the names of attributes whose desired value differs from the observed one.
pub fn diff(schema: &ResourceSchema, desired: &State, observed: &State) -> BTreeSet<String> {
    schema
        .attributes()
        .filter(|(_, attr)| attr.presence != Presence::Computed)
        .filter(|(name, attr)| {
            let wanted = desired.get(name);
            if wanted.is_none() && attr.presence == Presence::OptionalComputed {
                return false;
            }
            !values_equal(attr.kind, wanted, observed.get(name))
        })
        .map(|(name, _)| name.to_string())
        .collect()
}

/// Type-aware equality of two optional attribute values.
pub fn values_equal(kind: AttributeType, a: Option<&Value>, b: Option<&Value>) -> bool {
    match (normalize(a), normalize(b)) {
        (None, None) => true,
        (Some(a), Some(b)) => match kind {
            AttributeType::StringSet => as_set(a) == as_set(b),
            AttributeType::Json => json_equal(a, b),
            _ => a == b,
        },
        _ => false,
    }
}

fn normalize(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| match v {
        Value::Null => false,
        Value::Array(items) => !items.is_empty(),
        Value::Object(entries) => !entries.is_empty(),
        _ => true,
    })
}

fn as_set(value: &Value) -> Option<BTreeSet<String>> {
    value.as_array().map(|items| {
        items
            .iter()
            .map(|item| match item.as_str() {
                Some(s) => s.to_string(),
                None => item.to_string(),
            })
            .collect()
    })
}

fn json_equal(a: &Value, b: &Value) -> bool {
    match (a.as_str(), b.as_str()) {
        (Some(a), Some(b)) => {
            match (
                serde_json::from_str::<Value>(a),
                serde_json::from_str::<Value>(b),
            ) {
                (Ok(a), Ok(b)) => a == b,
                _ => a == b,
            }
        }
        _ => a == b,
    }
}

/// What the orchestrator has to do to converge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanAction {
    NoOp,
    Update,
    /// Delete the remote object and create it again.
    Replace,
}

/// Result of [`plan`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    pub action: PlanAction,
    pub changed: BTreeSet<String>,
    /// Changed attributes that force replacement.
    pub replace_because: BTreeSet<String>,
}

impl Plan {
    pub fn is_noop(&self) -> bool {
        self.action == PlanAction::NoOp
    }
}

/// Classifies the drift between `desired` and `observed`.
///
/// Any changed key-forming attribute means [`PlanAction::Replace`]. So does any change at all
/// when the resource type cannot update in place.
pub fn plan(
    schema: &ResourceSchema,
    desired: &State,
    observed: &State,
    supports_update: bool,
) -> Plan {
    let changed = diff(schema, desired, observed);
    let replace_because = replacement_reasons(schema, &changed, supports_update);

    let action = if changed.is_empty() {
        PlanAction::NoOp
    } else if !replace_because.is_empty() {
        PlanAction::Replace
    } else {
        PlanAction::Update
    };

    Plan {
        action,
        changed,
        replace_because,
    }
}

/// The subset of `changed` that cannot be applied in place.
pub fn replacement_reasons(
    schema: &ResourceSchema,
    changed: &BTreeSet<String>,
    supports_update: bool,
) -> BTreeSet<String> {
    changed
        .iter()
        .filter(|name| !supports_update || schema.is_force_new(name))
        .cloned()
        .collect()
}
