//! # Resource Schema
//!
//! A [`ResourceSchema`] is the declared attribute surface of one resource type: names, types,
//! whether the user must/may/cannot set each attribute, which attributes form the remote key,
//! and value constraints. It is built once when the resource type is constructed and is only
//! read afterwards.
//!
//! The orchestrator uses it for plan-time validation ([`ResourceSchema::validate`]) before any
//! remote call is made, and the differ uses it to decide how two values compare.
//!
//! ```rust
//! use reconciler_framework::schema::{Attribute, ResourceSchema, Validator};
//! use reconciler_framework::state::State;
//!
//! let schema = ResourceSchema::new()
//!     .with_attribute("name", Attribute::required_string().force_new()
//!         .validate(Validator::length_between(2, 50)))
//!     .with_attribute("arn", Attribute::computed_string());
//!
//! let ok = State::new().with("name", "bot-a");
//! assert!(schema.validate(&ok).is_ok());
//!
//! let too_short = State::new().with("name", "b");
//! assert!(schema.validate(&too_short).is_err());
//! ```

use crate::state::State;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Value type of an attribute. Drives validation and type-aware equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeType {
    String,
    Int,
    Bool,
    /// Ordered list of strings.
    StringList,
    /// Unordered set of strings; element order never counts as drift.
    StringSet,
    StringMap,
    /// A string holding a JSON document, compared by parsed value.
    Json,
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AttributeType::String => "string",
            AttributeType::Int => "int",
            AttributeType::Bool => "bool",
            AttributeType::StringList => "list(string)",
            AttributeType::StringSet => "set(string)",
            AttributeType::StringMap => "map(string)",
            AttributeType::Json => "json",
        };
        f.write_str(name)
    }
}

/// Who supplies an attribute's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Presence {
    Required,
    Optional,
    /// The user may set it; if they don't, the remote assigns a value.
    OptionalComputed,
    /// Only the remote assigns it. Never compared for drift.
    Computed,
}

/// A constraint on an attribute's value.
#[derive(Debug, Clone)]
pub enum Validator {
    /// Inclusive bounds on the length in characters.
    LengthBetween { min: usize, max: usize },
    OneOf(Vec<String>),
    Pattern(Regex),
}

impl Validator {
    pub fn length_between(min: usize, max: usize) -> Self {
        Validator::LengthBetween { min, max }
    }

    pub fn one_of<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Validator::OneOf(values.into_iter().map(Into::into).collect())
    }

    /// Builds a pattern validator. The pattern is matched against the whole value.
    pub fn pattern(pattern: &str) -> Result<Self, regex::Error> {
        Regex::new(&format!("^(?:{pattern})$")).map(Validator::Pattern)
    }

    fn check(&self, attribute: &str, value: &str) -> Result<(), ValidationError> {
        match self {
            Validator::LengthBetween { min, max } => {
                let actual = value.chars().count();
                if actual < *min || actual > *max {
                    return Err(ValidationError::LengthOutOfRange {
                        attribute: attribute.to_string(),
                        min: *min,
                        max: *max,
                        actual,
                    });
                }
            }
            Validator::OneOf(allowed) => {
                if !allowed.iter().any(|a| a == value) {
                    return Err(ValidationError::NotOneOf {
                        attribute: attribute.to_string(),
                        value: value.to_string(),
                        allowed: allowed.join(", "),
                    });
                }
            }
            Validator::Pattern(regex) => {
                if !regex.is_match(value) {
                    return Err(ValidationError::PatternMismatch {
                        attribute: attribute.to_string(),
                        pattern: regex.as_str().to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Declaration of a single attribute.
#[derive(Debug, Clone)]
pub struct Attribute {
    pub kind: AttributeType,
    pub presence: Presence,
    /// Key-forming: a change can only be applied by replacing the remote object.
    pub force_new: bool,
    pub validators: Vec<Validator>,
    pub description: Option<String>,
}

impl Attribute {
    pub fn new(kind: AttributeType, presence: Presence) -> Self {
        Self {
            kind,
            presence,
            force_new: false,
            validators: Vec::new(),
            description: None,
        }
    }

    pub fn required_string() -> Self {
        Self::new(AttributeType::String, Presence::Required)
    }

    pub fn optional_string() -> Self {
        Self::new(AttributeType::String, Presence::Optional)
    }

    pub fn computed_string() -> Self {
        Self::new(AttributeType::String, Presence::Computed)
    }

    pub fn force_new(mut self) -> Self {
        self.force_new = true;
        self
    }

    pub fn validate(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn is_computed_only(&self) -> bool {
        self.presence == Presence::Computed
    }

    fn check(&self, name: &str, value: &Value) -> Result<(), ValidationError> {
        let mismatch = || ValidationError::TypeMismatch {
            attribute: name.to_string(),
            expected: self.kind,
        };

        match self.kind {
            AttributeType::String => {
                let s = value.as_str().ok_or_else(mismatch)?;
                self.validators.iter().try_for_each(|v| v.check(name, s))
            }
            AttributeType::Json => {
                let s = value.as_str().ok_or_else(mismatch)?;
                serde_json::from_str::<Value>(s).map_err(|e| ValidationError::InvalidJson {
                    attribute: name.to_string(),
                    reason: e.to_string(),
                })?;
                self.validators.iter().try_for_each(|v| v.check(name, s))
            }
            AttributeType::Int => value.as_i64().map(|_| ()).ok_or_else(mismatch),
            AttributeType::Bool => value.as_bool().map(|_| ()).ok_or_else(mismatch),
            AttributeType::StringList | AttributeType::StringSet => {
                let items = value.as_array().ok_or_else(mismatch)?;
                for item in items {
                    let s = item.as_str().ok_or_else(mismatch)?;
                    self.validators.iter().try_for_each(|v| v.check(name, s))?;
                }
                Ok(())
            }
            AttributeType::StringMap => {
                let entries = value.as_object().ok_or_else(mismatch)?;
                for item in entries.values() {
                    let s = item.as_str().ok_or_else(mismatch)?;
                    self.validators.iter().try_for_each(|v| v.check(name, s))?;
                }
                Ok(())
            }
        }
    }
}

/// Desired configuration that breaks the declared schema.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("missing required attribute {attribute:?}")]
    MissingRequired { attribute: String },
    #[error("unknown attribute {attribute:?}")]
    UnknownAttribute { attribute: String },
    #[error("attribute {attribute:?} is computed and cannot be set")]
    ComputedNotSettable { attribute: String },
    #[error("attribute {attribute:?} must be of type {expected}")]
    TypeMismatch {
        attribute: String,
        expected: AttributeType,
    },
    #[error("attribute {attribute:?} must be between {min} and {max} characters, got {actual}")]
    LengthOutOfRange {
        attribute: String,
        min: usize,
        max: usize,
        actual: usize,
    },
    #[error("attribute {attribute:?} must be one of [{allowed}], got {value:?}")]
    NotOneOf {
        attribute: String,
        value: String,
        allowed: String,
    },
    #[error("attribute {attribute:?} does not match {pattern}")]
    PatternMismatch { attribute: String, pattern: String },
    #[error("attribute {attribute:?} is not valid JSON: {reason}")]
    InvalidJson { attribute: String, reason: String },
}

/// Immutable attribute surface of one resource type.
#[derive(Debug, Clone, Default)]
pub struct ResourceSchema {
    version: u32,
    attributes: BTreeMap<String, Attribute>,
}

impl ResourceSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, attribute: Attribute) -> Self {
        self.attributes.insert(name.into(), attribute);
        self
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &Attribute)> {
        self.attributes.iter().map(|(name, attr)| (name.as_str(), attr))
    }

    /// Names of the key-forming (`force_new`) attributes.
    pub fn key_attributes(&self) -> impl Iterator<Item = &str> {
        self.attributes()
            .filter(|(_, attr)| attr.force_new)
            .map(|(name, _)| name)
    }

    pub fn is_force_new(&self, name: &str) -> bool {
        self.attribute(name).is_some_and(|a| a.force_new)
    }

    /// Checks a desired state against the declaration.
    ///
    /// Returns the first violation found, in attribute-name order.
    pub fn validate(&self, desired: &State) -> Result<(), ValidationError> {
        for name in desired.names() {
            match self.attribute(name) {
                None => {
                    return Err(ValidationError::UnknownAttribute {
                        attribute: name.to_string(),
                    })
                }
                Some(attr) if attr.is_computed_only() => {
                    return Err(ValidationError::ComputedNotSettable {
                        attribute: name.to_string(),
                    })
                }
                Some(_) => {}
            }
        }

        for (name, attr) in self.attributes() {
            match desired.get(name) {
                Some(value) => attr.check(name, value)?,
                None if attr.presence == Presence::Required => {
                    return Err(ValidationError::MissingRequired {
                        attribute: name.to_string(),
                    })
                }
                None => {}
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema() -> ResourceSchema {
        ResourceSchema::new()
            .with_attribute(
                "bot_name",
                Attribute::required_string()
                    .force_new()
                    .validate(Validator::length_between(2, 50)),
            )
            .with_attribute("region", Attribute::required_string().force_new())
            .with_attribute(
                "kind",
                Attribute::new(AttributeType::String, Presence::Optional)
                    .validate(Validator::one_of(["auditLog"])),
            )
            .with_attribute(
                "tags",
                Attribute::new(AttributeType::StringMap, Presence::Optional),
            )
            .with_attribute("policy", Attribute::new(AttributeType::Json, Presence::Optional))
            .with_attribute("arn", Attribute::computed_string())
    }

    fn valid() -> State {
        State::new().with("bot_name", "bot-a").with("region", "us-east-1")
    }

    #[test]
    fn test_valid_state_passes() {
        assert_eq!(schema().validate(&valid()), Ok(()));
    }

    #[test]
    fn test_missing_required() {
        let desired = State::new().with("bot_name", "bot-a");
        assert_eq!(
            schema().validate(&desired),
            Err(ValidationError::MissingRequired {
                attribute: "region".into()
            })
        );
    }

    #[test]
    fn test_length_bounds() {
        let short = valid().with("bot_name", "b");
        assert!(matches!(
            schema().validate(&short),
            Err(ValidationError::LengthOutOfRange { actual: 1, .. })
        ));
        let long = valid().with("bot_name", "b".repeat(51));
        assert!(schema().validate(&long).is_err());
        let max = valid().with("bot_name", "b".repeat(50));
        assert!(schema().validate(&max).is_ok());
    }

    #[test]
    fn test_computed_cannot_be_set() {
        let desired = valid().with("arn", "arn:aws:x");
        assert!(matches!(
            schema().validate(&desired),
            Err(ValidationError::ComputedNotSettable { .. })
        ));
    }

    #[test]
    fn test_unknown_attribute() {
        let desired = valid().with("colour", "blue");
        assert!(matches!(
            schema().validate(&desired),
            Err(ValidationError::UnknownAttribute { .. })
        ));
    }

    #[test]
    fn test_type_checks() {
        let desired = valid().with("tags", json!(["not", "a", "map"]));
        assert!(matches!(
            schema().validate(&desired),
            Err(ValidationError::TypeMismatch {
                expected: AttributeType::StringMap,
                ..
            })
        ));
        let desired = valid().with("policy", "{not json");
        assert!(matches!(
            schema().validate(&desired),
            Err(ValidationError::InvalidJson { .. })
        ));
        let desired = valid().with("kind", "eventLog");
        assert!(matches!(
            schema().validate(&desired),
            Err(ValidationError::NotOneOf { .. })
        ));
    }

    #[test]
    fn test_pattern_matches_whole_value() {
        let v = Validator::pattern("[a-z]+").unwrap();
        assert!(v.check("x", "abc").is_ok());
        assert!(v.check("x", "abc1").is_err());
    }

    #[test]
    fn test_key_attributes() {
        let binding = schema();
        let keys: Vec<_> = binding.key_attributes().collect();
        assert_eq!(keys, ["bot_name", "region"]);
    }
}
