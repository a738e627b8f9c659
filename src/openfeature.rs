//! The vendor-neutral provider contract, shaped after OpenFeature.

use std::{collections::HashMap, fmt};

use derive_more::From;
use serde::{Deserialize, Serialize};

use crate::CallContext;

/// Reserved attribute name that identifies the subject being evaluated.
pub const TARGETING_KEY: &str = "targetingKey";

/// Evaluation context flattened into a single map, with the targeting key stored under
/// [`TARGETING_KEY`].
pub type FlattenedContext = HashMap<String, ContextValue>;

/// Value of an evaluation context attribute.
///
/// `Integer` and `Float` together form the "number" variant.
///
/// Conveniently implements `From` conversions for `String`, `&str`, `bool`, `i64`, `f64`, and
/// [`serde_json::Value`]. A `serde_json::Value` is sorted by shape, so `json!("premium")` becomes
/// `ContextValue::String` rather than `ContextValue::Structured`.
///
/// ```
/// # use bucketeer_openfeature::ContextValue;
/// let plan: ContextValue = "premium".into();
/// let age: ContextValue = 42i64.into();
/// let tags: ContextValue = serde_json::json!(["a", "b"]).into();
/// assert_eq!(ContextValue::from(serde_json::json!("premium")), plan);
/// ```
#[derive(Debug, Clone, PartialEq, From, Serialize)]
#[serde(untagged)]
pub enum ContextValue {
    /// A string value.
    String(String),
    /// A boolean value.
    Boolean(bool),
    /// An integral number that fits `i64`.
    Integer(i64),
    /// A floating point number.
    Float(f64),
    /// Any other JSON value: objects, arrays, null, or integers above `i64::MAX`.
    #[from(ignore)]
    Structured(serde_json::Value),
}

impl ContextValue {
    /// Returns the string value, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ContextValue::String(s) => Some(s),
            ContextValue::Structured(serde_json::Value::String(s)) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for ContextValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<serde_json::Value> for ContextValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::String(s) => ContextValue::String(s),
            serde_json::Value::Bool(b) => ContextValue::Boolean(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    ContextValue::Integer(i)
                } else if n.is_u64() {
                    // Keep the exact integer; `f64` would round it.
                    ContextValue::Structured(serde_json::Value::Number(n))
                } else {
                    match n.as_f64() {
                        Some(f) => ContextValue::Float(f),
                        None => ContextValue::Structured(serde_json::Value::Number(n)),
                    }
                }
            }
            other => ContextValue::Structured(other),
        }
    }
}

impl<'de> Deserialize<'de> for ContextValue {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(ContextValue::from)
    }
}

/// Evaluation context with an explicit targeting key.
///
/// Providers consume the [`FlattenedContext`] produced by [`EvaluationContext::flatten`].
///
/// ```
/// # use bucketeer_openfeature::{EvaluationContext, TARGETING_KEY};
/// let flattened = EvaluationContext::with_targeting_key("user-1")
///     .attribute("country", "jp")
///     .flatten();
/// assert_eq!(flattened[TARGETING_KEY].as_str(), Some("user-1"));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EvaluationContext {
    /// Subject identifier.
    pub targeting_key: Option<String>,
    /// Additional attributes.
    pub attributes: HashMap<String, ContextValue>,
}

impl EvaluationContext {
    /// Create a context for the given subject.
    pub fn with_targeting_key(targeting_key: impl Into<String>) -> Self {
        EvaluationContext {
            targeting_key: Some(targeting_key.into()),
            attributes: HashMap::new(),
        }
    }

    /// Add or replace an attribute.
    pub fn attribute(mut self, key: impl Into<String>, value: impl Into<ContextValue>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Merge the targeting key into the attributes. An explicit `targeting_key` wins over an
    /// attribute of the same name.
    pub fn flatten(&self) -> FlattenedContext {
        let mut flattened = self.attributes.clone();
        if let Some(targeting_key) = &self.targeting_key {
            flattened.insert(
                TARGETING_KEY.to_owned(),
                ContextValue::String(targeting_key.clone()),
            );
        }
        flattened
    }
}

/// Why a flag resolved to its value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Reason {
    /// The value was resolved from targeting rules or explicit targets.
    TargetingMatch,
    /// The value was resolved by a pseudorandom assignment.
    Split,
    /// The value was the flag's default.
    Default,
    /// The value is static (no dynamic evaluation).
    Static,
    /// The value was retrieved from cache.
    Cached,
    /// The flag is disabled.
    Disabled,
    /// The reason could not be determined.
    Unknown,
    /// An error occurred during evaluation.
    Error,
    /// Provider-specific reason.
    Other(String),
}

impl Reason {
    /// Wire representation of the reason.
    pub fn as_str(&self) -> &str {
        match self {
            Reason::TargetingMatch => "TARGETING_MATCH",
            Reason::Split => "SPLIT",
            Reason::Default => "DEFAULT",
            Reason::Static => "STATIC",
            Reason::Cached => "CACHED",
            Reason::Disabled => "DISABLED",
            Reason::Unknown => "UNKNOWN",
            Reason::Error => "ERROR",
            Reason::Other(reason) => reason.as_str(),
        }
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Reason {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Kind of a [`ResolutionError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// The targeting key is absent or is not a string.
    TargetingKeyMissing,
    /// A value could not be parsed or serialized.
    ParseError,
    /// The flag does not exist.
    FlagNotFound,
    /// The flag value type does not match the requested type.
    TypeMismatch,
    /// Any other error.
    General,
}

impl ErrorCode {
    /// Wire representation of the error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::TargetingKeyMissing => "TARGETING_KEY_MISSING",
            ErrorCode::ParseError => "PARSE_ERROR",
            ErrorCode::FlagNotFound => "FLAG_NOT_FOUND",
            ErrorCode::TypeMismatch => "TYPE_MISMATCH",
            ErrorCode::General => "GENERAL",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured error attached to a resolution.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("{code}: {message}")]
pub struct ResolutionError {
    /// Error kind.
    pub code: ErrorCode,
    /// Free-text description.
    pub message: String,
}

impl ResolutionError {
    /// Create a new error of the given kind.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ResolutionError {
            code,
            message: message.into(),
        }
    }

    /// Shorthand for an [`ErrorCode::TargetingKeyMissing`] error.
    pub fn targeting_key_missing(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::TargetingKeyMissing, message)
    }

    /// Shorthand for an [`ErrorCode::ParseError`] error.
    pub fn parse_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ParseError, message)
    }

    /// Shorthand for an [`ErrorCode::FlagNotFound`] error.
    pub fn flag_not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::FlagNotFound, message)
    }

    /// Shorthand for an [`ErrorCode::TypeMismatch`] error.
    pub fn type_mismatch(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::TypeMismatch, message)
    }

    /// Shorthand for an [`ErrorCode::General`] error.
    pub fn general(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::General, message)
    }
}

/// Outcome of a single flag evaluation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionDetails<T> {
    /// Resolved value.
    pub value: T,
    /// Why `value` was chosen.
    pub reason: Reason,
    /// Name of the resolved variation, if the provider reported one.
    pub variant: Option<String>,
    /// Error encountered during evaluation, if any.
    pub error: Option<ResolutionError>,
}

impl<T> ResolutionDetails<T> {
    /// Resolution that failed before any value was computed: carries `default_value`, reason
    /// [`Reason::Error`], and `error`.
    pub fn from_error(default_value: T, error: ResolutionError) -> Self {
        ResolutionDetails {
            value: default_value,
            reason: Reason::Error,
            variant: None,
            error: Some(error),
        }
    }

    /// Returns `true` if an error was attached to this resolution.
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Provider metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Metadata {
    /// Provider name.
    pub name: String,
}

/// Evaluation lifecycle hook.
///
/// Providers may contribute hooks through [`FeatureProvider::hooks`].
pub trait Hook: Send + Sync {
    /// Hook name, for diagnostics.
    fn name(&self) -> &str;
}

/// A flag evaluation provider.
///
/// Evaluation operations never fail: errors are reported through
/// [`ResolutionDetails::error`] together with a usable value.
pub trait FeatureProvider: Send + Sync {
    /// Provider metadata.
    fn metadata(&self) -> Metadata;

    /// Evaluate a boolean flag.
    fn resolve_bool_value(
        &self,
        ctx: &CallContext,
        flag_key: &str,
        default_value: bool,
        evaluation_context: &FlattenedContext,
    ) -> ResolutionDetails<bool>;

    /// Evaluate a string flag.
    fn resolve_string_value(
        &self,
        ctx: &CallContext,
        flag_key: &str,
        default_value: String,
        evaluation_context: &FlattenedContext,
    ) -> ResolutionDetails<String>;

    /// Evaluate an integer flag.
    fn resolve_int_value(
        &self,
        ctx: &CallContext,
        flag_key: &str,
        default_value: i64,
        evaluation_context: &FlattenedContext,
    ) -> ResolutionDetails<i64>;

    /// Evaluate a floating point flag.
    fn resolve_float_value(
        &self,
        ctx: &CallContext,
        flag_key: &str,
        default_value: f64,
        evaluation_context: &FlattenedContext,
    ) -> ResolutionDetails<f64>;

    /// Evaluate a structured (JSON) flag.
    fn resolve_object_value(
        &self,
        ctx: &CallContext,
        flag_key: &str,
        default_value: serde_json::Value,
        evaluation_context: &FlattenedContext,
    ) -> ResolutionDetails<serde_json::Value>;

    /// Hooks contributed by the provider.
    fn hooks(&self) -> Vec<Box<dyn Hook>>;

    /// Release provider resources.
    fn shutdown(&self, ctx: &CallContext);
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn flatten_puts_targeting_key_under_reserved_name() {
        let ctx = EvaluationContext::with_targeting_key("user-1")
            .attribute(TARGETING_KEY, "shadowed")
            .attribute("age", 30i64);

        let flattened = ctx.flatten();

        assert_eq!(flattened.len(), 2);
        assert_eq!(flattened[TARGETING_KEY], ContextValue::String("user-1".into()));
        assert_eq!(flattened["age"], ContextValue::Integer(30));
    }

    #[test]
    fn flatten_without_targeting_key() {
        let flattened = EvaluationContext::default().attribute("a", true).flatten();
        assert!(!flattened.contains_key(TARGETING_KEY));
    }

    #[test]
    fn context_value_deserializes_by_shape() {
        let values: Vec<ContextValue> =
            serde_json::from_value(json!(["s", true, 1, 1.5, {"k": "v"}, null])).unwrap();
        assert_eq!(
            values,
            vec![
                ContextValue::String("s".into()),
                ContextValue::Boolean(true),
                ContextValue::Integer(1),
                ContextValue::Float(1.5),
                ContextValue::Structured(json!({"k": "v"})),
                ContextValue::Structured(serde_json::Value::Null),
            ]
        );
    }

    #[test]
    fn json_values_are_sorted_by_shape() {
        assert_eq!(
            ContextValue::from(json!("premium")),
            ContextValue::String("premium".into())
        );
        assert_eq!(ContextValue::from(json!(false)), ContextValue::Boolean(false));
        assert_eq!(ContextValue::from(json!(-7)), ContextValue::Integer(-7));
        assert_eq!(ContextValue::from(json!(2.5)), ContextValue::Float(2.5));
        assert_eq!(ContextValue::from(json!([1])), ContextValue::Structured(json!([1])));
        assert_eq!(ContextValue::from(json!(null)), ContextValue::Structured(json!(null)));
    }

    #[test]
    fn integers_above_i64_keep_their_exact_value() {
        let value: ContextValue = serde_json::from_value(json!(u64::MAX)).unwrap();
        assert_eq!(value, ContextValue::Structured(json!(u64::MAX)));
        assert_eq!(serde_json::to_string(&value).unwrap(), "18446744073709551615");
    }

    #[test]
    fn as_str_covers_json_strings() {
        assert_eq!(ContextValue::from("a").as_str(), Some("a"));
        assert_eq!(ContextValue::Structured(json!("b")).as_str(), Some("b"));
        assert_eq!(ContextValue::Integer(1).as_str(), None);
    }

    #[test]
    fn from_error_carries_default_value() {
        let details = ResolutionDetails::from_error(3, ResolutionError::parse_error("bad"));
        assert_eq!(details.value, 3);
        assert_eq!(details.reason, Reason::Error);
        assert!(details.is_error());
    }

    #[test]
    fn reason_and_error_code_render_in_wire_format() {
        assert_eq!(Reason::TargetingMatch.to_string(), "TARGETING_MATCH");
        assert_eq!(Reason::Other("CUSTOM".into()).to_string(), "CUSTOM");
        assert_eq!(
            ResolutionError::flag_not_found("no such flag").to_string(),
            "FLAG_NOT_FOUND: no such flag"
        );
        assert_eq!(
            serde_json::to_value(ResolutionDetails {
                value: 1,
                reason: Reason::Static,
                variant: None,
                error: Some(ResolutionError::general("boom")),
            })
            .unwrap(),
            json!({
                "value": 1,
                "reason": "STATIC",
                "variant": null,
                "error": {"code": "GENERAL", "message": "boom"},
            })
        );
    }
}
