//! The Bucketeer SDK surface consumed by the provider.
//!
//! Connection management, local evaluation, caching, and event delivery all live behind
//! [`BucketeerSdk`]. The provider only translates inputs and outputs.

use std::{collections::HashMap, fmt};

use serde::{Deserialize, Serialize};

use crate::CallContext;

/// Error returned by the backend SDK lifecycle operations.
pub type SdkError = Box<dyn std::error::Error + Send + Sync>;

/// A Bucketeer user: an identifier and string attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// User identifier.
    pub id: String,
    /// User attributes. Non-string context values are stored JSON-encoded.
    pub data: HashMap<String, String>,
}

/// Evaluation reason reported by Bucketeer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EvaluationReason {
    /// The user is listed in the flag's individual targets.
    Target,
    /// A targeting rule matched.
    Rule,
    /// No target or rule matched; the default strategy was served.
    Default,
    /// Deprecated: the value was determined on the client.
    Client,
    /// The flag is off; the off variation was served.
    OffVariation,
    /// Determined by a prerequisite flag.
    Prerequisite,
    /// No evaluations could be produced.
    ErrorNoEvaluations,
    /// The flag does not exist.
    ErrorFlagNotFound,
    /// The flag value has a different type than requested.
    ErrorWrongType,
    /// The user was missing an identifier.
    ErrorUserIdNotSpecified,
    /// The flag id was missing.
    ErrorFeatureFlagIdNotSpecified,
    /// Unclassified failure, such as a network error or timeout.
    ErrorException,
    /// The local flag cache has no data yet.
    ErrorCacheNotFound,
    /// Any code this crate does not know about.
    #[serde(other)]
    Unrecognized,
}

impl EvaluationReason {
    /// All reasons known to this crate, excluding [`EvaluationReason::Unrecognized`].
    pub const KNOWN: [EvaluationReason; 13] = [
        EvaluationReason::Target,
        EvaluationReason::Rule,
        EvaluationReason::Default,
        EvaluationReason::Client,
        EvaluationReason::OffVariation,
        EvaluationReason::Prerequisite,
        EvaluationReason::ErrorNoEvaluations,
        EvaluationReason::ErrorFlagNotFound,
        EvaluationReason::ErrorWrongType,
        EvaluationReason::ErrorUserIdNotSpecified,
        EvaluationReason::ErrorFeatureFlagIdNotSpecified,
        EvaluationReason::ErrorException,
        EvaluationReason::ErrorCacheNotFound,
    ];

    /// Wire representation of the reason.
    pub fn as_str(&self) -> &'static str {
        match self {
            EvaluationReason::Target => "TARGET",
            EvaluationReason::Rule => "RULE",
            EvaluationReason::Default => "DEFAULT",
            EvaluationReason::Client => "CLIENT",
            EvaluationReason::OffVariation => "OFF_VARIATION",
            EvaluationReason::Prerequisite => "PREREQUISITE",
            EvaluationReason::ErrorNoEvaluations => "ERROR_NO_EVALUATIONS",
            EvaluationReason::ErrorFlagNotFound => "ERROR_FLAG_NOT_FOUND",
            EvaluationReason::ErrorWrongType => "ERROR_WRONG_TYPE",
            EvaluationReason::ErrorUserIdNotSpecified => "ERROR_USER_ID_NOT_SPECIFIED",
            EvaluationReason::ErrorFeatureFlagIdNotSpecified => {
                "ERROR_FEATURE_FLAG_ID_NOT_SPECIFIED"
            }
            EvaluationReason::ErrorException => "ERROR_EXCEPTION",
            EvaluationReason::ErrorCacheNotFound => "ERROR_CACHE_NOT_FOUND",
            EvaluationReason::Unrecognized => "UNRECOGNIZED",
        }
    }

    /// Returns `true` for the `ERROR_*` codes.
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            EvaluationReason::ErrorNoEvaluations
                | EvaluationReason::ErrorFlagNotFound
                | EvaluationReason::ErrorWrongType
                | EvaluationReason::ErrorUserIdNotSpecified
                | EvaluationReason::ErrorFeatureFlagIdNotSpecified
                | EvaluationReason::ErrorException
                | EvaluationReason::ErrorCacheNotFound
        )
    }
}

impl fmt::Display for EvaluationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Evaluation result returned by the `*_variation_details` operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationDetails<T> {
    /// Evaluated flag id.
    pub feature_id: String,
    /// Version of the flag definition used.
    pub feature_version: i32,
    /// Id of the evaluated user.
    pub user_id: String,
    /// Id of the served variation. Empty when no variation was served.
    pub variation_id: String,
    /// Human-readable name of the served variation. Empty when no variation was served.
    pub variation_name: String,
    /// Served value, or the default value passed in on error.
    pub variation_value: T,
    /// Why the value was served.
    pub reason: EvaluationReason,
}

/// Operations the provider needs from a Bucketeer SDK client.
///
/// Implementations are shared between threads and called concurrently. Backend failures
/// (timeouts, network errors, cancellation through `ctx`) must be reported as an `ERROR_*`
/// reason in the returned details rather than by panicking.
pub trait BucketeerSdk: Send + Sync {
    /// Evaluate a boolean flag.
    fn bool_variation_details(
        &self,
        ctx: &CallContext,
        user: &User,
        feature_id: &str,
        default_value: bool,
    ) -> EvaluationDetails<bool>;

    /// Evaluate a string flag.
    fn string_variation_details(
        &self,
        ctx: &CallContext,
        user: &User,
        feature_id: &str,
        default_value: String,
    ) -> EvaluationDetails<String>;

    /// Evaluate an integer flag.
    fn int64_variation_details(
        &self,
        ctx: &CallContext,
        user: &User,
        feature_id: &str,
        default_value: i64,
    ) -> EvaluationDetails<i64>;

    /// Evaluate a floating point flag.
    fn float64_variation_details(
        &self,
        ctx: &CallContext,
        user: &User,
        feature_id: &str,
        default_value: f64,
    ) -> EvaluationDetails<f64>;

    /// Evaluate a JSON flag.
    fn object_variation_details(
        &self,
        ctx: &CallContext,
        user: &User,
        feature_id: &str,
        default_value: serde_json::Value,
    ) -> EvaluationDetails<serde_json::Value>;

    /// Flush pending events and release resources.
    fn close(&self, ctx: &CallContext) -> Result<(), SdkError>;
}
