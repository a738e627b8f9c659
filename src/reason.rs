use crate::{EvaluationReason, Reason, ResolutionError};

/// Convert a Bucketeer evaluation reason into a provider [`Reason`].
///
/// Every `ERROR_*` code becomes [`Reason::Error`]; the specific code is preserved by
/// [`classify_error`] in the attached error.
pub(crate) fn convert_reason(reason: EvaluationReason) -> Reason {
    match reason {
        EvaluationReason::Target | EvaluationReason::Rule | EvaluationReason::Prerequisite => {
            Reason::TargetingMatch
        }
        EvaluationReason::Default => Reason::Default,
        EvaluationReason::Client => Reason::Static,
        EvaluationReason::OffVariation => Reason::Disabled,
        EvaluationReason::ErrorNoEvaluations
        | EvaluationReason::ErrorFlagNotFound
        | EvaluationReason::ErrorWrongType
        | EvaluationReason::ErrorUserIdNotSpecified
        | EvaluationReason::ErrorFeatureFlagIdNotSpecified
        | EvaluationReason::ErrorException
        | EvaluationReason::ErrorCacheNotFound => Reason::Error,
        EvaluationReason::Unrecognized => Reason::Unknown,
    }
}

/// Classify a Bucketeer evaluation reason as a [`ResolutionError`]. Returns `None` for reasons
/// that do not indicate an error.
pub(crate) fn classify_error(reason: EvaluationReason, feature_id: &str) -> Option<ResolutionError> {
    let error = match reason {
        EvaluationReason::Target
        | EvaluationReason::Rule
        | EvaluationReason::Default
        | EvaluationReason::Client
        | EvaluationReason::OffVariation
        | EvaluationReason::Prerequisite
        | EvaluationReason::Unrecognized => return None,
        EvaluationReason::ErrorFlagNotFound => {
            ResolutionError::flag_not_found(format!("flag {feature_id:?} not found ({reason})"))
        }
        EvaluationReason::ErrorWrongType => ResolutionError::type_mismatch(format!(
            "flag {feature_id:?} has a different type than requested ({reason})"
        )),
        EvaluationReason::ErrorUserIdNotSpecified => {
            ResolutionError::targeting_key_missing(format!("user id not specified ({reason})"))
        }
        EvaluationReason::ErrorFeatureFlagIdNotSpecified => {
            ResolutionError::general(format!("feature flag id not specified ({reason})"))
        }
        EvaluationReason::ErrorNoEvaluations => ResolutionError::general(format!(
            "no evaluations for flag {feature_id:?} ({reason})"
        )),
        EvaluationReason::ErrorCacheNotFound => ResolutionError::general(format!(
            "flag cache is not ready ({reason})"
        )),
        EvaluationReason::ErrorException => ResolutionError::general(format!(
            "unexpected error while evaluating flag {feature_id:?} ({reason})"
        )),
    };
    Some(error)
}
