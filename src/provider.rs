use crate::{
    reason::{classify_error, convert_reason},
    user::to_bucketeer_user,
    BucketeerSdk, CallContext, EvaluationDetails, FeatureProvider, FlattenedContext, Hook,
    Metadata, ResolutionDetails, User,
};

/// An OpenFeature-style provider backed by a Bucketeer SDK client.
///
/// `Provider` holds no state of its own besides the SDK client, so a single instance can be shared
/// between threads and used for concurrent evaluations.
///
/// # Examples
/// ```
/// # use bucketeer_openfeature::{CallContext, EvaluationContext, FeatureProvider, Provider, BucketeerSdk};
/// # fn test(sdk: impl BucketeerSdk) {
/// let provider = Provider::new(sdk);
/// let ctx = EvaluationContext::with_targeting_key("user-1").flatten();
/// let enabled = provider
///     .resolve_bool_value(&CallContext::background(), "new-checkout", false, &ctx)
///     .value;
/// # }
/// ```
pub struct Provider<S> {
    sdk: S,
}

impl<S: BucketeerSdk> Provider<S> {
    /// Name reported by [`FeatureProvider::metadata`].
    pub const NAME: &'static str = "Bucketeer";

    /// Wrap an already constructed SDK client.
    ///
    /// Use [`ProviderConfig::to_provider`](crate::ProviderConfig::to_provider) to build the client
    /// from configuration.
    pub fn new(sdk: S) -> Self {
        Provider { sdk }
    }

    /// The underlying SDK client.
    pub fn sdk(&self) -> &S {
        &self.sdk
    }

    /// Translate the context, call `variation` with the resulting user, and convert the result.
    ///
    /// `variation` is not called if the context cannot be translated; `default_value` is returned
    /// instead.
    fn evaluate<T>(
        &self,
        flag_key: &str,
        default_value: T,
        evaluation_context: &FlattenedContext,
        variation: impl FnOnce(&S, &User, T) -> EvaluationDetails<T>,
    ) -> ResolutionDetails<T> {
        let user = match to_bucketeer_user(evaluation_context) {
            Ok(user) => user,
            Err(err) => {
                log::warn!(target: "bucketeer",
                           flag_key,
                           error_code:display = err.code;
                           "invalid evaluation context: {}", err.message);
                return ResolutionDetails::from_error(default_value, err);
            }
        };

        let evaluation = variation(&self.sdk, &user, default_value);

        let error = classify_error(evaluation.reason, flag_key);
        if let Some(error) = &error {
            log::warn!(target: "bucketeer",
                       flag_key,
                       user_id:display = user.id,
                       reason:display = evaluation.reason;
                       "bucketeer reported an evaluation error: {}", error);
        }

        log::trace!(target: "bucketeer",
                    flag_key,
                    user_id:display = user.id,
                    user_data:serde = user.data,
                    variation_id:display = evaluation.variation_id,
                    feature_version = evaluation.feature_version,
                    reason:display = evaluation.reason;
                    "evaluated a flag");

        ResolutionDetails {
            value: evaluation.variation_value,
            reason: convert_reason(evaluation.reason),
            variant: Some(evaluation.variation_name).filter(|name| !name.is_empty()),
            error,
        }
    }
}

impl<S: BucketeerSdk> FeatureProvider for Provider<S> {
    fn metadata(&self) -> Metadata {
        Metadata {
            name: Self::NAME.to_owned(),
        }
    }

    fn resolve_bool_value(
        &self,
        ctx: &CallContext,
        flag_key: &str,
        default_value: bool,
        evaluation_context: &FlattenedContext,
    ) -> ResolutionDetails<bool> {
        self.evaluate(flag_key, default_value, evaluation_context, |sdk, user, default| {
            sdk.bool_variation_details(ctx, user, flag_key, default)
        })
    }

    fn resolve_string_value(
        &self,
        ctx: &CallContext,
        flag_key: &str,
        default_value: String,
        evaluation_context: &FlattenedContext,
    ) -> ResolutionDetails<String> {
        self.evaluate(flag_key, default_value, evaluation_context, |sdk, user, default| {
            sdk.string_variation_details(ctx, user, flag_key, default)
        })
    }

    fn resolve_int_value(
        &self,
        ctx: &CallContext,
        flag_key: &str,
        default_value: i64,
        evaluation_context: &FlattenedContext,
    ) -> ResolutionDetails<i64> {
        self.evaluate(flag_key, default_value, evaluation_context, |sdk, user, default| {
            sdk.int64_variation_details(ctx, user, flag_key, default)
        })
    }

    fn resolve_float_value(
        &self,
        ctx: &CallContext,
        flag_key: &str,
        default_value: f64,
        evaluation_context: &FlattenedContext,
    ) -> ResolutionDetails<f64> {
        self.evaluate(flag_key, default_value, evaluation_context, |sdk, user, default| {
            sdk.float64_variation_details(ctx, user, flag_key, default)
        })
    }

    fn resolve_object_value(
        &self,
        ctx: &CallContext,
        flag_key: &str,
        default_value: serde_json::Value,
        evaluation_context: &FlattenedContext,
    ) -> ResolutionDetails<serde_json::Value> {
        self.evaluate(flag_key, default_value, evaluation_context, |sdk, user, default| {
            sdk.object_variation_details(ctx, user, flag_key, default)
        })
    }

    fn hooks(&self) -> Vec<Box<dyn Hook>> {
        Vec::new()
    }

    /// Close the SDK client. Failures are logged and otherwise ignored.
    fn shutdown(&self, ctx: &CallContext) {
        log::debug!(target: "bucketeer", "closing bucketeer sdk");
        if let Err(err) = self.sdk.close(ctx) {
            log::warn!(target: "bucketeer", "failed to close bucketeer sdk: {}", err);
        }
    }
}
