//! OpenFeature provider for Bucketeer, a feature flagging and experimentation platform.
//!
//! # Overview
//!
//! The crate revolves around a [`Provider`] that implements the vendor-neutral
//! [`FeatureProvider`] contract on top of a Bucketeer SDK client ([`BucketeerSdk`]). For every
//! evaluation the provider:
//! - converts the [`FlattenedContext`] into a Bucketeer [`User`],
//! - calls the SDK's typed `*_variation_details` operation,
//! - converts Bucketeer's [`EvaluationReason`] into a [`Reason`] and, for error reasons, a
//!   [`ResolutionError`].
//!
//! Targeting rules are evaluated entirely by the Bucketeer SDK. The provider never inspects flag
//! definitions.
//!
//! ```
//! # use bucketeer_openfeature::*;
//! # fn test(sdk: impl BucketeerSdk) {
//! let provider = Provider::new(sdk);
//! let details = provider.resolve_string_value(
//!     &CallContext::background(),
//!     "checkout-theme",
//!     "light".to_owned(),
//!     &EvaluationContext::with_targeting_key("user-1")
//!         .attribute("country", "jp")
//!         .flatten(),
//! );
//! println!("{} ({})", details.value, details.reason);
//! # }
//! ```
//!
//! # Configuration
//!
//! [`ProviderConfig`] collects the SDK options once and validates them into immutable
//! [`SdkOptions`], which are handed to the SDK constructor by [`ProviderConfig::to_provider`].
//!
//! # Error Handling
//!
//! Flag evaluation never fails. If the evaluation context cannot be converted, the caller's
//! default value is returned with [`Reason::Error`] and an attached [`ResolutionError`], and the
//! SDK is not called. If the SDK reports an error reason, the value returned by the SDK is kept
//! and the classified error is attached.
//!
//! Errors during provider construction are represented by the [`Error`] enum. Failures while
//! closing the SDK in [`FeatureProvider::shutdown`] are logged and not returned.
//!
//! # Logging
//!
//! The package uses the [`log`](https://docs.rs/log/latest/log/) crate with the `bucketeer`
//! target. Consider integrating a `log`-compatible logger implementation for better visibility
//! into provider operations.

#![warn(rustdoc::missing_crate_level_docs)]
#![warn(missing_docs)]

mod bucketeer;
mod call_context;
mod config;
mod error;
mod openfeature;
mod provider;
mod reason;
mod user;

pub use bucketeer::{BucketeerSdk, EvaluationDetails, EvaluationReason, SdkError, User};
pub use call_context::CallContext;
pub use config::{ProviderConfig, SdkOptions};
pub use error::{Error, Result};
pub use openfeature::{
    ContextValue, ErrorCode, EvaluationContext, FeatureProvider, FlattenedContext, Hook, Metadata,
    Reason, ResolutionDetails, ResolutionError, TARGETING_KEY,
};
pub use provider::Provider;
