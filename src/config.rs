use std::time::Duration;

use url::Url;

use crate::{BucketeerSdk, Error, Provider, Result, SdkError};

/// Configuration for [`Provider`].
///
/// # Examples
/// ```
/// # use std::time::Duration;
/// # use bucketeer_openfeature::ProviderConfig;
/// let options = ProviderConfig::from_api_key("api-key")
///     .api_endpoint("api.example.com")
///     .tag("server")
///     .polling_interval(Duration::from_secs(30))
///     .build_options()
///     .unwrap();
/// assert_eq!(options.api_endpoint.as_str(), "https://api.example.com/");
/// ```
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    api_key: String,
    api_endpoint: String,
    scheme: String,
    tag: String,
    polling_interval: Duration,
    enable_debug_log: bool,
}

/// Validated, immutable options handed to the Bucketeer SDK constructor.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct SdkOptions {
    /// API key used to authenticate with Bucketeer.
    pub api_key: String,
    /// Bucketeer API endpoint, including scheme.
    pub api_endpoint: Url,
    /// Tag that scopes which flags are evaluated.
    pub tag: String,
    /// How often the SDK refreshes its local flag cache.
    pub polling_interval: Duration,
    /// Whether the SDK should log debug output.
    pub enable_debug_log: bool,
    /// Name of the wrapping SDK, reported to Bucketeer.
    pub wrapper_sdk_name: &'static str,
    /// Version of the wrapping SDK, reported to Bucketeer.
    pub wrapper_sdk_version: &'static str,
    /// Source id of the wrapping SDK, reported to Bucketeer.
    pub wrapper_source_id: i32,
}

impl ProviderConfig {
    /// Default API endpoint host.
    pub const DEFAULT_API_ENDPOINT: &'static str = "api.bucketeer.io";

    /// Default scheme for the API endpoint.
    pub const DEFAULT_SCHEME: &'static str = "https";

    /// Default tag.
    pub const DEFAULT_TAG: &'static str = "server";

    /// Default polling interval for the local flag cache.
    pub const DEFAULT_POLLING_INTERVAL: Duration = Duration::from_secs(60);

    /// Name reported as the wrapper SDK.
    pub const WRAPPER_SDK_NAME: &'static str = "openfeature-rust";

    /// Source id reported as the wrapper SDK.
    pub const WRAPPER_SOURCE_ID: i32 = 103;

    /// Create a default configuration using the specified API key.
    ///
    /// ```
    /// # use bucketeer_openfeature::ProviderConfig;
    /// ProviderConfig::from_api_key("api-key");
    /// ```
    pub fn from_api_key(api_key: impl Into<String>) -> Self {
        ProviderConfig {
            api_key: api_key.into(),
            api_endpoint: ProviderConfig::DEFAULT_API_ENDPOINT.to_owned(),
            scheme: ProviderConfig::DEFAULT_SCHEME.to_owned(),
            tag: ProviderConfig::DEFAULT_TAG.to_owned(),
            polling_interval: ProviderConfig::DEFAULT_POLLING_INTERVAL,
            enable_debug_log: false,
        }
    }

    /// Override the API endpoint host, e.g. `api.example.com`.
    pub fn api_endpoint(mut self, api_endpoint: impl Into<String>) -> Self {
        self.api_endpoint = api_endpoint.into();
        self
    }

    /// Override the scheme used to reach the API endpoint.
    pub fn scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    /// Set the tag that scopes flag evaluation.
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    /// Set how often the SDK refreshes its local flag cache.
    pub fn polling_interval(mut self, polling_interval: Duration) -> Self {
        self.polling_interval = polling_interval;
        self
    }

    /// Enable SDK debug logging.
    pub fn enable_debug_log(mut self, enable_debug_log: bool) -> Self {
        self.enable_debug_log = enable_debug_log;
        self
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidApiKey`] if the API key is empty.
    /// - [`Error::InvalidTag`] if the tag is empty.
    /// - [`Error::InvalidPollingInterval`] if the polling interval is zero.
    /// - [`Error::InvalidApiEndpoint`] if scheme and endpoint do not form a valid URL.
    pub fn build_options(self) -> Result<SdkOptions> {
        if self.api_key.is_empty() {
            return Err(Error::InvalidApiKey);
        }
        if self.tag.is_empty() {
            return Err(Error::InvalidTag);
        }
        if self.polling_interval.is_zero() {
            return Err(Error::InvalidPollingInterval);
        }
        let api_endpoint = Url::parse(&format!("{}://{}", self.scheme, self.api_endpoint))
            .map_err(Error::InvalidApiEndpoint)?;

        Ok(SdkOptions {
            api_key: self.api_key,
            api_endpoint,
            tag: self.tag,
            polling_interval: self.polling_interval,
            enable_debug_log: self.enable_debug_log,
            wrapper_sdk_name: ProviderConfig::WRAPPER_SDK_NAME,
            wrapper_sdk_version: env!("CARGO_PKG_VERSION"),
            wrapper_source_id: ProviderConfig::WRAPPER_SOURCE_ID,
        })
    }

    /// Create a new [`Provider`] using the specified configuration.
    ///
    /// `connect` is called once with the validated [`SdkOptions`] and must return a started
    /// Bucketeer SDK client.
    ///
    /// # Errors
    ///
    /// Any error from [`ProviderConfig::build_options`], or [`Error::Sdk`] if `connect` fails.
    pub fn to_provider<S, F, E>(self, connect: F) -> Result<Provider<S>>
    where
        S: BucketeerSdk,
        F: FnOnce(SdkOptions) -> std::result::Result<S, E>,
        E: Into<SdkError>,
    {
        let options = self.build_options()?;
        log::debug!(target: "bucketeer",
                    api_endpoint:display = options.api_endpoint,
                    tag:display = options.tag;
                    "starting bucketeer sdk");
        let sdk = connect(options).map_err(Error::sdk)?;
        Ok(Provider::new(sdk))
    }
}
