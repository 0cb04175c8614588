//! Preconfigured HTTP client handle for the kiosk backend.
//!
//! Both screens share one backend origin.  This module only holds that
//! configuration: there is no retry, timeout, auth header, or response
//! schema here.  Callers build requests from it when they need one.

use url::Url;

/// Backend origin used when none is configured.
pub const DEFAULT_API_BASE: &str = "https://kiosk-backend-0y2m.onrender.com/";

/// A shared request handle pointed at a fixed base origin.
///
/// Cloning is cheap: `reqwest::Client` keeps its connection pool behind an
/// `Arc`, so clones share it.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base: Url,
    http: reqwest::Client,
}

impl ApiClient {
    /// Creates a client for `base`.
    ///
    /// A trailing slash is added to the base path if missing so that
    /// [`ApiClient::url`] appends paths instead of replacing the last segment.
    pub fn new(mut base: Url) -> Self {
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Self {
            base,
            http: reqwest::Client::new(),
        }
    }

    /// The backend origin used when none is configured.
    ///
    /// Cheap: no HTTP client is built.
    pub fn default_base() -> Url {
        // The constant is a valid absolute URL.
        Url::parse(DEFAULT_API_BASE).expect("default API base is a valid URL")
    }

    /// Returns the configured base origin.
    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Resolves `path` against the base origin.
    ///
    /// # Errors
    ///
    /// Returns the URL parse error if `path` cannot be joined.
    ///
    /// ```rust
    /// use kiosk_core::api::ApiClient;
    /// use url::Url;
    ///
    /// let api = ApiClient::new(Url::parse("https://api.example.com/v1").unwrap());
    /// assert_eq!(api.url("/kiosks").unwrap().as_str(), "https://api.example.com/v1/kiosks");
    /// ```
    pub fn url(&self, path: &str) -> Result<Url, url::ParseError> {
        self.base.join(path.trim_start_matches('/'))
    }

    /// Starts a GET request for `path` on the shared client.
    ///
    /// # Errors
    ///
    /// Returns the URL parse error if `path` cannot be joined.
    pub fn get(&self, path: &str) -> Result<reqwest::RequestBuilder, url::ParseError> {
        Ok(self.http.get(self.url(path)?))
    }

    /// Starts a POST request for `path` on the shared client.
    ///
    /// # Errors
    ///
    /// Returns the URL parse error if `path` cannot be joined.
    pub fn post(&self, path: &str) -> Result<reqwest::RequestBuilder, url::ParseError> {
        Ok(self.http.post(self.url(path)?))
    }
}

impl Default for ApiClient {
    fn default() -> Self {
        Self::new(Self::default_base())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
