use reqwest::Url;
use std::env;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_API_PREFIX: &str = "/api/v1";
pub const DEFAULT_PAGE_SIZE: u32 = 5;

/// Client-side configuration: where the API lives, how pages are sized and
/// how many pages the query cache keeps.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Scheme, host and port, without a trailing slash
    pub base_url: String,

    /// Path prefix of the versioned API
    pub api_prefix: String,

    /// Bearer token sent with every request
    pub token: Option<String>,

    /// Per-request timeout
    pub request_timeout: Duration,

    /// Rows per table page
    pub page_size: u32,

    /// Maximum number of pages held by the query cache
    pub cache_capacity: usize,
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_prefix: DEFAULT_API_PREFIX.to_string(),
            token: None,
            request_timeout: Duration::from_secs(30),
            page_size: DEFAULT_PAGE_SIZE,
            cache_capacity: 32,
        }
    }

    pub fn api_prefix(mut self, prefix: &str) -> Self {
        let trimmed = prefix.trim_end_matches('/');
        self.api_prefix = if trimmed.is_empty() || trimmed.starts_with('/') {
            trimmed.to_string()
        } else {
            format!("/{trimmed}")
        };
        self
    }

    pub fn token(mut self, token: &str) -> Self {
        self.token = Some(token.to_string());
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    /// Parse from an API URL
    ///
    /// Format: "http(s)://host[:port][/prefix]". Without a path the default
    /// `/api/v1` prefix is used.
    ///
    /// ```ignore
    /// let config = ClientConfig::from_url("https://admin.example.com/api/v2")?;
    /// ```
    pub fn from_url(url: &str) -> Result<Self, String> {
        let rest = url
            .strip_prefix("http://")
            .or_else(|| url.strip_prefix("https://"))
            .ok_or_else(|| "URL must start with 'http://' or 'https://'".to_string())?;
        let scheme_len = url.len() - rest.len();

        let (authority, path) = match rest.find('/') {
            Some(idx) => (&rest[..idx], &rest[idx..]),
            None => (rest, ""),
        };

        if authority.is_empty() {
            return Err("URL is missing a host".to_string());
        }

        if let Some((_, port)) = authority.rsplit_once(':') {
            port.parse::<u16>().map_err(|_| "Invalid port".to_string())?;
        }

        let config = Self::new(&url[..scheme_len + authority.len()]);
        let path = path.trim_end_matches('/');
        Ok(if path.is_empty() {
            config
        } else {
            config.api_prefix(path)
        })
    }

    /// Load from `RESTO_*` environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, String> {
        Self::from_env_with_url(None)
    }

    /// Like [`from_env`](Self::from_env), but `url` replaces `RESTO_API_URL`,
    /// which is then not read at all.
    pub fn from_env_with_url(url: Option<&str>) -> Result<Self, String> {
        Self::from_vars(url, |name| env::var(name).ok())
    }

    fn from_vars<F>(url: Option<&str>, var: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match url {
            Some(url) => Self::from_url(url)?,
            None => match var("RESTO_API_URL") {
                Some(url) => Self::from_url(&url)?,
                None => Self::default(),
            },
        };

        if let Some(token) = var("RESTO_API_TOKEN")
            && !token.is_empty()
        {
            config.token = Some(token);
        }

        if let Some(raw) = var("RESTO_PAGE_SIZE") {
            config.page_size = raw
                .parse()
                .map_err(|_| "RESTO_PAGE_SIZE must be a valid u32".to_string())?;
        }

        if let Some(raw) = var("RESTO_CACHE_CAPACITY") {
            config.cache_capacity = raw
                .parse()
                .map_err(|_| "RESTO_CACHE_CAPACITY must be a valid usize".to_string())?;
        }

        if let Some(raw) = var("RESTO_REQUEST_TIMEOUT_SECS") {
            let secs: u64 = raw
                .parse()
                .map_err(|_| "RESTO_REQUEST_TIMEOUT_SECS must be a valid u64".to_string())?;
            config.request_timeout = Duration::from_secs(secs);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn restaurants_url(&self) -> String {
        format!("{}{}/restaurants/", self.base_url, self.api_prefix)
    }

    /// URL of one record. The id is percent-encoded as a single path segment.
    pub fn restaurant_url(&self, id: &str) -> Result<Url, String> {
        let mut url = Url::parse(&self.restaurants_url()).map_err(|e| e.to_string())?;
        url.path_segments_mut()
            .map_err(|()| "base_url cannot carry a path".to_string())?
            .pop_if_empty()
            .push(id);
        Ok(url)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err("base_url must start with 'http://' or 'https://'".to_string());
        }

        if self.page_size == 0 {
            return Err("page_size must be > 0".to_string());
        }

        if self.cache_capacity == 0 {
            return Err("cache_capacity must be > 0".to_string());
        }

        if self.request_timeout.is_zero() {
            return Err("request_timeout must be > 0".to_string());
        }

        Ok(())
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}
