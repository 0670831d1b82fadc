use std::fmt;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.apify.com";

/// Connection details for the remote task API.
#[derive(Clone)]
pub struct ApiSettings {
    pub base_url: String,
    /// Bearer token; never logged.
    pub token: String,
    /// Actor task started by each search.
    pub task_id: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl ApiSettings {
    pub fn new(token: impl Into<String>, task_id: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            token: token.into(),
            task_id: task_id.into(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl fmt::Debug for ApiSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiSettings")
            .field("base_url", &self.base_url)
            .field("token", &scout_logging::redact(&self.token))
            .field("task_id", &self.task_id)
            .field("connect_timeout", &self.connect_timeout)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::ApiSettings;

    #[test]
    fn debug_output_hides_token() {
        let settings = ApiSettings::new("secret-token", "task");
        let shown = format!("{settings:?}");
        assert!(!shown.contains("secret-token"));
        assert!(shown.contains("task"));
    }
}
