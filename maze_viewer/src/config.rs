// config.rs - Runtime settings shared by the session, playback and service client

use std::time::Duration;

use crate::animation::SOLUTION_REVEAL_DELAY;

pub const DEFAULT_SERVICE_URL: &str = "http://127.0.0.1:5000";

#[derive(Debug, Clone)]
pub struct ViewerConfig {
    /// Base URL of the maze service, without the `/api` suffix
    pub service_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    /// Pause after each visited cell during playback
    pub step_delay: Duration,
    /// Pause between solution markers in the scene view
    pub solution_reveal_delay: Duration,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            service_url: DEFAULT_SERVICE_URL.to_string(),
            connect_timeout: Duration::from_secs(2),
            request_timeout: Duration::from_secs(10),
            step_delay: Duration::from_millis(50),
            solution_reveal_delay: SOLUTION_REVEAL_DELAY,
        }
    }
}

impl ViewerConfig {
    pub fn with_service_url(mut self, url: impl Into<String>) -> Self {
        self.service_url = url.into();
        self
    }

    pub fn with_step_delay(mut self, delay: Duration) -> Self {
        self.step_delay = delay;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_solution_reveal_delay(mut self, delay: Duration) -> Self {
        self.solution_reveal_delay = delay;
        self
    }
}
