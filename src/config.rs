use dotenvy::dotenv;
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Capacity of each connection's outbound event queue. A full queue
    /// drops events instead of blocking the router.
    pub outbound_queue_capacity: usize,
    /// Number of trailing messages handed to the summarizer collaborator.
    pub summary_window: usize,
    /// Minimum history length before a summary request is accepted.
    pub summary_min_messages: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, crate::error::AppError> {
        dotenv().ok();
        let port = env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3000);
        let outbound_queue_capacity = env::var("WS_OUTBOUND_QUEUE_CAPACITY")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(64);
        if outbound_queue_capacity == 0 {
            return Err(crate::error::AppError::Config(
                "WS_OUTBOUND_QUEUE_CAPACITY must be at least 1".into(),
            ));
        }
        let summary_window = env::var("SUMMARY_WINDOW")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(30);
        let summary_min_messages = env::var("SUMMARY_MIN_MESSAGES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(5);

        Ok(Self {
            port,
            outbound_queue_capacity,
            summary_window,
            summary_min_messages,
        })
    }

    pub fn test_defaults() -> Self {
        Self {
            port: 3000,
            outbound_queue_capacity: 64,
            summary_window: 30,
            summary_min_messages: 5,
        }
    }
}
