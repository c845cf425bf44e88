use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Serialize, Debug)]
pub struct HeartbeatMessage {
    status: &'static str,
    timestamp: DateTime<Utc>,
    /// Time of the latest successful poll
    last_poll: Option<DateTime<Utc>>,
}

impl HeartbeatMessage {
    pub fn new(last_poll: Option<DateTime<Utc>>) -> Self {
        Self {
            status: "alive",
            timestamp: Utc::now(),
            last_poll,
        }
    }
}
