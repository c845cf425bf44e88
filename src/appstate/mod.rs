use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::device::{ChannelSummary, PollResult};

/// Calibrated readings of one successful poll
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub time: DateTime<Utc>,
    pub address: u8,
    pub readings: PollResult,
}

/// All shared state between the poll task and http
#[derive(Debug, Default, Clone)]
pub struct AppState {
    /// Latest report from the device, `None` until the first poll succeeds
    pub report: Arc<Mutex<Option<Report>>>,
    /// Channel configuration resolved at startup
    pub channels: Arc<Vec<ChannelSummary>>,
}

impl AppState {
    pub fn new(channels: Vec<ChannelSummary>) -> Self {
        Self {
            report: Arc::new(Mutex::new(None)),
            channels: Arc::new(channels),
        }
    }
}
