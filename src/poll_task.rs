use tokio::time::{self, Duration, MissedTickBehavior};
use tracing::*;

use crate::appstate::{AppState, Report};
use crate::device::DeviceController;
use crate::transport::RegisterTransport;

/// Poll the device every `period` and expose the readings through `state`.
///
/// A failed poll is logged and the previous report is kept; the next tick is the retry.
pub async fn poll_device<T: RegisterTransport>(
    mut controller: DeviceController<T>,
    period: Duration,
    state: AppState,
) {
    let mut ticker = time::interval(period);
    // A slow bus must not cause a burst of catch-up polls
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        poll_once(&mut controller, &state).await;
    }
}

/// Run a single poll cycle, returning whether it produced a report
pub async fn poll_once<T: RegisterTransport>(
    controller: &mut DeviceController<T>,
    state: &AppState,
) -> bool {
    match controller.poll().await {
        Ok(readings) => {
            info!(
                "digirail_2a{:03} readings: {:?}",
                controller.address(),
                readings.iter().collect::<Vec<_>>()
            );
            let report = Report {
                time: chrono::Utc::now(),
                address: controller.address(),
                readings,
            };

            match state.report.lock() {
                Ok(mut latest) => {
                    *latest = Some(report);
                    true
                }
                Err(err) => {
                    error!("Unable to lock the report mutex: {err}");
                    false
                }
            }
        }
        Err(err) => {
            error!("digirail_2a{:03} poll failed: {err}", controller.address());
            false
        }
    }
}
