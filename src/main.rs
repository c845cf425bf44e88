use std::path::PathBuf;

use anyhow::Result;
use digirail::appstate::AppState;
use digirail::config::Config;
use digirail::device::DeviceController;
use digirail::http;
use digirail::poll_task::poll_device;
use digirail::transport::RegisterTransport;
use digirail::transport::rtu::SerialBus;
use tokio::task;
use tokio::time::{self, Duration};
use tracing::*;
use tracing_subscriber::FmtSubscriber;

const RETRY_PERIOD: Duration = Duration::from_millis(500);

/// Application & Tokio executor entrypoint
#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("setting default tracing subscriber failed");

    let config = Config::load(std::env::args_os().nth(1).map(PathBuf::from))?;
    info!("Configuration: {:?}", config);

    if config.simulate {
        #[cfg(feature = "sim")]
        {
            use digirail::transport::sim::SimulatedTransport;

            let device = SimulatedTransport::digirail_2a().with_jitter(5);
            return run(move || device.clone(), &config).await;
        }
        #[cfg(not(feature = "sim"))]
        anyhow::bail!("simulation requested but built without the `sim` feature");
    }

    // Spin until the serial port can be opened
    let bus = loop {
        match SerialBus::open(&config.serial_settings()) {
            Ok(bus) => break bus,
            Err(err) => {
                error!("Unable to open modbus bus, spinning... ({err})");
                time::sleep(RETRY_PERIOD).await;
            }
        }
    };

    let address = config.address;
    run(move || bus.device(address), &config).await
}

async fn run<T, F>(transport: F, config: &Config) -> Result<()>
where
    T: RegisterTransport + 'static,
    F: Fn() -> T,
{
    // A controller only exists once the channel configuration has been read back
    let controller = loop {
        match DeviceController::connect_with(
            transport(),
            config.address,
            digirail::registers::DIGIRAIL_2A,
            config.channel_count,
        )
        .await
        {
            Ok(controller) => break controller,
            Err(err) => {
                error!(
                    "Unable to read configuration of device {}, spinning... ({err})",
                    config.address
                );
                time::sleep(RETRY_PERIOD).await;
            }
        }
    };

    let state = AppState::new(controller.summary());

    // Delegate all device communication to a separate tokio task
    let _poll_handle = task::spawn(poll_device(
        controller,
        config.poll_period(),
        state.clone(),
    ));

    let app = http::router(state);

    info!("Listening on http://{}", config.http_bind);
    let listener = tokio::net::TcpListener::bind(&config.http_bind).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
