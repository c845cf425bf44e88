use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::timeout;
use tokio_modbus::client::{Context, rtu};
use tokio_modbus::prelude::{Reader, Slave, SlaveContext};
use tokio_serial::{DataBits, FlowControl, Parity, SerialPortBuilderExt, StopBits};
use tracing::*;

use crate::transport::{RegisterTransport, TransportError, to_signed};

/// Factory line settings of the DigiRail-2A
pub const DEFAULT_BAUD_RATE: u32 = 19200;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone)]
pub struct SerialSettings {
    pub port: String,
    pub baud_rate: u32,
    /// Upper bound for one request/response round trip
    pub timeout: Duration,
}

/// One RS485 line shared by every device attached to it.
///
/// Requests from all `RtuTransport`s handed out by the same bus are serialized by the
/// context lock, so a configuration read and a data read never interleave on the wire.
#[derive(Clone)]
pub struct SerialBus {
    ctx: Arc<Mutex<Context>>,
    timeout: Duration,
}

impl SerialBus {
    /// Open the serial port (8 data bits, even parity, 1 stop bit) and attach a Modbus RTU client
    pub fn open(settings: &SerialSettings) -> Result<Self, TransportError> {
        info!(
            "Opening modbus RTU bus on {} @ {} baud",
            settings.port, settings.baud_rate
        );

        let port = tokio_serial::new(settings.port.clone(), settings.baud_rate)
            .flow_control(FlowControl::None)
            .data_bits(DataBits::Eight)
            .parity(Parity::Even)
            .stop_bits(StopBits::One)
            .open_native_async()
            .map_err(|source| TransportError::Serial {
                port: settings.port.clone(),
                source,
            })?;

        // The slave id is selected per request
        let ctx = rtu::attach_slave(port, Slave::broadcast());

        Ok(SerialBus {
            ctx: Arc::new(Mutex::new(ctx)),
            timeout: settings.timeout,
        })
    }

    /// Transport addressing the device with the given slave id on this bus
    pub fn device(&self, address: u8) -> RtuTransport {
        RtuTransport {
            bus: self.clone(),
            slave: Slave(address),
        }
    }
}

pub struct RtuTransport {
    bus: SerialBus,
    slave: Slave,
}

#[async_trait::async_trait]
impl RegisterTransport for RtuTransport {
    async fn read_registers(
        &mut self,
        start: u16,
        count: u16,
    ) -> Result<Vec<i16>, TransportError> {
        let mut ctx = self.bus.ctx.lock().await;
        ctx.set_slave(self.slave);

        debug!(
            "Reading {count} holding registers @ {start} from slave {}",
            self.slave.0
        );
        let response = timeout(self.bus.timeout, ctx.read_holding_registers(start, count))
            .await
            .map_err(|_| TransportError::Timeout(self.bus.timeout))?;
        let words = response?.map_err(TransportError::Exception)?;

        if words.len() != usize::from(count) {
            return Err(TransportError::UnexpectedLength {
                expected: count,
                actual: words.len(),
            });
        }

        Ok(to_signed(&words))
    }
}
