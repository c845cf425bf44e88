use thiserror::Error;

pub mod rtu;
#[cfg(feature = "sim")]
pub mod sim;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("unable to open serial port {port}: {source}")]
    Serial {
        port: String,
        source: tokio_serial::Error,
    },

    #[error("modbus communication failure: {0}")]
    Modbus(#[from] tokio_modbus::Error),

    #[error("device answered with modbus exception: {0:?}")]
    Exception(tokio_modbus::ExceptionCode),

    #[error("no response from device within {0:?}")]
    Timeout(std::time::Duration),

    #[error("expected {expected} registers from the device, got {actual}")]
    UnexpectedLength { expected: u16, actual: usize },

    #[error("{0}")]
    Other(String),
}

/// Register level access to a single device on the bus
#[async_trait::async_trait]
pub trait RegisterTransport: Send + Sync {
    /// Read `count` contiguous holding registers starting at `start`, as signed values.
    /// On success the returned vector holds exactly `count` registers.
    async fn read_registers(
        &mut self,
        start: u16,
        count: u16,
    ) -> Result<Vec<i16>, TransportError>;
}

/// Registers travel as big-endian words; the device's values are two's complement.
pub fn to_signed(words: &[u16]) -> Vec<i16> {
    words.iter().map(|w| *w as i16).collect()
}
