use serde::Serialize;
use thiserror::Error;
use tracing::*;

use crate::channel::{Channel, ChannelError, Unit};
use crate::registers::{DIGIRAIL_2A, DIGIRAIL_2A_CHANNELS, RegisterBlock, RegisterMap};
use crate::transport::{RegisterTransport, TransportError};

mod poll_result;

pub use poll_result::{PollResult, output_name};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeviceError {
    #[error("no channel {channel}, device has channels 1 to {count}")]
    InvalidChannel { channel: usize, count: usize },

    #[error("channel {channel} is disabled")]
    Disabled { channel: usize },
}

/// Resolved configuration of one input, as exposed to clients
#[derive(Debug, Clone, Serialize)]
pub struct ChannelSummary {
    pub output: String,
    #[serde(flatten)]
    pub channel: Channel,
}

/// Driver for one DigiRail-2A analog input converter.
///
/// The channel configuration is read from the device once, when the controller is
/// built, and never revisited: rewiring the inputs requires a new controller.
pub struct DeviceController<T: RegisterTransport> {
    transport: T,
    address: u8,
    registers: RegisterMap,
    channels: Vec<Channel>,
}

impl<T: RegisterTransport> DeviceController<T> {
    /// Configure a DigiRail-2A reachable through `transport`
    pub async fn connect(transport: T, address: u8) -> Result<Self, TransportError> {
        Self::connect_with(transport, address, DIGIRAIL_2A, DIGIRAIL_2A_CHANNELS).await
    }

    pub async fn connect_with(
        mut transport: T,
        address: u8,
        registers: RegisterMap,
        channel_count: u16,
    ) -> Result<Self, TransportError> {
        let input_types = read_block(&mut transport, registers.input_type, channel_count).await?;
        let units = read_block(&mut transport, registers.unit, channel_count).await?;

        let channels: Vec<Channel> = input_types
            .into_iter()
            .zip(units)
            .map(|(input_type, unit)| Channel::new(input_type, unit))
            .collect();

        for (index, channel) in channels.iter().enumerate() {
            info!(
                "digirail_2a{address:03} {}: {channel}",
                output_name(index)
            );
        }

        Ok(DeviceController {
            transport,
            address,
            registers,
            channels,
        })
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    pub fn summary(&self) -> Vec<ChannelSummary> {
        self.channels
            .iter()
            .enumerate()
            .map(|(index, channel)| ChannelSummary {
                output: output_name(index),
                channel: *channel,
            })
            .collect()
    }

    /// Read all process values in a single request and convert them
    pub async fn poll(&mut self) -> Result<PollResult, TransportError> {
        let count = self.channel_count();
        let block = self.registers.process_value;
        let raw = read_block(&mut self.transport, block, count).await?;

        let values = self
            .channels
            .iter()
            .zip(raw)
            .enumerate()
            .map(|(index, (channel, raw))| {
                if let Some(measurement) = channel.measurement(raw) {
                    debug!(
                        "digirail_2a{:03} {}: {measurement} (raw {raw})",
                        self.address,
                        output_name(index)
                    );
                }
                channel.physical_value(raw)
            })
            .collect();

        Ok(PollResult::new(values))
    }

    /// Unit of the 1-based input `channel`
    pub fn input_unit(&self, channel: usize) -> Result<Unit, DeviceError> {
        self.channel(channel)?
            .unit()
            .map_err(|_: ChannelError| DeviceError::Disabled { channel })
    }

    pub fn is_enabled(&self, channel: usize) -> Result<bool, DeviceError> {
        Ok(self.channel(channel)?.enabled())
    }

    fn channel(&self, channel: usize) -> Result<&Channel, DeviceError> {
        channel
            .checked_sub(1)
            .and_then(|index| self.channels.get(index))
            .ok_or(DeviceError::InvalidChannel {
                channel,
                count: self.channels.len(),
            })
    }

    fn channel_count(&self) -> u16 {
        self.channels.len() as u16
    }
}

async fn read_block<T: RegisterTransport>(
    transport: &mut T,
    block: RegisterBlock,
    count: u16,
) -> Result<Vec<i16>, TransportError> {
    let values = transport.read_registers(block.base, count).await?;
    if values.len() != usize::from(count) {
        error!(
            "{} read @ {} returned {} registers instead of {count}",
            block.name,
            block.base,
            values.len()
        );
        return Err(TransportError::UnexpectedLength {
            expected: count,
            actual: values.len(),
        });
    }
    Ok(values)
}
