use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rand::random_range;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::registers::DIGIRAIL_2A;
use crate::transport::{RegisterTransport, TransportError};

const SIMULATED_LATENCY: Duration = Duration::from_millis(10);

#[derive(Debug, Default)]
struct SimState {
    registers: HashMap<u16, i16>,
    /// Maximum random offset added to process values on every read
    jitter: i16,
    pending_failures: usize,
    requests: Vec<(u16, u16)>,
    /// Highest channel number configured so far
    channels: u16,
}

impl SimState {
    fn is_process_value(&self, address: u16) -> bool {
        let base = DIGIRAIL_2A.process_value.base;
        address >= base && address - base < self.channels
    }
}

/// In-memory DigiRail-2A register bank.
///
/// Clones share the same bank, so a test can keep a handle to tweak registers or inject
/// faults after the transport has been handed to a controller.
#[derive(Debug, Clone, Default)]
pub struct SimulatedTransport {
    state: Arc<Mutex<SimState>>,
}

impl SimulatedTransport {
    /// Pt100 in Celsius on input 1, a voltage signal on input 2
    pub fn digirail_2a() -> Self {
        SimulatedTransport::default()
            .with_channel(1, 8, 0, 215)
            .with_channel(2, 11, 0, 5000)
    }

    /// Configure the 1-based input `channel`. Channel 0, or one whose registers would fall
    /// outside the address space, is ignored.
    pub fn with_channel(
        self,
        channel: u16,
        input_type: i16,
        unit: i16,
        process_value: i16,
    ) -> Self {
        let addresses = channel.checked_sub(1).and_then(|offset| {
            Some((
                DIGIRAIL_2A.input_type.base.checked_add(offset)?,
                DIGIRAIL_2A.unit.base.checked_add(offset)?,
                DIGIRAIL_2A.process_value.base.checked_add(offset)?,
            ))
        });
        let Some((input_type_reg, unit_reg, process_value_reg)) = addresses else {
            warn!("Ignoring simulated channel {channel}: no such input");
            return self;
        };

        self.set_register(input_type_reg, input_type);
        self.set_register(unit_reg, unit);
        self.set_register(process_value_reg, process_value);
        if let Ok(mut state) = self.state.lock() {
            state.channels = state.channels.max(channel);
        }
        self
    }

    pub fn with_jitter(self, jitter: i16) -> Self {
        if let Ok(mut state) = self.state.lock() {
            state.jitter = jitter.abs();
        }
        self
    }

    pub fn set_register(&self, address: u16, value: i16) {
        if let Ok(mut state) = self.state.lock() {
            state.registers.insert(address, value);
        }
    }

    /// Make the next `count` reads fail with a bus fault
    pub fn fail_next(&self, count: usize) {
        if let Ok(mut state) = self.state.lock() {
            state.pending_failures = count;
        }
    }

    /// Every `(start, count)` read issued so far, in order
    pub fn requests(&self) -> Vec<(u16, u16)> {
        self.state
            .lock()
            .map(|state| state.requests.clone())
            .unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl RegisterTransport for SimulatedTransport {
    async fn read_registers(
        &mut self,
        start: u16,
        count: u16,
    ) -> Result<Vec<i16>, TransportError> {
        sleep(SIMULATED_LATENCY).await;

        let mut state = self
            .state
            .lock()
            .map_err(|_| TransportError::Other("simulated register bank poisoned".into()))?;
        state.requests.push((start, count));

        if state.pending_failures > 0 {
            state.pending_failures -= 1;
            return Err(TransportError::Other("simulated bus fault".into()));
        }

        let jitter = state.jitter;
        let values = (start..start.saturating_add(count))
            .map(|address| {
                let value = state.registers.get(&address).copied().unwrap_or(0);
                if jitter > 0 && state.is_process_value(address) {
                    value.saturating_add(random_range(-jitter..=jitter))
                } else {
                    value
                }
            })
            .collect::<Vec<_>>();

        info!("Simulated device read @ {start}: {:?}", values);
        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn channel_zero_is_ignored() {
        let mut sim = SimulatedTransport::default()
            .with_channel(0, 1, 0, 1)
            .with_channel(u16::MAX, 1, 0, 1);

        let values = sim.read_registers(DIGIRAIL_2A.input_type.base, 2).await.unwrap();

        assert_eq!(values, vec![0, 0]);
    }

    #[test]
    fn every_configured_channel_is_a_process_value() {
        let sim = SimulatedTransport::digirail_2a().with_channel(3, 12, 0, 1000);
        let state = sim.state.lock().unwrap();
        let base = DIGIRAIL_2A.process_value.base;

        assert!(state.is_process_value(base));
        assert!(state.is_process_value(base + 2));
        assert!(!state.is_process_value(base + 3));
        assert!(!state.is_process_value(DIGIRAIL_2A.input_type.base));
        assert!(!state.is_process_value(base - 1));
    }

    #[tokio::test]
    async fn jitter_stays_within_bounds_on_extra_channels() {
        let mut sim = SimulatedTransport::digirail_2a()
            .with_channel(3, 12, 0, 1000)
            .with_jitter(5);
        let base = DIGIRAIL_2A.process_value.base;

        for _ in 0..10 {
            let values = sim.read_registers(base, 3).await.unwrap();
            assert!((995..=1005).contains(&values[2]));
        }
        let config = sim.read_registers(DIGIRAIL_2A.input_type.base, 3).await.unwrap();
        assert_eq!(config, vec![8, 11, 12]);
    }
}
