/// A contiguous block of holding registers, one register per channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterBlock {
    pub name: &'static str,
    pub base: u16,
}

/// Holding register layout of the DigiRail-2A
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterMap {
    /// Live measured value per channel
    pub process_value: RegisterBlock,
    /// Configured sensor / signal type per channel, -1 when the input is off
    pub input_type: RegisterBlock,
    /// Temperature unit per channel (0: Celsius, 1: Fahrenheit)
    pub unit: RegisterBlock,
}

pub const DIGIRAIL_2A: RegisterMap = RegisterMap {
    process_value: RegisterBlock {
        name: "process_value",
        base: 14,
    },
    input_type: RegisterBlock {
        name: "input_type",
        base: 21,
    },
    unit: RegisterBlock {
        name: "unit",
        base: 26,
    },
};

/// Number of analog inputs on the DigiRail-2A
pub const DIGIRAIL_2A_CHANNELS: u16 = 2;
