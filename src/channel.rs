use serde::Serialize;
use std::fmt;
use thiserror::Error;
use uom::si::{
    electric_current::milliampere,
    electric_potential::volt,
    f64::{ElectricCurrent, ElectricPotential, ThermodynamicTemperature},
    thermodynamic_temperature::{degree_celsius, degree_fahrenheit},
};

/// Raw input type code reported by the device for a switched-off input
pub const INPUT_DISABLED: i16 = -1;

/// Physical quantity measured by an analog input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Category {
    Temperature,
    Voltage,
    Current,
    Disabled,
}

impl Category {
    /// Bucket a raw input type code. Codes outside the documented ranges are
    /// treated as an unprovisioned input.
    pub fn from_input_type(code: i16) -> Self {
        match code {
            0..=8 => Self::Temperature,
            9..=17 => Self::Voltage,
            18..=19 => Self::Current,
            _ => Self::Disabled,
        }
    }

    /// Divisor turning a raw register value into the category's unit
    pub fn scale_divisor(&self) -> Option<f64> {
        match self {
            Self::Temperature => Some(10.0),
            Self::Voltage => Some(1000.0),
            Self::Current => Some(1.0),
            Self::Disabled => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Unit {
    #[serde(rename = "degC")]
    DegreeCelsius,
    #[serde(rename = "degF")]
    DegreeFahrenheit,
    #[serde(rename = "V")]
    Volt,
    #[serde(rename = "mA")]
    Milliampere,
}

impl Unit {
    pub fn label(&self) -> &'static str {
        match self {
            Self::DegreeCelsius => "degC",
            Self::DegreeFahrenheit => "degF",
            Self::Volt => "V",
            Self::Milliampere => "mA",
        }
    }

    /// Temperature unit from the unit register. Anything but 1 reads as Celsius,
    /// the factory setting.
    fn temperature(unit_code: i16) -> Self {
        match unit_code {
            1 => Self::DegreeFahrenheit,
            _ => Self::DegreeCelsius,
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelError {
    #[error("channel is disabled and has no unit")]
    Disabled,
}

/// A reading carrying its physical dimension
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Measurement {
    /// Temperature along with the unit the channel is configured to report in
    Temperature(ThermodynamicTemperature, Unit),
    Voltage(ElectricPotential),
    Current(ElectricCurrent),
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Temperature(t, Unit::DegreeFahrenheit) => {
                write!(f, "{:.1} degF", t.get::<degree_fahrenheit>())
            }
            Self::Temperature(t, _) => write!(f, "{:.1} degC", t.get::<degree_celsius>()),
            Self::Voltage(v) => write!(f, "{:.3} V", v.get::<volt>()),
            Self::Current(i) => write!(f, "{:.3} mA", i.get::<milliampere>()),
        }
    }
}

/// Configuration of one analog input, as read back from the device.
///
/// Everything derived here (category, unit, scale) is a pure function of the two
/// raw codes, so a `Channel` never changes once built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Channel {
    input_type: i16,
    unit_code: i16,
    category: Category,
    unit: Option<Unit>,
}

impl Channel {
    pub fn new(input_type: i16, unit_code: i16) -> Self {
        let category = Category::from_input_type(input_type);
        let unit = match category {
            Category::Temperature => Some(Unit::temperature(unit_code)),
            Category::Voltage => Some(Unit::Volt),
            Category::Current => Some(Unit::Milliampere),
            Category::Disabled => None,
        };

        Self {
            input_type,
            unit_code,
            category,
            unit,
        }
    }

    pub fn input_type(&self) -> i16 {
        self.input_type
    }

    pub fn unit_code(&self) -> i16 {
        self.unit_code
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn enabled(&self) -> bool {
        self.category != Category::Disabled
    }

    pub fn unit(&self) -> Result<Unit, ChannelError> {
        self.unit.ok_or(ChannelError::Disabled)
    }

    /// Convert a raw process value register into the channel's unit.
    /// A disabled channel yields `None`, never a number.
    pub fn physical_value(&self, raw: i16) -> Option<f64> {
        self.category
            .scale_divisor()
            .map(|divisor| f64::from(raw) / divisor)
    }

    pub fn measurement(&self, raw: i16) -> Option<Measurement> {
        let value = self.physical_value(raw)?;
        let unit = self.unit?;

        Some(match unit {
            Unit::DegreeCelsius => Measurement::Temperature(
                ThermodynamicTemperature::new::<degree_celsius>(value),
                unit,
            ),
            Unit::DegreeFahrenheit => Measurement::Temperature(
                ThermodynamicTemperature::new::<degree_fahrenheit>(value),
                unit,
            ),
            Unit::Volt => Measurement::Voltage(ElectricPotential::new::<volt>(value)),
            Unit::Milliampere => {
                Measurement::Current(ElectricCurrent::new::<milliampere>(value))
            }
        })
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.unit {
            Some(unit) => write!(
                f,
                "{:?} [{}] (type={}, unit={})",
                self.category, unit, self.input_type, self.unit_code
            ),
            None => write!(f, "Disabled (type={})", self.input_type),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_types_bucket_into_categories() {
        for code in 0..=8 {
            assert_eq!(Category::from_input_type(code), Category::Temperature);
        }
        for code in 9..=17 {
            assert_eq!(Category::from_input_type(code), Category::Voltage);
        }
        for code in 18..=19 {
            assert_eq!(Category::from_input_type(code), Category::Current);
        }
        for code in [INPUT_DISABLED, -2, 20, 100, i16::MIN, i16::MAX] {
            assert_eq!(Category::from_input_type(code), Category::Disabled);
        }
    }

    #[test]
    fn units_follow_category() {
        assert_eq!(Channel::new(0, 0).unit(), Ok(Unit::DegreeCelsius));
        assert_eq!(Channel::new(8, 1).unit(), Ok(Unit::DegreeFahrenheit));
        assert_eq!(Channel::new(9, 1).unit(), Ok(Unit::Volt));
        assert_eq!(Channel::new(19, 1).unit(), Ok(Unit::Milliampere));
        assert_eq!(Channel::new(0, 0).unit().unwrap().to_string(), "degC");
        assert_eq!(Channel::new(3, 1).unit().unwrap().to_string(), "degF");
    }

    #[test]
    fn unknown_temperature_unit_reads_as_celsius() {
        assert_eq!(Channel::new(2, 7).unit(), Ok(Unit::DegreeCelsius));
    }

    #[test]
    fn disabled_channel_has_no_unit_or_value() {
        let channel = Channel::new(INPUT_DISABLED, 0);
        assert!(!channel.enabled());
        assert_eq!(channel.unit(), Err(ChannelError::Disabled));
        assert_eq!(channel.physical_value(0), None);
        assert_eq!(channel.physical_value(1234), None);
        assert_eq!(channel.measurement(1234), None);
    }

    #[test]
    fn physical_values_are_scaled_per_category() {
        assert_eq!(Channel::new(1, 0).physical_value(250), Some(25.0));
        assert_eq!(Channel::new(1, 0).physical_value(-105), Some(-10.5));
        assert_eq!(Channel::new(10, 0).physical_value(12000), Some(12.0));
        assert_eq!(Channel::new(18, 0).physical_value(20), Some(20.0));
    }

    #[test]
    fn measurements_carry_their_dimension() {
        match Channel::new(3, 1).measurement(770) {
            Some(Measurement::Temperature(t, Unit::DegreeFahrenheit)) => {
                assert!((t.get::<degree_celsius>() - 25.0).abs() < 1e-9)
            }
            other => panic!("expected a temperature, got {other:?}"),
        }
        assert_eq!(
            Channel::new(19, 0).measurement(4),
            Some(Measurement::Current(ElectricCurrent::new::<milliampere>(4.0)))
        );
        assert_eq!(
            Channel::new(11, 0).measurement(5000).map(|m| m.to_string()),
            Some("5.000 V".to_string())
        );
    }

    #[test]
    fn temperatures_display_in_the_configured_unit() {
        assert_eq!(
            Channel::new(3, 1).measurement(770).map(|m| m.to_string()),
            Some("77.0 degF".to_string())
        );
        assert_eq!(
            Channel::new(3, 0).measurement(-105).map(|m| m.to_string()),
            Some("-10.5 degC".to_string())
        );
    }

    #[test]
    fn raw_codes_are_kept() {
        let channel = Channel::new(12, 1);
        assert_eq!(channel.input_type(), 12);
        assert_eq!(channel.unit_code(), 1);
        assert_eq!(channel.unit(), Ok(Unit::Volt));

        let disabled = Channel::new(INPUT_DISABLED, 0);
        assert_eq!(disabled.input_type(), INPUT_DISABLED);
        assert_eq!(disabled.unit_code(), 0);
    }
}
