use serde::ser::{Serialize, SerializeMap, Serializer};

/// Name of the output carrying the reading of the channel at `index` (0-based)
pub fn output_name(index: usize) -> String {
    format!("in{}", index + 1)
}

/// Calibrated readings of one poll cycle, in channel order.
///
/// Consumers address readings by output name (`in1`, `in2`, ...). A disabled channel
/// holds `None` and serializes as `null`.
#[derive(Debug, Clone, PartialEq)]
pub struct PollResult {
    values: Vec<Option<f64>>,
}

impl PollResult {
    pub fn new(values: Vec<Option<f64>>) -> Self {
        Self { values }
    }

    pub fn in1(&self) -> Option<f64> {
        self.values.first().copied().flatten()
    }

    pub fn in2(&self) -> Option<f64> {
        self.values.get(1).copied().flatten()
    }

    /// Reading for the output called `name`. The outer `None` means no such output.
    pub fn get(&self, name: &str) -> Option<Option<f64>> {
        let index = name
            .strip_prefix("in")?
            .parse::<usize>()
            .ok()?
            .checked_sub(1)?;
        self.values.get(index).copied()
    }

    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (String, Option<f64>)> + '_ {
        self.values
            .iter()
            .enumerate()
            .map(|(index, value)| (output_name(index), *value))
    }
}

impl Serialize for PollResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (name, value) in self.iter() {
            map.serialize_entry(&name, &value)?;
        }
        map.end()
    }
}
