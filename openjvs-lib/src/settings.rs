use std::time::Duration;

/// Knobs for one bus session. The defaults match the common USB-RS485
/// adapter setup: 115200 baud 8N1 with a generous per-byte read timeout.
#[derive(Clone, Debug)]
pub struct BusSettings {
    pub baud_rate: u32,
    pub read_timeout: Duration,
    /// Skip the sense-line procedure and assume this many chained devices.
    pub assume_devices: Option<u8>,
}

impl Default for BusSettings {
    fn default() -> Self {
        Self {
            baud_rate: 115_200,
            read_timeout: Duration::from_secs(5),
            assume_devices: None,
        }
    }
}
