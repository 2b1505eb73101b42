//! Readings - the comparable projection of one broker object.

use std::fmt;
use std::hash::{Hash, Hasher};

/// A fixed-arity projection of a broker object used as a snapshot key.
///
/// Two readings are equal only if every projected field is equal, so a state
/// flip or a counter change produces a different reading for the same object.
/// `Display` renders the fields in their fixed order, separated by spaces.
pub trait Reading: Clone + Eq + Hash + fmt::Debug + fmt::Display {
    /// The broker-side name of the object this reading was taken from.
    fn name(&self) -> &str;
}

/// A floating point rate that can be hashed and compared exactly.
///
/// The broker reports rates as JSON floats. Readings are compared by exact
/// value, so `Rate` compares the bit pattern after folding `-0.0` into `0.0`.
#[derive(Debug, Clone, Copy)]
pub struct Rate(f64);

impl Rate {
    /// Wrap a raw rate value.
    pub fn new(value: f64) -> Self {
        // -0.0 == 0.0 but their bits differ
        if value == 0.0 {
            Self(0.0)
        } else {
            Self(value)
        }
    }

    /// The underlying value.
    pub fn value(&self) -> f64 {
        self.0
    }
}

impl From<f64> for Rate {
    fn from(value: f64) -> Self {
        Rate::new(value)
    }
}

impl PartialEq for Rate {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for Rate {}

impl Hash for Rate {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

/// Renders with Rust's shortest round-trip float format, which always keeps
/// a decimal point or exponent: `0.0`, `45.6`, `12.0`, `1e16`, `1e-5`.
///
/// A rate the broker sent as a JSON integer still prints as `12.0`, since
/// only the numeric value is kept.
impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

/// Queue state as `(name, state, messages_ready, messages_unacknowledged)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueueReading {
    pub name: String,
    pub state: String,
    pub messages_ready: u64,
    pub messages_unacknowledged: u64,
}

impl QueueReading {
    pub fn new(
        name: impl Into<String>,
        state: impl Into<String>,
        messages_ready: u64,
        messages_unacknowledged: u64,
    ) -> Self {
        Self {
            name: name.into(),
            state: state.into(),
            messages_ready,
            messages_unacknowledged,
        }
    }
}

impl Reading for QueueReading {
    fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for QueueReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.name, self.state, self.messages_ready, self.messages_unacknowledged
        )
    }
}

/// Connection summary as `(name, state, send_rate, recv_rate)`.
///
/// Rates are bytes per second as reported in `send_oct_details.rate` and
/// `recv_oct_details.rate`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConnectionReading {
    pub name: String,
    pub state: String,
    pub send_rate: Rate,
    pub recv_rate: Rate,
}

impl ConnectionReading {
    pub fn new(
        name: impl Into<String>,
        state: impl Into<String>,
        send_rate: impl Into<Rate>,
        recv_rate: impl Into<Rate>,
    ) -> Self {
        Self {
            name: name.into(),
            state: state.into(),
            send_rate: send_rate.into(),
            recv_rate: recv_rate.into(),
        }
    }
}

impl Reading for ConnectionReading {
    fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for ConnectionReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.name, self.state, self.send_rate, self.recv_rate
        )
    }
}

/// Verbose connection reading: the summary plus the open channel count.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConnectionDetail {
    pub name: String,
    pub state: String,
    pub channels: u64,
    pub send_rate: Rate,
    pub recv_rate: Rate,
}

impl ConnectionDetail {
    pub fn new(
        name: impl Into<String>,
        state: impl Into<String>,
        channels: u64,
        send_rate: impl Into<Rate>,
        recv_rate: impl Into<Rate>,
    ) -> Self {
        Self {
            name: name.into(),
            state: state.into(),
            channels,
            send_rate: send_rate.into(),
            recv_rate: recv_rate.into(),
        }
    }
}

impl Reading for ConnectionDetail {
    fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for ConnectionDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {}",
            self.name, self.state, self.channels, self.send_rate, self.recv_rate
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_queue_reading_display() {
        let reading = QueueReading::new("user_rules_dataset", "running", 0, 3);
        assert_eq!(reading.to_string(), "user_rules_dataset running 0 3");
    }

    #[test]
    fn test_connection_reading_display_keeps_decimal_point() {
        let reading =
            ConnectionReading::new("127.0.0.1:41446 -> 127.0.0.1:5672", "running", 45.6, 0.0);
        assert_eq!(
            reading.to_string(),
            "127.0.0.1:41446 -> 127.0.0.1:5672 running 45.6 0.0"
        );
    }

    #[test]
    fn test_connection_detail_display() {
        let detail = ConnectionDetail::new("127.0.0.1:46162 -> 127.0.0.1:5672", "running", 2, 45.6, 0.0);
        assert_eq!(
            detail.to_string(),
            "127.0.0.1:46162 -> 127.0.0.1:5672 running 2 45.6 0.0"
        );
    }

    #[test]
    fn test_rate_negative_zero_equals_zero() {
        let mut set = HashSet::new();
        set.insert(Rate::new(0.0));
        set.insert(Rate::new(-0.0));
        assert_eq!(set.len(), 1);
        assert_eq!(Rate::new(-0.0).to_string(), "0.0");
    }

    #[test]
    fn test_rate_display_is_float_formatted() {
        assert_eq!(Rate::new(12.0).to_string(), "12.0");
        assert_eq!(Rate::new(1e16).to_string(), "1e16");
        assert_eq!(Rate::new(0.00001).to_string(), "1e-5");
    }

    #[test]
    fn test_any_field_change_changes_reading() {
        let base = QueueReading::new("jobs", "running", 0, 0);

        assert_ne!(base, QueueReading::new("jobs", "idle", 0, 0));
        assert_ne!(base, QueueReading::new("jobs", "running", 3, 0));
        assert_ne!(base, QueueReading::new("jobs", "running", 0, 1));
        assert_eq!(base, QueueReading::new("jobs", "running", 0, 0));
    }

    #[test]
    fn test_rate_change_changes_connection_reading() {
        let before = ConnectionReading::new("c1", "running", 0.0, 0.0);
        let after = ConnectionReading::new("c1", "running", 0.1, 0.0);
        assert_ne!(before, after);
        assert_eq!(before.name(), after.name());
    }
}
