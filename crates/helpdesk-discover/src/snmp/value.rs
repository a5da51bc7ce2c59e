//! OIDs and values as the signature fetch sees them, independent of the wire client.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Oid(Vec<u32>);

impl Oid {
    pub fn new(arcs: &[u32]) -> Self {
        Self(arcs.to_vec())
    }

    pub fn arcs(&self) -> &[u32] {
        &self.0
    }

    pub(crate) fn to_wire(&self) -> async_snmp::Oid {
        async_snmp::Oid::from_slice(&self.0)
    }
}

impl fmt::Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut arcs = self.0.iter();
        if let Some(first) = arcs.next() {
            write!(f, "{first}")?;
        }
        for arc in arcs {
            write!(f, ".{arc}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnmpValue {
    Integer(i64),
    OctetString(Vec<u8>),
    Null,
    Counter32(u32),
    Gauge32(u32),
    TimeTicks(u32),
    Counter64(u64),
    NoSuchObject,
    NoSuchInstance,
    EndOfMibView,
}

impl SnmpValue {
    /// Map a value received from an agent. Types the signature never reads
    /// numerically are kept in their printed form.
    pub(crate) fn from_wire(value: &async_snmp::Value) -> Self {
        use async_snmp::Value;

        match value {
            Value::Integer(v) => Self::Integer(i64::from(*v)),
            Value::OctetString(bytes) => Self::OctetString(bytes.to_vec()),
            Value::Null => Self::Null,
            Value::Counter32(v) => Self::Counter32(*v),
            Value::Gauge32(v) => Self::Gauge32(*v),
            Value::TimeTicks(v) => Self::TimeTicks(*v),
            Value::Counter64(v) => Self::Counter64(*v),
            Value::NoSuchObject => Self::NoSuchObject,
            Value::NoSuchInstance => Self::NoSuchInstance,
            Value::EndOfMibView => Self::EndOfMibView,
            other => Self::OctetString(other.to_string().into_bytes()),
        }
    }

    /// True for the v2 exception markers an agent puts in place of a value.
    pub fn is_exception(&self) -> bool {
        matches!(
            self,
            Self::NoSuchObject | Self::NoSuchInstance | Self::EndOfMibView
        )
    }

    /// Text form used for device signature fields. `None` for values that
    /// carry no data.
    pub fn render(&self) -> Option<String> {
        match self {
            Self::Integer(v) => Some(v.to_string()),
            Self::OctetString(bytes) => Some(String::from_utf8_lossy(bytes).into_owned()),
            Self::Counter32(v) | Self::Gauge32(v) => Some(v.to_string()),
            Self::TimeTicks(t) => Some(format_timeticks(*t)),
            Self::Counter64(v) => Some(v.to_string()),
            Self::Null | Self::NoSuchObject | Self::NoSuchInstance | Self::EndOfMibView => None,
        }
    }

    /// Numeric value as `u32`, when it has one that fits.
    pub fn as_u32(&self) -> Option<u32> {
        match self {
            Self::Integer(v) => u32::try_from(*v).ok(),
            Self::Counter32(v) | Self::Gauge32(v) | Self::TimeTicks(v) => Some(*v),
            Self::Counter64(v) => u32::try_from(*v).ok(),
            _ => None,
        }
    }
}

impl fmt::Display for SnmpValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoSuchObject => f.write_str("noSuchObject"),
            Self::NoSuchInstance => f.write_str("noSuchInstance"),
            Self::EndOfMibView => f.write_str("endOfMibView"),
            Self::Null => f.write_str("null"),
            other => f.write_str(&other.render().unwrap_or_default()),
        }
    }
}

/// Format hundredths of a second as `[N day(s), ]H:MM:SS.cc`.
pub fn format_timeticks(ticks: u32) -> String {
    let days = ticks / 8_640_000;
    let hours = (ticks / 360_000) % 24;
    let minutes = (ticks / 6_000) % 60;
    let seconds = (ticks / 100) % 60;
    let hundredths = ticks % 100;
    let prefix = match days {
        0 => String::new(),
        1 => "1 day, ".to_string(),
        n => format!("{n} days, "),
    };
    format!("{prefix}{hours}:{minutes:02}:{seconds:02}.{hundredths:02}")
}
