//! Exact-type converters for identifiers, temporal values and decimals

use std::fmt::Display;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use rust_decimal::Decimal;
use tracedoc_core::{MasterKey, RecordKey, Result, StorageId, Value};
use uuid::Uuid;

use super::Encodable;

// ============================================================================
// Identifiers
// ============================================================================

impl Encodable for Uuid {
    fn encode(&self) -> Result<Value> {
        Ok(Value::String(self.hyphenated().to_string()))
    }
}

macro_rules! encodable_id {
    ($($ty:ty),*) => {
        $(
            impl Encodable for $ty {
                fn encode(&self) -> Result<Value> {
                    self.as_uuid().encode()
                }
            }
        )*
    };
}

encodable_id!(MasterKey, RecordKey, StorageId);

// ============================================================================
// Temporal values (ISO-8601)
// ============================================================================

impl<Tz> Encodable for DateTime<Tz>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    fn encode(&self) -> Result<Value> {
        Ok(Value::String(self.to_rfc3339()))
    }
}

impl Encodable for NaiveDateTime {
    fn encode(&self) -> Result<Value> {
        Ok(Value::String(self.format("%Y-%m-%dT%H:%M:%S%.f").to_string()))
    }
}

impl Encodable for NaiveDate {
    fn encode(&self) -> Result<Value> {
        Ok(Value::String(self.format("%Y-%m-%d").to_string()))
    }
}

impl Encodable for NaiveTime {
    fn encode(&self) -> Result<Value> {
        Ok(Value::String(self.format("%H:%M:%S%.f").to_string()))
    }
}

// ============================================================================
// Fixed-precision decimals
// ============================================================================

/// Decimals keep their scale: `1.50` stays `"1.50"`, never a binary float.
impl Encodable for Decimal {
    fn encode(&self) -> Result<Value> {
        Ok(Value::String(self.to_string()))
    }
}
