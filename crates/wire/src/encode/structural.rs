//! Structural fallback: encode any serde-serializable record
//!
//! Types that have no dedicated [`Encodable`] impl can still be encoded by
//! walking their declared fields through `serde::Serialize`. Records become
//! mappings, sequences become arrays, `None` becomes null. Values with no
//! structure at all (`()`, unit structs, structs without fields) have
//! nothing to encode and fail with [`Error::UnencodableType`].
//!
//! Enum variants follow serde's external tagging: a unit variant is its
//! name, a data-carrying variant is `{variant: data}`. Enumerations whose
//! members should encode as a scalar implement
//! [`Enumeration`](super::Enumeration) instead.

use std::collections::HashMap;
use std::fmt;

use serde::ser::{self, Serialize};
use tracedoc_core::{Error, Result, Value};

use super::bytes::decode_utf8;
use super::Encodable;

/// Opt a serde-serializable value into structural encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Structural<T>(pub T);

impl<T: Serialize> Encodable for Structural<T> {
    fn encode(&self) -> Result<Value> {
        encode_structural(&self.0)
    }
}

/// Encode a value by walking its serde representation
pub fn encode_structural<T: Serialize + ?Sized>(value: &T) -> Result<Value> {
    value
        .serialize(ValueSerializer {
            type_name: std::any::type_name::<T>(),
        })
        .map_err(|e| e.0)
}

// serde needs an error type implementing `ser::Error`; this wraps the
// shared taxonomy for the duration of one walk.
#[derive(Debug)]
struct WalkError(Error);

impl fmt::Display for WalkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl std::error::Error for WalkError {}

impl ser::Error for WalkError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        WalkError(Error::invalid_payload("structural", msg.to_string()))
    }
}

impl From<Error> for WalkError {
    fn from(e: Error) -> Self {
        WalkError(e)
    }
}

type WalkResult<T> = std::result::Result<T, WalkError>;

fn walk<T: Serialize + ?Sized>(value: &T) -> WalkResult<Value> {
    value.serialize(ValueSerializer {
        type_name: std::any::type_name::<T>(),
    })
}

fn checked_int<N>(n: N, type_name: &'static str) -> WalkResult<Value>
where
    N: Copy + fmt::Display,
    i64: TryFrom<N>,
{
    i64::try_from(n).map(Value::Int).map_err(|_| {
        WalkError(Error::invalid_payload(
            type_name,
            format!("{} does not fit in a 64-bit signed integer", n),
        ))
    })
}

fn tagged(variant: &'static str, value: Value) -> Value {
    let mut object = HashMap::with_capacity(1);
    object.insert(variant.to_string(), value);
    Value::Object(object)
}

struct ValueSerializer {
    type_name: &'static str,
}

impl ser::Serializer for ValueSerializer {
    type Ok = Value;
    type Error = WalkError;

    type SerializeSeq = SeqWalker;
    type SerializeTuple = SeqWalker;
    type SerializeTupleStruct = SeqWalker;
    type SerializeTupleVariant = SeqWalker;
    type SerializeMap = MapWalker;
    type SerializeStruct = StructWalker;
    type SerializeStructVariant = StructWalker;

    fn serialize_bool(self, v: bool) -> WalkResult<Value> {
        Ok(Value::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> WalkResult<Value> {
        Ok(Value::Int(i64::from(v)))
    }

    fn serialize_i16(self, v: i16) -> WalkResult<Value> {
        Ok(Value::Int(i64::from(v)))
    }

    fn serialize_i32(self, v: i32) -> WalkResult<Value> {
        Ok(Value::Int(i64::from(v)))
    }

    fn serialize_i64(self, v: i64) -> WalkResult<Value> {
        Ok(Value::Int(v))
    }

    fn serialize_i128(self, v: i128) -> WalkResult<Value> {
        checked_int(v, "i128")
    }

    fn serialize_u8(self, v: u8) -> WalkResult<Value> {
        Ok(Value::Int(i64::from(v)))
    }

    fn serialize_u16(self, v: u16) -> WalkResult<Value> {
        Ok(Value::Int(i64::from(v)))
    }

    fn serialize_u32(self, v: u32) -> WalkResult<Value> {
        Ok(Value::Int(i64::from(v)))
    }

    fn serialize_u64(self, v: u64) -> WalkResult<Value> {
        checked_int(v, "u64")
    }

    fn serialize_u128(self, v: u128) -> WalkResult<Value> {
        checked_int(v, "u128")
    }

    fn serialize_f32(self, v: f32) -> WalkResult<Value> {
        Ok(Value::Float(f64::from(v)))
    }

    fn serialize_f64(self, v: f64) -> WalkResult<Value> {
        Ok(Value::Float(v))
    }

    fn serialize_char(self, v: char) -> WalkResult<Value> {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> WalkResult<Value> {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_bytes(self, v: &[u8]) -> WalkResult<Value> {
        Ok(Value::String(decode_utf8(v)?))
    }

    fn serialize_none(self) -> WalkResult<Value> {
        Ok(Value::Null)
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> WalkResult<Value> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> WalkResult<Value> {
        Err(WalkError(Error::unencodable(self.type_name)))
    }

    fn serialize_unit_struct(self, name: &'static str) -> WalkResult<Value> {
        Err(WalkError(Error::unencodable(name)))
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
    ) -> WalkResult<Value> {
        Ok(Value::String(variant.to_string()))
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        value: &T,
    ) -> WalkResult<Value> {
        walk(value)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
        value: &T,
    ) -> WalkResult<Value> {
        Ok(tagged(variant, walk(value)?))
    }

    fn serialize_seq(self, len: Option<usize>) -> WalkResult<SeqWalker> {
        Ok(SeqWalker::new(None, len.unwrap_or(0)))
    }

    fn serialize_tuple(self, len: usize) -> WalkResult<SeqWalker> {
        Ok(SeqWalker::new(None, len))
    }

    fn serialize_tuple_struct(self, _name: &'static str, len: usize) -> WalkResult<SeqWalker> {
        Ok(SeqWalker::new(None, len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
        len: usize,
    ) -> WalkResult<SeqWalker> {
        Ok(SeqWalker::new(Some(variant), len))
    }

    fn serialize_map(self, len: Option<usize>) -> WalkResult<MapWalker> {
        Ok(MapWalker {
            object: HashMap::with_capacity(len.unwrap_or(0)),
            pending_key: None,
        })
    }

    fn serialize_struct(self, name: &'static str, len: usize) -> WalkResult<StructWalker> {
        Ok(StructWalker::new(name, None, len))
    }

    fn serialize_struct_variant(
        self,
        name: &'static str,
        _index: u32,
        variant: &'static str,
        len: usize,
    ) -> WalkResult<StructWalker> {
        Ok(StructWalker::new(name, Some(variant), len))
    }
}

// ============================================================================
// Compound walkers
// ============================================================================

struct SeqWalker {
    variant: Option<&'static str>,
    items: Vec<Value>,
}

impl SeqWalker {
    fn new(variant: Option<&'static str>, len: usize) -> Self {
        SeqWalker {
            variant,
            items: Vec::with_capacity(len),
        }
    }

    fn push<T: Serialize + ?Sized>(&mut self, value: &T) -> WalkResult<()> {
        self.items.push(walk(value)?);
        Ok(())
    }

    fn finish(self) -> Value {
        let array = Value::Array(self.items);
        match self.variant {
            Some(variant) => tagged(variant, array),
            None => array,
        }
    }
}

impl ser::SerializeSeq for SeqWalker {
    type Ok = Value;
    type Error = WalkError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> WalkResult<()> {
        self.push(value)
    }

    fn end(self) -> WalkResult<Value> {
        Ok(self.finish())
    }
}

impl ser::SerializeTuple for SeqWalker {
    type Ok = Value;
    type Error = WalkError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> WalkResult<()> {
        self.push(value)
    }

    fn end(self) -> WalkResult<Value> {
        Ok(self.finish())
    }
}

impl ser::SerializeTupleStruct for SeqWalker {
    type Ok = Value;
    type Error = WalkError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> WalkResult<()> {
        self.push(value)
    }

    fn end(self) -> WalkResult<Value> {
        Ok(self.finish())
    }
}

impl ser::SerializeTupleVariant for SeqWalker {
    type Ok = Value;
    type Error = WalkError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> WalkResult<()> {
        self.push(value)
    }

    fn end(self) -> WalkResult<Value> {
        Ok(self.finish())
    }
}

struct MapWalker {
    object: HashMap<String, Value>,
    pending_key: Option<String>,
}

impl ser::SerializeMap for MapWalker {
    type Ok = Value;
    type Error = WalkError;

    fn serialize_key<T: Serialize + ?Sized>(&mut self, key: &T) -> WalkResult<()> {
        let key = match walk(key)? {
            Value::String(s) => s,
            Value::Int(i) => i.to_string(),
            Value::Bool(b) => b.to_string(),
            other => {
                return Err(WalkError(Error::invalid_payload(
                    "map key",
                    format!("{} keys are not supported", other.type_name()),
                )))
            }
        };
        self.pending_key = Some(key);
        Ok(())
    }

    fn serialize_value<T: Serialize + ?Sized>(&mut self, value: &T) -> WalkResult<()> {
        let key = self.pending_key.take().ok_or_else(|| {
            WalkError(Error::invalid_payload("map", "value serialized before its key"))
        })?;
        self.object.insert(key, walk(value)?);
        Ok(())
    }

    fn end(self) -> WalkResult<Value> {
        Ok(Value::Object(self.object))
    }
}

struct StructWalker {
    name: &'static str,
    variant: Option<&'static str>,
    object: HashMap<String, Value>,
}

impl StructWalker {
    fn new(name: &'static str, variant: Option<&'static str>, len: usize) -> Self {
        StructWalker {
            name,
            variant,
            object: HashMap::with_capacity(len),
        }
    }

    fn field<T: Serialize + ?Sized>(&mut self, key: &'static str, value: &T) -> WalkResult<()> {
        self.object.insert(key.to_string(), walk(value)?);
        Ok(())
    }

    fn finish(self) -> WalkResult<Value> {
        match self.variant {
            Some(variant) => Ok(tagged(variant, Value::Object(self.object))),
            None if self.object.is_empty() => Err(WalkError(Error::unencodable(self.name))),
            None => Ok(Value::Object(self.object)),
        }
    }
}

impl ser::SerializeStruct for StructWalker {
    type Ok = Value;
    type Error = WalkError;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> WalkResult<()> {
        self.field(key, value)
    }

    fn end(self) -> WalkResult<Value> {
        self.finish()
    }
}

impl ser::SerializeStructVariant for StructWalker {
    type Ok = Value;
    type Error = WalkError;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> WalkResult<()> {
        self.field(key, value)
    }

    fn end(self) -> WalkResult<Value> {
        self.finish()
    }
}
