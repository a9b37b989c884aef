//! The `Encodable` capability and its primitive/container impls
//!
//! Every value that can appear in a document implements [`Encodable`]. The
//! impl chosen is the one for the value's exact type; there is no fallback
//! to a supertype or capability. Types without an impl can opt into the
//! serde-driven structural encoder through [`Structural`](super::Structural).

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::hash::BuildHasher;
use std::rc::Rc;
use std::sync::Arc;

use tracedoc_core::{Error, Result, Value};

/// Conversion of a value into the canonical interchange form
///
/// Implementations must be deterministic for identical input, except where
/// the input's own iteration order is unspecified (hash sets and maps).
/// Failures propagate; an implementation never substitutes a placeholder.
pub trait Encodable {
    /// Encode `self` into a [`Value`] tree
    fn encode(&self) -> Result<Value>;
}

/// Encode any value, the free-function form of [`Encodable::encode`]
pub fn encode<T: Encodable + ?Sized>(value: &T) -> Result<Value> {
    value.encode()
}

// ============================================================================
// Primitives
// ============================================================================

impl Encodable for Value {
    fn encode(&self) -> Result<Value> {
        Ok(self.clone())
    }
}

impl Encodable for bool {
    fn encode(&self) -> Result<Value> {
        Ok(Value::Bool(*self))
    }
}

macro_rules! encodable_lossless_int {
    ($($ty:ty),*) => {
        $(
            impl Encodable for $ty {
                fn encode(&self) -> Result<Value> {
                    Ok(Value::Int(i64::from(*self)))
                }
            }
        )*
    };
}

encodable_lossless_int!(i8, i16, i32, i64, u8, u16, u32);

macro_rules! encodable_checked_int {
    ($($ty:ty),*) => {
        $(
            impl Encodable for $ty {
                fn encode(&self) -> Result<Value> {
                    i64::try_from(*self).map(Value::Int).map_err(|_| {
                        Error::invalid_payload(
                            stringify!($ty),
                            format!("{} does not fit in a 64-bit signed integer", self),
                        )
                    })
                }
            }
        )*
    };
}

encodable_checked_int!(u64, u128, i128, usize, isize);

impl Encodable for f32 {
    fn encode(&self) -> Result<Value> {
        Ok(Value::Float(f64::from(*self)))
    }
}

impl Encodable for f64 {
    fn encode(&self) -> Result<Value> {
        Ok(Value::Float(*self))
    }
}

impl Encodable for char {
    fn encode(&self) -> Result<Value> {
        Ok(Value::String(self.to_string()))
    }
}

impl Encodable for str {
    fn encode(&self) -> Result<Value> {
        Ok(Value::String(self.to_string()))
    }
}

impl Encodable for String {
    fn encode(&self) -> Result<Value> {
        Ok(Value::String(self.clone()))
    }
}

// ============================================================================
// Indirection
// ============================================================================

impl<T: Encodable + ?Sized> Encodable for &T {
    fn encode(&self) -> Result<Value> {
        (**self).encode()
    }
}

impl<T: Encodable + ?Sized> Encodable for Box<T> {
    fn encode(&self) -> Result<Value> {
        (**self).encode()
    }
}

impl<T: Encodable + ?Sized> Encodable for Rc<T> {
    fn encode(&self) -> Result<Value> {
        (**self).encode()
    }
}

impl<T: Encodable + ?Sized> Encodable for Arc<T> {
    fn encode(&self) -> Result<Value> {
        (**self).encode()
    }
}

impl<T: Encodable> Encodable for Option<T> {
    fn encode(&self) -> Result<Value> {
        match self {
            Some(v) => v.encode(),
            None => Ok(Value::Null),
        }
    }
}

// ============================================================================
// Ordered sequences
// ============================================================================

fn encode_seq<'a, T, I>(items: I) -> Result<Value>
where
    T: Encodable + 'a,
    I: IntoIterator<Item = &'a T>,
{
    items
        .into_iter()
        .map(Encodable::encode)
        .collect::<Result<Vec<_>>>()
        .map(Value::Array)
}

impl<T: Encodable> Encodable for [T] {
    fn encode(&self) -> Result<Value> {
        encode_seq(self)
    }
}

impl<T: Encodable, const N: usize> Encodable for [T; N] {
    fn encode(&self) -> Result<Value> {
        encode_seq(self)
    }
}

impl<T: Encodable> Encodable for Vec<T> {
    fn encode(&self) -> Result<Value> {
        encode_seq(self)
    }
}

impl<T: Encodable> Encodable for VecDeque<T> {
    fn encode(&self) -> Result<Value> {
        encode_seq(self)
    }
}

// ============================================================================
// Set-like collections
// ============================================================================

// Snapshot of the set's iteration order at encode time. Hash sets have no
// defined order, so two encodes of the same set may differ.
impl<T: Encodable, S: BuildHasher> Encodable for HashSet<T, S> {
    fn encode(&self) -> Result<Value> {
        encode_seq(self)
    }
}

impl<T: Encodable> Encodable for BTreeSet<T> {
    fn encode(&self) -> Result<Value> {
        encode_seq(self)
    }
}

// ============================================================================
// Mappings
// ============================================================================

fn encode_map<'a, K, V, I>(entries: I) -> Result<Value>
where
    K: AsRef<str> + 'a,
    V: Encodable + 'a,
    I: IntoIterator<Item = (&'a K, &'a V)>,
{
    let mut object = HashMap::new();
    for (k, v) in entries {
        object.insert(k.as_ref().to_string(), v.encode()?);
    }
    Ok(Value::Object(object))
}

impl<K: AsRef<str>, V: Encodable, S: BuildHasher> Encodable for HashMap<K, V, S> {
    fn encode(&self) -> Result<Value> {
        encode_map(self)
    }
}

impl<K: AsRef<str>, V: Encodable> Encodable for BTreeMap<K, V> {
    fn encode(&self) -> Result<Value> {
        encode_map(self)
    }
}

// ============================================================================
// Tuples
// ============================================================================

macro_rules! encodable_tuple {
    ($($name:ident $var:ident),+) => {
        impl<$($name: Encodable),+> Encodable for ($($name,)+) {
            fn encode(&self) -> Result<Value> {
                let ($($var,)+) = self;
                Ok(Value::Array(vec![$($var.encode()?),+]))
            }
        }
    };
}

encodable_tuple!(A a);
encodable_tuple!(A a, B b);
encodable_tuple!(A a, B b, C c);
encodable_tuple!(A a, B b, C c, D d);
