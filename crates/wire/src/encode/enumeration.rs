//! Enumeration members encode their underlying scalar

use super::Encodable;

/// An enumeration whose members carry a scalar value
///
/// Members encode as [`Enumeration::value`], never as their symbolic name.
/// Implement this trait and invoke [`impl_encodable_enum!`](crate::impl_encodable_enum)
/// to derive the matching [`Encodable`] impl.
pub trait Enumeration {
    /// Underlying scalar type
    type Repr: Encodable;

    /// Scalar value of this member
    fn value(&self) -> Self::Repr;
}

/// Implement [`Encodable`](crate::Encodable) for one or more
/// [`Enumeration`](crate::Enumeration) types
///
/// ```
/// use tracedoc_wire::{impl_encodable_enum, Encodable, Enumeration, Value};
///
/// enum Level {
///     Low,
///     High,
/// }
///
/// impl Enumeration for Level {
///     type Repr = i64;
///     fn value(&self) -> i64 {
///         match self {
///             Level::Low => 1,
///             Level::High => 2,
///         }
///     }
/// }
///
/// impl_encodable_enum!(Level);
///
/// assert_eq!(Level::High.encode().unwrap(), Value::Int(2));
/// ```
#[macro_export]
macro_rules! impl_encodable_enum {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::Encodable for $ty {
                fn encode(&self) -> $crate::Result<$crate::Value> {
                    $crate::Encodable::encode(&$crate::Enumeration::value(self))
                }
            }
        )+
    };
}
