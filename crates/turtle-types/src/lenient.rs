//! Forgiving decoders for [`ActorRecord`](crate::ActorRecord) fields.
//!
//! Records reach viewers from any producer that speaks the wire format,
//! not only from a validating server. A color channel or stroke weight
//! outside its storage type saturates to the nearest bound, fractional
//! values round, and an unknown method tag falls back to the default, so
//! one odd field never costs the position update carried next to it.

use core::fmt;
use core::marker::PhantomData;

use serde::de::{self, Deserializer, Visitor};
use serde::Deserialize;

use crate::enums::UpdateMethod;

/// Integer storage types a wire number can saturate into.
pub trait Saturate: Sized {
    /// Nearest value to a signed wire integer.
    fn saturate_i64(v: i64) -> Self;
    /// Nearest value to an unsigned wire integer.
    fn saturate_u64(v: u64) -> Self;
}

macro_rules! impl_saturate {
    ($($t:ty),* $(,)?) => {$(
        impl Saturate for $t {
            fn saturate_i64(v: i64) -> Self {
                <$t>::try_from(v).unwrap_or(if v < 0 { <$t>::MIN } else { <$t>::MAX })
            }

            fn saturate_u64(v: u64) -> Self {
                <$t>::try_from(v).unwrap_or(<$t>::MAX)
            }
        }
    )*};
}

impl_saturate!(u8, u16, i32);

/// Round to the nearest integer. `as` saturates at the `i64` bounds and
/// maps NaN to zero.
#[allow(clippy::cast_possible_truncation)]
fn round_saturating(v: f64) -> i64 {
    v.round() as i64
}

struct SaturatingVisitor<T>(PhantomData<T>);

impl<T: Saturate> Visitor<'_> for SaturatingVisitor<T> {
    type Value = T;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a number")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<T, E> {
        Ok(T::saturate_i64(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<T, E> {
        Ok(T::saturate_u64(v))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<T, E> {
        Ok(T::saturate_i64(round_saturating(v)))
    }
}

/// Decode any JSON number into `T`, saturating at its bounds.
pub fn saturating<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Saturate,
{
    deserializer.deserialize_any(SaturatingVisitor(PhantomData))
}

/// Decode a method tag, falling back to the default for unknown or null tags.
pub fn method_or_default<'de, D>(deserializer: D) -> Result<UpdateMethod, D::Error>
where
    D: Deserializer<'de>,
{
    let tag = Option::<String>::deserialize(deserializer)?;
    Ok(tag
        .as_deref()
        .and_then(UpdateMethod::from_tag)
        .unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers_saturate_at_type_bounds() {
        assert_eq!(u8::saturate_i64(300), 255);
        assert_eq!(u8::saturate_i64(-4), 0);
        assert_eq!(u16::saturate_u64(70_000), u16::MAX);
        assert_eq!(u16::saturate_i64(-1), 0);
        assert_eq!(i32::saturate_i64(i64::MIN), i32::MIN);
        assert_eq!(i32::saturate_u64(u64::MAX), i32::MAX);
        assert_eq!(u16::saturate_i64(12), 12);
    }

    #[test]
    fn floats_round_before_saturating() {
        assert_eq!(round_saturating(2.5), 3);
        assert_eq!(round_saturating(-0.4), 0);
        assert_eq!(round_saturating(f64::NAN), 0);
        assert_eq!(round_saturating(1e300), i64::MAX);
    }
}
