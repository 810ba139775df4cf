//! Boolean view over one or more bits of an integer bit-field.

use crate::attr::{Attribute, ValidatedAttribute};
use crate::core::value::Value;
use crate::error::{Error, Result};

/// True if any bit of `mask` is set in `field`.
pub fn mask_is_set(field: u64, mask: u64) -> bool {
    field & mask != 0
}

/// Set (`state == true`) or clear the bits of `mask` in `field`.
pub fn apply_mask(field: &mut u64, mask: u64, state: bool) {
    if state {
        *field |= mask;
    } else {
        *field &= !mask;
    }
}

/// Attribute projecting a boolean out of a bit-field owned by `T`.
///
/// Accessors receive the mask alongside the instance, so one pair of functions
/// can back every flag of a bit-field:
///
/// ```
/// use toolattr::{Attribute, BitFlagAttribute, Value, apply_mask, mask_is_set};
///
/// struct Opts { bits: u64 }
///
/// let tests = BitFlagAttribute::new(0b10)
///     .with_getter(|o: &Opts, mask| Ok(mask_is_set(o.bits, mask)))
///     .with_setter(|o: &mut Opts, mask, state| {
///         apply_mask(&mut o.bits, mask, state);
///         Ok(())
///     });
///
/// let mut opts = Opts { bits: 0b01 };
/// tests.write(&mut opts, Value::Bool(true)).unwrap();
/// assert_eq!(opts.bits, 0b11);
/// ```
pub struct BitFlagAttribute<T> {
    mask: u64,
    base: ValidatedAttribute<T>,
}

impl<T: 'static> BitFlagAttribute<T> {
    pub fn new(mask: u64) -> Self {
        Self {
            mask,
            base: ValidatedAttribute::new(),
        }
    }

    pub fn with_getter<F>(mut self, getter: F) -> Self
    where
        F: Fn(&T, u64) -> Result<bool> + Send + Sync + 'static,
    {
        let mask = self.mask;
        self.base = self
            .base
            .with_getter(move |obj| getter(obj, mask).map(Value::Bool));
        self
    }

    pub fn with_setter<F>(mut self, setter: F) -> Self
    where
        F: Fn(&mut T, u64, bool) -> Result<()> + Send + Sync + 'static,
    {
        let mask = self.mask;
        self.base = self
            .base
            .with_setter(move |obj, value| setter(obj, mask, value.to_bool()?));
        self
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.base = self.base.with_doc(doc);
        self
    }

    pub fn mask(&self) -> u64 {
        self.mask
    }
}

impl<T> Attribute<T> for BitFlagAttribute<T> {
    fn base(&self) -> &ValidatedAttribute<T> {
        &self.base
    }

    fn coerce(&self, value: Value) -> Result<Value> {
        match value {
            Value::Bool(_) => Ok(value),
            other => Err(Error::type_mismatch("value", "bool", other.type_name())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    struct Flags {
        bits: u64,
    }

    fn flag(mask: u64) -> BitFlagAttribute<Flags> {
        BitFlagAttribute::new(mask)
            .with_getter(|f: &Flags, mask| Ok(mask_is_set(f.bits, mask)))
            .with_setter(|f: &mut Flags, mask, state| {
                apply_mask(&mut f.bits, mask, state);
                Ok(())
            })
    }

    #[test]
    fn write_then_read_round_trips_each_state() {
        for initial in [0u64, 0b1010, u64::MAX] {
            for state in [true, false] {
                let attr = flag(0b0100);
                let mut flags = Flags { bits: initial };
                attr.write(&mut flags, Value::Bool(state)).expect("write");
                assert_eq!(attr.read(&flags).expect("read"), Value::Bool(state));
            }
        }
    }

    #[test]
    fn set_then_clear_leaves_other_bits_alone() {
        let attr = flag(0b0110);
        let mut flags = Flags { bits: 0b1001 };
        attr.write(&mut flags, Value::Bool(true)).expect("set");
        assert_eq!(flags.bits, 0b1111);
        attr.write(&mut flags, Value::Bool(false)).expect("clear");
        assert_eq!(flags.bits, 0b1001);
    }

    #[test]
    fn multi_bit_mask_reads_true_when_any_bit_set() {
        let attr = flag(0b0110);
        let flags = Flags { bits: 0b0010 };
        assert_eq!(attr.read(&flags).expect("read"), Value::Bool(true));
    }

    #[test]
    fn rejects_non_boolean_values() {
        let attr = flag(1);
        let mut flags = Flags { bits: 0 };
        for value in [Value::Int(1), Value::from("true"), Value::None] {
            let err = attr.write(&mut flags, value).expect_err("not bool");
            assert_eq!(err.kind(), ErrorKind::Type);
        }
        assert_eq!(flags.bits, 0);
    }

    #[test]
    fn exposes_mask_and_defaults_to_inaccessible() {
        let attr: BitFlagAttribute<Flags> = BitFlagAttribute::new(0x80).with_doc("obsolete");
        assert_eq!(attr.mask(), 0x80);
        assert_eq!(attr.doc(), Some("obsolete"));
        let mut flags = Flags { bits: 0 };
        assert_eq!(
            attr.read(&flags).expect_err("no getter").kind(),
            ErrorKind::Unreadable
        );
        assert_eq!(
            attr.write(&mut flags, Value::Bool(true))
                .expect_err("no setter")
                .kind(),
            ErrorKind::Unwritable
        );
    }
}
