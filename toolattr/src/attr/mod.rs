//! Attribute descriptors.
//!
//! An attribute is a shared, immutable descriptor that owns the *rules* for a
//! named slot; the slot's value lives on the owning instance and is reached
//! through the getter and setter closures. Every write runs, in this order:
//!
//! 1. kind-specific shaping ([`Attribute::coerce`]): type checks, path
//!    normalization, list deduplication and sorting;
//! 2. the optional validity predicate;
//! 3. the setter.
//!
//! A failure in steps 1 or 2 never reaches the setter, so the previously
//! stored value stays untouched.

mod bitflag;
mod path;
mod path_list;
mod registry;
mod string_list;

pub use bitflag::{BitFlagAttribute, apply_mask, mask_is_set};
pub use path::PathAttribute;
pub use path_list::PathListAttribute;
pub use registry::AttributeSet;
pub use string_list::StringListAttribute;

use tracing::debug;

use crate::core::value::Value;
use crate::error::{Error, Result};

type Getter<T> = Box<dyn Fn(&T) -> Result<Value> + Send + Sync>;
type Setter<T> = Box<dyn Fn(&mut T, Value) -> Result<()> + Send + Sync>;
type Check = Box<dyn Fn(&Value) -> bool + Send + Sync>;

/// Read/write protocol shared by every attribute kind.
pub trait Attribute<T>: Send + Sync {
    /// Accessors, documentation and predicate this attribute delegates to.
    fn base(&self) -> &ValidatedAttribute<T>;

    /// Check and normalize a candidate value before it is validated and stored.
    fn coerce(&self, value: Value) -> Result<Value> {
        Ok(value)
    }

    fn doc<'a>(&'a self) -> Option<&'a str>
    where
        T: 'a,
    {
        self.base().doc.as_deref()
    }

    /// Read the current value from `obj`. Getter failures propagate unchanged.
    fn read(&self, obj: &T) -> Result<Value> {
        (self.base().getter)(obj)
    }

    /// Shape, validate and store `value` on `obj`.
    fn write(&self, obj: &mut T, value: Value) -> Result<()> {
        let value = self.coerce(value).inspect_err(|err| {
            debug!(%err, "attribute value rejected");
        })?;
        let base = self.base();
        if let Some(check) = &base.check
            && !check(&value)
        {
            debug!(value = %value, "attribute value check failed");
            return Err(Error::invalid("value", "value check failed"));
        }
        (base.setter)(obj, value)
    }
}

/// Generic attribute with pluggable accessors and an optional predicate.
///
/// Without a getter the attribute is write-only (reads fail with
/// [`Error::Unreadable`]); without a setter it is read-only (writes fail with
/// [`Error::Unwritable`]).
pub struct ValidatedAttribute<T> {
    getter: Getter<T>,
    setter: Setter<T>,
    doc: Option<String>,
    check: Option<Check>,
}

fn unreadable<T>(_: &T) -> Result<Value> {
    Err(Error::Unreadable)
}

fn unwritable<T>(_: &mut T, _: Value) -> Result<()> {
    Err(Error::Unwritable)
}

impl<T: 'static> ValidatedAttribute<T> {
    pub fn new() -> Self {
        Self {
            getter: Box::new(unreadable::<T>),
            setter: Box::new(unwritable::<T>),
            doc: None,
            check: None,
        }
    }

    pub fn with_getter<F>(mut self, getter: F) -> Self
    where
        F: Fn(&T) -> Result<Value> + Send + Sync + 'static,
    {
        self.getter = Box::new(getter);
        self
    }

    pub fn with_setter<F>(mut self, setter: F) -> Self
    where
        F: Fn(&mut T, Value) -> Result<()> + Send + Sync + 'static,
    {
        self.setter = Box::new(setter);
        self
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    /// Reject writes for which `check` returns false.
    pub fn with_check<F>(mut self, check: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.check = Some(Box::new(check));
        self
    }
}

impl<T: 'static> Default for ValidatedAttribute<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Attribute<T> for ValidatedAttribute<T> {
    fn base(&self) -> &ValidatedAttribute<T> {
        self
    }
}
