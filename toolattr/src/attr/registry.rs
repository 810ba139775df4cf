//! Named attribute declarations for an owning type.

use crate::attr::Attribute;
use crate::core::value::Value;
use crate::error::{Error, Result};

/// The declared attributes of `T`, in declaration order.
///
/// Built once per type (usually in a `static LazyLock`) and shared by every
/// instance:
///
/// ```
/// use std::sync::LazyLock;
/// use toolattr::{AttributeSet, PathAttribute, ValidatedAttribute, Value};
///
/// #[derive(Default)]
/// struct Layout { m4_dir: String }
///
/// static LAYOUT: LazyLock<AttributeSet<Layout>> = LazyLock::new(|| {
///     AttributeSet::new().declare(
///         "m4_dir",
///         PathAttribute::new(
///             ValidatedAttribute::new()
///                 .with_getter(|l: &Layout| Ok(Value::from(&l.m4_dir)))
///                 .with_setter(|l: &mut Layout, v| {
///                     l.m4_dir = v.into_str()?;
///                     Ok(())
///                 }),
///         ),
///     )
/// });
///
/// let mut layout = Layout::default();
/// LAYOUT.set(&mut layout, "m4_dir", "./m4/").unwrap();
/// assert_eq!(layout.m4_dir, "m4");
/// ```
pub struct AttributeSet<T> {
    slots: Vec<(&'static str, Box<dyn Attribute<T>>)>,
}

impl<T> AttributeSet<T> {
    pub fn new() -> Self {
        Self { slots: Vec::new() }
    }

    /// Declare `name`. Redeclaring a name replaces the earlier attribute in place.
    pub fn declare<A>(mut self, name: &'static str, attribute: A) -> Self
    where
        A: Attribute<T> + 'static,
    {
        let attribute: Box<dyn Attribute<T>> = Box::new(attribute);
        match self.slots.iter_mut().find(|(slot, _)| *slot == name) {
            Some(slot) => slot.1 = attribute,
            None => self.slots.push((name, attribute)),
        }
        self
    }

    pub fn lookup(&self, name: &str) -> Result<&dyn Attribute<T>> {
        self.slots
            .iter()
            .find(|(slot, _)| *slot == name)
            .map(|(_, attribute)| attribute.as_ref())
            .ok_or_else(|| Error::UnknownAttribute(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.slots.iter().any(|(slot, _)| *slot == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.slots.iter().map(|(name, _)| *name)
    }

    pub fn doc(&self, name: &str) -> Option<&str> {
        self.lookup(name).ok().and_then(|attribute| attribute.doc())
    }

    pub fn get(&self, obj: &T, name: &str) -> Result<Value> {
        self.lookup(name)?.read(obj)
    }

    pub fn set(&self, obj: &mut T, name: &str, value: impl Into<Value>) -> Result<()> {
        self.lookup(name)?.write(obj, value.into())
    }

    /// Read every readable attribute, skipping write-only ones.
    pub fn snapshot(&self, obj: &T) -> Result<Vec<(&'static str, Value)>> {
        let mut values = Vec::with_capacity(self.slots.len());
        for (name, attribute) in &self.slots {
            match attribute.read(obj) {
                Ok(value) => values.push((*name, value)),
                Err(Error::Unreadable) => {}
                Err(err) => return Err(err),
            }
        }
        Ok(values)
    }
}

impl<T> Default for AttributeSet<T> {
    fn default() -> Self {
        Self::new()
    }
}
