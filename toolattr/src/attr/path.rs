//! Single filesystem path attribute.

use crate::attr::{Attribute, ValidatedAttribute};
use crate::core::path::normalize_path;
use crate::core::value::Value;
use crate::error::{Error, Result};

/// Attribute holding one non-empty, lexically normalized path string.
pub struct PathAttribute<T> {
    base: ValidatedAttribute<T>,
}

impl<T> PathAttribute<T> {
    pub fn new(base: ValidatedAttribute<T>) -> Self {
        Self { base }
    }
}

impl<T> Attribute<T> for PathAttribute<T> {
    fn base(&self) -> &ValidatedAttribute<T> {
        &self.base
    }

    fn coerce(&self, value: Value) -> Result<Value> {
        let path = match value {
            Value::Str(path) => path,
            other => return Err(Error::type_mismatch("value", "str", other.type_name())),
        };
        if path.is_empty() {
            return Err(Error::invalid("value", "empty path"));
        }
        Ok(Value::Str(normalize_path(&path)))
    }
}
