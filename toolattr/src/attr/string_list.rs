//! Ordered string list attribute.

use crate::attr::{Attribute, ValidatedAttribute};
use crate::core::string_list::{collect_strings, shape};
use crate::core::value::Value;
use crate::error::Result;

/// Attribute holding an immutable list of strings.
///
/// Any accepted container is flattened in its natural order. With
/// [`unique`](Self::unique) later duplicates are dropped; with
/// [`sorted`](Self::sorted) the (deduplicated) list is sorted ascending.
pub struct StringListAttribute<T> {
    sorted: bool,
    unique: bool,
    base: ValidatedAttribute<T>,
}

impl<T> StringListAttribute<T> {
    pub fn new(base: ValidatedAttribute<T>) -> Self {
        Self {
            sorted: false,
            unique: false,
            base,
        }
    }

    pub fn sorted(mut self) -> Self {
        self.sorted = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn is_sorted(&self) -> bool {
        self.sorted
    }

    pub fn is_unique(&self) -> bool {
        self.unique
    }

    /// Apply the configured dedup/sort rules to already checked items.
    pub(crate) fn shape(&self, items: Vec<String>) -> Value {
        Value::List(shape(items, self.unique, self.sorted))
    }
}

impl<T> Attribute<T> for StringListAttribute<T> {
    fn base(&self) -> &ValidatedAttribute<T> {
        &self.base
    }

    fn coerce(&self, value: Value) -> Result<Value> {
        Ok(self.shape(collect_strings(value)?))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, BTreeSet};

    use super::*;
    use crate::core::value::{Collection, StringList};
    use crate::error::ErrorKind;

    #[derive(Default)]
    struct Module {
        files: StringList,
    }

    fn files() -> ValidatedAttribute<Module> {
        ValidatedAttribute::new()
            .with_getter(|m: &Module| Ok(Value::List(m.files.clone())))
            .with_setter(|m: &mut Module, v| {
                m.files = v.into_list()?;
                Ok(())
            })
    }

    fn stored(attr: &StringListAttribute<Module>, value: impl Into<Value>) -> Vec<String> {
        let mut module = Module::default();
        attr.write(&mut module, value.into()).expect("write");
        module.files.to_vec()
    }

    #[test]
    fn plain_list_keeps_order_and_duplicates() {
        let attr = StringListAttribute::new(files());
        assert_eq!(stored(&attr, vec!["b", "a", "b"]), ["b", "a", "b"]);
    }

    #[test]
    fn unique_keeps_first_occurrence() {
        let attr = StringListAttribute::new(files()).unique();
        assert_eq!(
            stored(&attr, vec!["c", "a", "c", "b", "a"]),
            ["c", "a", "b"]
        );
    }

    #[test]
    fn sorted_unique_is_idempotent() {
        let attr = StringListAttribute::new(files()).sorted().unique();
        let first = stored(&attr, vec!["m", "b", "m", "a"]);
        assert_eq!(first, ["a", "b", "m"]);
        let second = stored(&attr, first.clone());
        assert_eq!(second, first);
    }

    #[test]
    fn sorted_without_unique_keeps_duplicates() {
        let attr = StringListAttribute::new(files()).sorted();
        assert_eq!(stored(&attr, ["b", "a", "b"]), ["a", "b", "b"]);
    }

    #[test]
    fn accepts_every_container_kind() {
        let attr = StringListAttribute::new(files()).sorted();
        let map = BTreeMap::from([("k".to_string(), "v".to_string())]);
        assert_eq!(stored(&attr, BTreeSet::from(["y", "x"])), ["x", "y"]);
        assert_eq!(stored(&attr, Collection::keys(&map)), ["k"]);
        assert_eq!(stored(&attr, Collection::values(&map)), ["v"]);
        let list: StringList = vec!["z".to_string()].into();
        assert_eq!(stored(&attr, list), ["z"]);
        assert!(stored(&attr, Vec::<String>::new()).is_empty());
    }

    #[test]
    fn rejects_scalars_and_leaves_value_untouched() {
        let attr = StringListAttribute::new(files()).unique();
        let mut module = Module {
            files: vec!["keep".to_string()].into(),
        };
        for value in [Value::from("a,b"), Value::Int(1), Value::Bool(false)] {
            let err = attr.write(&mut module, value).expect_err("scalar");
            assert_eq!(err.kind(), ErrorKind::Type);
        }
        let mixed = Value::from(vec![Value::from("a"), Value::Bool(true)]);
        let err = attr.write(&mut module, mixed).expect_err("mixed");
        assert_eq!(err.kind(), ErrorKind::Type);
        assert_eq!(module.files.as_slice(), ["keep".to_string()]);
    }

    #[test]
    fn reports_flags() {
        let attr = StringListAttribute::new(files()).sorted();
        assert!(attr.is_sorted());
        assert!(!attr.is_unique());
    }
}
