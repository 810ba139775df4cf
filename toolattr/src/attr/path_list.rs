//! List of filesystem paths.

use crate::attr::{Attribute, StringListAttribute, ValidatedAttribute};
use crate::core::path::normalize_path;
use crate::core::string_list::{container_items, expect_str};
use crate::core::value::Value;
use crate::error::{Error, Result};

/// [`StringListAttribute`] whose items are non-empty, normalized paths.
///
/// Items are normalized first, so `unique` and `sorted` compare normalized
/// forms: `["a/./b", "a/b"]` collapses to a single `a/b`.
pub struct PathListAttribute<T> {
    list: StringListAttribute<T>,
}

impl<T> PathListAttribute<T> {
    pub fn new(base: ValidatedAttribute<T>) -> Self {
        Self {
            list: StringListAttribute::new(base),
        }
    }

    pub fn sorted(mut self) -> Self {
        self.list = self.list.sorted();
        self
    }

    pub fn unique(mut self) -> Self {
        self.list = self.list.unique();
        self
    }

    pub fn is_sorted(&self) -> bool {
        self.list.is_sorted()
    }

    pub fn is_unique(&self) -> bool {
        self.list.is_unique()
    }
}

impl<T> Attribute<T> for PathListAttribute<T> {
    fn base(&self) -> &ValidatedAttribute<T> {
        self.list.base()
    }

    fn coerce(&self, value: Value) -> Result<Value> {
        let normalized = container_items(value)?
            .into_iter()
            .map(|item| {
                let item = expect_str(item)?;
                if item.is_empty() {
                    return Err(Error::invalid("item", "empty path"));
                }
                Ok(normalize_path(&item))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(self.list.shape(normalized))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::value::StringList;
    use crate::error::ErrorKind;

    #[derive(Default)]
    struct Search {
        dirs: StringList,
    }

    fn dirs() -> ValidatedAttribute<Search> {
        ValidatedAttribute::new()
            .with_getter(|s: &Search| Ok(Value::List(s.dirs.clone())))
            .with_setter(|s: &mut Search, v| {
                s.dirs = v.into_list()?;
                Ok(())
            })
    }

    #[test]
    fn unique_compares_normalized_forms() {
        let attr = PathListAttribute::new(dirs()).unique();
        let mut search = Search::default();
        attr.write(&mut search, Value::from(vec!["a/./b", "a/b"]))
            .expect("write");
        assert_eq!(search.dirs.as_slice(), ["a/b".to_string()]);
    }

    #[test]
    fn normalizes_then_sorts() {
        let attr = PathListAttribute::new(dirs()).sorted();
        let mut search = Search::default();
        attr.write(&mut search, Value::from(vec!["z/../y", "./x/", "x"]))
            .expect("write");
        assert_eq!(search.dirs.to_vec(), ["x", "x", "y"]);
        assert_eq!(
            attr.read(&search).expect("read"),
            Value::List(search.dirs.clone())
        );
    }

    #[test]
    fn empty_item_is_rejected_without_partial_write() {
        let attr = PathListAttribute::new(dirs()).unique();
        let mut search = Search {
            dirs: vec!["old".to_string()].into(),
        };
        let err = attr
            .write(&mut search, Value::from(vec![""]))
            .expect_err("empty item");
        assert_eq!(err.kind(), ErrorKind::Value);
        assert_eq!(err.to_string(), "item: empty path");
        let err = attr
            .write(&mut search, Value::from(vec!["ok", ""]))
            .expect_err("empty second item");
        assert_eq!(err.kind(), ErrorKind::Value);
        assert_eq!(search.dirs.to_vec(), ["old"]);
    }

    #[test]
    fn rejects_non_string_items_and_scalars() {
        let attr = PathListAttribute::new(dirs());
        let mut search = Search::default();
        let err = attr
            .write(&mut search, Value::from(vec![Value::Int(1)]))
            .expect_err("int item");
        assert_eq!(err.kind(), ErrorKind::Type);
        let err = attr
            .write(&mut search, Value::from("lib"))
            .expect_err("bare string");
        assert_eq!(err.kind(), ErrorKind::Type);
    }

    #[test]
    fn forwards_flags_to_list() {
        let attr = PathListAttribute::new(dirs()).sorted().unique();
        assert!(attr.is_sorted());
        assert!(attr.is_unique());
    }
}
