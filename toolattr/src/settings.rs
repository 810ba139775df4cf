//! Build-tool settings declared through attributes.
//!
//! Every field of [`Settings`] is reachable only through its declared
//! attribute, so paths are always normalized, module lists always
//! deduplicated, and option flags always consistent with the bit-field.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use crate::attr::{
    AttributeSet, BitFlagAttribute, PathAttribute, PathListAttribute, StringListAttribute,
    ValidatedAttribute, apply_mask, mask_is_set,
};
use crate::core::value::{StringList, Value};
use crate::error::Result;
use crate::io::command::ExternalCommand;
use crate::io::config::ToolConfig;

/// Bits of [`Settings`]' option field.
pub mod flags {
    pub const TESTS: u64 = 1 << 0;
    pub const OBSOLETE: u64 = 1 << 1;
    pub const CXX_TESTS: u64 = 1 << 2;
    pub const LONGRUNNING_TESTS: u64 = 1 << 3;
}

fn flag_attribute(mask: u64, doc: &str) -> BitFlagAttribute<Settings> {
    BitFlagAttribute::new(mask)
        .with_getter(|s: &Settings, mask| Ok(mask_is_set(s.options, mask)))
        .with_setter(|s: &mut Settings, mask, state| {
            apply_mask(&mut s.options, mask, state);
            Ok(())
        })
        .with_doc(doc)
}

fn module_names_are_words(value: &Value) -> bool {
    value.as_list().is_some_and(|modules| {
        modules
            .iter()
            .all(|name| !name.is_empty() && !name.contains(char::is_whitespace))
    })
}

static ATTRIBUTES: LazyLock<AttributeSet<Settings>> = LazyLock::new(|| {
    AttributeSet::new()
        .declare(
            "source_dir",
            PathAttribute::new(
                ValidatedAttribute::new()
                    .with_getter(|s: &Settings| Ok(Value::from(&s.source_dir)))
                    .with_setter(|s: &mut Settings, v| {
                        s.source_dir = v.into_str()?;
                        Ok(())
                    })
                    .with_doc("directory holding the module sources"),
            ),
        )
        .declare(
            "modules",
            StringListAttribute::new(
                ValidatedAttribute::new()
                    .with_getter(|s: &Settings| Ok(Value::List(s.modules.clone())))
                    .with_setter(|s: &mut Settings, v| {
                        s.modules = v.into_list()?;
                        Ok(())
                    })
                    .with_check(module_names_are_words)
                    .with_doc("modules to import"),
            )
            .sorted()
            .unique(),
        )
        .declare(
            "avoids",
            StringListAttribute::new(
                ValidatedAttribute::new()
                    .with_getter(|s: &Settings| Ok(Value::List(s.avoids.clone())))
                    .with_setter(|s: &mut Settings, v| {
                        s.avoids = v.into_list()?;
                        Ok(())
                    })
                    .with_check(module_names_are_words)
                    .with_doc("modules to leave out"),
            )
            .sorted()
            .unique(),
        )
        .declare(
            "include_dirs",
            PathListAttribute::new(
                ValidatedAttribute::new()
                    .with_getter(|s: &Settings| Ok(Value::List(s.include_dirs.clone())))
                    .with_setter(|s: &mut Settings, v| {
                        s.include_dirs = v.into_list()?;
                        Ok(())
                    })
                    .with_doc("extra include directories, in search order"),
            )
            .unique(),
        )
        .declare("tests", flag_attribute(flags::TESTS, "include unit tests"))
        .declare(
            "obsolete",
            flag_attribute(flags::OBSOLETE, "include obsolete modules"),
        )
        .declare(
            "cxx_tests",
            flag_attribute(flags::CXX_TESTS, "include C++ interoperability tests"),
        )
        .declare(
            "longrunning_tests",
            flag_attribute(flags::LONGRUNNING_TESTS, "include slow tests"),
        )
});

/// Normalized settings of one build-tool run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    source_dir: String,
    modules: StringList,
    avoids: StringList,
    include_dirs: StringList,
    options: u64,
    tools: BTreeMap<String, ExternalCommand>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            source_dir: ".".to_string(),
            modules: StringList::default(),
            avoids: StringList::default(),
            include_dirs: StringList::default(),
            options: 0,
            tools: BTreeMap::new(),
        }
    }
}

impl Settings {
    pub fn attributes() -> &'static AttributeSet<Settings> {
        &ATTRIBUTES
    }

    /// Apply every field of `config` through its attribute.
    pub fn from_config(config: &ToolConfig) -> Result<Self> {
        let mut settings = Settings::default();
        settings.set("source_dir", config.source_dir.as_str())?;
        settings.set("modules", config.modules.clone())?;
        settings.set("avoids", config.avoids.clone())?;
        settings.set("include_dirs", config.include_dirs.clone())?;
        settings.set("tests", config.tests)?;
        settings.set("obsolete", config.obsolete)?;
        settings.set("cxx_tests", config.cxx_tests)?;
        settings.set("longrunning_tests", config.longrunning_tests)?;
        for (name, tool) in &config.tools {
            let command = ExternalCommand::with_encoding_label(&tool.path, tool.encoding.as_deref())?;
            settings.tools.insert(name.clone(), command);
        }
        Ok(settings)
    }

    pub fn get(&self, name: &str) -> Result<Value> {
        ATTRIBUTES.get(self, name)
    }

    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<()> {
        ATTRIBUTES.set(self, name, value)
    }

    pub fn source_dir(&self) -> &str {
        &self.source_dir
    }

    pub fn modules(&self) -> &[String] {
        &self.modules
    }

    pub fn avoids(&self) -> &[String] {
        &self.avoids
    }

    pub fn include_dirs(&self) -> &[String] {
        &self.include_dirs
    }

    pub fn options(&self) -> u64 {
        self.options
    }

    pub fn flag(&self, mask: u64) -> bool {
        mask_is_set(self.options, mask)
    }

    pub fn tool(&self, name: &str) -> Option<&ExternalCommand> {
        self.tools.get(name)
    }

    pub fn tools(&self) -> impl Iterator<Item = (&str, &ExternalCommand)> {
        self.tools.iter().map(|(name, cmd)| (name.as_str(), cmd))
    }

    /// `name = value` lines for every attribute, in declaration order.
    pub fn describe(&self) -> Result<Vec<String>> {
        Ok(ATTRIBUTES
            .snapshot(self)?
            .into_iter()
            .map(|(name, value)| format!("{name} = {value}"))
            .collect())
    }
}
