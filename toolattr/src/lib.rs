//! Validated configuration attributes and external command invocation.
//!
//! The crate keeps the same split between pure logic and side effects:
//!
//! - **[`core`]**: Pure, deterministic logic (the dynamic [`Value`] model, lexical
//!   path normalization, string-list shaping). No I/O.
//! - **[`attr`]**: Attribute descriptors built on top of `core`. An owning type
//!   declares its slots once in an [`AttributeSet`] and routes every read and
//!   write through them.
//! - **[`io`]**: Side-effecting operations (process spawning, config files).
//!
//! [`settings`] ties the two halves together: a build-tool settings object whose
//! fields are declared as attributes and filled from an [`io::config::ToolConfig`].

pub mod attr;
pub mod core;
pub mod error;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod settings;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use attr::{
    Attribute, AttributeSet, BitFlagAttribute, PathAttribute, PathListAttribute,
    StringListAttribute, ValidatedAttribute, apply_mask, mask_is_set,
};
pub use core::value::{Collection, CollectionKind, StringList, Value};
pub use error::{Error, ErrorKind, Result};
pub use io::command::{ExternalCommand, InvokeOptions, Redirect};
pub use io::encoding::Encoding;
pub use io::pipe::Pipe;
pub use io::process::{Completed, Output, Process};
