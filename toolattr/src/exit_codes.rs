//! Stable exit codes for `toolattr` commands.

/// Command succeeded.
pub const OK: i32 = 0;
/// Invalid arguments, config, or attribute values.
pub const INVALID: i32 = 1;
/// `toolattr run` could not create the child process.
pub const SPAWN_FAILED: i32 = 127;
