//! Process exit statuses of the `nxrm` binary

/// Anything not covered below
pub const ERROR: i32 = 1;

/// Validation error - the document or plan was rejected before any change
pub const VALIDATION_ERROR: i32 = 2;

/// Apply error - the server rejected or failed a change
pub const APPLY_ERROR: i32 = 3;

/// Connection error - the server could not be configured or reached
pub const CONNECTION_ERROR: i32 = 4;

/// A document or state file could not be read or written
pub const IO_ERROR: i32 = 5;

/// Usage error - unknown resource type or invalid arguments (following sysexits.h convention)
pub const USAGE_ERROR: i32 = 64;
