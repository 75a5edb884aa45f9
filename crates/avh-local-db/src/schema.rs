//! Database schema definitions and constants.

// Current schema version
pub const SCHEMA_VERSION: u32 = 1;

/// Scope under which the hub keeps its slots
pub const DEFAULT_SCOPE: &str = "avh";
