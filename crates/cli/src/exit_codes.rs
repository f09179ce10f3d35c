//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain           | Description                              |
//! |---------|------------------|------------------------------------------|
//! | 0       | Universal        | Success                                  |
//! | 1       | Universal        | General error (unspecified)              |
//! | 2       | Universal        | CLI usage error (bad args, missing file) |
//! | 3-9     | map              | Map pipeline codes                       |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant in the appropriate range
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the relevant command's error handling

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing config file.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Map (3-9)
// =============================================================================

/// Config file parsed but failed validation, or is not valid TOML.
pub const EXIT_MAP_INVALID_CONFIG: u8 = 3;

/// Runtime failure outside the pipeline (output write).
pub const EXIT_MAP_RUNTIME: u8 = 4;

/// Every source failed and the map is synthetic (only with `--strict`).
pub const EXIT_MAP_SYNTHETIC: u8 = 5;
