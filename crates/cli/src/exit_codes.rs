//! CLI Exit Code Registry
//!
//! This is the single source of truth for all `sidebar` exit codes.
//! Exit codes are part of the shell contract: cron jobs and build scripts
//! rely on them.
//!
//! | Code | Meaning                                                 |
//! |------|---------------------------------------------------------|
//! | 0    | Success                                                 |
//! | 1    | General error (unspecified)                             |
//! | 2    | CLI usage error (bad args, unreadable config file)      |
//! | 3    | Invalid run configuration                               |
//! | 4    | A source could not be loaded or parsed                  |
//! | 5    | The canonical store failed (other than not found)       |
//! | 6    | Output could not be written                             |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the relevant command's error handling

use sidebar_io::IoError;
use sidebar_recon::ReconError;

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, config file missing or unreadable.
pub const EXIT_USAGE: u8 = 2;

/// Config parsed but failed validation, or TOML syntax error.
pub const EXIT_INVALID_CONFIG: u8 = 3;

/// Raw source file missing, unparseable, or using an unknown namespace.
pub const EXIT_SOURCE_LOAD: u8 = 4;

/// Canonical record store error: unreadable or unparseable record, HTTP
/// error status, client setup failure. Not found and timeouts are skipped
/// and never reach this code.
pub const EXIT_CANONICAL_STORE: u8 = 5;

/// Sidebar tree, unreciprocated file, CSV, or export could not be written.
pub const EXIT_OUTPUT_WRITE: u8 = 6;

/// Map an engine error to its exit code.
pub fn recon_exit_code(err: &ReconError) -> u8 {
    match err {
        ReconError::ConfigParse(_)
        | ReconError::ConfigValidation(_)
        | ReconError::UnknownAdapter { .. } => EXIT_INVALID_CONFIG,
        ReconError::UnknownNamespace { .. } => EXIT_SOURCE_LOAD,
        ReconError::Store(_) => EXIT_CANONICAL_STORE,
    }
}

/// Map an I/O layer error to its exit code.
pub fn io_exit_code(err: &IoError) -> u8 {
    match err {
        IoError::Read { .. } | IoError::Parse { .. } | IoError::Cache(_) => EXIT_SOURCE_LOAD,
        IoError::Write { .. } => EXIT_OUTPUT_WRITE,
        IoError::Client(_) => EXIT_CANONICAL_STORE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sidebar_recon::StoreError;
    use std::path::PathBuf;

    #[test]
    fn codes_are_distinct() {
        let codes = [
            EXIT_SUCCESS,
            EXIT_ERROR,
            EXIT_USAGE,
            EXIT_INVALID_CONFIG,
            EXIT_SOURCE_LOAD,
            EXIT_CANONICAL_STORE,
            EXIT_OUTPUT_WRITE,
        ];
        for (i, a) in codes.iter().enumerate() {
            for b in &codes[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn recon_errors_map_by_kind() {
        assert_eq!(recon_exit_code(&ReconError::ConfigParse("x".into())), EXIT_INVALID_CONFIG);
        assert_eq!(
            recon_exit_code(&ReconError::UnknownAdapter {
                source_name: "a".into(),
                adapter: "b".into()
            }),
            EXIT_INVALID_CONFIG
        );
        assert_eq!(
            recon_exit_code(&ReconError::UnknownNamespace {
                source_name: "a".into(),
                abbrev: "zz".into()
            }),
            EXIT_SOURCE_LOAD
        );
        assert_eq!(
            recon_exit_code(&ReconError::Store(StoreError::Http {
                uri: "https://pleiades.stoa.org/places/1".into(),
                status: 500
            })),
            EXIT_CANONICAL_STORE
        );
    }

    #[test]
    fn io_errors_map_by_direction() {
        let read = IoError::Read { path: PathBuf::from("a"), message: "gone".into() };
        let write = IoError::Write { path: PathBuf::from("a"), message: "full".into() };
        assert_eq!(io_exit_code(&read), EXIT_SOURCE_LOAD);
        assert_eq!(io_exit_code(&write), EXIT_OUTPUT_WRITE);
        assert_eq!(io_exit_code(&IoError::Client("tls".into())), EXIT_CANONICAL_STORE);
    }
}
