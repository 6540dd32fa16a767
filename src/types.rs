//! Common constants for `permfind`

/// Length of a permission string (owner/group/other × read/write/execute)
pub const PERM_LEN: usize = 9;

/// Characters a permission string may contain
pub const PERM_ALPHABET: [u8; 4] = *b"-rwx";

/// Maximum path length in bytes, counting the separator and terminator
pub const MAX_PATH_LENGTH: usize = 4096;

/// Size of the chunks read from a child's pipe
pub const BUFFER_SIZE: usize = 4096;

/// File name of the scanner binary the orchestrator launches
pub const SCANNER_BIN: &str = "pfind";

/// Default external sort program
pub const SORTER_PROGRAM: &str = "sort";

/// Prefix of the orchestrator's closing summary line
pub const SUMMARY_PREFIX: &str = "Total matches: ";

const _: () = {
    assert!(PERM_LEN == 9);
    assert!(MAX_PATH_LENGTH > 0);
    assert!(BUFFER_SIZE > 0);
};
