//! Permission strings: parsing, validation and derivation from mode bits

use std::fmt;
use std::str::FromStr;

use arrayvec::ArrayString;

use crate::error::{Error, Result};
use crate::types::{PERM_ALPHABET, PERM_LEN};

/// Mode bit and the character it renders as, in `rwxrwxrwx` order
const MODE_BITS: [(u32, char); PERM_LEN] = [
    (0o400, 'r'),
    (0o200, 'w'),
    (0o100, 'x'),
    (0o040, 'r'),
    (0o020, 'w'),
    (0o010, 'x'),
    (0o004, 'r'),
    (0o002, 'w'),
    (0o001, 'x'),
];

/// A 9-character permission string such as `rw-r--r--`
///
/// Used both for the pattern given on the command line and for the string
/// computed from an entry's mode. Stack-allocated; always exactly
/// [`PERM_LEN`] bytes over `-rwx`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PermissionString(ArrayString<PERM_LEN>);

impl PermissionString {
    /// Parse and validate a pattern
    ///
    /// Only length and alphabet are checked. A string like `xxxxxxxxx` is
    /// accepted; it simply never matches anything.
    ///
    /// # Errors
    /// Returns [`Error::InvalidPattern`] if `pattern` is not exactly nine
    /// characters from `-rwx`.
    pub fn parse(pattern: &str) -> Result<Self> {
        if pattern.len() != PERM_LEN || !pattern.bytes().all(|b| PERM_ALPHABET.contains(&b)) {
            return Err(Error::InvalidPattern(pattern.to_owned()));
        }
        ArrayString::from(pattern)
            .map(Self)
            .map_err(|_| Error::InvalidPattern(pattern.to_owned()))
    }

    /// Render the low nine bits of `mode`
    #[must_use]
    pub fn from_mode(mode: u32) -> Self {
        let mut perms = ArrayString::new();
        for (bit, ch) in MODE_BITS {
            perms.push(if mode & bit == 0 { '-' } else { ch });
        }
        Self(perms)
    }

    /// Byte-for-byte comparison against another permission string
    #[must_use]
    pub fn matches(&self, other: &Self) -> bool {
        self.0.as_bytes() == other.0.as_bytes()
    }

    /// The string itself
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for PermissionString {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for PermissionString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Check that `pattern` is a well-formed permission string
///
/// # Errors
/// Returns [`Error::InvalidPattern`] on a wrong length or a character outside
/// `-rwx`.
pub fn validate(pattern: &str) -> Result<()> {
    PermissionString::parse(pattern).map(|_| ())
}
