//! Command-line arguments shared by `pfind` and `spfind`
//!
//! `spfind` parses the same arguments before forwarding them untouched, so
//! anything `pfind` would reject is rejected before a process is spawned.

use std::path::PathBuf;

use clap::Parser;
use clap_cargo::style::CLAP_STYLING;

use crate::permissions::PermissionString;

/// Find entries whose permission string matches exactly
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, styles = CLAP_STYLING, arg_required_else_help = true)]
pub struct Cli {
    /// Directory to search
    #[arg(short = 'd', long = "directory", value_name = "DIRECTORY")]
    pub directory: PathBuf,

    /// Permission string to match, e.g. rw-r--r--
    #[arg(
        short = 'p',
        long = "permissions",
        value_name = "PERMISSIONS",
        value_parser = parse_permissions,
        allow_hyphen_values = true
    )]
    pub permissions: PermissionString,
}

fn parse_permissions(value: &str) -> Result<PermissionString, String> {
    PermissionString::parse(value).map_err(|e| e.to_string())
}
