//! # Quarantine Module
//!
//! Moves duplicate groups into a `dupe` folder and curates it afterwards.
//!
//! ## On-disk naming
//! Every quarantined file is named `S<n>__<original name>`, where `n` is a
//! positive group index. The index is the only state that survives between
//! runs: the next move starts at `max(n) + 1`, so earlier groups are never
//! reused.
//!
//! ```text
//! photos/
//! ├── holiday.jpg
//! └── dupe/
//!     ├── S1__beach.jpg
//!     ├── S1__beach_copy.jpg
//!     └── S2__sunset.png
//! ```

mod curator;
mod mover;

pub use curator::{PruneReport, QuarantineCurator, RenameReport};
pub use mover::{MoveReport, MovedFile, QuarantineMover};

use regex::Regex;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Name of the quarantine subfolder
pub const DUPE_FOLDER: &str = "dupe";

fn group_prefix() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^S(\d+)__").expect("group prefix pattern is valid"))
}

fn chained_prefixes() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)(?:S\d+__)+").expect("chained prefix pattern is valid"))
}

/// The `dupe` folder inside `base`
pub fn quarantine_dir(base: &Path) -> PathBuf {
    base.join(DUPE_FOLDER)
}

/// Group index of a quarantined file name (`S12__a.jpg` → 12)
pub fn parse_group_index(file_name: &str) -> Option<u64> {
    group_prefix()
        .captures(file_name)
        .and_then(|caps| caps.get(1))
        .and_then(|digits| digits.as_str().parse().ok())
}

/// `S<index>__<file_name>`
pub fn quarantine_name(index: u64, file_name: &str) -> String {
    format!("S{}__{}", index, file_name)
}

/// Remove every `S<n>__` run anywhere in the name, ignoring case
/// (`S2__S1__a.jpg` → `a.jpg`, `IMG_s3__b.jpg` → `IMG_b.jpg`)
pub fn strip_prefixes(file_name: &str) -> Cow<'_, str> {
    chained_prefixes().replace_all(file_name, "")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_group_index() {
        assert_eq!(parse_group_index("S3__x.jpg"), Some(3));
        assert_eq!(parse_group_index("S0012__x.jpg"), Some(12));
        assert_eq!(parse_group_index("S2__S1__x.jpg"), Some(2));
    }

    #[test]
    fn rejects_names_without_prefix() {
        assert_eq!(parse_group_index("x.jpg"), None);
        assert_eq!(parse_group_index("S__x.jpg"), None);
        assert_eq!(parse_group_index("S3_x.jpg"), None);
        assert_eq!(parse_group_index("s3__x.jpg"), None);
        assert_eq!(parse_group_index("photo_S3__x.jpg"), None);
    }

    #[test]
    fn oversized_index_is_ignored() {
        assert_eq!(parse_group_index("S99999999999999999999999__x.jpg"), None);
    }

    #[test]
    fn builds_quarantine_name() {
        assert_eq!(quarantine_name(4, "beach.jpg"), "S4__beach.jpg");
        assert_eq!(parse_group_index(&quarantine_name(4, "beach.jpg")), Some(4));
    }

    #[test]
    fn strips_chained_prefixes() {
        assert_eq!(strip_prefixes("S1__a.jpg"), "a.jpg");
        assert_eq!(strip_prefixes("S2__S1__a.jpg"), "a.jpg");
        assert_eq!(strip_prefixes("a.jpg"), "a.jpg");
        assert_eq!(strip_prefixes("S1__"), "");
    }

    #[test]
    fn strips_prefixes_anywhere_ignoring_case() {
        assert_eq!(strip_prefixes("s1__a.jpg"), "a.jpg");
        assert_eq!(strip_prefixes("IMG_S2__b.jpg"), "IMG_b.jpg");
        assert_eq!(strip_prefixes("a_S1__b_s4__c.jpg"), "a_b_c.jpg");
        assert_eq!(strip_prefixes("S1_a.jpg"), "S1_a.jpg");
    }

    #[test]
    fn quarantine_dir_is_dupe_subfolder() {
        assert_eq!(
            quarantine_dir(Path::new("/photos")),
            PathBuf::from("/photos/dupe")
        );
    }
}
