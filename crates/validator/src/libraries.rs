use std::collections::HashMap;
use std::sync::OnceLock;
use regex::Regex;
use serde::{Deserialize, Serialize};
use crate::version::Version;

/// Minimum library versions that ship with the minimum supported engine release (4.0).
///
/// Must be updated together with [`crate::config::DEFAULT_MINIMUM_VERSION`].
pub const MINIMUM_LIBRARY_VERSIONS: &[(&str, Version)] = &[
    ("libavutil", Version::new(56, 14)),
    ("libavcodec", Version::new(58, 18)),
    ("libavformat", Version::new(58, 12)),
    ("libavdevice", Version::new(58, 3)),
    ("libavfilter", Version::new(7, 16)),
    ("libswscale", Version::new(5, 1)),
    ("libswresample", Version::new(3, 1)),
    ("libpostproc", Version::new(55, 1)),
];

/// A single library the engine must report at or above `minimum`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryRequirement {
    pub name: String,
    pub minimum: Version,
}

impl LibraryRequirement {
    pub fn new(name: impl Into<String>, minimum: Version) -> Self {
        Self { name: name.into(), minimum }
    }
}

/// The built-in requirement table as owned values
pub fn default_library_minimums() -> Vec<LibraryRequirement> {
    MINIMUM_LIBRARY_VERSIONS
        .iter()
        .map(|(name, minimum)| LibraryRequirement::new(*name, *minimum))
        .collect()
}

fn library_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?P<name>lib\w+)\s+(?P<major>\d+)\.\s*(?P<minor>\d+)")
            .expect("library version pattern is valid")
    })
}

/// Collect every `lib<name> <major>.<minor>` token in `output`.
///
/// Later occurrences of the same library replace earlier ones. Tokens whose
/// numbers do not fit in 32 bits are skipped.
pub fn extract_library_versions(output: &str) -> HashMap<String, Version> {
    let mut versions = HashMap::new();

    for caps in library_pattern().captures_iter(output) {
        let major = caps["major"].parse::<u32>();
        let minor = caps["minor"].parse::<u32>();
        if let (Ok(major), Ok(minor)) = (major, minor) {
            versions.insert(caps["name"].to_string(), Version::new(major, minor));
        }
    }

    versions
}
