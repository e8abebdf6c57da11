//! Engine version determination and gating from `-version` output.
//!
//! Pre-built binaries print `ffmpeg version x.y` on the first line. Builds from
//! git print a commit id there instead, so the fallback compares the bundled
//! library versions against the minimum table. When every library is new
//! enough, the configured minimum version is reported: it is a lower bound
//! known to be compatible, not the version actually installed.

use std::sync::OnceLock;
use regex::Regex;
use crate::config::ValidatorConfig;
use crate::libraries::extract_library_versions;
use crate::logger::Logger;
use crate::version::Version;

/// Vendor string printed by the incompatible libav fork (compared lowercase)
pub const INCOMPATIBLE_FORK_MARKER: &str = "libav developers";

fn signature_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^ffmpeg version n?(?P<version>(?:\d+\.?)+)").expect("signature pattern is valid")
    })
}

/// Version from the leading `ffmpeg version` line, if there is a usable one
fn signature_version(output: &str, logger: &dyn Logger) -> Option<Version> {
    let caps = signature_pattern().captures(output)?;
    let raw = caps["version"].trim_end_matches('.');

    match Version::parse(raw) {
        Ok(version) => Some(version),
        Err(e) => {
            logger.warn(&format!("Ignoring unparseable version line {:?}: {}", raw, e), None);
            None
        }
    }
}

/// Work out the engine version from raw `-version` output.
///
/// Returns `None` when neither the version line nor the library versions
/// establish compatibility.
pub fn determine_version(output: &str, config: &ValidatorConfig, logger: &dyn Logger) -> Option<Version> {
    if let Some(version) = signature_version(output, logger) {
        return Some(version);
    }

    if config.library_minimums.is_empty() {
        logger.warn("No library requirements configured, cannot infer the version", None);
        return None;
    }

    let found = extract_library_versions(output);
    let mut all_satisfied = true;

    for requirement in &config.library_minimums {
        match found.get(&requirement.name) {
            None => {
                logger.error(&format!("{} version not found", requirement.name), None);
                all_satisfied = false;
            }
            Some(version) if *version >= requirement.minimum => {
                logger.info(
                    &format!(
                        "Found {} version {} ({})",
                        requirement.name, version, requirement.minimum
                    ),
                    None,
                );
            }
            Some(version) => {
                logger.warn(
                    &format!(
                        "Found {} version {} lower than recommended version {}",
                        requirement.name, version, requirement.minimum
                    ),
                    None,
                );
                all_satisfied = false;
            }
        }
    }

    if all_satisfied {
        logger.debug(
            &format!(
                "All library versions satisfied, assuming minimum version {}",
                config.minimum_version
            ),
            None,
        );
        Some(config.minimum_version)
    } else {
        None
    }
}

/// Decide whether `-version` output describes an acceptable engine
pub fn validate_version_output(output: &str, config: &ValidatorConfig, logger: &dyn Logger) -> bool {
    if output.trim().is_empty() {
        logger.error("FFmpeg validation: The process returned no result", None);
        return false;
    }

    if output.to_lowercase().contains(INCOMPATIBLE_FORK_MARKER) {
        logger.error("FFmpeg validation: avconv instead of ffmpeg is not supported", None);
        return false;
    }

    let version = determine_version(output, config, logger);
    let min = config.minimum_version;

    let Some(version) = version else {
        logger.info("Found ffmpeg version unknown", None);
        match config.maximum_version {
            Some(max) if max == min => {
                logger.warn(&format!("FFmpeg validation: We recommend version {}", min), None);
            }
            Some(max) => {
                logger.warn(
                    &format!(
                        "FFmpeg validation: We recommend a minimum of {} and maximum of {}",
                        min, max
                    ),
                    None,
                );
            }
            None => {
                logger.warn(&format!("FFmpeg validation: We recommend minimum version {}", min), None);
            }
        }
        return false;
    };

    logger.info(&format!("Found ffmpeg version {}", version), None);

    if version < min {
        logger.warn(&format!("FFmpeg validation: The minimum recommended version is {}", min), None);
        return false;
    }

    if let Some(max) = config.maximum_version {
        if version > max {
            logger.warn(&format!("FFmpeg validation: The maximum recommended version is {}", max), None);
            return false;
        }
    }

    true
}
