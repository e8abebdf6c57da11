use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::capabilities::FILTER_OPTIONS;
use crate::codecs::audio_friendly_name;
use crate::version::Version;

/// Snapshot of every capability query against one engine binary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapabilityReport {
    pub encoder_path: PathBuf,
    pub probed_at: DateTime<Utc>,
    pub version_ok: bool,
    /// `None` when the version could not be established
    pub engine_version: Option<Version>,
    pub decoders: Vec<String>,
    pub encoders: Vec<String>,
    pub hwaccels: Vec<String>,
    pub filters: Vec<String>,
    /// Keyed by position in [`FILTER_OPTIONS`]
    pub filter_options: BTreeMap<usize, bool>,
}

/// Comma-separated codec names, with the friendly name where one exists
fn codec_list(codecs: &[String]) -> String {
    codecs
        .iter()
        .map(|codec| match audio_friendly_name(codec) {
            friendly if friendly == codec.as_str() => codec.clone(),
            friendly => format!("{} ({})", codec, friendly),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

impl fmt::Display for CapabilityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Encoder:   {}", self.encoder_path.display())?;
        writeln!(f, "Probed at: {}", self.probed_at.to_rfc3339())?;
        match self.engine_version {
            Some(v) => writeln!(f, "Version:   {} ({})", v, if self.version_ok { "ok" } else { "unsupported" })?,
            None => writeln!(f, "Version:   unknown (unsupported)")?,
        }
        writeln!(f, "Decoders:  {}", codec_list(&self.decoders))?;
        writeln!(f, "Encoders:  {}", codec_list(&self.encoders))?;
        writeln!(f, "Hwaccels:  {}", self.hwaccels.join(", "))?;
        writeln!(f, "Filters:   {}", self.filters.join(", "))?;
        for (index, supported) in &self.filter_options {
            if let Some((filter, option)) = FILTER_OPTIONS.get(*index) {
                writeln!(f, "  {} [{}]: {}", filter, option, if *supported { "yes" } else { "no" })?;
            }
        }
        Ok(())
    }
}
