//! Capability allow-lists and parsers for the engine's listing commands.
//!
//! The parsers here are pure: they take the captured text of one command and
//! return names. [`crate::EncoderValidator`] runs the commands.

use std::sync::OnceLock;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Decoders the host application can make use of
pub const REQUIRED_DECODERS: &[&str] = &[
    "h264",
    "hevc",
    "vp8",
    "libvpx",
    "vp9",
    "libvpx-vp9",
    "av1",
    "libdav1d",
    "mpeg2video",
    "mpeg4",
    "msmpeg4",
    "dts",
    "ac3",
    "aac",
    "mp3",
    "flac",
    "h264_qsv",
    "hevc_qsv",
    "mpeg2_qsv",
    "vc1_qsv",
    "vp8_qsv",
    "vp9_qsv",
    "av1_qsv",
    "h264_cuvid",
    "hevc_cuvid",
    "mpeg2_cuvid",
    "vc1_cuvid",
    "mpeg4_cuvid",
    "vp8_cuvid",
    "vp9_cuvid",
    "av1_cuvid",
];

/// Encoders the host application can make use of
pub const REQUIRED_ENCODERS: &[&str] = &[
    "libx264",
    "libx265",
    "mpeg4",
    "msmpeg4",
    "libvpx",
    "libvpx-vp9",
    "aac",
    "libfdk_aac",
    "ac3",
    "libmp3lame",
    "libopus",
    "libvorbis",
    "flac",
    "srt",
    "h264_amf",
    "hevc_amf",
    "h264_qsv",
    "hevc_qsv",
    "h264_nvenc",
    "hevc_nvenc",
    "h264_vaapi",
    "hevc_vaapi",
    "h264_v4l2m2m",
    "h264_videotoolbox",
    "hevc_videotoolbox",
];

/// Filters the host application can make use of
pub const REQUIRED_FILTERS: &[&str] = &[
    // software
    "alphasrc",
    "zscale",
    // qsv
    "scale_qsv",
    "vpp_qsv",
    "deinterlace_qsv",
    "overlay_qsv",
    // cuda
    "scale_cuda",
    "yadif_cuda",
    "tonemap_cuda",
    "overlay_cuda",
    "hwupload_cuda",
    // opencl
    "scale_opencl",
    "tonemap_opencl",
    "overlay_opencl",
    // vaapi
    "scale_vaapi",
    "deinterlace_vaapi",
    "tonemap_vaapi",
    "procamp_vaapi",
    "overlay_vaapi",
    "hwupload_vaapi",
];

/// Filter options probed through the per-filter help text, keyed by position
pub const FILTER_OPTIONS: &[(&str, &str)] = &[
    ("scale_cuda", "Output format (default \"same\")"),
    ("tonemap_cuda", "GPU accelerated HDR to SDR tonemapping"),
    ("tonemap_opencl", "bt2390"),
    ("overlay_opencl", "Action to take when encountering EOF from secondary input"),
    ("overlay_vaapi", "Action to take when encountering EOF from secondary input"),
];

/// Which codec listing to query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodecKind {
    Encoder,
    Decoder,
}

impl CodecKind {
    /// Plural name used both as the listing flag and in log messages
    pub fn plural(self) -> &'static str {
        match self {
            CodecKind::Encoder => "encoders",
            CodecKind::Decoder => "decoders",
        }
    }

    /// Command-line flag selecting this listing
    pub fn flag(self) -> &'static str {
        match self {
            CodecKind::Encoder => "-encoders",
            CodecKind::Decoder => "-decoders",
        }
    }

    pub fn allow_list(self) -> &'static [&'static str] {
        match self {
            CodecKind::Encoder => REQUIRED_ENCODERS,
            CodecKind::Decoder => REQUIRED_DECODERS,
        }
    }
}

// One leading space, a fixed-width flag column, then the short name.
fn codec_line_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?m)^[ \t]\S{6}[ \t]+(?P<name>[\w|-]+)[ \t]+.+$")
            .expect("codec line pattern is valid")
    })
}

fn filter_line_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?m)^[ \t]\S{3}[ \t]+(?P<name>[\w|-]+)[ \t]+.+$")
            .expect("filter line pattern is valid")
    })
}

fn extract_names(pattern: &Regex, output: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for caps in pattern.captures_iter(output) {
        let name = &caps["name"];
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}

/// Short names from an `-encoders` or `-decoders` listing, in order of first appearance
pub fn parse_codec_names(output: &str) -> Vec<String> {
    extract_names(codec_line_pattern(), output)
}

/// Filter names from a `-filters` listing, in order of first appearance
pub fn parse_filter_names(output: &str) -> Vec<String> {
    extract_names(filter_line_pattern(), output)
}

/// Keep the names present in `allowed`, preserving the order of `found`
pub fn retain_allowed(found: Vec<String>, allowed: &[&str]) -> Vec<String> {
    found
        .into_iter()
        .filter(|name| allowed.contains(&name.as_str()))
        .collect()
}

/// Hardware acceleration types from a `-hwaccels` listing, header line dropped
pub fn parse_hwaccels(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .skip(1)
        .map(str::to_string)
        .collect()
}

/// Whether the help text for a filter identifies that exact filter
pub fn help_describes_filter(output: &str, filter: &str) -> bool {
    output
        .lines()
        .filter_map(|line| line.trim().strip_prefix("Filter "))
        .any(|name| name.trim() == filter)
}

/// Option support as read from the help text: `None` when the filter is absent
pub fn filter_option_in_help(output: &str, filter: &str, option: &str) -> Option<bool> {
    if help_describes_filter(output, filter) {
        Some(output.contains(option))
    } else {
        None
    }
}
