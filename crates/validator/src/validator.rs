use std::collections::BTreeMap;
use std::sync::Arc;
use chrono::Utc;
use crate::capabilities::{
    filter_option_in_help, parse_codec_names, parse_filter_names, parse_hwaccels, retain_allowed,
    CodecKind, FILTER_OPTIONS, REQUIRED_FILTERS,
};
use crate::config::ValidatorConfig;
use crate::error::{Error, Result};
use crate::logger::{LogFacade, Logger};
use crate::process::{command_line, ProcessRunner, SystemRunner};
use crate::report::CapabilityReport;
use crate::version::Version;
use crate::version_check::{determine_version, validate_version_output};

/// Which stream of a finished process a query reads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Payload {
    /// stdout; a failed process is an error
    Stdout,
    /// stdout, or stderr when the process fails
    StdoutOrStderr,
    /// stderr, whatever the exit status
    Stderr,
}

/// Validates and introspects an installed ffmpeg-compatible binary.
///
/// Every query runs the binary once and parses that response; nothing is
/// cached between calls. Process failures are logged and turned into empty
/// or negative answers.
pub struct EncoderValidator {
    config: ValidatorConfig,
    logger: Arc<dyn Logger>,
    runner: Arc<dyn ProcessRunner>,
}

impl EncoderValidator {
    /// Validator that spawns real processes and logs through the `log` facade
    pub fn new(config: ValidatorConfig) -> Self {
        Self::with_parts(config, Arc::new(LogFacade), Arc::new(SystemRunner))
    }

    pub fn with_logger(config: ValidatorConfig, logger: Arc<dyn Logger>) -> Self {
        Self::with_parts(config, logger, Arc::new(SystemRunner))
    }

    pub fn with_parts(config: ValidatorConfig, logger: Arc<dyn Logger>, runner: Arc<dyn ProcessRunner>) -> Self {
        Self { config, logger, runner }
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Check that the installed binary's version is within the configured bounds
    pub fn validate_version(&self) -> bool {
        let output = match self.process_output(&["-version"], Payload::StdoutOrStderr) {
            Ok(output) => output,
            Err(e) => {
                self.logger.error("Error validating encoder", Some(&e));
                return false;
            }
        };

        validate_version_output(&output, &self.config, self.logger.as_ref())
    }

    /// Effective engine version, or `None` when it cannot be established.
    ///
    /// When the binary prints no version line but all bundled libraries are
    /// new enough, this is the configured minimum version, not the installed one.
    pub fn get_engine_version(&self) -> Option<Version> {
        let output = match self.process_output(&["-version"], Payload::StdoutOrStderr) {
            Ok(output) => output,
            Err(e) => {
                self.logger.error("Error validating encoder", Some(&e));
                return None;
            }
        };

        if output.trim().is_empty() {
            self.logger.error("FFmpeg validation: The process returned no result", None);
            return None;
        }

        self.logger.debug(&format!("ffmpeg output: {}", output), None);
        determine_version(&output, &self.config, self.logger.as_ref())
    }

    pub fn get_decoders(&self) -> Vec<String> {
        self.get_codecs(CodecKind::Decoder)
    }

    pub fn get_encoders(&self) -> Vec<String> {
        self.get_codecs(CodecKind::Encoder)
    }

    /// Every hardware acceleration type the binary reports, unfiltered
    pub fn get_hwaccels(&self) -> Vec<String> {
        let output = match self.process_output(&["-hwaccels", "-hide_banner"], Payload::Stdout) {
            Ok(output) => output,
            Err(e) => {
                self.logger.error("Error detecting available hwaccel types", Some(&e));
                return Vec::new();
            }
        };

        let found = parse_hwaccels(&output);
        self.logger.info(&format!("Available hwaccel types: {}", found.join("/")), None);
        found
    }

    pub fn get_filters(&self) -> Vec<String> {
        let output = match self.process_output(&["-hide_banner", "-filters"], Payload::Stdout) {
            Ok(output) => output,
            Err(e) => {
                self.logger.error("Error detecting available filters", Some(&e));
                return Vec::new();
            }
        };

        let available = retain_allowed(parse_filter_names(&output), REQUIRED_FILTERS);
        self.logger.info(&format!("Available filters: {}", available.join(",")), None);
        available
    }

    /// Option support for every entry of [`FILTER_OPTIONS`], keyed by table index
    pub fn get_filters_with_option(&self) -> BTreeMap<usize, bool> {
        FILTER_OPTIONS
            .iter()
            .enumerate()
            .map(|(index, (filter, option))| (index, self.check_filter_with_option(filter, option)))
            .collect()
    }

    /// Whether `filter` exists and its help text mentions `option`
    pub fn check_filter_with_option(&self, filter: &str, option: &str) -> bool {
        if filter.is_empty() || option.is_empty() {
            return false;
        }

        let query = format!("filter={}", filter);
        let output = match self.process_output(&["-hide_banner", "-h", query.as_str()], Payload::Stdout) {
            Ok(output) => output,
            Err(e) => {
                self.logger.error("Error detecting the given filter", Some(&e));
                return false;
            }
        };

        match filter_option_in_help(&output, filter, option) {
            Some(supported) => supported,
            None => {
                self.logger.warn(&format!("Filter: {} with option {} is not available", filter, option), None);
                false
            }
        }
    }

    /// Whether initialising the VA-API device at `render_node` reports `driver`.
    ///
    /// Always `false` off Linux, without running the binary.
    pub fn check_device_by_driver_name(&self, driver: &str, render_node: &str) -> bool {
        if !self.config.platform.supports_vaapi() {
            return false;
        }

        if driver.is_empty() || render_node.is_empty() {
            return false;
        }

        let device = format!("vaapi=va:{}", render_node);
        let args = ["-v", "verbose", "-hide_banner", "-init_hw_device", device.as_str()];
        match self.process_output(&args, Payload::Stderr) {
            Ok(output) => output.contains(driver),
            Err(e) => {
                self.logger.error("Error detecting the given vaapi render node path", Some(&e));
                false
            }
        }
    }

    /// Run every capability query once and collect the answers
    pub fn report(&self) -> CapabilityReport {
        CapabilityReport {
            encoder_path: self.config.encoder_path.clone(),
            probed_at: Utc::now(),
            version_ok: self.validate_version(),
            engine_version: self.get_engine_version(),
            decoders: self.get_decoders(),
            encoders: self.get_encoders(),
            hwaccels: self.get_hwaccels(),
            filters: self.get_filters(),
            filter_options: self.get_filters_with_option(),
        }
    }

    fn get_codecs(&self, kind: CodecKind) -> Vec<String> {
        let output = match self.process_output(&["-hide_banner", kind.flag()], Payload::Stdout) {
            Ok(output) => output,
            Err(e) => {
                self.logger.error(&format!("Error detecting available {}", kind.plural()), Some(&e));
                return Vec::new();
            }
        };

        let available = retain_allowed(parse_codec_names(&output), kind.allow_list());
        self.logger.info(&format!("Available {}: {}", kind.plural(), available.join(",")), None);
        available
    }

    fn process_output(&self, args: &[&str], payload: Payload) -> Result<String> {
        let path = &self.config.encoder_path;
        let command = command_line(path, args);
        self.logger.info(&format!("Running command: {}", command), None);

        let output = match self.runner.run(path, args) {
            Ok(output) => output,
            Err(e) => {
                self.logger.error(&format!("Error running command: {}", command), Some(&e));
                return Err(e);
            }
        };

        if output.success {
            return Ok(match payload {
                Payload::Stderr => output.stderr,
                Payload::Stdout | Payload::StdoutOrStderr => output.stdout,
            });
        }

        let err = Error::process(
            &command,
            format!(
                "exited with code {}: {}",
                output.exit_code.unwrap_or(-1),
                output.stderr.trim()
            ),
        );
        self.logger.error(&format!("Error running command: {}", command), Some(&err));

        match payload {
            Payload::Stdout => Err(err),
            Payload::StdoutOrStderr | Payload::Stderr => Ok(output.stderr),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::testing::RecordingLogger;
    use crate::logger::Level;
    use crate::platform::Platform;
    use crate::process::testing::ScriptedRunner;

    const VERSION_OUTPUT: &str = "\
ffmpeg version 6.0.1 Copyright (c) 2000-2023 the FFmpeg developers
built with gcc 13
libavutil      58.  2.100 / 58.  2.100
libavcodec     60.  3.100 / 60.  3.100
";

    const DECODERS: &str = "\
Decoders:
 V..... = Video
 ------
 VFS..D h264                 H.264 / AVC / MPEG-4 AVC / MPEG-4 part 10
 V....D h264_cuvid           Nvidia CUVID H264 decoder (codec h264)
 V....D theora               Theora
 A....D aac                  AAC (Advanced Audio Coding)
";

    struct Harness {
        validator: EncoderValidator,
        runner: Arc<ScriptedRunner>,
        logger: Arc<RecordingLogger>,
    }

    fn harness(runner: ScriptedRunner, platform: Platform) -> Harness {
        let runner = Arc::new(runner);
        let logger = Arc::new(RecordingLogger::default());
        let mut config = ValidatorConfig::with_encoder_path("/usr/lib/ffmpeg/ffmpeg");
        config.platform = platform;
        let validator = EncoderValidator::with_parts(config, logger.clone(), runner.clone());
        Harness { validator, runner, logger }
    }

    #[test]
    fn test_validate_version_issues_version_flag() {
        let h = harness(ScriptedRunner::new().stdout(VERSION_OUTPUT), Platform::Linux);
        assert!(h.validator.validate_version());
        assert_eq!(h.runner.calls(), vec![vec!["-version".to_string()]]);
        assert!(h.logger.contains(Level::Info, "Running command: /usr/lib/ffmpeg/ffmpeg -version"));
        assert!(h.logger.contains(Level::Info, "Found ffmpeg version 6.0.1"));
    }

    #[test]
    fn test_validate_version_fails_when_binary_missing() {
        let h = harness(ScriptedRunner::new().missing_binary(), Platform::Linux);
        assert!(!h.validator.validate_version());
        assert!(h.logger.contains(Level::Error, "Error validating encoder"));
    }

    #[test]
    fn test_version_query_reads_stderr_on_failure() {
        let h = harness(ScriptedRunner::new().failure(1, VERSION_OUTPUT), Platform::Linux);
        assert_eq!(h.validator.get_engine_version(), Some(Version::with_build(6, 0, 1)));
        assert!(h.logger.contains(Level::Error, "Error running command"));
    }

    #[test]
    fn test_engine_version_blank_output() {
        let h = harness(ScriptedRunner::new().stdout("   \n"), Platform::Linux);
        assert_eq!(h.validator.get_engine_version(), None);
        assert!(h.logger.contains(Level::Error, "returned no result"));
    }

    #[test]
    fn test_get_decoders_filters_to_allow_list() {
        let h = harness(ScriptedRunner::new().stdout(DECODERS), Platform::Linux);
        assert_eq!(h.validator.get_decoders(), vec!["h264", "h264_cuvid", "aac"]);
        assert_eq!(h.runner.calls(), vec![vec!["-hide_banner".to_string(), "-decoders".to_string()]]);
        assert!(h.logger.contains(Level::Info, "Available decoders: h264,h264_cuvid,aac"));
    }

    #[test]
    fn test_get_encoders_empty_on_failure() {
        let h = harness(ScriptedRunner::new().failure(1, "Unrecognized option"), Platform::Linux);
        assert!(h.validator.get_encoders().is_empty());
        assert_eq!(h.runner.calls(), vec![vec!["-hide_banner".to_string(), "-encoders".to_string()]]);
        assert!(h.logger.contains(Level::Error, "Error detecting available encoders"));
    }

    #[test]
    fn test_get_hwaccels_and_filters() {
        let runner = ScriptedRunner::new()
            .stdout("Hardware acceleration methods:\ncuda\nvaapi\n\n")
            .stdout(" TSC scale_cuda        V->V       GPU accelerated video resizer\n ... abench  A->A  Benchmark\n");
        let h = harness(runner, Platform::Linux);

        assert_eq!(h.validator.get_hwaccels(), vec!["cuda", "vaapi"]);
        assert_eq!(h.validator.get_filters(), vec!["scale_cuda"]);
        assert_eq!(
            h.runner.calls(),
            vec![
                vec!["-hwaccels".to_string(), "-hide_banner".to_string()],
                vec!["-hide_banner".to_string(), "-filters".to_string()],
            ]
        );
        assert!(h.logger.contains(Level::Info, "Available hwaccel types: cuda/vaapi"));
    }

    #[test]
    fn test_check_filter_with_option() {
        let help = "Filter tonemap_opencl\n  Perform HDR to SDR conversion with tonemapping.\n    tonemap  <int>  bt2390\n";
        let runner = ScriptedRunner::new()
            .stdout(help)
            .stdout("Unknown filter 'tonemap_cuda'.\nGPU accelerated HDR to SDR tonemapping\n");
        let h = harness(runner, Platform::Linux);

        assert!(h.validator.check_filter_with_option("tonemap_opencl", "bt2390"));
        assert!(!h.validator.check_filter_with_option("tonemap_cuda", "GPU accelerated HDR to SDR tonemapping"));
        assert!(h.logger.contains(Level::Warn, "Filter: tonemap_cuda with option"));
        assert_eq!(
            h.runner.calls()[0],
            vec!["-hide_banner".to_string(), "-h".to_string(), "filter=tonemap_opencl".to_string()]
        );

        assert!(!h.validator.check_filter_with_option("", "bt2390"));
        assert!(!h.validator.check_filter_with_option("scale_cuda", ""));
        assert_eq!(h.runner.calls().len(), 2);
    }

    #[test]
    fn test_get_filters_with_option_walks_table_in_order() {
        let mut runner = ScriptedRunner::new();
        for (index, (filter, option)) in FILTER_OPTIONS.iter().enumerate() {
            runner = if index % 2 == 0 {
                runner.stdout(&format!("Filter {}\n  {}\n", filter, option))
            } else {
                runner.failure(1, "boom")
            };
        }
        let h = harness(runner, Platform::Linux);

        let result = h.validator.get_filters_with_option();
        let expected: BTreeMap<usize, bool> = (0..FILTER_OPTIONS.len()).map(|i| (i, i % 2 == 0)).collect();
        assert_eq!(result, expected);

        let queried: Vec<String> = h.runner.calls().iter().map(|c| c[2].clone()).collect();
        let table: Vec<String> = FILTER_OPTIONS.iter().map(|(f, _)| format!("filter={}", f)).collect();
        assert_eq!(queried, table);
    }

    #[test]
    fn test_device_check_reads_stderr() {
        let diagnostics = "[AVHWDeviceContext @ 0x55] libva: VA-API version 1.20.0\n\
                           [AVHWDeviceContext @ 0x55] VAAPI driver: Intel iHD driver for Intel(R) Gen Graphics - 24.1.0 ()\n";
        let runner = ScriptedRunner::new()
            .failure(1, diagnostics)
            .stderr(diagnostics);
        let h = harness(runner, Platform::Linux);

        assert!(h.validator.check_device_by_driver_name("iHD", "/dev/dri/renderD128"));
        assert!(!h.validator.check_device_by_driver_name("Mesa Gallium", "/dev/dri/renderD128"));
        assert_eq!(
            h.runner.calls()[0],
            vec![
                "-v".to_string(),
                "verbose".to_string(),
                "-hide_banner".to_string(),
                "-init_hw_device".to_string(),
                "vaapi=va:/dev/dri/renderD128".to_string(),
            ]
        );
    }

    #[test]
    fn test_device_check_skipped_off_linux() {
        for platform in [Platform::Windows, Platform::MacOs, Platform::Other] {
            let h = harness(ScriptedRunner::new().stderr("iHD"), platform);
            assert!(!h.validator.check_device_by_driver_name("iHD", "/dev/dri/renderD128"));
            assert!(h.runner.calls().is_empty());
        }
    }

    #[test]
    fn test_device_check_missing_binary_or_empty_args() {
        let h = harness(ScriptedRunner::new().missing_binary(), Platform::Linux);
        assert!(!h.validator.check_device_by_driver_name("iHD", ""));
        assert!(!h.validator.check_device_by_driver_name("", "/dev/dri/renderD128"));
        assert!(h.runner.calls().is_empty());

        assert!(!h.validator.check_device_by_driver_name("iHD", "/dev/dri/renderD128"));
        assert!(h.logger.contains(Level::Error, "Error detecting the given vaapi render node path"));
    }

    #[test]
    fn test_report_runs_every_query_once() {
        let mut runner = ScriptedRunner::new()
            .stdout(VERSION_OUTPUT)
            .stdout(VERSION_OUTPUT)
            .stdout(DECODERS)
            .stdout(" V....D libx264              libx264 H.264\n")
            .stdout("Hardware acceleration methods:\nqsv\n")
            .stdout(" ..C zscale            V->V       Apply resizing\n");
        for (filter, _) in FILTER_OPTIONS {
            runner = runner.stdout(&format!("Filter {}\n", filter));
        }
        let h = harness(runner, Platform::Linux);

        let report = h.validator.report();
        assert!(report.version_ok);
        assert_eq!(report.engine_version, Some(Version::with_build(6, 0, 1)));
        assert_eq!(report.decoders, vec!["h264", "h264_cuvid", "aac"]);
        assert_eq!(report.encoders, vec!["libx264"]);
        assert_eq!(report.hwaccels, vec!["qsv"]);
        assert_eq!(report.filters, vec!["zscale"]);
        assert!(report.filter_options.values().all(|supported| !supported));
        assert_eq!(h.runner.calls().len(), 6 + FILTER_OPTIONS.len());
    }

    #[test]
    fn test_each_query_runs_the_binary_again() {
        let runner = ScriptedRunner::new().stdout(VERSION_OUTPUT).stdout(VERSION_OUTPUT);
        let h = harness(runner, Platform::Linux);
        assert!(h.validator.get_engine_version().is_some());
        assert!(h.validator.get_engine_version().is_some());
        assert_eq!(h.runner.calls().len(), 2);
    }
}
