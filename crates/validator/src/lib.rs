pub mod capabilities;
pub mod codecs;
pub mod config;
pub mod error;
pub mod libraries;
pub mod logger;
pub mod platform;
pub mod process;
pub mod report;
pub mod validator;
pub mod version;
pub mod version_check;

pub use capabilities::CodecKind;
pub use config::ValidatorConfig;
pub use error::{Error, Result};
pub use logger::{LogFacade, Logger};
pub use platform::Platform;
pub use process::{ProcessOutput, ProcessRunner, SystemRunner};
pub use report::CapabilityReport;
pub use validator::EncoderValidator;
pub use version::Version;
