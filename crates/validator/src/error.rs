use std::fmt;

/// Result alias used throughout the validator core
pub type Result<T> = std::result::Result<T, Error>;

/// Names one of the four numeric fields of a [`crate::Version`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    Major,
    Minor,
    Build,
    Revision,
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Component::Major => "major",
            Component::Minor => "minor",
            Component::Build => "build",
            Component::Revision => "revision",
        };
        f.write_str(name)
    }
}

/// Errors raised by version parsing and process execution
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A version component was explicitly negative
    #[error("specified {component} is out of range: {value}")]
    InvalidArgument { component: Component, value: i64 },

    /// A version string could not be parsed
    #[error("invalid version string {input:?}: {reason}")]
    Format { input: String, reason: String },

    /// The engine binary could not be launched or exited unsuccessfully
    #[error("failed to run `{command}`: {message}")]
    ProcessExecution { command: String, message: String },
}

impl Error {
    pub fn format(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Format {
            input: input.into(),
            reason: reason.into(),
        }
    }

    pub fn process(command: impl Into<String>, message: impl Into<String>) -> Self {
        Error::ProcessExecution {
            command: command.into(),
            message: message.into(),
        }
    }
}
