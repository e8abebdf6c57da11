//! Logging capability injected into the validator.
//!
//! The core never calls a logging backend directly; it talks to a [`Logger`].
//! [`LogFacade`] forwards to the `log` crate so the host chooses the backend.

use std::fmt::Display;
pub use log::Level;

/// Minimal logging interface used by the validator
pub trait Logger: Send + Sync {
    /// Emit `message` at `level`, with optional extra context such as an error
    fn log(&self, level: Level, message: &str, context: Option<&dyn Display>);

    fn debug(&self, message: &str, context: Option<&dyn Display>) {
        self.log(Level::Debug, message, context);
    }

    fn info(&self, message: &str, context: Option<&dyn Display>) {
        self.log(Level::Info, message, context);
    }

    fn warn(&self, message: &str, context: Option<&dyn Display>) {
        self.log(Level::Warn, message, context);
    }

    fn error(&self, message: &str, context: Option<&dyn Display>) {
        self.log(Level::Error, message, context);
    }
}

/// [`Logger`] backed by the `log` facade
#[derive(Debug, Clone, Copy, Default)]
pub struct LogFacade;

impl Logger for LogFacade {
    fn log(&self, level: Level, message: &str, context: Option<&dyn Display>) {
        match context {
            Some(ctx) => log::log!(target: "validator", level, "{}: {}", message, ctx),
            None => log::log!(target: "validator", level, "{}", message),
        }
    }
}
