//! CLI error handling

use std::fmt;

use webdist_errors::UserFacingError;

/// CLI-specific error type
#[derive(Debug)]
pub enum CliError {
    /// Configuration error
    Config(webdist_errors::Error),
    /// Stage or metadata error
    Build(webdist_errors::Error),
    /// Project root could not be resolved
    Setup(String),
    /// I/O error
    Io(std::io::Error),
}

impl CliError {
    /// Wrap a configuration-phase error
    pub fn config(e: webdist_errors::Error) -> Self {
        CliError::Config(e)
    }
}

fn write_user_facing(f: &mut fmt::Formatter<'_>, e: &webdist_errors::Error) -> fmt::Result {
    let message = e.user_message();
    write!(f, "{message}")?;
    if let Some(code) = e.user_code() {
        write!(f, "\n  Code: {code}")?;
    }
    if let Some(hint) = e.user_hint() {
        write!(f, "\n  Hint: {hint}")?;
    }
    if e.is_retryable() {
        write!(f, "\n  Retry: safe to retry this operation.")?;
    }
    Ok(())
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(e) => {
                write!(f, "Configuration error: ")?;
                write_user_facing(f, e)
            }
            CliError::Build(e) => write_user_facing(f, e),
            CliError::Setup(msg) => write!(f, "Setup error: {msg}"),
            CliError::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Config(e) | CliError::Build(e) => Some(e),
            CliError::Io(e) => Some(e),
            CliError::Setup(_) => None,
        }
    }
}

impl From<webdist_errors::Error> for CliError {
    fn from(e: webdist_errors::Error) -> Self {
        CliError::Build(e)
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e)
    }
}
