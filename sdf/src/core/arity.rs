//! Argument-count checks for the profile-specific commands.

use std::ffi::{OsStr, OsString};

pub const URL_REQUIRED: &str = "URL required.";
pub const TOO_MANY_PARAMETERS: &str = "Too many parameters.";
pub const COMMAND_REQUIRED: &str = "Please provide command.";

/// Why an argument list was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArityError {
    MissingUrl,
    TooManyParameters,
    MissingCommand,
}

impl ArityError {
    /// Corrective message shown to the user.
    pub fn message(self) -> &'static str {
        match self {
            ArityError::MissingUrl => URL_REQUIRED,
            ArityError::TooManyParameters => TOO_MANY_PARAMETERS,
            ArityError::MissingCommand => COMMAND_REQUIRED,
        }
    }
}

/// `clone` and `init` take exactly one URL.
pub fn single_url(args: &[OsString]) -> Result<&OsStr, ArityError> {
    match args {
        [] => Err(ArityError::MissingUrl),
        [url] => Ok(url.as_os_str()),
        _ => Err(ArityError::TooManyParameters),
    }
}

/// `trace` needs at least the program to run.
pub fn program_argv(args: &[OsString]) -> Result<&[OsString], ArityError> {
    if args.is_empty() {
        return Err(ArityError::MissingCommand);
    }
    Ok(args)
}
