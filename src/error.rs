//! Errors surfaced by the hoisting hooks.
//!
//! Only contract violations and host failures are errors. Modules that do not
//! look like extracted styles are passthroughs (`Ok(None)`), and a missing dev
//! server is a silent no-op.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HoistError {
    #[error("invalid {field} pattern '{pattern}': {source}")]
    InvalidPattern {
        field: &'static str,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("hostComponent is required for builds")]
    MissingHostComponent,

    #[error("unknown command '{0}', expected 'serve' or 'build'")]
    UnknownCommand(String),

    #[error("failed to parse style module '{id}': {message}")]
    Parse { id: String, message: String },

    /// A binding statement survived into an emitted chunk but its hash was
    /// never recorded at transform time.
    #[error("asset reference '{hash}' in '{file}' has no recorded raw expression")]
    UnresolvedAsset { hash: String, file: String },

    #[error("malformed style anchor {literal} in '{file}'")]
    MalformedAnchor { file: String, literal: String },
}

pub type HoistResult<T> = Result<T, HoistError>;

#[cfg(feature = "napi")]
impl From<HoistError> for napi::Error {
    fn from(err: HoistError) -> Self {
        napi::Error::from_reason(err.to_string())
    }
}
