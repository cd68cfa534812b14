use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GcloudError {
    #[error("could not run {program}: {source}")]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("command `{command}` exited with {status}: {stderr}")]
    Failed {
        command: String,
        status: ExitStatus,
        stdout: String,
        stderr: String,
    },
    #[error("malformed revision listing: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("credential file error: {0}")]
    Credentials(#[source] std::io::Error),
}
