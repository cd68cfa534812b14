use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Command;

use crate::GcloudError;

/// A fully described external command, kept around so failures can report
/// exactly what was executed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub envs: Vec<(String, OsString)>,
}

impl Invocation {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            envs: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<OsString>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    /// Program and arguments as a single display string.
    pub fn display(&self) -> String {
        let mut parts = vec![self.program.display().to_string()];
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }

    /// Run to completion and return stdout. A non-zero exit is an error that
    /// carries the captured output.
    pub fn run(&self) -> Result<Vec<u8>, GcloudError> {
        let command = self.display();
        tracing::debug!("executing: {command}");

        let out = Command::new(&self.program)
            .args(&self.args)
            .envs(self.envs.iter().map(|(k, v)| (k, v)))
            .output()
            .map_err(|source| GcloudError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !out.status.success() {
            let stdout = String::from_utf8_lossy(&out.stdout).trim().to_string();
            let stderr = String::from_utf8_lossy(&out.stderr).trim().to_string();
            tracing::warn!("Executed command: {command}");
            tracing::warn!("Output: {stdout}");
            return Err(GcloudError::Failed {
                command,
                status: out.status,
                stdout,
                stderr,
            });
        }

        Ok(out.stdout)
    }
}
