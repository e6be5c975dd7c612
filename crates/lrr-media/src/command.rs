//! DNG converter command builder and runner.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;
use tracing::debug;

use crate::error::{MediaError, MediaResult};

/// Builder for Adobe DNG Converter invocations.
///
/// The converter's `-o` flag only accepts a bare file name on some versions,
/// so output naming is left to the converter (`<stem>.dng` inside the
/// destination directory) and handled by the caller.
#[derive(Debug, Clone)]
pub struct DngCommand {
    /// RAW input file
    input: PathBuf,
    /// Destination directory (`-d`)
    output_dir: PathBuf,
    /// Extra flags placed before the input file
    extra_args: Vec<String>,
}

impl DngCommand {
    /// Create a conversion command writing next to `output_dir`.
    pub fn new(input: impl AsRef<Path>, output_dir: impl AsRef<Path>) -> Self {
        Self {
            input: input.as_ref().to_path_buf(),
            output_dir: output_dir.as_ref().to_path_buf(),
            extra_args: Vec::new(),
        }
    }

    /// Add an extra converter flag (e.g. `-p1` for a reduced preview).
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.extra_args.push(arg.into());
        self
    }

    pub fn input(&self) -> &Path {
        &self.input
    }

    /// Build the command arguments.
    pub fn build_args(&self) -> Vec<String> {
        let mut args = vec![
            "-c".to_string(),
            "-d".to_string(),
            self.output_dir.to_string_lossy().to_string(),
        ];
        args.extend(self.extra_args.iter().cloned());
        args.push(self.input.to_string_lossy().to_string());
        args
    }
}

/// Runs converter commands against a specific executable.
///
/// Blocks the calling task until the converter exits; there is no timeout.
#[derive(Debug, Clone)]
pub struct ConverterRunner {
    program: PathBuf,
}

impl ConverterRunner {
    pub fn new(program: impl AsRef<Path>) -> Self {
        Self {
            program: program.as_ref().to_path_buf(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Run a conversion and wait for the process to exit.
    pub async fn run(&self, cmd: &DngCommand) -> MediaResult<()> {
        let args = cmd.build_args();
        debug!(
            "Running DNG converter: {} {}",
            self.program.display(),
            args.join(" ")
        );

        let output = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        if output.status.success() {
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            Err(MediaError::conversion_failed(
                format!(
                    "converter exited with {} for {}",
                    output.status,
                    cmd.input().display()
                ),
                (!stderr.is_empty()).then_some(stderr),
                output.status.code(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_builder() {
        let cmd = DngCommand::new("/shoot/IMG_0001.CR3", "/shoot");
        assert_eq!(
            cmd.build_args(),
            vec!["-c", "-d", "/shoot", "/shoot/IMG_0001.CR3"]
        );
    }

    #[test]
    fn test_extra_args_precede_input() {
        let args = DngCommand::new("/shoot/IMG_0001.NEF", "/out").arg("-p1").build_args();
        assert_eq!(args.last().map(String::as_str), Some("/shoot/IMG_0001.NEF"));
        assert_eq!(args[3], "-p1");
    }

    #[tokio::test]
    async fn test_missing_program_is_io_error() {
        let runner = ConverterRunner::new("/definitely/not/a/converter");
        let result = runner.run(&DngCommand::new("/x/a.cr3", "/x")).await;
        assert!(matches!(result, Err(MediaError::Io(_))));
    }
}
