//! Per-tool operation lifecycle
//!
//! `Idle -> FileSelected -> Processing -> Succeeded | Failed`, with `reset`
//! returning to `Idle`. A failed run keeps the selected files so the user can
//! change parameters and run again.

use crate::{InputFile, OutputFile, Result, ToolError};
use log::debug;

#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Idle,
    FileSelected,
    Processing,
    Succeeded(OutputFile),
    Failed(ToolError),
}

impl SessionState {
    fn name(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::FileSelected => "file selected",
            SessionState::Processing => "processing",
            SessionState::Succeeded(_) => "succeeded",
            SessionState::Failed(_) => "failed",
        }
    }
}

/// Selected files and the state of the last run for one tool
#[derive(Debug)]
pub struct ToolSession {
    files: Vec<InputFile>,
    state: SessionState,
}

impl Default for ToolSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolSession {
    pub fn new() -> Self {
        Self {
            files: Vec::new(),
            state: SessionState::Idle,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn files(&self) -> &[InputFile] {
        &self.files
    }

    /// Replace the selection; any previous output is released
    pub fn select_files(&mut self, files: Vec<InputFile>) -> Result<()> {
        self.ensure_not_processing()?;
        self.state = if files.is_empty() {
            SessionState::Idle
        } else {
            SessionState::FileSelected
        };
        self.files = files;
        Ok(())
    }

    /// Run `operation` on the selected files and record the outcome
    pub fn run<F>(&mut self, operation: F) -> Result<()>
    where
        F: FnOnce(&[InputFile]) -> Result<OutputFile>,
    {
        if !matches!(self.state, SessionState::FileSelected | SessionState::Failed(_)) {
            return Err(ToolError::InvalidParameter(format!(
                "cannot run while {}",
                self.state.name()
            )));
        }

        self.state = SessionState::Processing;
        match operation(&self.files) {
            Ok(output) => {
                debug!("operation produced {} ({} bytes)", output.suggested_name, output.len());
                self.state = SessionState::Succeeded(output);
                Ok(())
            }
            Err(err) => {
                debug!("operation failed: {err}");
                self.state = SessionState::Failed(err.clone());
                Err(err)
            }
        }
    }

    /// Output of the last successful run
    pub fn output(&self) -> Option<&OutputFile> {
        match &self.state {
            SessionState::Succeeded(output) => Some(output),
            _ => None,
        }
    }

    /// Back to `Idle`, releasing files and output
    pub fn reset(&mut self) -> Result<()> {
        self.ensure_not_processing()?;
        self.files.clear();
        self.state = SessionState::Idle;
        Ok(())
    }

    fn ensure_not_processing(&self) -> Result<()> {
        if matches!(self.state, SessionState::Processing) {
            return Err(ToolError::InvalidParameter(
                "an operation is in progress".to_string(),
            ));
        }
        Ok(())
    }
}
