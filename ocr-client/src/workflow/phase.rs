use crate::types::{OcrResultSet, SelectedFile, WorkflowError};

/// Current position in the select → submit → result cycle
#[derive(Debug, Clone, Default, PartialEq)]
pub enum WorkflowPhase {
    #[default]
    Idle,
    FileSelected {
        file: SelectedFile,
    },
    Submitting {
        file: SelectedFile,
        progress: u8,
    },
    Succeeded {
        file: SelectedFile,
        results: OcrResultSet,
    },
    Failed {
        file: SelectedFile,
        error: WorkflowError,
    },
}

impl WorkflowPhase {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::FileSelected { .. } => "file_selected",
            Self::Submitting { .. } => "submitting",
            Self::Succeeded { .. } => "succeeded",
            Self::Failed { .. } => "failed",
        }
    }

    /// The selection, in every phase except `Idle`
    pub fn file(&self) -> Option<&SelectedFile> {
        match self {
            Self::Idle => None,
            Self::FileSelected { file }
            | Self::Submitting { file, .. }
            | Self::Succeeded { file, .. }
            | Self::Failed { file, .. } => Some(file),
        }
    }

    /// Upload percentage; unset outside `Submitting`
    pub fn progress(&self) -> Option<u8> {
        match self {
            Self::Submitting { progress, .. } => Some(*progress),
            _ => None,
        }
    }

    pub fn results(&self) -> Option<&OcrResultSet> {
        match self {
            Self::Succeeded { results, .. } => Some(results),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&WorkflowError> {
        match self {
            Self::Failed { error, .. } => Some(error),
            _ => None,
        }
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self, Self::Submitting { .. })
    }
}
