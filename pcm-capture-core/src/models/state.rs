use std::path::PathBuf;

/// Recorder state machine.
///
/// State transitions:
/// ```text
/// idle → running → recording
///   ↑       │          │
///   └───────┴── stop ──┘
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecorderState {
    Idle,
    /// Started, waiting for the first buffer to pick the file format.
    Running,
    /// A raw output file is open.
    Recording { file_path: PathBuf },
}

impl RecorderState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_recording(&self) -> bool {
        matches!(self, Self::Recording { .. })
    }
}
