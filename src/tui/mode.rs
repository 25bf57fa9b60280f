//! Active full-screen view.

/// Snapshot of one unit's trace, taken when the full-screen view opens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceView {
    pub id: u64,
    pub lines: Vec<String>,
}

/// Which view is on screen and which key table is active.
///
/// `Main` is the only mode that can open the others; both dialogs close
/// back into `Main`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Main,
    TraceDialog(TraceView),
    HelpDialog,
}

impl Mode {
    pub fn is_modal(&self) -> bool {
        !matches!(self, Mode::Main)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Mode::Main => "main",
            Mode::TraceDialog(_) => "trace",
            Mode::HelpDialog => "help",
        }
    }
}
