//! Progress lines on stderr.

use logscope_index::{Progress, ProgressReporter};

use super::{dim, warning};

/// How much progress to print.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Detail {
    /// Failures and final summaries.
    Quiet,
    /// Phase changes and periodic updates.
    Normal,
    /// Every event, including each discovered file.
    Verbose,
}

/// Prints progress events to stderr.
#[derive(Debug, Clone, Copy)]
pub struct StderrReporter {
    /// Events shown.
    detail: Detail,
}

impl StderrReporter {
    /// Creates a reporter. `quiet` wins over `verbose`.
    pub fn new(quiet: bool, verbose: u8) -> Self {
        let detail = if quiet {
            Detail::Quiet
        } else if verbose > 0 {
            Detail::Verbose
        } else {
            Detail::Normal
        };
        Self { detail }
    }

    /// Returns true if the event is printed at this level of detail.
    fn shows(self, progress: &Progress) -> bool {
        match progress {
            Progress::FileFailed { .. }
            | Progress::IndexReset { .. }
            | Progress::NothingToDo
            | Progress::Done { .. }
            | Progress::Synced { .. } => true,
            Progress::Found { .. } | Progress::ScanningIndex { .. } => {
                self.detail == Detail::Verbose
            }
            _ => self.detail != Detail::Quiet,
        }
    }
}

impl ProgressReporter for StderrReporter {
    fn report(&self, progress: &Progress) {
        if !self.shows(progress) {
            return;
        }
        match progress {
            Progress::FileFailed { .. } | Progress::IndexReset { .. } => {
                eprintln!("{}", warning(&progress.to_string()));
            }
            Progress::Done { .. } | Progress::NothingToDo | Progress::Synced { .. } => {
                eprintln!("{progress}");
            }
            _ => eprintln!("{}", dim(&progress.to_string())),
        }
    }
}
