//! Run progress events and console output

use crate::style;
use crate::sync::SyncOutcome;
use std::fmt;

/// What happened to a single repository or release
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemStatus {
    Cloned,
    Updated,
    AlreadyUpToDate,
    Removed,
    /// Mutating call skipped in dry-run mode
    Simulated,
    Failed(String),
}

impl ItemStatus {
    pub fn is_success(&self) -> bool {
        !matches!(self, ItemStatus::Failed(_))
    }
}

impl From<SyncOutcome> for ItemStatus {
    fn from(outcome: SyncOutcome) -> Self {
        match outcome {
            SyncOutcome::Cloned => ItemStatus::Cloned,
            SyncOutcome::Updated => ItemStatus::Updated,
            SyncOutcome::AlreadyUpToDate => ItemStatus::AlreadyUpToDate,
            SyncOutcome::Failed(reason) => ItemStatus::Failed(reason),
        }
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemStatus::Cloned => write!(f, "cloned"),
            ItemStatus::Updated => write!(f, "updated"),
            ItemStatus::AlreadyUpToDate => write!(f, "already up to date"),
            ItemStatus::Removed => write!(f, "removed"),
            ItemStatus::Simulated => write!(f, "dry run"),
            ItemStatus::Failed(reason) => write!(f, "{}", reason),
        }
    }
}

/// Progress for one processed item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemEvent {
    /// 1-based position in the run
    pub index: usize,
    pub total: usize,
    pub name: String,
    pub status: ItemStatus,
}

/// A per-item failure kept for the final report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemFailure {
    pub name: String,
    pub reason: String,
}

/// Totals for a completed run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failures: Vec<ItemFailure>,
    pub dry_run: bool,
}

impl RunSummary {
    pub fn new(total: usize, dry_run: bool) -> Self {
        Self {
            total,
            dry_run,
            ..Default::default()
        }
    }

    pub fn record(&mut self, event: &ItemEvent) {
        match &event.status {
            ItemStatus::Failed(reason) => self.failures.push(ItemFailure {
                name: event.name.clone(),
                reason: reason.clone(),
            }),
            _ => self.succeeded += 1,
        }
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }
}

/// Receives run progress
pub trait Reporter {
    fn started(&mut self, total: usize, dry_run: bool);
    fn item(&mut self, event: &ItemEvent);
    fn finished(&mut self, summary: &RunSummary);
}

/// Styled progress on stdout
///
/// Failures are always printed. Successes only show up in verbose mode.
#[derive(Debug, Clone)]
pub struct ConsoleReporter {
    action: String,
    verbose: bool,
}

impl ConsoleReporter {
    /// `action` names the run in the header, e.g. "Backing up octocat"
    pub fn new(action: impl Into<String>, verbose: bool) -> Self {
        Self {
            action: action.into(),
            verbose,
        }
    }
}

impl Reporter for ConsoleReporter {
    fn started(&mut self, total: usize, dry_run: bool) {
        let mut line = format!("{} ({} items)", self.action, total);
        if dry_run {
            line.push_str(" [dry run]");
        }
        println!("{}", style::header(&line));
    }

    fn item(&mut self, event: &ItemEvent) {
        let ok = event.status.is_success();
        if ok && !self.verbose {
            return;
        }

        let position = format!("[{}/{}]", event.index, event.total);
        let detail = event.status.to_string();
        let detail = if ok {
            style::dim(&detail)
        } else {
            style::error(&detail)
        };

        println!(
            "  {} {} {} {}",
            style::item_indicator(ok, matches!(event.status, ItemStatus::Simulated)),
            style::dim(&position),
            style::item_name(&event.name),
            detail
        );
    }

    fn finished(&mut self, summary: &RunSummary) {
        println!();
        println!(
            "{} {} of {} succeeded, {} failed",
            style::header("Done:"),
            style::count_succeeded(summary.succeeded),
            summary.total,
            style::count_failed(summary.failed())
        );
        if summary.dry_run {
            println!("{}", style::warning("Dry run: nothing was changed"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(name: &str, status: ItemStatus) -> ItemEvent {
        ItemEvent {
            index: 1,
            total: 2,
            name: name.to_string(),
            status,
        }
    }

    #[test]
    fn test_summary_counts() {
        let mut summary = RunSummary::new(3, false);
        summary.record(&event("a", ItemStatus::Cloned));
        summary.record(&event("b", ItemStatus::Failed("boom".to_string())));
        summary.record(&event("c", ItemStatus::AlreadyUpToDate));

        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed(), 1);
        assert_eq!(summary.failures[0].name, "b");
        assert_eq!(summary.failures[0].reason, "boom");
    }

    #[test]
    fn test_from_sync_outcome() {
        assert_eq!(ItemStatus::from(SyncOutcome::Cloned), ItemStatus::Cloned);
        assert_eq!(
            ItemStatus::from(SyncOutcome::Failed("x".to_string())),
            ItemStatus::Failed("x".to_string())
        );
        assert!(ItemStatus::Simulated.is_success());
    }

    #[test]
    fn test_console_reporter_does_not_panic() {
        let mut reporter = ConsoleReporter::new("Backing up octocat", true);
        let mut summary = RunSummary::new(1, true);
        reporter.started(1, true);
        let e = event("octocat/hello", ItemStatus::Simulated);
        summary.record(&e);
        reporter.item(&e);
        reporter.finished(&summary);
    }
}
