//! Download and pack pipeline
//!
//! The run is simulated: progress advances from 0 to 100 in steps of 10
//! with a fixed delay, checkpoint messages are logged along the way and an
//! output path is synthesized at the end. Nothing touches the network or
//! the filesystem.

pub mod events;
pub mod summary;

use offpack_core::{AppState, DownloadSettings, HistoryEntry, PackageFormat};
use offpack_storage::StateStore;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use time::OffsetDateTime;
use time::macros::format_description;
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

pub use events::{DownloadEvent, DownloadOutcome, LogEntry, LogLevel};
pub use summary::DownloadSummary;

/// Number of selected package ids recorded in a history entry
const HISTORY_PACKAGE_NAMES: usize = 3;

/// Snapshot of what a run works on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    pub packages: Vec<String>,
    pub settings: DownloadSettings,
}

impl DownloadRequest {
    pub fn from_state(state: &AppState) -> Self {
        Self {
            packages: state.selected_packages.iter().cloned().collect(),
            settings: state.settings.clone(),
        }
    }
}

pub struct Downloader {
    step_delay: Duration,
    running: AtomicBool,
}

impl Downloader {
    pub fn new(step_delay: Duration) -> Self {
        Self {
            step_delay,
            running: AtomicBool::new(false),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Run the pipeline, then record a history entry if it succeeded
    pub async fn run_and_record(
        &self,
        store: &mut StateStore,
        events: Option<UnboundedSender<DownloadEvent>>,
        cancel: CancellationToken,
    ) -> DownloadOutcome {
        let request = DownloadRequest::from_state(store.state());
        let outcome = self.run(&request, events, cancel).await;

        if let DownloadOutcome::Succeeded { output_path } = &outcome {
            let names = request
                .packages
                .iter()
                .take(HISTORY_PACKAGE_NAMES)
                .cloned()
                .collect();
            store.add_history_entry(HistoryEntry::new(names, output_path.clone()));
        }

        outcome
    }

    pub async fn run(
        &self,
        request: &DownloadRequest,
        events: Option<UnboundedSender<DownloadEvent>>,
        cancel: CancellationToken,
    ) -> DownloadOutcome {
        let reporter = Reporter { events };

        let Some(_running) = RunningGuard::acquire(&self.running) else {
            return reporter.fail("A download is already running");
        };

        if request.packages.is_empty() {
            return reporter.fail("Select the packages to download first");
        }
        if !request.settings.has_save_directory() {
            return reporter.fail("Set the save directory first");
        }

        let settings = &request.settings;
        reporter.progress(0);
        reporter.log(LogLevel::Info, "Starting download...");
        reporter.log(
            LogLevel::Info,
            format!(
                "Target system: {} {} ({})",
                settings.target_system,
                settings.target_system_version,
                settings.target_architecture
            ),
        );
        reporter.log(
            LogLevel::Info,
            format!("{} package(s) selected", request.packages.len()),
        );

        for step in (0..=100u8).step_by(10) {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    reporter.log(LogLevel::Warning, "Download cancelled");
                    return DownloadOutcome::Cancelled;
                }
                _ = tokio::time::sleep(self.step_delay) => {}
            }

            reporter.progress(step);
            match step {
                30 => reporter.log(LogLevel::Info, "Analyzing dependencies..."),
                60 => reporter.log(
                    LogLevel::Success,
                    "Dependency analysis finished, starting download",
                ),
                90 => reporter.log(LogLevel::Info, "Download finished, packing..."),
                _ => {}
            }
        }

        let output_path = output_path(
            &settings.save_directory,
            OffsetDateTime::now_utc(),
            settings.package_format,
        );

        reporter.log(LogLevel::Success, "Packing finished!");
        reporter.log(LogLevel::Success, format!("Output path: {output_path}"));

        DownloadOutcome::Succeeded { output_path }
    }
}

/// `<save_dir>/kylin-packages-<timestamp>.<ext>`, the timestamp being the
/// UTC ISO-8601 time with `:` and `.` replaced by `-`
pub fn output_path(save_dir: &str, at: OffsetDateTime, format: PackageFormat) -> String {
    let stamp = at
        .to_offset(time::UtcOffset::UTC)
        .format(format_description!(
            "[year]-[month]-[day]T[hour]-[minute]-[second]-[subsecond digits:3]Z"
        ))
        .unwrap_or_else(|_| at.unix_timestamp().to_string());

    format!(
        "{}/kylin-packages-{}.{}",
        save_dir.trim_end_matches('/'),
        stamp,
        format.extension()
    )
}

struct Reporter {
    events: Option<UnboundedSender<DownloadEvent>>,
}

impl Reporter {
    fn progress(&self, percent: u8) {
        self.send(DownloadEvent::Progress(percent));
    }

    fn log(&self, level: LogLevel, message: impl Into<String>) {
        let entry = LogEntry::new(level, message);

        match level {
            LogLevel::Error => error!("{}", entry.message),
            LogLevel::Warning => warn!("{}", entry.message),
            LogLevel::Info | LogLevel::Success => debug!("{}", entry.message),
        }

        self.send(DownloadEvent::Log(entry));
    }

    fn fail(&self, reason: &str) -> DownloadOutcome {
        self.log(LogLevel::Error, format!("Download failed: {reason}"));
        DownloadOutcome::Failed {
            reason: reason.to_string(),
        }
    }

    fn send(&self, event: DownloadEvent) {
        // The consumer may have gone away, the run carries on regardless
        if let Some(events) = &self.events {
            let _ = events.send(event);
        }
    }
}

/// Clears the running flag however the run ends
struct RunningGuard<'a>(&'a AtomicBool);

impl<'a> RunningGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}
