use anyhow::{Result, bail};
use indicatif::{ProgressBar, ProgressStyle};
use offpack_engine::{
    DownloadEvent, DownloadOutcome, DownloadSummary, Downloader, LogEntry, LogLevel,
};
use offpack_storage::StateStore;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

pub async fn handle(store: &mut StateStore, step_delay: Duration) -> Result<()> {
    println!("{}", DownloadSummary::new(store.state(), &[]));
    println!();

    let pb = ProgressBar::new(100).with_style(progress_style());

    let (events_tx, mut events_rx) = mpsc::unbounded_channel();
    let printer = {
        let pb = pb.clone();
        tokio::spawn(async move {
            while let Some(event) = events_rx.recv().await {
                match event {
                    DownloadEvent::Progress(percent) => pb.set_position(percent.into()),
                    DownloadEvent::Log(entry) => print_log(&pb, &entry),
                }
            }
        })
    };

    let cancel = CancellationToken::new();
    let ctrl_c = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        })
    };

    let downloader = Downloader::new(step_delay);
    let outcome = downloader
        .run_and_record(store, Some(events_tx), cancel)
        .await;

    ctrl_c.abort();
    // The sender is gone once the run returns, so the printer drains and stops
    if let Err(e) = printer.await {
        tracing::warn!(error = %e, "Progress printer failed");
    }

    match outcome {
        DownloadOutcome::Succeeded { output_path } => {
            pb.finish_with_message("done");
            println!();
            println!("✓ Download complete: {}", output_path);
            Ok(())
        }
        DownloadOutcome::Cancelled => {
            pb.abandon_with_message("cancelled");
            println!("Cancelled.");
            Ok(())
        }
        DownloadOutcome::Failed { reason } => {
            pb.abandon();
            bail!("Download failed: {}", reason)
        }
    }
}

fn progress_style() -> ProgressStyle {
    ProgressStyle::with_template("{bar:40.cyan/blue} {pos:>3}% {msg}")
        .map(|style| style.progress_chars("=> "))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
}

fn log_line(entry: &LogEntry) -> String {
    let marker = match entry.level {
        LogLevel::Info => "·",
        LogLevel::Success => "✓",
        LogLevel::Warning => "!",
        LogLevel::Error => "✗",
    };
    format!("{} {}", marker, entry.message)
}

fn print_log(pb: &ProgressBar, entry: &LogEntry) {
    // A hidden bar (no terminal) drops its println output
    if pb.is_hidden() {
        println!("{}", log_line(entry));
    } else {
        pb.println(log_line(entry));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_line_markers() {
        assert_eq!(
            log_line(&LogEntry::new(LogLevel::Success, "Packing finished!")),
            "✓ Packing finished!"
        );
        assert_eq!(
            log_line(&LogEntry::new(LogLevel::Error, "Download failed: x")),
            "✗ Download failed: x"
        );
    }

    #[test]
    fn test_bar_tracks_reported_progress() {
        let pb = ProgressBar::hidden().with_style(progress_style());
        pb.set_length(100);

        for percent in [0u8, 30, 60, 100] {
            pb.set_position(percent.into());
        }
        assert_eq!(pb.position(), 100);
        assert_eq!(pb.length(), Some(100));
    }
}
