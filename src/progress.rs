use indicatif::{ProgressBar, ProgressStyle};
use shoebox_library::batch::Observers;
use shoebox_library::{ItemUpdate, ProgressUpdate, TrackerItem};
use std::sync::{Arc, Mutex, PoisonError};

/// Progress bar plus the list of items that failed, fed by a run's
/// observers.
pub struct Reporter {
    bar: ProgressBar,
    failures: Arc<Mutex<Vec<(String, String)>>>,
}

impl Reporter {
    pub fn new(label: &'static str) -> Self {
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix} [{bar:30.cyan/dim}] {pos}/{len} ({eta} remaining)")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("━╸─");
        let bar = ProgressBar::new(0).with_style(style).with_prefix(label);
        Self { bar, failures: Arc::default() }
    }

    pub fn observers(&self) -> Observers {
        let bar = self.bar.clone();
        let failures = self.failures.clone();
        Observers {
            progress: Some(Arc::new(move |update: ProgressUpdate| {
                bar.set_length(update.total as u64);
                bar.set_position(update.current as u64);
            })),
            items: Some(Arc::new(move |update: ItemUpdate<'_>| {
                if let TrackerItem::Error { id, message } = update.current_item {
                    failures.lock().unwrap_or_else(PoisonError::into_inner).push((id.clone(), message.clone()));
                }
            })),
        }
    }

    /// Clear the bar and list every failed item.
    pub fn finish(&self) {
        self.bar.finish_and_clear();
        let failures = self.failures.lock().unwrap_or_else(PoisonError::into_inner);
        for (id, message) in failures.iter() {
            eprintln!("  failed: {id} ({message})");
        }
    }
}
