use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use sasab::engine::progress::{Progress, ProgressCallback};
use std::sync::{Arc, Mutex};
use tracing::warn;

/// Drives an indicatif bar from batch progress events and prints one
/// `Processing <input> → <output>` line per file to stdout, followed by the
/// reason when a file fails.
#[derive(Clone)]
pub struct CliProgressHandler {
    pb: Arc<Mutex<ProgressBar>>,
}

impl CliProgressHandler {
    pub fn new() -> Self {
        Self::with_draw_target(ProgressDrawTarget::stderr())
    }

    pub fn with_draw_target(target: ProgressDrawTarget) -> Self {
        let pb = ProgressBar::new(0).with_style(Self::bar_style());
        pb.set_draw_target(target);
        pb.finish_and_clear();

        Self {
            pb: Arc::new(Mutex::new(pb)),
        }
    }

    pub fn get_callback(&self) -> ProgressCallback<'static> {
        let pb_clone = self.pb.clone();

        Box::new(move |progress: Progress| {
            let Ok(pb_guard) = pb_clone.lock() else {
                warn!("Progress bar mutex was poisoned. Cannot update progress.");
                return;
            };

            match progress {
                Progress::BatchStart { total_files } => {
                    pb_guard.reset();
                    pb_guard.set_length(total_files);
                    pb_guard.set_position(0);
                    pb_guard.set_message("Annotating");
                }
                Progress::FileStart {
                    file_name,
                    output_name,
                } => {
                    pb_guard.suspend(|| println!("Processing {} → {}", file_name, output_name));
                    pb_guard.set_message(file_name);
                }
                Progress::FileFinish { succeeded } => {
                    if !succeeded {
                        pb_guard.suspend(|| println!("  ✗ failed"));
                    }
                    pb_guard.inc(1);
                }
                Progress::BatchFinish => {
                    pb_guard.finish_with_message("✓ Done");
                }
                Progress::Message(msg) => {
                    pb_guard.suspend(|| println!("  {}", msg));
                }
            }
        })
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::with_template("{msg:<24} [{bar:40.cyan/blue}] {pos}/{len}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("##-")
    }
}

impl Default for CliProgressHandler {
    fn default() -> Self {
        Self::new()
    }
}
