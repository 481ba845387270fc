use crate::{error::BatchError, models::PipelineItem};
use std::{
    io::{BufRead, Write},
    path::{Path, PathBuf},
    process::Command,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureAction {
    Continue,
    Stop,
}

/// Console-facing side of the batch: progress and failure handling.
pub trait OperatorNotifier {
    fn item_started(&mut self, item: &PipelineItem) {
        log::info!("--- PROCESSING ITEM {} ---", item.index);
    }

    fn item_succeeded(&mut self, item: &PipelineItem, outputs: &[PathBuf]);

    fn item_failed(&mut self, item: &PipelineItem, error: &BatchError) -> FailureAction;
}

/// Logs outcomes and keeps going.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl OperatorNotifier for LogNotifier {
    fn item_succeeded(&mut self, item: &PipelineItem, outputs: &[PathBuf]) {
        for path in outputs {
            log::info!("✅ Image for item {} saved at: {}", item.index, path.display());
        }
    }

    fn item_failed(&mut self, item: &PipelineItem, error: &BatchError) -> FailureAction {
        log::error!("❌ Failed to generate image for item {}: {}", item.index, error);
        FailureAction::Continue
    }
}

/// Asks the operator what to do after a failure. Answering `y` opens the
/// model folder so LoRA file names can be checked; every answer stops the
/// batch.
pub struct InteractiveNotifier<R, W> {
    input: R,
    output: W,
    models_dir: Option<PathBuf>,
    open_folder: fn(&Path) -> std::io::Result<()>,
}

impl<R: BufRead, W: Write> InteractiveNotifier<R, W> {
    /// `models_dir` is `None` when the model folder cannot be located; a
    /// `y` answer then only stops the batch.
    pub fn new(input: R, output: W, models_dir: Option<PathBuf>) -> Self {
        Self {
            input,
            output,
            models_dir,
            open_folder: open_in_file_browser,
        }
    }

    pub fn with_folder_opener(mut self, opener: fn(&Path) -> std::io::Result<()>) -> Self {
        self.open_folder = opener;
        self
    }

    fn ask(&mut self) -> Option<String> {
        let _ = write!(
            self.output,
            "Do you want to open the model folder to manually get the filenames? (y/n): "
        );
        let _ = self.output.flush();

        let mut answer = String::new();
        match self.input.read_line(&mut answer) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(answer.trim().to_lowercase()),
        }
    }
}

impl<R: BufRead, W: Write> OperatorNotifier for InteractiveNotifier<R, W> {
    fn item_succeeded(&mut self, item: &PipelineItem, outputs: &[PathBuf]) {
        LogNotifier.item_succeeded(item, outputs);
    }

    fn item_failed(&mut self, item: &PipelineItem, error: &BatchError) -> FailureAction {
        log::error!("❌ Failed to generate image for item {}: {}", item.index, error);

        match self.ask().as_deref() {
            Some("y") => match &self.models_dir {
                Some(dir) => {
                    log::info!("📂 Opening {}", dir.display());
                    if let Err(e) = (self.open_folder)(dir) {
                        log::error!("❌ Could not open {}: {}", dir.display(), e);
                    }
                }
                None => log::warn!("⚠️  No home directory found, cannot locate the model folder."),
            },
            Some("n") => log::info!("Exiting the batch."),
            _ => log::warn!("⚠️  Invalid input. Exiting the batch."),
        }
        FailureAction::Stop
    }
}

pub fn open_in_file_browser(path: &Path) -> std::io::Result<()> {
    let program = if cfg!(target_os = "macos") {
        "open"
    } else if cfg!(target_os = "windows") {
        "explorer"
    } else {
        "xdg-open"
    };
    Command::new(program).arg(path).spawn().map(|_| ())
}
