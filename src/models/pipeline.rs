use serde::Serialize;
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineItem {
    pub index: usize, // 1-based
    pub prompt: String,
    pub seed_image: Option<PathBuf>,
}

impl PipelineItem {
    pub fn new(index: usize, prompt: impl Into<String>) -> Self {
        Self {
            index,
            prompt: prompt.into(),
            seed_image: None,
        }
    }

    pub fn with_seed_image(mut self, path: impl Into<PathBuf>) -> Self {
        self.seed_image = Some(path.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Describe,
    Generate,
    Refine,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Describe => "describe",
            Stage::Generate => "generated",
            Stage::Refine => "refined",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ItemOutcome {
    Completed { index: usize, outputs: Vec<PathBuf> },
    Skipped { index: usize, reason: String },
    /// `outputs` holds files written by earlier stages of the item.
    Failed {
        index: usize,
        stage: Stage,
        error: String,
        outputs: Vec<PathBuf>,
    },
}

impl ItemOutcome {
    pub fn index(&self) -> usize {
        match self {
            ItemOutcome::Completed { index, .. }
            | ItemOutcome::Skipped { index, .. }
            | ItemOutcome::Failed { index, .. } => *index,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ItemOutcome::Completed { .. })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub run_id: String,
    pub outcomes: Vec<ItemOutcome>,
    pub stopped_early: bool,
}

impl BatchReport {
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4().to_string(),
            outcomes: Vec::new(),
            stopped_early: false,
        }
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    /// Every file left on disk by the run, including first-pass images of
    /// items whose refinement failed.
    pub fn written_files(&self) -> Vec<PathBuf> {
        self.outcomes
            .iter()
            .filter_map(|o| match o {
                ItemOutcome::Completed { outputs, .. } | ItemOutcome::Failed { outputs, .. } => {
                    Some(outputs.clone())
                }
                ItemOutcome::Skipped { .. } => None,
            })
            .flatten()
            .collect()
    }
}

impl Default for BatchReport {
    fn default() -> Self {
        Self::new()
    }
}
