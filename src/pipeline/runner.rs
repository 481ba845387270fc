use crate::{
    models::{BatchReport, ItemOutcome, PipelineItem},
    pipeline::{
        notifier::{FailureAction, OperatorNotifier},
        stages::Pipeline,
    },
    services::{DescriptionGenerator, ImageGenerator},
};

/// Drives items through the pipeline one at a time, in input order.
pub struct BatchRunner<G, N> {
    pipeline: Pipeline<G>,
    notifier: N,
    describer: Option<Box<dyn DescriptionGenerator>>,
}

impl<G: ImageGenerator, N: OperatorNotifier> BatchRunner<G, N> {
    pub fn new(pipeline: Pipeline<G>, notifier: N) -> Self {
        Self {
            pipeline,
            notifier,
            describer: None,
        }
    }

    /// Item prompts are treated as slide text and rewritten by `describer`.
    pub fn with_describer(mut self, describer: Box<dyn DescriptionGenerator>) -> Self {
        self.describer = Some(describer);
        self
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub async fn run(&mut self, items: Vec<PipelineItem>) -> BatchReport {
        let mut report = BatchReport::new();
        log::info!("🚀 Starting batch {} with {} items", report.run_id, items.len());

        for (position, item) in items.into_iter().enumerate() {
            if position > 0 {
                self.pipeline.pause().await;
            }
            self.notifier.item_started(&item);

            let prompt = match self.prompt_for(&item).await {
                Some(prompt) => prompt,
                None => {
                    log::warn!("⚠️  Skipping item {} due to missing description.", item.index);
                    report.outcomes.push(ItemOutcome::Skipped {
                        index: item.index,
                        reason: "missing description".to_string(),
                    });
                    continue;
                }
            };

            match self.pipeline.process(&item, &prompt).await {
                Ok(outputs) => {
                    self.notifier.item_succeeded(&item, &outputs);
                    report.outcomes.push(ItemOutcome::Completed {
                        index: item.index,
                        outputs,
                    });
                }
                Err(failure) => {
                    let action = self.notifier.item_failed(&item, &failure.error);
                    report.outcomes.push(ItemOutcome::Failed {
                        index: item.index,
                        stage: failure.stage,
                        error: failure.error.to_string(),
                        outputs: failure.written,
                    });
                    if action == FailureAction::Stop {
                        report.stopped_early = true;
                        break;
                    }
                }
            }
        }

        log::info!(
            "🏁 Batch {} finished: {} succeeded, {} failed or skipped{}",
            report.run_id,
            report.succeeded(),
            report.failed(),
            if report.stopped_early { " (stopped early)" } else { "" }
        );
        report
    }

    async fn prompt_for(&self, item: &PipelineItem) -> Option<String> {
        let describer = match &self.describer {
            Some(describer) => describer,
            None => return Some(item.prompt.clone()),
        };

        log::info!("Processing slide {}:", item.index);
        log::info!("{}", item.prompt);

        match describer.describe(&item.prompt).await {
            Ok(description) => {
                log::info!("Generated Description: {}", description);
                Some(description)
            }
            Err(e) => {
                log::error!("❌ Description for slide {} failed: {}", item.index, e);
                None
            }
        }
    }
}
