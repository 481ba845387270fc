use crate::{
    config::{PipelineConfig, PipelineMode},
    error::{BatchError, Result},
    logger,
    models::{GenerationRequest, InitImage, PipelineItem, Stage},
    pipeline::output::{encode_image_file, output_file_name, write_image},
    services::ImageGenerator,
};
use std::path::{Path, PathBuf};

/// A stage that failed, with the files earlier stages of the item wrote.
#[derive(Debug)]
pub struct StageFailure {
    pub stage: Stage,
    pub error: BatchError,
    pub written: Vec<PathBuf>,
}

impl StageFailure {
    fn new(stage: Stage, written: Vec<PathBuf>) -> impl FnOnce(BatchError) -> Self {
        move |error| Self {
            stage,
            error,
            written,
        }
    }
}

/// Stage-1 generation and Stage-2 refinement over one image generator.
pub struct Pipeline<G> {
    generator: G,
    config: PipelineConfig,
}

impl<G: ImageGenerator> Pipeline<G> {
    pub fn new(generator: G, config: PipelineConfig) -> Self {
        Self { generator, config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Text-to-image. Returns the path the decoded image was written to.
    pub async fn generate(&self, index: usize, prompt: &str) -> Result<PathBuf> {
        let request = self.config.generation.build_request(prompt, None);
        self.submit_and_save(&request, index, prompt, Stage::Generate)
            .await
    }

    /// img2img from an image on disk, using the configured denoising strength.
    pub async fn refine(&self, index: usize, prompt: &str, seed_image: &Path) -> Result<PathBuf> {
        let encoded = encode_image_file(seed_image).await?;
        let init = InitImage::new(encoded, self.config.denoising_strength);
        let request = self.config.refinement.build_request(prompt, Some(init));
        self.submit_and_save(&request, index, prompt, Stage::Refine)
            .await
    }

    /// Runs one item through the configured mode. Files already written
    /// stay on disk and are listed in the failure.
    pub async fn process(
        &self,
        item: &PipelineItem,
        prompt: &str,
    ) -> std::result::Result<Vec<PathBuf>, StageFailure> {
        match self.config.mode {
            PipelineMode::Single => {
                let written = match &item.seed_image {
                    Some(seed) => self
                        .refine(item.index, prompt, seed)
                        .await
                        .map_err(StageFailure::new(Stage::Refine, Vec::new()))?,
                    None => self
                        .generate(item.index, prompt)
                        .await
                        .map_err(StageFailure::new(Stage::Generate, Vec::new()))?,
                };
                Ok(vec![written])
            }
            PipelineMode::Chained => {
                log::info!("🔄 Generating image {}...", item.index);
                let first = self
                    .generate(item.index, prompt)
                    .await
                    .map_err(StageFailure::new(Stage::Generate, Vec::new()))?;
                log::info!("✅ Image {} generated at: {}", item.index, first.display());

                self.pause().await;

                log::info!("🔄 Refining image {}...", item.index);
                let second = self
                    .refine(item.index, prompt, &first)
                    .await
                    .map_err(StageFailure::new(Stage::Refine, vec![first.clone()]))?;
                Ok(vec![first, second])
            }
        }
    }

    pub async fn pause(&self) {
        if !self.config.stage_pause.is_zero() {
            tokio::time::sleep(self.config.stage_pause).await;
        }
    }

    async fn submit_and_save(
        &self,
        request: &GenerationRequest,
        index: usize,
        prompt: &str,
        stage: Stage,
    ) -> Result<PathBuf> {
        let _timer = logger::timer(&format!("item {} {}", index, stage.as_str()));
        let image = self.generator.generate(request).await?;
        let file_name = output_file_name(self.config.naming, index, prompt, stage);
        write_image(&self.config.output_dir, &file_name, &image.bytes).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GeneratedImage;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Returns the prompt bytes for text-to-image and the strength for img2img.
    struct RecordingGenerator {
        requests: Mutex<Vec<GenerationRequest>>,
        fail_refine: bool,
    }

    #[async_trait]
    impl ImageGenerator for RecordingGenerator {
        async fn generate(&self, request: &GenerationRequest) -> Result<GeneratedImage> {
            if let Ok(mut requests) = self.requests.lock() {
                requests.push(request.clone());
            }
            if request.is_img2img() && self.fail_refine {
                return Err(BatchError::EmptyResult("No images generated".into()));
            }
            let bytes = match request.denoising_strength() {
                Some(strength) => format!("refined@{}", strength).into_bytes(),
                None => request.prompt.clone().into_bytes(),
            };
            Ok(GeneratedImage {
                bytes,
                model: request.model.clone(),
            })
        }
    }

    fn pipeline(dir: &Path, mode: PipelineMode, fail_refine: bool) -> Pipeline<RecordingGenerator> {
        let config = PipelineConfig::chained()
            .with_mode(mode)
            .with_output_dir(dir)
            .with_stage_pause(std::time::Duration::ZERO);
        Pipeline::new(
            RecordingGenerator {
                requests: Mutex::new(Vec::new()),
                fail_refine,
            },
            config,
        )
    }

    #[tokio::test]
    async fn chained_writes_both_stages() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = pipeline(dir.path(), PipelineMode::Chained, false);
        let item = PipelineItem::new(1, "dog");

        let written = pipeline.process(&item, "dog").await.unwrap();
        assert_eq!(written.len(), 2);
        assert_eq!(std::fs::read(&written[0]).unwrap(), b"dog");
        assert_eq!(std::fs::read(&written[1]).unwrap(), b"refined@0.6");

        let requests = pipeline.generator.requests.lock().unwrap();
        assert_eq!(requests[0].model.as_deref(), Some(crate::config::SD3_TURBO_MODEL));
        assert_eq!(requests[1].model.as_deref(), Some(crate::config::SDXL_BASE_MODEL));
        assert!(requests[1].is_img2img());
    }

    #[tokio::test]
    async fn refine_failure_keeps_first_pass() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = pipeline(dir.path(), PipelineMode::Chained, true);

        let failure = pipeline
            .process(&PipelineItem::new(2, "cat"), "cat")
            .await
            .unwrap_err();
        assert_eq!(failure.stage, Stage::Refine);
        assert!(matches!(failure.error, BatchError::EmptyResult(_)));
        let first_pass = dir.path().join("image_2_cat_generated.png");
        assert!(first_pass.exists());
        assert_eq!(failure.written, vec![first_pass]);
    }

    #[tokio::test]
    async fn single_mode_uses_seed_when_present() {
        let dir = tempfile::tempdir().unwrap();
        let seed = dir.path().join("image_1.png");
        std::fs::write(&seed, b"seed").unwrap();
        let pipeline = pipeline(dir.path(), PipelineMode::Single, false);

        let with_seed = PipelineItem::new(1, "dog").with_seed_image(&seed);
        let written = pipeline.process(&with_seed, "dog").await.unwrap();
        assert_eq!(written.len(), 1);
        assert_eq!(std::fs::read(&written[0]).unwrap(), b"refined@0.6");

        let requests = pipeline.generator.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].init_image.as_ref().unwrap().images[0], "c2VlZA==");
    }

    #[tokio::test]
    async fn vanished_seed_fails_the_refine_stage() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = pipeline(dir.path(), PipelineMode::Single, false);
        let item = PipelineItem::new(1, "dog").with_seed_image(dir.path().join("gone.png"));

        let failure = pipeline.process(&item, "dog").await.unwrap_err();
        assert_eq!(failure.stage, Stage::Refine);
        assert!(matches!(failure.error, BatchError::FileNotFound(_)));
        assert!(failure.written.is_empty());
    }
}
