use crate::{
    error::{BatchError, Result},
    models::{GenerationRequest, InitImage, Lora},
};
use std::{env, path::PathBuf, str::FromStr, time::Duration};

pub const DEFAULT_IMAGE_ENDPOINT: &str = "http://127.0.0.1:7860/sdapi/v1/img2img";
pub const DEFAULT_LM_ENDPOINT: &str = "http://localhost:1234/v1/chat/completions";
pub const DEFAULT_NEGATIVE_PROMPT: &str =
    "(bokeh, worst quality, low quality, normal quality, (variations):1.4), blur:1.5";
pub const DEFAULT_DESCRIPTION_INSTRUCTION: &str = "Do not chat. Answer precisely. Using the context of the PowerPoint slide, come up with a description of a fitting image.";

pub const SD3_TURBO_MODEL: &str = "SD3 Large Turbo 3.5 (8-bit)";
pub const SDXL_BASE_MODEL: &str = "SDXL Base v1.0 (8-bit)";

/// Directory where Draw Things keeps its models and LoRAs on macOS.
/// `None` when the home directory cannot be determined.
pub fn draw_things_models_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| {
        home.join("Library")
            .join("Containers")
            .join("com.liuliu.draw-things")
            .join("Data")
            .join("Documents")
            .join("Models")
    })
}

pub fn default_downloads_dir() -> PathBuf {
    dirs::download_dir().unwrap_or_else(env::temp_dir)
}

pub fn default_output_dir() -> PathBuf {
    default_downloads_dir().join("img2img")
}

pub fn default_loras() -> Vec<Lora> {
    vec![
        Lora::new("dmd2_sdxl_4_step_lora_f16.ckpt", 1.0),
        Lora::new("ronyellow_300_ema_0,050_lora_f32.ckpt", 1.0),
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineMode {
    /// img2img when the item has a seed image, text-to-image otherwise.
    Single,
    /// Text-to-image, then img2img on the first pass output.
    Chained,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputNaming {
    Indexed,
    PromptSlug,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationSettings {
    pub model: Option<String>,
    pub sampler: Option<String>,
    pub steps: u32,
    pub guidance_scale: f32,
    pub seed: i64,
    pub negative_prompt: String,
    pub batch_count: u32,
    pub loras: Vec<Lora>,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        GenerationSettings {
            model: None,
            sampler: None,
            steps: 4,
            guidance_scale: 10.0,
            seed: -1,
            negative_prompt: DEFAULT_NEGATIVE_PROMPT.to_string(),
            batch_count: 1,
            loras: Vec::new(),
        }
    }
}

impl GenerationSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_sampler(mut self, sampler: impl Into<String>) -> Self {
        self.sampler = Some(sampler.into());
        self
    }

    pub fn with_steps(mut self, steps: u32) -> Self {
        self.steps = steps;
        self
    }

    pub fn with_guidance_scale(mut self, guidance_scale: f32) -> Self {
        self.guidance_scale = guidance_scale;
        self
    }

    pub fn with_seed(mut self, seed: i64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_loras(mut self, loras: Vec<Lora>) -> Self {
        self.loras = loras;
        self
    }

    /// Builds the wire request. LoRA entries without a file name are dropped.
    pub fn build_request(&self, prompt: &str, init_image: Option<InitImage>) -> GenerationRequest {
        let loras = self
            .loras
            .iter()
            .filter(|lora| {
                let keep = !lora.file.trim().is_empty();
                if !keep {
                    log::warn!("⚠️  Dropping LoRA entry with an empty file name");
                }
                keep
            })
            .cloned()
            .collect();

        GenerationRequest {
            prompt: prompt.to_string(),
            negative_prompt: self.negative_prompt.clone(),
            seed: self.seed,
            steps: self.steps,
            guidance_scale: self.guidance_scale,
            batch_count: self.batch_count,
            sampler: self.sampler.clone(),
            model: self.model.clone(),
            loras,
            init_image,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LanguageModelConfig {
    pub endpoint: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub system_prompt: String,
}

impl Default for LanguageModelConfig {
    fn default() -> Self {
        LanguageModelConfig {
            endpoint: DEFAULT_LM_ENDPOINT.to_string(),
            model: "gemma-3-12b-it".to_string(),
            temperature: 0.1,
            max_tokens: 500,
            system_prompt: DEFAULT_DESCRIPTION_INSTRUCTION.to_string(),
        }
    }
}

impl LanguageModelConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub image_endpoint: String,
    pub output_dir: PathBuf,
    pub naming: OutputNaming,
    pub mode: PipelineMode,
    pub generation: GenerationSettings,
    pub refinement: GenerationSettings,
    pub denoising_strength: f32,
    pub stage_pause: Duration,
    pub language_model: LanguageModelConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            image_endpoint: DEFAULT_IMAGE_ENDPOINT.to_string(),
            output_dir: default_output_dir(),
            naming: OutputNaming::Indexed,
            mode: PipelineMode::Single,
            generation: GenerationSettings::default(),
            refinement: GenerationSettings::default(),
            denoising_strength: 0.6,
            stage_pause: Duration::ZERO,
            language_model: LanguageModelConfig::default(),
        }
    }
}

impl PipelineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// SD3 Large Turbo first pass refined by SDXL Base with the LCM sampler.
    pub fn chained() -> Self {
        let stage = GenerationSettings::new()
            .with_sampler("LCM")
            .with_loras(default_loras());
        Self {
            naming: OutputNaming::PromptSlug,
            mode: PipelineMode::Chained,
            generation: stage.clone().with_model(SD3_TURBO_MODEL),
            refinement: stage.with_model(SDXL_BASE_MODEL),
            denoising_strength: 0.6,
            stage_pause: Duration::from_secs(1),
            ..Default::default()
        }
    }

    /// img2img over numbered seed images with SDXL.
    pub fn numbered() -> Self {
        let stage = GenerationSettings::new()
            .with_sampler("LCM")
            .with_model(SDXL_BASE_MODEL)
            .with_loras(vec![Lora::new("dmd2_sdxl_4_step_lora_f16.ckpt", 1.0)]);
        Self {
            generation: stage.clone(),
            refinement: stage,
            denoising_strength: 0.6,
            ..Default::default()
        }
    }

    /// Slide-driven prompts: fixed seed and a stronger refinement.
    pub fn slides() -> Self {
        let stage = GenerationSettings::new().with_seed(4068245935);
        Self {
            generation: stage.clone(),
            refinement: stage,
            denoising_strength: 0.75,
            ..Default::default()
        }
    }

    pub fn with_image_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.image_endpoint = endpoint.into();
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn with_naming(mut self, naming: OutputNaming) -> Self {
        self.naming = naming;
        self
    }

    pub fn with_mode(mut self, mode: PipelineMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_generation(mut self, settings: GenerationSettings) -> Self {
        self.generation = settings;
        self
    }

    pub fn with_refinement(mut self, settings: GenerationSettings) -> Self {
        self.refinement = settings;
        self
    }

    pub fn with_denoising_strength(mut self, strength: f32) -> Self {
        self.denoising_strength = strength;
        self
    }

    pub fn with_stage_pause(mut self, pause: Duration) -> Self {
        self.stage_pause = pause;
        self
    }

    pub fn with_language_model(mut self, config: LanguageModelConfig) -> Self {
        self.language_model = config;
        self
    }

    /// Applies `DRAWTHINGS_*` and `LM_STUDIO_*` overrides on top of a preset.
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides(|key| env::var(key).ok())
    }

    /// Same as [`with_env_overrides`](Self::with_env_overrides) with the
    /// variables read through `lookup`. A value that does not parse is a
    /// `ConfigError`.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("DRAWTHINGS_URL") {
            self.image_endpoint = url;
        }
        if let Some(dir) = lookup("DRAWTHINGS_OUTPUT_DIR") {
            self.output_dir = PathBuf::from(dir);
        }
        if let Some(steps) = parse_var::<u32>("DRAWTHINGS_STEPS", lookup("DRAWTHINGS_STEPS"))? {
            self.generation.steps = steps;
            self.refinement.steps = steps;
        }
        if let Some(scale) =
            parse_var::<f32>("DRAWTHINGS_GUIDANCE_SCALE", lookup("DRAWTHINGS_GUIDANCE_SCALE"))?
        {
            self.generation.guidance_scale = scale;
            self.refinement.guidance_scale = scale;
        }
        if let Some(seed) = parse_var::<i64>("DRAWTHINGS_SEED", lookup("DRAWTHINGS_SEED"))? {
            self.generation.seed = seed;
            self.refinement.seed = seed;
        }
        if let Some(strength) = parse_var::<f32>(
            "DRAWTHINGS_DENOISING_STRENGTH",
            lookup("DRAWTHINGS_DENOISING_STRENGTH"),
        )? {
            self.denoising_strength = strength;
        }
        if let Some(model) = lookup("DRAWTHINGS_MODEL") {
            self.generation.model = Some(model);
        }
        if let Some(model) = lookup("DRAWTHINGS_REFINE_MODEL") {
            self.refinement.model = Some(model);
        }
        if let Some(endpoint) = lookup("LM_STUDIO_URL") {
            self.language_model.endpoint = endpoint;
        }
        if let Some(model) = lookup("LM_STUDIO_MODEL") {
            self.language_model.model = model;
        }
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.denoising_strength > 0.0 && self.denoising_strength <= 1.0) {
            return Err(BatchError::ConfigError(format!(
                "denoising strength must be in (0, 1], got {}",
                self.denoising_strength
            )));
        }
        if self.generation.steps == 0 || self.refinement.steps == 0 {
            return Err(BatchError::ConfigError("steps must be at least 1".into()));
        }
        if self.image_endpoint.trim().is_empty() {
            return Err(BatchError::ConfigError("image endpoint is empty".into()));
        }
        Ok(())
    }
}

/// Parses the raw value of variable `key`, if set.
pub fn parse_var<T: FromStr>(key: &str, raw: Option<String>) -> Result<Option<T>> {
    match raw {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| BatchError::ConfigError(format!("{} has an invalid value: {}", key, raw))),
        None => Ok(None),
    }
}
