use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lora {
    pub file: String,
    pub weight: f32,
}

impl Lora {
    pub fn new(file: impl Into<String>, weight: f32) -> Self {
        Self {
            file: file.into(),
            weight,
        }
    }
}

/// Seed image for img2img. Carrying the strength here keeps the two fields
/// from ever appearing apart in a request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitImage {
    #[serde(rename = "init_images")]
    pub images: Vec<String>, // Base64 encoded, exactly one entry
    pub denoising_strength: f32,
}

impl InitImage {
    pub fn new(base64_image: String, denoising_strength: f32) -> Self {
        Self {
            images: vec![base64_image],
            denoising_strength,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub prompt: String,
    pub negative_prompt: String,
    pub seed: i64,
    pub steps: u32,
    pub guidance_scale: f32,
    pub batch_count: u32,
    #[serde(rename = "sampler_name", skip_serializing_if = "Option::is_none")]
    pub sampler: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub loras: Vec<Lora>,
    #[serde(flatten)]
    pub init_image: Option<InitImage>,
}

impl GenerationRequest {
    pub fn is_img2img(&self) -> bool {
        self.init_image.is_some()
    }

    pub fn denoising_strength(&self) -> Option<f32> {
        self.init_image.as_ref().map(|i| i.denoising_strength)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationResult {
    #[serde(default)]
    pub images: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct GeneratedImage {
    pub bytes: Vec<u8>,
    pub model: Option<String>,
}
