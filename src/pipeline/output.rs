use crate::{
    config::OutputNaming,
    error::{BatchError, Result},
    models::Stage,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::path::{Path, PathBuf};

const SLUG_CHARS: usize = 20;

/// Output file name for one stage of one item. Stage and index are always
/// part of the name so no two writes in a batch share a path.
pub fn output_file_name(naming: OutputNaming, index: usize, prompt: &str, stage: Stage) -> String {
    match naming {
        OutputNaming::Indexed => format!("image_{}_{}.png", index, stage.as_str()),
        OutputNaming::PromptSlug => format!(
            "image_{}_{}_{}.png",
            index,
            prompt_slug(prompt),
            stage.as_str()
        ),
    }
}

/// First characters of the prompt, safe for use in a file name.
pub fn prompt_slug(prompt: &str) -> String {
    prompt
        .trim()
        .chars()
        .take(SLUG_CHARS)
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

pub async fn write_image(dir: &Path, file_name: &str, bytes: &[u8]) -> Result<PathBuf> {
    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(file_name);
    tokio::fs::write(&path, bytes).await?;
    Ok(path)
}

pub async fn encode_image_file(path: &Path) -> Result<String> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(STANDARD.encode(bytes)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            log::error!("File not found: {}", path.display());
            Err(BatchError::FileNotFound(path.to_path_buf()))
        }
        Err(e) => Err(e.into()),
    }
}
