use crate::{
    error::Result,
    models::PipelineItem,
    prompts::presentation::extract_slide_texts,
};
use std::path::{Path, PathBuf};

/// Where the prompts for a batch come from.
#[derive(Debug, Clone)]
pub enum PromptSource {
    /// A fixed list of prompts, no seed images.
    Fixed(Vec<String>),
    /// One prompt repeated over `image_1.png ..= image_{count}.png` in `dir`.
    /// Indices without a file on disk fall back to text-to-image.
    NumberedImages {
        dir: PathBuf,
        prompt: String,
        count: usize,
    },
    /// Slide text from a presentation, with optional `slide_{n}_image.png`
    /// seeds in `seed_dir`.
    Presentation { path: PathBuf, seed_dir: PathBuf },
}

impl PromptSource {
    pub fn fixed<I, S>(prompts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        PromptSource::Fixed(prompts.into_iter().map(Into::into).collect())
    }

    pub fn numbered(dir: impl Into<PathBuf>, prompt: impl Into<String>, count: usize) -> Self {
        PromptSource::NumberedImages {
            dir: dir.into(),
            prompt: prompt.into(),
            count,
        }
    }

    pub fn presentation(path: impl Into<PathBuf>, seed_dir: impl Into<PathBuf>) -> Self {
        PromptSource::Presentation {
            path: path.into(),
            seed_dir: seed_dir.into(),
        }
    }

    /// Materialises the items. A missing presentation fails the whole run.
    pub fn items(&self) -> Result<Vec<PipelineItem>> {
        match self {
            PromptSource::Fixed(prompts) => Ok(prompts
                .iter()
                .enumerate()
                .map(|(i, prompt)| PipelineItem::new(i + 1, prompt.clone()))
                .collect()),
            PromptSource::NumberedImages { dir, prompt, count } => Ok((1..=*count)
                .map(|index| {
                    let item = PipelineItem::new(index, prompt.clone());
                    attach_if_exists(item, dir.join(format!("image_{}.png", index)))
                })
                .collect()),
            PromptSource::Presentation { path, seed_dir } => {
                let slides = extract_slide_texts(path)?;
                log::info!("📑 Extracted {} slides from {}", slides.len(), path.display());
                Ok(slides
                    .into_iter()
                    .enumerate()
                    .map(|(i, text)| {
                        let index = i + 1;
                        let item = PipelineItem::new(index, text);
                        attach_if_exists(item, seed_image_for_slide(seed_dir, index))
                    })
                    .collect())
            }
        }
    }

    /// Slide text has to go through the language model before it is a prompt.
    pub fn needs_description(&self) -> bool {
        matches!(self, PromptSource::Presentation { .. })
    }
}

pub fn seed_image_for_slide(seed_dir: &Path, index: usize) -> PathBuf {
    seed_dir.join(format!("slide_{}_image.png", index))
}

fn attach_if_exists(item: PipelineItem, seed: PathBuf) -> PipelineItem {
    if seed.is_file() {
        log::debug!("Using seed image {}", seed.display());
        item.with_seed_image(seed)
    } else {
        item
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn fixed_prompts_are_numbered_from_one() {
        let items = PromptSource::fixed(["a", "b"]).items().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0], PipelineItem::new(1, "a"));
        assert_eq!(items[1].index, 2);
        assert!(items.iter().all(|i| i.seed_image.is_none()));
    }

    #[test]
    fn numbered_source_attaches_only_existing_seeds() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("image_2.png"), b"png").unwrap();

        let items = PromptSource::numbered(dir.path(), "dog", 3).items().unwrap();
        assert_eq!(items.len(), 3);
        assert!(items[0].seed_image.is_none());
        assert_eq!(items[1].seed_image, Some(dir.path().join("image_2.png")));
        assert!(items[2].seed_image.is_none());
        assert!(items.iter().all(|i| i.prompt == "dog"));
    }

    #[test]
    fn missing_presentation_aborts() {
        let source = PromptSource::presentation("/no/such/deck.pptx", "/tmp");
        assert!(source.items().is_err());
        assert!(source.needs_description());
    }
}
