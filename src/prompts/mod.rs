pub mod presentation;
pub mod source;

pub use presentation::extract_slide_texts;
pub use source::PromptSource;
