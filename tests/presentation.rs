mod common;

use common::write_pptx;
use drawbatch::{extract_slide_texts, BatchError, PromptSource};

#[test]
fn one_string_per_slide_in_presentation_order() {
    let dir = tempfile::tempdir().unwrap();
    let deck = dir.path().join("deck.pptx");
    write_pptx(
        &deck,
        &[
            vec!["Quarterly review", "Revenue up\nCosts down"],
            vec!["Team offsite"],
            vec![],
        ],
    );

    let slides = extract_slide_texts(&deck).unwrap();
    assert_eq!(slides.len(), 3);
    assert_eq!(slides[0], "Quarterly review\nRevenue up\nCosts down");
    assert_eq!(slides[1], "Team offsite");
    assert_eq!(slides[2], "");
}

#[test]
fn shape_text_is_trimmed() {
    let dir = tempfile::tempdir().unwrap();
    let deck = dir.path().join("deck.pptx");
    write_pptx(&deck, &[vec!["  padded  ", "next"]]);

    assert_eq!(extract_slide_texts(&deck).unwrap(), vec!["padded\nnext"]);
}

#[test]
fn not_a_zip_is_a_presentation_error() {
    let dir = tempfile::tempdir().unwrap();
    let deck = dir.path().join("deck.pptx");
    std::fs::write(&deck, b"this is not a zip archive").unwrap();

    let err = extract_slide_texts(&deck).unwrap_err();
    assert!(matches!(err, BatchError::PresentationError(_)));
}

#[test]
fn slide_source_picks_up_seed_images() {
    let dir = tempfile::tempdir().unwrap();
    let deck = dir.path().join("deck.pptx");
    write_pptx(&deck, &[vec!["one"], vec!["two"]]);
    std::fs::write(dir.path().join("slide_2_image.png"), b"seed").unwrap();

    let items = PromptSource::presentation(&deck, dir.path()).items().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].prompt, "one");
    assert!(items[0].seed_image.is_none());
    assert_eq!(items[1].seed_image, Some(dir.path().join("slide_2_image.png")));
}

#[test]
fn missing_presentation_aborts_before_any_item() {
    let dir = tempfile::tempdir().unwrap();
    let source = PromptSource::presentation(dir.path().join("missing.pptx"), dir.path());
    assert!(matches!(source.items(), Err(BatchError::FileNotFound(_))));
}
