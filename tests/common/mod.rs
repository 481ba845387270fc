//! Shared fixtures for integration tests.

#![allow(dead_code)]

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::{json, Value};
use std::{io::Write, path::Path};
use wiremock::{Match, Request, ResponseTemplate};
use zip::{write::FileOptions, ZipWriter};

pub const IMAGE_PATH: &str = "/sdapi/v1/img2img";
pub const CHAT_PATH: &str = "/v1/chat/completions";

pub fn b64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

pub fn images_response(bytes: &[u8]) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "images": [b64(bytes)] }))
}

pub fn chat_response(content: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "choices": [ { "message": { "role": "assistant", "content": content } } ]
    }))
}

pub fn json_body(request: &Request) -> Value {
    serde_json::from_slice(&request.body).unwrap_or(Value::Null)
}

/// Matches image requests by whether they carry an init image.
pub struct Img2Img(pub bool);

impl Match for Img2Img {
    fn matches(&self, request: &Request) -> bool {
        json_body(request).get("init_images").is_some() == self.0
    }
}

/// Writes a minimal `.pptx` whose slides hold the given shape texts.
/// Slides are stored in reverse archive order to exercise `sldIdLst` ordering.
pub fn write_pptx(path: &Path, slides: &[Vec<&str>]) {
    let file = std::fs::File::create(path).unwrap();
    let mut zip = ZipWriter::new(file);
    let options = FileOptions::default();

    let mut ids = String::new();
    let mut rels = String::new();
    for (i, _) in slides.iter().enumerate() {
        let n = i + 1;
        ids.push_str(&format!(r#"<p:sldId id="{}" r:id="rId{}"/>"#, 255 + n, n + 1));
        rels.push_str(&format!(
            r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="slides/slide{}.xml"/>"#,
            n + 1,
            n
        ));
    }

    zip.start_file("ppt/presentation.xml", options).unwrap();
    zip.write_all(
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:presentation xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:sldIdLst>{}</p:sldIdLst></p:presentation>"#,
            ids
        )
        .as_bytes(),
    )
    .unwrap();

    zip.start_file("ppt/_rels/presentation.xml.rels", options).unwrap();
    zip.write_all(
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster" Target="slideMasters/slideMaster1.xml"/>{}</Relationships>"#,
            rels
        )
        .as_bytes(),
    )
    .unwrap();

    for (i, shapes) in slides.iter().enumerate().rev() {
        let body: String = shapes
            .iter()
            .map(|text| {
                let paragraphs: String = text
                    .split('\n')
                    .map(|p| format!("<a:p><a:r><a:t>{}</a:t></a:r></a:p>", p))
                    .collect();
                format!("<p:sp><p:nvSpPr/><p:txBody><a:bodyPr/>{}</p:txBody></p:sp>", paragraphs)
            })
            .collect();
        zip.start_file(format!("ppt/slides/slide{}.xml", i + 1), options)
            .unwrap();
        zip.write_all(
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:cSld><p:spTree><p:nvGrpSpPr/><p:grpSpPr/>{}</p:spTree></p:cSld></p:sld>"#,
                body
            )
            .as_bytes(),
        )
        .unwrap();
    }

    zip.finish().unwrap();
}
