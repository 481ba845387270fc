//! Slide text extraction from `.pptx` archives.
//!
//! Slides are read in presentation order (`sldIdLst`), not archive order.
//! Only top-level shapes of each slide's shape tree contribute text; group
//! members, pictures and tables are skipped.

use crate::error::{BatchError, Result};
use quick_xml::{events::Event, Reader};
use std::{
    collections::HashMap,
    fs::File,
    io::{Read, Seek},
    path::Path,
};
use zip::ZipArchive;

const PRESENTATION_PART: &str = "ppt/presentation.xml";
const PRESENTATION_RELS_PART: &str = "ppt/_rels/presentation.xml.rels";

/// Returns one string per slide: the text of each text-bearing shape,
/// trimmed and joined with `\n`.
pub fn extract_slide_texts(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(BatchError::FileNotFound(path.to_path_buf()));
    }

    let file = File::open(path)?;
    let mut archive = ZipArchive::new(file)?;

    let slide_parts = slide_part_names(&mut archive)?;
    log::debug!("Presentation {} has {} slides", path.display(), slide_parts.len());

    slide_parts
        .iter()
        .map(|part| {
            let xml = read_part(&mut archive, part)?;
            let shapes = shape_texts(&xml)?;
            Ok(shapes.join("\n"))
        })
        .collect()
}

fn read_part<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &str) -> Result<String> {
    let mut part = archive.by_name(name).map_err(|e| {
        BatchError::PresentationError(format!("missing part {}: {}", name, e))
    })?;
    let mut xml = String::new();
    part.read_to_string(&mut xml)?;
    Ok(xml)
}

/// Archive paths of the slide parts in presentation order.
fn slide_part_names<R: Read + Seek>(archive: &mut ZipArchive<R>) -> Result<Vec<String>> {
    let rels_xml = read_part(archive, PRESENTATION_RELS_PART)?;
    let targets = relationship_targets(&rels_xml)?;

    let presentation_xml = read_part(archive, PRESENTATION_PART)?;
    let ids = slide_relationship_ids(&presentation_xml)?;

    ids.iter()
        .map(|id| {
            targets
                .get(id)
                .map(|target| resolve_target(target))
                .ok_or_else(|| {
                    BatchError::PresentationError(format!("unresolved slide relationship {}", id))
                })
        })
        .collect()
}

fn resolve_target(target: &str) -> String {
    match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("ppt/{}", target),
    }
}

fn relationship_targets(xml: &str) -> Result<HashMap<String, String>> {
    let mut reader = Reader::from_str(xml);
    let mut targets = HashMap::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"Relationship" => {
                let mut id = None;
                let mut target = None;
                for attr in e.attributes() {
                    let attr = attr.map_err(|e| BatchError::PresentationError(e.to_string()))?;
                    let value = attr.unescape_value()?.into_owned();
                    match attr.key.as_ref() {
                        b"Id" => id = Some(value),
                        b"Target" => target = Some(value),
                        _ => {}
                    }
                }
                if let (Some(id), Some(target)) = (id, target) {
                    targets.insert(id, target);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(targets)
}

fn slide_relationship_ids(xml: &str) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(xml);
    let mut ids = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"sldId" => {
                for attr in e.attributes() {
                    let attr = attr.map_err(|e| BatchError::PresentationError(e.to_string()))?;
                    // r:id, not the numeric id
                    if attr.key.prefix().is_some() && attr.key.local_name().as_ref() == b"id" {
                        ids.push(attr.unescape_value()?.into_owned());
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(ids)
}

#[derive(Default)]
struct ShapeText {
    paragraphs: Vec<String>,
}

impl ShapeText {
    fn current(&mut self) -> &mut String {
        if self.paragraphs.is_empty() {
            self.paragraphs.push(String::new());
        }
        let last = self.paragraphs.len() - 1;
        &mut self.paragraphs[last]
    }

    fn finish(self) -> String {
        self.paragraphs.join("\n").trim().to_string()
    }
}

/// Text of each top-level `p:sp` in a slide part, in document order.
fn shape_texts(xml: &str) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<Vec<u8>> = Vec::new();
    let mut shape: Option<(usize, ShapeText)> = None;
    let mut in_run_text = false;
    let mut texts = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let name = e.local_name().as_ref().to_vec();
                if shape.is_none() && name == b"sp" && is_top_level(&stack) {
                    shape = Some((stack.len(), ShapeText::default()));
                } else if let Some((_, text)) = shape.as_mut() {
                    match name.as_slice() {
                        b"p" => text.paragraphs.push(String::new()),
                        b"t" => in_run_text = true,
                        _ => {}
                    }
                }
                stack.push(name);
            }
            Event::Empty(e) => {
                let name = e.local_name();
                if shape.is_none() && name.as_ref() == b"sp" && is_top_level(&stack) {
                    texts.push(String::new());
                } else if let Some((_, text)) = shape.as_mut() {
                    match name.as_ref() {
                        b"p" => text.paragraphs.push(String::new()),
                        b"br" => text.current().push('\n'),
                        _ => {}
                    }
                }
            }
            Event::Text(e) if in_run_text => {
                if let Some((_, text)) = &mut shape {
                    text.current().push_str(&e.unescape()?);
                }
            }
            Event::End(e) => {
                stack.pop();
                let name = e.local_name();
                if name.as_ref() == b"t" {
                    in_run_text = false;
                }
                if name.as_ref() == b"sp" && matches!(&shape, Some((depth, _)) if *depth == stack.len()) {
                    if let Some((_, text)) = shape.take() {
                        texts.push(text.finish());
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(texts)
}

fn is_top_level(stack: &[Vec<u8>]) -> bool {
    stack.last().map(|n| n.as_slice()) == Some(b"spTree".as_slice())
        && stack.len() >= 2
        && stack[stack.len() - 2].as_slice() == b"cSld"
}
