//! PDF text extraction
//!
//! Extracts page text with lopdf. Pages lopdf cannot decode fall back to a
//! scan of the raw content stream for text-showing operators.

use super::PdfTextDecoder;
use crate::errors::ExtractionError;
use tracing::{debug, instrument, warn};

#[derive(Debug, Default, Clone, Copy)]
pub struct LopdfTextDecoder;

impl LopdfTextDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl PdfTextDecoder for LopdfTextDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<String, ExtractionError> {
        extract_text_from_pdf(bytes)
    }
}

/// Extract text from PDF bytes, page by page
#[instrument(skip(bytes), fields(size = bytes.len()))]
pub fn extract_text_from_pdf(bytes: &[u8]) -> Result<String, ExtractionError> {
    let doc = lopdf::Document::load_mem(bytes).map_err(|e| ExtractionError::Decode {
        format: "pdf".to_string(),
        message: format!("Failed to load PDF: {}", e),
    })?;

    let pages = doc.get_pages();
    debug!(page_count = pages.len(), "Extracting text from PDF");

    let mut text = String::new();

    for (page_num, page_id) in pages.iter() {
        let page_text = match doc.extract_text(&[*page_num]) {
            Ok(page_text) if !page_text.trim().is_empty() => page_text,
            Ok(_) | Err(_) => match doc.get_page_content(*page_id) {
                Ok(content) => extract_text_from_content(&content),
                Err(e) => {
                    warn!(page = page_num, error = %e, "Failed to read page content, skipping");
                    continue;
                }
            },
        };
        text.push_str(&page_text);
        text.push('\n');
    }

    let cleaned = clean_text(&text);

    if cleaned.is_empty() {
        return Err(ExtractionError::Decode {
            format: "pdf".to_string(),
            message: "No text content extracted from PDF".to_string(),
        });
    }

    debug!(
        original_len = text.len(),
        cleaned_len = cleaned.len(),
        "Text extraction complete"
    );

    Ok(cleaned)
}

/// Scan a content stream for text between BT and ET.
///
/// Each text block and each line-moving operator ends an output line.
fn extract_text_from_content(content: &[u8]) -> String {
    let content_str = String::from_utf8_lossy(content);
    let mut text = String::new();
    let mut in_text_block = false;
    let mut current_line = String::new();

    for line in content_str.lines() {
        let trimmed = line.trim();

        match trimmed {
            "BT" => {
                in_text_block = true;
                continue;
            }
            "ET" => {
                in_text_block = false;
                flush_line(&mut text, &mut current_line);
                continue;
            }
            _ => {}
        }

        if !in_text_block {
            continue;
        }

        if moves_to_next_line(trimmed) {
            flush_line(&mut text, &mut current_line);
        }

        if let Some(shown) = extract_text_from_operator(trimmed) {
            current_line.push_str(&shown);
        }
    }

    flush_line(&mut text, &mut current_line);
    text
}

fn flush_line(text: &mut String, current_line: &mut String) {
    if !current_line.trim().is_empty() {
        text.push_str(current_line.trim());
        text.push('\n');
    }
    current_line.clear();
}

/// `Td`, `TD` and `T*` start a new text line; so do `'` and `"`
fn moves_to_next_line(op_line: &str) -> bool {
    op_line.ends_with(" Td")
        || op_line.ends_with(" TD")
        || op_line == "T*"
        || op_line.ends_with('\'')
        || op_line.ends_with('"')
}

/// Text shown by a single operator line
fn extract_text_from_operator(line: &str) -> Option<String> {
    // (text) Tj, (text) ', aw ac (text) "
    if line.ends_with("Tj") || line.ends_with('\'') || line.ends_with('"') {
        let start = line.find('(')?;
        let end = line.rfind(')')?;
        if end > start {
            return Some(decode_pdf_string(&line[start + 1..end]));
        }
        return None;
    }

    // [(text) kern (text)] TJ; large negative kerns are word gaps
    if line.ends_with("TJ") {
        let mut result = String::new();
        let mut in_paren = false;
        let mut escaped = false;
        let mut current = String::new();
        let mut kern = String::new();

        for ch in line.chars() {
            if in_paren {
                match ch {
                    _ if escaped => {
                        current.push(ch);
                        escaped = false;
                    }
                    '\\' => {
                        current.push(ch);
                        escaped = true;
                    }
                    ')' => {
                        in_paren = false;
                        result.push_str(&decode_pdf_string(&current));
                        current.clear();
                    }
                    _ => current.push(ch),
                }
                continue;
            }

            match ch {
                '(' => {
                    if kern.trim().parse::<f32>().map_or(false, |k| k < -200.0) {
                        result.push(' ');
                    }
                    kern.clear();
                    in_paren = true;
                }
                '-' | '.' | '0'..='9' => kern.push(ch),
                c if c.is_whitespace() => {}
                _ => kern.clear(),
            }
        }

        if !result.is_empty() {
            return Some(result);
        }
    }

    None
}

/// Decode PDF string escapes
fn decode_pdf_string(s: &str) -> String {
    let mut result = String::new();
    let mut chars = s.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '\\' {
            match chars.next() {
                Some('n') => result.push('\n'),
                Some('r') => result.push('\r'),
                Some('t') => result.push('\t'),
                Some('\\') => result.push('\\'),
                Some('(') => result.push('('),
                Some(')') => result.push(')'),
                Some(c) => result.push(c),
                None => {}
            }
        } else {
            result.push(ch);
        }
    }

    result
}

/// Normalize whitespace inside lines while keeping the line structure
fn clean_text(text: &str) -> String {
    text.replace('\u{FEFF}', "")
        .lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
