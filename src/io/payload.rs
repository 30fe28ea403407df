// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Annotation payload extraction from model output.
//!
//! The assistant embeds its annotation batch in a fenced block:
//!
//! ````text
//! ```annotations
//! {"annotations": [ ... ]}
//! ```
//! ````
//!
//! A ```` ```json ```` fence whose body mentions an `annotations` key is
//! accepted as well. Only closed fences are ever returned, so a batch that is
//! still streaming in is never handed to ingest.

const FENCE: &str = "```";

/// A complete fenced block located in a text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Block<'a> {
    body: &'a str,
    /// Byte offset just past the closing fence.
    end: usize,
}

/// Find the first complete annotation block at or after `from`.
fn next_block(text: &str, from: usize) -> Option<Block<'_>> {
    let mut cursor = from;
    while let Some(rel) = text[cursor..].find(FENCE) {
        let open = cursor + rel;
        let after_fence = open + FENCE.len();
        let line_end = text[after_fence..]
            .find('\n')
            .map(|i| after_fence + i)?;
        let tag = text[after_fence..line_end].trim();
        let body_start = line_end + 1;
        let close = body_start + text[body_start..].find(FENCE)?;
        let body = text[body_start..close].trim();
        let end = close + FENCE.len();

        let accepted = match tag {
            "annotations" => true,
            "json" => body.contains("\"annotations\""),
            _ => false,
        };
        if accepted {
            return Some(Block { body, end });
        }
        cursor = end;
    }
    None
}

/// The last complete annotation block in `text`, if any.
pub fn extract_annotation_block(text: &str) -> Option<&str> {
    let mut last = None;
    let mut cursor = 0;
    while let Some(block) = next_block(text, cursor) {
        cursor = block.end;
        last = Some(block.body);
    }
    last
}

/// Incremental scanner for a streamed model response.
///
/// Feed chunks as they arrive; each call returns the bodies of blocks that
/// became complete with that chunk.
#[derive(Debug, Default)]
pub struct BlockScanner {
    buffer: String,
    consumed: usize,
}

impl BlockScanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, chunk: &str) -> Vec<String> {
        self.buffer.push_str(chunk);
        let mut complete = Vec::new();
        while let Some(block) = next_block(&self.buffer, self.consumed) {
            complete.push(block.body.to_string());
            self.consumed = block.end;
        }
        complete
    }

    /// Everything received so far.
    pub fn text(&self) -> &str {
        &self.buffer
    }
}
