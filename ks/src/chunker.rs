//! Recursive text chunking tuned for Japanese markdown

use std::collections::VecDeque;

use tracing::debug;

use crate::{DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE};

/// Split levels in priority order. Markdown headings bind tightest, then
/// lines, sentence and clause marks, spaces, and per-character as the last
/// resort. The empty separator must stay last.
const SEPARATORS: [&str; 8] = ["\n## ", "\n### ", "\n#### ", "\n", "。", "、", " ", ""];

/// Splits document text into bounded, overlapping chunks
///
/// The first separator present in the text decides the split level; pieces
/// still over `chunk_size` recurse into the finer levels. Small pieces are
/// merged back up to `chunk_size`, carrying at most `chunk_overlap` trailing
/// characters into the next chunk so context survives the cut. All lengths
/// are in characters, not bytes.
#[derive(Debug, Clone)]
pub struct TextChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl Default for TextChunker {
    fn default() -> Self {
        Self::new(DEFAULT_CHUNK_SIZE, DEFAULT_CHUNK_OVERLAP)
    }
}

impl TextChunker {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            chunk_size,
            chunk_overlap,
        }
    }

    /// Split `text` into chunks of at most `chunk_size` characters
    ///
    /// Chunks are trimmed of surrounding whitespace; whitespace-only chunks
    /// are dropped, so an empty document yields no chunks.
    pub fn split(&self, text: &str) -> Vec<String> {
        let chunks = self.split_with(text, &SEPARATORS);
        debug!(
            text_chars = char_len(text),
            chunk_count = chunks.len(),
            "Split text into chunks"
        );
        chunks
    }

    fn split_with(&self, text: &str, separators: &[&str]) -> Vec<String> {
        let mut separator = "";
        let mut remaining: &[&str] = &[];
        for (i, s) in separators.iter().enumerate() {
            if s.is_empty() {
                break;
            }
            if text.contains(s) {
                separator = s;
                remaining = &separators[i + 1..];
                break;
            }
        }

        let mut chunks = Vec::new();
        let mut small: Vec<String> = Vec::new();
        for piece in split_keeping_separator(text, separator) {
            if char_len(&piece) < self.chunk_size {
                small.push(piece);
            } else {
                if !small.is_empty() {
                    chunks.extend(self.merge(std::mem::take(&mut small)));
                }
                if remaining.is_empty() {
                    chunks.push(piece);
                } else {
                    chunks.extend(self.split_with(&piece, remaining));
                }
            }
        }
        if !small.is_empty() {
            chunks.extend(self.merge(small));
        }
        chunks
    }

    /// Greedily pack adjacent pieces into chunks, keeping a trailing window
    /// of at most `chunk_overlap` characters as the seed of the next chunk
    fn merge(&self, pieces: Vec<String>) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut window: VecDeque<String> = VecDeque::new();
        let mut total = 0;

        for piece in pieces {
            let len = char_len(&piece);
            if total + len > self.chunk_size && !window.is_empty() {
                if let Some(chunk) = join_trimmed(&window) {
                    chunks.push(chunk);
                }
                while total > self.chunk_overlap || (total + len > self.chunk_size && total > 0) {
                    let Some(front) = window.pop_front() else { break };
                    total -= char_len(&front);
                }
            }
            total += len;
            window.push_back(piece);
        }

        if let Some(chunk) = join_trimmed(&window) {
            chunks.push(chunk);
        }
        chunks
    }
}

/// Split on `separator`, attaching each occurrence to the piece that follows
/// it so headings stay glued to their section. The empty separator splits
/// into single characters. Empty pieces are dropped.
fn split_keeping_separator(text: &str, separator: &str) -> Vec<String> {
    if separator.is_empty() {
        return text.chars().map(|c| c.to_string()).collect();
    }

    let mut pieces = Vec::new();
    let mut start = 0;
    let mut search_from = 0;
    while let Some(found) = text[search_from..].find(separator) {
        let pos = search_from + found;
        if pos > start {
            pieces.push(text[start..pos].to_string());
        }
        start = pos;
        search_from = pos + separator.len();
    }
    if start < text.len() {
        pieces.push(text[start..].to_string());
    }
    pieces
}

fn join_trimmed(pieces: &VecDeque<String>) -> Option<String> {
    let joined: String = pieces.iter().map(String::as_str).collect();
    let trimmed = joined.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}
