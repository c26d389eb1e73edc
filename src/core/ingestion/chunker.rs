//! Text Chunker
//!
//! Splits extracted document text into fixed-size overlapping windows for
//! embedding. Paragraphs are aggregated up to the target size; a trailing
//! slice of each emitted chunk is carried into the next one as overlap.

use uuid::Uuid;

/// A chunk of document text ready for embedding.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    pub id: String,
    /// Global order across the whole document.
    pub seq: usize,
    /// 1-indexed source page.
    pub page: u32,
    pub content: String,
}

pub struct TextChunker {
    chunk_size: usize,
    overlap: usize,
}

impl TextChunker {
    pub fn new(chunk_size: usize, overlap: usize) -> Self {
        // Overlap must leave room for new content in every window.
        let overlap = overlap.min(chunk_size.saturating_sub(1));
        Self {
            chunk_size: chunk_size.max(1),
            overlap,
        }
    }

    /// Chunk per-page text into overlapping windows. Chunks never span pages
    /// so page provenance stays exact.
    pub fn chunk_pages(&self, pages: &[(u32, String)]) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        let mut seq = 0usize;
        for (page, text) in pages {
            self.chunk_page(text, *page, &mut seq, &mut chunks);
        }
        chunks
    }

    fn chunk_page(&self, text: &str, page: u32, seq: &mut usize, out: &mut Vec<Chunk>) {
        let mut current = String::new();

        for para in text.split("\n\n").flat_map(|p| self.split_oversized(p)) {
            let para = para.trim();
            if para.is_empty() {
                continue;
            }

            if !current.is_empty() && current.len() + para.len() > self.chunk_size {
                self.emit(&mut current, page, seq, out);
            }

            if !current.is_empty() {
                current.push_str("\n\n");
            }
            current.push_str(para);
        }

        if !current.trim().is_empty() {
            out.push(Self::make_chunk(current.trim().to_string(), page, seq));
        }
    }

    /// Flush the current chunk and seed the next one with the overlap tail.
    fn emit(&self, current: &mut String, page: u32, seq: &mut usize, out: &mut Vec<Chunk>) {
        out.push(Self::make_chunk(current.trim().to_string(), page, seq));
        let tail = overlap_tail(current, self.overlap).to_string();
        current.clear();
        current.push_str(&tail);
    }

    /// A single paragraph larger than the window is pre-split on word
    /// boundaries so no chunk grows unbounded.
    fn split_oversized(&self, para: &str) -> Vec<String> {
        if para.len() <= self.chunk_size {
            return vec![para.to_string()];
        }

        let mut pieces = Vec::new();
        let mut piece = String::new();
        for word in para.split_whitespace() {
            if !piece.is_empty() && piece.len() + 1 + word.len() > self.chunk_size {
                pieces.push(std::mem::take(&mut piece));
            }
            if !piece.is_empty() {
                piece.push(' ');
            }
            piece.push_str(word);
        }
        if !piece.is_empty() {
            pieces.push(piece);
        }
        pieces
    }

    fn make_chunk(content: String, page: u32, seq: &mut usize) -> Chunk {
        let chunk = Chunk {
            id: Uuid::new_v4().to_string(),
            seq: *seq,
            page,
            content,
        };
        *seq += 1;
        chunk
    }
}

/// Last `overlap` bytes of `s`, snapped forward to a char boundary.
fn overlap_tail(s: &str, overlap: usize) -> &str {
    if overlap == 0 {
        return "";
    }
    if s.len() <= overlap {
        return s;
    }
    let mut start = s.len() - overlap;
    while !s.is_char_boundary(start) {
        start += 1;
    }
    &s[start..]
}
