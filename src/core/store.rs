//! Vector Store
//!
//! SQLite-persisted chunk table with embedded vectors and brute-force cosine
//! top-K retrieval. Built once from the source document on first run; later
//! runs reopen the file and trust its contents without revalidation.

use std::path::Path;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use thiserror::Error;

use super::embeddings::{EmbeddingError, EmbeddingProvider};
use super::ingestion::chunker::{Chunk, TextChunker};
use super::ingestion::pdf::{self, PdfError};

/// Batch size for embedding requests during indexing.
const EMBED_BATCH_SIZE: usize = 32;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Document extraction failed: {0}")]
    Extraction(#[from] PdfError),

    #[error("Embedding failed: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// A retrieved chunk with its similarity score.
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    pub id: String,
    pub page: u32,
    pub content: String,
    pub score: f32,
}

/// Handle to the persisted vector store.
#[derive(Clone)]
pub struct VectorStore {
    pool: SqlitePool,
}

impl VectorStore {
    /// Open the store at `store_path`, building it from the source document
    /// when the file does not exist yet.
    ///
    /// The build path extracts, chunks, embeds, and persists synchronously;
    /// the reopen path never touches the source document.
    pub async fn open_or_build(
        store_path: &Path,
        pdf_path: &Path,
        chunker: &TextChunker,
        embedder: &dyn EmbeddingProvider,
    ) -> Result<Self> {
        if store_path.exists() {
            let store = Self::open(store_path).await?;
            log::info!(
                "Reopened vector store at {} ({} chunks)",
                store_path.display(),
                store.chunk_count().await?
            );
            return Ok(store);
        }

        log::info!(
            "Vector store missing at {}; indexing {}",
            store_path.display(),
            pdf_path.display()
        );
        let pages = pdf::extract_text_with_pages(pdf_path)?;
        let chunks = chunker.chunk_pages(&pages);
        log::info!("Extracted {} pages into {} chunks", pages.len(), chunks.len());

        Self::build_from_chunks(store_path, &chunks, embedder, &pdf_path.to_string_lossy()).await
    }

    /// Open an existing store file.
    pub async fn open(store_path: &Path) -> Result<Self> {
        let options = SqliteConnectOptions::new().filename(store_path);
        let pool = SqlitePoolOptions::new().connect_with(options).await?;
        Ok(Self { pool })
    }

    /// Create the store file and persist the given chunks with their
    /// embeddings. Used by `open_or_build` and by tests that skip extraction.
    pub async fn build_from_chunks(
        store_path: &Path,
        chunks: &[Chunk],
        embedder: &dyn EmbeddingProvider,
        source: &str,
    ) -> Result<Self> {
        if let Some(parent) = store_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(store_path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new().connect_with(options).await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS chunks (
                id TEXT PRIMARY KEY,
                seq INTEGER NOT NULL,
                page INTEGER NOT NULL,
                content TEXT NOT NULL,
                embedding BLOB NOT NULL
            )",
        )
        .execute(&pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS store_meta (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
        )
        .execute(&pool)
        .await?;

        let mut embeddings = Vec::with_capacity(chunks.len());
        for batch in chunks.chunks(EMBED_BATCH_SIZE) {
            let texts: Vec<&str> = batch.iter().map(|c| c.content.as_str()).collect();
            embeddings.extend(embedder.embed_batch(&texts).await?);
        }

        let mut tx = pool.begin().await?;
        for (chunk, embedding) in chunks.iter().zip(embeddings.iter()) {
            sqlx::query(
                "INSERT INTO chunks (id, seq, page, content, embedding)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )
            .bind(&chunk.id)
            .bind(chunk.seq as i64)
            .bind(chunk.page as i64)
            .bind(&chunk.content)
            .bind(encode_embedding(embedding))
            .execute(&mut *tx)
            .await?;
        }

        let meta = [
            ("source", source.to_string()),
            ("embedding_provider", embedder.name().to_string()),
            ("dimensions", embedder.dimensions().to_string()),
            ("chunk_count", chunks.len().to_string()),
            ("created_at", chrono::Utc::now().to_rfc3339()),
        ];
        for (key, value) in meta {
            sqlx::query("INSERT OR REPLACE INTO store_meta (key, value) VALUES (?1, ?2)")
                .bind(key)
                .bind(value)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;

        log::info!(
            "Persisted {} chunks to {}",
            chunks.len(),
            store_path.display()
        );
        Ok(Self { pool })
    }

    /// Top-K nearest chunks by cosine similarity, descending score.
    pub async fn search(&self, query: &[f32], top_k: usize) -> Result<Vec<ScoredChunk>> {
        let rows = sqlx::query("SELECT id, page, content, embedding FROM chunks ORDER BY seq")
            .fetch_all(&self.pool)
            .await?;

        let mut scored: Vec<ScoredChunk> = rows
            .into_iter()
            .map(|row| {
                let blob: Vec<u8> = row.get("embedding");
                let embedding = decode_embedding(&blob);
                ScoredChunk {
                    id: row.get("id"),
                    page: row.get::<i64, _>("page") as u32,
                    content: row.get("content"),
                    score: cosine_similarity(query, &embedding),
                }
            })
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);
        Ok(scored)
    }

    pub async fn chunk_count(&self) -> Result<u64> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM chunks")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get::<i64, _>("n") as u64)
    }
}

fn encode_embedding(vector: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(vector.len() * 4);
    for value in vector {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    bytes
}

fn decode_embedding(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect()
}

/// Cosine similarity; mismatched or zero-norm vectors score 0.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot_product / (norm_a * norm_b)
    }
}
