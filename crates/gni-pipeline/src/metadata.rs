//! Metadata documents resolved through a content-addressed fetch.
//!
//! Handlers never fail because of metadata: a document that cannot be
//! fetched or decoded resets every display field it would have populated.

use std::collections::HashMap;
use std::path::PathBuf;

use gni_store::{SubgraphMetadata, VersionMetadata};
use serde_json::Value;
use tracing::warn;

use crate::error::FetchError;

/// Port to an external content-addressed store (IPFS or a local mirror).
pub trait ContentFetcher: Send + Sync {
    /// Fetch the document stored under a base-58 content address.
    fn fetch(&self, content_address: &str) -> Result<Vec<u8>, FetchError>;
}

/// Fetcher for deployments with no content source; every fetch fails.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoContentFetcher;

impl ContentFetcher for NoContentFetcher {
    fn fetch(&self, _content_address: &str) -> Result<Vec<u8>, FetchError> {
        Err(FetchError::Unavailable)
    }
}

/// Map-backed fetcher for tests and embedding.
#[derive(Clone, Debug, Default)]
pub struct InMemoryContentFetcher {
    documents: HashMap<String, Vec<u8>>,
}

impl InMemoryContentFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, content_address: impl Into<String>, document: impl Into<Vec<u8>>) {
        self.documents.insert(content_address.into(), document.into());
    }

    pub fn with(mut self, content_address: impl Into<String>, document: impl Into<Vec<u8>>) -> Self {
        self.insert(content_address, document);
        self
    }
}

impl ContentFetcher for InMemoryContentFetcher {
    fn fetch(&self, content_address: &str) -> Result<Vec<u8>, FetchError> {
        self.documents
            .get(content_address)
            .cloned()
            .ok_or_else(|| FetchError::NotFound(content_address.to_string()))
    }
}

/// Fetcher over a directory of files named by content address.
#[derive(Clone, Debug)]
pub struct DirContentFetcher {
    root: PathBuf,
}

impl DirContentFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ContentFetcher for DirContentFetcher {
    fn fetch(&self, content_address: &str) -> Result<Vec<u8>, FetchError> {
        // Content addresses are base-58, so they never contain path separators.
        if !content_address.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(FetchError::NotFound(content_address.to_string()));
        }
        let path = self.root.join(content_address);
        if !path.is_file() {
            return Err(FetchError::NotFound(content_address.to_string()));
        }
        Ok(std::fs::read(path)?)
    }
}

// ---------------------------------------------------------------------------
// Document decoding
// ---------------------------------------------------------------------------

fn parse_object(bytes: &[u8]) -> Result<serde_json::Map<String, Value>, FetchError> {
    match serde_json::from_slice::<Value>(bytes) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(FetchError::Parse("document is not a JSON object".into())),
        Err(e) => Err(FetchError::Parse(e.to_string())),
    }
}

/// A string field, or `""` when absent or not a string.
fn string_field(map: &serde_json::Map<String, Value>, name: &str) -> String {
    match map.get(name) {
        Some(Value::String(s)) => s.clone(),
        _ => String::new(),
    }
}

/// Decode a subgraph metadata document.
///
/// A string `subgraphImage` takes over `image`; the original image moves to
/// `nft_image`.
pub fn parse_subgraph_metadata(bytes: &[u8]) -> Result<SubgraphMetadata, FetchError> {
    let map = parse_object(bytes)?;
    let categories = match map.get("categories") {
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| item.as_str().unwrap_or_default().to_string())
            .collect(),
        _ => Vec::new(),
    };

    let image = string_field(&map, "image");
    let (image, nft_image) = match map.get("subgraphImage") {
        Some(Value::String(subgraph_image)) => (subgraph_image.clone(), image),
        _ => (image, String::new()),
    };

    Ok(SubgraphMetadata {
        description: string_field(&map, "description"),
        display_name: string_field(&map, "displayName"),
        code_repository: string_field(&map, "codeRepository"),
        website: string_field(&map, "website"),
        image,
        nft_image,
        categories,
    })
}

/// Decode a subgraph version metadata document.
pub fn parse_version_metadata(bytes: &[u8]) -> Result<VersionMetadata, FetchError> {
    let map = parse_object(bytes)?;
    Ok(VersionMetadata {
        description: string_field(&map, "description"),
        label: string_field(&map, "label"),
    })
}

/// Fetch and decode subgraph metadata, resetting every field on failure.
pub fn resolve_subgraph_metadata(fetcher: &dyn ContentFetcher, address: &str) -> SubgraphMetadata {
    match fetcher.fetch(address).and_then(|bytes| parse_subgraph_metadata(&bytes)) {
        Ok(metadata) => metadata,
        Err(e) => {
            warn!(address, error = %e, "subgraph metadata unavailable; display fields reset");
            SubgraphMetadata::default()
        }
    }
}

/// Fetch and decode version metadata, resetting every field on failure.
pub fn resolve_version_metadata(fetcher: &dyn ContentFetcher, address: &str) -> VersionMetadata {
    match fetcher.fetch(address).and_then(|bytes| parse_version_metadata(&bytes)) {
        Ok(metadata) => metadata,
        Err(e) => {
            warn!(address, error = %e, "version metadata unavailable; display fields reset");
            VersionMetadata::default()
        }
    }
}
