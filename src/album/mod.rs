//! Album sources — where the descriptor set for a run comes from
//!
//! The core abstraction is the [`AlbumSource`] trait: one call producing
//! the full, ordered descriptor set for a named album. The production
//! implementation is [`PhotosAlbumClient`], which talks to the Google
//! Photos Library REST API; tests substitute a stub source.
//!
//! A source must never hand the downloader a set in which two descriptors
//! share a filename — two different ids must never map to the same local
//! path. [`ensure_unique_filenames`] enforces that precondition and the
//! orchestrator re-checks it before dispatching any work, so the
//! guarantee holds for every implementation.

mod photos;

pub use photos::PhotosAlbumClient;

use crate::error::{Error, Result};
use crate::types::MediaItemDescriptor;
use async_trait::async_trait;
use std::collections::HashSet;

/// Supplier of the media item descriptor set for one named album
///
/// Implementations fail fatally if the remote album cannot be located by
/// name or if the resulting set violates the filename-uniqueness
/// precondition.
#[async_trait]
pub trait AlbumSource: Send + Sync {
    /// Fetch the ordered descriptor set for the configured album
    async fn items(&self) -> Result<Vec<MediaItemDescriptor>>;
}

/// Enforce the filename-uniqueness precondition on a descriptor set
///
/// Returns [`Error::DuplicateFilename`] naming the first filename shared
/// by more than one descriptor.
pub fn ensure_unique_filenames(items: &[MediaItemDescriptor]) -> Result<()> {
    let mut seen = HashSet::with_capacity(items.len());
    for item in items {
        if !seen.insert(item.filename.as_str()) {
            return Err(Error::DuplicateFilename {
                filename: item.filename.clone(),
            });
        }
    }
    Ok(())
}
