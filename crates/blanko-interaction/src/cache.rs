//! Remote attachment handle cache.
//!
//! The chat frontend assigns a reusable handle to every uploaded file.
//! Caching those handles per logical asset name means each static menu
//! photo and template preview is uploaded once per process, not once per
//! render. Append-only; concurrent writes for the same name carry the same
//! asset, so last-write-wins is fine.

use std::collections::HashMap;
use std::sync::RwLock;

/// Two-namespace handle cache (photos and documents are distinct upload
/// kinds on the transport side).
#[derive(Debug, Default)]
pub struct AttachmentCache {
    photos: RwLock<HashMap<String, String>>,
    documents: RwLock<HashMap<String, String>>,
}

impl AttachmentCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached handle for a photo asset.
    pub fn photo(&self, name: &str) -> Option<String> {
        self.photos.read().unwrap().get(name).cloned()
    }

    /// Records the handle a photo upload came back with.
    pub fn record_photo(&self, name: impl Into<String>, handle: impl Into<String>) {
        self.photos.write().unwrap().insert(name.into(), handle.into());
    }

    /// Cached handle for a document asset.
    pub fn document(&self, name: &str) -> Option<String> {
        self.documents.read().unwrap().get(name).cloned()
    }

    /// Records the handle a document upload came back with.
    pub fn record_document(&self, name: impl Into<String>, handle: impl Into<String>) {
        self.documents
            .write()
            .unwrap()
            .insert(name.into(), handle.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn namespaces_do_not_overlap() {
        let cache = AttachmentCache::new();
        cache.record_photo("cover.jpg", "photo-1");

        assert_eq!(cache.photo("cover.jpg").unwrap(), "photo-1");
        assert!(cache.document("cover.jpg").is_none());

        cache.record_document("cover.jpg", "doc-1");
        assert_eq!(cache.document("cover.jpg").unwrap(), "doc-1");
        assert_eq!(cache.photo("cover.jpg").unwrap(), "photo-1");
    }

    #[test]
    fn rewrites_keep_the_latest_handle() {
        let cache = AttachmentCache::new();
        cache.record_photo("menu.jpg", "old");
        cache.record_photo("menu.jpg", "new");
        assert_eq!(cache.photo("menu.jpg").unwrap(), "new");
    }
}
