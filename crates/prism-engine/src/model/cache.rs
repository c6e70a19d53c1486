use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::texture::TextureKind;

use super::scene::TextureSource;

/// Turns texture sources into loaded handles.
pub trait TextureLoader {
    type Handle: Clone;

    fn load_file(&mut self, path: &Path, kind: TextureKind) -> Self::Handle;
    fn load_bytes(&mut self, key: &Path, bytes: &[u8], kind: TextureKind) -> Self::Handle;
}

/// Loaded textures keyed by source path.
///
/// The first request for a path loads it; later requests share that handle
/// whatever kind they ask for.
#[derive(Debug, Clone)]
pub struct TextureCache<H> {
    entries: Vec<(PathBuf, H)>,
    index: HashMap<PathBuf, usize>,
}

impl<H: Clone> TextureCache<H> {
    pub fn new() -> Self {
        Self { entries: Vec::new(), index: HashMap::new() }
    }

    pub fn resolve<L>(&mut self, loader: &mut L, source: &TextureSource, kind: TextureKind) -> H
    where
        L: TextureLoader<Handle = H>,
    {
        let key = source.key();
        if let Some(&i) = self.index.get(key) {
            return self.entries[i].1.clone();
        }

        let handle = match source {
            TextureSource::File(path) => loader.load_file(path, kind),
            TextureSource::Embedded { key, bytes } => loader.load_bytes(key, bytes, kind),
        };

        self.index.insert(key.to_path_buf(), self.entries.len());
        self.entries.push((key.to_path_buf(), handle.clone()));
        handle
    }

    pub fn get(&self, path: &Path) -> Option<&H> {
        self.index.get(path).map(|&i| &self.entries[i].1)
    }

    /// Number of distinct textures loaded.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Loaded textures in load order.
    pub fn iter(&self) -> impl Iterator<Item = (&Path, &H)> {
        self.entries.iter().map(|(p, h)| (p.as_path(), h))
    }
}

impl<H: Clone> Default for TextureCache<H> {
    fn default() -> Self {
        Self::new()
    }
}
