//! Filesystem infrastructure: implements `SketchStore`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::application::ports::SketchStore;
use crate::domain::ssh::expand_home;

/// Sketches as plain files under a root directory, in the Arduino
/// `<name>/<name>.ino` layout.
pub struct FsSketchStore {
    root: PathBuf,
}

impl FsSketchStore {
    #[must_use]
    pub fn new(root: &str) -> Self {
        Self {
            root: PathBuf::from(expand_home(root)),
        }
    }
}

impl SketchStore for FsSketchStore {
    fn root(&self) -> &Path {
        &self.root
    }

    fn write_sketch(&self, name: &str, source: &str) -> Result<PathBuf> {
        let dir = self.root.join(name);
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("creating sketch directory {}", dir.display()))?;
        let path = dir.join(format!("{name}.ino"));
        std::fs::write(&path, source).with_context(|| format!("writing sketch {}", path.display()))?;
        Ok(path)
    }
}
