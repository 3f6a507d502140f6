use std::io;
use std::path::PathBuf;
use tracing::trace;

/// Directory of `{slug}.mdx` documents.
#[derive(Debug, Clone)]
pub struct WritingSource {
    dir: PathBuf,
}

impl WritingSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Slugs name a single file inside the directory.
    pub fn is_valid_slug(slug: &str) -> bool {
        !slug.is_empty()
            && !slug.contains(['/', '\\', '\0'])
            && !slug.contains("..")
            && !slug.starts_with('.')
    }

    /// Reads the writing for `slug`, or `None` if it does not exist or
    /// has no content.
    pub async fn load(&self, slug: &str) -> io::Result<Option<String>> {
        let path = self.dir.join(format!("{slug}.mdx"));
        trace!(path = %path.display(), "Loading writing");

        match tokio::fs::read_to_string(&path).await {
            Ok(source) if source.trim().is_empty() => Ok(None),
            Ok(source) => Ok(Some(source)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }
}
