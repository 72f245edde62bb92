//! File serving under a configured base directory.

use crate::http::{response::Response, types::StatusCode};
use std::{
    io,
    path::{Component, Path, PathBuf},
};

/// Serves files from `base_dir`, consulted before the route trie.
pub(crate) struct StaticFiles {
    base_dir: PathBuf,
}

impl StaticFiles {
    pub(crate) fn new(base_dir: impl Into<PathBuf>) -> Self {
        StaticFiles {
            base_dir: base_dir.into(),
        }
    }

    // Maps a URL path onto the base directory, component by component.
    // Anything that is not a plain name (`..`, a root, a prefix)
    // refuses to resolve, so requests cannot escape the base dir.
    fn resolve(&self, url_path: &str) -> Option<PathBuf> {
        let mut relative = url_path.trim_start_matches('/').to_owned();
        if url_path.ends_with('/') {
            relative.push_str("index.html");
        }

        let mut full = self.base_dir.clone();
        for component in Path::new(&relative).components() {
            match component {
                Component::Normal(part) => full.push(part),
                Component::CurDir => {}
                _ => return None,
            }
        }
        Some(full)
    }

    fn content_type(path: &Path) -> &'static str {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        match extension.as_str() {
            "html" => "text/html",
            "css" => "text/css",
            "js" => "application/javascript",
            "png" => "image/png",
            "jpg" | "jpeg" => "image/jpeg",
            "svg" => "image/svg+xml",
            "gif" => "image/gif",
            _ => "application/octet-stream",
        }
    }

    /// Serves the file for `url_path` with a 200 and an extension-based
    /// content type. `Ok(false)` is a miss — unresolvable or unreadable
    /// paths fall through to the router.
    pub(crate) async fn serve(&self, resp: &mut Response, url_path: &str) -> io::Result<bool> {
        let Some(path) = self.resolve(url_path) else {
            return Ok(false);
        };

        let contents = match tokio::fs::read(&path).await {
            Ok(contents) => contents,
            Err(_) => return Ok(false),
        };

        resp.header().set("Content-Type", Self::content_type(&path));
        resp.write_header(StatusCode::Ok).await?;
        resp.write(&contents).await?;
        Ok(true)
    }
}

#[cfg(test)]
mod static_files_self {
    use super::*;
    use crate::tools::SharedBuf;
    use std::fs;

    fn site() -> (tempfile::TempDir, StaticFiles) {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("index.html"), "<h1>Welcome</h1>").unwrap();
        fs::write(dir.path().join("style.css"), "body {}").unwrap();
        fs::write(dir.path().join("data.xyz"), "opaque").unwrap();

        let files = StaticFiles::new(dir.path());
        (dir, files)
    }

    async fn request(files: &StaticFiles, path: &str) -> (bool, String) {
        let buf = SharedBuf::new();
        let mut resp = Response::new(buf.clone());
        let served = files.serve(&mut resp, path).await.unwrap();
        (served, buf.as_string())
    }

    #[tokio::test]
    async fn serves_file_with_content_type() {
        let (_dir, files) = site();
        let (served, wire) = request(&files, "/style.css").await;

        assert!(served);
        assert!(wire.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(wire.contains("Content-Type: text/css\r\n"));
        assert!(wire.ends_with("body {}"));
    }

    #[tokio::test]
    async fn trailing_slash_serves_index() {
        let (_dir, files) = site();
        let (served, wire) = request(&files, "/").await;

        assert!(served);
        assert!(wire.contains("Content-Type: text/html\r\n"));
        assert!(wire.ends_with("<h1>Welcome</h1>"));
    }

    #[tokio::test]
    async fn unknown_extension_is_octet_stream() {
        let (_dir, files) = site();
        let (served, wire) = request(&files, "/data.xyz").await;

        assert!(served);
        assert!(wire.contains("Content-Type: application/octet-stream\r\n"));
    }

    #[tokio::test]
    async fn missing_file_is_a_miss() {
        let (_dir, files) = site();
        let (served, wire) = request(&files, "/nope.html").await;

        assert!(!served);
        assert!(wire.is_empty());
    }

    #[tokio::test]
    async fn traversal_refuses_to_resolve() {
        let (_dir, files) = site();

        assert!(files.resolve("/../secret.txt").is_none());
        assert!(files.resolve("/a/../../secret.txt").is_none());

        let (served, wire) = request(&files, "/../index.html").await;
        assert!(!served);
        assert!(wire.is_empty());
    }
}
