//! Where an artifact comes from.

use std::fmt;
use std::path::PathBuf;

use co2cast_core::LoadError;
use reqwest::Url;

const DRIVE_HOST: &str = "drive.google.com";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactSource {
    Local(PathBuf),
    Remote(Url),
}

impl ArtifactSource {
    /// `http://` and `https://` locations are remote, anything else is a path.
    pub fn parse(location: &str) -> Result<Self, LoadError> {
        let location = location.trim();
        if location.is_empty() {
            return Err(LoadError::NotFound("empty model location".to_string()));
        }

        let lower = location.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            let url = Url::parse(location)
                .map_err(|e| LoadError::Remote(format!("invalid URL '{}': {}", location, e)))?;
            return Ok(ArtifactSource::Remote(url));
        }

        Ok(ArtifactSource::Local(PathBuf::from(location)))
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, ArtifactSource::Remote(_))
    }
}

impl fmt::Display for ArtifactSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactSource::Local(path) => write!(f, "{}", path.display()),
            ArtifactSource::Remote(url) => write!(f, "{}", url),
        }
    }
}

/// File id of a Google Drive share link, if `url` is one.
///
/// Accepts `/file/d/<id>/view...`, `/open?id=<id>` and `/uc?id=<id>`.
pub fn drive_file_id(url: &Url) -> Option<String> {
    if url.host_str() != Some(DRIVE_HOST) {
        return None;
    }

    let segments: Vec<&str> = url.path_segments()?.filter(|s| !s.is_empty()).collect();
    if let ["file", "d", id, ..] = segments.as_slice() {
        return Some(id.to_string());
    }

    url.query_pairs()
        .find(|(k, _)| k == "id")
        .map(|(_, v)| v.into_owned())
        .filter(|id| !id.is_empty())
}

/// Direct-download form of a share link. Other URLs are returned unchanged.
pub fn resolve_download_url(url: &Url) -> Url {
    match drive_file_id(url) {
        Some(id) => {
            let mut direct = url.clone();
            direct.set_path("/uc");
            direct.set_query(None);
            direct.set_fragment(None);
            direct
                .query_pairs_mut()
                .append_pair("export", "download")
                .append_pair("id", &id);
            direct
        }
        None => url.clone(),
    }
}

/// Stable local file name for a remote artifact.
pub fn cache_file_name(url: &Url) -> String {
    if let Some(id) = drive_file_id(url) {
        return format!("drive-{}.json", sanitize(&id));
    }

    let host = url.host_str().unwrap_or("remote");
    let last = url
        .path_segments()
        .and_then(|mut s| s.next_back())
        .filter(|s| !s.is_empty())
        .unwrap_or("artifact.json");
    format!("{}-{}", sanitize(host), sanitize(last))
}

fn sanitize(raw: &str) -> String {
    raw.chars()
        .map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '.' | '-' | '_' => c,
            _ => '_',
        })
        .collect()
}
