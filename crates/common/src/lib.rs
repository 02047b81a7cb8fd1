use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SongTags {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album_artist: Option<String>,
    pub album: Option<String>,
    pub track_no: Option<u16>,
    pub disc_no: Option<u16>,
    pub year: Option<i32>,
    pub comment: Option<String>,
    pub genres: Vec<String>,
}

impl SongTags {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.artist.is_none()
            && self.album_artist.is_none()
            && self.album.is_none()
            && self.track_no.is_none()
            && self.disc_no.is_none()
            && self.year.is_none()
            && self.comment.is_none()
            && self.genres.is_empty()
    }
}

/// Snapshot of a playlist folder: song filename (relative to the folder,
/// slash-separated) mapped to its tag fields.
pub type MetadataSnapshot = BTreeMap<String, SongTags>;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SongRecord {
    pub id: String,
    pub playlist: String,
    pub file_relpath: String,
    pub file_size: u64,
    #[serde(default)]
    pub tags: SongTags,
}

pub fn stable_id(input: &str) -> String {
    blake3::hash(input.as_bytes()).to_hex().to_string()
}

pub fn relpath_from(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    Some(path_to_slash_string(rel))
}

pub fn join_relpath(root: &Path, relpath: &str) -> PathBuf {
    let mut out = PathBuf::from(root);
    for part in relpath.split('/') {
        if part.is_empty() {
            continue;
        }
        out.push(part);
    }
    out
}

fn path_to_slash_string(path: &Path) -> String {
    let parts: Vec<String> = path
        .components()
        .map(|c| c.as_os_str().to_string_lossy().to_string())
        .collect();
    parts.join("/")
}

#[cfg(test)]
mod tests {
    use super::{join_relpath, relpath_from, stable_id, SongTags};
    use std::path::Path;

    #[test]
    fn stable_id_is_deterministic() {
        let first = stable_id("Chill Mix/Artist - Song.mp3");
        let second = stable_id("Chill Mix/Artist - Song.mp3");
        assert_eq!(first, second);
        assert_ne!(first, stable_id("Chill Mix/Artist - Song2.mp3"));
    }

    #[test]
    fn relpath_round_trips() {
        let root = Path::new("/music");
        let path = root.join("Chill Mix").join("song.mp3");
        let rel = relpath_from(root, &path).unwrap();
        assert_eq!(rel, "Chill Mix/song.mp3");
        assert_eq!(join_relpath(root, &rel), path);
    }

    #[test]
    fn default_tags_are_empty() {
        assert!(SongTags::default().is_empty());
        let tags = SongTags {
            title: Some("Song".to_string()),
            ..SongTags::default()
        };
        assert!(!tags.is_empty());
    }
}
