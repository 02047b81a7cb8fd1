use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use common::{join_relpath, relpath_from, stable_id, MetadataSnapshot, SongRecord, SongTags};
use metadata::{read_tags, write_genres, write_tags, MetadataError};
use redb::{
    CommitError, Database, DatabaseError, ReadableTable, StorageError, TableDefinition, TableError,
    TransactionError, WriteTransaction,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use walkdir::WalkDir;

pub const SNAPSHOT_FILE: &str = "metadata_scan.json";
pub const SONG_LIST_FILE: &str = "song_list.txt";

const INDEX_VERSION: u32 = 1;
const KEY_SEP: char = '\x1f';

const META_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("meta");
const SONGS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("songs");
const PLAYLIST_SONGS_TABLE: TableDefinition<&str, &[u8]> =
    TableDefinition::new("playlist_songs");

const META_VERSION_KEY: &str = "version";
const META_STATS_KEY: &str = "stats";

const AUDIO_EXTENSIONS: &[&str] = &["mp3", "flac", "m4a", "ogg", "opus", "wav"];

#[derive(Debug)]
pub enum LibraryError {
    Io(std::io::Error),
    Metadata(MetadataError),
    Json(serde_json::Error),
    Redb(redb::Error),
    Bincode(Box<bincode::ErrorKind>),
    KeyParse(String),
}

impl std::fmt::Display for LibraryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LibraryError::Io(err) => write!(f, "io error: {}", err),
            LibraryError::Metadata(err) => write!(f, "metadata error: {}", err),
            LibraryError::Json(err) => write!(f, "json error: {}", err),
            LibraryError::Redb(err) => write!(f, "db error: {}", err),
            LibraryError::Bincode(err) => write!(f, "bincode error: {}", err),
            LibraryError::KeyParse(value) => write!(f, "key parse error: {}", value),
        }
    }
}

impl std::error::Error for LibraryError {}

impl From<std::io::Error> for LibraryError {
    fn from(err: std::io::Error) -> Self {
        LibraryError::Io(err)
    }
}

impl From<MetadataError> for LibraryError {
    fn from(err: MetadataError) -> Self {
        LibraryError::Metadata(err)
    }
}

impl From<serde_json::Error> for LibraryError {
    fn from(err: serde_json::Error) -> Self {
        LibraryError::Json(err)
    }
}

impl From<redb::Error> for LibraryError {
    fn from(err: redb::Error) -> Self {
        LibraryError::Redb(err)
    }
}

impl From<DatabaseError> for LibraryError {
    fn from(err: DatabaseError) -> Self {
        LibraryError::Redb(err.into())
    }
}

impl From<TableError> for LibraryError {
    fn from(err: TableError) -> Self {
        LibraryError::Redb(err.into())
    }
}

impl From<TransactionError> for LibraryError {
    fn from(err: TransactionError) -> Self {
        LibraryError::Redb(err.into())
    }
}

impl From<StorageError> for LibraryError {
    fn from(err: StorageError) -> Self {
        LibraryError::Redb(err.into())
    }
}

impl From<CommitError> for LibraryError {
    fn from(err: CommitError) -> Self {
        LibraryError::Redb(err.into())
    }
}

impl From<Box<bincode::ErrorKind>> for LibraryError {
    fn from(err: Box<bincode::ErrorKind>) -> Self {
        LibraryError::Bincode(err)
    }
}

pub fn is_audio_file(path: &Path) -> bool {
    let ext = match path.extension() {
        Some(ext) => ext.to_string_lossy().to_ascii_lowercase(),
        None => return false,
    };
    AUDIO_EXTENSIONS.contains(&ext.as_str())
}

pub fn list_playlists(root: &Path) -> Result<Vec<String>, LibraryError> {
    let mut names = Vec::new();
    for entry in fs::read_dir(root)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        if name.starts_with('.') {
            continue;
        }
        names.push(name);
    }
    names.sort();
    Ok(names)
}

pub fn audio_files_in_dir(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir)
        .follow_links(false)
        .min_depth(1)
        .into_iter()
        .filter_map(Result::ok)
    {
        let path = entry.path();
        if path.is_file() && is_audio_file(path) {
            files.push(path.to_path_buf());
        }
    }
    files.sort();
    files
}

/// Reads the tags of every song in a playlist folder. Files whose tags cannot
/// be read are logged and skipped.
pub fn scan_playlist(dir: &Path) -> Result<MetadataSnapshot, LibraryError> {
    let mut snapshot = MetadataSnapshot::new();
    for file in audio_files_in_dir(dir) {
        let relpath = match relpath_from(dir, &file) {
            Some(rel) => rel,
            None => continue,
        };
        match read_tags(&file) {
            Ok(tags) => {
                snapshot.insert(relpath, tags);
            }
            Err(err) => {
                warn!("Failed to read tags from {:?}: {}", file, err);
            }
        }
    }
    Ok(snapshot)
}

pub fn snapshot_path(dir: &Path, file_name: &str) -> PathBuf {
    dir.join(file_name)
}

pub fn save_snapshot(
    dir: &Path,
    file_name: &str,
    snapshot: &MetadataSnapshot,
) -> Result<PathBuf, LibraryError> {
    let path = snapshot_path(dir, file_name);
    let contents = serde_json::to_string_pretty(snapshot)?;
    fs::write(&path, contents)?;
    info!("Wrote snapshot with {} songs to {:?}", snapshot.len(), path);
    Ok(path)
}

pub fn load_snapshot(path: &Path) -> Result<MetadataSnapshot, LibraryError> {
    let contents = fs::read_to_string(path)?;
    let snapshot: MetadataSnapshot = serde_json::from_str(&contents)?;
    Ok(snapshot)
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ApplyStats {
    pub applied: usize,
    pub missing: usize,
    pub failed: usize,
}

/// Writes every snapshot entry back to the matching file in the playlist
/// folder. Entries whose file no longer exists are counted and skipped.
pub fn apply_snapshot(dir: &Path, snapshot: &MetadataSnapshot) -> Result<ApplyStats, LibraryError> {
    let mut stats = ApplyStats::default();
    for (relpath, tags) in snapshot {
        let path = join_relpath(dir, relpath);
        if !path.is_file() {
            warn!("Snapshot entry has no matching file: {}", relpath);
            stats.missing += 1;
            continue;
        }
        match write_tags(&path, tags) {
            Ok(()) => stats.applied += 1,
            Err(err) => {
                warn!("Failed to write tags to {:?}: {}", path, err);
                stats.failed += 1;
            }
        }
    }
    Ok(stats)
}

/// One line per song, `Artist - Title` when both tags are present, the file
/// stem otherwise.
pub fn write_song_list(dir: &Path) -> Result<(PathBuf, usize), LibraryError> {
    let mut lines = Vec::new();
    for file in audio_files_in_dir(dir) {
        let tags = match read_tags(&file) {
            Ok(tags) => tags,
            Err(err) => {
                warn!("Failed to read tags from {:?}: {}", file, err);
                SongTags::default()
            }
        };
        lines.push(song_line(&file, &tags));
    }
    lines.sort();
    let count = lines.len();

    let path = dir.join(SONG_LIST_FILE);
    let mut contents = lines.join("\n");
    if !contents.is_empty() {
        contents.push('\n');
    }
    fs::write(&path, contents)?;
    info!("Wrote song list with {} songs to {:?}", count, path);
    Ok((path, count))
}

/// Listing line for an indexed song, from stored tags without re-reading the
/// file.
pub fn record_line(record: &SongRecord) -> String {
    song_line(Path::new(&record.file_relpath), &record.tags)
}

fn song_line(file: &Path, tags: &SongTags) -> String {
    match (tags.artist.as_deref(), tags.title.as_deref()) {
        (Some(artist), Some(title)) if !artist.trim().is_empty() && !title.trim().is_empty() => {
            format!("{} - {}", artist.trim(), title.trim())
        }
        _ => file_stem(file),
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "Unknown Song".to_string())
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleRule {
    pub name: String,
    pub genres: Vec<String>,
    pub remove_from_songs: bool,
}

/// Case-insensitive lookup from style names found in genre tags to the
/// canonical genre names they should become.
#[derive(Clone, Debug, Default)]
pub struct StyleMap {
    rules: HashMap<String, StyleRule>,
}

impl StyleMap {
    pub fn new(rules: Vec<StyleRule>) -> Self {
        let mut map = HashMap::new();
        for rule in rules {
            let key = rule.name.trim().to_lowercase();
            if key.is_empty() {
                continue;
            }
            map.insert(key, rule);
        }
        Self { rules: map }
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Translates raw genre values. Unknown values pass through unchanged,
    /// mapped styles are replaced by their genres, removed styles are
    /// dropped. Output keeps first-seen order and deduplicates
    /// case-insensitively.
    pub fn translate(&self, raw: &[String]) -> Vec<String> {
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        for value in raw {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                continue;
            }
            match self.rules.get(&trimmed.to_lowercase()) {
                Some(rule) if rule.remove_from_songs => continue,
                Some(rule) if !rule.genres.is_empty() => {
                    for genre in &rule.genres {
                        push_unique(&mut out, &mut seen, genre);
                    }
                }
                _ => push_unique(&mut out, &mut seen, trimmed),
            }
        }
        out
    }
}

fn push_unique(out: &mut Vec<String>, seen: &mut HashSet<String>, value: &str) {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return;
    }
    if seen.insert(trimmed.to_lowercase()) {
        out.push(trimmed.to_string());
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GenreFixStats {
    pub updated: usize,
    pub unchanged: usize,
    pub failed: usize,
}

/// Rewrites genre tags of every song in the folder through the style map.
/// Only files whose translated genre list differs are written.
pub fn fix_genres(dir: &Path, styles: &StyleMap) -> Result<GenreFixStats, LibraryError> {
    let mut stats = GenreFixStats::default();
    for file in audio_files_in_dir(dir) {
        let tags = match read_tags(&file) {
            Ok(tags) => tags,
            Err(err) => {
                warn!("Failed to read tags from {:?}: {}", file, err);
                stats.failed += 1;
                continue;
            }
        };
        let translated = styles.translate(&tags.genres);
        if translated == tags.genres {
            stats.unchanged += 1;
            continue;
        }
        match write_genres(&file, &translated) {
            Ok(()) => {
                info!(
                    "Updated genres for {:?}: {:?} -> {:?}",
                    file, tags.genres, translated
                );
                stats.updated += 1;
            }
            Err(err) => {
                warn!("Failed to write genres to {:?}: {}", file, err);
                stats.failed += 1;
            }
        }
    }
    Ok(stats)
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct IndexStats {
    pub playlists: usize,
    pub songs: usize,
}

/// Persistent index of every playlist and song under the playlists root.
#[derive(Clone)]
pub struct Index {
    db: Arc<Database>,
}

impl Index {
    pub fn open(path: &Path) -> Result<Self, LibraryError> {
        let db = open_or_create_db(path)?;
        Ok(Self { db: Arc::new(db) })
    }

    /// Opens the index and rebuilds it when the stored version does not match.
    pub fn load_or_rebuild(path: &Path, root: &Path) -> Result<(Self, bool), LibraryError> {
        let index = Self::open(path)?;
        let mut rebuilt = false;
        match read_version(&index.db)? {
            Some(version) if version == INDEX_VERSION => {
                info!("Loaded index from {:?}", path);
            }
            Some(version) => {
                warn!("Index version mismatch ({}); rebuilding", version);
                index.rebuild(root)?;
                rebuilt = true;
            }
            None => {
                warn!("Index missing; rebuilding");
                index.rebuild(root)?;
                rebuilt = true;
            }
        }
        Ok((index, rebuilt))
    }

    pub fn rebuild(&self, root: &Path) -> Result<IndexStats, LibraryError> {
        let playlists = list_playlists(root)?;

        let write_txn = self.db.begin_write()?;
        clear_table(&write_txn, META_TABLE)?;
        clear_table(&write_txn, SONGS_TABLE)?;
        clear_table(&write_txn, PLAYLIST_SONGS_TABLE)?;

        let stats = {
            let mut meta_table = write_txn.open_table(META_TABLE)?;
            let mut songs_table = write_txn.open_table(SONGS_TABLE)?;
            let mut playlist_songs_table = write_txn.open_table(PLAYLIST_SONGS_TABLE)?;

            let mut playlist_count = 0usize;
            let mut song_count = 0usize;

            for playlist in playlists {
                let folder = root.join(&playlist);
                let files = audio_files_in_dir(&folder);
                if files.is_empty() {
                    continue;
                }
                playlist_count += 1;

                for file in files {
                    let relpath = match relpath_from(&folder, &file) {
                        Some(rel) => rel,
                        None => continue,
                    };
                    let tags = match read_tags(&file) {
                        Ok(tags) => tags,
                        Err(err) => {
                            warn!("Failed to read tags from {:?}: {}", file, err);
                            SongTags::default()
                        }
                    };
                    let file_size = fs::metadata(&file)?.len();
                    let id = stable_id(&format!("{}/{}", playlist, relpath));

                    let record = SongRecord {
                        id: id.clone(),
                        playlist: playlist.clone(),
                        file_relpath: relpath.clone(),
                        file_size,
                        tags,
                    };
                    let record_bytes = encode_value(&record)?;
                    songs_table.insert(id.as_str(), record_bytes.as_slice())?;

                    let index_key = playlist_song_key(&playlist, &relpath);
                    playlist_songs_table.insert(index_key.as_str(), id.as_bytes())?;
                    song_count += 1;
                }
            }

            let stats = IndexStats {
                playlists: playlist_count,
                songs: song_count,
            };

            let version_bytes = encode_value(&INDEX_VERSION)?;
            meta_table.insert(META_VERSION_KEY, version_bytes.as_slice())?;
            let stats_bytes = encode_value(&stats)?;
            meta_table.insert(META_STATS_KEY, stats_bytes.as_slice())?;

            stats
        };

        write_txn.commit()?;
        info!(
            "Index rebuilt: {} playlists, {} songs",
            stats.playlists, stats.songs
        );
        Ok(stats)
    }

    pub fn stats(&self) -> Result<IndexStats, LibraryError> {
        let read_txn = self.db.begin_read()?;
        let table = match read_txn.open_table(META_TABLE) {
            Ok(table) => table,
            Err(TableError::TableDoesNotExist(_)) => return Ok(IndexStats::default()),
            Err(err) => return Err(err.into()),
        };
        let stats = match table.get(META_STATS_KEY)? {
            Some(value) => decode_value(value.value())?,
            None => IndexStats::default(),
        };
        Ok(stats)
    }

    pub fn list_songs(&self, playlist: &str) -> Result<Vec<SongRecord>, LibraryError> {
        let read_txn = self.db.begin_read()?;
        let songs_table = match read_txn.open_table(SONGS_TABLE) {
            Ok(table) => table,
            Err(TableError::TableDoesNotExist(_)) => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };
        let index_table = match read_txn.open_table(PLAYLIST_SONGS_TABLE) {
            Ok(table) => table,
            Err(TableError::TableDoesNotExist(_)) => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        let prefix = prefix_key(playlist);
        let mut end = prefix.clone();
        end.push('\u{10ffff}');
        let mut songs = Vec::new();

        for entry in index_table.range(prefix.as_str()..end.as_str())? {
            let entry = entry?;
            let id = std::str::from_utf8(entry.1.value())
                .map_err(|_| LibraryError::KeyParse(entry.0.value().to_string()))?
                .to_string();
            if let Some(value) = songs_table.get(id.as_str())? {
                let record: SongRecord = decode_value(value.value())?;
                songs.push(record);
            }
        }

        Ok(songs)
    }
}

fn playlist_song_key(playlist: &str, relpath: &str) -> String {
    let mut out = String::new();
    out.push_str(playlist);
    out.push(KEY_SEP);
    out.push_str(relpath);
    out
}

fn prefix_key(prefix: &str) -> String {
    let mut out = String::new();
    out.push_str(prefix);
    out.push(KEY_SEP);
    out
}

fn open_or_create_db(path: &Path) -> Result<Database, LibraryError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    if path.exists() {
        Ok(Database::open(path)?)
    } else {
        Ok(Database::create(path)?)
    }
}

fn read_version(db: &Database) -> Result<Option<u32>, LibraryError> {
    let read_txn = db.begin_read()?;
    let table = match read_txn.open_table(META_TABLE) {
        Ok(table) => table,
        Err(TableError::TableDoesNotExist(_)) => return Ok(None),
        Err(err) => return Err(err.into()),
    };
    let version = match table.get(META_VERSION_KEY)? {
        Some(value) => Some(decode_value(value.value())?),
        None => None,
    };
    Ok(version)
}

fn clear_table(
    txn: &WriteTransaction,
    table: TableDefinition<&str, &[u8]>,
) -> Result<(), LibraryError> {
    match txn.delete_table(table) {
        Ok(_) => Ok(()),
        Err(TableError::TableDoesNotExist(_)) => Ok(()),
        Err(err) => Err(err.into()),
    }
}

fn encode_value<T: Serialize>(value: &T) -> Result<Vec<u8>, LibraryError> {
    Ok(bincode::serialize(value)?)
}

fn decode_value<T: for<'de> Deserialize<'de>>(bytes: &[u8]) -> Result<T, LibraryError> {
    Ok(bincode::deserialize(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::{
        apply_snapshot, is_audio_file, list_playlists, load_snapshot, record_line, save_snapshot,
        song_line, write_song_list, Index, StyleMap, StyleRule, SNAPSHOT_FILE,
    };
    use common::{MetadataSnapshot, SongRecord, SongTags};
    use std::fs;
    use std::path::{Path, PathBuf};
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_dir(label: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let dir = std::env::temp_dir().join(format!("library-test-{}-{}", label, nanos));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn rule(name: &str, genres: &[&str], remove: bool) -> StyleRule {
        StyleRule {
            name: name.to_string(),
            genres: genres.iter().map(|g| g.to_string()).collect(),
            remove_from_songs: remove,
        }
    }

    #[test]
    fn recognizes_audio_extensions() {
        assert!(is_audio_file(Path::new("song.mp3")));
        assert!(is_audio_file(Path::new("song.FLAC")));
        assert!(!is_audio_file(Path::new("playlist.spotdl")));
        assert!(!is_audio_file(Path::new("noext")));
    }

    #[test]
    fn style_map_translates_and_removes() {
        let styles = StyleMap::new(vec![
            rule("melodic dubstep", &["Dubstep", "Electronic"], false),
            rule("filler", &[], true),
        ]);
        let raw = vec![
            "Melodic Dubstep".to_string(),
            "Filler".to_string(),
            "Pop".to_string(),
        ];
        assert_eq!(styles.translate(&raw), vec!["Dubstep", "Electronic", "Pop"]);
    }

    #[test]
    fn style_map_deduplicates_case_insensitively() {
        let styles = StyleMap::new(vec![rule("synthwave", &["Electronic"], false)]);
        let raw = vec![
            "electronic".to_string(),
            "Synthwave".to_string(),
            "ELECTRONIC".to_string(),
        ];
        assert_eq!(styles.translate(&raw), vec!["electronic"]);
    }

    #[test]
    fn style_map_passes_unknown_genres_through() {
        let styles = StyleMap::new(Vec::new());
        let raw = vec!["Jazz".to_string(), "  ".to_string()];
        assert_eq!(styles.translate(&raw), vec!["Jazz"]);
    }

    #[test]
    fn song_line_prefers_tags_over_stem() {
        let tags = SongTags {
            artist: Some("Artist".to_string()),
            title: Some("Title".to_string()),
            ..SongTags::default()
        };
        assert_eq!(song_line(Path::new("x/file.mp3"), &tags), "Artist - Title");
        assert_eq!(
            song_line(Path::new("x/file.mp3"), &SongTags::default()),
            "file"
        );
    }

    #[test]
    fn record_line_uses_stored_tags() {
        let mut record = SongRecord {
            id: "id".to_string(),
            playlist: "Chill Mix".to_string(),
            file_relpath: "Artist - Title.mp3".to_string(),
            file_size: 0,
            tags: SongTags {
                artist: Some("Artist".to_string()),
                title: Some("Title".to_string()),
                ..SongTags::default()
            },
        };
        assert_eq!(record_line(&record), "Artist - Title");

        record.tags = SongTags::default();
        record.file_relpath = "01 - intro.mp3".to_string();
        assert_eq!(record_line(&record), "01 - intro");
    }

    #[test]
    fn song_list_falls_back_to_stem_for_unreadable_tags() {
        let dir = temp_dir("song-list");
        fs::write(dir.join("b.mp3"), b"not really audio").unwrap();
        fs::write(dir.join("a.mp3"), b"not really audio").unwrap();

        let (path, count) = write_song_list(&dir).unwrap();
        assert_eq!(count, 2);
        assert_eq!(fs::read_to_string(&path).unwrap(), "a\nb\n");

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn snapshot_round_trips() {
        let dir = temp_dir("snapshot");
        let mut snapshot = MetadataSnapshot::new();
        snapshot.insert(
            "Artist - Song.mp3".to_string(),
            SongTags {
                title: Some("Song".to_string()),
                artist: Some("Artist".to_string()),
                year: Some(2021),
                genres: vec!["Pop".to_string(), "Indie".to_string()],
                ..SongTags::default()
            },
        );

        let path = save_snapshot(&dir, SNAPSHOT_FILE, &snapshot).unwrap();
        let loaded = load_snapshot(&path).unwrap();
        assert_eq!(loaded, snapshot);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn apply_snapshot_counts_missing_files() {
        let dir = temp_dir("apply");
        let mut snapshot = MetadataSnapshot::new();
        snapshot.insert("gone.mp3".to_string(), SongTags::default());

        let stats = apply_snapshot(&dir, &snapshot).unwrap();
        assert_eq!(stats.missing, 1);
        assert_eq!(stats.applied, 0);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn lists_playlist_folders_sorted() {
        let dir = temp_dir("playlists");
        fs::create_dir(dir.join("Workout")).unwrap();
        fs::create_dir(dir.join("Chill Mix")).unwrap();
        fs::create_dir(dir.join(".hidden")).unwrap();
        fs::write(dir.join("stray.txt"), "x").unwrap();

        let playlists = list_playlists(&dir).unwrap();
        assert_eq!(playlists, vec!["Chill Mix", "Workout"]);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn index_rebuild_counts_and_persists() {
        let root = temp_dir("index-root");
        let folder = root.join("Chill Mix");
        fs::create_dir(&folder).unwrap();
        // Not a decodable mp3; tag reading fails but the song is still indexed.
        fs::write(folder.join("a.mp3"), b"not really audio").unwrap();
        fs::write(folder.join("notes.txt"), "ignored").unwrap();

        let db_path = root.join("index.redb");
        let index = Index::open(&db_path).unwrap();
        let stats = index.rebuild(&root).unwrap();
        assert_eq!(stats.playlists, 1);
        assert_eq!(stats.songs, 1);

        let songs = index.list_songs("Chill Mix").unwrap();
        assert_eq!(songs.len(), 1);
        assert_eq!(songs[0].file_relpath, "a.mp3");
        assert!(songs[0].tags.is_empty());
        drop(index);

        let (reopened, rebuilt) = Index::load_or_rebuild(&db_path, &root).unwrap();
        assert!(!rebuilt);
        let stats = reopened.stats().unwrap();
        assert_eq!(stats.songs, 1);

        fs::remove_dir_all(&root).unwrap();
    }
}
