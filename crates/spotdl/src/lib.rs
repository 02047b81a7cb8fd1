use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::info;

/// Wrapper around the external `spotdl` command-line tool. Downloads and
/// playlist diffing are fully delegated; this crate only builds the
/// invocations and checks exit status.
#[derive(Clone, Debug)]
pub struct SpotdlClient {
    bin: String,
    extra_args: Vec<String>,
}

#[derive(Debug)]
pub enum SpotdlError {
    Io(std::io::Error),
    Exit(Option<i32>),
    InvalidName(String),
    SaveFileMissing(PathBuf),
}

impl std::fmt::Display for SpotdlError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SpotdlError::Io(err) => write!(f, "failed to run spotdl: {}", err),
            SpotdlError::Exit(Some(code)) => write!(f, "spotdl exited with status {}", code),
            SpotdlError::Exit(None) => write!(f, "spotdl was terminated by a signal"),
            SpotdlError::InvalidName(name) => write!(f, "invalid playlist name: {}", name),
            SpotdlError::SaveFileMissing(dir) => {
                write!(f, "no .spotdl save file found in {:?}", dir)
            }
        }
    }
}

impl std::error::Error for SpotdlError {}

impl From<std::io::Error> for SpotdlError {
    fn from(err: std::io::Error) -> Self {
        SpotdlError::Io(err)
    }
}

impl SpotdlClient {
    pub fn new(bin: impl Into<String>, extra_args: Vec<String>) -> Self {
        Self {
            bin: bin.into(),
            extra_args,
        }
    }

    /// First-time sync: creates the playlist folder and a save file the
    /// update path can reuse.
    pub fn new_sync(&self, url: &str, name: &str, root: &Path) -> Result<(), SpotdlError> {
        validate_name(name)?;
        let folder = root.join(name);
        fs::create_dir_all(&folder)?;
        let save_file = folder.join(format!("{}.spotdl", name));
        let args = new_sync_args(url, &save_file, &folder);
        self.run(&args)
    }

    /// Update sync: re-runs spotdl against the save file left by the first
    /// sync so removed remote songs are deleted locally and new ones added.
    /// Takes the already-resolved playlist folder.
    pub fn update_sync(&self, folder: &Path) -> Result<(), SpotdlError> {
        let save_file = find_save_file(folder)?
            .ok_or_else(|| SpotdlError::SaveFileMissing(folder.to_path_buf()))?;
        let args = update_sync_args(&save_file, folder);
        self.run(&args)
    }

    fn run(&self, args: &[String]) -> Result<(), SpotdlError> {
        info!("Running {} {}", self.bin, args.join(" "));
        let status = Command::new(&self.bin)
            .args(&self.extra_args)
            .args(args)
            .status()?;
        if !status.success() {
            return Err(SpotdlError::Exit(status.code()));
        }
        Ok(())
    }
}

pub fn find_save_file(dir: &Path) -> Result<Option<PathBuf>, SpotdlError> {
    let mut found = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let is_save = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("spotdl"))
            .unwrap_or(false);
        if is_save {
            found.push(path);
        }
    }
    found.sort();
    Ok(found.into_iter().next())
}

fn validate_name(name: &str) -> Result<(), SpotdlError> {
    let trimmed = name.trim();
    if trimmed.is_empty()
        || trimmed == ".."
        || trimmed.contains('/')
        || trimmed.contains('\\')
        || trimmed.contains('\0')
    {
        return Err(SpotdlError::InvalidName(name.to_string()));
    }
    Ok(())
}

fn new_sync_args(url: &str, save_file: &Path, folder: &Path) -> Vec<String> {
    vec![
        "sync".to_string(),
        url.to_string(),
        "--save-file".to_string(),
        save_file.to_string_lossy().to_string(),
        "--output".to_string(),
        folder.to_string_lossy().to_string(),
    ]
}

fn update_sync_args(save_file: &Path, folder: &Path) -> Vec<String> {
    vec![
        "sync".to_string(),
        save_file.to_string_lossy().to_string(),
        "--output".to_string(),
        folder.to_string_lossy().to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::{
        find_save_file, new_sync_args, update_sync_args, validate_name, SpotdlClient, SpotdlError,
    };
    use std::fs;
    use std::path::{Path, PathBuf};
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_dir(label: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let dir = std::env::temp_dir().join(format!("spotdl-test-{}-{}", label, nanos));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn builds_first_sync_invocation() {
        let args = new_sync_args(
            "https://open.spotify.com/playlist/abc",
            Path::new("/music/Mix/Mix.spotdl"),
            Path::new("/music/Mix"),
        );
        assert_eq!(
            args,
            vec![
                "sync",
                "https://open.spotify.com/playlist/abc",
                "--save-file",
                "/music/Mix/Mix.spotdl",
                "--output",
                "/music/Mix",
            ]
        );
    }

    #[test]
    fn builds_update_sync_invocation() {
        let args = update_sync_args(Path::new("/music/Mix/Mix.spotdl"), Path::new("/music/Mix"));
        assert_eq!(
            args,
            vec!["sync", "/music/Mix/Mix.spotdl", "--output", "/music/Mix"]
        );
    }

    #[test]
    fn rejects_names_that_escape_the_root() {
        assert!(validate_name("Chill Mix").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name("..").is_err());
        assert!(validate_name("a/b").is_err());
        assert!(validate_name("a\\b").is_err());
    }

    #[test]
    fn update_sync_fails_without_save_file() {
        let dir = temp_dir("update-sync");
        let client = SpotdlClient::new("spotdl", Vec::new());
        let err = client.update_sync(&dir).unwrap_err();
        assert!(matches!(err, SpotdlError::SaveFileMissing(_)));
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn finds_save_file_in_folder() {
        let dir = temp_dir("save-file");
        assert!(find_save_file(&dir).unwrap().is_none());

        fs::write(dir.join("song.mp3"), "x").unwrap();
        fs::write(dir.join("Mix.spotdl"), "{}").unwrap();
        let found = find_save_file(&dir).unwrap().unwrap();
        assert_eq!(found.file_name().unwrap(), "Mix.spotdl");

        fs::remove_dir_all(&dir).unwrap();
    }
}
