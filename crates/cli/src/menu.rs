use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuAction {
    FirstSync,
    UpdateSync,
    FixGenres,
    WriteSongList,
    ScanMetadata,
    ApplyMetadata,
    UpdateIndex,
    Exit,
}

pub fn print_menu() {
    println!("\nSpotify Playlist Sync Tool");
    println!("--------------------------");
    println!("1. First-time sync");
    println!("2. Update existing sync");
    println!("3. Fix genres");
    println!("4. Write song list");
    println!("5. Metadata backup");
    println!("6. Apply metadata from json");
    println!("7. Update library index");
    println!("8. Exit");
    println!();
}

pub fn parse_choice(input: &str) -> Option<MenuAction> {
    match input.trim() {
        "1" => Some(MenuAction::FirstSync),
        "2" => Some(MenuAction::UpdateSync),
        "3" => Some(MenuAction::FixGenres),
        "4" => Some(MenuAction::WriteSongList),
        "5" => Some(MenuAction::ScanMetadata),
        "6" => Some(MenuAction::ApplyMetadata),
        "7" => Some(MenuAction::UpdateIndex),
        "8" => Some(MenuAction::Exit),
        _ => None,
    }
}

/// Resolves a playlist name to its folder under the root. `Err` carries the
/// path that was not found, for the folder-not-found message.
pub fn resolve_playlist_folder(root: &Path, name: &str) -> Result<PathBuf, PathBuf> {
    if !root.is_dir() {
        return Err(root.to_path_buf());
    }
    let folder = root.join(name);
    if !folder.is_dir() {
        return Err(folder);
    }
    Ok(folder)
}

/// Prints the label and reads one trimmed line. Returns `None` at end of
/// input so the menu loop can exit cleanly.
pub fn prompt(label: &str) -> io::Result<Option<String>> {
    print!("{}", label);
    io::stdout().flush()?;
    let mut line = String::new();
    let read = io::stdin().lock().read_line(&mut line)?;
    if read == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::{parse_choice, resolve_playlist_folder, MenuAction};
    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_dir(label: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let dir = std::env::temp_dir().join(format!("menu-test-{}-{}", label, nanos));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn routes_each_numeric_choice() {
        assert_eq!(parse_choice("1"), Some(MenuAction::FirstSync));
        assert_eq!(parse_choice("2"), Some(MenuAction::UpdateSync));
        assert_eq!(parse_choice("3"), Some(MenuAction::FixGenres));
        assert_eq!(parse_choice("4"), Some(MenuAction::WriteSongList));
        assert_eq!(parse_choice("5"), Some(MenuAction::ScanMetadata));
        assert_eq!(parse_choice("6"), Some(MenuAction::ApplyMetadata));
        assert_eq!(parse_choice("7"), Some(MenuAction::UpdateIndex));
        assert_eq!(parse_choice("8"), Some(MenuAction::Exit));
    }

    #[test]
    fn trims_whitespace_and_rejects_unknown_input() {
        assert_eq!(parse_choice(" 3 \n"), Some(MenuAction::FixGenres));
        assert_eq!(parse_choice("9"), None);
        assert_eq!(parse_choice("exit"), None);
        assert_eq!(parse_choice(""), None);
    }

    #[test]
    fn reports_missing_playlist_folder() {
        let root = temp_dir("resolve");
        fs::create_dir(root.join("Chill Mix")).unwrap();

        assert_eq!(
            resolve_playlist_folder(&root, "Chill Mix"),
            Ok(root.join("Chill Mix"))
        );
        assert_eq!(
            resolve_playlist_folder(&root, "Workout"),
            Err(root.join("Workout"))
        );

        fs::remove_dir_all(&root).unwrap();
    }

    #[test]
    fn reports_missing_playlists_root() {
        let dir = temp_dir("resolve-root");
        let root = dir.join("gone");
        assert_eq!(
            resolve_playlist_folder(&root, "Chill Mix"),
            Err(root.clone())
        );
        fs::remove_dir_all(&dir).unwrap();
    }
}
