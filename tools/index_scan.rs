use std::env;
use std::path::{Path, PathBuf};

use library::{record_line, Index};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut args = env::args().skip(1);
    let playlists_root = args
        .next()
        .or_else(|| env::var("PLAYLISTS_ROOT").ok())
        .ok_or("PLAYLISTS_ROOT not set and no path argument")?;
    let index_path = args
        .next()
        .or_else(|| env::var("INDEX_PATH").ok())
        .unwrap_or_else(|| "tunesync.redb".to_string());
    let playlist = args.next();

    let root = PathBuf::from(&playlists_root);
    let index_exists = Path::new(&index_path).exists();
    let (index, rebuilt) = Index::load_or_rebuild(&PathBuf::from(&index_path), &root)?;
    let stats = if index_exists && !rebuilt {
        index.rebuild(&root)?
    } else {
        index.stats()?
    };

    println!(
        "Indexed: {} playlists, {} songs",
        stats.playlists, stats.songs
    );

    if let Some(playlist) = playlist {
        for record in index.list_songs(&playlist)? {
            println!("{}", record_line(&record));
        }
    }

    Ok(())
}
