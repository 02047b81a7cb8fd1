mod config;
mod menu;

use std::error::Error;
use std::path::PathBuf;

use config::{config_path_from_env, load_or_create_config, resolve_path};
use library::{
    apply_snapshot, fix_genres, list_playlists, load_snapshot, save_snapshot, scan_playlist,
    snapshot_path, write_song_list, Index, StyleMap,
};
use menu::{parse_choice, print_menu, prompt, resolve_playlist_folder, MenuAction};
use spotdl::SpotdlClient;
use tracing::info;

struct App {
    root: PathBuf,
    index_path: PathBuf,
    snapshot_name: String,
    spotdl: SpotdlClient,
    styles: StyleMap,
}

fn main() -> Result<(), Box<dyn Error>> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config_path = config_path_from_env();
    let (config, created) = load_or_create_config(&config_path)?;
    if created {
        info!("Created default config at {:?}", config_path);
    } else {
        info!("Loaded config from {:?}", config_path);
    }

    let app = App {
        root: resolve_path(&config_path, &config.playlists_root),
        index_path: resolve_path(&config_path, &config.index_path),
        snapshot_name: config.snapshot_name.clone(),
        spotdl: SpotdlClient::new(config.spotdl_bin.clone(), config.spotdl_args.clone()),
        styles: StyleMap::new(config.styles.clone()),
    };

    loop {
        print_menu();
        let choice = match prompt("Choice (1-8): ")? {
            Some(choice) => choice,
            None => break,
        };
        let action = match parse_choice(&choice) {
            Some(action) => action,
            None => {
                println!("Invalid choice!");
                continue;
            }
        };
        if action == MenuAction::Exit {
            break;
        }
        if let Err(err) = run_action(&app, action) {
            println!("\nError: {}", err);
        }
    }

    Ok(())
}

fn run_action(app: &App, action: MenuAction) -> Result<(), Box<dyn Error>> {
    match action {
        MenuAction::FirstSync => handle_first_sync(app),
        MenuAction::UpdateSync => handle_update_sync(app),
        MenuAction::FixGenres => handle_fix_genres(app),
        MenuAction::WriteSongList => handle_song_list(app),
        MenuAction::ScanMetadata => handle_scan_metadata(app),
        MenuAction::ApplyMetadata => handle_apply_metadata(app),
        MenuAction::UpdateIndex => handle_update_index(app),
        MenuAction::Exit => Ok(()),
    }
}

fn handle_first_sync(app: &App) -> Result<(), Box<dyn Error>> {
    let url = match prompt("\nEnter Spotify playlist URL: ")? {
        Some(url) if !url.is_empty() => url,
        _ => {
            println!("Please provide a valid Spotify playlist URL.");
            return Ok(());
        }
    };
    let name = match prompt("Enter playlist name: ")? {
        Some(name) if !name.is_empty() => name,
        _ => {
            println!("Please provide a valid playlist name.");
            return Ok(());
        }
    };

    println!("Calling spotdl...");
    app.spotdl.new_sync(&url, &name, &app.root)?;
    println!("\nSync finished for '{}'.", name);
    Ok(())
}

fn handle_update_sync(app: &App) -> Result<(), Box<dyn Error>> {
    let (name, folder) = match select_playlist(app)? {
        Some(selected) => selected,
        None => return Ok(()),
    };

    println!("Calling spotdl...");
    app.spotdl.update_sync(&folder)?;
    println!("\nSync finished for '{}'.", name);
    Ok(())
}

fn handle_fix_genres(app: &App) -> Result<(), Box<dyn Error>> {
    let (_, folder) = match select_playlist(app)? {
        Some(selected) => selected,
        None => return Ok(()),
    };

    if app.styles.is_empty() {
        println!("No style mappings configured; genres will only be cleaned up.");
    }
    let stats = fix_genres(&folder, &app.styles)?;
    println!(
        "\nGenres fixed: {} updated, {} unchanged, {} failed.",
        stats.updated, stats.unchanged, stats.failed
    );
    Ok(())
}

fn handle_song_list(app: &App) -> Result<(), Box<dyn Error>> {
    let (_, folder) = match select_playlist(app)? {
        Some(selected) => selected,
        None => return Ok(()),
    };

    let (path, count) = write_song_list(&folder)?;
    println!("\nWrote {} songs to {:?}.", count, path);
    Ok(())
}

fn handle_scan_metadata(app: &App) -> Result<(), Box<dyn Error>> {
    let (_, folder) = match select_playlist(app)? {
        Some(selected) => selected,
        None => return Ok(()),
    };

    let snapshot = scan_playlist(&folder)?;
    let path = save_snapshot(&folder, &app.snapshot_name, &snapshot)?;
    println!("\nWrote metadata for {} songs to {:?}.", snapshot.len(), path);
    Ok(())
}

fn handle_apply_metadata(app: &App) -> Result<(), Box<dyn Error>> {
    let (_, folder) = match select_playlist(app)? {
        Some(selected) => selected,
        None => return Ok(()),
    };

    let path = snapshot_path(&folder, &app.snapshot_name);
    if !path.is_file() {
        println!("\nError: Metadata file not found at: {:?}", path);
        return Ok(());
    }
    let snapshot = load_snapshot(&path)?;
    if snapshot.is_empty() {
        println!("\nError: No metadata found in the JSON file");
        return Ok(());
    }

    let stats = apply_snapshot(&folder, &snapshot)?;
    println!(
        "\nMetadata applied: {} written, {} missing, {} failed.",
        stats.applied, stats.missing, stats.failed
    );
    Ok(())
}

fn handle_update_index(app: &App) -> Result<(), Box<dyn Error>> {
    if !app.root.is_dir() {
        println!("\nError: Folder {:?} not found", app.root);
        return Ok(());
    }
    let index = Index::open(&app.index_path)?;
    let stats = index.rebuild(&app.root)?;
    println!("\nIndexed: {} playlists, {} songs.", stats.playlists, stats.songs);
    Ok(())
}

/// Lists the available playlists, prompts for a name, and resolves it to a
/// folder. Missing folders print a message and return `None`.
fn select_playlist(app: &App) -> Result<Option<(String, PathBuf)>, Box<dyn Error>> {
    if !app.root.is_dir() {
        println!("\nError: Folder {:?} not found", app.root);
        return Ok(None);
    }

    let playlists = list_playlists(&app.root)?;
    if !playlists.is_empty() {
        println!("\nAvailable playlists:");
        for playlist in &playlists {
            println!("{}", playlist);
        }
    }

    let name = match prompt("\nEnter playlist name: ")? {
        Some(name) if !name.is_empty() => name,
        _ => {
            println!("Please provide a valid playlist name.");
            return Ok(None);
        }
    };

    match resolve_playlist_folder(&app.root, &name) {
        Ok(folder) => Ok(Some((name, folder))),
        Err(missing) => {
            println!("\nError: Folder {:?} not found", missing);
            Ok(None)
        }
    }
}
