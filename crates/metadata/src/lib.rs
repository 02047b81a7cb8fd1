use std::path::Path;

use common::SongTags;
use lofty::config::WriteOptions;
use lofty::error::LoftyError;
use lofty::prelude::{ItemKey, TagExt, TaggedFileExt};
use lofty::tag::Tag;

#[derive(Debug)]
pub enum MetadataError {
    Io(std::io::Error),
    Lofty(LoftyError),
}

impl std::fmt::Display for MetadataError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetadataError::Io(err) => write!(f, "io error: {}", err),
            MetadataError::Lofty(err) => write!(f, "tag error: {}", err),
        }
    }
}

impl std::error::Error for MetadataError {}

impl From<std::io::Error> for MetadataError {
    fn from(err: std::io::Error) -> Self {
        MetadataError::Io(err)
    }
}

impl From<LoftyError> for MetadataError {
    fn from(err: LoftyError) -> Self {
        MetadataError::Lofty(err)
    }
}

pub fn read_tags(path: &Path) -> Result<SongTags, MetadataError> {
    let tagged_file = lofty::read_from_path(path)?;

    let mut tags = SongTags::default();
    if let Some(tag) = tagged_file.primary_tag().or_else(|| tagged_file.first_tag()) {
        tags.title = tag.get_string(&ItemKey::TrackTitle).map(|v| v.to_string());
        tags.artist = tag.get_string(&ItemKey::TrackArtist).map(|v| v.to_string());
        tags.album_artist = tag.get_string(&ItemKey::AlbumArtist).map(|v| v.to_string());
        tags.album = tag.get_string(&ItemKey::AlbumTitle).map(|v| v.to_string());
        tags.track_no = tag.get_string(&ItemKey::TrackNumber).and_then(parse_u16);
        tags.disc_no = tag.get_string(&ItemKey::DiscNumber).and_then(parse_u16);
        tags.year = tag.get_string(&ItemKey::Year).and_then(parse_year);
        tags.comment = tag.get_string(&ItemKey::Comment).map(|v| v.to_string());
        if let Some(value) = tag.get_string(&ItemKey::Genre) {
            tags.genres = parse_genres(value);
        }
    }

    Ok(tags)
}

pub fn write_tags(path: &Path, tags: &SongTags) -> Result<(), MetadataError> {
    let tagged_file = lofty::read_from_path(path)?;
    let mut tag = tagged_file
        .primary_tag()
        .or_else(|| tagged_file.first_tag())
        .cloned()
        .unwrap_or_else(|| Tag::new(tagged_file.primary_tag_type()));

    set_text(&mut tag, ItemKey::TrackTitle, tags.title.as_deref());
    set_text(&mut tag, ItemKey::TrackArtist, tags.artist.as_deref());
    set_text(&mut tag, ItemKey::AlbumArtist, tags.album_artist.as_deref());
    set_text(&mut tag, ItemKey::AlbumTitle, tags.album.as_deref());
    set_text(
        &mut tag,
        ItemKey::TrackNumber,
        tags.track_no.map(|n| n.to_string()).as_deref(),
    );
    set_text(
        &mut tag,
        ItemKey::DiscNumber,
        tags.disc_no.map(|n| n.to_string()).as_deref(),
    );
    set_text(
        &mut tag,
        ItemKey::Year,
        tags.year.map(|y| y.to_string()).as_deref(),
    );
    set_text(&mut tag, ItemKey::Comment, tags.comment.as_deref());
    set_genres(&mut tag, &tags.genres);

    tag.save_to_path(path, WriteOptions::default())?;
    Ok(())
}

pub fn write_genres(path: &Path, genres: &[String]) -> Result<(), MetadataError> {
    let tagged_file = lofty::read_from_path(path)?;
    let mut tag = tagged_file
        .primary_tag()
        .or_else(|| tagged_file.first_tag())
        .cloned()
        .unwrap_or_else(|| Tag::new(tagged_file.primary_tag_type()));

    set_genres(&mut tag, genres);
    tag.save_to_path(path, WriteOptions::default())?;
    Ok(())
}

fn set_text(tag: &mut Tag, key: ItemKey, value: Option<&str>) {
    match value {
        Some(value) if !value.trim().is_empty() => {
            tag.insert_text(key, value.to_string());
        }
        _ => {
            tag.remove_key(&key);
        }
    }
}

fn set_genres(tag: &mut Tag, genres: &[String]) {
    if genres.is_empty() {
        tag.remove_key(&ItemKey::Genre);
    } else {
        tag.insert_text(ItemKey::Genre, join_genres(genres));
    }
}

pub fn join_genres(genres: &[String]) -> String {
    genres.join("; ")
}

pub fn parse_genres(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    for part in text.split(&[';', ',', '/', '|', '\0'][..]) {
        let trimmed = part.trim();
        if trimmed.is_empty() {
            continue;
        }
        out.push(trimmed.to_string());
    }
    if out.is_empty() {
        let trimmed = text.trim();
        if !trimmed.is_empty() {
            out.push(trimmed.to_string());
        }
    }
    out
}

fn parse_u16(text: &str) -> Option<u16> {
    let head = text.split('/').next().unwrap_or(text).trim();
    head.parse().ok()
}

fn parse_year(text: &str) -> Option<i32> {
    let mut digits = String::new();
    for ch in text.chars() {
        if ch.is_ascii_digit() {
            digits.push(ch);
            if digits.len() == 4 {
                break;
            }
        } else if !digits.is_empty() {
            break;
        }
    }
    if digits.is_empty() {
        None
    } else {
        digits.parse().ok()
    }
}
