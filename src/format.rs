//! Display strings for titles, episodes and release information.
//!
//! Every field of [`Meta`] and [`Video`] is optional. A helper returns
//! `None` when there is nothing sensible to show rather than an empty
//! string.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;

/// Catalog metadata for a movie or a series.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    pub name: Option<String>,
    pub release_info: Option<String>,
    pub released: Option<String>,
    pub runtime: Option<String>,
    pub description: Option<String>,
}

/// A single playable item of a series.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    pub season: Option<u32>,
    pub episode: Option<u32>,
    pub title: Option<String>,
    pub name: Option<String>,
    pub released: Option<String>,
    pub runtime: Option<String>,
    pub overview: Option<String>,
}

/// `S1E2`, `S1` or `E2`.
pub fn season_episode_label(video: Option<&Video>) -> Option<String> {
    let video = video?;
    match (video.season, video.episode) {
        (Some(season), Some(episode)) => Some(format!("S{}E{}", season, episode)),
        (Some(season), None) => Some(format!("S{}", season)),
        (None, Some(episode)) => Some(format!("E{}", episode)),
        (None, None) => None,
    }
}

/// The episode's title, falling back to its name.
pub fn episode_title(video: Option<&Video>) -> Option<&str> {
    video.and_then(|v| v.title.as_deref().or(v.name.as_deref()))
}

/// `S1E2: Pilot`, as used on "continue watching" cards. `None` for movies.
pub fn episode_card_title(video: Option<&Video>) -> Option<String> {
    if video.is_none() {
        return None;
    }
    let title = episode_title(video).filter(|t| !t.is_empty());
    match (season_episode_label(video), title) {
        (Some(label), Some(title)) => Some(format!("{}: {}", label, title)),
        (Some(label), None) => Some(label),
        (None, title) => title.map(String::from),
    }
}

/// `2. Episode Title`, as used in episode lists.
pub fn episode_list_title(video: Option<&Video>) -> String {
    let number = video
        .and_then(|v| v.episode)
        .map_or_else(|| "?".to_string(), |e| e.to_string());
    let title = episode_title(video).unwrap_or("Unknown");
    format!("{}. {}", number, title)
}

/// `Show S1E2: Episode Title` for series, the plain name for movies.
pub fn player_title(meta: Option<&Meta>, video: Option<&Video>) -> Option<String> {
    let name = meta?.name.as_deref().filter(|n| !n.is_empty())?;
    match episode_card_title(video) {
        Some(episode) => Some(format!("{} {}", name, episode)),
        None => Some(name.to_string()),
    }
}

/// Release date as `M/D/YYYY`.
pub fn release_date(released: Option<&str>) -> Option<String> {
    parse_release(released).map(|d| d.format("%-m/%-d/%Y").to_string())
}

pub fn release_year(released: Option<&str>) -> Option<String> {
    parse_release(released).map(|d| d.year().to_string())
}

/// The catalog's release info (`2019-2023`) if present, otherwise the
/// release year of the video or of the title itself.
pub fn release_info(meta: Option<&Meta>, video: Option<&Video>) -> Option<String> {
    let info = meta
        .and_then(|m| m.release_info.as_deref())
        .map(str::trim)
        .filter(|i| !i.is_empty());
    if let Some(info) = info {
        return Some(info.to_string());
    }

    let released = video
        .and_then(|v| v.released.as_deref())
        .or_else(|| meta.and_then(|m| m.released.as_deref()));
    release_year(released)
}

pub fn runtime(meta: Option<&Meta>, video: Option<&Video>) -> Option<String> {
    first_filled(
        video.and_then(|v| v.runtime.as_deref()),
        meta.and_then(|m| m.runtime.as_deref()),
    )
}

pub fn description(meta: Option<&Meta>, video: Option<&Video>) -> Option<String> {
    first_filled(
        video.and_then(|v| v.overview.as_deref()),
        meta.and_then(|m| m.description.as_deref()),
    )
}

fn first_filled(preferred: Option<&str>, fallback: Option<&str>) -> Option<String> {
    [preferred, fallback]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(String::from)
}

fn parse_release(released: Option<&str>) -> Option<NaiveDate> {
    let released = released?.trim();
    if released.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(released, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(released)
                .ok()
                .map(|d| d.with_timezone(&Utc).date_naive())
        })
        .or_else(|| {
            NaiveDateTime::parse_from_str(released, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|d| d.date())
        })
}
