//! Episode metadata recovered from source file names.
//!
//! File names look like `KAPITAN BOMBA - Title (ODC. 12).json`, sometimes
//! with a `|` or fullwidth `｜` before the episode marker.

use crate::record::UNKNOWN_EPISODE;
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

fn episode_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\(ODC\.\s*(\d+)\)").expect("valid episode regex"))
}

fn title_split_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\s*[|｜]\s*)?\(ODC").expect("valid title regex"))
}

/// Episode identity derived from a file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpisodeHint {
    /// File the transcript was read from.
    pub source_file: String,
    pub episode_id: String,
    pub title: String,
}

/// Parse episode number and title from `file_name`, stripping `series_prefix`.
pub fn parse_episode_filename(file_name: &str, series_prefix: &str) -> EpisodeHint {
    let episode_id = episode_re()
        .captures(file_name)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| UNKNOWN_EPISODE.to_string());

    let stem = Path::new(file_name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| file_name.to_string());

    let without_prefix = if series_prefix.is_empty() {
        stem.as_str()
    } else {
        stem.strip_prefix(series_prefix).unwrap_or(&stem)
    };

    let title = title_split_re()
        .split(without_prefix)
        .next()
        .unwrap_or(without_prefix)
        .trim()
        .to_string();

    EpisodeHint {
        source_file: file_name.to_string(),
        episode_id,
        title: if title.is_empty() { stem.trim().to_string() } else { title },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PREFIX: &str = "KAPITAN BOMBA - ";

    #[test]
    fn test_standard_name() {
        let hint = parse_episode_filename("KAPITAN BOMBA - Kurvinox Attack (ODC. 12).json", PREFIX);
        assert_eq!(hint.source_file, "KAPITAN BOMBA - Kurvinox Attack (ODC. 12).json");
        assert_eq!(hint.episode_id, "12");
        assert_eq!(hint.title, "Kurvinox Attack");
    }

    #[test]
    fn test_pipe_separators() {
        let hint = parse_episode_filename("KAPITAN BOMBA - Sraturn | (ODC. 3).json", PREFIX);
        assert_eq!(hint.episode_id, "3");
        assert_eq!(hint.title, "Sraturn");

        let hint = parse_episode_filename("KAPITAN BOMBA - Sraturn ｜ (ODC.7).json", PREFIX);
        assert_eq!(hint.episode_id, "7");
        assert_eq!(hint.title, "Sraturn");
    }

    #[test]
    fn test_unknown_episode_falls_back_to_stem() {
        let hint = parse_episode_filename("bonus material.json", PREFIX);
        assert_eq!(hint.episode_id, UNKNOWN_EPISODE);
        assert_eq!(hint.title, "bonus material");
    }

    #[test]
    fn test_custom_prefix() {
        let hint = parse_episode_filename("SHOW: Pilot (ODC. 1).json", "SHOW: ");
        assert_eq!(hint.title, "Pilot");
        assert_eq!(hint.episode_id, "1");
    }

    #[test]
    fn test_marker_only_keeps_stem() {
        let hint = parse_episode_filename("(ODC. 5).json", PREFIX);
        assert_eq!(hint.episode_id, "5");
        assert_eq!(hint.title, "(ODC. 5)");
    }
}
