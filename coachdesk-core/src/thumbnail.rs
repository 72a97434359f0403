//! Preview images for exercises, derived from their YouTube links.

use std::sync::LazyLock;

use log::{debug, warn};
use regex::Regex;

use crate::models::Exercise;

const YOUTUBE_ID_LEN: usize = 11;

// Greedy prefix: the capture follows the last recognised marker in the URL.
static YOUTUBE_PATTERN: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"^.*(youtu\.be/|v/|u/[0-9A-Za-z_]/|embed/|watch\?v=|&v=)([^#&?]*).*").ok()
});

/// Returns the `hqdefault` thumbnail for a YouTube URL, or `None` when the
/// URL is absent or no 11 character video id can be extracted.
pub fn youtube_thumbnail(url: Option<&str>) -> Option<String> {
    let url = url?;
    let Some(pattern) = YOUTUBE_PATTERN.as_ref() else {
        warn!("youtube_thumbnail pattern failed to compile");
        return None;
    };
    let id = pattern.captures(url)?.get(2)?.as_str();
    // Length in UTF-16 units, as browsers measure it.
    if id.encode_utf16().count() != YOUTUBE_ID_LEN {
        debug!("youtube_thumbnail rejected candidate id '{}'", id);
        return None;
    }
    Some(format!("https://img.youtube.com/vi/{}/hqdefault.jpg", id))
}

/// Image to show on an exercise card: the explicit image wins, then the
/// video thumbnail. `None` means the caller should draw a placeholder.
pub fn display_image(exercise: &Exercise) -> Option<String> {
    match exercise.image_url.as_deref() {
        Some(img) if !img.trim().is_empty() => Some(img.to_string()),
        _ => youtube_thumbnail(exercise.video_url.as_deref()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thumb(id: &str) -> Option<String> {
        Some(format!("https://img.youtube.com/vi/{}/hqdefault.jpg", id))
    }

    #[test]
    fn watch_url() {
        assert_eq!(
            youtube_thumbnail(Some("https://www.youtube.com/watch?v=HzIiNhHhhtA")),
            thumb("HzIiNhHhhtA")
        );
    }

    #[test]
    fn other_youtube_shapes() {
        let cases = [
            "https://youtu.be/U3HlEF_E9fo",
            "https://youtu.be/U3HlEF_E9fo?t=42",
            "https://www.youtube.com/embed/U3HlEF_E9fo",
            "https://www.youtube.com/v/U3HlEF_E9fo?version=3",
            "https://www.youtube.com/u/1/U3HlEF_E9fo",
            "https://www.youtube.com/watch?feature=share&v=U3HlEF_E9fo",
            "https://www.youtube.com/watch?v=U3HlEF_E9fo#t=30",
        ];
        for url in cases {
            assert_eq!(youtube_thumbnail(Some(url)), thumb("U3HlEF_E9fo"), "{}", url);
        }
    }

    #[test]
    fn ids_with_dashes_and_underscores() {
        assert_eq!(
            youtube_thumbnail(Some("https://www.youtube.com/watch?v=-M4-G8p8fmc")),
            thumb("-M4-G8p8fmc")
        );
    }

    #[test]
    fn wrong_length_is_rejected() {
        assert_eq!(youtube_thumbnail(Some("https://youtu.be/abc")), None);
        assert_eq!(
            youtube_thumbnail(Some("https://www.youtube.com/watch?v=HzIiNhHhhtAextra")),
            None
        );
        assert_eq!(youtube_thumbnail(Some("https://www.youtube.com/watch?v=")), None);
    }

    #[test]
    fn id_length_counts_utf16_units() {
        let astral = format!("https://youtu.be/{}", "\u{1F600}".repeat(11));
        assert_eq!(youtube_thumbnail(Some(&astral)), None);
        let accented = "https://youtu.be/ábcdéfghíjk";
        assert_eq!(youtube_thumbnail(Some(accented)), thumb("ábcdéfghíjk"));
    }

    #[test]
    fn absent_or_foreign_urls() {
        assert_eq!(youtube_thumbnail(None), None);
        assert_eq!(youtube_thumbnail(Some("")), None);
        assert_eq!(youtube_thumbnail(Some("https://vimeo.com/123456789")), None);
        assert_eq!(youtube_thumbnail(Some("not a url at all")), None);
    }

    #[test]
    fn repeated_calls_agree() {
        let url = Some("https://youtu.be/QOVaHwm-Q6U");
        let first = youtube_thumbnail(url);
        for _ in 0..5 {
            assert_eq!(youtube_thumbnail(url), first);
        }
    }

    #[test]
    fn explicit_image_takes_precedence() {
        let mut ex = Exercise {
            id: "1".into(),
            name: "Squat".into(),
            muscle_group: "Legs".into(),
            sets: "3".into(),
            reps: "10".into(),
            video_url: Some("https://www.youtube.com/watch?v=U3HlEF_E9fo".into()),
            image_url: Some("https://images.example.com/squat.jpg".into()),
            description: None,
        };
        assert_eq!(
            display_image(&ex).as_deref(),
            Some("https://images.example.com/squat.jpg")
        );
        ex.image_url = Some(String::new());
        assert_eq!(display_image(&ex), thumb("U3HlEF_E9fo"));
        ex.video_url = None;
        assert_eq!(display_image(&ex), None);
    }
}
