use regex::Regex;
use std::sync::OnceLock;

const ALBUM_DISC_PATTERN: &str = r"(?i)[\(\[\s]*(Disc|CD)\s*[0-9]{1,2}[\)\]\s]*$";
const ALBUM_MISC_PATTERN: &str =
    r"(?i)[\(\[\s]*(Remastered|[0-9]{1,4} *Remaster|Explicit) ?(Version|Edition)?[\)\]\s]*$";

fn album_disc_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(ALBUM_DISC_PATTERN).expect("valid album disc pattern"))
}

fn album_misc_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(ALBUM_MISC_PATTERN).expect("valid album misc pattern"))
}

/// Strips a trailing disc number and remaster/explicit marker from an album title.
pub fn album_remove_disc_misc(album: &str) -> String {
    let without_disc = album_disc_regex().replace(album, "");
    let without_misc = album_misc_regex().replace(&without_disc, "");

    without_misc.trim().to_string()
}
