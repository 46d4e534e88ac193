//! Text direction from the user's language.

/// Primary language subtags written right to left.
const RTL_LANGUAGES: &[&str] = &["ar", "he", "fa", "ur"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ltr,
    Rtl,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Ltr => "ltr",
            Direction::Rtl => "rtl",
        }
    }
}

/// Lowercased primary subtag of a language tag or POSIX locale
/// (`he-IL`, `ar_EG.UTF-8`, `en`). Falls back to `en`.
pub fn primary_language(tag: &str) -> String {
    let primary = tag
        .split(|c| c == '-' || c == '_' || c == '.' || c == '@')
        .next()
        .unwrap_or("")
        .trim()
        .to_lowercase();
    if primary.is_empty() || primary == "c" || primary == "posix" {
        "en".to_string()
    } else {
        primary
    }
}

pub fn direction_for(language: &str) -> Direction {
    if RTL_LANGUAGES.contains(&language) {
        Direction::Rtl
    } else {
        Direction::Ltr
    }
}

/// Resolve language and direction from an explicit tag or `$LANG`.
pub fn detect(configured: Option<&str>) -> (String, Direction) {
    let tag = configured
        .map(str::to_string)
        .or_else(|| std::env::var("LANG").ok())
        .unwrap_or_else(|| "en".to_string());
    let language = primary_language(&tag);
    let direction = direction_for(&language);
    (language, direction)
}
