//! Record identifiers and URL slugs.

use std::collections::HashSet;

use uuid::Uuid;

/// Base used when a title has nothing slug-able in it.
pub const FALLBACK_SLUG: &str = "hotel";

/// Slugs that would shadow fixed routes.
pub const RESERVED_SLUGS: &[&str] = &["images"];

pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Lowercase, transliterate common Latin letters and join words with `-`.
///
/// Hyphens and whitespace separate words; any other punctuation is dropped
/// without splitting, so `"Tom's Place"` becomes `toms-place`.
pub fn slugify(title: &str) -> String {
    let mut cleaned = String::with_capacity(title.len());
    for ch in title.chars().flat_map(char::to_lowercase) {
        match ch {
            'a'..='z' | '0'..='9' => cleaned.push(ch),
            '-' => cleaned.push(' '),
            c if c.is_whitespace() => cleaned.push(' '),
            '&' => cleaned.push_str("and"),
            c => {
                if let Some(ascii) = transliterate(c) {
                    cleaned.push_str(ascii);
                }
            }
        }
    }

    cleaned.split_whitespace().collect::<Vec<_>>().join("-")
}

fn transliterate(ch: char) -> Option<&'static str> {
    let ascii = match ch {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' => "a",
        'æ' => "ae",
        'ç' | 'ć' | 'č' => "c",
        'ď' | 'đ' | 'ð' => "d",
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ė' | 'ę' | 'ě' => "e",
        'ğ' => "g",
        'ì' | 'í' | 'î' | 'ï' | 'ī' | 'į' | 'ı' => "i",
        'ł' | 'ľ' => "l",
        'ñ' | 'ń' | 'ň' => "n",
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' | 'ő' => "o",
        'œ' => "oe",
        'ř' => "r",
        'ß' => "ss",
        'ś' | 'š' | 'ş' => "s",
        'ť' | 'ţ' => "t",
        'þ' => "th",
        'ù' | 'ú' | 'û' | 'ü' | 'ū' | 'ů' | 'ű' | 'ų' => "u",
        'ý' | 'ÿ' => "y",
        'ź' | 'ż' | 'ž' => "z",
        _ => return None,
    };
    Some(ascii)
}

/// Slugify `title`, substituting [`FALLBACK_SLUG`] for an empty result.
pub fn base_slug(title: &str) -> String {
    let slug = slugify(title);
    if slug.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        slug
    }
}

/// Returns `base` if it is free, otherwise the first free `base-N` (N >= 1).
pub fn unique_slug(base: &str, taken: &HashSet<&str>) -> String {
    if !taken.contains(base) {
        return base.to_string();
    }
    (1u64..)
        .map(|n| format!("{base}-{n}"))
        .find(|candidate| !taken.contains(candidate.as_str()))
        .unwrap_or_else(|| base.to_string())
}

/// Collects `slugs` plus the reserved route names.
pub fn taken_slugs<'a>(slugs: impl IntoIterator<Item = &'a str>) -> HashSet<&'a str> {
    slugs
        .into_iter()
        .chain(RESERVED_SLUGS.iter().copied())
        .collect()
}
