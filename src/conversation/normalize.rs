//! Token normalization for values arriving as loose text (mostly voice).

use super::vocab::Gender;

/// A closed set of wire values with a canonical spelling.
pub trait Vocabulary: Sized + Copy + PartialEq + 'static {
    /// Every variant, in declaration order.
    const ALL: &'static [Self];

    /// Canonical wire spelling.
    fn as_str(&self) -> &'static str;
}

/// Lowercase, trim, and replace spaces with underscores.
pub fn normalize_token(token: &str) -> String {
    token.trim().to_lowercase().replace(' ', "_")
}

/// Match a loose token against a vocabulary.
pub fn one_of<V: Vocabulary>(raw: &str) -> Option<V> {
    let wanted = normalize_token(raw);
    if wanted.is_empty() {
        return None;
    }
    V::ALL
        .iter()
        .copied()
        .find(|v| normalize_token(v.as_str()) == wanted)
}

/// Match several tokens, dropping unknown ones and duplicates while keeping
/// first-appearance order.
pub fn many_of<'a, V, I>(raws: I) -> Vec<V>
where
    V: Vocabulary,
    I: IntoIterator<Item = &'a str>,
{
    let mut out: Vec<V> = Vec::new();
    for raw in raws {
        if let Some(v) = one_of::<V>(raw) {
            if !out.contains(&v) {
                out.push(v);
            }
        }
    }
    out
}

/// Map common spellings of gender; anything unrecognized becomes `Other`.
pub fn norm_gender(raw: &str) -> Option<Gender> {
    let token = normalize_token(raw);
    let gender = match token.as_str() {
        "" => return None,
        "m" | "male" | "man" | "masculine" => Gender::Male,
        "f" | "female" | "woman" | "feminine" => Gender::Female,
        "prefer_not_to_say" => Gender::PreferNotToSay,
        _ => Gender::Other,
    };
    Some(gender)
}
