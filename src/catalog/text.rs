use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

// Case- and diacritic-insensitive form used for every text comparison
// ("Peugeot 508 Électrique" -> "peugeot 508 electrique")
pub fn normalize_text(input: &str) -> String {
    input
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .trim()
        .to_string()
}
