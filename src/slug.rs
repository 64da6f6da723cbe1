//! Slug derivation for cities and sights.
//!
//! A slug is the uniqueness key for a document: lowercase ASCII, words
//! joined by single hyphens. Derivation is deterministic, so the same
//! display name always maps to the same slug; two names that collapse to
//! the same slug collide at insert time and surface as a duplicate-key
//! conflict.

/// Derive a URL-safe slug from a display name.
///
/// Latin diacritics and Cyrillic are transliterated to ASCII; any other
/// non-alphanumeric characters act as separators. Runs of separators
/// collapse into one hyphen, and leading/trailing hyphens are trimmed.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_hyphen = false;

    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_hyphen {
                slug.push('-');
                pending_hyphen = false;
            }
            slug.push(ch.to_ascii_lowercase());
            continue;
        }
        let Some(mapped) = transliterate(ch) else {
            // Separator: emit a single hyphen before the next word.
            if !slug.is_empty() {
                pending_hyphen = true;
            }
            continue;
        };
        if pending_hyphen && !mapped.is_empty() {
            slug.push('-');
            pending_hyphen = false;
        }
        slug.push_str(mapped);
    }

    slug
}

/// Map one non-ASCII character to its lowercase ASCII spelling.
///
/// `None` marks a separator; `Some("")` drops the character without
/// breaking the word (Cyrillic hard/soft signs).
fn transliterate(ch: char) -> Option<&'static str> {
    match ch {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'À' | 'Á' | 'Â' | 'Ã' | 'Ä' | 'Å' => Some("a"),
        'è' | 'é' | 'ê' | 'ë' | 'È' | 'É' | 'Ê' | 'Ë' => Some("e"),
        'ì' | 'í' | 'î' | 'ï' | 'Ì' | 'Í' | 'Î' | 'Ï' => Some("i"),
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ö' => Some("o"),
        'ù' | 'ú' | 'û' | 'ü' | 'Ù' | 'Ú' | 'Û' | 'Ü' => Some("u"),
        'ý' | 'ÿ' | 'Ý' => Some("y"),
        'ç' | 'Ç' => Some("c"),
        'ñ' | 'Ñ' => Some("n"),
        'ß' => Some("ss"),
        'æ' | 'Æ' => Some("ae"),
        'ø' | 'Ø' => Some("o"),

        'а' | 'А' => Some("a"),
        'б' | 'Б' => Some("b"),
        'в' | 'В' => Some("v"),
        'г' | 'Г' => Some("g"),
        'д' | 'Д' => Some("d"),
        'е' | 'Е' | 'э' | 'Э' => Some("e"),
        'ё' | 'Ё' => Some("yo"),
        'ж' | 'Ж' => Some("zh"),
        'з' | 'З' => Some("z"),
        'и' | 'И' => Some("i"),
        'й' | 'Й' => Some("y"),
        'к' | 'К' => Some("k"),
        'л' | 'Л' => Some("l"),
        'м' | 'М' => Some("m"),
        'н' | 'Н' => Some("n"),
        'о' | 'О' => Some("o"),
        'п' | 'П' => Some("p"),
        'р' | 'Р' => Some("r"),
        'с' | 'С' => Some("s"),
        'т' | 'Т' => Some("t"),
        'у' | 'У' => Some("u"),
        'ф' | 'Ф' => Some("f"),
        'х' | 'Х' => Some("kh"),
        'ц' | 'Ц' => Some("ts"),
        'ч' | 'Ч' => Some("ch"),
        'ш' | 'Ш' => Some("sh"),
        'щ' | 'Щ' => Some("shch"),
        'ы' | 'Ы' => Some("y"),
        'ю' | 'Ю' => Some("yu"),
        'я' | 'Я' => Some("ya"),
        'ъ' | 'Ъ' | 'ь' | 'Ь' => Some(""),

        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_names_lowercase() {
        assert_eq!(slugify("Tomsk"), "tomsk");
        assert_eq!(slugify("Moscow"), "moscow");
    }

    #[test]
    fn spaces_become_single_hyphens() {
        assert_eq!(slugify("Red Square"), "red-square");
        assert_eq!(slugify("Nizhny   Novgorod"), "nizhny-novgorod");
    }

    #[test]
    fn punctuation_is_a_separator() {
        assert_eq!(slugify("Saint-Petersburg"), "saint-petersburg");
        assert_eq!(slugify("Rostov-on-Don!"), "rostov-on-don");
        assert_eq!(slugify("  Tver  "), "tver");
    }

    #[test]
    fn digits_survive() {
        assert_eq!(slugify("Sector 7"), "sector-7");
    }

    #[test]
    fn latin_diacritics_transliterate() {
        assert_eq!(slugify("Château d'Eau"), "chateau-d-eau");
        assert_eq!(slugify("Zürich"), "zurich");
        assert_eq!(slugify("Straße"), "strasse");
    }

    #[test]
    fn cyrillic_transliterates() {
        assert_eq!(slugify("Москва"), "moskva");
        assert_eq!(slugify("Красная площадь"), "krasnaya-ploshchad");
        assert_eq!(slugify("Тверь"), "tver");
    }

    #[test]
    fn hard_and_soft_signs_vanish_inside_words() {
        assert_eq!(slugify("Подъезд"), "podezd");
    }

    #[test]
    fn unknown_symbols_drop_out() {
        assert_eq!(slugify("東京 City"), "city");
        assert_eq!(slugify("!!!"), "");
    }
}
