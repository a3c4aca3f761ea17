//! Source text cleaning: turns a raw corpus file into one flat line of prose.

use regex::Regex;
use std::sync::LazyLock;

/// `'s` where it ends a word.
static POSSESSIVE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"'s\b").expect("possessive pattern is valid"));

/// Flatten raw corpus text.
///
/// Drops digits, underscores, colons, straight double quotes and possessive
/// `'s`; joins wrapped lines; turns hyphens into spaces; removes em-dash
/// separators; replaces sentence punctuation with spaces.
pub fn clean_source_text(raw: &str) -> String {
    let text = raw.replace('\r', "");
    let text: String = text.chars().filter(|c| !c.is_ascii_digit()).collect();
    let text = text.replace("\n ", "").replace('\n', " ");
    let text = text.replace(['_', ':', '"'], "");
    let text = POSSESSIVE.replace_all(&text, "");
    let text = text.replace('-', " ").replace("\u{2014} ", "");
    text.split(['.', '?', '!']).collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removes_digits_and_symbols() {
        assert_eq!(
            clean_source_text("1:1 In the_beginning \"God\" created"),
            " In thebeginning God created"
        );
    }

    #[test]
    fn joins_wrapped_lines() {
        assert_eq!(clean_source_text("Once upon\na midnight"), "Once upon a midnight");
        assert_eq!(clean_source_text("Once upon\n a midnight"), "Once upona midnight");
    }

    #[test]
    fn splits_sentences_into_spaces() {
        assert_eq!(
            clean_source_text("Nevermore. Who? Not I!"),
            "Nevermore  Who  Not I "
        );
    }

    #[test]
    fn hyphens_and_dashes() {
        assert_eq!(clean_source_text("well-remembered"), "well remembered");
        assert_eq!(clean_source_text("door\u{2014} only"), "dooronly");
    }

    #[test]
    fn strips_only_possessive_s() {
        assert_eq!(clean_source_text("the raven's beak"), "the raven beak");
        assert_eq!(clean_source_text("'sblood"), "'sblood");
        assert_eq!(clean_source_text("it's"), "it");
        assert_eq!(clean_source_text("Lenore's."), "Lenore ");
    }

    #[test]
    fn windows_line_endings() {
        assert_eq!(clean_source_text("dreary\r\nweak"), "dreary weak");
    }
}
