//! OData helpers for building list REST paths and query expressions.

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

/// Characters escaped when a list title is embedded in a URL path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Quote `value` as an OData string literal (`'` doubles to `''`).
pub fn string_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Percent-encode a quoted literal for use inside a path segment.
pub fn encode_path_segment(segment: &str) -> String {
    utf8_percent_encode(segment, PATH_SEGMENT).to_string()
}

/// Build a `field eq 'value'` filter expression.
pub fn eq_filter(field: &str, value: &str) -> String {
    format!("{field} eq {}", string_literal(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_literal_doubles_single_quotes() {
        assert_eq!(string_literal("Sam's list"), "'Sam''s list'");
    }

    #[test]
    fn eq_filter_matches_site_syntax() {
        assert_eq!(eq_filter("Title", "Sam"), "Title eq 'Sam'");
    }

    #[test]
    fn path_segment_encoding_keeps_quotes_and_escapes_spaces() {
        assert_eq!(encode_path_segment("'Team FAQ'"), "'Team%20FAQ'");
        assert_eq!(encode_path_segment("'a/b?'"), "'a%2Fb%3F'");
    }
}
