//! URL helpers

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Characters left alone by `encodeURIComponent`
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Encode a value for use inside a query string
pub fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, URI_COMPONENT).to_string()
}

/// Link to the post viewer page for a manifest file name
pub fn post_url(file: &str) -> String {
    format!("post.html?file={}", encode_component(file))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_url() {
        assert_eq!(post_url("hello-world.md"), "post.html?file=hello-world.md");
        assert_eq!(
            post_url("2024/first post.md"),
            "post.html?file=2024%2Ffirst%20post.md"
        );
    }

    #[test]
    fn test_encode_non_ascii() {
        assert_eq!(encode_component("글"), "%EA%B8%80");
    }
}
