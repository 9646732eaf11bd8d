use once_cell::sync::Lazy;
use regex::bytes::Regex;

// Unicode mode keeps the token class on whole UTF-8 scalars, so a match is
// always valid UTF-8 even when the surrounding template is not.
pub(super) static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\{\s*[^\s{}]*\s*\}\}").expect("placeholder pattern is valid")
});

/// Find every `{{ ... }}` placeholder in `text`, verbatim and in order.
///
/// Duplicates are kept; the exact matched text is the substitution key.
pub fn find_placeholders<T: AsRef<[u8]> + ?Sized>(text: &T) -> Vec<String> {
    PLACEHOLDER
        .find_iter(text.as_ref())
        .map(|m| placeholder_text(m.as_bytes()))
        .collect()
}

pub(super) fn placeholder_text(matched: &[u8]) -> String {
    String::from_utf8_lossy(matched).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_properties_placeholders() {
        let text = "db.user=admin\n\
                    db.password={{ secret/example!foo }}\n\
                    db.other={{secret/example!two:fallback2}}\n";
        assert_eq!(
            find_placeholders(text),
            vec![
                "{{ secret/example!foo }}",
                "{{secret/example!two:fallback2}}"
            ]
        );
    }

    #[test]
    fn keeps_duplicates_and_interior_whitespace() {
        let text = "a={{  secret/x!k  }} b={{  secret/x!k  }}";
        let found = find_placeholders(text);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0], "{{  secret/x!k  }}");
    }

    #[test]
    fn ignores_unbalanced_and_spaced_tokens() {
        let text = r#"{"bad": "{{ secret/invalid!invalid }", "spaced": "{{ secret/a b }}"}"#;
        assert!(find_placeholders(text).is_empty());
    }

    #[test]
    fn no_placeholders_yields_empty() {
        assert!(find_placeholders("plain text, {single} braces").is_empty());
    }

    #[test]
    fn finds_placeholders_in_latin1_text() {
        let text = b"name=caf\xe9\npassword={{ secret/a!k:hunter2 }}\n";
        assert_eq!(find_placeholders(text), vec!["{{ secret/a!k:hunter2 }}"]);
    }

    #[test]
    fn finds_placeholders_in_json() {
        let text = r#"{"password": "{{ secret/example!password_key }}", "port": 8080}"#;
        assert_eq!(
            find_placeholders(text),
            vec!["{{ secret/example!password_key }}"]
        );
    }
}
