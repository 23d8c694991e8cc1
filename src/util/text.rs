/// Split trailing `#tag` words off a title.
///
/// `"Draft engagement letter #urgent #client"` gives
/// `("Draft engagement letter", ["urgent", "client"])`. Only a trailing run
/// of tags is taken; a `#` in the middle of the title stays in the title.
pub fn parse_title_and_tags(s: &str) -> (String, Vec<String>) {
    let mut tags = Vec::new();
    let mut remaining = s.trim();

    while !remaining.is_empty() {
        let (head, last_word) = match remaining.rfind(char::is_whitespace) {
            Some(pos) => (&remaining[..pos], &remaining[pos + 1..]),
            None => ("", remaining),
        };
        match last_word.strip_prefix('#') {
            Some(tag) if !tag.is_empty() && !tag.contains('#') => {
                tags.push(tag.to_string());
                remaining = head.trim_end();
            }
            _ => break,
        }
    }

    tags.reverse();
    (remaining.to_string(), tags)
}

/// Normalize a tag as typed by a user: drops a leading `#` and surrounding
/// whitespace. Returns `None` when nothing is left.
pub fn normalize_tag(tag: &str) -> Option<String> {
    let tag = tag.trim().trim_start_matches('#').trim();
    if tag.is_empty() {
        None
    } else {
        Some(tag.to_string())
    }
}

/// Percent-encode a string for use in a URI query component.
pub fn encode_uri_component(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(b as char)
            }
            _ => out.push_str(&format!("%{:02X}", b)),
        }
    }
    out
}

/// Percent-encode an address for the path of a `mailto:` link. `@` stays
/// literal; everything else outside the unreserved set is escaped.
pub fn encode_mailto_address(s: &str) -> String {
    s.split('@')
        .map(encode_uri_component)
        .collect::<Vec<_>>()
        .join("@")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_without_tags() {
        assert_eq!(
            parse_title_and_tags("File motion to dismiss"),
            ("File motion to dismiss".to_string(), vec![])
        );
    }

    #[test]
    fn trailing_tags_are_split_off() {
        let (title, tags) = parse_title_and_tags("Draft engagement letter #urgent #client");
        assert_eq!(title, "Draft engagement letter");
        assert_eq!(tags, vec!["urgent", "client"]);
    }

    #[test]
    fn inner_hash_stays_in_title() {
        let (title, tags) = parse_title_and_tags("Review exhibit #4 draft");
        assert_eq!(title, "Review exhibit #4 draft");
        assert!(tags.is_empty());
    }

    #[test]
    fn only_tags() {
        let (title, tags) = parse_title_and_tags("#a #b");
        assert_eq!(title, "");
        assert_eq!(tags, vec!["a", "b"]);
    }

    #[test]
    fn normalize_tag_strips_hash() {
        assert_eq!(normalize_tag(" #billing "), Some("billing".to_string()));
        assert_eq!(normalize_tag("#"), None);
        assert_eq!(normalize_tag("   "), None);
    }

    #[test]
    fn encode_component() {
        assert_eq!(encode_uri_component("Re: Smith & Co"), "Re%3A%20Smith%20%26%20Co");
        assert_eq!(encode_uri_component("plain-text_1.0~"), "plain-text_1.0~");
        assert_eq!(encode_uri_component("é"), "%C3%A9");
    }

    #[test]
    fn encode_mailto_keeps_at_sign() {
        assert_eq!(encode_mailto_address("pat@example.com"), "pat@example.com");
        assert_eq!(encode_mailto_address("a?b@c.com"), "a%3Fb@c.com");
    }
}
