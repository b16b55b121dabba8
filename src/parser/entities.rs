//! Entity and character reference decoding, and the matching escapes.

use std::borrow::Cow;

/// A reference that is neither predefined nor a valid character reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidReference {
    /// Byte offset of the `&` within the decoded input
    pub offset: usize,
    pub reference: String,
}

/// Decode `&amp;`-style references in attribute values and text
pub fn decode(raw: &str) -> Result<Cow<'_, str>, InvalidReference> {
    if !raw.contains('&') {
        return Ok(Cow::Borrowed(raw));
    }

    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    let mut consumed = 0;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let offset = consumed + amp;
        let after = &rest[amp + 1..];
        let Some(semi) = after.find(';') else {
            return Err(InvalidReference {
                offset,
                reference: after.chars().take(8).collect(),
            });
        };
        let name = &after[..semi];
        let Some(c) = resolve(name) else {
            return Err(InvalidReference {
                offset,
                reference: format!("&{name};"),
            });
        };
        out.push(c);
        let advance = amp + 1 + semi + 1;
        consumed += advance;
        rest = &rest[advance..];
    }
    out.push_str(rest);
    Ok(Cow::Owned(out))
}

fn resolve(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let number = name.strip_prefix('#')?;
            let code = match number.strip_prefix('x') {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => number.parse().ok()?,
            };
            char::from_u32(code).filter(|c| *c != '\0')
        }
    }
}

/// Escape an attribute value for a double-quoted attribute
///
/// Characters listed in `unescaped` are written as is; `&` and `"` are always escaped.
#[must_use]
pub fn escape_attribute<'a>(value: &'a str, unescaped: &[char]) -> Cow<'a, str> {
    let needs_escape = |c: char| match c {
        '&' | '"' => true,
        '<' | '>' | '\n' | '\r' | '\t' => !unescaped.contains(&c),
        _ => false,
    };
    if !value.chars().any(needs_escape) {
        return Cow::Borrowed(value);
    }

    let mut out = String::with_capacity(value.len() + 8);
    for c in value.chars() {
        if !needs_escape(c) {
            out.push(c);
            continue;
        }
        out.push_str(match c {
            '&' => "&amp;",
            '"' => "&quot;",
            '<' => "&lt;",
            '>' => "&gt;",
            '\n' => "&#xA;",
            '\r' => "&#xD;",
            _ => "&#x9;",
        });
    }
    Cow::Owned(out)
}

/// Escape character data
#[must_use]
pub fn escape_text(value: &str) -> Cow<'_, str> {
    if !value.contains(['&', '<', '>']) {
        return Cow::Borrowed(value);
    }

    let mut out = String::with_capacity(value.len() + 8);
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_predefined_and_numeric() {
        assert_eq!(
            decode("a &lt;b&gt; &amp; &quot;c&quot; &apos;").unwrap(),
            "a <b> & \"c\" '"
        );
        assert_eq!(decode("&#65;&#x42;&#xA;").unwrap(), "AB\n");
    }

    #[test]
    fn test_decode_borrows_plain_text() {
        assert!(matches!(decode("plain").unwrap(), Cow::Borrowed(_)));
    }

    #[test]
    fn test_decode_invalid_reference() {
        let err = decode("ok &nbsp; later").unwrap_err();
        assert_eq!(err.offset, 3);
        assert_eq!(err.reference, "&nbsp;");

        assert!(decode("&#xZZ;").is_err());
        assert!(decode("&#0;").is_err());
        assert!(decode("dangling & ").is_err());
    }

    #[test]
    fn test_escape_attribute() {
        assert_eq!(
            escape_attribute("a<b & \"c\"\td\n", &[]),
            "a&lt;b &amp; &quot;c&quot;&#x9;d&#xA;"
        );
        assert_eq!(escape_attribute("a > b", &['>']), "a > b");
        assert_eq!(escape_attribute("&", &['&']), "&amp;");
    }

    #[test]
    fn test_escape_text() {
        assert_eq!(escape_text("if a < b && c > d"), "if a &lt; b &amp;&amp; c &gt; d");
        assert_eq!(escape_text("quote \" stays"), "quote \" stays");
    }
}
