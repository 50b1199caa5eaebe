//! Python string literals: decoding, docstring cleaning and rendering.

/// A plain (non-f, non-bytes) string literal, possibly implicitly concatenated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringLiteral {
    value: String,
    modified: bool,
}

impl StringLiteral {
    /// Creates a literal that did not come from the parsed source.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            modified: true,
        }
    }

    pub(crate) fn parsed(value: String) -> Self {
        Self {
            value,
            modified: false,
        }
    }

    /// The decoded value of the literal.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Replaces the literal's value.
    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
        self.modified = true;
    }

    /// Returns true if the value no longer matches the source text.
    pub fn is_modified(&self) -> bool {
        self.modified
    }
}

/// How a single literal token is written in source.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum LiteralKind {
    /// A `str` literal with the decoded value.
    Text(String),
    /// f-strings, t-strings and bytes: not usable as a docstring.
    Other,
}

/// Decodes one string token such as `r'\d'`, `"a\tb"` or `"""doc"""`.
pub(crate) fn decode_token(token: &str) -> LiteralKind {
    let prefix_len = token
        .find(|c: char| c == '"' || c == '\'')
        .unwrap_or(token.len());
    let prefix = token[..prefix_len].to_ascii_lowercase();
    if prefix.chars().any(|c| matches!(c, 'f' | 'b' | 't')) {
        return LiteralKind::Other;
    }

    let rest = &token[prefix_len..];
    let quote = if rest.starts_with("\"\"\"") || rest.starts_with("'''") {
        &rest[..3]
    } else if let Some(q) = rest.get(..1) {
        q
    } else {
        return LiteralKind::Other;
    };
    let Some(inner) = rest
        .strip_prefix(quote)
        .and_then(|r| r.strip_suffix(quote))
    else {
        return LiteralKind::Other;
    };

    // line endings inside the token read as `\n`, whatever the file uses
    let inner = inner.replace("\r\n", "\n").replace('\r', "\n");
    if prefix.contains('r') {
        LiteralKind::Text(inner)
    } else {
        LiteralKind::Text(unescape(&inner))
    }
}

fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some(next) = chars.next() else {
            out.push('\\');
            break;
        };
        match next {
            '\n' => {}
            '\\' => out.push('\\'),
            '\'' => out.push('\''),
            '"' => out.push('"'),
            'a' => out.push('\x07'),
            'b' => out.push('\x08'),
            'f' => out.push('\x0c'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'v' => out.push('\x0b'),
            '0'..='7' => {
                let mut digits = next.to_string();
                while digits.len() < 3 {
                    match chars.peek() {
                        Some(d @ '0'..='7') => {
                            digits.push(*d);
                            chars.next();
                        }
                        _ => break,
                    }
                }
                push_code(&mut out, &digits, 8, &format!("\\{digits}"));
            }
            'x' | 'u' | 'U' => {
                let width = match next {
                    'x' => 2,
                    'u' => 4,
                    _ => 8,
                };
                let digits: String = (0..width)
                    .map_while(|_| chars.next_if(char::is_ascii_hexdigit))
                    .collect();
                let original = format!("\\{next}{digits}");
                if digits.len() == width {
                    push_code(&mut out, &digits, 16, &original);
                } else {
                    out.push_str(&original);
                }
            }
            // \N{NAME} and unknown escapes are kept verbatim
            other => {
                out.push('\\');
                out.push(other);
            }
        }
    }

    out
}

fn push_code(out: &mut String, digits: &str, radix: u32, original: &str) {
    match u32::from_str_radix(digits, radix)
        .ok()
        .and_then(char::from_u32)
    {
        Some(c) => out.push(c),
        None => out.push_str(original),
    }
}

/// Removes the common indentation of a docstring's continuation lines.
///
/// Follows PEP 257 margin handling but keeps leading and trailing blank
/// lines; whitespace-only lines become empty.
pub fn clean_docstring(value: &str) -> String {
    let lines: Vec<&str> = value.split('\n').collect();
    let margin = lines
        .iter()
        .skip(1)
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start().len())
        .min()
        .unwrap_or(0);

    lines
        .iter()
        .enumerate()
        .map(|(i, &line)| {
            if line.trim().is_empty() {
                ""
            } else if i == 0 {
                line
            } else {
                line.get(margin..).unwrap_or_else(|| line.trim_start())
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Renders `value` as a triple-quoted literal for a block indented by `indent`,
/// with lines separated by `newline`.
///
/// Continuation lines are indented so that [`clean_docstring`] of the
/// rendered literal's value gives back `value`.
pub fn render_docstring(value: &str, indent: &str, newline: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    let lines: Vec<&str> = escaped.split('\n').collect();
    let last = lines.len() - 1;

    let mut out = String::from("\"\"\"");
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            out.push_str(newline);
            if !line.is_empty() || i == last {
                out.push_str(indent);
            }
        }
        out.push_str(line);
    }
    out.push_str("\"\"\"");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_plain_and_triple_quoted() {
        assert_eq!(decode_token("'abc'"), LiteralKind::Text("abc".into()));
        assert_eq!(
            decode_token("\"\"\"\n    doc\n    \"\"\""),
            LiteralKind::Text("\n    doc\n    ".into())
        );
        assert_eq!(decode_token("u'x'"), LiteralKind::Text("x".into()));
    }

    #[test]
    fn test_decode_escapes() {
        assert_eq!(
            decode_token(r#""a\tb\n\x41\u00e9\101\"q\"""#),
            LiteralKind::Text("a\tb\nA\u{e9}A\"q\"".into())
        );
        assert_eq!(decode_token(r#""keep \d""#), LiteralKind::Text("keep \\d".into()));
        assert_eq!(decode_token("\"a\\\nb\""), LiteralKind::Text("ab".into()));
    }

    #[test]
    fn test_decode_raw_keeps_backslashes() {
        assert_eq!(decode_token(r#"r"\d+\n""#), LiteralKind::Text(r"\d+\n".into()));
    }

    #[test]
    fn test_fstrings_and_bytes_are_not_text() {
        assert_eq!(decode_token("f'{x}'"), LiteralKind::Other);
        assert_eq!(decode_token("b'x'"), LiteralKind::Other);
        assert_eq!(decode_token("Rb'x'"), LiteralKind::Other);
    }

    #[test]
    fn test_clean_docstring_keeps_outer_blank_lines() {
        assert_eq!(
            clean_docstring("\n    Records.\n\n    https://x#Y\n    "),
            "\nRecords.\n\nhttps://x#Y\n"
        );
        assert_eq!(clean_docstring("Summary.\n    More.\n"), "Summary.\nMore.\n");
        assert_eq!(clean_docstring("one line"), "one line");
    }

    #[test]
    fn test_render_docstring_layout() {
        let rendered = render_docstring("\nRecords.\n\nhttps://x#Y\n", "    ", "\n");
        assert_eq!(rendered, "\"\"\"\n    Records.\n\n    https://x#Y\n    \"\"\"");
    }

    #[test]
    fn test_render_then_decode_then_clean_is_identity() {
        let value = "\nThe \"drug\" table, see C:\\docs.\n\nhttps://example.org/cdm#DRUG\n";
        let rendered = render_docstring(value, "        ", "\n");
        let LiteralKind::Text(decoded) = decode_token(&rendered) else {
            panic!("rendered docstring is not a text literal: {rendered}");
        };
        assert_eq!(clean_docstring(&decoded), value);
    }

    #[test]
    fn test_crlf_docstring_decodes_with_plain_newlines() {
        let value = "\nRecords.\n\nhttps://x#Y\n";
        let rendered = render_docstring(value, "    ", "\r\n");
        assert_eq!(rendered, "\"\"\"\r\n    Records.\r\n\r\n    https://x#Y\r\n    \"\"\"");
        let LiteralKind::Text(decoded) = decode_token(&rendered) else {
            panic!("rendered docstring is not a text literal: {rendered}");
        };
        assert_eq!(clean_docstring(&decoded), value);
    }

    #[test]
    fn test_string_literal_tracks_modification() {
        let mut literal = StringLiteral::parsed("old".into());
        assert!(!literal.is_modified());
        literal.set_value("new");
        assert!(literal.is_modified());
        assert_eq!(literal.value(), "new");
        assert!(StringLiteral::new("x").is_modified());
    }
}
