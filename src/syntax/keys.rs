//! Dotted key splitting.

/// One segment of a dotted key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPart {
    pub name: String,
    pub quoted: bool,
}

/// Splits a dotted key on unquoted dots.
///
/// Whitespace around segments is dropped, basic strings (`"..."`) have their
/// `\"` and `\\` escapes decoded and literal strings (`'...'`) are kept as is.
pub fn split_dotted(text: &str) -> Vec<KeyPart> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' => {
                quoted = true;
                while let Some(inner) = chars.next() {
                    match inner {
                        '\\' => {
                            if let Some(escaped) = chars.next() {
                                current.push(escaped);
                            }
                        }
                        '"' => break,
                        other => current.push(other),
                    }
                }
            }
            '\'' => {
                quoted = true;
                for inner in chars.by_ref() {
                    if inner == '\'' {
                        break;
                    }
                    current.push(inner);
                }
            }
            '.' => {
                parts.push(KeyPart {
                    name: std::mem::take(&mut current),
                    quoted,
                });
                quoted = false;
            }
            c if c.is_whitespace() => {}
            other => current.push(other),
        }
    }

    if !current.is_empty() || quoted || !parts.is_empty() {
        parts.push(KeyPart {
            name: current,
            quoted,
        });
    }

    parts
}

/// Whether `name` can be written without quotes.
pub fn is_bare(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}
