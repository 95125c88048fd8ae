//! Character escaping for text and attribute values.
//!
//! XML and XHTML share one rule set. HTML only escapes what its parser
//! would otherwise misread: `&`, `<` and `>` in text, `&` and `"` in
//! attribute values. Characters that XML 1.0 cannot carry at all are
//! rejected in every dialect.

use super::error::{Error,Result};
use super::kind::DocumentContentKind;

/// XML 1.0 `Char` production, less what `char` already excludes.
fn is_representable(c: char) -> bool {
    match c {
        '\t' | '\n' | '\r' => true,
        '\u{0}'..='\u{1F}' => false,
        '\u{FFFE}' | '\u{FFFF}' => false,
        _ => true,
    }
}

fn check(c: char) -> Result<()> {
    if is_representable(c) {
        Ok(())
    } else {
        Err(Error::UnrepresentableCharacter(c))
    }
}

pub fn text(out: &mut String, content: &str, kind: DocumentContentKind) -> Result<()> {
    for c in content.chars() {
        check(c)?;
        match (c, kind) {
            ('&', _) => out.push_str("&amp;"),
            ('<', _) => out.push_str("&lt;"),
            ('>', _) => out.push_str("&gt;"),
            ('\r', DocumentContentKind::Xml) |
            ('\r', DocumentContentKind::Xhtml) => out.push_str("&#13;"),
            _ => out.push(c),
        }
    }
    Ok(())
}

pub fn attribute(out: &mut String, value: &str, kind: DocumentContentKind) -> Result<()> {
    for c in value.chars() {
        check(c)?;

        if kind == DocumentContentKind::Html {
            match c {
                '&' => out.push_str("&amp;"),
                '"' => out.push_str("&quot;"),
                _ => out.push(c),
            }
            continue;
        }

        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\t' => out.push_str("&#9;"),
            '\n' => out.push_str("&#10;"),
            '\r' => out.push_str("&#13;"),
            _ => out.push(c),
        }
    }
    Ok(())
}

/// Content written without escaping still has to be representable.
pub fn verbatim(out: &mut String, content: &str) -> Result<()> {
    for c in content.chars() {
        check(c)?;
    }
    out.push_str(content);
    Ok(())
}

fn unrepresentable(value: &str, reason: &'static str) -> Error {
    Error::UnrepresentableDocumentType { value: value.to_string(), reason: reason }
}

/// The root element name of a document type declaration, written bare.
pub fn document_type_name(out: &mut String, name: &str) -> Result<()> {
    let breaks_markup = |c: char| {
        matches!(c, ' ' | '\t' | '\n' | '\r' | '"' | '\'' | '<' | '>' | '[' | ']')
    };
    if name.is_empty() || name.chars().any(breaks_markup) {
        return Err(unrepresentable(name, "not a name"));
    }
    verbatim(out, name)
}

/// A system literal, quoted with whichever quote character it lacks.
pub fn system_literal(out: &mut String, value: &str) -> Result<()> {
    let quote = match (value.contains('"'), value.contains('\'')) {
        (false, _) => '"',
        (true, false) => '\'',
        (true, true) => return Err(unrepresentable(value, "it contains both quote characters")),
    };
    out.push(quote);
    verbatim(out, value)?;
    out.push(quote);
    Ok(())
}

/// XML 1.0 `PubidChar` production.
fn is_pubid_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(
        c,
        ' ' | '\r' | '\n' | '-' | '\'' | '(' | ')' | '+' | ',' | '.' | '/' | ':' |
        '=' | '?' | ';' | '!' | '*' | '#' | '@' | '$' | '_' | '%'
    )
}

/// A public identifier. It can never hold `"`, so it is always double quoted.
pub fn public_literal(out: &mut String, value: &str) -> Result<()> {
    if !value.chars().all(is_pubid_char) {
        return Err(unrepresentable(value, "public identifiers allow only PubidChar characters"));
    }
    out.push('"');
    out.push_str(value);
    out.push('"');
    Ok(())
}
