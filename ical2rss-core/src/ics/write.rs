//! Canonical calendar text for a parsed component.

use icalendar::parser::{Component, Property};

/// Maximum octets per physical content line, including the fold space.
const FOLD_LIMIT: usize = 75;

/// Append `component` (and its sub-components) to `out` as calendar text.
///
/// Properties are written in source order with their raw values, so two
/// components serialize identically exactly when their content lines match.
pub fn write_component(component: &Component<'_>, out: &mut String) {
    let name: &str = component.name.as_ref();
    push_folded(out, &format!("BEGIN:{name}"));

    for property in &component.properties {
        push_folded(out, &format_property(property));
    }

    for child in &component.components {
        write_component(child, out);
    }

    push_folded(out, &format!("END:{name}"));
}

fn format_property(property: &Property<'_>) -> String {
    let name: &str = property.name.as_ref();
    let mut line = name.to_string();

    for param in &property.params {
        line.push(';');
        let key: &str = param.key.as_ref();
        line.push_str(key);

        if let Some(ref val) = param.val {
            let val = val.to_string();
            line.push('=');
            if val.contains([':', ';', ',']) {
                line.push('"');
                line.push_str(&val);
                line.push('"');
            } else {
                line.push_str(&val);
            }
        }
    }

    line.push(':');
    line.push_str(&property.val.to_string());
    line
}

/// Append one content line with CRLF, folding at `FOLD_LIMIT` octets without
/// splitting a UTF-8 sequence.
fn push_folded(out: &mut String, line: &str) {
    let mut width = 0;

    for c in line.chars() {
        let len = c.len_utf8();
        if width + len > FOLD_LIMIT {
            out.push_str("\r\n ");
            width = 1;
        }
        out.push(c);
        width += len;
    }

    out.push_str("\r\n");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_line_not_folded() {
        let mut out = String::new();
        push_folded(&mut out, "SUMMARY:Short");

        assert_eq!(out, "SUMMARY:Short\r\n");
    }

    #[test]
    fn test_long_line_folded_at_limit() {
        let line = format!("DESCRIPTION:{}", "x".repeat(100));
        let mut out = String::new();
        push_folded(&mut out, &line);

        let physical: Vec<&str> = out.trim_end_matches("\r\n").split("\r\n").collect();
        assert_eq!(physical.len(), 2);
        assert_eq!(physical[0].len(), FOLD_LIMIT);
        assert!(physical[1].starts_with(' '));
        assert!(physical.iter().all(|l| l.len() <= FOLD_LIMIT));

        let unfolded = out.replace("\r\n ", "");
        assert_eq!(unfolded, format!("{line}\r\n"));
    }

    #[test]
    fn test_fold_keeps_multibyte_chars_whole() {
        let line = format!("SUMMARY:{}", "ü".repeat(60));
        let mut out = String::new();
        push_folded(&mut out, &line);

        for physical in out.split("\r\n") {
            assert!(physical.len() <= FOLD_LIMIT);
        }
        assert_eq!(out.replace("\r\n ", ""), format!("{line}\r\n"));
    }
}
