//! Group positioned fragments into logical lines by vertical proximity.

use crate::types::TextFragment;

/// Fragments whose `y` is within this distance of the line's first fragment
/// are treated as the same line.
pub const LINE_Y_TOLERANCE: f64 = 0.2;

/// Single forward pass over the fragment stream.
///
/// A fragment without `y` always starts a new line, so a decoder that never
/// reports positions degrades to one fragment per line.
pub fn assemble_lines(fragments: &[TextFragment]) -> Vec<String> {
    let mut lines = Vec::new();
    let mut buf: Option<(String, Option<f64>)> = None;

    for frag in fragments {
        let same_line = match (&buf, frag.y) {
            (Some((_, Some(line_y))), Some(y)) => (y - line_y).abs() <= LINE_Y_TOLERANCE,
            _ => false,
        };

        if same_line {
            if let Some((text, _)) = buf.as_mut() {
                text.push(' ');
                text.push_str(&frag.text);
            }
            continue;
        }

        if let Some((text, _)) = buf.take() {
            lines.push(text);
        }
        buf = Some((frag.text.clone(), frag.y));
    }

    if let Some((text, _)) = buf {
        lines.push(text);
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_groups_by_y() {
        let frags = vec![
            TextFragment::new("29.08.25", 700.0),
            TextFragment::new("COUNTDOWN", 700.1),
            TextFragment::new("40.00", 699.9),
            TextFragment::new("30.08.25", 688.0),
            TextFragment::new("Z ENERGY", 688.0),
        ];
        let lines = assemble_lines(&frags);
        assert_eq!(lines, vec!["29.08.25 COUNTDOWN 40.00", "30.08.25 Z ENERGY"]);
    }

    #[test]
    fn test_tolerance_is_measured_from_first_fragment() {
        // 0.15 + 0.15 drifts past the tolerance relative to the first fragment
        let frags = vec![
            TextFragment::new("a", 10.0),
            TextFragment::new("b", 10.15),
            TextFragment::new("c", 10.3),
        ];
        assert_eq!(assemble_lines(&frags), vec!["a b", "c"]);
    }

    #[test]
    fn test_missing_y_is_one_line_per_fragment() {
        let frags = vec![
            TextFragment::unpositioned("one"),
            TextFragment::unpositioned("two"),
        ];
        assert_eq!(assemble_lines(&frags), vec!["one", "two"]);
    }

    #[test]
    fn test_interior_spacing_survives() {
        let frags = vec![TextFragment::new("COUNTDOWN   PONSONBY", 1.0)];
        assert_eq!(assemble_lines(&frags), vec!["COUNTDOWN   PONSONBY"]);
    }

    #[test]
    fn test_empty_stream() {
        assert!(assemble_lines(&[]).is_empty());
    }
}
