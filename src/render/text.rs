//! Plain-text rendering: an indented heading list.

use crate::model::Outline;

const INDENT: &str = "  ";

/// Render the outline as indented lines, one heading per line.
///
/// ```text
/// Annual Systems Review
///
/// Introduction ..... 1
///   Background ..... 2
/// ```
pub fn to_text(outline: &Outline) -> String {
    let mut output = String::new();

    if !outline.title.is_empty() {
        output.push_str(&outline.title);
        output.push_str("\n\n");
    }

    for entry in &outline.outline {
        let indent = INDENT.repeat((entry.level.depth() - 1) as usize);
        output.push_str(&format!("{}{} ..... {}\n", indent, entry.text, entry.page));
    }

    output
}
