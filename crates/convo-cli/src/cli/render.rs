use convo_core::ConversationRow;

/// Spaces per indent level in terminal output
const INDENT_WIDTH: usize = 2;

/// Longest body excerpt printed per row
const BODY_PREVIEW_CHARS: usize = 80;

/// One line per row: indentation, message number, author, body excerpt,
/// details. The selected note is marked with `>`.
pub fn render_rows(rows: &[ConversationRow]) -> String {
    let mut out = String::new();
    for row in rows {
        let marker = if row.is_selected { '>' } else { ' ' };
        let indent = " ".repeat(row.indent_level as usize * INDENT_WIDTH);
        let author = row.author.as_deref().unwrap_or("?");
        out.push_str(&format!(
            "{}{}#{} {}: {}",
            marker,
            indent,
            row.history_order,
            author,
            preview(&row.body)
        ));
        if !row.details.is_empty() {
            out.push_str(&format!("  [{}]", row.details));
        }
        out.push('\n');
    }
    out
}

fn preview(body: &str) -> String {
    let single_line = body.split_whitespace().collect::<Vec<_>>().join(" ");
    if single_line.chars().count() <= BODY_PREVIEW_CHARS {
        return single_line;
    }
    let cut: String = single_line.chars().take(BODY_PREVIEW_CHARS - 3).collect();
    format!("{}...", cut)
}
