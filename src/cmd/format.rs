/*!
format.rs

Formatting primitives for the human output of `cli-mcp` commands.

  - StyleOptions::detect() -> StyleOptions   (TTY / NO_COLOR / NO_EMOJI / COLUMNS)
  - color(role, text, &StyleOptions) -> String
  - emoji(tag, &StyleOptions) -> &'static str
  - box_header(title, subtitle_opt, &StyleOptions) -> String
  - table(headers, rows, TableOpts, &StyleOptions) -> String
  - truncate_ellipsis(s, max_chars) -> String

Functions return strings and never print. JSON output paths do not use them.
*/

use std::borrow::Cow;
use std::io::IsTerminal;

/* ---- Style Options ---- */

#[derive(Debug, Clone)]
pub struct StyleOptions {
    pub use_color: bool,
    pub use_emoji: bool,
    pub term_width: usize,
}

impl Default for StyleOptions {
    fn default() -> Self {
        Self::detect()
    }
}

impl StyleOptions {
    pub fn detect() -> Self {
        Self::for_output(std::io::stdout().is_terminal())
    }

    /// Styled for a terminal, plain when output is piped.
    pub fn for_output(is_terminal: bool) -> Self {
        let width = std::env::var("COLUMNS")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .map(|w| w.clamp(40, 220))
            .unwrap_or(100);
        if !is_terminal {
            return Self::plain(width);
        }

        StyleOptions {
            use_color: std::env::var_os("NO_COLOR").is_none(),
            use_emoji: std::env::var_os("NO_EMOJI").is_none(),
            term_width: width,
        }
    }

    /// No color, no emoji, fixed width.
    pub fn plain(term_width: usize) -> Self {
        StyleOptions {
            use_color: false,
            use_emoji: false,
            term_width,
        }
    }
}

/* ---- Color / Emoji ---- */

#[derive(Debug, Clone, Copy)]
pub enum Role {
    Primary,
    Secondary,
    Accent,
    Success,
    Error,
    Dim,
}

pub fn color(role: Role, text: impl AsRef<str>, style: &StyleOptions) -> String {
    if !style.use_color {
        return text.as_ref().to_string();
    }
    let code = match role {
        Role::Primary => "38;5;45",
        Role::Secondary => "38;5;250",
        Role::Accent => "38;5;213",
        Role::Success => "38;5;82",
        Role::Error => "38;5;196",
        Role::Dim => "2",
    };
    format!("\x1b[{code}m{}\x1b[0m", text.as_ref())
}

pub fn emoji(tag: &str, style: &StyleOptions) -> &'static str {
    if !style.use_emoji {
        return "";
    }
    match tag {
        "success" => "✔",
        "error" => "✖",
        "info" => "ℹ",
        "tool" => "🛠",
        "list" => "📜",
        "rocket" => "🚀",
        _ => "",
    }
}

/* ---- Box Header ---- */

/// One-line boxed title with an optional dimmed subtitle. Content wider
/// than the terminal is truncated.
pub fn box_header(
    title: impl AsRef<str>,
    subtitle: Option<impl AsRef<str>>,
    style: &StyleOptions,
) -> String {
    let max_inner = style.term_width.clamp(20, 200) - 4;

    let mut plain = title.as_ref().trim().to_string();
    if let Some(sub) = subtitle.as_ref().map(|s| s.as_ref()) {
        plain = format!("{plain}  {sub}");
    }
    let plain = truncate_ellipsis(&plain, max_inner);
    let inner_len = plain.chars().count();

    // re-apply colors on the (possibly truncated) text
    let title_len = title.as_ref().trim().chars().count().min(inner_len);
    let (head, tail): (String, String) = {
        let mut chars = plain.chars();
        let head: String = chars.by_ref().take(title_len).collect();
        (head, chars.collect())
    };
    let styled = format!(
        "{}{}",
        color(Role::Primary, head, style),
        if tail.is_empty() {
            String::new()
        } else {
            color(Role::Secondary, tail, style)
        }
    );

    let hline = "─".repeat(inner_len + 2);
    format!("┌{hline}┐\n│ {styled} │\n└{hline}┘")
}

/* ---- Table Rendering ---- */

#[derive(Debug, Clone)]
pub struct TableOpts {
    /// 0 -> `style.term_width`
    pub max_width: usize,
    pub header_sep: bool,
    pub min_col_width: usize,
}

impl Default for TableOpts {
    fn default() -> Self {
        Self {
            max_width: 0,
            header_sep: true,
            min_col_width: 2,
        }
    }
}

pub fn table(
    headers: &[&str],
    rows: &[Vec<String>],
    opts: TableOpts,
    style: &StyleOptions,
) -> String {
    if headers.is_empty() {
        return String::new();
    }
    let col_count = headers.len();
    let width_limit = if opts.max_width == 0 {
        style.term_width
    } else {
        opts.max_width.min(style.term_width)
    };

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate().take(col_count) {
            widths[i] = widths[i].max(display_width(cell));
        }
    }

    // shrink the widest columns first until the row fits
    let total: usize = widths.iter().sum::<usize>() + (col_count - 1) * 2;
    if total > width_limit {
        let mut overflow = total - width_limit;
        let mut ordered: Vec<usize> = (0..col_count).collect();
        ordered.sort_by(|a, b| widths[*b].cmp(&widths[*a]));
        for idx in ordered {
            if overflow == 0 {
                break;
            }
            if widths[idx] > opts.min_col_width {
                let shrink = (widths[idx] - opts.min_col_width).min(overflow);
                widths[idx] -= shrink;
                overflow -= shrink;
            }
        }
    }

    let mut lines: Vec<String> = Vec::with_capacity(rows.len() + 2);
    let header_cells = render_cells(headers.iter().copied(), &widths);
    lines.push(
        header_cells
            .into_iter()
            .map(|c| color(Role::Accent, c, style))
            .collect::<Vec<_>>()
            .join("  "),
    );
    if opts.header_sep {
        let sep: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        lines.push(color(Role::Dim, sep.join("  "), style));
    }
    for row in rows {
        let cells = (0..col_count).map(|c| row.get(c).map(String::as_str).unwrap_or(""));
        lines.push(render_cells(cells, &widths).join("  "));
    }
    lines.join("\n")
}

fn render_cells<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> Vec<String> {
    cells
        .zip(widths)
        .map(|(cell, w)| pad_or_truncate(cell, *w))
        .collect()
}

fn pad_or_truncate(s: &str, width: usize) -> String {
    let len = display_width(s);
    if len <= width {
        return format!("{s}{}", " ".repeat(width - len));
    }
    let cut = truncate_ellipsis(&strip_ansi(s), width);
    let cut_len = cut.chars().count();
    format!("{cut}{}", " ".repeat(width.saturating_sub(cut_len)))
}

/* ---- Text Helpers ---- */

pub fn truncate_ellipsis(s: &str, max_chars: usize) -> String {
    if max_chars == 0 {
        return String::new();
    }
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max_chars - 1).collect();
    out.push('…');
    out
}

/// Drop ANSI CSI sequences (`ESC [ ... letter`).
pub fn strip_ansi(s: &str) -> Cow<'_, str> {
    if !s.contains('\x1b') {
        return Cow::Borrowed(s);
    }
    let mut buf = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\x1b' && chars.peek() == Some(&'[') {
            chars.next();
            for next in chars.by_ref() {
                if next.is_ascii_alphabetic() {
                    break;
                }
            }
            continue;
        }
        buf.push(c);
    }
    Cow::Owned(buf)
}

fn display_width(s: &str) -> usize {
    strip_ansi(s).chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn piped_output_is_plain() {
        let style = StyleOptions::for_output(false);
        assert!(!style.use_color);
        assert!(!style.use_emoji);
        assert_eq!(color(Role::Error, "x", &style), "x");
    }

    #[test]
    fn box_header_plain() {
        let style = StyleOptions::plain(80);
        let b = box_header("Tools (2)", Some("demo"), &style);
        let lines: Vec<&str> = b.lines().collect();
        assert_eq!(lines[1], "│ Tools (2)  demo │");
        assert_eq!(lines[0].chars().count(), lines[1].chars().count());
    }

    #[test]
    fn table_aligns_columns() {
        let style = StyleOptions::plain(80);
        let t = table(
            &["A", "B"],
            &[
                vec!["x".into(), "y".into()],
                vec!["longer".into(), "val".into()],
            ],
            TableOpts::default(),
            &style,
        );
        let lines: Vec<&str> = t.lines().collect();
        assert_eq!(lines[0], "A       B  ");
        assert_eq!(lines[1], "------  ---");
        assert_eq!(lines[2], "x       y  ");
        assert_eq!(lines[3], "longer  val");
    }

    #[test]
    fn table_shrinks_to_width() {
        let style = StyleOptions::plain(40);
        let long = "d".repeat(60);
        let t = table(&["N", "DESC"], &[vec!["n".into(), long]], TableOpts::default(), &style);
        assert!(t.lines().all(|l| l.chars().count() <= 40));
        assert!(t.contains('…'));
    }

    #[test]
    fn truncate() {
        assert_eq!(truncate_ellipsis("abcdef", 4), "abc…");
        assert_eq!(truncate_ellipsis("abc", 4), "abc");
    }

    #[test]
    fn strip_ansi_removes_codes() {
        assert_eq!(strip_ansi("\x1b[31mRED\x1b[0m"), "RED");
    }
}
