use serde_json::Value;

use terminal_size::{terminal_size, Height, Width};

/// Rows plus header for an ASCII table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Self { columns: columns.into_iter().map(Into::into).collect(), rows: Vec::new() }
    }

    pub fn push<S: Into<String>>(&mut self, row: impl IntoIterator<Item = S>) { self.rows.push(row.into_iter().map(Into::into).collect()); }

    pub fn is_empty(&self) -> bool { self.rows.is_empty() }
}

/// Print a table sized to the current terminal. Empty tables print nothing and return false.
pub fn print_table(table: &Table) -> bool {
    if table.is_empty() {
        return false;
    }
    let termw = get_terminal_width();
    tracing::trace!(width = termw, "rendering table");
    for line in render_table(table, termw, true) {
        println!("{}", line);
    }
    true
}

pub fn print_json(val: &Value) {
    let s = serde_json::to_string_pretty(val).unwrap_or_else(|_| val.to_string());
    println!("{}", s);
}

/// Lay the table out within `termw` columns. `color` paints the header green.
pub fn render_table(table: &Table, termw: usize, color: bool) -> Vec<String> {
    let cols = &table.columns;
    let mut widths: Vec<usize> = cols.iter().map(|s| visible_len(s).min(termw)).collect();
    for r in &table.rows {
        for (i, cell) in r.iter().enumerate().take(cols.len()) {
            let w = visible_len(cell);
            if w > widths[i] {
                widths[i] = w.min(termw);
            }
        }
    }

    let mut out = Vec::with_capacity(table.rows.len() + 5);
    let sep = build_separator(&widths);
    out.push(fit_line_to_width(&sep, termw));
    let header = if color { build_row_header_colored(cols, &widths) } else { build_row(cols, &widths) };
    out.push(fit_line_to_width(&header, termw));
    out.push(fit_line_to_width(&sep, termw));
    for r in &table.rows {
        out.push(fit_line_to_width(&build_row(r, &widths), termw));
    }
    out.push(fit_line_to_width(&sep, termw));
    out.push(format!("rows: {}", table.rows.len()));
    out
}

fn build_separator(widths: &[usize]) -> String {
    let mut s = String::new();
    s.push('+');
    for w in widths {
        s.push_str(&"-".repeat(*w + 2));
        s.push('+');
    }
    s
}

fn build_row(cells: &[String], widths: &[usize]) -> String {
    let mut s = String::new();
    s.push('|');
    for (i, w) in widths.iter().enumerate() {
        let cell = cells.get(i).map(String::as_str).unwrap_or("");
        let (text, align_right) = (truncate(cell, *w), is_numeric_like(cell));
        let pad = w.saturating_sub(visible_len(&text));
        s.push(' ');
        if align_right {
            s.push_str(&" ".repeat(pad));
            s.push_str(&text);
        } else {
            s.push_str(&text);
            s.push_str(&" ".repeat(pad));
        }
        s.push(' ');
        s.push('|');
    }
    s
}

// Header names in green; padding follows the visible width.
fn build_row_header_colored(cells: &[String], widths: &[usize]) -> String {
    let mut s = String::new();
    s.push('|');
    for (i, w) in widths.iter().enumerate() {
        let cell = cells.get(i).map(String::as_str).unwrap_or("");
        let text = truncate(cell, *w);
        s.push(' ');
        s.push_str(&format!("\x1b[32m{}\x1b[0m", text));
        s.push_str(&" ".repeat(w.saturating_sub(visible_len(&text))));
        s.push(' ');
        s.push('|');
    }
    s
}

fn truncate(s: &str, max: usize) -> String {
    let len = s.chars().count();
    if len <= max {
        return s.to_string();
    }
    if max <= 1 {
        return "…".to_string();
    }
    s.chars().take(max - 1).collect::<String>() + "…"
}

// crude detection for aligning numbers to the right; percentages count
fn is_numeric_like(s: &str) -> bool {
    let st = s.trim();
    if st.is_empty() {
        return false;
    }
    let mut has_digit = false;
    for ch in st.chars() {
        if ch.is_ascii_digit() {
            has_digit = true;
            continue;
        }
        if ".-+,_%".contains(ch) {
            continue;
        }
        return false;
    }
    has_digit
}

// --- Terminal fitting & ANSI helpers ---

fn get_terminal_width() -> usize {
    match terminal_size() {
        Some((Width(w), Height(_h))) => (w as usize).saturating_sub(4).max(20),
        None => 80,
    }
}

fn fit_line_to_width(s: &str, maxw: usize) -> String {
    if visible_len(s) <= maxw {
        return s.to_string();
    }
    elide_middle_preserving_ansi(s, maxw)
}

/// Byte index just past an ANSI CSI sequence starting at `i` (which holds ESC).
fn skip_ansi(bytes: &[u8], mut i: usize) -> usize {
    i += 1;
    if i < bytes.len() && bytes[i] == b'[' {
        i += 1;
        while i < bytes.len() {
            let b = bytes[i];
            i += 1;
            if b.is_ascii_alphabetic() {
                break;
            }
        }
    }
    i
}

// Visible Unicode chars, skipping ANSI escape sequences.
fn visible_len(s: &str) -> usize {
    let bytes = s.as_bytes();
    let mut i = 0;
    let mut count = 0;
    while i < bytes.len() {
        if bytes[i] == 0x1B {
            i = skip_ansi(bytes, i);
            continue;
        }
        match s[i..].chars().next() {
            Some(ch) => {
                count += 1;
                i += ch.len_utf8();
            }
            None => break,
        }
    }
    count
}

fn elide_middle_preserving_ansi(s: &str, maxw: usize) -> String {
    if maxw <= 3 {
        return "…".repeat(maxw.min(1));
    }
    let budget = maxw.saturating_sub(3);
    let front_keep = budget / 2;
    let back_keep = budget - front_keep;

    struct Tok {
        ansi: bool,
        text: String,
        vis: usize,
    }
    let mut toks: Vec<Tok> = Vec::new();
    let bytes = s.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        let start = i;
        if bytes[i] == 0x1B {
            i = skip_ansi(bytes, i);
            toks.push(Tok { ansi: true, text: s[start..i].to_string(), vis: 0 });
            continue;
        }
        // ESC is ASCII, so this never splits a UTF-8 char
        while i < bytes.len() && bytes[i] != 0x1B {
            i += 1;
        }
        let text = &s[start..i];
        toks.push(Tok { ansi: false, text: text.to_string(), vis: text.chars().count() });
    }

    let mut front = String::new();
    let mut collected = 0usize;
    for t in &toks {
        if t.ansi {
            front.push_str(&t.text);
        } else if collected + t.vis <= front_keep {
            front.push_str(&t.text);
            collected += t.vis;
        } else {
            front.extend(t.text.chars().take(front_keep.saturating_sub(collected)));
            break;
        }
    }

    let mut back = String::new();
    let mut collected = 0usize;
    for t in toks.iter().rev() {
        if t.ansi {
            back.insert_str(0, &t.text);
        } else if collected + t.vis <= back_keep {
            back.insert_str(0, &t.text);
            collected += t.vis;
        } else {
            let need = back_keep.saturating_sub(collected);
            let tail: String = t.text.chars().skip(t.vis.saturating_sub(need)).collect();
            back.insert_str(0, &tail);
            break;
        }
    }

    // reset color in case an escape was cut
    format!("{}...{}\x1b[0m", front, back)
}
