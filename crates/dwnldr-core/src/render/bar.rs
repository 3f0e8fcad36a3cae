//! Fixed-width text pieces: the progress bar and column fitting.

const FILL: char = '=';
const CURSOR: char = '>';
const BLANK: char = ' ';
const ELLIPSIS: char = '…';

/// Progress bar exactly `width` columns wide.
///
/// One column is reserved for the cursor: `pos = floor((width - 1) * fraction)`
/// fill characters are followed by the cursor when `pos > 0`; otherwise the bar
/// is blank. A full bar has no trailing blank.
pub fn render_bar(width: usize, fraction: f64) -> String {
    if width == 0 {
        return String::new();
    }
    let fraction = if fraction.is_finite() {
        fraction.clamp(0.0, 1.0)
    } else {
        0.0
    };
    let content = width - 1;
    let pos = (content as f64 * fraction).floor() as usize;

    let mut bar = String::with_capacity(width);
    if pos > 0 {
        bar.extend(std::iter::repeat(FILL).take(pos));
        bar.push(CURSOR);
    } else {
        bar.push(BLANK);
    }
    bar.extend(std::iter::repeat(BLANK).take(content - pos));
    bar
}

/// Binds `text` to exactly `width` columns: pads with trailing spaces when
/// shorter, otherwise keeps `width - 1` characters and appends an ellipsis.
pub fn fit_width(text: &str, width: usize) -> String {
    let len = text.chars().count();
    if len <= width {
        let mut out = String::with_capacity(width);
        out.push_str(text);
        out.extend(std::iter::repeat(' ').take(width - len));
        return out;
    }
    if width == 0 {
        return String::new();
    }
    let mut out: String = text.chars().take(width - 1).collect();
    out.push(ELLIPSIS);
    out
}

/// Right-aligns `text` to at least `width` columns. Never truncates.
pub fn align_right(text: &str, width: usize) -> String {
    format!("{:>width$}", text, width = width)
}

/// Cuts `line` to at most `columns` characters so it cannot wrap.
pub fn clip(line: &str, columns: usize) -> &str {
    match line.char_indices().nth(columns) {
        Some((idx, _)) => &line[..idx],
        None => line,
    }
}
