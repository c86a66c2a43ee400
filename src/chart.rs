//! Horizontal bar charts drawn with plain text.

const BAR_CHAR: char = '#';

/// Renders one row per `(label, value)`, bars scaled to the largest value.
///
/// ```text
/// Minutes per day
/// 2023-10-01 | ##########                     20
/// 2023-10-02 | ##############################  60
/// ```
pub fn bar_chart(title: &str, rows: &[(String, f64)], width: usize) -> String {
    let mut out = String::new();
    out.push_str(title);
    out.push('\n');

    if rows.is_empty() {
        out.push_str("  (no data)\n");
        return out;
    }

    let label_width = rows.iter().map(|(l, _)| l.chars().count()).max().unwrap_or(0);
    let max = rows
        .iter()
        .map(|(_, v)| *v)
        .filter(|v| v.is_finite())
        .fold(0.0_f64, f64::max);

    for (label, value) in rows {
        let len = scaled(*value, max, width);
        out.push_str(&format!(
            "{:<lw$} | {}{} {:.0}\n",
            label,
            BAR_CHAR.to_string().repeat(len),
            " ".repeat(width - len),
            value,
            lw = label_width
        ));
    }
    out
}

/// A fixed-width progress bar, e.g. `[########------------] 40%`.
pub fn progress_bar(percent: f64, width: usize) -> String {
    let filled = scaled(percent, 100.0, width);
    format!(
        "[{}{}] {:.0}%",
        BAR_CHAR.to_string().repeat(filled),
        "-".repeat(width - filled),
        percent.clamp(0.0, 100.0)
    )
}

/// Length of a bar for `value` when `max` fills `width`. Always within 0..=width.
fn scaled(value: f64, max: f64, width: usize) -> usize {
    if max <= 0.0 || !value.is_finite() || value <= 0.0 {
        return 0;
    }
    let len = (value / max * width as f64).round() as usize;
    len.min(width)
}
