//! Output formats for diff results.

use std::fmt;
use std::str::FromStr;

use snap_common::{ChangeType, TrackerChange};

use crate::error::DiffError;

/// Trait for rendering diff results into a string.
///
/// Renderers decide which change kinds to show and in what order; the
/// differ's own ordering is not relied upon.
pub trait DiffRenderer {
    /// Renders the changes. Output ends with a newline unless it is empty.
    fn render(&self, changes: &[TrackerChange]) -> Result<String, DiffError>;
}

/// Lists added and changed labels, one per line.
///
/// This is the form meant for piping into other tools, e.g. to decide what
/// to deploy. Removed labels are left out since there is nothing to act on.
#[derive(Debug, Clone, Copy, Default)]
pub struct LabelRenderer;

impl DiffRenderer for LabelRenderer {
    fn render(&self, changes: &[TrackerChange]) -> Result<String, DiffError> {
        let mut out = String::new();
        for change in changes {
            if matches!(change.change_type, ChangeType::Added | ChangeType::Changed) {
                out.push_str(&change.label);
                out.push('\n');
            }
        }
        Ok(out)
    }
}

/// Pretty-printed JSON array of every change except unchanged labels.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRenderer;

impl DiffRenderer for JsonRenderer {
    fn render(&self, changes: &[TrackerChange]) -> Result<String, DiffError> {
        let visible: Vec<&TrackerChange> = changes
            .iter()
            .filter(|c| c.change_type != ChangeType::Unchanged)
            .collect();
        let mut out = serde_json::to_string_pretty(&visible)?;
        out.push('\n');
        Ok(out)
    }
}

/// Human-readable table of added, changed and removed labels.
///
/// Produces output like:
/// ```text
/// +---------+---------+---------+
/// | CHANGE  | TAGS    | LABEL   |
/// +---------+---------+---------+
/// | added   |         | //tools |
/// +         +---------+---------+
/// |         | backend | //api   |
/// |         | web     |         |
/// +---------+---------+---------+
/// | changed |         | //web   |
/// +---------+---------+---------+
/// ```
///
/// Rows are sorted by change kind, then by number of tags, then by tags,
/// then by label. Tags within a row are sorted and stacked one per line.
/// Consecutive rows with the same change kind share one change cell.
#[derive(Debug, Clone, Copy, Default)]
pub struct TableRenderer;

const HEADER: [&str; 3] = ["CHANGE", "TAGS", "LABEL"];

struct Row<'a> {
    change: &'static str,
    tags: Vec<&'a str>,
    label: &'a str,
}

impl DiffRenderer for TableRenderer {
    fn render(&self, changes: &[TrackerChange]) -> Result<String, DiffError> {
        let rows = sorted_rows(changes);

        let mut widths = HEADER.map(|h| h.chars().count());
        for row in &rows {
            widths[0] = widths[0].max(row.change.chars().count());
            for tag in &row.tags {
                widths[1] = widths[1].max(tag.chars().count());
            }
            widths[2] = widths[2].max(row.label.chars().count());
        }

        let mut out = String::new();
        push_border(&mut out, &widths, false);
        push_line(&mut out, &widths, HEADER);
        push_border(&mut out, &widths, false);

        for (i, row) in rows.iter().enumerate() {
            let merged = i > 0 && rows[i - 1].change == row.change;
            if i > 0 {
                push_border(&mut out, &widths, merged);
            }
            let height = row.tags.len().max(1);
            for line in 0..height {
                let change = if line == 0 && !merged { row.change } else { "" };
                let tag = row.tags.get(line).copied().unwrap_or("");
                let label = if line == 0 { row.label } else { "" };
                push_line(&mut out, &widths, [change, tag, label]);
            }
        }
        if !rows.is_empty() {
            push_border(&mut out, &widths, false);
        }
        Ok(out)
    }
}

fn sorted_rows(changes: &[TrackerChange]) -> Vec<Row<'_>> {
    let mut rows: Vec<Row<'_>> = changes
        .iter()
        .filter(|c| c.change_type != ChangeType::Unchanged)
        .map(|c| {
            let mut tags: Vec<&str> = c.tracker.tags.iter().map(String::as_str).collect();
            tags.sort_unstable();
            Row {
                change: c.change_type.as_str(),
                tags,
                label: &c.label,
            }
        })
        .collect();

    rows.sort_by(|a, b| {
        a.change
            .cmp(b.change)
            .then(a.tags.len().cmp(&b.tags.len()))
            .then_with(|| a.tags.cmp(&b.tags))
            .then_with(|| a.label.cmp(b.label))
    });
    rows
}

fn push_border(out: &mut String, widths: &[usize; 3], merge_first: bool) {
    out.push('+');
    for (col, width) in widths.iter().enumerate() {
        let fill = if col == 0 && merge_first { ' ' } else { '-' };
        out.extend(std::iter::repeat(fill).take(width + 2));
        out.push('+');
    }
    out.push('\n');
}

fn push_line(out: &mut String, widths: &[usize; 3], cells: [&str; 3]) {
    out.push('|');
    for (cell, &width) in cells.iter().zip(widths) {
        out.push_str(&format!(" {cell:<width$} |"));
    }
    out.push('\n');
}

/// The available diff output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DiffFormat {
    /// [`LabelRenderer`].
    #[default]
    Label,
    /// [`JsonRenderer`].
    Json,
    /// [`TableRenderer`].
    Pretty,
}

impl DiffFormat {
    /// The name used on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            DiffFormat::Label => "label",
            DiffFormat::Json => "json",
            DiffFormat::Pretty => "pretty",
        }
    }

    /// Returns the renderer for this format.
    pub fn renderer(self) -> Box<dyn DiffRenderer> {
        match self {
            DiffFormat::Label => Box::new(LabelRenderer),
            DiffFormat::Json => Box::new(JsonRenderer),
            DiffFormat::Pretty => Box::new(TableRenderer),
        }
    }
}

impl fmt::Display for DiffFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DiffFormat {
    type Err = DiffError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "label" => Ok(DiffFormat::Label),
            "json" => Ok(DiffFormat::Json),
            "pretty" => Ok(DiffFormat::Pretty),
            other => Err(DiffError::UnknownFormat(other.to_string())),
        }
    }
}
