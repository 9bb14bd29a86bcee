//! Tabular rendering of inconsistent objects.

use tabled::settings::{object::Segment, Modify, Padding, Style};
use tabled::{Table, Tabled};

use metactl_core::InconsistentObject;

#[derive(Tabled)]
struct InconsistencyRow {
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "TYPE")]
    object_type: String,
    #[tabled(rename = "DESCRIPTION")]
    description: String,
    #[tabled(rename = "REASON")]
    reason: String,
}

/// Render `objects` as a borderless four-column table.
///
/// Rows keep input order; nothing is filtered, merged or truncated. Columns
/// are left-aligned and separated by at least two spaces. Empty input yields
/// the header line alone.
pub fn render_inconsistencies(objects: &[InconsistentObject]) -> String {
    let rows = objects.iter().map(|obj| InconsistencyRow {
        name: obj.name.clone(),
        object_type: obj.object_type.clone(),
        description: obj.description.clone(),
        reason: obj.reason.clone(),
    });

    let mut table = Table::new(rows);
    table
        .with(Style::empty())
        .with(Modify::new(Segment::all()).with(Padding::new(0, 2, 0, 0)));

    table
        .to_string()
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
}
