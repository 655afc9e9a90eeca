use crate::Cell;
use tabled::{builder::Builder, settings};

/// Predefined output styles that map to `tabled` styles.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum TableStyleKind {
    #[default]
    Modern,
    Ascii,
    Plain,
}

impl TableStyleKind {
    fn apply(self, table: &mut tabled::Table) {
        match self {
            Self::Modern => table.with(settings::Style::modern()),
            Self::Ascii => table.with(settings::Style::ascii()),
            Self::Plain => table.with(settings::Style::empty()),
        };
    }
}

/// Render integer rows under column headers into a human-friendly table.
pub fn render_cell_rows(headers: &[String], rows: &[Vec<Cell>], style: TableStyleKind) -> String {
    if headers.is_empty() && rows.is_empty() {
        return "<empty>".into();
    }

    let mut builder = Builder::default();
    if !headers.is_empty() {
        builder.push_record(headers.iter().cloned());
    }
    for row in rows {
        builder.push_record(row.iter().map(Cell::to_string));
    }

    let mut table = builder.build();
    style.apply(&mut table);
    table.to_string()
}

/// Render arbitrary string rows with the provided style (LIST output).
pub fn render_string_table(
    headers: &[&str],
    rows: Vec<Vec<String>>,
    style: TableStyleKind,
) -> String {
    if headers.is_empty() && rows.is_empty() {
        return "<empty>".into();
    }

    let mut builder = Builder::default();
    if !headers.is_empty() {
        builder.push_record(headers.iter().copied());
    }
    for row in rows {
        builder.push_record(row);
    }

    let mut table = builder.build();
    style.apply(&mut table);
    table.to_string()
}

/// Format matrix rows the way PRINT shows them: space-separated.
pub fn format_matrix_rows(rows: &[Vec<Cell>]) -> String {
    rows.iter()
        .map(|row| {
            row.iter()
                .map(Cell::to_string)
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}
