//! Plain tables with optional titles and explanations, rendered with tabled.
use crate::utils::Styling;
use crate::utils::uwriteln;
use std::io::Write;
use tabled::{
    builder::Builder,
    settings::{Alignment, Padding, Style, object::Columns},
};

struct Column {
    title: &'static str,
    align: Alignment,
    help: &'static str,
    cells: Vec<String>,
}

/// One row per binary or section, e.g.
/// ```text
/// name      offset  size  addr       if --titles
/// ----      ------  ----  ----
/// .text        400  1a2c  401000
/// .idata      1e00   200  404000
///
/// name: section name                 if --explain
/// ```
pub struct TableBuilder {
    columns: Vec<Column>,
}

impl TableBuilder {
    pub fn new() -> TableBuilder {
        TableBuilder {
            columns: Vec::new(),
        }
    }

    pub fn left(&mut self, title: &'static str, help: &'static str) {
        self.push_column(title, Alignment::left(), help);
    }

    pub fn right(&mut self, title: &'static str, help: &'static str) {
        self.push_column(title, Alignment::right(), help);
    }

    /// Typically add_field! is used instead.
    pub fn add_cell(&mut self, title: &str, value: String) {
        let Some(column) = self.columns.iter_mut().find(|c| c.title == title) else {
            debug_assert!(false, "no {title} column");
            return;
        };
        if value.is_empty() {
            // tabled misaligns rows with empty cells
            column.cells.push(" ".table_field().to_string());
        } else {
            column.cells.push(value);
        }
    }

    pub fn writeln(&self, mut out: impl Write, titles: bool, explain: bool) {
        uwriteln!(out, "{}", self.render(titles));
        if explain {
            uwriteln!(out);
            for column in &self.columns {
                crate::utils::explain(&mut out, column.title, column.help);
            }
        }
    }

    fn push_column(&mut self, title: &'static str, align: Alignment, help: &'static str) {
        debug_assert!(self.columns.iter().all(|c| c.title != title));
        self.columns.push(Column {
            title,
            align,
            help,
            cells: Vec::new(),
        });
    }

    fn render(&self, titles: bool) -> String {
        let height = self.columns.iter().map(|c| c.cells.len()).max().unwrap_or(0);
        let mut builder = Builder::with_capacity(height + 2, self.columns.len());
        if titles {
            builder.push_record(self.columns.iter().map(|c| c.title.table_header().to_string()));
            builder.push_record(
                self.columns
                    .iter()
                    .map(|c| "-".repeat(c.title.len()).table_sep().to_string()),
            );
        }
        for row in 0..height {
            builder.push_record(
                self.columns
                    .iter()
                    .map(|c| c.cells.get(row).cloned().unwrap_or_default()),
            );
        }

        let mut table = builder.build();
        for (i, column) in self.columns.iter().enumerate() {
            table.modify(Columns::one(i), column.align);
        }
        table.modify(Columns::first(), Padding::new(0, 1, 0, 0));
        table.with(Style::empty());
        table.to_string()
    }
}

macro_rules! add_field {
    ($builder:ident, $title:literal, $value:expr) => {
        let s = format!("{}", $value);
        $builder.add_cell($title, s.table_field().to_string());
    };
    ($builder:ident, $title:literal, $format:literal, $value:expr) => {
        let s = format!($format, $value);
        $builder.add_cell($title, s.table_field().to_string());
    };
}
pub(crate) use add_field;

/// Name/value pairs for a single binary, never titled:
/// ```text
/// word size     64
/// debug build   false
/// ```
pub struct SimpleTableBuilder {
    rows: Vec<(&'static str, String, &'static str)>,
}

impl SimpleTableBuilder {
    pub fn new() -> SimpleTableBuilder {
        SimpleTableBuilder { rows: Vec::new() }
    }

    /// Typically add_simple! is used instead.
    pub fn add_row(&mut self, name: &'static str, value: String, help: &'static str) {
        self.rows.push((name, value, help));
    }

    pub fn writeln(&self, mut out: impl Write, explain: bool) {
        let mut builder = Builder::with_capacity(self.rows.len(), 2);
        for (name, value, _) in &self.rows {
            builder.push_record([name.to_string(), value.clone()]);
        }
        let mut table = builder.build();
        table.modify(Columns::one(0), Alignment::left());
        table.modify(Columns::one(1), Alignment::left());
        table.modify(Columns::first(), Padding::new(0, 2, 0, 0));
        table.with(Style::empty());
        uwriteln!(out, "{table}");

        if explain {
            uwriteln!(out);
            for (name, _, help) in &self.rows {
                crate::utils::explain(&mut out, name, help);
            }
        }
    }
}

macro_rules! add_simple {
    ($builder:ident, $name:literal, $value:expr, $help:expr) => {
        let s = format!("{}", $value);
        $builder.add_row($name, s.table_field().to_string(), $help);
    };
}
pub(crate) use add_simple;
