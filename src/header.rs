//! Header parsing: maps each header column onto a record field.
//!
//! Column names are matched after stripping a byte-order mark and
//! uppercasing only their first character, so `close` and `Close` both reach a
//! field named `Close` while `cLOSE` becomes `CLOSE` and does not.

use log::debug;

use crate::record::{Field, Kind};

const BYTE_ORDER_MARK: char = '\u{feff}';

pub fn normalize_header(raw: &str) -> String {
    let trimmed = raw.trim_start_matches(BYTE_ORDER_MARK);
    let mut chars = trimmed.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Binding of one input column.
#[derive(Debug)]
pub enum Column<T> {
    Mapped(Field<T>),
    Ignored { name: String },
}

impl<T> Column<T> {
    pub fn kind(&self) -> Kind {
        match self {
            Column::Mapped(field) => field.kind,
            Column::Ignored { .. } => Kind::Ignored,
        }
    }
}

/// Per-column bindings for one decode session, indexed by column position.
#[derive(Debug)]
pub struct FieldTable<T> {
    columns: Vec<Column<T>>,
}

impl<T> FieldTable<T> {
    pub fn build(header: &[String], fields: &[Field<T>]) -> Self {
        let columns = header
            .iter()
            .enumerate()
            .map(|(idx, raw)| {
                let name = normalize_header(raw);
                match fields.iter().find(|field| !name.is_empty() && field.name == name) {
                    Some(field) => {
                        debug!("Column {idx} '{name}' -> field {} ({})", field.name, field.kind);
                        Column::Mapped(*field)
                    }
                    None => {
                        debug!("Column {idx} '{name}' has no matching field; ignoring");
                        Column::Ignored { name }
                    }
                }
            })
            .collect();
        Self { columns }
    }

    /// Columns past the header width are treated as ignored.
    pub fn kind(&self, idx: usize) -> Kind {
        self.columns
            .get(idx)
            .map(Column::kind)
            .unwrap_or(Kind::Ignored)
    }

    pub fn columns(&self) -> impl Iterator<Item = (usize, &Column<T>)> {
        self.columns.iter().enumerate()
    }

    pub fn mapped_count(&self) -> usize {
        self.columns
            .iter()
            .filter(|column| matches!(column, Column::Mapped(_)))
            .count()
    }

    pub fn ignored_names(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter_map(|column| match column {
                Column::Ignored { name } => Some(name.as_str()),
                Column::Mapped(_) => None,
            })
            .collect()
    }
}
