// Column definitions for the generic data table.

use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Left,
    Right,
    Center,
}

/// One table column.
///
/// `id` is the camelCase field of the row (dotted for nested objects);
/// `sort_key` is the id sent to the server, `None` when the column
/// cannot be sorted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnDef {
    pub id: &'static str,
    pub header: &'static str,
    pub sort_key: Option<&'static str>,
    pub hideable: bool,
    pub align: Align,
}

impl ColumnDef {
    /// A sortable, hideable, left-aligned column sorted by its own id.
    pub const fn new(id: &'static str, header: &'static str) -> Self {
        Self {
            id,
            header,
            sort_key: Some(id),
            hideable: true,
            align: Align::Left,
        }
    }

    pub const fn sort_by(mut self, key: &'static str) -> Self {
        self.sort_key = Some(key);
        self
    }

    pub const fn unsortable(mut self) -> Self {
        self.sort_key = None;
        self
    }

    /// Always shown.
    pub const fn pinned(mut self) -> Self {
        self.hideable = false;
        self
    }

    pub const fn align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    pub fn is_sortable(&self) -> bool {
        self.sort_key.is_some()
    }

    /// Render this column's cell for a JSON row.
    pub fn cell(&self, row: &Value) -> String {
        let value = self
            .id
            .split('.')
            .try_fold(row, |v, segment| v.get(segment));
        match value {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(Value::Bool(true)) => "Sim".into(),
            Some(Value::Bool(false)) => "Não".into(),
            Some(other) => other.to_string(),
        }
    }
}
