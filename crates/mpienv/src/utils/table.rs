use tabled::{
    Table, Tabled,
    settings::{Panel, Remove, Style, object::Rows},
};

#[derive(Debug, Clone, Default)]
pub struct FormatConfig {
    pub header: Option<String>,
    /// Drop the column-name row.
    pub hide_columns: bool,
}

/// Borderless table, optionally titled.
pub fn format<T: Tabled>(data: impl IntoIterator<Item = T>, config: FormatConfig) -> Table {
    let mut table = Table::new(data);
    if config.hide_columns {
        table.with(Remove::row(Rows::first()));
    }
    if let Some(header) = config.header {
        table.with(Panel::header(header));
    }
    table.with(Style::blank());
    table
}
