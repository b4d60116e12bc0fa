use std::fmt::Display;

use comfy_table::CellAlignment;
use comfy_table::Table;

use crate::locale::Locale;
use crate::report::SalesReport;

/// Month-by-item view of a report: one row per month plus the forecast row, one column per item.
#[derive(Clone, Debug, PartialEq)]
pub struct SalesTable {
    header: Vec<String>,
    rows:   Vec<(String, Vec<u32>)>,
}

impl SalesTable {
    pub fn pivot(report: &SalesReport, locale: Locale) -> Self {
        let mut header = vec![locale.month_caption().to_string()];
        header.extend(report.items.iter().map(|i| i.name.clone()));

        let mut rows: Vec<(String, Vec<u32>)> = locale
            .months()
            .iter()
            .enumerate()
            .map(|(month, label)| {
                (
                    label.to_string(),
                    report
                        .items
                        .iter()
                        .map(|i| i.sales.get(month).copied().unwrap_or_default())
                        .collect(),
                )
            })
            .collect();

        rows.push((
            locale.forecast_label().to_string(),
            report.items.iter().map(|i| i.forecast).collect(),
        ));

        Self { header, rows }
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn rows(&self) -> &[(String, Vec<u32>)] {
        &self.rows
    }

    /// Number of item columns, not counting the row label column.
    pub fn item_count(&self) -> usize {
        self.header.len() - 1
    }

    pub fn to_comfy(&self) -> Table {
        let mut table = Table::new();
        table
            .load_preset(comfy_table::presets::ASCII_FULL_CONDENSED)
            .set_header(self.header.clone());

        for (label, values) in &self.rows {
            let mut row = vec![label.clone()];
            row.extend(values.iter().map(|v| v.to_string()));
            table.add_row(row);
        }

        for col in 1..=self.item_count() {
            if let Some(column) = table.column_mut(col) {
                column.set_cell_alignment(CellAlignment::Right);
            }
        }

        table
    }
}

impl Display for SalesTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_comfy())
    }
}
