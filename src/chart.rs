use std::iter;

use console::measure_text_width;
use console::pad_str;
use console::style;
use console::Alignment;
use console::Style;
use fieldx::fxstruct;

use crate::locale::Locale;
use crate::report::SalesReport;
use crate::sales::MONTHS;

/// Grouped horizontal bar chart of a report, drawn with terminal characters.
///
/// Every month is a group with one bar per item; the forecasts form the last group. Bars are scaled against the
/// largest quantity in the report so the longest one takes `bar_width` cells.
#[derive(Debug)]
#[fxstruct(no_new, builder, get(copy))]
pub struct BarChart {
    #[fieldx(default(40))]
    bar_width: usize,

    #[fieldx(default('█'))]
    bar_char: char,
}

impl BarChart {
    fn history_style(idx: usize) -> Style {
        match idx % 5 {
            0 => Style::new().cyan(),
            1 => Style::new().green(),
            2 => Style::new().yellow(),
            3 => Style::new().blue(),
            _ => Style::new().magenta(),
        }
    }

    fn forecast_style() -> Style {
        Style::new().red()
    }

    /// Bar length in cells. Any non-zero value gets at least one cell unless the chart has no room for bars.
    pub fn bar_len(&self, value: u32, peak: u32) -> usize {
        if value == 0 || peak == 0 || self.bar_width == 0 {
            return 0;
        }
        let cells = (value as f64 / peak as f64 * self.bar_width as f64).round() as usize;
        cells.clamp(1, self.bar_width)
    }

    fn bar(&self, value: u32, peak: u32) -> String {
        iter::repeat(self.bar_char).take(self.bar_len(value, peak)).collect()
    }

    pub fn render(&self, report: &SalesReport, locale: Locale) -> String {
        let peak = report.peak();
        let groups: Vec<&str> = locale
            .months()
            .iter()
            .copied()
            .chain(iter::once(locale.forecast_label()))
            .collect();
        let group_width = groups.iter().map(|g| measure_text_width(g)).max().unwrap_or(0);

        let series: Vec<(String, String)> = report
            .items
            .iter()
            .map(|i| {
                (
                    format!("{} ({})", i.name, locale.history_suffix()),
                    format!("{} ({})", i.name, locale.forecast_suffix()),
                )
            })
            .collect();
        let label_width = series
            .iter()
            .flat_map(|(h, f)| [measure_text_width(h), measure_text_width(f)])
            .max()
            .unwrap_or(0);

        let mut lines = Vec::new();
        lines.push(style(locale.chart_title()).bold().to_string());
        lines.push(format!("{} ^ {}", " ".repeat(group_width), locale.month_caption()));

        for (period, group) in groups.iter().enumerate() {
            let forecast_group = period == MONTHS;
            if report.is_empty() {
                lines.push(format!("{} │", pad_str(group, group_width, Alignment::Left, None)));
            }
            for (idx, item) in report.items.iter().enumerate() {
                let (value, label, bar_style) = if forecast_group {
                    (item.forecast, &series[idx].1, Self::forecast_style())
                }
                else {
                    (
                        item.sales.get(period).copied().unwrap_or_default(),
                        &series[idx].0,
                        Self::history_style(idx),
                    )
                };
                let caption = if idx == 0 { *group } else { "" };
                lines.push(format!(
                    "{} │ {} {} {}",
                    pad_str(caption, group_width, Alignment::Left, None),
                    pad_str(label, label_width, Alignment::Left, None),
                    bar_style.apply_to(self.bar(value, peak)),
                    value
                ));
            }
            if period + 1 < groups.len() {
                lines.push(format!("{} │", " ".repeat(group_width)));
            }
        }

        lines.push(format!(
            "{} └{}> {}",
            " ".repeat(group_width),
            "─".repeat(label_width + self.bar_width + 2),
            locale.sales_caption()
        ));

        if !report.is_empty() {
            lines.push(String::new());
            for (idx, (history, forecast)) in series.iter().enumerate() {
                lines.push(format!(
                    "  {} {}  {} {}",
                    Self::history_style(idx).apply_to(self.bar_char),
                    history,
                    Self::forecast_style().apply_to(self.bar_char),
                    forecast
                ));
            }
        }

        lines.join("\n")
    }
}
