use std::path::Path;

use strum::Display;
use strum::EnumString;

use crate::types::ForecastError;

const MONTHS_EN: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

const MONTHS_RU: [&str; 12] = [
    "Янв", "Фев", "Мар", "Апр", "Май", "Июн", "Июл", "Авг", "Сен", "Окт", "Ноя", "Дек",
];

/// Language of everything the user gets to read: table captions, chart labels and input error messages.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Display, EnumString, clap::ValueEnum)]
#[strum(serialize_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Ru,
}

impl Locale {
    pub fn months(&self) -> &'static [&'static str; 12] {
        match self {
            Locale::En => &MONTHS_EN,
            Locale::Ru => &MONTHS_RU,
        }
    }

    /// Label of the 13th, predicted period.
    pub fn forecast_label(&self) -> &'static str {
        match self {
            Locale::En => "Forecast",
            Locale::Ru => "Прогноз",
        }
    }

    pub fn month_caption(&self) -> &'static str {
        match self {
            Locale::En => "Month",
            Locale::Ru => "Месяц",
        }
    }

    pub fn sales_caption(&self) -> &'static str {
        match self {
            Locale::En => "Sales count",
            Locale::Ru => "Количество продаж",
        }
    }

    pub fn chart_title(&self) -> &'static str {
        match self {
            Locale::En => "Sales dynamics with a 13th month forecast",
            Locale::Ru => "Динамика продаж с прогнозом на 13-й месяц",
        }
    }

    pub fn history_suffix(&self) -> &'static str {
        match self {
            Locale::En => "history",
            Locale::Ru => "история",
        }
    }

    pub fn forecast_suffix(&self) -> &'static str {
        match self {
            Locale::En => "forecast",
            Locale::Ru => "прогноз",
        }
    }

    pub fn file_not_found(&self, path: &Path) -> String {
        match self {
            Locale::En => format!("File {} not found.", path.display()),
            Locale::Ru => format!("Файл {} не найден.", path.display()),
        }
    }

    pub fn malformed_document(&self, origin: &str) -> String {
        match self {
            Locale::En => format!("Malformed XML structure in file {origin}."),
            Locale::Ru => format!("Ошибка в структуре XML-файла {origin}."),
        }
    }

    /// The localized message for one of the two recognized input failures, `None` for anything else.
    pub fn describe(&self, err: &ForecastError) -> Option<String> {
        match err {
            ForecastError::FileNotFound { path } => Some(self.file_not_found(path)),
            ForecastError::Malformed { origin, .. } => Some(self.malformed_document(origin)),
            _ => None,
        }
    }
}
