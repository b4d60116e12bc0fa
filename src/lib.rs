//! # sales-forecast
//!
//! Reads a catalog of offers, fabricates a year of monthly sales for each of them and predicts the 13th month as the
//! rounded average of the last three.
//!
//! The work is a straight pipeline of plain functions over explicit values:
//!
//! | Stage | Module | Output |
//! | ----- | ------ | ------ |
//! | Parse the catalog document | [`catalog`] | [`Catalog`](catalog::Catalog) |
//! | Fill in monthly sales | [`sales`], [`provider`] | [`ItemSales`](sales::ItemSales) |
//! | Forecast the next month | [`forecast`], [`report`] | [`SalesReport`](report::SalesReport) |
//! | Save the data | [`report`] | JSON file |
//! | Present it | [`table`], [`chart`] | text |
//!
//! Sales numbers come from a [`SalesProvider`](provider::SalesProvider). The default one,
//! [`RandomSales`](provider::RandomSales), is a stand-in for a real data source; tests and demos plug in
//! [`FixedSales`](provider::FixedSales) or a closure instead.
//!
//! ```
//! use sales_forecast::prelude::*;
//!
//! let catalog = CatalogReader::builder()
//!     .build()
//!     .unwrap()
//!     .read_str(
//!         "inline",
//!         r#"<offers><offer><name>Rover</name><price>10</price><param name="Миссия">M</param></offer></offers>"#,
//!     )
//!     .unwrap();
//! let mut provider = FixedSales::new(vec![0, 0, 0, 0, 0, 0, 0, 0, 0, 10, 20, 30]);
//! let report = SalesReport::from_history(generate(&catalog, &mut provider).unwrap()).unwrap();
//! assert_eq!(report.items[0].forecast, 20);
//! ```

pub mod app;
pub mod catalog;
pub mod chart;
pub mod forecast;
pub mod locale;
pub mod provider;
pub mod report;
pub mod sales;
pub mod table;
pub mod types;
pub mod ui;

#[doc(inline)]
pub use app::ForecastApp;
#[doc(inline)]
pub use types::ForecastError;

pub mod prelude {
    pub use crate::catalog::Catalog;
    pub use crate::catalog::CatalogReader;
    pub use crate::catalog::Offer;
    pub use crate::chart::BarChart;
    pub use crate::forecast::forecast;
    pub use crate::locale::Locale;
    pub use crate::provider::FixedSales;
    pub use crate::provider::RandomSales;
    pub use crate::provider::SalesProvider;
    pub use crate::report::SalesRecord;
    pub use crate::report::SalesReport;
    pub use crate::sales::generate;
    pub use crate::sales::MONTHS;
    pub use crate::table::SalesTable;
    pub use crate::types::*;
}
