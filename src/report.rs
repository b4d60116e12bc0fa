use std::io::BufWriter;
use std::io::Write;
use std::path::Path;

use serde::Deserialize;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use tracing::info;
use tracing::instrument;

use crate::forecast::forecast;
use crate::sales::ItemSales;
use crate::types::Result;

/// Everything known about an item after the forecast: catalog data, history and prediction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SalesRecord {
    pub name:     String,
    pub price:    f64,
    pub category: String,
    pub sales:    Vec<u32>,
    pub forecast: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SalesReport {
    pub items: Vec<SalesRecord>,
}

impl SalesReport {
    pub fn from_history(history: Vec<ItemSales>) -> Result<Self> {
        let items = history
            .into_iter()
            .map(|item| {
                let forecast = forecast(&item.sales)?;
                Ok(SalesRecord {
                    name: item.offer.name,
                    price: item.offer.price,
                    category: item.offer.category,
                    sales: item.sales,
                    forecast,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { items })
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The largest quantity in the report, history and forecasts alike.
    pub fn peak(&self) -> u32 {
        self.items
            .iter()
            .flat_map(|i| i.sales.iter().copied().chain(std::iter::once(i.forecast)))
            .max()
            .unwrap_or(0)
    }

    pub fn write_pretty<W: Write>(&self, writer: W) -> Result<()> {
        let mut ser = serde_json::Serializer::with_formatter(writer, PrettyFormatter::with_indent(b"    "));
        self.serialize(&mut ser)?;
        Ok(())
    }

    pub fn to_json(&self) -> Result<String> {
        let mut buf = Vec::new();
        self.write_pretty(&mut buf)?;
        // serde_json only ever emits UTF-8.
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    #[instrument(level = "debug", skip(self, path), fields(path = %path.display()))]
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let mut file = BufWriter::new(std::fs::File::create(path)?);
        self.write_pretty(&mut file)?;
        writeln!(file)?;
        file.flush()?;
        info!(items = self.len(), "Sales report written");
        Ok(())
    }
}
