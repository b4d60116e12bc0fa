use tracing::debug;
use tracing::instrument;

use crate::catalog::Catalog;
use crate::catalog::Offer;
use crate::provider::SalesProvider;
use crate::types::ForecastError;
use crate::types::Result;

/// Length of the sales history, in months.
pub const MONTHS: usize = 12;

#[derive(Clone, Debug, PartialEq)]
pub struct ItemSales {
    pub offer: Offer,
    /// Monthly quantities, oldest first. Always [`MONTHS`] long.
    pub sales: Vec<u32>,
}

/// Attach [`MONTHS`] periods of sales history to every catalog offer.
#[instrument(level = "debug", skip_all, fields(offers = catalog.len()))]
pub fn generate<P: SalesProvider + ?Sized>(catalog: &Catalog, provider: &mut P) -> Result<Vec<ItemSales>> {
    catalog
        .iter()
        .map(|offer| {
            let sales = provider.monthly_sales(offer, MONTHS);
            if sales.len() != MONTHS {
                return Err(ForecastError::SeriesLength {
                    name:     offer.name.clone(),
                    expected: MONTHS,
                    actual:   sales.len(),
                });
            }
            debug!(name = %offer.name, ?sales, "Sales history generated");
            Ok(ItemSales {
                offer: offer.clone(),
                sales,
            })
        })
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::provider::FixedSales;
    use crate::provider::RandomSales;

    fn catalog() -> Catalog {
        Catalog::from_offers(["A", "B", "C"].map(|name| Offer {
            name:     name.to_string(),
            price:    10.0,
            category: "cat".to_string(),
        }))
    }

    #[test]
    fn test_generate_keeps_catalog_order() {
        let mut provider = RandomSales::builder().seed(Some(7)).build().unwrap();
        let items = generate(&catalog(), &mut provider).unwrap();
        let names: Vec<_> = items.iter().map(|i| i.offer.name.as_str()).collect();
        assert_eq!(names, ["A", "B", "C"]);
        assert!(items.iter().all(|i| i.sales.len() == MONTHS));
    }

    #[test]
    fn test_generate_with_fixture() {
        let mut provider = FixedSales::new(vec![3; MONTHS]).with_series("B", (1..=12).collect());
        let items = generate(&catalog(), &mut provider).unwrap();
        assert_eq!(items[0].sales, vec![3; MONTHS]);
        assert_eq!(items[1].sales, (1..=12).collect::<Vec<u32>>());
    }

    #[test]
    fn test_short_series_rejected() {
        let mut provider = |_: &Offer, _: usize| vec![1, 2, 3];
        let err = generate(&catalog(), &mut provider).unwrap_err();
        assert!(matches!(
            err,
            ForecastError::SeriesLength {
                expected: MONTHS,
                actual: 3,
                ..
            }
        ));
    }
}
