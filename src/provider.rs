use std::collections::HashMap;

use fieldx::fxstruct;
use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;

use crate::catalog::Offer;

/// Source of the historical per-period sales of an item.
pub trait SalesProvider {
    /// Sales quantities of the `offer` for `periods` consecutive periods, oldest first.
    fn monthly_sales(&mut self, offer: &Offer, periods: usize) -> Vec<u32>;
}

impl<F> SalesProvider for F
where
    F: FnMut(&Offer, usize) -> Vec<u32>,
{
    fn monthly_sales(&mut self, offer: &Offer, periods: usize) -> Vec<u32> {
        self(offer, periods)
    }
}

/// Fabricated sales, uniformly distributed over `min_sales..=max_sales`.
///
/// Both bounds are inclusive. A `min_sales` above `max_sales` is not an error: the bounds are swapped.
#[fxstruct(no_new, builder, get(copy))]
pub struct RandomSales {
    #[fieldx(default(0))]
    min_sales: u32,

    #[fieldx(default(50))]
    max_sales: u32,

    /// Fixed seed for reproducible runs; OS entropy is used otherwise.
    #[fieldx(default(None))]
    seed: Option<u64>,

    #[fieldx(private, get(off), builder(off))]
    rng: Option<StdRng>,
}

impl RandomSales {
    fn rng(&mut self) -> &mut StdRng {
        let seed = self.seed;
        self.rng.get_or_insert_with(|| match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        })
    }
}

impl SalesProvider for RandomSales {
    fn monthly_sales(&mut self, _offer: &Offer, periods: usize) -> Vec<u32> {
        let low = self.min_sales.min(self.max_sales);
        let high = self.min_sales.max(self.max_sales);
        let rng = self.rng();
        (0..periods).map(|_| rng.random_range(low..=high)).collect()
    }
}

/// Predefined series per item name; items without one get the fallback series.
///
/// A series shorter than requested is cycled, a longer one is cut.
#[derive(Clone, Debug, Default)]
pub struct FixedSales {
    series:   HashMap<String, Vec<u32>>,
    fallback: Vec<u32>,
}

impl FixedSales {
    pub fn new(fallback: Vec<u32>) -> Self {
        Self {
            series: HashMap::new(),
            fallback,
        }
    }

    pub fn with_series<S: ToString>(mut self, name: S, series: Vec<u32>) -> Self {
        self.series.insert(name.to_string(), series);
        self
    }
}

impl SalesProvider for FixedSales {
    fn monthly_sales(&mut self, offer: &Offer, periods: usize) -> Vec<u32> {
        let series = self.series.get(&offer.name).unwrap_or(&self.fallback);
        if series.is_empty() {
            return vec![0; periods];
        }
        series.iter().copied().cycle().take(periods).collect()
    }
}
