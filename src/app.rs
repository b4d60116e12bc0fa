use std::fmt::Display;
use std::path::PathBuf;

use clap::error::ErrorKind;
use clap::CommandFactory;
use clap::Parser;
use fieldx::fxstruct;
use garde::Validate;
use tracing::debug;
use tracing::instrument;

use crate::catalog::CatalogReader;
use crate::chart::BarChart;
use crate::locale::Locale;
use crate::provider::RandomSales;
use crate::provider::SalesProvider;
use crate::report::SalesReport;
use crate::sales;
use crate::table::SalesTable;
use crate::types::fcerr;
use crate::types::ForecastError;
use crate::types::Result;
use crate::ui::Console;

#[derive(Debug, Clone, clap::Parser, Validate)]
#[fxstruct(no_new, get(copy))]
#[clap(about, version, author, name = "sales-forecast")]
pub(crate) struct Cli {
    /// Catalog document with the offers.
    #[fieldx(get(clone))]
    #[garde(skip)]
    #[clap(long, short, env = "SALESFC_INPUT", default_value = "xml.xml")]
    input: PathBuf,

    /// Where to save the sales data and forecasts.
    #[fieldx(get(clone))]
    #[garde(skip)]
    #[clap(long, short, env = "SALESFC_OUTPUT", default_value = "rovers_sales_data.json")]
    output: PathBuf,

    /// Value of the `name` attribute of the <param> element that holds an offer's category.
    #[fieldx(get(clone))]
    #[garde(length(min = 1))]
    #[clap(long, env = "SALESFC_CATEGORY_PARAM", default_value = "Миссия")]
    category_param: String,

    /// Language of the table, the chart and the error messages.
    #[garde(skip)]
    #[clap(long, short, env = "SALESFC_LOCALE", value_enum, default_value_t = Locale::En)]
    locale: Locale,

    /// Seed the sales generator to get the same numbers on every run.
    #[garde(skip)]
    #[clap(long, env = "SALESFC_SEED")]
    seed: Option<u64>,

    /// Lowest monthly sales count to generate.
    #[garde(custom(Self::not_above("max-sales", &self.max_sales)))]
    #[clap(long, env = "SALESFC_MIN_SALES", default_value_t = 0)]
    min_sales: u32,

    /// Highest monthly sales count to generate.
    #[garde(skip)]
    #[clap(long, env = "SALESFC_MAX_SALES", default_value_t = 50)]
    max_sales: u32,

    /// Don't print the month-by-item table.
    #[garde(skip)]
    #[clap(long, env = "SALESFC_NO_TABLE", default_value_t = false)]
    no_table: bool,

    /// Don't draw the sales chart.
    #[garde(skip)]
    #[clap(long, env = "SALESFC_NO_CHART", default_value_t = false)]
    no_chart: bool,

    /// Silence the diagnostics
    #[garde(skip)]
    #[clap(long, short, env = "SALESFC_QUIET", default_value_t = false)]
    quiet: bool,

    /// File to send log into
    #[fieldx(get(clone))]
    #[garde(skip)]
    #[clap(long, env = "SALESFC_LOG_FILE")]
    log_file: Option<PathBuf>,
}

impl Cli {
    fn not_above<'a, T: PartialOrd + Display>(
        max_name: &'static str,
        max: &'a T,
    ) -> impl FnOnce(&'a T, &()) -> garde::Result {
        move |value, _| {
            if value > max {
                Err(garde::Error::new(format!(
                    "{} is more than {max_name} ({})",
                    *value, *max
                )))
            }
            else {
                Ok(())
            }
        }
    }
}

/// The command line application: catalog in, sales data file, table and chart out.
#[fxstruct(no_new, builder(vis(pub)))]
pub struct ForecastApp {
    /// Arguments to use instead of the process command line, program name first.
    #[fieldx(get(clone), builder("_cli_args"), default(Vec::new()))]
    cli_args: Vec<String>,
}

impl ForecastApp {
    /// `Ok(None)` means help or version has been printed and there is nothing else to do.
    fn cli(&self) -> Result<Option<Cli>> {
        let parsed = if self.cli_args.is_empty() {
            Cli::try_parse()
        }
        else {
            Cli::try_parse_from(self.cli_args.iter())
        };

        let cli = match parsed {
            Ok(cli) => cli,
            Err(err) => match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                    err.print()?;
                    return Ok(None);
                }
                _ => return Err(err.into()),
            },
        };

        if let Err(report) = cli.validate() {
            let mut cmd = Cli::command();
            return Err(cmd.error(ErrorKind::InvalidValue, report).into());
        }

        Ok(Some(cli))
    }

    fn random_provider(cli: &Cli) -> Result<RandomSales> {
        RandomSales::builder()
            .min_sales(cli.min_sales())
            .max_sales(cli.max_sales())
            .seed(cli.seed())
            .build()
            .map_err(ForecastError::builder("sales provider"))
    }

    #[cfg(feature = "tracing")]
    fn setup_tracing(&self, cli: &Cli, console: &Console) -> Result<()> {
        use std::io;
        use std::sync::Mutex;

        use tracing::info;
        use tracing_subscriber::layer::SubscriberExt;
        use tracing_subscriber::util::SubscriberInitExt;

        let dest_writer = Mutex::new(if let Some(log_file) = cli.log_file() {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(log_file)?;
            Box::new(file) as Box<dyn io::Write + Send>
        }
        else {
            Box::new(io::stderr()) as Box<dyn io::Write + Send>
        });

        let registry = tracing_subscriber::registry()
            .with(tracing_subscriber::EnvFilter::from_default_env())
            .with(tracing_subscriber::fmt::layer().with_writer(dest_writer));

        if let Err(err) = registry.try_init() {
            console.report_debug(format!("Tracing is not initialized: {err}"));
        }
        else {
            info!("Tracing initialized");
        }

        Ok(())
    }

    #[instrument(level = "debug", skip_all)]
    fn pipeline<P: SalesProvider + ?Sized>(
        &self,
        cli: &Cli,
        console: &Console,
        provider: &mut P,
    ) -> Result<SalesReport> {
        let reader = CatalogReader::builder()
            .category_param(cli.category_param())
            .build()
            .map_err(ForecastError::builder("catalog reader"))?;

        let input = cli.input();
        let output = cli.output();
        if input == output {
            return Err(fcerr!(
                "Refusing to overwrite the catalog {} with the sales data",
                input.display()
            ));
        }

        let catalog = reader.read_file(&input)?;
        console.report_info(format!("Loaded {} offers from {}", catalog.len(), input.display()));

        let history = sales::generate(&catalog, provider)?;
        let report = SalesReport::from_history(history)?;

        report.write_json(&output)?;
        console.report_info(format!("Sales data saved to {}", output.display()));

        if !cli.no_table() {
            console.output(SalesTable::pivot(&report, cli.locale()));
        }

        if !cli.no_chart() {
            let chart = BarChart::builder()
                .build()
                .map_err(ForecastError::builder("bar chart"))?;
            console.output(chart.render(&report, cli.locale()));
        }

        Ok(report)
    }

    fn report_failure(&self, locale: Locale, console: &Console, err: &ForecastError) {
        match locale.describe(err) {
            Some(msg) => {
                debug!(error = %err, "Input rejected");
                console.report_error(msg);
            }
            None => console.report_error(format!("Application errored out: {err}")),
        }
    }

    fn execute_cli<P: SalesProvider + ?Sized>(&self, cli: &Cli, provider: &mut P) -> Result<()> {
        let console = Console::builder()
            .quiet(cli.quiet())
            .build()
            .map_err(ForecastError::builder("console"))?;

        #[cfg(feature = "tracing")]
        self.setup_tracing(cli, &console)?;

        #[cfg(not(feature = "tracing"))]
        if let Some(log_file) = cli.log_file() {
            console.report_warn(format!(
                "Built without the 'tracing' feature, log file {} is not used",
                log_file.display()
            ));
        }

        if let Some(seed) = cli.seed() {
            console.report_debug(format!("Sales generator seed: {seed}"));
        }

        self.pipeline(cli, &console, provider)
            .map(|_| ())
            .inspect_err(|err| self.report_failure(cli.locale(), &console, err))
    }

    fn parsed_cli(&self) -> Result<Option<Cli>> {
        self.cli().inspect_err(|err| {
            if let ForecastError::Cli(clap_err) = err {
                let _ = clap_err.print();
            }
        })
    }

    /// Run with randomly generated sales.
    pub fn execute(&self) -> Result<()> {
        let Some(cli) = self.parsed_cli()? else {
            return Ok(());
        };
        let mut provider = Self::random_provider(&cli)?;
        self.execute_cli(&cli, &mut provider)
    }

    /// Run with sales coming from `provider`. The sales bounds and the seed options are ignored.
    pub fn execute_with<P: SalesProvider + ?Sized>(&self, provider: &mut P) -> Result<()> {
        let Some(cli) = self.parsed_cli()? else {
            return Ok(());
        };
        self.execute_cli(&cli, provider)
    }

    pub fn run() -> Result<()> {
        ForecastApp::builder()
            .build()
            .map_err(ForecastError::builder("application"))?
            .execute()
    }
}

impl ForecastAppBuilder {
    pub fn cli_args<S: ToString>(self, args: Vec<S>) -> Self {
        self._cli_args(args.into_iter().map(|s| s.to_string()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["cmd"]).expect("Failed to parse CLI arguments");
        assert_eq!(cli.input(), PathBuf::from("xml.xml"));
        assert_eq!(cli.output(), PathBuf::from("rovers_sales_data.json"));
        assert_eq!(cli.category_param(), "Миссия");
        assert_eq!(cli.locale(), Locale::En);
        assert_eq!(cli.min_sales(), 0);
        assert_eq!(cli.max_sales(), 50);
        assert_eq!(cli.seed(), None);
        assert!(!cli.quiet());
        assert!(cli.validate().is_ok());
    }

    #[test]
    fn test_cli_parsing() {
        let args = vec![
            "cmd",
            "--quiet",
            "--locale",
            "ru",
            "--seed",
            "17",
            "--max-sales",
            "10",
            "--no-chart",
            "-i",
            "catalog.xml",
        ];
        let cli = Cli::try_parse_from(args).expect("Failed to parse CLI arguments");
        assert_eq!(cli.locale(), Locale::Ru);
        assert_eq!(cli.seed(), Some(17));
        assert_eq!(cli.max_sales(), 10);
        assert_eq!(cli.input(), PathBuf::from("catalog.xml"));
        assert!(cli.quiet());
        assert!(cli.no_chart());
        assert!(!cli.no_table());
    }

    #[test]
    fn test_cli_validation() {
        let cli = Cli::try_parse_from(["cmd", "--min-sales", "20", "--max-sales", "10"]).unwrap();
        assert!(cli.validate().is_err());

        let app = ForecastApp::builder()
            .cli_args(vec!["cmd", "--min-sales", "20", "--max-sales", "10"])
            .build()
            .unwrap();
        assert!(matches!(app.cli(), Err(ForecastError::Cli(_))));
    }

    #[test]
    fn test_help_is_not_an_error() {
        let app = ForecastApp::builder().cli_args(vec!["cmd", "--help"]).build().unwrap();
        assert!(app.cli().unwrap().is_none());
    }

    #[test]
    fn test_output_must_differ_from_input() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.xml");
        std::fs::write(&path, "<offers/>").unwrap();
        let path = path.display().to_string();

        let app = ForecastApp::builder()
            .cli_args(vec!["cmd", "--quiet", "--input", path.as_str(), "--output", path.as_str()])
            .build()
            .unwrap();
        assert!(matches!(app.execute(), Err(ForecastError::Other(_))));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "<offers/>");
    }

    #[test]
    fn test_random_provider_follows_cli() {
        let cli = Cli::try_parse_from(["cmd", "--min-sales", "3", "--max-sales", "4", "--seed", "1"]).unwrap();
        let provider = ForecastApp::random_provider(&cli).unwrap();
        assert_eq!(provider.min_sales(), 3);
        assert_eq!(provider.max_sales(), 4);
        assert_eq!(provider.seed(), Some(1));
    }
}
