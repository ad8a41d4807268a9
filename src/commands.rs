//! Command implementations for tabregress CLI

use crate::cli::{Commands, OutputFormat};
use crate::comparator::TableComparator;
use crate::config::CompareConfig;
use crate::data::DataProcessor;
use crate::error::{Result, TabregressError};
use crate::output::{save_report, JsonFormatter, PrettyPrinter};
use crate::progress::ProgressReporter;
use crate::report::RegressionReport;
use crate::table::{DataType, Table};
use std::path::{Path, PathBuf};

/// How a successful command ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    Completed,
    /// A regression was found and the caller asked to fail on it
    RegressionDetected,
}

/// Execute a command
pub fn execute_command(command: Commands) -> Result<CommandOutcome> {
    match command {
        Commands::Compare {
            current,
            previous,
            key,
            format,
            output,
            config,
            fail_on_regression,
        } => {
            let options = CompareOptions::resolve(key, format, output, config.as_deref(), fail_on_regression)?;
            compare_command(&current, &previous, &options)
        }
        Commands::Demo { format } => demo_command(&format),
    }
}

/// Command-line flags merged over the optional config file
#[derive(Debug, Clone)]
struct CompareOptions {
    config: CompareConfig,
    primary_key: Vec<String>,
    format: OutputFormat,
    output: Option<PathBuf>,
    fail_on_regression: bool,
}

impl CompareOptions {
    fn resolve(
        key: Vec<String>,
        format: Option<String>,
        output: Option<PathBuf>,
        config_path: Option<&Path>,
        fail_on_regression: bool,
    ) -> Result<Self> {
        let config = match config_path {
            Some(path) => CompareConfig::load(path)?,
            None => CompareConfig::default(),
        };

        let primary_key = if key.is_empty() {
            config.primary_key.clone()
        } else {
            key
        };
        let format_name = format
            .or_else(|| config.format.clone())
            .unwrap_or_else(|| "pretty".to_string());
        let format = OutputFormat::parse(&format_name).map_err(TabregressError::config)?;

        Ok(Self {
            output: output.or_else(|| config.output.clone()),
            fail_on_regression: fail_on_regression || config.fail_on_regression,
            config,
            primary_key,
            format,
        })
    }
}

fn compare_command(current_path: &Path, previous_path: &Path, options: &CompareOptions) -> Result<CommandOutcome> {
    let mut progress = ProgressReporter::new_for_compare(options.format == OutputFormat::Pretty);

    let processor = DataProcessor::with_settings(&options.config.loader_settings())?;
    let current = processor.load_table(current_path)?;
    let previous = processor.load_table(previous_path)?;
    progress.finish_loading(&format!(
        "Loaded {} current and {} previous rows",
        current.row_count(),
        previous.row_count()
    ));

    if options.primary_key.is_empty() {
        log::warn!("No primary key given; per-column value changes will not be computed");
    }

    let comparator = TableComparator::new(current, previous, options.primary_key.clone());
    let schema_changes = comparator.compare_schema();
    progress.finish_schema("Schema compared");

    let value_changes = comparator.compare_values(&schema_changes)?;
    progress.finish_values("Values compared");
    drop(progress);

    let report = RegressionReport::new(schema_changes, value_changes);
    emit_report(&report, options.format, options.output.as_deref())?;

    if options.fail_on_regression && report.potential_regression {
        Ok(CommandOutcome::RegressionDetected)
    } else {
        Ok(CommandOutcome::Completed)
    }
}

fn demo_command(format: &str) -> Result<CommandOutcome> {
    let format = OutputFormat::parse(format).map_err(TabregressError::invalid_input)?;
    let (current, previous) = demo_tables()?;

    let comparator = TableComparator::new(current, previous, vec!["id".to_string(), "user_id".to_string()]);
    let report = comparator.generate_statistics()?;
    emit_report(&report, format, None)?;
    Ok(CommandOutcome::Completed)
}

/// Product catalogue before and after a release: prices move, `quantity`
/// turns into text and a `status` column appears
pub fn demo_tables() -> Result<(Table, Table)> {
    let ids = [1, 2, 3, 4, 5];
    let users = ["U001", "U002", "U003", "U004", "U005"];
    let products = ["Laptop", "Mouse", "Keyboard", "Monitor", "Headphones"];

    let previous = Table::builder()
        .column("id", DataType::int64(), ids)
        .column("user_id", DataType::Text, users)
        .column("product_name", DataType::Text, products)
        .column("price", DataType::float64(), [999.99, 25.50, 89.99, 299.99, 149.99])
        .column("quantity", DataType::int64(), [10, 50, 30, 15, 25])
        .build()?;

    let current = Table::builder()
        .column("id", DataType::int64(), ids)
        .column("user_id", DataType::Text, users)
        .column("product_name", DataType::Text, products)
        .column("price", DataType::float64(), [1199.99, 35.50, 129.99, 299.99, 179.99])
        .column("quantity", DataType::Text, ["8", "42", "30", "20", "25"])
        .column("status", DataType::Text, ["active", "active", "inactive", "active", "inactive"])
        .build()?;

    Ok((current, previous))
}

fn emit_report(report: &RegressionReport, format: OutputFormat, output: Option<&Path>) -> Result<()> {
    match format {
        OutputFormat::Pretty => PrettyPrinter::print_report(report),
        OutputFormat::Json => println!("{}", JsonFormatter::format_report(report)?),
    }

    if let Some(path) = output {
        save_report(report, path)?;
    }
    Ok(())
}
