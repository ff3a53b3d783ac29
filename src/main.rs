use clap::{Parser, Subcommand};
use contact_enricher::app::{EnrichFileUseCase, InspectFileUseCase, JobReport};
use contact_enricher::common::types::FieldMapping;
use contact_enricher::config::Config;
use contact_enricher::infra::factory;
use contact_enricher::logging;
use contact_enricher::pipeline::ingestion::fetch::FileFetcher;
use contact_enricher::pipeline::processing::enrich::{BatchConfig, BatchRunner};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::error;

#[derive(Parser)]
#[command(name = "contact-enricher")]
#[command(about = "Contact file ingestion and enrichment pipeline")]
#[command(version = "0.1.0")]
struct Cli {
    /// Alternate TOML config file (default: ./config.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a contact file and report schema, mapping, and quality
    Inspect {
        /// Path or URL of the delimited file
        #[arg(long)]
        file: String,
        /// Emit the full inspection as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },
    /// Run the full pipeline and write enriched contacts as NDJSON
    Enrich {
        /// Path or URL of the delimited file
        #[arg(long)]
        file: String,
        /// JSON file with an explicit column mapping (field -> header)
        #[arg(long)]
        mapping: Option<PathBuf>,
        /// Contacts per concurrent chunk (default from config)
        #[arg(long)]
        batch_size: Option<usize>,
        /// Output NDJSON path; failed contacts land in a file next to it
        #[arg(long, default_value = "output/enriched.ndjson")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    logging::init_logging();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    let outcome = match cli.command {
        Commands::Inspect { file, json } => run_inspect(&config, &file, json).await,
        Commands::Enrich {
            file,
            mapping,
            batch_size,
            output,
        } => run_enrich(&config, &file, mapping, batch_size, &output).await,
    };

    if let Err(e) = outcome {
        error!("command failed: {e}");
        println!("❌ {e}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run_inspect(config: &Config, file: &str, json: bool) -> anyhow::Result<()> {
    let store = factory::file_store_for(file, config);
    let fetcher = FileFetcher::new(store, factory::fetch_config(config));
    let inspection = InspectFileUseCase::new(fetcher).inspect(file).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&inspection)?);
        return Ok(());
    }

    println!("\n📄 Inspection for {}:", inspection.metadata.file_name);
    println!("   Rows: {}", inspection.metadata.total_row_count);
    println!("   Columns: {}", inspection.metadata.column_count);
    println!("   Delimiter: {:?}", inspection.table.delimiter);

    println!("\n   Column types:");
    for (header, column_type) in &inspection.column_types {
        println!("   - {header}: {column_type}");
    }

    if inspection.suggested_mapping.is_empty() {
        println!("\n   No columns could be mapped to contact fields");
    } else {
        println!("\n   Suggested mapping:");
        for (field, header) in inspection.suggested_mapping.iter() {
            println!("   - {field} <- {header}");
        }
    }

    println!(
        "\n   Quality score: {}/100",
        inspection.quality.overall_score
    );
    if inspection.quality.is_clean() {
        println!("✅ No quality issues found");
    } else {
        println!("\n⚠️  Issues found:");
        for issue in &inspection.quality.issues {
            println!("   - {issue}");
        }
        println!("\n💡 Recommendations:");
        for rec in &inspection.quality.recommendations {
            println!("   - {rec}");
        }
    }
    Ok(())
}

async fn run_enrich(
    config: &Config,
    file: &str,
    mapping: Option<PathBuf>,
    batch_size: Option<usize>,
    output: &Path,
) -> anyhow::Result<()> {
    let mapping_override = match mapping {
        Some(path) => {
            let content = std::fs::read_to_string(&path)?;
            Some(serde_json::from_str::<FieldMapping>(&content)?)
        }
        None => None,
    };

    let mut batch = factory::batch_config(config);
    if let Some(size) = batch_size {
        batch = BatchConfig::new(size, batch.batch_delay)?;
    }

    let store = factory::file_store_for(file, config);
    let fetcher = FileFetcher::new(store, factory::fetch_config(config));
    let enricher = Arc::new(factory::build_enricher(config));
    let runner = BatchRunner::new(enricher, batch);
    let use_case = EnrichFileUseCase::new(fetcher, runner, config.limits.max_records_per_batch);

    let report = use_case.run(file, mapping_override).await?;
    let errors_path = write_report(output, &report)?;

    println!("\n📊 Enrichment results for {file}:");
    println!("   Job: {}", report.job_id);
    println!("   Contacts in: {}", report.contacts_in);
    println!("   Enriched: {}", report.result.total_processed);
    println!("   Errors: {}", report.result.total_errors);
    println!("   Output file: {}", output.display());

    if let Some(errors_path) = errors_path {
        println!("\n⚠️  {} contacts failed:", report.result.total_errors);
        println!("   Errors file: {}", errors_path.display());
    } else {
        println!("✅ All contacts enriched");
    }
    Ok(())
}

/// One outcome per line; failed contacts go to `<output>.errors.ndjson`
/// next to the main file. Returns the errors path when one was written.
fn write_report(output: &Path, report: &JobReport) -> anyhow::Result<Option<PathBuf>> {
    if let Some(dir) = output.parent() {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir)?;
        }
    }

    let mut writer = BufWriter::new(File::create(output)?);
    for outcome in &report.result.outcomes {
        writeln!(writer, "{}", serde_json::to_string(outcome)?)?;
    }
    writer.flush()?;

    if report.result.errors.is_empty() {
        return Ok(None);
    }
    let errors_path = output.with_extension("errors.ndjson");
    let mut writer = BufWriter::new(File::create(&errors_path)?);
    for error in &report.result.errors {
        writeln!(writer, "{}", serde_json::to_string(error)?)?;
    }
    writer.flush()?;
    Ok(Some(errors_path))
}
