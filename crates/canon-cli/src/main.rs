//! canon: verify character-backstory claims against a narrative corpus.
//!
//! Usage: canon <command>

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use canon_core::config::{CanonConfig, CliOverrides, ProviderKind, ThresholdProfile};
use canon_core::traits::{CancellationToken, IVerdictStore, ITextGenerator};
use canon_llm::{create_provider, RetryPolicy, StructuredClient, Throttle};
use canon_observability::init_tracing;
use canon_pipeline::{BatchReport, BatchRunner, FsVerdictStore, ResultsSummary};
use canon_reasoning::ClaimVerifier;
use canon_retrieval::FileEvidenceStore;
use clap::{Args, Parser, Subcommand};
use tracing::info;

#[derive(Parser)]
#[command(name = "canon")]
#[command(about = "Character-backstory claim verification", version)]
struct Cli {
    /// Config file used in place of ./canon.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Verify every claim in the evidence directory
    Run(RunArgs),

    /// Summarise stored verdicts and write the results CSVs
    Summary {
        /// Directory holding verdict records
        #[arg(long)]
        output_dir: Option<String>,
    },

    /// Check that the configured text generator is reachable
    Health {
        #[arg(long, value_parser = parse_provider)]
        provider: Option<ProviderKind>,
        #[arg(long)]
        model: Option<String>,
    },
}

#[derive(Args)]
struct RunArgs {
    /// Directory of per-claim evidence bundles
    #[arg(long)]
    evidence_dir: Option<String>,
    /// Directory verdict records are written to
    #[arg(long)]
    output_dir: Option<String>,
    #[arg(long, value_parser = parse_provider)]
    provider: Option<ProviderKind>,
    #[arg(long)]
    model: Option<String>,
    /// Claims verified in parallel
    #[arg(long)]
    concurrency: Option<usize>,
    /// Synthesis threshold profile (conservative or boosted)
    #[arg(long, value_parser = parse_profile)]
    profile: Option<ThresholdProfile>,
}

fn parse_provider(label: &str) -> Result<ProviderKind, String> {
    ProviderKind::parse(label).ok_or_else(|| format!("unknown provider '{label}'"))
}

fn parse_profile(label: &str) -> Result<ThresholdProfile, String> {
    ThresholdProfile::parse(label).ok_or_else(|| format!("unknown threshold profile '{label}'"))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let overrides = match &cli.command {
        Command::Run(args) => CliOverrides {
            provider: args.provider,
            model: args.model.clone(),
            evidence_dir: args.evidence_dir.clone(),
            output_dir: args.output_dir.clone(),
            max_concurrent_claims: args.concurrency,
            profile: args.profile,
        },
        Command::Summary { output_dir } => CliOverrides {
            output_dir: output_dir.clone(),
            ..CliOverrides::default()
        },
        Command::Health { provider, model } => CliOverrides {
            provider: *provider,
            model: model.clone(),
            ..CliOverrides::default()
        },
    };

    let config = load_config(cli.config.as_deref(), &overrides)?;
    init_tracing(&config.observability);

    match cli.command {
        Command::Run(_) => run(&config),
        Command::Summary { .. } => summary(&config),
        Command::Health { .. } => health(&config),
    }
}

fn load_config(path: Option<&Path>, overrides: &CliOverrides) -> Result<CanonConfig> {
    match path {
        Some(path) => CanonConfig::load_file(path, Some(overrides))
            .with_context(|| format!("loading config from {}", path.display())),
        None => {
            let root = std::env::current_dir().context("resolving working directory")?;
            CanonConfig::load(&root, Some(overrides)).context("loading canon.toml")
        }
    }
}

fn build_generator(config: &CanonConfig) -> Result<Arc<dyn ITextGenerator>> {
    let provider = create_provider(&config.llm).context("initialising text generator")?;
    Ok(Arc::from(provider))
}

fn run(config: &CanonConfig) -> Result<()> {
    let generator = build_generator(config)?;
    let throttle = Arc::new(Throttle::new(Duration::from_millis(
        config.throttle.inter_call_pause_ms,
    )));
    let client = StructuredClient::new(generator, RetryPolicy::from_config(&config.retry), throttle);
    let verifier = Arc::new(ClaimVerifier::new(Arc::new(client), config.reasoning.clone()));

    let evidence = Arc::new(FileEvidenceStore::new(&config.batch.evidence_dir));
    let store = Arc::new(FsVerdictStore::new(&config.batch.output_dir));
    let runner = BatchRunner::new(verifier, evidence.clone(), store.clone(), config.batch.clone())
        .with_inter_claim_pause(Duration::from_millis(config.throttle.inter_claim_pause_ms));

    info!(
        evidence_dir = %config.batch.evidence_dir,
        output_dir = %config.batch.output_dir,
        workers = config.batch.max_concurrent_claims,
        "starting batch"
    );
    let report = runner.run(evidence.as_ref(), &CancellationToken::new())?;
    print_report(&report);

    write_summary(config, store.as_ref())
}

fn summary(config: &CanonConfig) -> Result<()> {
    let store = FsVerdictStore::new(&config.batch.output_dir);
    write_summary(config, &store)
}

fn write_summary(config: &CanonConfig, store: &dyn IVerdictStore) -> Result<()> {
    let records = store.list().context("reading verdict records")?;
    if records.is_empty() {
        println!("No verdict records in {}", config.batch.output_dir);
        return Ok(());
    }
    let summary = ResultsSummary::from_records(&records, config.batch.bias_warning_fraction);
    let (results, extended) = summary
        .write_csv(Path::new(&config.batch.output_dir))
        .context("writing results")?;
    print_summary(&summary, config.batch.bias_warning_fraction);
    println!();
    println!("Results:          {}", results.display());
    println!("Extended results: {}", extended.display());
    Ok(())
}

fn health(config: &CanonConfig) -> Result<()> {
    let generator = build_generator(config)?;
    generator
        .health_check()
        .with_context(|| format!("{} is not reachable", generator.name()))?;
    println!("{}: ok", generator.name());
    Ok(())
}

fn print_report(report: &BatchReport) {
    println!("Batch");
    println!("  Claims:     {}", report.total);
    println!("  Processed:  {}", report.processed);
    println!("  Skipped:    {}", report.skipped);
    println!("  Failed:     {}", report.failed());
    if report.was_cancelled() {
        println!("  Cancelled:  {}", report.cancelled);
    }
    println!("  Fallbacks:  {}", report.fallbacks);
    println!("  Elapsed:    {:.1}s", report.elapsed_ms as f64 / 1000.0);
    for failure in &report.failures {
        println!("  ! {}: {}", failure.claim_id, failure.error);
    }
    println!();
}

fn print_summary(summary: &ResultsSummary, bias_threshold: f64) {
    let total = summary.rows.len();
    let consistent = summary.predicted_consistent();
    println!("Summary");
    println!("  Total claims:               {total}");
    println!("  Predicted consistent (1):   {consistent}");
    println!("  Predicted contradicted (0): {}", total - consistent);
    println!();
    println!("Verdict breakdown");
    println!("  contradicted: {}", summary.counts.contradicted);
    println!("  supported:    {}", summary.counts.supported);
    println!("  undetermined: {}", summary.counts.undetermined);
    println!();
    println!("Average confidence: {:.2}%", summary.average_confidence * 100.0);
    if summary.bias_warning {
        println!(
            "WARNING: {:.0}% of verdicts are SUPPORTED (threshold {:.0}%); check for support bias",
            summary.supported_fraction * 100.0,
            bias_threshold * 100.0
        );
    }
}
