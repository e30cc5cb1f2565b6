use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use piscan::report::{csv_header, csv_line};
use piscan::{Policy, RepoContext, ReportDocument, RiskLevel, ScanConfig, Scanner};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Parser)]
#[command(
    name = "piscan",
    about = "Scan source-code repositories for Australian Personal Information",
    version
)]
struct Cli {
    /// Directory to scan.
    path: PathBuf,

    /// Optional TOML policy configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, default_value = "summary")]
    format: Format,

    /// Worker pool size.
    #[arg(long)]
    workers: Option<usize>,

    /// Treat the scanned repository as publicly visible.
    #[arg(long)]
    public_repo: bool,

    /// Exit non-zero when any finding reaches this risk level.
    #[arg(long, value_enum)]
    fail_on_risk: Option<FailLevel>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Summary,
    Json,
    Csv,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FailLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl From<FailLevel> for RiskLevel {
    fn from(level: FailLevel) -> Self {
        match level {
            FailLevel::Low => RiskLevel::Low,
            FailLevel::Medium => RiskLevel::Medium,
            FailLevel::High => RiskLevel::High,
            FailLevel::Critical => RiskLevel::Critical,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subsystem
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ScanConfig::from_toml_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => ScanConfig::default(),
    };

    let mut policy = Policy::compile(config).context("compiling scan policy")?;
    if let Some(workers) = cli.workers {
        policy.workers = workers.max(1);
    }
    if cli.public_repo {
        policy = policy.with_repo_context(RepoContext {
            visibility: piscan::types::RepoVisibility::Public,
            ..RepoContext::default()
        });
    }

    let scanner = Scanner::new(Arc::new(policy));
    let report = scanner
        .scan_directory(&cli.path)
        .await
        .with_context(|| format!("scanning {}", cli.path.display()))?;

    let document = ReportDocument::new(
        cli.path.display().to_string(),
        report.files_scanned,
        report.stats,
        report.findings,
    );

    match cli.format {
        Format::Json => println!("{}", document.to_json()?),
        Format::Csv => {
            println!("{}", csv_header());
            for finding in &document.findings {
                println!("{}", csv_line(finding));
            }
        }
        Format::Summary => print_summary(&document),
    }

    if let Some(fail_level) = cli.fail_on_risk {
        let threshold: RiskLevel = fail_level.into();
        if document
            .worst_level()
            .map(|worst| worst >= threshold)
            .unwrap_or(false)
        {
            std::process::exit(2);
        }
    }

    Ok(())
}

fn print_summary(document: &ReportDocument) {
    println!(
        "Scanned {} files, {} finding(s)",
        document.files_scanned,
        document.findings.len()
    );
    for (level, count) in document.summary.iter().rev() {
        println!("  {level}: {count}");
    }
    for finding in &document.findings {
        println!(
            "  {}:{}:{} {} {} conf={:.2} ({})",
            finding.file_path,
            finding.line,
            finding.column,
            finding.effective_risk_level(),
            finding.pi_type,
            finding.confidence,
            finding.masked_literal(),
        );
    }
}
