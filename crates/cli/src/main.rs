use anyhow::Context;
use clap::{Parser, Subcommand};
use hca_core::reports::{CostOverview, ReadmissionOverview, RiskOverview};
use hca_core::{config_from_lookup, AnalyticsService, CoreConfig};
use hca_export::ReportExporter;
use hca_store::SqliteSource;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "hca")]
#[command(about = "Healthcare analytics reporting CLI")]
struct Cli {
    /// SQLite database to read (overrides HCA_DATABASE_PATH)
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Import a directory of CSV exports into the database
    Import {
        /// Directory containing patients.csv, conditions.csv, ...
        csv_dir: PathBuf,
    },
    /// Check that the database can be opened
    Check,
    /// Print the executive summary
    Summary,
    /// Patient risk overview
    Risk,
    /// Readmission risk overview
    Readmission,
    /// Cost overview
    Costs,
    /// Demographic and cost statistics
    Insights,
    /// Write CSV reports to the export directory
    Export {
        #[command(subcommand)]
        report: ExportCommand,
    },
}

#[derive(Subcommand)]
enum ExportCommand {
    /// Frequency reports plus the scored risk, readmission and cost tables
    Reports,
    /// Multi-sheet comprehensive report
    Comprehensive,
    /// Executive summary workbook
    Summary,
    /// Everything recorded for one patient
    Patient {
        /// Patient identifier
        patient_id: String,
    },
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("hca_store=info".parse()?)
                .add_directive("hca_export=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let today = chrono::Local::now().date_naive();
    let cfg = config_from_lookup(|key| std::env::var(key).ok(), today)?;
    let cfg = match &cli.database {
        Some(path) => CoreConfig::new(
            path.clone(),
            cfg.export_dir().to_path_buf(),
            cfg.reference_date(),
            cfg.row_limit(),
        )?,
        None => cfg,
    };

    let stdout = std::io::stdout();
    run(cli.command, Arc::new(cfg), &mut stdout.lock())
}

fn run(
    command: Option<Commands>,
    cfg: Arc<CoreConfig>,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let source = SqliteSource::new(cfg.database_path());
    let service = AnalyticsService::new(cfg.clone(), source);

    match command {
        Some(Commands::Import { csv_dir }) => {
            let summary = hca_store::import_csv_dir(cfg.database_path(), &csv_dir)
                .with_context(|| format!("importing {}", csv_dir.display()))?;
            for table in &summary.imported {
                writeln!(out, "{:<15} {:>8} rows", table.table, table.rows)?;
            }
            for skipped in &summary.skipped {
                writeln!(out, "skipped: {} (not found)", skipped.display())?;
            }
            writeln!(
                out,
                "Imported {} rows into {}",
                summary.total_rows(),
                cfg.database_path().display()
            )?;
        }
        Some(Commands::Check) => match service.ping() {
            Ok(version) => writeln!(out, "Database connection successful ({version})")?,
            Err(e) => anyhow::bail!("Database connection failed: {e}"),
        },
        Some(Commands::Summary) => {
            let summary = service.executive_summary()?;
            for (metric, value) in summary.metrics() {
                writeln!(out, "{metric:<32} {value}")?;
            }
        }
        Some(Commands::Risk) => {
            let scored = service.patient_risk_scores()?;
            let Some(overview) = RiskOverview::from_scored(&scored) else {
                writeln!(out, "No risk data available")?;
                return Ok(());
            };
            writeln!(out, "Patients analyzed: {}", overview.total_patients_analyzed)?;
            writeln!(
                out,
                "High: {}  Medium: {}  Low: {}",
                overview.high_risk_count, overview.medium_risk_count, overview.low_risk_count
            )?;
            for p in &overview.top_high_risk_patients {
                writeln!(
                    out,
                    "{:<36} {:<30} {:>6.1} {}",
                    p.row.patient_id, p.row.patient_name, p.score, p.category
                )?;
            }
        }
        Some(Commands::Readmission) => {
            let scored = service.readmission_risk()?;
            let Some(overview) = ReadmissionOverview::from_scored(&scored) else {
                writeln!(out, "Insufficient data for readmission prediction")?;
                return Ok(());
            };
            writeln!(out, "Patients analyzed: {}", overview.total_patients_analyzed)?;
            for p in &overview.high_risk_patients {
                writeln!(
                    out,
                    "{:<36} {:<30} {:>6.1} {}",
                    p.row.patient_id, p.row.patient_name, p.score, p.category
                )?;
            }
        }
        Some(Commands::Costs) => {
            let categorized = service.cost_analysis()?;
            let Some(overview) = CostOverview::from_categorized(&categorized) else {
                writeln!(out, "No cost data available")?;
                return Ok(());
            };
            writeln!(out, "Patients analyzed: {}", overview.total_patients_analyzed)?;
            writeln!(out, "Total expenses: {:.2}", overview.total_healthcare_expenses)?;
            writeln!(out, "Average per patient: {:.2}", overview.average_cost_per_patient)?;
            for c in &overview.highest_cost_patients {
                writeln!(
                    out,
                    "{:<36} {:<30} {:>12.2} {}",
                    c.row.patient_id, c.row.patient_name, c.row.total_cost, c.category
                )?;
            }
        }
        Some(Commands::Insights) => {
            let insights = service.demographic_insights()?;
            writeln!(out, "Cohort size: {}", insights.cohort_size)?;
            if let Some(age) = &insights.age_statistics {
                writeln!(
                    out,
                    "Age: mean {:.1}, median {:.1}, range {}-{}",
                    age.mean, age.median, age.min, age.max
                )?;
            }
            if let Some(cost) = &insights.cost_statistics {
                writeln!(
                    out,
                    "Expenses: mean {:.2}, median {:.2}, total {:.2}",
                    cost.mean, cost.median, cost.total
                )?;
            }
            for g in &insights.gender_distribution {
                writeln!(
                    out,
                    "Gender {}: {} ({:.1}%)",
                    g.gender.code(),
                    g.count,
                    g.percentage
                )?;
            }
            for s in &insights.top_states {
                writeln!(out, "State {}: {}", s.state, s.count)?;
            }
        }
        Some(Commands::Export { report }) => {
            let exporter = ReportExporter::from_config(&service);
            let written = match report {
                ExportCommand::Reports => {
                    let mut files = exporter.export_basic_reports()?;
                    files.extend(exporter.export_scored_reports()?);
                    files
                }
                ExportCommand::Comprehensive => vec![exporter.export_comprehensive_report()?],
                ExportCommand::Summary => vec![exporter.export_executive_summary()?],
                ExportCommand::Patient { patient_id } => {
                    match exporter.export_patient_report(&patient_id)? {
                        Some(path) => vec![path],
                        None => anyhow::bail!("Patient {patient_id} not found"),
                    }
                }
            };
            for path in written {
                writeln!(out, "Report exported to {}", path.display())?;
            }
        }
        None => {
            writeln!(out, "Use 'hca --help' for commands")?;
        }
    }

    Ok(())
}
