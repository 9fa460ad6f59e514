use anyhow::Result;
use casebook_runner::renderer::render_summary_as_tree;
use casebook_runner::{demo, LogTargets, ReportRunner, RunnerConfig};
use clap::Parser;
use dotenvy::dotenv;
use std::path::PathBuf;
use tracing::info;

/// Runs the bundled demo suite and writes an HTML test report.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Run label shown as the report name
    #[arg(long)]
    name: Option<String>,

    /// Report filename; `.html` is appended when missing
    #[arg(long)]
    filename: Option<String>,

    /// Directory the report is written to
    #[arg(long)]
    report_dir: Option<PathBuf>,

    /// Also append log output to a dated file in the log directory
    #[arg(long)]
    log: bool,

    /// Directory for the dated log file
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// HTML template containing the summary and class-set markers
    #[arg(long)]
    template: Option<PathBuf>,

    /// YAML or JSON file mapping failure types to readable reasons
    #[arg(long)]
    known_exceptions: Option<PathBuf>,
}

impl Cli {
    /// Flags given on the command line win over the environment
    fn apply(self, mut config: RunnerConfig) -> RunnerConfig {
        if let Some(name) = self.name {
            config = config.with_report_name(name);
        }
        if let Some(filename) = self.filename {
            config = config.with_filename(filename);
        }
        if let Some(dir) = self.report_dir {
            config = config.with_report_dir(dir);
        }
        if self.log {
            config = config.with_logging(true);
        }
        if let Some(dir) = self.log_dir {
            config = config.with_log_dir(dir);
        }
        if let Some(path) = self.template {
            config = config.with_template(path);
        }
        if let Some(path) = self.known_exceptions {
            config = config.with_known_exceptions(path);
        }
        config
    }
}

fn main() -> Result<()> {
    dotenv().ok();

    let cli = Cli::parse();
    let config = cli.apply(RunnerConfig::from_env());

    let logs = LogTargets::from_config(&config)?;
    logs.init_global()?;
    info!(config = ?config, "Starting casebook");

    let report = ReportRunner::new(demo::suites(), config)
        .with_echo(logs.make_writer())
        .run()?;

    println!("\n{}", render_summary_as_tree(&report.summary));
    println!("Report: {}", report.path.display());
    Ok(())
}
