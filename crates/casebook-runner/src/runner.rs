//! Report orchestration: run the suites, collect the summary, render the HTML.

use crate::case::TestSuite;
use crate::config::RunnerConfig;
use crate::engine::SequentialEngine;
use anyhow::{Context, Result};
use casebook_lib::renderer::resolve_report_path;
use casebook_lib::{ExceptionClassifier, ReportRenderer, RunAggregator, RunSummary, SourceRegistry};
use std::path::PathBuf;
use tracing::{info, instrument};
use tracing_subscriber::fmt::writer::BoxMakeWriter;

/// Finished run: the summary and where its report was written
#[derive(Debug, Clone)]
pub struct RunReport {
    pub summary: RunSummary,
    pub path: PathBuf,
}

impl RunReport {
    pub fn success(&self) -> bool {
        self.summary.success
    }
}

/// Runs suites through the sequential engine and renders the report
pub struct ReportRunner {
    suites: Vec<TestSuite>,
    config: RunnerConfig,
    echo: Option<BoxMakeWriter>,
}

impl ReportRunner {
    pub fn new(suites: Vec<TestSuite>, config: RunnerConfig) -> Self {
        Self {
            suites,
            config,
            echo: None,
        }
    }

    /// Forward case output to `writer` while it is captured
    pub fn with_echo(mut self, writer: BoxMakeWriter) -> Self {
        self.echo = Some(writer);
        self
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Execute every suite and write the HTML report
    #[instrument(skip_all, fields(suites = self.suites.len()))]
    pub fn run(self) -> Result<RunReport> {
        let Self {
            suites,
            config,
            echo,
        } = self;

        let classifier = match &config.known_exceptions {
            Some(path) => ExceptionClassifier::from_file(path)
                .with_context(|| format!("Failed to load known exceptions: {}", path.display()))?,
            None => ExceptionClassifier::new(),
        };

        let mut sources = SourceRegistry::new();
        for suite in &suites {
            suite.register_sources(&mut sources);
        }

        let mut aggregator = RunAggregator::new()
            .with_classifier(classifier)
            .with_sources(sources);
        if let Some(name) = &config.report_name {
            aggregator = aggregator.with_name(name);
        }
        if let Some(echo) = echo {
            aggregator = aggregator.with_echo(echo);
        }

        SequentialEngine::new().run(&suites, &mut aggregator);
        let summary = aggregator.into_summary();

        let output = resolve_report_path(&config.report_dir, config.filename.as_deref())
            .with_context(|| {
                format!("Failed to resolve report path in {}", config.report_dir.display())
            })?;
        let path = ReportRenderer::new(&config.template_path)
            .render(&summary, &summary.class_list, &output)
            .context("Failed to render report")?;

        info!(
            path = %path.display(),
            passed = summary.result.successes,
            failed = summary.result.failures,
            skipped = summary.result.skipped,
            "Test report generated: {}",
            path.display()
        );

        Ok(RunReport { summary, path })
    }
}
