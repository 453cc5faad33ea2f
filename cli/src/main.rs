//! CLI entrypoint for Conclave.
//!
//! Wires every layer together via dependency injection, following the
//! teacher's `cli/src/main.rs` composition-root pattern.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{bail, Result};
use clap::Parser;
use conclave_application::ports::interaction::{AutoAcceptPolicy, AutoRejectPolicy, InteractionPort};
use conclave_application::ports::provider_port::ProviderRegistry;
use conclave_application::{Conclave, EventBus, HealthMonitor, HedgedRequestManager, RunConsultationUseCase};
use conclave_domain::agent::AgentDescriptor;
use conclave_domain::artifact::ArtifactFilterConfig;
use conclave_domain::consultation::{ConsultationOptions, Mode};
use conclave_domain::core::question::Question;
use conclave_domain::provider::TierMap;
use conclave_infrastructure::{ConfigLoader, EventLogger, HttpProviderAdapter, LocalContextLoader};
use conclave_presentation::{Cli, ConsoleFormatter, OutputFormatter, ProgressReporter, StdinInteraction};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    info!("starting conclave");

    let question = match &cli.question {
        Some(q) => Question::new(q.clone()),
        None => bail!("a question is required"),
    };

    let config = ConfigLoader::load(cli.config.as_ref()).unwrap_or_else(|err| {
        tracing::warn!("config load failed, using defaults: {err}");
        ConfigLoader::load_defaults()
    });

    if config.providers.providers.is_empty() {
        bail!("no providers configured; add [[providers]] to conclave.toml");
    }
    if config.agents.agents.is_empty() {
        bail!("no agents configured; add [[agents]] to conclave.toml");
    }

    let mut registry: ProviderRegistry = HashMap::new();
    let mut tier_map = TierMap::new();
    for provider in &config.providers.providers {
        let api_key = std::env::var(&provider.api_key_env).unwrap_or_default();
        let provider_id = conclave_domain::ProviderId::new(provider.id.clone());
        let adapter = HttpProviderAdapter::new(provider_id.clone(), provider.base_url.clone(), api_key);
        registry.insert(provider_id.clone(), Arc::new(adapter));
        tier_map.insert(provider_id, provider.parse_tier());
    }

    let mut agents: Vec<AgentDescriptor> = config.agents.to_domain();
    if let Some(judge_id) = &cli.judge {
        for agent in &mut agents {
            if agent.id.as_str() == judge_id.as_str() {
                agent.role = Some("judge".into());
            }
        }
    }

    let event_bus = Arc::new(EventBus::new());

    if let Some(path) = cli.event_log.as_ref() {
        if let Some(logger) = EventLogger::new(path) {
            event_bus.subscribe(move |event| logger.log(event));
        }
    }

    if !cli.quiet {
        let progress = Arc::new(ProgressReporter::new());
        progress.attach(&event_bus);
    }

    let interaction: Arc<dyn InteractionPort> = if cli.yes {
        Arc::new(AutoAcceptPolicy)
    } else if cli.no_interactive {
        Arc::new(AutoRejectPolicy)
    } else {
        Arc::new(StdinInteraction::new())
    };
    let interactive = !cli.yes && !cli.no_interactive;
    let cost_consent = if cli.yes {
        Some(true)
    } else if cli.no_interactive {
        Some(false)
    } else {
        None
    };

    let health_monitor = HealthMonitor::new(registry.clone(), config.health.to_domain(), Arc::clone(&event_bus));
    health_monitor.start().await;

    let hedge_manager = Arc::new(HedgedRequestManager::new(
        registry,
        Arc::clone(&health_monitor),
        Arc::new(tier_map),
        config.hedge.to_domain(),
        Arc::clone(&event_bus),
        Arc::clone(&interaction),
        interactive,
    ));

    let use_case = Arc::new(RunConsultationUseCase::new(
        hedge_manager,
        config.cost.to_price_table(),
        config.cost.to_gate_config(),
        config.pulse.to_domain(),
        ArtifactFilterConfig {
            verbose: cli.verbose_artifacts,
            ..ArtifactFilterConfig::default()
        },
        interaction,
        Arc::clone(&event_bus),
        Arc::new(LocalContextLoader::new()),
    ));
    let conclave = Conclave::new(use_case);

    let mode = if cli.quick { Mode::Quick } else { Mode::Consult };
    let options = ConsultationOptions {
        mode,
        verbose: cli.verbose_artifacts,
        max_rounds: mode.max_rounds(),
        timeout_ms: cli.timeout_ms,
        interactive,
        project_path: Some(cli.project.clone()),
        cost_consent,
    };

    let root_cancel = tokio_util::sync::CancellationToken::new();
    let result = conclave.consult(question, agents, options, root_cancel).await;

    let formatter = ConsoleFormatter;
    let output = match cli.output {
        conclave_domain::OutputFormat::Full => formatter.format(&result),
        conclave_domain::OutputFormat::Synthesis => formatter.format_verdict_only(&result),
        conclave_domain::OutputFormat::Json => formatter.format_json(&result),
    };
    println!("{output}");

    Ok(())
}
