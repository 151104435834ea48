//! Default command: run the workflow once and print the answer

use anyhow::Context;
use tracing::{debug, warn};

use super::Cli;
use crate::config::AppConfig;
use crate::domain::workflow::{run_workflow, WorkflowPlan};
use crate::infrastructure::agent::OpenAiAgentFactory;
use crate::infrastructure::logging;

/// Load configuration, then create the agent, ingest and ask.
///
/// The answer goes to stdout. Workflow failures are logged by the driver
/// and returned here so the process exits non-zero.
pub async fn run(args: Cli) -> anyhow::Result<()> {
    let config =
        AppConfig::load(args.env_file.as_deref()).context("Failed to load configuration")?;
    logging::init_logging(&config.logging);
    for warning in &config.load_warnings {
        warn!("{}", warning);
    }

    let plan = args.apply_to(
        WorkflowPlan::default().with_ingestion_policy(config.workflow.ingestion_policy),
    );
    debug!(
        path = %plan.document.path.display(),
        policy = %plan.ingestion_policy,
        "Workflow plan ready"
    );

    let factory = OpenAiAgentFactory::new(config);
    let mut stdout = std::io::stdout();
    run_workflow(&factory, plan, &mut stdout).await?;

    Ok(())
}
