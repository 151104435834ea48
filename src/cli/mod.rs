//! CLI for the knowledge agent
//!
//! Running without arguments performs the default workflow: create the
//! agent, ingest the bundled document and ask the default question.

pub mod run;

use std::collections::BTreeMap;
use std::path::PathBuf;

use clap::Parser;

use crate::domain::workflow::{IngestionPolicy, WorkflowPlan};

/// Knowledge agent - ingest a document and ask a question about it
#[derive(Debug, Parser)]
#[command(name = "knowledge-agent")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Dotenv file to read settings from (defaults to `.env` when present)
    #[arg(long, value_name = "PATH")]
    pub env_file: Option<PathBuf>,

    /// Document to ingest
    #[arg(long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Question to ask once the document is ingested
    #[arg(long)]
    pub question: Option<String>,

    /// Tag attached to every chunk; repeat for several (replaces the defaults)
    #[arg(long = "metadata", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub metadata: Vec<(String, String)>,

    /// `await-only` asks regardless of the ingestion result; `require-indexed`
    /// stops when nothing was indexed or some chunks failed
    #[arg(long, value_name = "POLICY", value_parser = parse_policy)]
    pub ingestion_policy: Option<IngestionPolicy>,
}

impl Cli {
    /// Apply the flags on top of `plan`
    pub fn apply_to(&self, mut plan: WorkflowPlan) -> WorkflowPlan {
        if let Some(file) = &self.file {
            plan = plan.with_document_path(file);
        }

        if let Some(question) = &self.question {
            plan = plan.with_query(question);
        }

        if !self.metadata.is_empty() {
            plan = plan.with_metadata(self.metadata.iter().cloned().collect::<BTreeMap<_, _>>());
        }

        if let Some(policy) = self.ingestion_policy {
            plan = plan.with_ingestion_policy(policy);
        }

        plan
    }
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", raw))?;

    let key = key.trim();
    if key.is_empty() {
        return Err(format!("metadata key cannot be empty in '{}'", raw));
    }

    Ok((key.to_string(), value.trim().to_string()))
}

fn parse_policy(raw: &str) -> Result<IngestionPolicy, String> {
    raw.parse().map_err(|e: crate::domain::workflow::WorkflowError| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::workflow::{DEFAULT_DOCUMENT_PATH, DEFAULT_QUERY};

    #[test]
    fn test_no_arguments_keeps_default_plan() {
        let cli = Cli::try_parse_from(["knowledge-agent"]).unwrap();
        let plan = cli.apply_to(WorkflowPlan::default());

        assert_eq!(plan, WorkflowPlan::default());
        assert_eq!(plan.document.path, PathBuf::from(DEFAULT_DOCUMENT_PATH));
        assert_eq!(plan.query, DEFAULT_QUERY);
    }

    #[test]
    fn test_flags_override_plan() {
        let cli = Cli::try_parse_from([
            "knowledge-agent",
            "--file",
            "notes.md",
            "--question",
            "What is a sunspot?",
            "--metadata",
            "topic=sunspots",
            "--metadata",
            "year = 1911",
            "--ingestion-policy",
            "require-indexed",
        ])
        .unwrap();

        let plan = cli.apply_to(WorkflowPlan::default());

        assert_eq!(plan.document.path, PathBuf::from("notes.md"));
        assert_eq!(plan.query, "What is a sunspot?");
        assert_eq!(
            plan.document.metadata,
            BTreeMap::from([
                ("topic".to_string(), "sunspots".to_string()),
                ("year".to_string(), "1911".to_string()),
            ])
        );
        assert_eq!(plan.ingestion_policy, IngestionPolicy::RequireIndexed);
    }

    #[test]
    fn test_env_file_flag() {
        let cli = Cli::try_parse_from(["knowledge-agent", "--env-file", "prod.env"]).unwrap();
        assert_eq!(cli.env_file, Some(PathBuf::from("prod.env")));
    }

    #[test]
    fn test_rejects_malformed_metadata() {
        assert!(Cli::try_parse_from(["knowledge-agent", "--metadata", "novalue"]).is_err());
        assert!(Cli::try_parse_from(["knowledge-agent", "--metadata", "=x"]).is_err());
    }

    #[test]
    fn test_rejects_unknown_policy() {
        assert!(Cli::try_parse_from(["knowledge-agent", "--ingestion-policy", "maybe"]).is_err());
    }
}
