//! Application configuration

mod app_config;

pub use app_config::{
    AppConfig, KnowledgeConfig, LogFormat, LoggingConfig, OpenAiConfig, WorkflowConfig,
};
