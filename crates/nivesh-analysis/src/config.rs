//! Configuration for analysis runs
//!
//! One immutable [`AnalysisConfig`] value is built up front and passed into
//! each pipeline; nothing is mutated per session.

use crate::error::{AnalysisError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for one analysis pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Model identity used for extraction and summarisation
    pub model: String,

    /// Sampling temperature for model calls
    pub temperature: Option<f32>,

    /// Maximum tokens per model call
    pub max_tokens: usize,

    /// Regional scope for web searches
    pub search_region: String,

    /// Result cap for ticker-resolution searches
    pub search_max_results: usize,

    /// Result cap for news searches
    pub news_max_results: usize,

    /// Exchange suffix appended before data-provider calls
    pub exchange_suffix: String,

    /// Assumed weighted average cost of capital for the simplified DCF
    pub wacc: f64,

    /// Growth rate used when the info snapshot carries none
    pub default_growth_rate: f64,

    /// Projection horizon for the simplified DCF, in periods
    pub dcf_horizon: u32,

    /// Request timeout for outbound HTTP calls
    pub request_timeout: Duration,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            model: "llama3-groq-8b-8192-tool-use-preview".to_string(),
            temperature: None,
            max_tokens: 1024,
            search_region: "in".to_string(),
            search_max_results: 5,
            news_max_results: 5,
            exchange_suffix: ".NS".to_string(),
            wacc: 0.1,
            default_growth_rate: 0.03,
            dcf_horizon: 5,
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl AnalysisConfig {
    /// Create a new configuration builder
    pub fn builder() -> AnalysisConfigBuilder {
        AnalysisConfigBuilder::default()
    }

    /// Override the model from the `NIVESH_MODEL` environment variable
    pub fn with_env_model(mut self) -> Self {
        if let Ok(model) = std::env::var("NIVESH_MODEL") {
            self.model = model;
        }
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.model.is_empty() {
            return Err(AnalysisError::Config("model must not be empty".to_string()));
        }

        if self.search_max_results == 0 || self.news_max_results == 0 {
            return Err(AnalysisError::Config(
                "search result caps must be greater than 0".to_string(),
            ));
        }

        // The Gordon-growth terminal value needs wacc strictly above growth
        if self.wacc <= self.default_growth_rate {
            return Err(AnalysisError::Config(format!(
                "wacc ({}) must exceed default growth rate ({})",
                self.wacc, self.default_growth_rate
            )));
        }

        if !self.exchange_suffix.starts_with('.') {
            return Err(AnalysisError::Config(format!(
                "exchange suffix must start with '.': {:?}",
                self.exchange_suffix
            )));
        }

        Ok(())
    }
}

/// Builder for AnalysisConfig
#[derive(Debug, Default)]
pub struct AnalysisConfigBuilder {
    model: Option<String>,
    temperature: Option<f32>,
    max_tokens: Option<usize>,
    search_region: Option<String>,
    search_max_results: Option<usize>,
    news_max_results: Option<usize>,
    exchange_suffix: Option<String>,
    wacc: Option<f64>,
    default_growth_rate: Option<f64>,
    dcf_horizon: Option<u32>,
    request_timeout: Option<Duration>,
}

impl AnalysisConfigBuilder {
    /// Set the model identity
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the sampling temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the maximum tokens per model call
    pub fn max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Set the regional scope for web searches
    pub fn search_region(mut self, region: impl Into<String>) -> Self {
        self.search_region = Some(region.into());
        self
    }

    /// Set the result cap for ticker-resolution searches
    pub fn search_max_results(mut self, max_results: usize) -> Self {
        self.search_max_results = Some(max_results);
        self
    }

    /// Set the result cap for news searches
    pub fn news_max_results(mut self, max_results: usize) -> Self {
        self.news_max_results = Some(max_results);
        self
    }

    /// Set the exchange suffix
    pub fn exchange_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.exchange_suffix = Some(suffix.into());
        self
    }

    /// Set the assumed cost of capital
    pub fn wacc(mut self, wacc: f64) -> Self {
        self.wacc = Some(wacc);
        self
    }

    /// Set the fallback growth rate
    pub fn default_growth_rate(mut self, rate: f64) -> Self {
        self.default_growth_rate = Some(rate);
        self
    }

    /// Set the DCF projection horizon
    pub fn dcf_horizon(mut self, periods: u32) -> Self {
        self.dcf_horizon = Some(periods);
        self
    }

    /// Set the outbound request timeout
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<AnalysisConfig> {
        let defaults = AnalysisConfig::default();

        let config = AnalysisConfig {
            model: self.model.unwrap_or(defaults.model),
            temperature: self.temperature.or(defaults.temperature),
            max_tokens: self.max_tokens.unwrap_or(defaults.max_tokens),
            search_region: self.search_region.unwrap_or(defaults.search_region),
            search_max_results: self.search_max_results.unwrap_or(defaults.search_max_results),
            news_max_results: self.news_max_results.unwrap_or(defaults.news_max_results),
            exchange_suffix: self.exchange_suffix.unwrap_or(defaults.exchange_suffix),
            wacc: self.wacc.unwrap_or(defaults.wacc),
            default_growth_rate: self.default_growth_rate.unwrap_or(defaults.default_growth_rate),
            dcf_horizon: self.dcf_horizon.unwrap_or(defaults.dcf_horizon),
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
        };

        config.validate()?;
        Ok(config)
    }
}
