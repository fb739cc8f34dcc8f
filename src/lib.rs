//! # MCP TruthLens
//!
//! A Model Context Protocol (MCP) server that scores short passages of text
//! for reliability, bias and sentiment, and classifies them as reliable,
//! questionable or misinformation.
//!
//! ## Analysis tiers
//!
//! - **Combined**: one provider call returns a complete assessment
//! - **Decomposed**: sentiment, bias and factuality are requested
//!   concurrently and fused locally
//! - **Heuristic**: weighted pattern matching, no network
//!
//! A failing tier falls through to the next one, so every non-empty input
//! gets a bounded result and the `model` field names the tier that produced it.
//!
//! ## Architecture
//!
//! ```text
//! MCP Client → MCP Server (Rust) → DegradationController → Langbase Pipes / Chat API
//!                    ↓                       ↓
//!            SQLite (history)         HeuristicScorer
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use mcp_truthlens::analysis::{DegradationController, HeuristicScorer, Language};
//! use mcp_truthlens::{provider, storage, AppState, Config};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env()?;
//!     let store = storage::open(&config.database).await?;
//!     let provider = provider::from_config(&config)?;
//!     let controller =
//!         DegradationController::new(provider, HeuristicScorer::new(), config.analysis.clone());
//!     let state = AppState::new(config, store, controller);
//!     let completed = state.analyze("Scientists confirmed the findings", Language::En).await?;
//!     println!("{}", completed.result.category);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]

/// Trust scoring, fusion and the tiered degradation controller.
pub mod analysis;
/// Command-line interface definitions.
pub mod cli;
/// Configuration management.
pub mod config;
/// Error types and result aliases for the application.
pub mod error;
/// Langbase API client and types for pipe communication.
pub mod langbase;
/// System prompts for the analysis pipes.
pub mod prompts;
/// Remote analysis providers.
pub mod provider;
/// MCP server implementation and request handling.
pub mod server;
/// Analysis history persistence.
pub mod storage;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use server::{AppState, McpServer, SharedState};
