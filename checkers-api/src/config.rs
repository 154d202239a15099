//! Command-line and environment configuration.

use std::net::SocketAddr;
use std::time::Duration;

use checkers_core::{CoordinatorConfig, OracleMovePolicy, Side};
use clap::{Parser, ValueEnum};

/// Colour played by the oracle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum AiSide {
    Red,
    Black,
}

impl From<AiSide> for Side {
    fn from(side: AiSide) -> Self {
        match side {
            AiSide::Red => Side::First,
            AiSide::Black => Side::Second,
        }
    }
}

#[derive(Debug, Clone, Parser)]
#[command(name = "checkers-api", about = "Checkers against a hosted-agent opponent")]
pub struct Config {
    /// Address to listen on
    #[arg(long, env = "CHECKERS_BIND", default_value = "0.0.0.0:8000")]
    pub bind: SocketAddr,

    /// Base URL of the hosted-agent API (expects /create-agent and /chat)
    #[arg(
        long,
        env = "CHECKERS_ORACLE_URL",
        default_value = "https://builder.empromptu.ai/api_tools"
    )]
    pub oracle_url: String,

    /// Bearer token for the hosted-agent API
    #[arg(long, env = "CHECKERS_ORACLE_TOKEN", hide_env_values = true)]
    pub oracle_token: Option<String>,

    /// Pause before each oracle request, in milliseconds
    #[arg(long, env = "CHECKERS_AI_DELAY_MS", default_value_t = 1000)]
    pub ai_delay_ms: u64,

    /// Side played by the oracle
    #[arg(long, env = "CHECKERS_AI_SIDE", value_enum, default_value_t = AiSide::Black)]
    pub ai_side: AiSide,

    /// Forfeit oracle moves that are not legal instead of applying them
    #[arg(long, env = "CHECKERS_STRICT_ORACLE")]
    pub strict_oracle: bool,
}

impl Config {
    pub fn coordinator(&self) -> CoordinatorConfig {
        CoordinatorConfig {
            automated: self.ai_side.into(),
            delay: Duration::from_millis(self.ai_delay_ms),
            oracle_moves: if self.strict_oracle {
                OracleMovePolicy::Strict
            } else {
                OracleMovePolicy::Lenient
            },
        }
    }
}
