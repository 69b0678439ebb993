//! CLI entry point for the token console.

pub mod commands;
pub mod terminal;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::token::TokenKind;

/// Token console CLI
#[derive(Parser, Debug)]
#[command(name = "token-console", version, about = "List and revoke OAuth tokens")]
pub struct Cli {
    /// Config file (defaults to ~/.token-console/config.toml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show access and refresh tokens
    List,
    /// Revoke one token
    Revoke(RevokeArgs),
}

/// Arguments for `token-console revoke`.
#[derive(Parser, Debug)]
pub struct RevokeArgs {
    /// Token kind (access, refresh)
    pub kind: TokenKind,

    /// Token id
    pub id: String,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}
