//
//  graph-login
//  main.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use graph_login::api::GraphError;
use graph_login::auth::LoginError;
use graph_login::cli::{Cli, Commands};
use graph_login::exit_codes;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    init_logging();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Execute command
    let result = run(cli).await;

    // Handle result and exit
    match result {
        Ok(()) => std::process::exit(exit_codes::SUCCESS),
        Err(e) => {
            eprintln!("Error: {e:#}");
            let code = if is_auth_error(&e) {
                exit_codes::AUTH_ERROR
            } else {
                exit_codes::ERROR
            };
            std::process::exit(code);
        }
    }
}

/// Initialize logging based on environment
fn init_logging() {
    let filter = EnvFilter::try_from_env("GRAPH_DEBUG")
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// Main command dispatcher
async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Auth(cmd) => cmd.run(&cli.global).await,
        Commands::Api(cmd) => cmd.run(&cli.global).await,
        Commands::Post(cmd) => cmd.run(&cli.global).await,
        Commands::Comment(cmd) => cmd.run(&cli.global).await,
        Commands::Like(cmd) => cmd.run(&cli.global).await,
        Commands::Delete(cmd) => cmd.run(&cli.global).await,
        Commands::DeleteRequest(cmd) => cmd.run(&cli.global).await,
        Commands::Photo(cmd) => cmd.run(&cli.global).await,
        Commands::Fetch(cmd) => cmd.run(&cli.global).await,
        Commands::Config(cmd) => cmd.run(&cli.global).await,
        Commands::Version => {
            println!("graph version {}", graph_login::VERSION);
            Ok(())
        }
    }
}

/// Missing or rejected credentials, anywhere in the error chain.
fn is_auth_error(error: &anyhow::Error) -> bool {
    error.chain().any(|cause| {
        if let Some(graph) = cause.downcast_ref::<GraphError>() {
            return is_auth_graph_error(graph);
        }
        match cause.downcast_ref::<LoginError>() {
            Some(LoginError::Graph(graph)) => is_auth_graph_error(graph),
            _ => false,
        }
    })
}

fn is_auth_graph_error(error: &GraphError) -> bool {
    match error {
        GraphError::AuthRequired => true,
        // 190: invalid or expired access token
        GraphError::Api(api) => {
            api.status == Some(401) || api.kind == "OAuthException" || api.code == Some(190)
        }
        _ => false,
    }
}
