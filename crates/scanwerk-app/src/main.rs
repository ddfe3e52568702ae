// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scanwerk: eSCL scan service
//
// Entry point. Initialises logging and the eSCL backend, then serves JSON
// commands from stdin, one response line per command on stdout.

mod services;

use std::process::ExitCode;

use scanwerk_escl::EsclBackend;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use services::command::{Outcome, handle_line};
use services::config::load_config;
use services::orchestrator::ScanOrchestrator;
use services::response::error_response;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // stdout carries responses; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("Scanwerk starting");

    let backend = match load_config().and_then(EsclBackend::new) {
        Ok(backend) => backend,
        Err(e) => {
            tracing::error!(error = %e, "startup failed");
            println!("{}", error_response(format!("eSCL service error: {e}")));
            return ExitCode::FAILURE;
        }
    };
    let mut orchestrator = ScanOrchestrator::new(vec![Box::new(backend)]);

    match serve(&mut orchestrator).await {
        Ok(()) => {
            tracing::info!("Scanwerk stopped");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "command stream failed");
            ExitCode::FAILURE
        }
    }
}

/// Read commands until `exit` or end of input.
async fn serve(orchestrator: &mut ScanOrchestrator) -> std::io::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(line) = lines.next_line().await? {
        let Some(outcome) = handle_line(orchestrator, &line).await else {
            continue;
        };
        let mut text = outcome.response().to_string();
        text.push('\n');
        stdout.write_all(text.as_bytes()).await?;
        stdout.flush().await?;

        if matches!(outcome, Outcome::Stop(_)) {
            break;
        }
    }
    Ok(())
}
