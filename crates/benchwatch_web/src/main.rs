//! `benchwatch-web` entry point.

use benchwatch_core::{init_logging, BenchService, LogEcho};
use benchwatch_web::{serve, AppState, ServerArgs};
use clap::Parser;
use log::error;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let args = ServerArgs::parse();
    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            error!("event=server_exit module=web status=error error={message}");
            eprintln!("benchwatch-web: {message}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: ServerArgs) -> Result<(), String> {
    init_logging(args.log_level(), &args.log_dir()?, LogEcho::Stderr)?;
    let addr = args.socket_addr()?;

    let service = BenchService::new(args.db.clone());
    service
        .initialize_schema()
        .map_err(|err| format!("cannot prepare `{}`: {err}", args.db.display()))?;

    serve(addr, AppState::new(service))
        .await
        .map_err(|err| format!("server failed: {err}"))
}
