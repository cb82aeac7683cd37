//! Drone CLI binary

use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    match drone_cli::run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            drone_cli::output::print_error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}
