mod app;

use std::process::ExitCode;

use tracing::error;

fn main() -> ExitCode {
    let wiring = match app::bootstrap::build_app() {
        Ok(wiring) => wiring,
        Err(message) => {
            error!(error = message.as_str(), "startup_failed");
            eprintln!("startup failed: {message}");
            return ExitCode::FAILURE;
        }
    };

    app::run(wiring);
    ExitCode::SUCCESS
}
