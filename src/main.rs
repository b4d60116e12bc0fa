use std::process::ExitCode;

use sales_forecast::ForecastApp;

fn main() -> ExitCode {
    // Failures are reported to the user by the application itself.
    match ForecastApp::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(_) => ExitCode::FAILURE,
    }
}
