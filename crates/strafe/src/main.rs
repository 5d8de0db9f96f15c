use std::process::ExitCode;

use strafe::config::GameConfig;

fn main() -> ExitCode {
    env_logger::init();

    let config = match GameConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    match strafe::window::run(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("Exiting with error: {e}");
            ExitCode::FAILURE
        }
    }
}
