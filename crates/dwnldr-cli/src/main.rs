use dwnldr_core::logging;

mod cli;

use crate::cli::Cli;

#[tokio::main]
async fn main() {
    // Initialize logging as early as possible; stdout is reserved for progress rows.
    if logging::init_logging().is_err() {
        logging::init_logging_stderr();
    }

    // Parse CLI and dispatch.
    match Cli::run_from_args().await {
        Ok(all_succeeded) => {
            if !all_succeeded {
                std::process::exit(1);
            }
        }
        Err(err) => {
            eprintln!("dwnldr error: {:#}", err);
            std::process::exit(1);
        }
    }
}
