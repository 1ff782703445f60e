use clap::Parser;
use std::process::ExitCode;

mod briefing;
mod cli;
mod config;
mod logging;
mod process;
mod render;
mod sections;
mod util;

use briefing::BriefingRequest;
use config::{requested_sections, BriefingConfig, OutputFormat};

fn main() -> ExitCode {
    let args = cli::RootArgs::parse();
    logging::init();

    let format: OutputFormat = match args.format.parse() {
        Ok(format) => format,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };

    let request = BriefingRequest {
        sections: requested_sections(&args),
        config: BriefingConfig::resolve(&args),
    };
    tracing::debug!(sections = ?request.sections, "starting briefing");

    let result = match briefing::run(&request) {
        Ok(result) => result,
        Err(err) => {
            eprintln!("Briefing failed: {err:#}");
            return ExitCode::FAILURE;
        }
    };

    match render::render(format, &result) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("Briefing failed: {err:#}");
            ExitCode::FAILURE
        }
    }
}
