use std::process;

use log::{error, Level, LevelFilter};

use imagesniff::commands::{build_cli, CommandFactory, SniffCommandFactory};
use imagesniff::utils::logger::Logger;

fn main() {
    let matches = build_cli().get_matches();
    let verbose = matches.get_flag("verbose");

    match matches.get_one::<String>("log-file") {
        Some(log_file) => {
            let level = if verbose { Level::Debug } else { Level::Info };
            if let Err(e) = Logger::init_global_logger(log_file, level) {
                eprintln!("Error initializing logger: {}", e);
                process::exit(1);
            }
        }
        None => Logger::init_stderr_logger(if verbose { LevelFilter::Debug } else { LevelFilter::Warn }),
    }

    let factory = SniffCommandFactory::new();

    match factory.create_command(&matches) {
        Ok(command) => {
            if let Err(e) = command.execute() {
                error!("Command execution error: {}", e);
                eprintln!("Error: {}", e);
                process::exit(1);
            }
        }
        Err(e) => {
            error!("Failed to create command: {}", e);
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}
