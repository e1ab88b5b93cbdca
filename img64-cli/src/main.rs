// ABOUTME: Main entry point for the img64 command-line converter
// ABOUTME: Parses arguments, sets up logging and reports errors on exit

use clap::Parser;
use img64_cli::app;
use img64_cli::cli::Cli;

fn init_logging(verbose: bool) {
    let env = env_logger::Env::default().default_filter_or("warn");
    let mut builder = env_logger::Builder::from_env(env);
    if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = app::run(&cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
