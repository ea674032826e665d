use clap::Parser;
use log::{debug, warn};

mod args;
mod dash;

fn init_logger(verbose: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.init();
}

fn main() {
    let args = args::Args::parse();
    init_logger(args.verbose);
    debug!("args: {:?}", args);

    let res = dash::run_dashboard(&args);

    if let Err(e) = res {
        warn!("Error occurred {:?}", e);
        eprintln!("An error occurred: {}", e);
        std::process::exit(1);
    }
}
