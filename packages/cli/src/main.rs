use std::io;

use clap::Parser;

mod cli;
mod logging;

use cli::Args;

fn main() {
    let args = Args::parse();
    logging::init(args.verbose);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if let Err(e) = cli::run(&args, &mut out) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
