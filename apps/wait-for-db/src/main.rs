use clap::Parser;
use wait_for_db::cli::Cli;

fn main() {
    let cli = Cli::parse();
    wait_for_db::telemetry::init_tracing(cli.log_format);

    std::process::exit(wait_for_db::run(cli));
}
