use clap::Parser;
use colored::Colorize;

use tracklink::cli::{self, Cli};
use tracklink::config::init_config;
use tracklink::system::init_logging;

fn main() {
    let cli = Cli::parse();

    let config = init_config(cli.config.as_deref());
    let guard = match init_logging(&config.logging) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("{}", e.format_colored());
            None
        }
    };

    let result = cli::run(cli);

    // 退出前刷新日志
    drop(guard);
    if let Err(e) = result {
        eprintln!("{} {}", "error:".bold().red(), e);
        std::process::exit(1);
    }
}
