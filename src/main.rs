mod cmd;

use clap::Parser;
use cmd::{Cli, Commands};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let res = match cli.command {
        Commands::Show(a) => a.run(),
        Commands::Match(a) => a.run(),
        Commands::Delay(a) => a.run(),
        Commands::Scale(a) => a.run(),
        Commands::Npn(a) => a.run(),
    };
    if let Err(e) = res {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
