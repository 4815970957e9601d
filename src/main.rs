use std::{error::Error, path::PathBuf, process::ExitCode};

use clap::Parser;
use kamino::{
    cli::args::{CliArgs, Command},
    config::KaminoConfig,
    model::RequestOptions,
    Kamino,
};

fn run() -> Result<(), Box<dyn Error>> {
    let config = KaminoConfig::load()?;
    let cli_args: CliArgs = CliArgs::parse();

    let mut builder = Kamino::builder();
    let cache_directory = cli_args
        .cache_directory
        .map(PathBuf::from)
        .or(config.cache_dir);
    if let Some(cache_directory) = cache_directory {
        builder = builder.cache_directory(cache_directory);
    }
    if let Some(remote) = cli_args.remote.or(config.remote) {
        builder = builder.remote(remote);
    }
    let kamino = builder.try_build()?;

    match cli_args.cmd {
        Command::Clone {
            account,
            repo,
            revision,
            depth,
            token,
            cache,
        } => {
            let options = RequestOptions {
                account: Some(account),
                repo: Some(repo),
                revision: Some(revision),
                depth,
                token,
                cache: Some(cache),
            };
            let path = kamino.provision(options)?;
            println!("{}", path.display());
            Ok(())
        }
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    if let Err(e) = run() {
        log::error!("{}", e);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
