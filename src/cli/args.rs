use clap::Parser;

/// Provisions git working copies at a requested revision, reusing a local cache.
#[derive(Debug, Parser)]
#[clap(version)]
pub struct CliArgs {
    #[clap(subcommand)]
    pub cmd: Command,
    /// Location of the working copy cache. Defaults to $HOME/.kamino/cache
    #[clap(short, long)]
    pub cache_directory: Option<String>,
    /// Base url repositories are cloned from. Defaults to https://github.com
    #[clap(short, long)]
    pub remote: Option<String>,
}

#[derive(Debug, Parser)]
pub enum Command {
    /// Clones a repository at a revision and prints the working copy path
    Clone {
        /// Repository owner
        #[clap(short, long)]
        account: String,
        /// Repository name
        #[clap(long)]
        repo: String,
        /// Branch, tag or commit hash to check out
        #[clap(long = "ref")]
        revision: String,
        /// Number of commits to fetch. Fetches the full history if omitted
        #[clap(short, long)]
        depth: Option<String>,
        /// Token used to authenticate against the remote
        #[clap(short, long, env = "KAMINO_TOKEN", hide_env_values = true)]
        token: Option<String>,
        /// One of none, create_if_missing, require_existing, use_if_available
        #[clap(short = 'C', long, default_value = "none")]
        cache: String,
    },
}
