use std::io::Write;
use std::path::Path;
use std::process;

use anyhow::anyhow;
use clap::Parser;

use discussions_fetch::{
    resolve_token, write_pretty_json, DiscussionFetcherBuilder, GitHubConfig, Repository,
};

/// Fetch a repository's answered discussions and print them as JSON.
#[derive(Parser, Debug)]
#[command(name = "discussions-fetch", version)]
#[command(about = "Prints the answered discussions of a GitHub repository as a JSON array")]
struct Args {
    /// GitHub API token. The GITHUB_TOKEN environment variable overrides it.
    #[arg(short, long)]
    token: Option<String>,

    /// Repository in owner/name form.
    #[arg(short, long)]
    repo: String,
}

#[tokio::main]
async fn main() {
    env_logger::init();

    let args = Args::parse();

    if let Err(err) = run(args).await {
        eprintln!("{err}");
        process::exit(1);
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let token_env_var = GitHubConfig::default().token_env_var;
    let token = resolve_token(&token_env_var, args.token).ok_or_else(|| {
        anyhow!("No GitHub token: pass -t/--token or set {token_env_var}")
    })?;

    let repo = Repository::from_full_name(&args.repo)?;

    let fetcher = DiscussionFetcherBuilder::new()
        .token(token)
        .user_agent(user_agent())
        .build()?;

    let answered = fetcher.fetch_answered(&repo).await?;

    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    write_pretty_json(&mut handle, &answered)?;
    writeln!(handle)?;

    Ok(())
}

/// User agent derived from the invoking program's own name, computed once
/// here and passed into the fetcher explicitly.
fn user_agent() -> String {
    std::env::args()
        .next()
        .and_then(|arg0| {
            Path::new(&arg0)
                .file_name()
                .and_then(|name| name.to_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| GitHubConfig::default().user_agent)
}
