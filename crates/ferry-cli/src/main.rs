use clap::Parser;

mod bootstrap;
mod cli;
mod logging;
mod migrate;
mod output;
mod progress;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("ferry error: {error:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    let config = bootstrap::load_config()?;
    let log_path = logging::init(&bootstrap::log_dir(&cli, &config), cli.verbose)?;
    println!("Logging to {}", log_path.display());
    tracing::info!(
        dry_run = cli.dry_run,
        verbose = cli.verbose,
        from_json = ?cli.from_json,
        with_passwords = ?cli.with_passwords,
        "starting migration run"
    );

    let report = migrate::run(&cli, &config).await?;
    println!();
    print!("{}", output::render(&report, cli.format, cli.verbose)?);
    tracing::info!("migration run finished");
    Ok(())
}
