use clap::Parser;
use odherogrid::utils::error::ErrorSeverity;
use odherogrid::utils::{logger, validation::Validate};
use odherogrid::{CliConfig, GridEngine, LocalStorage, OpenDotaSource, RunSummary, UserConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    logger::init_cli_logger(cli.verbose);

    tracing::info!("Starting odhg");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    match run(&cli).await {
        Ok(summary) => {
            tracing::info!("✅ Hero grids updated successfully!");
            println!("✅ Wrote {} to {}", summary.grids.join(", "), summary.grid_file);
        }
        Err(e) => {
            tracing::error!(
                "❌ Hero grid update failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };

            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

async fn run(cli: &CliConfig) -> odherogrid::Result<RunSummary> {
    let config_path = cli.config_path()?;
    tracing::debug!("📁 Loading configuration from: {}", config_path.display());

    let mut user = UserConfig::load_or_create(&config_path)?;
    user.validate()?;

    let options = cli.resolve(&user)?;
    options.validate()?;

    if cli.save {
        cli.apply_to(&mut user);
        user.validate()?;
        user.save(&config_path)?;
        tracing::info!("💾 Saved defaults to {}", config_path.display());
    }

    tracing::info!(
        "🔧 Target: {:?}, brackets: {:?}, order: {:?}",
        options.target,
        options.brackets,
        options.sort
    );

    let source = OpenDotaSource::new(cli.api_endpoint(&user)?)?;
    let storage = LocalStorage::new(options.storage_root());
    let engine = GridEngine::new(source, storage);

    let mut summary = engine.run(&options).await?;
    summary.grid_file = options.grid_path.display().to_string();
    Ok(summary)
}
