use clap::Parser;
use qml_hotreload::Settings;
use qml_hotreload::cli::{Cli, commands};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    };
    let mut config = match loaded {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };
    cli.apply(&mut config);

    qml_hotreload::logging::init_with_config(&config.logging);

    if cli.print_config {
        commands::config::run_print_config(&config);
        return;
    }

    if cli.reload {
        commands::reload::run(&config).await;
        return;
    }

    commands::watch::run(config).await;
}
