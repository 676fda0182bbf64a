mod cli;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use toml_doc::ConfigOverrides;

use crate::cli::{Cli, Commands};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "toml_doc=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let cli = Cli::parse();
    let cwd = std::env::current_dir()?;
    let config = toml_doc::Config::discover(&cwd, cli.config.as_deref())?;

    let ok = match cli.command {
        Commands::Extract {
            file,
            root,
            all,
            no_all,
            direct,
            recursive,
            format,
            strict,
            no_strict,
        } => {
            let settings = config.merge(ConfigOverrides {
                strict: cli::flag_pair(strict, no_strict),
                show_all: cli::flag_pair(all, no_all),
                recursive: cli::flag_pair(recursive, direct),
                format,
            });
            let options = cli::ExtractOptions {
                root: root.unwrap_or_default(),
                show_all: settings.show_all,
                recursive: settings.recursive,
                format: settings.format,
                strict: settings.strict,
            };
            cli::extract_file(&file, &options)?;
            true
        }
        Commands::Lint {
            paths,
            strict,
            no_strict,
            format,
        } => {
            let settings = config.merge(ConfigOverrides {
                strict: cli::flag_pair(strict, no_strict),
                format,
                ..Default::default()
            });
            let roots = if !paths.is_empty() {
                paths
            } else if !settings.files.is_empty() {
                settings.files.clone()
            } else {
                vec![cwd.clone()]
            };
            cli::lint(&roots, &settings.exclude, settings.strict, settings.format)?
        }
        Commands::Paths { file, format } => {
            cli::list_paths(&file, format.unwrap_or(config.format))?;
            true
        }
    };

    if !ok {
        std::process::exit(1);
    }

    Ok(())
}
