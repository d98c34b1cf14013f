mod cli;

use anyhow::Context;
use tf_module_update::processing::{Config, FileOutcome, Manager};
use tf_module_update::results::{Record, Results};
use tf_module_update::{conditions, strategy::Strict};

fn main() {
    use clap::Parser;
    let cli = cli::Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_env("TFMU_LOG"))
        .with_writer(std::io::stderr)
        .init();

    for new_path in cli.directory.iter() {
        match new_path.canonicalize() {
            Err(e) => {
                eprintln!(
                    "Failed to resolve path for -C/--directory {}\n{}",
                    new_path.display(),
                    e
                );
                std::process::exit(1);
            }
            Ok(cwd) => {
                if let Err(err) = std::env::set_current_dir(&cwd) {
                    eprintln!("Failed to set work directory to {}\n{}", cwd.display(), err,);
                    std::process::exit(1);
                }

                tracing::info!(directory=%cwd.display(), "Changed working directory");
            }
        }
    }

    match update(cli) {
        Ok(false) => {}
        Ok(true) => std::process::exit(1),
        Err(e) => {
            for error in e.chain() {
                eprintln!("{error}")
            }
            std::process::exit(1);
        }
    }
}

/// Runs the update, returns whether any error was recorded
pub fn update(cli: cli::Cli) -> anyhow::Result<bool> {
    let filter = cli.from.source().context("Invalid filter (--from-*)")?;
    let replacement = cli.to.source().context("Invalid replacement (--to-*)")?;
    let condition = conditions::from_source(&filter).context("Invalid filter (--from-*)")?;

    tracing::info!(%filter, %replacement, "updating module sources");

    let strategy = Strict::merging(replacement.clone()).with_condition(condition);
    let manager = Manager::new(Config { write: cli.write }, &strategy);

    let mut results = Results::new(cli.log_level);
    results.append(Record::debug(format!("searching for module sources: {filter}")));
    results.append(Record::debug(format!("updating source with: {replacement}")));
    let files = manager.process_paths(&cli.paths, &mut results);

    output(&cli.format, &results, files)?;
    Ok(results.has_errors())
}

#[derive(serde::Serialize)]
struct Summary {
    files: Vec<FileOutcome>,
    errors: Vec<String>,
}

fn output(
    format: &cli::OutputFormat,
    results: &Results,
    files: Vec<FileOutcome>,
) -> anyhow::Result<()> {
    let summary = || Summary {
        files,
        errors: results.errors().map(|error| format!("{error:#}")).collect(),
    };

    match format {
        cli::OutputFormat::Text => {
            let rendered = results.render();
            if !rendered.is_empty() {
                println!("{rendered}");
            }
        }
        cli::OutputFormat::Json => {
            serde_json::to_writer_pretty(std::io::stdout(), &summary())?;
            println!();
        }
        cli::OutputFormat::Yaml => serde_yaml::to_writer(std::io::stdout(), &summary())?,
    };

    Ok(())
}
