use clap::Parser;
use vacancy_etl::config::labels::describe_params;
use vacancy_etl::config::{CliConfig, Command};
use vacancy_etl::utils::logger;
use vacancy_etl::{
    DeleteOutcome, FilterParams, FilterPipeline, HhFetcher, JsonStore, VacancyEngine,
    VacancyError, VacancyStore,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    if cli.log_json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }
    tracing::debug!("CLI config: {:?}", cli);

    if let Err(e) = run(cli).await {
        tracing::error!("❌ {} (severity: {:?})", e, e.severity());
        eprintln!("❌ {}", e);
        std::process::exit(e.exit_code());
    }

    Ok(())
}

async fn run(cli: CliConfig) -> Result<(), VacancyError> {
    let config = cli.resolve()?;
    let store = JsonStore::new(&config.store.path);

    match cli.command {
        Command::Search { keyword, filters } => {
            let (defaults, mut diagnostics) = config.default_filters();
            let params = FilterParams::from(filters).or(defaults);
            for line in describe_params(&params) {
                tracing::info!("Filter: {}", line);
            }

            let engine = VacancyEngine::new(HhFetcher::new(config.source.clone())?, store);
            let summary = engine.run(&keyword, &FilterPipeline::new(params)).await?;
            diagnostics.extend(summary.diagnostics.iter().cloned());

            for vacancy in &summary.selected {
                println!("{}\n", vacancy);
            }
            for diagnostic in &diagnostics {
                eprintln!("⚠️ Ignored filter {}", diagnostic);
            }
            println!(
                "Found {} vacancies for \"{}\" ({} skipped as invalid), selected {}, saved {} new to {}",
                summary.normalized,
                keyword,
                summary.skipped,
                summary.selected.len(),
                summary.added,
                summary.store_path.display()
            );
        }
        Command::List { .. } => {
            let records = store.get(&cli.command.store_criteria())?;
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
        Command::Delete { .. } => {
            let id = cli.command.record_id();
            match store.delete(id.as_ref())? {
                DeleteOutcome::Removed(count) => println!("Removed {} vacancies", count),
                DeleteOutcome::NotFound => println!(
                    "Vacancy with id {} not found",
                    id.map(|id| id.to_string()).unwrap_or_default()
                ),
                DeleteOutcome::Cleared => println!("Removed all vacancies"),
                DeleteOutcome::NoStore => println!("Nothing to delete"),
            }
        }
        Command::Path => println!("{}", store.path().display()),
    }

    Ok(())
}
