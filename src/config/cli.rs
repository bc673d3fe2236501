use crate::config::toml_config::AppConfig;
use crate::core::filter::FilterParams;
use crate::domain::model::{RecordId, StoreCriteria};
use crate::utils::error::Result;
use crate::utils::validation::Validate;
use clap::{Args, Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "vacancy-etl")]
#[command(about = "Search hh.ru vacancies, filter them and keep them in a JSON store")]
pub struct CliConfig {
    #[arg(long, global = true, help = "TOML configuration file")]
    pub config: Option<String>,

    #[arg(long, global = true, help = "Store file, overrides [store] path")]
    pub store: Option<String>,

    #[arg(long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit logs as JSON")]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Fetch vacancies for a keyword, filter them and save the result
    Search {
        keyword: String,
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Print stored vacancies matching the criteria
    List {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        salary_from: Option<u64>,
        #[arg(long)]
        salary_to: Option<u64>,
    },
    /// Delete one stored vacancy by id, or all of them
    Delete {
        #[arg(long)]
        id: Option<String>,
    },
    /// Print the store location
    Path,
}

#[derive(Debug, Clone, Default, Args)]
pub struct FilterArgs {
    #[arg(long, help = "Keep vacancies whose name contains this text")]
    pub name: Option<String>,

    #[arg(long, allow_hyphen_values = true)]
    pub salary_from: Option<i64>,

    #[arg(long, allow_hyphen_values = true)]
    pub salary_to: Option<i64>,

    #[arg(long)]
    pub sorted_salary_from: bool,

    #[arg(long)]
    pub sorted_salary_to: bool,

    #[arg(long)]
    pub sorted_avg_salary_asc: bool,

    #[arg(long)]
    pub sorted_avg_salary_desc: bool,

    #[arg(long, allow_hyphen_values = true)]
    pub top_n: Option<i64>,
}

impl From<FilterArgs> for FilterParams {
    fn from(args: FilterArgs) -> Self {
        FilterParams {
            name: args.name,
            salary_from: args.salary_from,
            salary_to: args.salary_to,
            sorted_salary_from: args.sorted_salary_from,
            sorted_salary_to: args.sorted_salary_to,
            sorted_avg_salary_asc: args.sorted_avg_salary_asc,
            sorted_avg_salary_desc: args.sorted_avg_salary_desc,
            top_n: args.top_n,
        }
    }
}

impl CliConfig {
    /// Loads the TOML file (if any), applies command-line overrides and
    /// validates the result.
    pub fn resolve(&self) -> Result<AppConfig> {
        let mut config = match &self.config {
            Some(path) => AppConfig::from_file(path)?,
            None => AppConfig::default(),
        };
        if let Some(store) = &self.store {
            config.store.path = store.clone();
        }
        config.validate()?;
        Ok(config)
    }
}

impl Command {
    pub fn store_criteria(&self) -> StoreCriteria {
        match self {
            Command::List {
                name,
                salary_from,
                salary_to,
            } => StoreCriteria {
                name: name.clone(),
                salary_from: *salary_from,
                salary_to: *salary_to,
            },
            _ => StoreCriteria::default(),
        }
    }

    pub fn record_id(&self) -> Option<RecordId> {
        match self {
            Command::Delete { id: Some(id) } => Some(RecordId::parse(id)),
            _ => None,
        }
    }
}
