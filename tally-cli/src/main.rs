use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tally_core::{CategoryMeta, LabelStore, TransactionInfo, UserId};
use tally_suggest::{Oracle, render_prompt, suggest};
use tracing_subscriber::EnvFilter;

mod auth;
mod config;
mod demo;
mod llm;
mod seed;
mod state;

use config::Provider;
use demo::Scenario;
use llm::HttpOracle;

#[derive(Parser, Debug)]
#[command(
    name = "tally",
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("TALLY_BUILD_SHA"), ")"),
    about = "Suggest spending categories for bank transactions"
)]
struct Cli {
    /// Debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Seed a built-in scenario and suggest a category for each sample transaction
    Demo {
        #[arg(value_enum)]
        scenario: Scenario,
    },

    /// Suggest a category for one transaction
    Suggest {
        #[command(flatten)]
        input: SuggestInput,

        /// Apply the suggestion to the seeded ledger and print the resulting label
        #[arg(long)]
        commit: bool,
    },

    /// Print the prompt `suggest` would send, without calling the oracle
    Prompt {
        #[command(flatten)]
        input: SuggestInput,
    },

    /// Manage ~/.tally/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// Store API keys in ~/.tally/auth.json
    Auth {
        #[command(subcommand)]
        command: AuthCommand,
    },
}

#[derive(Args, Debug)]
struct SuggestInput {
    /// Candidate categories CSV (id,name)
    #[arg(long)]
    categories: PathBuf,

    /// Prior labels CSV (tx_id,name,merchant,category_id)
    #[arg(long)]
    labels: Option<PathBuf>,

    /// Merchant text as it appears on the statement
    #[arg(long)]
    merchant: String,

    /// Transaction name/description (defaults to the merchant text)
    #[arg(long)]
    name: Option<String>,

    #[arg(long, default_value = "tx-new")]
    tx_id: String,

    #[arg(long, default_value = "cli")]
    user: String,
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a default config if none exists
    Init,
    /// Print the effective config
    Show,
}

#[derive(Subcommand, Debug)]
enum AuthCommand {
    /// Read an API key from stdin and store it
    PasteKey {
        #[arg(long, value_enum)]
        provider: Provider,
    },
}

/// Everything a single suggestion needs, loaded from the CLI inputs.
struct Prepared {
    user: UserId,
    store: LabelStore,
    categories: Vec<CategoryMeta>,
    target: TransactionInfo,
}

impl SuggestInput {
    fn prepare(&self) -> Result<Prepared> {
        let categories = seed::load_categories(&self.categories)?;
        let user = UserId::from(self.user.as_str());

        let mut store = LabelStore::new();
        if let Some(path) = &self.labels {
            let labels = seed::load_labels(path)?;
            let removed = seed::seed_store(&mut store, &user, &labels);
            tracing::info!(count = labels.len(), removed, path = %path.display(), "seeded ledger");
        }

        let name = self.name.clone().unwrap_or_else(|| self.merchant.clone());
        let target = TransactionInfo::new(self.tx_id.as_str(), name, self.merchant.as_str());
        Ok(Prepared {
            user,
            store,
            categories,
            target,
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Demo { scenario } => {
            let oracle = build_oracle()?;
            run_demo(scenario, &oracle).await?;
        }

        Command::Suggest { input, commit } => {
            let mut p = input.prepare()?;
            let oracle = build_oracle()?;
            let chosen = suggest(&p.store, &oracle, &p.user, &p.categories, &p.target)
                .await
                .with_context(|| format!("suggesting a category for {}", p.target.id()))?;

            println!("{} ({})", chosen.name, chosen.id);

            if commit {
                let label = p.store.apply_info(p.user.clone(), p.target.clone(), chosen.id);
                println!("{}", serde_json::to_string_pretty(&label)?);
            }
        }

        Command::Prompt { input } => {
            let p = input.prepare()?;
            let prompt = render_prompt(&p.store, &p.user, &p.categories, &p.target)?;
            println!("{prompt}");
        }

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => {
                let cfg = config::load_config()?;
                println!("# {}", config::config_path()?.display());
                print!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
            }
        },

        Command::Auth { command } => match command {
            AuthCommand::PasteKey { provider } => auth::paste_key(provider)?,
        },
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn build_oracle() -> Result<HttpOracle> {
    let cfg = config::load_config()?;
    let oracle = HttpOracle::from_config(&cfg.oracle)?;
    tracing::debug!(provider = oracle.provider().name(), "oracle ready");
    Ok(oracle)
}

async fn run_demo(scenario: Scenario, oracle: &dyn Oracle) -> Result<()> {
    let run = scenario.build();
    println!("=== {} ===", run.title);

    let mut failed = 0usize;
    for t in &run.targets {
        match suggest(&run.store, oracle, &run.user, &run.categories, t).await {
            Ok(chosen) => {
                println!("Tx {} | {} | {} -> {}", t.id(), t.name(), t.merchant(), chosen.name);
            }
            Err(e) => {
                failed += 1;
                println!("Tx {} | {} | {} -> error: {e}", t.id(), t.name(), t.merchant());
            }
        }
        println!("---");
    }

    if failed == run.targets.len() {
        bail!("every suggestion failed ({failed} of {})", run.targets.len());
    }
    Ok(())
}
