use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use dotenv::dotenv;
use option_tree_rs::options::condition::{self, ConditionExpr};
use option_tree_rs::options::loader::DocumentLoader;
use option_tree_rs::options::selections::LineItemOptionSelections;
use option_tree_rs::options::tree::{
    resolve, validate_document, validate_option_tree_v2, OptionTree,
};
use option_tree_rs::server::{self, ServerConfig};
use option_tree_rs::OptionTreeError;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check an option tree for structural problems
    Validate {
        /// Path to the tree document (.json, .yaml, .yml)
        #[arg(short, long)]
        file: String,
    },
    /// List the nodes visible for a set of selections
    Resolve {
        /// Path to the tree document
        #[arg(short, long)]
        tree: String,

        /// Path to the selections document
        #[arg(short, long)]
        selections: String,

        /// Store the result in the selections file's `resolved` cache
        #[arg(long)]
        write_back: bool,

        /// Refuse to resolve a tree that fails validation
        #[arg(long)]
        strict: bool,
    },
    /// Evaluate one condition against a selections document
    Eval {
        /// Condition as shorthand (`finish == 'gloss'`) or JSON
        #[arg(short, long)]
        condition: String,

        /// Path to the selections document
        #[arg(short, long)]
        selections: String,
    },
    /// Print the JSON Schema of a document type
    Schema {
        #[arg(short, long, value_enum, default_value_t = DocumentKind::Tree)]
        document: DocumentKind,
    },
    /// Serve the validator and resolver over HTTP
    Serve {
        /// Port to listen on (overrides OPTION_TREE_PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum DocumentKind {
    Tree,
    Selections,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init();

    let args = Args::parse();
    let loader = DocumentLoader::new();

    match args.command {
        Commands::Validate { file } => {
            let doc = loader
                .load_value(&file)
                .with_context(|| format!("Failed to read tree {}", file))?;
            let report = validate_document(&doc);
            println!("{}", serde_json::to_string_pretty(&report)?);
            if !report.is_ok() {
                std::process::exit(1);
            }
        }
        Commands::Resolve {
            tree,
            selections,
            write_back,
            strict,
        } => {
            let option_tree: OptionTree = loader
                .load_tree(&tree)
                .with_context(|| format!("Failed to read tree {}", tree))?;
            let mut line_item = loader
                .load_selections(&selections)
                .with_context(|| format!("Failed to read selections {}", selections))?;

            if strict {
                let report = validate_option_tree_v2(&option_tree);
                if !report.is_ok() {
                    return Err(OptionTreeError::InvalidTree(report.messages()).into());
                }
            }

            let resolution = resolve(&option_tree, &line_item);
            log::info!(
                "Resolved {} visible nodes from {} total",
                resolution.visible_node_ids.len(),
                option_tree.nodes.len()
            );
            println!("{}", serde_json::to_string_pretty(&resolution)?);

            if write_back {
                line_item.refresh_resolved(&option_tree);
                loader.save_selections(&selections, &line_item)?;
            }
        }
        Commands::Eval {
            condition: source,
            selections,
        } => {
            let line_item: LineItemOptionSelections = loader
                .load_selections(&selections)
                .with_context(|| format!("Failed to read selections {}", selections))?;
            let expr = parse_condition(&source)?;
            log::debug!("Evaluating {}", expr);
            println!("{}", condition::evaluate(&expr, &line_item.selected));
        }
        Commands::Schema { document } => {
            let schema = match document {
                DocumentKind::Tree => schemars::schema_for!(OptionTree),
                DocumentKind::Selections => schemars::schema_for!(LineItemOptionSelections),
            };
            println!("{}", serde_json::to_string_pretty(&schema)?);
        }
        Commands::Serve { port } => {
            let mut config = ServerConfig::from_env()?;
            if let Some(port) = port {
                config.port = port;
            }
            server::serve(config).await?;
        }
    }

    Ok(())
}

/// JSON if it looks like an object, shorthand otherwise
fn parse_condition(source: &str) -> anyhow::Result<ConditionExpr> {
    let trimmed = source.trim_start();
    if trimmed.starts_with('{') {
        serde_json::from_str(trimmed).context("Invalid JSON condition")
    } else {
        Ok(condition::parse(trimmed).map_err(OptionTreeError::from)?)
    }
}
