//! quizgrade CLI: grade trivia quiz answers with OpenAI or Gemini.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;
mod display;

#[derive(Parser)]
#[command(name = "quizgrade", version, about = "LLM grader for trivia quiz answers")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Grade a completed quiz
    Grade {
        /// JSON file with the answered questions
        #[arg(long)]
        answers: PathBuf,

        /// Grading service (openai, gemini); defaults to the settings
        #[arg(long)]
        service: Option<String>,

        /// Model id; defaults to the settings for the service
        #[arg(long)]
        model: Option<String>,

        /// Grade with local text similarity instead of a service
        #[arg(long)]
        offline: bool,

        /// Save the evaluation record as JSON (a bare verdict list with --offline)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,

        /// Settings file path
        #[arg(long)]
        settings: Option<PathBuf>,
    },

    /// Print the grading prompt for a quiz
    Prompt {
        /// JSON file with the answered questions
        #[arg(long)]
        answers: PathBuf,

        /// Service whose prompt template is used
        #[arg(long)]
        service: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,

        /// Settings file path
        #[arg(long)]
        settings: Option<PathBuf>,
    },

    /// Parse a saved grading reply against its quiz
    Parse {
        /// File with the raw grading reply
        #[arg(long)]
        response: PathBuf,

        /// JSON file with the answered questions
        #[arg(long)]
        answers: PathBuf,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Show or change grading settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,

        /// Config file path
        #[arg(long, global = true)]
        config: Option<PathBuf>,

        /// Settings file path
        #[arg(long, global = true)]
        settings: Option<PathBuf>,
    },

    /// Grade two fixed questions with the current service
    TestService {
        /// Service to test; defaults to the settings
        #[arg(long)]
        service: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,

        /// Settings file path
        #[arg(long)]
        settings: Option<PathBuf>,
    },

    /// List models of the configured services
    ListModels {
        /// Filter to a specific service
        #[arg(long)]
        service: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create a starter config and example answers file
    Init,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Print the current settings
    Show {
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Select the grading service
    Use {
        /// openai or gemini
        service: String,
    },
    /// Set the model for a service
    Model {
        service: String,
        model: String,
    },
    /// Replace the prompt template of a service
    Prompt {
        service: String,

        /// File holding the new template
        #[arg(long)]
        file: PathBuf,
    },
    /// Restore the default settings
    Reset,
    /// Check the settings for problems
    Validate,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("quizgrade=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Grade {
            answers,
            service,
            model,
            offline,
            output,
            format,
            config,
            settings,
        } => {
            commands::grade::execute(
                answers, service, model, offline, output, format, config, settings,
            )
            .await
        }
        Commands::Prompt {
            answers,
            service,
            config,
            settings,
        } => commands::prompt::execute(answers, service, config, settings),
        Commands::Parse {
            response,
            answers,
            format,
        } => commands::parse::execute(response, answers, format),
        Commands::Settings {
            action,
            config,
            settings,
        } => commands::settings::execute(action, config, settings),
        Commands::TestService {
            service,
            config,
            settings,
        } => commands::test_service::execute(service, config, settings).await,
        Commands::ListModels { service, config } => {
            commands::list_models::execute(service, config)
        }
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
