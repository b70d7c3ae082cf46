use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::domain::{PipelineConfig, SummaryResult};
use crate::eval::{samples, Evaluator, RougeScorer, RougeScores};
use crate::infra::config::UserConfig;
use crate::infra::{logging, ConfigManager};
use crate::llm::{HubLoader, ModelCache, Summarizer};
use crate::prompts::*;
use crate::web::{self, AppState};

#[derive(Parser)]
#[command(name = "briefly")]
#[command(about = "Summarize long text with pretrained transformer models", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Config file (defaults to ./.briefly.yml, then the user config dir)
    #[arg(long, global = true, env = "BRIEFLY_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Summarize text given inline or as a path to a .txt file
    Summarize(SummarizeArgs),

    /// Serve the web UI
    Serve {
        #[arg(long)]
        host: Option<String>,

        #[arg(long)]
        port: Option<u16>,
    },

    /// Score the summarizer with ROUGE on the built-in samples
    Evaluate {
        #[command(flatten)]
        options: SummaryOptions,

        /// How many built-in samples to evaluate
        #[arg(long, default_value = "3")]
        limit: usize,
    },

    /// List available models
    Models,

    /// Write a default .briefly.yml in the current directory
    Init,

    /// Check configuration and credentials
    Health,
}

#[derive(clap::Args, Debug, Clone, Default)]
pub struct SummarizeArgs {
    /// Text to summarize, or a single path to a .txt file
    pub text: Vec<String>,

    /// Read the input from this file
    #[arg(long, conflicts_with = "text")]
    pub file: Option<PathBuf>,

    #[command(flatten)]
    pub options: SummaryOptions,

    /// Also write the summary to this file
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Give up after this many seconds
    #[arg(long)]
    pub timeout: Option<u64>,
}

/// Per-request overrides of the configured defaults.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct SummaryOptions {
    /// Model identifier (see `briefly models`)
    #[arg(long)]
    pub model: Option<String>,

    /// Max summary length (tokens)
    #[arg(long = "max")]
    pub max_length: Option<usize>,

    /// Min summary length (tokens)
    #[arg(long = "min")]
    pub min_length: Option<usize>,

    /// Enable sampling (creative mode)
    #[arg(long = "sample", overrides_with = "no_sample")]
    pub sampling: bool,

    /// Decode greedily even if the config enables sampling
    #[arg(long = "no-sample", overrides_with = "sampling")]
    pub no_sample: bool,
}

impl SummaryOptions {
    fn to_config(&self, text: String, user: &UserConfig) -> PipelineConfig {
        let defaults = &user.defaults;
        PipelineConfig::new(
            text,
            self.model.clone().unwrap_or_else(|| defaults.model.clone()),
        )
        .with_lengths(
            self.min_length.unwrap_or(defaults.min_length),
            self.max_length.unwrap_or(defaults.max_length),
        )
        .with_sampling(self.sampling_override().unwrap_or(defaults.sampling))
    }

    fn sampling_override(&self) -> Option<bool> {
        match (self.sampling, self.no_sample) {
            (_, true) => Some(false),
            (true, false) => Some(true),
            (false, false) => None,
        }
    }
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.command {
        Commands::Serve { .. } => "info",
        _ => "warn",
    };
    logging::init_tracing(level)?;

    let manager = ConfigManager::load(cli.config.as_deref())?;
    let user = manager.get();
    let summarizer = build_summarizer(&user);

    match cli.command {
        Commands::Summarize(args) => summarize_command(&summarizer, &user, args).await.map(|_| ()),
        Commands::Serve { host, port } => serve_command(summarizer, user, host, port).await,
        Commands::Evaluate { options, limit } => {
            evaluate_command(&summarizer, &user, options, limit).await.map(|_| ())
        }
        Commands::Models => models_command(&summarizer, &user),
        Commands::Init => init_command(),
        Commands::Health => health_command(&manager, &user),
    }
}

/// One summarizer (and so one model cache) per process, shared by whichever adapter runs.
pub fn build_summarizer(config: &UserConfig) -> Summarizer {
    let registry = Arc::new(config.registry());
    let loader = Arc::new(HubLoader::new(&config.inference));
    Summarizer::new(Arc::new(ModelCache::new(registry, loader)))
}

pub async fn summarize_command(
    summarizer: &Summarizer,
    user: &UserConfig,
    args: SummarizeArgs,
) -> Result<SummaryResult> {
    let SummarizeArgs {
        text,
        file,
        options,
        out,
        timeout,
    } = args;

    let input = match resolve_input(&text, file)? {
        Input::File(path) => {
            println!("{} {}", MSG_READING_FILE, path.display());
            read_text_file(&path)?
        }
        Input::Inline(text) => text,
    };

    let config = options.to_config(input, user);

    let result = match timeout {
        Some(secs) => tokio::time::timeout(Duration::from_secs(secs), summarizer.summarize(&config))
            .await
            .map_err(|_| anyhow::anyhow!("Summarization timed out after {secs}s"))??,
        None => summarizer.summarize(&config).await?,
    };

    println!("{}", MSG_STATS_HEADER.bold());
    println!("{}", format_stats(&result));

    if let Some(path) = out {
        write_summary(&path, &result)?;
        println!("\n{} {}", MSG_SUMMARY_SAVED.green(), path.display());
    }

    println!("\n{}", MSG_SUMMARY_HEADER.bold());
    println!("{}", result.summary_text);

    Ok(result)
}

#[derive(Debug, PartialEq)]
enum Input {
    File(PathBuf),
    Inline(String),
}

/// A single argument naming an existing `.txt` file is read from disk; anything else is the text.
fn resolve_input(args: &[String], file: Option<PathBuf>) -> Result<Input> {
    if let Some(path) = file {
        return Ok(Input::File(path));
    }

    if let [single] = args {
        let path = Path::new(single);
        if single.to_lowercase().ends_with(".txt") && path.is_file() {
            return Ok(Input::File(path.to_path_buf()));
        }
    }

    if args.is_empty() {
        anyhow::bail!("{}\n{}", MSG_NO_INPUT, MSG_USAGE_EXAMPLES);
    }

    Ok(Input::Inline(args.join(" ")))
}

fn read_text_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Error reading file {}", path.display()))
}

fn write_summary(path: &Path, result: &SummaryResult) -> Result<()> {
    std::fs::write(path, &result.summary_text)
        .with_context(|| format!("Error writing to file {}", path.display()))
}

async fn serve_command(
    summarizer: Summarizer,
    user: UserConfig,
    host: Option<String>,
    port: Option<u16>,
) -> Result<()> {
    let host = host.unwrap_or_else(|| user.server.host.clone());
    let port = port.unwrap_or(user.server.port);

    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .with_context(|| format!("Invalid listen address {host}:{port}"))?;

    let state = Arc::new(AppState {
        summarizer,
        request_timeout: match user.server.request_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        },
        defaults: user.defaults,
        sliders: user.server.sliders,
    });

    println!("{} http://{}", MSG_SERVING.bold(), addr);
    web::serve(state, addr).await
}

pub async fn evaluate_command(
    summarizer: &Summarizer,
    user: &UserConfig,
    options: SummaryOptions,
    limit: usize,
) -> Result<RougeScores> {
    let scorer = RougeScorer;

    let settings = options.to_config(String::new(), user);
    let descriptor = summarizer.cache().registry().resolve(&settings.model_identifier)?;
    println!(
        "\nEvaluating ROUGE for model={} ({}) max={} min={} do_sample={}\n",
        descriptor.identifier,
        descriptor.canonical_name,
        settings.max_length,
        settings.min_length,
        settings.sampling_enabled
    );

    let mut scores = Vec::new();
    for sample in samples::take(limit) {
        let config = options.to_config(sample.text.to_string(), user);
        let result = summarizer
            .summarize(&config)
            .await
            .with_context(|| format!("Failed to summarize {}", sample.id))?;

        println!("--- {} ---", sample.id.bold());
        println!("PRED: {}", result.summary_text);
        println!("REF:  {}\n", sample.reference);

        scores.push(scorer.score(&result.summary_text, sample.reference));
    }

    let mean = RougeScores::mean_fmeasure(&scores);
    println!("{}", MSG_ROUGE_HEADER.bold());
    println!("ROUGE-1   : {:.4}", mean.rouge1.fmeasure);
    println!("ROUGE-2   : {:.4}", mean.rouge2.fmeasure);
    println!("ROUGE-L   : {:.4}", mean.rouge_l.fmeasure);
    println!("ROUGE-Lsum: {:.4}", mean.rouge_lsum.fmeasure);
    println!();

    Ok(mean)
}

fn models_command(summarizer: &Summarizer, user: &UserConfig) -> Result<()> {
    let registry = summarizer.cache().registry();
    let default_model = user.defaults.model.trim().to_lowercase();

    for model in registry.models() {
        let marker = if model.identifier == default_model { "*" } else { " " };
        let prefix = if model.requires_task_prefix {
            " [task prefix]".yellow().to_string()
        } else {
            String::new()
        };
        println!(
            "{} {:<12} {}{}",
            marker,
            model.identifier.bold(),
            model.canonical_name,
            prefix
        );
        if !model.description.is_empty() {
            println!("  {:<12} {}", "", model.description.dimmed());
        }
    }

    Ok(())
}

fn init_command() -> Result<()> {
    println!("{}", MSG_INITIALIZING.bold());

    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    match ConfigManager::create_default(&cwd)? {
        Some(path) => println!("{} {}", MSG_CONFIG_CREATED, path.display()),
        None => println!("{}", MSG_CONFIG_EXISTS),
    }

    Ok(())
}

fn health_command(manager: &ConfigManager, user: &UserConfig) -> Result<()> {
    println!("{}", MSG_HEALTH_CHECK.bold());

    match manager.source() {
        Some(path) => println!("✓ Configuration loaded from {}", path.display()),
        None => println!("{}", MSG_CONFIG_DEFAULTS),
    }

    println!("✓ Inference endpoint: {}", user.inference.inference_url);

    if HubLoader::new(&user.inference).has_token() {
        println!("{}", MSG_TOKEN_OK);
    } else {
        println!("{} {}", "⚠️".yellow(), MSG_TOKEN_MISSING);
        println!("{}", MSG_TOKEN_INSTRUCTION);
    }

    let registry = user.registry();
    println!("{}", MSG_MODELS_HEADER);
    for model in registry.models() {
        println!("  ✓ {} → {}", model.identifier, model.canonical_name);
    }

    match registry.resolve(&user.defaults.model) {
        Ok(_) => println!("\n{}", "✅ Ready to summarize!".green().bold()),
        Err(e) => println!("\n{} Default model problem: {}", "✗".red(), e),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn single_txt_path_is_read_as_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("article.TXT");
        std::fs::write(&path, "body").unwrap();

        let input = resolve_input(&args(&[path.to_str().unwrap()]), None).unwrap();
        assert_eq!(input, Input::File(path));
    }

    #[test]
    fn missing_txt_path_is_treated_as_text() {
        let input = resolve_input(&args(&["notes.txt"]), None).unwrap();
        assert_eq!(input, Input::Inline("notes.txt".into()));
    }

    #[test]
    fn multiple_arguments_are_joined() {
        let input = resolve_input(&args(&["The", "quick", "fox"]), None).unwrap();
        assert_eq!(input, Input::Inline("The quick fox".into()));
    }

    #[test]
    fn no_input_is_an_error() {
        assert!(resolve_input(&[], None).is_err());
    }

    #[test]
    fn options_override_configured_defaults() {
        let user = UserConfig::default();
        let options = SummaryOptions {
            model: Some("t5".into()),
            max_length: Some(100),
            min_length: None,
            sampling: true,
            no_sample: false,
        };
        let config = options.to_config("text".into(), &user);
        assert_eq!(
            config,
            PipelineConfig::new("text", "t5")
                .with_lengths(20, 100)
                .with_sampling(true)
        );
    }

    #[test]
    fn no_sample_overrides_configured_sampling() {
        let mut user = UserConfig::default();
        user.defaults.sampling = true;

        let cli = Cli::try_parse_from(["briefly", "summarize", "--no-sample", "some", "text"]).unwrap();
        let Commands::Summarize(args) = cli.command else {
            panic!("expected summarize");
        };
        assert!(!args.options.to_config("text".into(), &user).sampling_enabled);

        let unset = SummaryOptions::default();
        assert!(unset.to_config("text".into(), &user).sampling_enabled);
    }

    #[test]
    fn last_sampling_flag_wins() {
        let cli = Cli::try_parse_from(["briefly", "summarize", "--no-sample", "--sample", "x"]).unwrap();
        let Commands::Summarize(args) = cli.command else {
            panic!("expected summarize");
        };
        assert!(args.options.to_config("x".into(), &UserConfig::default()).sampling_enabled);
    }

    #[test]
    fn cli_parses_summarize_flags() {
        let cli = Cli::try_parse_from([
            "briefly", "summarize", "--model", "distilbart", "--max", "60", "--min", "20", "--out",
            "out.txt", "some", "text",
        ])
        .unwrap();

        match cli.command {
            Commands::Summarize(parsed) => {
                assert_eq!(parsed.text, args(&["some", "text"]));
                assert_eq!(parsed.options.model.as_deref(), Some("distilbart"));
                assert_eq!(parsed.options.max_length, Some(60));
                assert_eq!(parsed.options.min_length, Some(20));
                assert_eq!(parsed.out, Some(PathBuf::from("out.txt")));
            }
            _ => panic!("expected summarize"),
        }
    }

    #[test]
    fn write_summary_writes_text_verbatim() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("summary.txt");
        let result = SummaryResult::from_texts("a b c d", "  Short one.\n");

        write_summary(&path, &result).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "  Short one.\n");
    }
}
