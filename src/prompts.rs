//! User-facing strings for the CLI and the web UI.

use crate::domain::SummaryResult;

// Summarize
pub const MSG_READING_FILE: &str = "Reading text from file:";
pub const MSG_STATS_HEADER: &str = "=== STATS ===";
pub const MSG_SUMMARY_HEADER: &str = "=== SUMMARY ===";
pub const MSG_SUMMARY_SAVED: &str = "Summary saved to:";
pub const MSG_NO_INPUT: &str = "Please enter some text or pass a path to a .txt file.";
pub const MSG_USAGE_EXAMPLES: &str = "Usage:\n  briefly summarize \"your long text here\"\n  briefly summarize path/to/file.txt";

// Init / health
pub const MSG_INITIALIZING: &str = "🔧 Initializing Briefly...";
pub const MSG_CONFIG_CREATED: &str = "✓ Configuration created at";
pub const MSG_CONFIG_EXISTS: &str = "✓ Configuration already present";
pub const MSG_HEALTH_CHECK: &str = "🏥 Checking Briefly health...";
pub const MSG_CONFIG_DEFAULTS: &str = "✓ No config file found, using built-in defaults";
pub const MSG_TOKEN_OK: &str = "✓ Inference token configured";
pub const MSG_TOKEN_MISSING: &str = "No inference token set (anonymous requests are heavily rate limited)";
pub const MSG_TOKEN_INSTRUCTION: &str = "Set this environment variable:\n  export BRIEFLY_HF_TOKEN=your-token";
pub const MSG_MODELS_HEADER: &str = "\nModels:";

// Evaluate
pub const MSG_ROUGE_HEADER: &str = "ROUGE Results:";

// Serve
pub const MSG_SERVING: &str = "🚀 Briefly web UI running at";

/// Stats block shared by the CLI output and the web stats panel.
pub fn format_stats(result: &SummaryResult) -> String {
    let reduction = result
        .compression_percent()
        .map(|p| format!("{p:.1}%"))
        .unwrap_or_else(|| "n/a".to_string());

    format!(
        "Original length: {} words\nSummary length:  {} words\nReduction:       {}",
        result.input_word_count, result.output_word_count, reduction
    )
}
