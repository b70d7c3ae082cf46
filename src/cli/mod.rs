mod commands;

pub use commands::{
    build_summarizer, evaluate_command, run, summarize_command, Cli, Commands, SummarizeArgs,
    SummaryOptions,
};
