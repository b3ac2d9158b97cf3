//! Highlight a file from the command line and print its style spans.

use anyhow::{Context, Result, bail};
use clap::Parser;
use ide_core::{EditorConfig, EditorCore, LanguageSupport};
use ide_core_lang::{language_for_extension, language_for_path};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "ide-highlight", about = "Highlight a file with ide-core", version)]
struct Cli {
    /// File to highlight
    path: PathBuf,

    /// Language to use (file extension such as `java` or `json`); guessed from the path otherwise
    #[arg(short, long)]
    language: Option<String>,

    /// Caret offset in chars (drives caret-word and bracket matching)
    #[arg(short, long, default_value = "0")]
    caret: usize,

    /// Output the spans as JSON
    #[arg(short, long)]
    json: bool,

    /// JSON file with editor settings
    #[arg(long, env = "IDE_HIGHLIGHT_CONFIG")]
    config: Option<PathBuf>,

    /// How long to wait for highlighting, in milliseconds
    #[arg(short = 't', long, default_value = "5000")]
    timeout_ms: u64,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ide_core=info,ide_highlight=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let text = std::fs::read_to_string(&cli.path)
        .with_context(|| format!("failed to read {}", cli.path.display()))?;
    let language: Arc<dyn LanguageSupport> = match &cli.language {
        Some(extension) => language_for_extension(extension)?,
        None => language_for_path(&cli.path)?,
    };
    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => EditorConfig::default(),
    };
    tracing::info!(
        path = %cli.path.display(),
        language = language.name(),
        "highlighting"
    );

    let mut editor = EditorCore::with_config(&text, language, config);
    editor
        .set_caret(cli.caret)
        .with_context(|| format!("caret {} is outside of the file", cli.caret))?;
    editor.highlight()?;
    editor.wait_for_highlight(Duration::from_millis(cli.timeout_ms))?;
    if !editor.scheduler().is_idle() {
        bail!("highlighting did not finish within {} ms", cli.timeout_ms);
    }

    if cli.json {
        print_json(&editor)?;
    } else {
        print_ranges(&editor);
    }
    Ok(())
}

fn load_config(path: &Path) -> Result<EditorConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("invalid config {}", path.display()))
}

fn spans_json(editor: &EditorCore) -> serde_json::Value {
    serde_json::json!({
        "language": editor.language().name(),
        "style_sheet": editor.language().style_sheet(),
        "length": editor.len_chars(),
        "runs": editor.styles(),
    })
}

fn print_json(editor: &EditorCore) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&spans_json(editor))?);
    Ok(())
}

/// One line per styled range: offsets, labels and the covered text.
fn format_ranges(editor: &EditorCore) -> Vec<String> {
    let chars: Vec<char> = editor.text().chars().collect();
    editor
        .styles()
        .ranges()
        .filter(|(_, labels)| !labels.is_empty())
        .map(|(range, labels)| {
            let labels: Vec<&str> = labels.iter().map(String::as_str).collect();
            let snippet: String = chars[range.clone()].iter().collect();
            format!(
                "{:>6}..{:<6} {:<24} {:?}",
                range.start,
                range.end,
                labels.join(","),
                snippet
            )
        })
        .collect()
}

fn print_ranges(editor: &EditorCore) {
    for line in format_ranges(editor) {
        println!("{line}");
    }
}
