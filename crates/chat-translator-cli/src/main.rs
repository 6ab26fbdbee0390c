//! Chat Translator CLI - Command line front end for the translation engine.

use anyhow::{Context, Result};
use clap::Parser;
use chat_translator_core::{
    get_language_name, Lang, RequesterId, StaticConfig, Style, TranslationEngine,
    TranslationRequest,
};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "chat-translate")]
#[command(author, version, about = "Translate text with provider fallback and LLM styling", long_about = None)]
struct Args {
    /// Text to translate
    #[arg(required = true)]
    text: String,

    /// Target language code
    #[arg(short = 't', long, default_value = "en")]
    target: String,

    /// Source language code (detected when omitted)
    #[arg(short = 's', long)]
    source: Option<String>,

    /// Translation style (informal, formal, business, travel, academic)
    #[arg(long, default_value = "informal")]
    style: String,

    /// Skip LLM style enhancement
    #[arg(long)]
    no_enhance: bool,

    /// Request grammar notes and a phonetic transcription
    #[arg(short = 'g', long)]
    grammar: bool,

    /// Interface language for labels
    #[arg(long, default_value = "en")]
    display_lang: String,

    /// DeepL API key
    #[arg(long, env = "DEEPL_API_KEY")]
    deepl_api_key: Option<String>,

    /// Yandex Cloud Translate API key
    #[arg(long, env = "YANDEX_API_KEY")]
    yandex_api_key: Option<String>,

    /// OpenAI API key (enhancement and LLM last resort)
    #[arg(long, env = "OPENAI_API_KEY")]
    openai_api_key: Option<String>,

    /// Config file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (before parsing args so env vars are available)
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Setup logging
    let log_level = match args.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    // Load or create config
    let mut config = if let Some(config_path) = &args.config {
        StaticConfig::from_file(config_path).context("Failed to load config file")?
    } else {
        StaticConfig::load()
    };

    // CLI arguments override the config file
    if args.deepl_api_key.is_some() {
        config.deepl_api_key = args.deepl_api_key.clone();
    }
    if args.yandex_api_key.is_some() {
        config.yandex_api_key = args.yandex_api_key.clone();
    }
    if args.openai_api_key.is_some() {
        config.openai_api_key = args.openai_api_key.clone();
    }

    let engine = TranslationEngine::new(config);

    let request = TranslationRequest {
        text: args.text,
        target_lang: Lang::new(&args.target),
        source_lang: args.source.map(Lang::new),
        style: Style::from_code(&args.style),
        enhance: !args.no_enhance,
        explain_grammar: args.grammar,
        requester: RequesterId::new("cli"),
    };

    let (final_text, metadata) = engine
        .translate(&request)
        .await
        .context("Translation failed")?;

    // CLI output is intentional
    #[allow(clippy::print_stdout)]
    {
        println!(
            "{} -> {}",
            get_language_name(metadata.source_lang.as_str(), &args.display_lang),
            get_language_name(metadata.target_lang.as_str(), &args.display_lang),
        );
        println!("{final_text}");

        if metadata.enhanced_translation != metadata.basic_translation {
            println!("\nLiteral: {}", metadata.basic_translation);
        }
        if !metadata.alternatives.is_empty() {
            println!("\nAlternatives:");
            for alternative in &metadata.alternatives {
                println!("  - {alternative}");
            }
        }
        if !metadata.explanation.is_empty() {
            println!("\nNotes: {}", metadata.explanation);
        }
        if !metadata.grammar.is_empty() {
            println!("\nGrammar: {}", metadata.grammar);
        }
        if !metadata.transcription.is_empty() {
            println!("\nTranscription: {}", metadata.transcription);
        }
    }

    Ok(())
}
