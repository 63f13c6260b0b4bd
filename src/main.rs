use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use voice_search::{
    find_by_code, list_popular, run_test_capture, Config, Environment, PlatformProvider,
    ScriptedCapability, SearchField, VoiceSearch, VoiceSearchOptions,
};

const CONFIG_PATH: &str = "config/voice-search";
const DESKTOP_CHROME: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

#[derive(Parser)]
#[command(name = "voice-search")]
#[command(about = "Voice-driven search input: languages, diagnostics and simulated capture")]
struct Args {
    /// Config file (without extension)
    #[arg(short, long, default_value = CONFIG_PATH)]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List supported recognition languages
    Languages {
        /// Only show the popular entries (`languages.popular_count`)
        #[arg(short, long)]
        popular: bool,
    },

    /// Print the compatibility report and debug snapshot as JSON
    Diagnostics {
        /// User agent to inspect
        #[arg(short, long, default_value = DESKTOP_CHROME)]
        user_agent: String,

        /// Report as if the host had no speech recognition
        #[arg(long)]
        absent: bool,
    },

    /// Drive a scripted utterance through the voice search input
    Simulate {
        /// Text the simulated speaker says
        utterance: String,

        /// Recognition language
        #[arg(short, long)]
        language: Option<String>,

        /// Keep listening without speaking, to exercise the timeout
        #[arg(long)]
        silent: bool,

        /// Seconds before the test capture is stopped
        #[arg(short, long)]
        timeout: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let cfg = load_config(&args.config)?;

    info!("{} v{}", cfg.service.name, env!("CARGO_PKG_VERSION"));

    match args.command {
        Command::Languages { popular } => {
            let count = if popular {
                cfg.languages.popular_count
            } else {
                voice_search::LANGUAGES.len()
            };
            for lang in list_popular(count) {
                println!("{:<6} {} ({})", lang.code, lang.label(), lang.region);
            }
        }

        Command::Diagnostics { user_agent, absent } => {
            let environment = Environment::new(user_agent);
            let provider = if absent {
                PlatformProvider::absent(environment)
            } else {
                PlatformProvider::available(Arc::new(ScriptedCapability::new()), environment)
            };

            let voice = VoiceSearch::new(
                provider,
                VoiceSearchOptions::new(|_| {}).settings(cfg.voice.recognizer_settings()),
            );

            if let Some(notice) = voice.inline_notice() {
                warn!("{}", notice);
            }

            println!("{}", serde_json::to_string_pretty(&voice.get_browser_compatibility())?);
            println!("{}", voice.get_debug_info().to_json()?);
        }

        Command::Simulate {
            utterance,
            language,
            silent,
            timeout,
        } => {
            let language = language.unwrap_or_else(|| cfg.voice.default_language.clone());
            let limit = timeout
                .map(Duration::from_secs)
                .unwrap_or_else(|| cfg.voice.test_capture_timeout());

            let capability = ScriptedCapability::new();
            if !silent {
                capability.push_utterance(&utterance);
            }

            let field = Arc::new(Mutex::new(SearchField::default()));
            let sink = Arc::clone(&field);

            let mut voice = VoiceSearch::new(
                PlatformProvider::available(Arc::new(capability), Environment::new(DESKTOP_CHROME)),
                VoiceSearchOptions::new(move |text| {
                    if let Ok(mut field) = sink.lock() {
                        field.on_change(text);
                    }
                })
                .settings(cfg.voice.recognizer_settings())
                .language(language)
                .on_language_detected(|code| info!("Recognized in {}", find_by_code(code).name)),
            );

            let outcome = run_test_capture(&mut voice, limit).await;

            for partial in &outcome.partials {
                info!("… {}", partial);
            }

            if outcome.timed_out {
                warn!("No result within {:?}; capture was stopped", limit);
            }

            let value = field
                .lock()
                .map(|field| field.value().to_string())
                .unwrap_or_default();

            println!("search: {:?} ({})", value, voice.current_language().code);
        }
    }

    Ok(())
}

fn load_config(path: &str) -> Result<Config> {
    if Path::new(&format!("{}.toml", path)).exists() {
        Config::load(path)
    } else {
        warn!("No config found at {}.toml, using defaults", path);
        Ok(Config::default())
    }
}
