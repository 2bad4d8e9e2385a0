use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use tokio::sync::mpsc;

use careline::api::{AudioUpload, BackendClient, Message, Role};
use careline::chat::session;
use careline::config::{Config, FilePreferenceStore, LanguagePair, Preferences};
use careline::live::{Backoff, LiveEvent, LiveSignal, LiveSignalKind, spawn_live_channel};
use careline::ui::style as ui;

use crate::cli::commands::{Cli, Commands, PrefsCommands};

fn preferences(config: &Config) -> Preferences {
    Preferences::new(Arc::new(FilePreferenceStore::new(config.preferences_path())))
}

fn backend(config: &Config) -> Result<Arc<BackendClient>> {
    let client = BackendClient::new(&config.backend, preferences(config))
        .context("failed to build HTTP client")?;
    Ok(Arc::new(client))
}

/// Join the shared session and attach it to every later request.
async fn join(client: &BackendClient) -> Result<String> {
    let session = session::join_demo(client)
        .await
        .context("could not reach the translation backend")?;
    session::register(client, &session);
    Ok(session.id)
}

pub async fn dispatch(cli: Cli, config: Config) -> Result<()> {
    match cli.command {
        Commands::Start => run_start(&config).await,
        Commands::Chat { role, new } => run_chat(&config, role, new).await,
        Commands::Send { role, text } => run_send(&config, role, &text).await,
        Commands::History { search, role } => {
            run_history(&config, search.as_deref().unwrap_or_default(), role).await
        }
        Commands::Summary { output } => run_summary(&config, output.as_deref()).await,
        Commands::Watch => run_watch(&config).await,
        Commands::Upload { role, file } => run_upload(&config, role, &file).await,
        Commands::Prefs { prefs_command } => run_prefs(&preferences(&config), prefs_command),
    }
}

#[cfg(feature = "tui")]
async fn run_start(config: &Config) -> Result<()> {
    let prefs = preferences(config);
    let Some(choice) = careline::ui::tui::run_landing(&prefs.languages()).await? else {
        return Ok(());
    };
    prefs
        .set_languages(&choice.languages)
        .context("failed to store language choice")?;
    run_chat(config, choice.role, false).await
}

#[cfg(feature = "tui")]
async fn run_chat(config: &Config, role: Role, new: bool) -> Result<()> {
    use careline::chat::ChatController;

    let client = backend(config)?;
    let mut ctrl = ChatController::from_config(config, client, role);
    if new {
        ctrl = ctrl.with_fresh_session();
    }
    tracing::info!(%role, "opening chat screen");
    careline::ui::tui::run_chat(ctrl, &config.summaries_dir()).await
}

#[cfg(not(feature = "tui"))]
async fn run_start(_config: &Config) -> Result<()> {
    bail!("careline was built without the `tui` feature; use `send`, `history` or `watch`")
}

#[cfg(not(feature = "tui"))]
async fn run_chat(_config: &Config, _role: Role, _new: bool) -> Result<()> {
    bail!("careline was built without the `tui` feature; use `send`, `history` or `watch`")
}

async fn run_send(config: &Config, role: Role, text: &str) -> Result<()> {
    let text = text.trim();
    if text.is_empty() {
        bail!("message text is empty");
    }
    let client = backend(config)?;
    let session_id = join(&client).await?;
    client
        .send_chat(role, text)
        .await
        .context("Failed to send message")?;
    println!(
        "  {} sent as {} to session {}",
        ui::success("✓"),
        ui::role(role, role.label()),
        ui::value(&session_id)
    );
    Ok(())
}

async fn run_history(config: &Config, query: &str, viewer: Role) -> Result<()> {
    let client = backend(config)?;
    join(&client).await?;
    let messages = client
        .fetch(query)
        .await
        .context("failed to load messages")?;

    if messages.is_empty() {
        println!("  {}", ui::dim("No messages yet."));
        return Ok(());
    }
    for message in &messages {
        print_message(&client, message, viewer);
    }
    Ok(())
}

fn print_message(client: &BackendClient, message: &Message, viewer: Role) {
    let author = if message.role == viewer {
        "You"
    } else {
        message.role.label()
    };
    println!(
        "{} {}",
        ui::dim(message.local_time().format("%H:%M")),
        ui::role(message.role, author)
    );
    let text = message.display_text(viewer);
    if message.translated_text.is_none() && message.role != viewer {
        println!("  {}", ui::warn(text));
    } else {
        println!("  {text}");
    }
    if let Some(alternate) = message.alternate_text(viewer) {
        println!("  {}", ui::dim(alternate));
    }
    if let Some(audio) = &message.audio_url {
        println!("  ♪ {}", ui::url(client.resolve(audio)));
    }
}

async fn run_summary(config: &Config, output: Option<&Path>) -> Result<()> {
    let client = backend(config)?;
    join(&client).await?;
    let summary = client
        .summary()
        .await
        .context(careline::chat::SUMMARY_FAILED)?;

    println!("{}", ui::header("Visit summary"));
    println!();
    println!("{summary}");

    if let Some(path) = output {
        tokio::fs::write(path, format!("{}\n", summary.trim_end()))
            .await
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!();
        println!("  {} saved to {}", ui::success("✓"), ui::value(path.display()));
    }
    Ok(())
}

async fn run_watch(config: &Config) -> Result<()> {
    let client = backend(config)?;
    let session_id = join(&client).await?;
    println!(
        "{} {}  {}",
        ui::header("Watching session"),
        ui::value(&session_id),
        ui::dim("(Ctrl+C to stop)")
    );

    let (tx, mut rx) = mpsc::channel::<LiveSignal>(64);
    let live = spawn_live_channel(
        config.backend.ws_url.clone(),
        session_id,
        tx,
        Backoff::from_config(&config.reliability),
    );

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            signal = rx.recv() => {
                let Some(signal) = signal else { break };
                match signal.kind {
                    LiveSignalKind::Connected => println!("{}", ui::connection(true)),
                    LiveSignalKind::Disconnected { reason } => {
                        println!("{} {}", ui::connection(false), ui::dim(reason));
                    }
                    LiveSignalKind::Event(LiveEvent::NewMessage { message }) => {
                        print_message(&client, &message, Role::Doctor);
                    }
                    LiveSignalKind::Event(LiveEvent::ClearHistory { session_id }) => {
                        println!("{} {}", ui::warn("history cleared for"), ui::value(session_id));
                    }
                    LiveSignalKind::Event(LiveEvent::Unknown) => {}
                }
            }
        }
    }
    live.shutdown().await;
    Ok(())
}

fn audio_mime_type(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("webm") => "audio/webm",
        Some("wav") => "audio/wav",
        Some("ogg") => "audio/ogg",
        Some("mp3") => "audio/mpeg",
        Some("m4a") => "audio/mp4",
        _ => "application/octet-stream",
    }
}

async fn run_upload(config: &Config, role: Role, file: &Path) -> Result<()> {
    let bytes = tokio::fs::read(file)
        .await
        .with_context(|| format!("failed to read {}", file.display()))?;
    if bytes.is_empty() {
        bail!("{} is empty", file.display());
    }
    let upload = AudioUpload {
        bytes,
        file_name: file
            .file_name()
            .map_or_else(|| "recording".to_string(), |n| n.to_string_lossy().into_owned()),
        mime_type: audio_mime_type(file).to_string(),
    };

    let client = backend(config)?;
    join(&client).await?;
    client
        .upload_audio(role, upload)
        .await
        .context("failed to upload audio")?;
    println!(
        "  {} uploaded {}; the transcript arrives over the live channel",
        ui::success("✓"),
        ui::value(file.display())
    );
    Ok(())
}

fn run_prefs(prefs: &Preferences, command: PrefsCommands) -> Result<()> {
    match command {
        PrefsCommands::Show => {
            let LanguagePair { doctor, patient } = prefs.languages();
            let keys = prefs.api_keys();
            let state = |set: bool| if set { ui::success("set") } else { ui::dim("not set") };
            println!("{}", ui::header("Preferences"));
            println!(
                "  Doctor language:  {} ({})",
                ui::value(&doctor),
                careline::config::preferences::language_name(&doctor)
            );
            println!(
                "  Patient language: {} ({})",
                ui::value(&patient),
                careline::config::preferences::language_name(&patient)
            );
            println!("  Gemini key:       {}", state(keys.gemini.is_some()));
            println!("  OpenAI key:       {}", state(keys.openai.is_some()));
        }
        PrefsCommands::SetLanguages { doctor, patient } => {
            for tag in [&doctor, &patient] {
                if !careline::config::preferences::is_supported_language(tag) {
                    bail!("unsupported language '{tag}' (expected one of en, es, hi, fr, zh)");
                }
            }
            prefs.set_languages(&LanguagePair { doctor, patient })?;
            println!("  {} languages saved", ui::success("✓"));
        }
        PrefsCommands::SetKey { provider, key } => {
            let key = key.trim();
            if key.is_empty() {
                bail!("key is empty; use `prefs clear-key {provider}` to remove it");
            }
            prefs.set_api_key(provider, key)?;
            println!("  {} {provider} key saved", ui::success("✓"));
        }
        PrefsCommands::ClearKey { provider } => {
            prefs.clear_api_key(provider)?;
            println!("  {} {provider} key removed", ui::success("✓"));
        }
    }
    Ok(())
}
