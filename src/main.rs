//! Carosello - Instagram carousel slide maker.

use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use carosello::cli::{Cli, Command, ExportArgs, GenerateArgs, RenderArgs, ServeArgs, StyleArgs};
use carosello::config::{self, Config};
use carosello::context::{self, GeneratorSource, RecordingSession, ServiceContext};
use carosello::deck::{Deck, RenderConfig, MAX_SLIDES};
use carosello::error::SlideError;
use carosello::export::{self, ExportOutcome, DEFAULT_ARCHIVE_NAME};
use carosello::gateway::{generate_phrases, GenerationRequest};
use carosello::model::resolve_model;
use carosello::render::FontBook;
use carosello::server::{self, AppState};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), SlideError> {
    let config_path = config::discover_config_path(cli.config.as_deref());
    let config = Config::load(&config_path).map_err(SlideError::Config)?;
    tracing::debug!(path = %config_path.display(), "config resolved");

    match cli.command {
        Command::Render(args) => render(&config, &args),
        Command::Generate(args) => generate(&config, &args).await,
        Command::Serve(args) => serve(config, &args).await,
    }
}

fn render(config: &Config, args: &RenderArgs) -> Result<(), SlideError> {
    // Validate everything before touching fonts or the filesystem.
    let render_config = args.style.apply(config.render_defaults()?)?;
    let phrases = args.resolve_phrases()?;
    if phrases.len() > MAX_SLIDES {
        tracing::warn!(
            given = phrases.len(),
            kept = MAX_SLIDES,
            "deck is full; extra phrases were dropped"
        );
    }
    let mut deck = Deck::from_phrases(&phrases);
    args.apply_overrides(&mut deck)?;
    export_and_report(config, &deck, &render_config, &args.style, &args.export)
}

async fn generate(config: &Config, args: &GenerateArgs) -> Result<(), SlideError> {
    let request = GenerationRequest::new(args.resolve_style()?, args.topic.clone())?;
    let render_config = if args.render {
        Some(args.slide_style.apply(config.render_defaults()?)?)
    } else {
        None
    };

    let model = resolve_model(args.model.as_deref().unwrap_or(&config.defaults.model));
    tracing::debug!(model = %model, "resolved model");

    let (ctx, recording_session) = ServiceContext::from_env(config)?;
    let result = generate_phrases(ctx.generator.as_ref(), &model, &request).await;
    finish_recording(recording_session);
    let phrases = result?;

    if args.json {
        println!("{}", serde_json::Value::from(phrases.as_slice().to_vec()));
    } else {
        for phrase in phrases.as_slice() {
            println!("{phrase}");
        }
    }

    if let Some(render_config) = render_config {
        let mut deck = Deck::new();
        let ticket = deck.begin_generation();
        deck.apply_generation(ticket, phrases.as_slice());
        export_and_report(config, &deck, &render_config, &args.slide_style, &args.export)?;
    }
    Ok(())
}

async fn serve(config: Config, args: &ServeArgs) -> Result<(), SlideError> {
    let bind = args.bind.clone().unwrap_or_else(|| config.server.bind.clone());
    let model = resolve_model(args.model.as_deref().unwrap_or(&config.defaults.model));

    let source = GeneratorSource::from_env(config)?;
    let recording_session = source.recording_session();
    let result = server::run_server(&bind, AppState { source, model }).await;
    finish_recording(recording_session);
    result
}

fn load_fonts(config: &Config, style: &StyleArgs) -> Result<FontBook, SlideError> {
    let regular = style.font.as_deref().or(config.fonts.regular.as_deref());
    let bold = style.bold_font.as_deref().or(config.fonts.bold.as_deref());
    let fonts = FontBook::load(regular, bold)?;
    if !fonts.has_outline_fonts() {
        tracing::debug!("no outline font configured, using the built-in bitmap face");
    }
    Ok(fonts)
}

fn export_and_report(
    config: &Config,
    deck: &Deck,
    render_config: &RenderConfig,
    style: &StyleArgs,
    args: &ExportArgs,
) -> Result<(), SlideError> {
    let fonts = load_fonts(config, style)?;

    if let Some(ref dir) = args.out_dir {
        let files = export::render_files(deck, render_config, &fonts)?;
        for path in export::write_files(&files, dir)? {
            eprintln!("Saved: {}", path.display());
        }
        return Ok(());
    }

    let share = if args.no_share { None } else { context::share_target(config) };
    let archive_path = args.zip.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_ARCHIVE_NAME));

    match export::export_deck(deck, render_config, &fonts, share.as_deref(), &archive_path)? {
        ExportOutcome::Shared(count) => eprintln!("Shared {count} slides"),
        ExportOutcome::Cancelled => eprintln!("Share cancelled."),
        ExportOutcome::Archived { path, count } => {
            eprintln!("Saved: {} ({count} slides)", path.display());
        }
    }
    Ok(())
}

fn finish_recording(session: Option<RecordingSession>) {
    if let Some(session) = session {
        match session.finish() {
            Ok(path) => eprintln!("Cassette saved: {}", path.display()),
            Err(e) => eprintln!("Warning: failed to save cassette: {e}"),
        }
    }
}
