use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use colored::{ColoredString, Colorize};
use console::Emoji;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use searchcast::podcast::DEFAULT_WORD_COUNT;
use searchcast::view::{NotificationKind, PlayerState, resolve_audio_source};
use searchcast::{
    DEFAULT_API_URL, DroppedFile, FileState, NoopReporter, Podcast, PodcastClient, PodcastPage,
    PodcastRow, PodcastUpdate, ProgressEvent, ProgressReporter, ReqwestClient, SessionError,
    Settings, SharedProgressReporter, StatusTone, UploadSession, WsConnector, default_token_path,
};

// Emoji with fallback for terminals without Unicode support
static MICROPHONE: Emoji<'_, '_> = Emoji("🎙️  ", "");
static PLUG: Emoji<'_, '_> = Emoji("🔌 ", "[~] ");
static UPLOAD: Emoji<'_, '_> = Emoji("📤 ", "[^] ");
static HEADPHONES: Emoji<'_, '_> = Emoji("🎧 ", "[i] ");
static SUCCESS: Emoji<'_, '_> = Emoji("✅ ", "[+] ");
static FAILURE: Emoji<'_, '_> = Emoji("❌ ", "[!] ");
static LOCK: Emoji<'_, '_> = Emoji("🔒 ", "[!] ");
static FOLDER: Emoji<'_, '_> = Emoji("📁 ", "");
static CROSS: Emoji<'_, '_> = Emoji("✗ ", "x ");

/// Upload documents to a search space and manage its podcasts
#[derive(Parser, Debug)]
#[command(name = "searchcast")]
#[command(about = "Upload documents to a search space and manage its podcasts")]
#[command(version)]
struct Args {
    /// Base URL of the REST API
    #[arg(long, env = "SEARCHCAST_API_URL", default_value = DEFAULT_API_URL, global = true)]
    api_url: String,

    /// Base URL of the upload socket (ws:// or wss://)
    #[arg(long, env = "SEARCHCAST_WS_URL", global = true)]
    ws_url: Option<String>,

    /// Authentication token
    #[arg(long, env = "SEARCHCAST_TOKEN", hide_env_values = true, global = true)]
    token: Option<String>,

    /// File holding the authentication token
    #[arg(long, global = true)]
    token_file: Option<PathBuf>,

    /// Quiet mode - suppress progress output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Upload files into a search space and follow their processing
    Upload {
        space_id: i64,

        /// Files to upload
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Manage the podcasts of a search space
    #[command(subcommand)]
    Podcasts(PodcastCommand),
}

#[derive(Subcommand, Debug)]
enum PodcastCommand {
    /// List podcasts
    List { space_id: i64 },

    /// Show a single podcast
    Show { space_id: i64, podcast_id: i64 },

    /// Start generating a new podcast
    Create {
        space_id: i64,

        #[arg(long)]
        title: String,

        /// Text to turn into a podcast
        #[arg(long)]
        content: String,

        /// Target word count (100-2000, steps of 50)
        #[arg(long, default_value_t = DEFAULT_WORD_COUNT)]
        word_count: u32,
    },

    /// Change fields of a podcast
    Update {
        space_id: i64,
        podcast_id: i64,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        content: Option<String>,

        #[arg(long)]
        status: Option<String>,

        #[arg(long)]
        completed: Option<bool>,
    },

    /// Delete a podcast
    Delete { space_id: i64, podcast_id: i64 },

    /// Save a podcast's audio as <title>.mp3
    Download {
        space_id: i64,
        podcast_id: i64,

        /// Directory to save into
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,
    },

    /// Play a podcast with an external player
    Play {
        space_id: i64,
        podcast_id: i64,

        /// Player executable
        #[arg(long, default_value = "mpv")]
        player: String,

        /// Volume between 0 and 1
        #[arg(long, default_value_t = 1.0)]
        volume: f64,
    },
}

/// Progress reporter rendering one bar per uploaded file
struct UploadReporter {
    multi: MultiProgress,
    bars: Mutex<HashMap<usize, ProgressBar>>,
    main_bar: ProgressBar,
}

impl UploadReporter {
    fn new() -> Self {
        let multi = MultiProgress::new();

        let main_style = ProgressStyle::default_bar()
            .template("{spinner:.green} {wide_msg}")
            .unwrap();

        let main_bar = multi.add(ProgressBar::new_spinner());
        main_bar.set_style(main_style);
        main_bar.enable_steady_tick(std::time::Duration::from_millis(100));

        Self {
            multi,
            bars: Mutex::new(HashMap::new()),
            main_bar,
        }
    }

    fn add_bar(&self, index: usize, filename: &str) {
        let style = ProgressStyle::default_bar()
            .template(&format!("  {UPLOAD}[{{bar:30.cyan/blue}}] {{pos:>3}}% {{wide_msg}}"))
            .unwrap()
            .progress_chars("█▓░");

        let bar = self.multi.add(ProgressBar::new(100));
        bar.set_style(style);
        bar.set_message(format!("{} {}", truncate_title(filename, 40), "pending".dimmed()));
        self.bars.lock().unwrap().insert(index, bar);
    }
}

impl ProgressReporter for UploadReporter {
    fn report(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::Connecting { endpoint } => {
                self.main_bar
                    .set_message(format!("{PLUG}Connecting to {}", endpoint.cyan()));
            }

            ProgressEvent::Connected => {
                self.main_bar.set_message(format!("{PLUG}{}", "Connected".green()));
            }

            ProgressEvent::BatchAccepted { filenames } => {
                self.main_bar.set_message(format!(
                    "{UPLOAD}Uploading {} files",
                    filenames.len().to_string().cyan()
                ));
                for (index, filename) in filenames.iter().enumerate() {
                    self.add_bar(index, filename);
                }
            }

            ProgressEvent::BatchRejected { file_count } => {
                self.main_bar.set_message(format!(
                    "{FAILURE}{} files not sent: connection is not open",
                    file_count.to_string().red()
                ));
            }

            ProgressEvent::FileUpdated { index, status } => {
                let bars = self.bars.lock().unwrap();
                let Some(bar) = bars.get(&index) else {
                    return;
                };

                bar.set_position(u64::from(status.progress));
                let name = truncate_title(&status.filename, 40);
                let note = status.message.as_deref().unwrap_or("");
                match status.state {
                    FileState::Pending => bar.set_message(format!("{} {}", name, "pending".dimmed())),
                    FileState::Processing => {
                        bar.set_message(format!("{} {}", name, note.dimmed()))
                    }
                    FileState::Success => {
                        bar.finish_with_message(format!("{SUCCESS}{}", name.green()))
                    }
                    FileState::Error => bar.abandon_with_message(format!(
                        "{FAILURE}{} - {}",
                        name.red(),
                        note.red()
                    )),
                }
            }

            ProgressEvent::ConnectionLost { reason } => {
                self.main_bar
                    .set_message(format!("{FAILURE}Connection lost: {}", reason.red()));
            }

            ProgressEvent::Settled {
                succeeded,
                failed,
                unfinished,
            } => {
                self.main_bar.finish_and_clear();
                println!(
                    "\n{} {} processed, {} failed, {} unfinished",
                    "Upload complete:".bold().green(),
                    succeeded.to_string().green().bold(),
                    if failed > 0 {
                        failed.to_string().red().bold()
                    } else {
                        failed.to_string().green()
                    },
                    unfinished.to_string().yellow()
                );
            }
        }
    }
}

fn truncate_title(title: &str, max_len: usize) -> String {
    if title.chars().count() <= max_len {
        title.to_string()
    } else {
        let kept: String = title.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "warn,searchcast=debug" } else { "warn" };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();
}

/// Without a token there is nothing to show; point the user at sign-in
fn not_signed_in() -> ! {
    eprintln!(
        "{LOCK}{} Provide --token, set SEARCHCAST_TOKEN, or store it in {}",
        "Not signed in.".red().bold(),
        default_token_path()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "a token file".to_string())
            .cyan()
    );
    std::process::exit(1);
}

fn require_token(settings: &Settings) -> &str {
    match settings.token.as_deref() {
        Some(token) => token,
        None => not_signed_in(),
    }
}

fn tone_label(status: &str, tone: StatusTone) -> ColoredString {
    match tone {
        StatusTone::Success => status.green(),
        StatusTone::Warning => status.yellow(),
        StatusTone::Error => status.red(),
        StatusTone::Default => status.normal(),
    }
}

fn print_rows(rows: &[PodcastRow]) {
    if rows.is_empty() {
        println!("No podcasts yet.");
        return;
    }

    for row in rows {
        let media = if row.can_play() {
            "▶ ⤓".cyan()
        } else if row.shows_media_controls {
            "▶ ⤓".dimmed()
        } else {
            "".normal()
        };

        println!(
            "{:>5}  {}  [{}]  {}  {}",
            row.id.to_string().dimmed(),
            row.title.bold(),
            tone_label(&row.status, row.tone),
            row.created.dimmed(),
            media
        );
    }
}

fn print_podcast(podcast: &Podcast) {
    let row = PodcastRow::from_podcast(podcast);
    println!("{HEADPHONES}{}", podcast.title.bold());
    println!("  id:       {}", podcast.id);
    println!("  status:   {}", tone_label(&podcast.status, row.tone));
    println!("  {}", row.created.dimmed());
    if let Some(location) = &podcast.file_location {
        println!("  file:     {}", location.cyan());
    }
    if !podcast.content.is_empty() {
        println!("\n{}", podcast.content);
    }
}

fn flush_notifications(page: &mut PodcastPage<ReqwestClient>) -> bool {
    let mut had_error = false;
    for notice in page.take_notifications() {
        match notice.kind {
            NotificationKind::Success => println!("{SUCCESS}{}", notice.message.green()),
            NotificationKind::Error => {
                had_error = true;
                eprintln!("{FAILURE}{}", notice.message.red());
            }
        }
    }
    had_error
}

async fn run_upload(settings: &Settings, space_id: i64, files: Vec<PathBuf>, quiet: bool) -> Result<()> {
    let base_url = settings.upload_url()?;

    let reporter: SharedProgressReporter = if quiet {
        NoopReporter::shared()
    } else {
        Arc::new(UploadReporter::new())
    };

    let mut session = match UploadSession::open(
        &WsConnector,
        base_url,
        space_id,
        settings.token.as_deref(),
        reporter,
    )
    .await
    {
        Ok(session) => session,
        Err(SessionError::MissingToken) => not_signed_in(),
        Err(e) => return Err(e).context("Failed to open upload connection"),
    };

    let files = files.into_iter().map(DroppedFile::from_path).collect();
    if !session.drop_files(files) {
        bail!("Upload connection closed before files could be sent");
    }

    let board = session.run_until_settled().await.clone();
    session.close().await;

    let problems: Vec<_> = board
        .entries()
        .iter()
        .filter(|e| e.state != FileState::Success)
        .collect();

    if !quiet && !problems.is_empty() {
        println!("\n{}", "Files not processed:".red().bold());
        for entry in &problems {
            println!(
                "  {}{} - {}",
                CROSS,
                entry.filename.yellow(),
                entry.message.as_deref().unwrap_or("no response").dimmed()
            );
        }
    }

    if !problems.is_empty() {
        std::process::exit(1);
    }

    Ok(())
}

async fn run_podcasts(settings: &Settings, command: PodcastCommand) -> Result<()> {
    let client = PodcastClient::new(ReqwestClient::new(), settings.api_url.clone());

    match command {
        PodcastCommand::List { space_id } => {
            let mut page = PodcastPage::new(client, Some(space_id), settings.token.clone());
            if !page.refresh().await {
                not_signed_in();
            }
            if flush_notifications(&mut page) {
                std::process::exit(1);
            }
            print_rows(&page.rows());
        }

        PodcastCommand::Show {
            space_id,
            podcast_id,
        } => {
            let podcast = client
                .get(space_id, podcast_id, require_token(settings))
                .await
                .context("Failed to fetch podcast")?;
            print_podcast(&podcast);
        }

        PodcastCommand::Create {
            space_id,
            title,
            content,
            word_count,
        } => {
            let token = require_token(settings).to_string();
            let mut page = PodcastPage::new(client, Some(space_id), Some(token));
            page.open_create_dialog();
            let form = page.form_mut();
            form.title = title;
            form.content = content;
            form.set_word_count(word_count);

            let created = page.submit_create_form().await;
            let failed = flush_notifications(&mut page);
            if let Some(podcast) = created {
                println!(
                    "  {} {} ({})",
                    "Created".dimmed(),
                    podcast.id.to_string().cyan(),
                    tone_label(&podcast.status, podcast.tone())
                );
                print_rows(&page.rows());
            }
            if failed {
                std::process::exit(1);
            }
        }

        PodcastCommand::Update {
            space_id,
            podcast_id,
            title,
            content,
            status,
            completed,
        } => {
            let update = PodcastUpdate {
                title,
                content,
                status,
                is_completed: completed,
            };
            if update.is_empty() {
                bail!("Nothing to update: pass at least one of --title, --content, --status, --completed");
            }

            let podcast = client
                .update(space_id, podcast_id, &update, require_token(settings))
                .await
                .context("Failed to update podcast")?;
            print_podcast(&podcast);
        }

        PodcastCommand::Delete {
            space_id,
            podcast_id,
        } => {
            let token = require_token(settings).to_string();
            let podcast = client
                .get(space_id, podcast_id, &token)
                .await
                .context("Failed to fetch podcast")?;

            let mut page = PodcastPage::new(client, Some(space_id), Some(token));
            let deleted = page.handle_delete(&podcast).await;
            flush_notifications(&mut page);
            if !deleted {
                std::process::exit(1);
            }
            print_rows(&page.rows());
        }

        PodcastCommand::Download {
            space_id,
            podcast_id,
            output_dir,
        } => {
            let token = require_token(settings).to_string();
            let podcast = client
                .get(space_id, podcast_id, &token)
                .await
                .context("Failed to fetch podcast")?;
            if !PodcastRow::from_podcast(&podcast).can_download() {
                bail!("Podcast '{}' is not ready for download ({})", podcast.title, podcast.status);
            }

            let mut page = PodcastPage::new(client, Some(space_id), Some(token));
            let saved = page.handle_download(&podcast, &output_dir).await;
            flush_notifications(&mut page);
            match saved {
                Some(path) => println!(
                    "{FOLDER}Saved: {}",
                    path.display().to_string().cyan()
                ),
                None => std::process::exit(1),
            }
        }

        PodcastCommand::Play {
            space_id,
            podcast_id,
            player,
            volume,
        } => {
            let token = require_token(settings).to_string();
            let podcast = client
                .get(space_id, podcast_id, &token)
                .await
                .context("Failed to fetch podcast")?;
            let location = match podcast.file_location.as_deref() {
                Some(location) if podcast.is_playable() => location.to_string(),
                _ => bail!("Podcast '{}' is not ready for playback ({})", podcast.title, podcast.status),
            };
            let source = resolve_audio_source(&settings.api_url, &location)
                .with_context(|| format!("Invalid audio location: {location}"))?;

            let mut page = PodcastPage::new(client, Some(space_id), Some(token));
            page.handle_play(podcast);

            let mut state = PlayerState::default();
            state.set_volume(volume);

            if let Some(playing) = page.now_playing() {
                println!(
                    "{HEADPHONES}Playing: {} {}",
                    playing.title.bold(),
                    format!("(volume {:.0}%)", state.volume() * 100.0).dimmed()
                );
            }

            let mut command = tokio::process::Command::new(&player);
            if player.ends_with("mpv") {
                command.args(state.mpv_args());
            }
            let status = command
                .arg(source.as_str())
                .status()
                .await
                .with_context(|| format!("Failed to start player '{player}'"));

            page.close_player();

            if !status?.success() {
                bail!("Player '{player}' exited with an error");
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let token_file = args.token_file.clone().or_else(default_token_path);
    let settings = Settings::resolve(
        &args.api_url,
        args.ws_url.as_deref(),
        args.token.clone(),
        token_file.as_deref(),
    )
    .context("Invalid configuration")?;

    if !args.quiet {
        println!(
            "\n{}{} {}\n",
            MICROPHONE,
            "searchcast".bold().magenta(),
            "- Search Space Uploads & Podcasts".dimmed()
        );
    }

    match args.command {
        Command::Upload { space_id, files } => {
            run_upload(&settings, space_id, files, args.quiet).await
        }
        Command::Podcasts(command) => run_podcasts(&settings, command).await,
    }
}
