//! Application wiring: CLI configuration, dependency-injected clients, and
//! the interactive room loop.

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use url::Url;

use crate::chat::{self, AuthorInfo, InMemoryMessageStore, RoomSession};
use crate::mentions::{MessageSpan, mention_spans};
use crate::notifications::HttpNotificationSender;
use crate::participants::HttpParticipantSource;
use crate::worker;

#[derive(Parser, Debug)]
#[command(name = crate::APP_NAME, about = "Join a study room's chat from the terminal.")]
pub struct Cli {
    /// Base URL of the backend API (participant store and notification service).
    #[clap(long, default_value = "http://localhost:3001/api")]
    api_url: Url,

    /// The room to join.
    #[clap(long)]
    room_id: String,

    /// Display title of the room, used in mention notifications.
    #[clap(long, default_value = "Study Room")]
    room_name: String,

    /// The current user's id.
    #[clap(long)]
    user_id: String,

    /// The current user's display name.
    #[clap(long, default_value = "Anonymous")]
    user_name: String,

    /// Enable verbose logging output.
    #[clap(short, long, action)]
    verbose: bool,
}

/// Process-wide application context.
///
/// Every external client is constructed exactly once here and passed by
/// reference to whatever needs it; nothing in the crate reaches for a hidden
/// module-level client.
pub struct AppContext {
    pub participants: HttpParticipantSource,
    pub notifier: HttpNotificationSender,
    pub store: InMemoryMessageStore,
}

impl AppContext {
    pub fn new(api_url: Url) -> Self {
        let client = reqwest::Client::new();
        Self {
            participants: HttpParticipantSource::new(client.clone(), api_url.clone()),
            notifier: HttpNotificationSender::new(client, api_url),
            store: InMemoryMessageStore::new(),
        }
    }
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let ctx = Arc::new(AppContext::new(cli.api_url.clone()));
    worker::start(Arc::clone(&ctx))?;

    let session = worker::runtime()
        .block_on(RoomSession::open(
            &ctx.participants,
            &ctx.store,
            &cli.room_id,
            &cli.room_name,
            &cli.user_id,
        ))
        .with_context(|| format!("failed to open room {}", cli.room_id))?;

    info!(
        "joined {} with {} other participant(s)",
        session.room_name,
        session.input.participants().len(),
    );

    let author = AuthorInfo {
        id: cli.user_id.clone(),
        name: cli.user_name.clone(),
        photo_url: None,
    };

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    writeln!(stdout, "Type a message (@name to mention someone, Ctrl-D to quit):")?;
    for line in stdin.lock().lines() {
        let line = line?;
        let text = line.trim();
        if text.is_empty() {
            continue;
        }
        // A failed send is the only failure shown here; mention processing
        // runs in the background and never surfaces to the sender.
        match worker::runtime().block_on(chat::send_message(
            &ctx.store,
            &session.room_id,
            &session.room_name,
            &author,
            text,
        )) {
            Ok(()) => writeln!(stdout, "{}: {}", author.name, highlight_mentions(text))?,
            Err(err) => writeln!(stdout, "failed to send message: {err}")?,
        }
    }
    Ok(())
}

/// Renders `@word` runs with terminal emphasis, resolved or not.
fn highlight_mentions(text: &str) -> String {
    mention_spans(text)
        .into_iter()
        .map(|span| match span {
            MessageSpan::Mention(word) => format!("\x1b[1;36m{word}\x1b[0m"),
            MessageSpan::Text(plain) => plain.to_owned(),
        })
        .collect()
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();
}
