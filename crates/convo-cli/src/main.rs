use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use convo_cli::cli::{render_rows, tracing_setup, CliConfig, NoteDump};
use convo_core::models::{NoteId, Visibility};
use convo_core::origin::{Origin, OriginKind};
use convo_core::store::NoFetcher;
use convo_core::{ConversationLoader, LoadStrategy};
use url::Url;

#[derive(Parser)]
#[command(name = "convo-cli")]
#[command(about = "Show conversation threads as indented lists")]
struct Cli {
    /// Path to JSON config file (loader, view and origin settings)
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a conversation from a JSON note dump and print it
    Show {
        /// JSON file: an array of notes, or {"notes": [...], "conversationOids": {...}}
        notes: PathBuf,

        /// Note the conversation is opened from
        #[arg(long, short = 's')]
        selected: NoteId,

        /// Oldest note first
        #[arg(long)]
        oldest_first: bool,

        /// Do not indent replies
        #[arg(long)]
        flat: bool,

        /// Append indent and reply level to each row
        #[arg(long)]
        debug_info: bool,

        /// Deepest indentation level
        #[arg(long)]
        max_indent: Option<u32>,

        #[arg(long, value_enum)]
        strategy: Option<StrategyArg>,

        /// Print rows as JSON
        #[arg(long)]
        json: bool,

        /// Pretty-print JSON output
        #[arg(long, short)]
        pretty: bool,
    },

    /// Print the alternative web permalink of a note
    Permalink {
        /// Origin-side note id
        #[arg(long)]
        oid: String,

        /// Origin base URL; overrides the config file
        #[arg(long)]
        origin_url: Option<Url>,

        #[arg(long, value_enum)]
        kind: Option<KindArg>,

        /// The note is a private message
        #[arg(long)]
        private: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum StrategyArg {
    Recursive,
    WholeConversation,
}

impl From<StrategyArg> for LoadStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Recursive => LoadStrategy::Recursive,
            StrategyArg::WholeConversation => LoadStrategy::WholeConversation,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    GnuSocial,
    Twitter,
    Mastodon,
    ActivityPub,
}

impl From<KindArg> for OriginKind {
    fn from(arg: KindArg) -> Self {
        match arg {
            KindArg::GnuSocial => OriginKind::GnuSocial,
            KindArg::Twitter => OriginKind::Twitter,
            KindArg::Mastodon => OriginKind::Mastodon,
            KindArg::ActivityPub => OriginKind::ActivityPub,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = tracing_setup::init_tracing(cli.verbose) {
        eprintln!("Warning: logging disabled: {}", e);
    }

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = match cli.config {
        Some(ref path) => CliConfig::load(path)?,
        None => CliConfig::default(),
    };

    match cli.command {
        Commands::Show {
            notes,
            selected,
            oldest_first,
            flat,
            debug_info,
            max_indent,
            strategy,
            json,
            pretty,
        } => {
            // Flags override the config file
            if let Some(max_indent) = max_indent {
                config.loader.max_indent_level = max_indent;
            }
            if let Some(strategy) = strategy {
                config.loader.strategy = strategy.into();
            }
            config.view.old_messages_first |= oldest_first;
            config.view.show_threads &= !flat;
            config.view.show_debug_info |= debug_info;

            let store = NoteDump::load(&notes)?.into_store();
            tracing::debug!("Loaded {} notes from {}", store.len(), notes.display());

            let progress = |p: &str| tracing::trace!("progress: {}", p);
            let mut loader = ConversationLoader::new(&store, NoFetcher, config.loader, selected);
            let conversation = loader
                .load(Some(&progress))
                .with_context(|| format!("Failed to load conversation of note {}", selected))?;

            let skipped = conversation.unordered().count();
            if skipped > 0 {
                tracing::warn!(
                    "{} notes were left out of the order (cycles or duplicates)",
                    skipped
                );
            }

            let rows = conversation.rows(&config.view);
            if json || pretty {
                let out = if pretty {
                    serde_json::to_string_pretty(&rows)?
                } else {
                    serde_json::to_string(&rows)?
                };
                println!("{}", out);
            } else {
                print!("{}", render_rows(&rows));
            }
        }

        Commands::Permalink {
            oid,
            origin_url,
            kind,
            private,
        } => {
            let origin = match (origin_url, config.origin.take()) {
                (Some(url), configured) => Origin::new(
                    kind.map(Into::into)
                        .or(configured.map(|o| o.kind))
                        .unwrap_or(OriginKind::GnuSocial),
                    url,
                ),
                (None, Some(mut configured)) => {
                    if let Some(kind) = kind {
                        configured.kind = kind.into();
                    }
                    configured
                }
                (None, None) => {
                    bail!("No origin: pass --origin-url or set \"origin\" in the config")
                }
            };
            let visibility = if private {
                Visibility::Private
            } else {
                Visibility::Public
            };

            match origin.alternative_note_permalink(&oid, visibility) {
                Some(link) => println!("{}", link),
                None => bail!("{:?} origins have no alternative permalink", origin.kind),
            }
        }
    }

    Ok(())
}
