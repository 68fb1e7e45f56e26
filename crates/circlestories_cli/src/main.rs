//! Command line front end for a local CircleStories database.
//!
//! # Responsibility
//! - Map subcommands onto `StoryEngine` operations.
//! - Keep output line-oriented so it can be piped into other tools.
//!
//! # Invariants
//! - Every failure exits non-zero with the error chain on stderr.
//! - Logging starts only when a log directory is given.

use anyhow::{Context, Result};
use circlestories_core::{
    default_log_level, init_logging, EngineConfig, Story, StoryEngine, StoryListQuery, StoryView,
    UserId,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use uuid::Uuid;

/// Collaborative stories, one block at a time.
#[derive(Debug, Parser)]
#[command(name = "circlestories", version, long_about = None)]
struct Cli {
    /// SQLite database file. Created and migrated on first use.
    #[arg(long, env = "CIRCLESTORIES_DB", default_value = "circlestories.db")]
    db: PathBuf,

    /// Absolute directory for rolling log files. Logging is off when unset.
    #[arg(long, env = "CIRCLESTORIES_LOG_DIR")]
    log_dir: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Start a story with its opening block.
    New {
        #[arg(value_parser = parse_user_id)]
        user: UserId,
        title: String,
        opening_text: String,
    },

    /// Append a block to an existing story.
    Append {
        #[arg(value_parser = parse_story_id)]
        story_id: Uuid,
        #[arg(value_parser = parse_user_id)]
        user: UserId,
        text: String,
    },

    /// Show a story as the given user may see it.
    View {
        #[arg(value_parser = parse_story_id)]
        story_id: Uuid,
        #[arg(value_parser = parse_user_id)]
        user: UserId,
    },

    /// List stories, newest first.
    List {
        /// Only stories this user contributed to.
        #[arg(long, value_parser = parse_user_id)]
        user: Option<UserId>,

        /// Page size (default 20, at most 100).
        #[arg(long)]
        limit: Option<u32>,

        #[arg(long, default_value_t = 0)]
        offset: u32,
    },

    /// List contributors in order of first contribution.
    Contributors {
        #[arg(value_parser = parse_story_id)]
        story_id: Uuid,
    },

    /// Print the core library version.
    Version,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    if let Command::Version = cli.command {
        println!("circlestories_core version={}", circlestories_core::core_version());
        return Ok(());
    }

    if let Some(log_dir) = cli.log_dir.as_deref() {
        init_logging(default_log_level(), log_dir).map_err(anyhow::Error::msg)?;
    }

    let engine = StoryEngine::open(&EngineConfig::with_db_path(&cli.db))
        .with_context(|| format!("failed to open story database {}", cli.db.display()))?;

    match cli.command {
        Command::New {
            user,
            title,
            opening_text,
        } => {
            println!(
                "{}",
                engine.create_story(user.as_str(), &title, &opening_text)?
            );
        }

        Command::Append {
            story_id,
            user,
            text,
        } => {
            println!("{}", engine.submit_append(story_id, user.as_str(), &text)?);
        }

        Command::View { story_id, user } => print_view(&engine.view(story_id, user.as_str())?),

        Command::List {
            user,
            limit,
            offset,
        } => {
            let query = StoryListQuery {
                contributor: user,
                limit,
                offset,
            };
            for story in engine.list_stories(&query)? {
                print_story_line(&story);
            }
        }

        Command::Contributors { story_id } => {
            for user in engine.contributors(story_id)? {
                println!("{user}");
            }
        }

        Command::Version => {}
    }

    Ok(())
}

fn parse_story_id(raw: &str) -> Result<Uuid, String> {
    Uuid::parse_str(raw.trim()).map_err(|err| format!("invalid story id: {err}"))
}

fn parse_user_id(raw: &str) -> Result<UserId, String> {
    UserId::parse(raw).map_err(|err| err.to_string())
}

fn print_story_line(story: &Story) {
    println!(
        "{}\t{}\t{}\t{}",
        story.story_id, story.created_at, story.creator, story.title
    );
}

fn print_view(view: &StoryView) {
    println!("# {}", view.story().title);
    match view {
        StoryView::Full { blocks, .. } => {
            println!("visibility: full ({} blocks)\n", blocks.len());
            println!("{}", view.assembled_text());
        }
        StoryView::Partial { last_block, .. } => {
            println!(
                "visibility: partial (latest block #{} by {})\n",
                last_block.seq, last_block.author
            );
            println!("{}", last_block.text);
        }
    }
}
