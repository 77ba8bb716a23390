//! BROWSE command - Interactive notes screen.
//!
//! Each plain line typed is the new contents of the search box and is
//! committed after the debounce period. Lines starting with `:` are
//! commands; `:help` lists them.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use notehub_client::{
    CacheConfig, HttpNotesApi, NotesSession, SEARCH_DEBOUNCE, SessionConfig, SessionEvent,
    SubmitBlocked, SubmitOutcome,
};
use notehub_core::{DEFAULT_PER_PAGE, Field, NoteId, NoteTag};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::debug;

use super::{HumanReadable, format_timestamp, print_field_errors, print_notice, truncate};

type Session = NotesSession<HttpNotesApi>;
type Input = Lines<BufReader<Stdin>>;

/// Arguments for the browse command.
#[derive(Args)]
pub struct BrowseArgs {
    /// Notes per page
    #[arg(long, default_value_t = DEFAULT_PER_PAGE)]
    pub per_page: u32,

    /// Quiet period before typed search text is applied, in milliseconds
    #[arg(long, default_value_t = SEARCH_DEBOUNCE.as_millis() as u64)]
    pub debounce_ms: u64,
}

/// A line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Search(String),
    Next,
    Prev,
    Page(u32),
    Retry,
    New,
    Open(NoteId),
    Delete(NoteId),
    Stats,
    Help,
    Quit,
    Unknown(String),
}

impl Command {
    fn parse(line: &str) -> Self {
        let Some(command) = line.trim().strip_prefix(':') else {
            return Command::Search(line.to_string());
        };

        let mut parts = command.split_whitespace();
        let name = parts.next().unwrap_or_default();
        let arg = parts.next();

        match (name, arg) {
            ("next" | "n", None) => Command::Next,
            ("prev" | "p", None) => Command::Prev,
            ("page", Some(n)) => match n.parse() {
                Ok(n) => Command::Page(n),
                Err(_) => Command::Unknown(line.trim().to_string()),
            },
            ("retry", None) => Command::Retry,
            ("new", None) => Command::New,
            ("open", Some(id)) => Command::Open(NoteId::new(id)),
            ("delete", Some(id)) => Command::Delete(NoteId::new(id)),
            ("stats", None) => Command::Stats,
            ("help" | "h", None) => Command::Help,
            ("quit" | "q", None) => Command::Quit,
            _ => Command::Unknown(line.trim().to_string()),
        }
    }
}

/// Execute the browse command.
pub async fn execute(api: HttpNotesApi, args: BrowseArgs) -> Result<()> {
    let config = SessionConfig {
        debounce: Duration::from_millis(args.debounce_ms),
        cache: CacheConfig::default().with_per_page(args.per_page),
    };
    let mut session = NotesSession::new(Arc::new(api), config);
    let mut input = BufReader::new(tokio::io::stdin()).lines();

    print_help();
    session.start();
    render(&mut session);

    loop {
        tokio::select! {
            line = input.next_line() => {
                let Some(line) = line? else { break };
                match Command::parse(&line) {
                    Command::Search(text) => session.type_search(text),
                    Command::Next => {
                        if session.next_page() {
                            render(&mut session);
                        }
                    }
                    Command::Prev => {
                        if session.prev_page() {
                            render(&mut session);
                        }
                    }
                    Command::Page(page) => {
                        if session.go_to_page(page) {
                            render(&mut session);
                        }
                    }
                    Command::Retry => {
                        session.retry();
                        render(&mut session);
                    }
                    Command::New => {
                        if !run_form(&mut session, &mut input).await? {
                            break;
                        }
                        render(&mut session);
                    }
                    Command::Open(id) => match session.open_note(&id).await {
                        Ok(note) => note.print_human(),
                        Err(e) => println!("{} {}", "Error:".red().bold(), e),
                    },
                    Command::Delete(id) => {
                        if session.delete_note(&id).await.is_ok() {
                            render(&mut session);
                        } else {
                            print_notices(&mut session);
                        }
                    }
                    Command::Stats => print_stats(&session),
                    Command::Help => print_help(),
                    Command::Quit => break,
                    Command::Unknown(text) => {
                        println!("{} {} (:help lists commands)", "Unknown command:".yellow(), text);
                    }
                }
            }
            event = session.next_event() => match event {
                SessionEvent::Discarded(key) => debug!(%key, "late result dropped"),
                _ => render(&mut session),
            },
        }
    }

    Ok(())
}

/// Walks the user through the create form.
///
/// Returns `false` when input ended while the form was open.
async fn run_form(session: &mut Session, input: &mut Input) -> Result<bool> {
    session.open_form();
    println!();
    println!("{}", "New note".green().bold());
    println!(
        "  {}",
        "Press Enter to keep the current value, :cancel to discard.".dimmed()
    );

    loop {
        let Some(form) = session.form() else {
            return Ok(true);
        };
        let draft = form.draft().clone();

        for (field, current) in [
            (Field::Title, draft.title),
            (Field::Content, draft.content),
            (Field::Tag, draft.tag),
        ] {
            let hint = match field {
                Field::Tag => format!(
                    " ({})",
                    NoteTag::ALL.map(|t| t.as_str()).join(", ")
                ),
                _ => String::new(),
            };
            let error = session.form().and_then(|f| f.error(field)).map(str::to_string);
            if let Some(error) = error {
                println!("  {} {}", format!("{}:", field).red(), error);
            }
            print!("  {}{} [{}]: ", format!("{}", field).cyan(), hint, current);
            flush_stdout()?;

            let Some(line) = input.next_line().await? else {
                session.cancel_form();
                return Ok(false);
            };
            let line = line.trim_end();
            if line == ":cancel" {
                session.cancel_form();
                println!("  {}", "Discarded.".dimmed());
                return Ok(true);
            }
            if line.is_empty() {
                continue;
            }

            if let Some(form) = session.form_mut() {
                match field {
                    Field::Title => form.set_title(line),
                    Field::Content => form.set_content(line),
                    Field::Tag => form.set_tag(line),
                }
            }
        }

        match session.submit_form().await {
            SubmitOutcome::Created(note) => {
                print_notices(session);
                println!("  {} {}", "ID:".cyan(), note.id);
                return Ok(true);
            }
            SubmitOutcome::Blocked(SubmitBlocked::Invalid(errors)) => {
                println!("{}", "Please fix the following:".red().bold());
                print_field_errors(&errors);
            }
            SubmitOutcome::Blocked(SubmitBlocked::InProgress) => {}
            SubmitOutcome::Failed(_) => {
                print_notices(session);
                print!("  Try again? [Y/n] ");
                flush_stdout()?;
                let Some(answer) = input.next_line().await? else {
                    session.cancel_form();
                    return Ok(false);
                };
                if answer.trim().eq_ignore_ascii_case("n") {
                    session.cancel_form();
                    return Ok(true);
                }
            }
            SubmitOutcome::NoForm => return Ok(true),
        }
    }
}

fn render(session: &mut Session) {
    print_notices(session);

    let board = session.board();
    println!();
    println!(
        "{} {}",
        "Search:".cyan(),
        if board.search_text.is_empty() {
            "(all notes)".dimmed().to_string()
        } else {
            board.search_text.to_string()
        }
    );
    println!("{}", "=".repeat(80));

    if let Some(error) = board.error {
        println!("  {} {}", "Could not load notes:".red().bold(), error);
        println!("  {}", "Type :retry to try again.".dimmed());
    }
    if board.loading {
        println!("  {}", "Loading...".dimmed());
        return;
    }
    if board.placeholder {
        println!("  {}", "(updating...)".dimmed());
    }

    for note in board.notes {
        println!(
            "  {} {}",
            truncate(&note.title, 50).bold(),
            format!("[{}]", note.tag).dimmed()
        );
        println!(
            "    {} {}  {} {}",
            "ID:".cyan(),
            note.id,
            "Created:".cyan(),
            format_timestamp(&note.created_at)
        );
        if !note.content.is_empty() {
            println!("    {}", truncate(&note.content, 70));
        }
    }

    if board.show_pagination {
        println!();
        println!(
            "  {} {} of {}  {}",
            "Page".cyan(),
            board.key.page(),
            board.total_pages,
            "(:prev, :next, :page N)".dimmed()
        );
    }
}

fn print_notices(session: &mut Session) {
    for notice in session.take_notices() {
        print_notice(&notice);
    }
}

fn print_stats(session: &Session) {
    let cache = session.cache();
    let stats = cache.stats();
    println!("{}", "Cache".green().bold());
    println!("  {} {}", "Pages:".cyan(), stats.total);
    println!("  {} {}", "Fresh:".cyan(), stats.fresh);
    println!("  {} {}", "Stale:".cyan(), stats.stale);
    println!("  {} {}", "Fetching:".cyan(), stats.fetching);
    println!(
        "  {} {}",
        "Current page:".cyan(),
        if cache.is_fetching(&session.controller().key()) {
            "refreshing"
        } else {
            "idle"
        }
    );
}

fn print_help() {
    println!("{}", "NoteHub".green().bold());
    println!("  Type text to search, an empty line to clear the search.");
    println!("  {}", ":next, :prev, :page N   move between pages".dimmed());
    println!("  {}", ":new                    create a note".dimmed());
    println!("  {}", ":open ID, :delete ID    show or delete a note".dimmed());
    println!("  {}", ":retry                  reload after an error".dimmed());
    println!("  {}", ":stats                  cache statistics".dimmed());
    println!("  {}", ":quit                   leave".dimmed());
}

fn flush_stdout() -> Result<()> {
    use std::io::Write;
    std::io::stdout().flush()?;
    Ok(())
}
