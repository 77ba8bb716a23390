//! DELETE command - Delete a note.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use notehub_client::{HttpNotesApi, NotesApi};
use notehub_core::{Note, NoteId};
use serde::Serialize;

use super::{HumanReadable, output};

/// Arguments for the delete command.
#[derive(Args)]
pub struct DeleteArgs {
    /// Note ID to delete
    pub id: NoteId,

    /// Skip confirmation prompt (for non-interactive use)
    #[arg(long, short = 'y')]
    pub yes: bool,
}

/// The note the server removed.
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub deleted: Note,
}

impl HumanReadable for DeleteResponse {
    fn print_human(&self) {
        println!("{}", "Note deleted.".green().bold());
        println!();
        println!("  {} {}", "ID:".cyan(), self.deleted.id);
        println!("  {} {}", "Title:".cyan(), self.deleted.title);
    }
}

/// Execute the delete command.
pub async fn execute(api: &HttpNotesApi, human: bool, args: DeleteArgs) -> Result<()> {
    // Confirmation prompt for interactive use
    if human && !args.yes {
        eprint!(
            "{} Are you sure you want to delete note {}? [y/N] ",
            "Warning:".yellow().bold(),
            args.id
        );

        use std::io::Write;
        std::io::stderr().flush()?;

        let mut input = String::new();
        std::io::stdin().read_line(&mut input)?;

        if !input.trim().eq_ignore_ascii_case("y") {
            eprintln!("Aborted.");
            return Ok(());
        }
    }

    let deleted = api.delete_note(&args.id).await?;

    output(&DeleteResponse { deleted }, human)
}
