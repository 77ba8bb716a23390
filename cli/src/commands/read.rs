//! READ command - Show a single note.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use notehub_client::{HttpNotesApi, NotesApi};
use notehub_core::{Note, NoteId};

use super::{HumanReadable, format_timestamp, output};

/// Arguments for the read command.
#[derive(Args)]
pub struct ReadArgs {
    /// Note ID to read
    pub id: NoteId,
}

impl HumanReadable for Note {
    fn print_human(&self) {
        println!("{}", self.title.green().bold());
        println!("{}", "=".repeat(80));
        println!();
        println!("  {} {}", "ID:".cyan(), self.id);
        println!("  {} {}", "Tag:".cyan(), self.tag);
        println!("  {} {}", "Created:".cyan(), format_timestamp(&self.created_at));
        println!("  {} {}", "Updated:".cyan(), format_timestamp(&self.updated_at));
        println!();

        if self.content.is_empty() {
            println!("  {}", "(No content)".dimmed());
        } else {
            for line in self.content.lines() {
                println!("  {}", line);
            }
        }
    }
}

/// Execute the read command.
pub async fn execute(api: &HttpNotesApi, human: bool, args: ReadArgs) -> Result<()> {
    let note = api.get_note(&args.id).await?;
    output(&note, human)
}
