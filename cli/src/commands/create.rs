//! CREATE command - Validate and create a note.

use anyhow::{Result, bail};
use clap::Args;
use colored::Colorize;
use notehub_client::{HttpNotesApi, NotesApi};
use notehub_core::{Note, NoteDraft, NoteTag, validate_draft};
use serde::Serialize;

use super::{HumanReadable, output, print_field_errors};

/// Arguments for the create command.
#[derive(Args)]
pub struct CreateArgs {
    /// Note title (3 to 50 characters)
    #[arg(long, short = 't')]
    pub title: String,

    /// Note body (up to 500 characters)
    #[arg(long, short = 'c', default_value = "")]
    pub content: String,

    /// One of Todo, Work, Personal, Meeting, Shopping
    #[arg(long, default_value_t = NoteTag::default().to_string())]
    pub tag: String,
}

impl From<CreateArgs> for NoteDraft {
    fn from(args: CreateArgs) -> Self {
        NoteDraft {
            title: args.title,
            content: args.content,
            tag: args.tag,
        }
    }
}

/// A freshly created note, printed with a confirmation banner.
#[derive(Serialize)]
#[serde(transparent)]
struct Created<'a>(&'a Note);

impl HumanReadable for Created<'_> {
    fn print_human(&self) {
        println!("{}", "Note added!".green().bold());
        println!();
        println!("  {} {}", "ID:".cyan(), self.0.id);
        println!("  {} {}", "Title:".cyan(), self.0.title);
        println!("  {} {}", "Tag:".cyan(), self.0.tag);
    }
}

/// Execute the create command.
///
/// The draft is validated before anything is sent; an invalid draft never
/// reaches the server.
pub async fn execute(api: &HttpNotesApi, human: bool, args: CreateArgs) -> Result<()> {
    let draft = NoteDraft::from(args);

    let new_note = match validate_draft(&draft) {
        Ok(note) => note,
        Err(errors) => {
            if human {
                println!("{}", "Note not created".red().bold());
                print_field_errors(&errors);
            } else {
                println!("{}", serde_json::to_string_pretty(&errors)?);
            }
            bail!("invalid note: {}", errors);
        }
    };

    let note = api.create_note(&new_note).await?;
    output(&Created(&note), human)
}
