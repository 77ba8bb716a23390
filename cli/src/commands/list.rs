//! LIST command - List one page of notes.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use notehub_client::{HttpNotesApi, NotesApi, session::NO_RESULTS_MESSAGE};
use notehub_core::{DEFAULT_PER_PAGE, NotesPage, QueryKey};
use serde::Serialize;

use super::{HumanReadable, format_timestamp, output, truncate};

/// Arguments for the list command.
#[derive(Args)]
pub struct ListArgs {
    /// Search text; empty lists every note
    #[arg(short, long, default_value = "")]
    pub search: String,

    /// Page number, starting at 1
    #[arg(short, long, default_value_t = 1)]
    pub page: u32,

    /// Notes per page
    #[arg(long, default_value_t = DEFAULT_PER_PAGE)]
    pub per_page: u32,
}

/// One page of notes together with the query that produced it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse {
    pub search: String,
    pub page: u32,
    #[serde(flatten)]
    pub result: NotesPage,
}

impl HumanReadable for ListResponse {
    fn print_human(&self) {
        let title = if self.search.is_empty() {
            "Notes".to_string()
        } else {
            format!("Notes matching \"{}\"", self.search)
        };
        println!("{}", title.green().bold());
        println!("{}", "=".repeat(80));
        println!();

        if self.result.is_empty() {
            println!("  {}", NO_RESULTS_MESSAGE.dimmed());
            return;
        }

        for note in &self.result.notes {
            println!(
                "  {} {}",
                truncate(&note.title, 50).bold(),
                format!("[{}]", note.tag).dimmed()
            );
            println!("    {} {}", "ID:".cyan(), note.id);
            if !note.content.is_empty() {
                println!("    {} {}", "Content:".cyan(), truncate(&note.content, 70));
            }
            println!("    {} {}", "Created:".cyan(), format_timestamp(&note.created_at));
            println!();
        }

        if self.result.total_pages > 1 {
            println!(
                "  {} {} of {}",
                "Page:".cyan(),
                self.page,
                self.result.total_pages
            );
        }
    }
}

/// Execute the list command.
pub async fn execute(api: &HttpNotesApi, human: bool, args: ListArgs) -> Result<()> {
    let key = QueryKey::new(args.search, args.page);
    let result = api
        .list_notes(key.search(), key.page(), args.per_page)
        .await?;

    let response = ListResponse {
        search: key.search().to_string(),
        page: key.page(),
        result,
    };

    output(&response, human)
}
