use std::path::PathBuf;

use cardpulse_core::export::{collect_rows, write_csv_file};
use cardpulse_core::integrations::TrelloClient;
use cardpulse_core::{BoardRef, Config};
use clap::Args;

#[derive(Args)]
pub struct ExportArgs {
    /// Board to export as ID=NAME; repeatable (default: export.boards from config)
    #[arg(long = "board", value_name = "ID=NAME", value_parser = parse_board)]
    boards: Vec<BoardRef>,
    /// CSV output path (default: export.output from config)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn parse_board(raw: &str) -> Result<BoardRef, String> {
    match raw.split_once('=') {
        Some((id, name)) if !id.trim().is_empty() && !name.trim().is_empty() => Ok(BoardRef {
            id: id.trim().to_string(),
            name: name.trim().to_string(),
        }),
        _ => Err(format!("expected ID=NAME, got '{raw}'")),
    }
}

pub async fn run(args: ExportArgs, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let credentials = config.trello_credentials()?;
    let tz = config.timezone()?;
    let boards = if args.boards.is_empty() {
        config.export.boards.clone()
    } else {
        args.boards
    };
    let output = args.output.unwrap_or_else(|| config.export.output.clone());

    let trello = TrelloClient::new(&config.trello.base_url, credentials)?;
    for board in &boards {
        println!("📦 Fetching cards from {} ({})...", board.name, board.id);
    }
    let rows = collect_rows(&trello, &boards, tz).await?;
    write_csv_file(&rows, &output)?;

    println!(
        "\n✅ Done! Exported {} cards to {}",
        rows.len(),
        output.display()
    );
    Ok(())
}
