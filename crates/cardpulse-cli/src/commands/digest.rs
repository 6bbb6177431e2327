use cardpulse_core::integrations::{ChatWebhook, TrelloClient};
use cardpulse_core::window::{compute, parse_date, WindowMode};
use cardpulse_core::{build_digest, run_digest, AllowList, Config, DigestReport, DigestRequest};
use chrono::Utc;
use clap::{Args, ValueEnum};

/// Which day to report on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum When {
    /// Previous business day (Mon-Fri)
    PrevBiz,
    /// Previous calendar day
    Yesterday,
    /// The day given with --date
    Date,
}

impl From<When> for WindowMode {
    fn from(when: When) -> Self {
        match when {
            When::PrevBiz => WindowMode::PreviousBusinessDay,
            When::Yesterday => WindowMode::PreviousCalendarDay,
            When::Date => WindowMode::ExplicitDate,
        }
    }
}

#[derive(Args)]
pub struct DigestArgs {
    /// Trello board id or shortLink (default: digest.board_id from config)
    #[arg(long)]
    board: Option<String>,
    /// Reporting day
    #[arg(long, value_enum, default_value_t = When::PrevBiz)]
    when: When,
    /// YYYY-MM-DD (required with --when date)
    #[arg(long, value_name = "YYYY-MM-DD")]
    date: Option<String>,
    /// Message title (default: digest.title from config)
    #[arg(long)]
    title: Option<String>,
    /// Only count these owners (case-insensitive)
    #[arg(long = "only-owners", value_name = "NAME", num_args = 0..)]
    only_owners: Vec<String>,
    /// Print the digest instead of posting it
    #[arg(long)]
    dry_run: bool,
}

pub async fn run(args: DigestArgs, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    // Everything that can be rejected locally is checked before any request.
    let credentials = config.trello_credentials()?;
    let webhook_url = if args.dry_run {
        None
    } else {
        Some(config.webhook_url()?)
    };
    let tz = config.timezone()?;

    let mode = WindowMode::from(args.when);
    let date = match (mode, args.date.as_deref()) {
        (WindowMode::ExplicitDate, Some(raw)) => Some(parse_date(raw)?),
        _ => None,
    };
    let now = Utc::now().with_timezone(&tz);
    let window = compute(mode, date, &now)?;

    let allow_list = (!args.only_owners.is_empty()).then(|| AllowList::new(&args.only_owners));
    let request = DigestRequest {
        board_id: args.board.unwrap_or_else(|| config.digest.board_id.clone()),
        window,
        title: args.title.unwrap_or_else(|| config.digest.title.clone()),
        allow_list,
    };

    let trello = TrelloClient::new(&config.trello.base_url, credentials)?;

    match webhook_url {
        None => {
            let report = build_digest(&trello, &trello, &request).await?;
            log_report(&report);
            println!("{}", report.message);
        }
        Some(url) => {
            let webhook = ChatWebhook::new(url)?;
            let report = run_digest(&trello, &trello, &webhook, &request).await?;
            log_report(&report);
            println!("✅ Posted summary to Google Chat.");
        }
    }
    Ok(())
}

fn log_report(report: &DigestReport) {
    for item in &report.skipped {
        tracing::warn!(card = %item.id, reason = %item.reason, "card left out of digest");
    }
    tracing::info!(
        cards = report.items_seen,
        skipped = report.skipped.len(),
        owners = report.counts.len(),
        attributed = report.counts.total(),
        "digest ready"
    );
}
