use anyhow::{Result, bail};
use toxiscope_application::{HistoryView, LoadStatus, ViewScope};
use toxiscope_core::analysis::format_percent;
use toxiscope_core::history::{FilterKey, HistoryRow, RecordId, SortKey};

use crate::bootstrap::App;

pub async fn list(app: &App, sort: SortKey, filter: FilterKey, json: bool) -> Result<()> {
    let view = HistoryView::new(app.history.clone(), ViewScope::new());
    view.set_sort(sort);
    view.set_filter(filter);

    match view.refresh().await {
        LoadStatus::Ready => {}
        LoadStatus::Empty => {
            println!("No saved analyses yet.");
            return Ok(());
        }
        LoadStatus::LoginRequired => bail!("Please log in to see your history (toxiscope login)"),
        LoadStatus::Loading => bail!("Session is still being restored, try again"),
        LoadStatus::Failed(reason) => bail!(reason),
    }

    let rows = view.rows();
    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }
    if rows.is_empty() {
        println!("No analyses match the `{}` filter.", filter);
        return Ok(());
    }
    for row in &rows {
        print_row(row);
    }
    println!("\n{} of {} analyses", rows.len(), view.all_rows().len());
    Ok(())
}

fn print_row(row: &HistoryRow) {
    println!(
        "#{:<6} {} {}  tox {:>6}  cyber {:>6}  {:<8}  {}",
        row.id.0, row.date, row.time, row.toxicity_percent, row.cyberbullying_percent, row.sentiment.to_string(), row.preview
    );
}

pub async fn delete(app: &App, id: i64) -> Result<()> {
    app.history.delete_record(RecordId(id)).await?;
    println!("Deleted #{}", id);
    Ok(())
}

pub async fn stats(app: &App) -> Result<()> {
    let stats = app.history.fetch_profile_stats().await?;

    println!("Analyses:            {}", stats.total);
    println!("Toxic / safe:        {} / {}", stats.toxic, stats.safe);
    println!("Average toxicity:    {}", format_percent(stats.average_toxicity));
    println!("Average cyberbully:  {}", format_percent(stats.average_cyberbullying));
    println!(
        "Sentiment:           {} positive, {} neutral, {} negative",
        stats.positive, stats.neutral, stats.negative
    );
    if let Some(last) = stats.last_analyzed_at {
        println!("Last analysis:       {}", last.format("%Y-%m-%d %H:%M UTC"));
    }
    Ok(())
}
