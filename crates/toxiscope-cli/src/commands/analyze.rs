use anyhow::{Context, Result};
use toxiscope_application::{AnalyzeForm, ViewScope};
use toxiscope_core::analysis::AnalysisResult;

use super::score_label;
use crate::bootstrap::App;

pub async fn run(app: &App, text: String, url: Option<String>, save: bool, json: bool) -> Result<()> {
    let form = AnalyzeForm::new(app.analysis.clone(), ViewScope::new());
    form.set_text(text);
    form.set_source_url(url);

    let outcome = form.analyze().await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&outcome.result)?);
    } else {
        print_result(&outcome.result);
        if let Some(advisory) = form.visible_advisory() {
            println!("\n⚠ {}", advisory.message());
        }
    }

    if save {
        let record = form.save().await?;
        println!("Saved to history as #{}", record.id.0);
    }
    Ok(())
}

fn print_result(result: &AnalysisResult) {
    println!("Toxicity:       {}", score_label(result.toxicity_score));
    println!("Cyberbullying:  {}", score_label(result.cyberbullying_prob));
    println!("Sarcasm:        {}", if result.sarcasm { "yes" } else { "no" });
    println!("Sentiment:      {}", result.sentiment);
}

pub async fn health(app: &App) -> Result<()> {
    let status = app
        .inference
        .health()
        .await
        .with_context(|| format!("Analysis backend at {} is unreachable", app.config.api_url))?;

    match status.message {
        Some(message) => println!("{}: {} ({})", app.config.api_url, status.status, message),
        None => println!("{}: {}", app.config.api_url, status.status),
    }
    Ok(())
}
