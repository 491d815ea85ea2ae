use clap::Args;
use receipt_points::error::AppError;
use receipt_points::receipts::{validate_receipt, PointsBreakdown, PointsEngine, Receipt};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// Path to a receipt JSON document
    pub(crate) path: PathBuf,
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let raw = std::fs::read(&args.path)?;
    let receipt: Receipt = serde_json::from_slice(&raw)?;
    print!("{}", render_score(&receipt));
    Ok(())
}

pub(crate) fn render_score(receipt: &Receipt) -> String {
    let failures = validate_receipt(receipt);
    if !failures.is_empty() {
        let mut out = format!("Receipt rejected ({} failure(s))\n", failures.len());
        for failure in &failures {
            out.push_str(&format!("- {failure}\n"));
        }
        return out;
    }

    match PointsEngine::new().score(receipt) {
        Ok(breakdown) => render_breakdown(receipt, &breakdown),
        Err(err) => format!("Receipt could not be scored: {err}\n"),
    }
}

fn render_breakdown(receipt: &Receipt, breakdown: &PointsBreakdown) -> String {
    let mut out = format!(
        "{} on {} at {}: {} point(s)\n",
        receipt.retailer.trim(),
        receipt.purchase_date,
        receipt.purchase_time,
        breakdown.total
    );
    for component in &breakdown.components {
        out.push_str(&format!(
            "- {:<34} {:>5}  {}\n",
            component.rule.label(),
            component.points,
            component.notes
        ));
    }
    out
}
