use shopinsight_db::InsightsRecordRow;

const STORE_COLUMN_WIDTH: usize = 40;

fn truncate(value: &str, max_chars: usize) -> String {
    if value.chars().count() > max_chars {
        format!("{}...", value.chars().take(max_chars - 3).collect::<String>())
    } else {
        value.to_string()
    }
}

fn history_line(row: &InsightsRecordRow) -> String {
    let status = if row.success { "ok" } else { "rejected" };
    format!(
        "{:<18}{:<42}{:<10}{:>8.2}s  {}",
        row.scraped_at.format("%Y-%m-%d %H:%M"),
        truncate(&row.store_url, STORE_COLUMN_WIDTH),
        status,
        row.processing_time_secs,
        row.store_name.as_deref().unwrap_or("\u{2014}"),
    )
}

/// Print stored analyses, newest first.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub(crate) async fn run_history(pool: &sqlx::PgPool, limit: i64, offset: i64) -> anyhow::Result<()> {
    let rows = shopinsight_db::list_insights_records(pool, limit, offset).await?;
    tracing::debug!(limit, offset, rows = rows.len(), "loaded history");

    if rows.is_empty() {
        println!("no stored analyses; run `analyze <url> --save` first");
        return Ok(());
    }

    println!(
        "{:<18}{:<42}{:<10}{:>9}  NAME",
        "SCRAPED", "STORE", "STATUS", "TIME"
    );
    for row in &rows {
        println!("{}", history_line(row));
    }

    Ok(())
}

/// Print totals over every stored analysis.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub(crate) async fn run_stats(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let stats = shopinsight_db::insights_stats(pool).await?;

    println!("total requests:      {}", stats.total_requests);
    println!("successful:          {}", stats.successful_requests);
    println!("failed:              {}", stats.failed_requests);
    println!("success rate:        {:.2}%", stats.success_rate_percent());
    println!(
        "avg processing time: {:.2}s",
        stats.average_processing_time_secs
    );

    Ok(())
}
