//! Per-advertiser aggregate queries backing the summary endpoint.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::DbError;

/// Aggregate counts and date bounds for one advertiser's ads.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AdvertiserStatsRow {
    pub advertiser_id: String,
    pub total_ads: i64,
    pub active_ads: i64,
    pub inactive_ads: i64,
    /// Mean `total_active_time` in whole days; `0` when the advertiser has no ads.
    pub average_duration_days: i64,
    pub first_start_date: Option<DateTime<Utc>>,
    pub last_end_date: Option<DateTime<Utc>>,
}

/// Number of ads that started in one calendar month.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MonthlyStartsRow {
    /// `YYYY-MM`, UTC.
    pub month: String,
    pub ads: i64,
}

/// Computes summary stats over every ad the advertiser owns.
///
/// An advertiser without ads yields zero counts and `None` dates rather
/// than [`DbError::NotFound`]; callers check existence separately.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_advertiser_stats(
    pool: &PgPool,
    advertiser_id: &str,
) -> Result<AdvertiserStatsRow, DbError> {
    let row = sqlx::query_as::<_, AdvertiserStatsRow>(
        "SELECT $1::text AS advertiser_id, \
                COUNT(*) AS total_ads, \
                COUNT(*) FILTER (WHERE is_active) AS active_ads, \
                COUNT(*) FILTER (WHERE NOT is_active) AS inactive_ads, \
                COALESCE(ROUND(AVG(total_active_time) / 86400.0), 0)::bigint \
                    AS average_duration_days, \
                MIN(start_date) AS first_start_date, \
                MAX(end_date) AS last_end_date \
         FROM ads \
         WHERE advertiser_id = $1",
    )
    .bind(advertiser_id)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Counts the advertiser's ads by the UTC month of `start_date`, oldest first.
///
/// Months with no starts are omitted.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_advertiser_monthly_starts(
    pool: &PgPool,
    advertiser_id: &str,
) -> Result<Vec<MonthlyStartsRow>, DbError> {
    let rows = sqlx::query_as::<_, MonthlyStartsRow>(
        "SELECT to_char(date_trunc('month', start_date AT TIME ZONE 'UTC'), 'YYYY-MM') AS month, \
                COUNT(*) AS ads \
         FROM ads \
         WHERE advertiser_id = $1 \
         GROUP BY 1 \
         ORDER BY 1",
    )
    .bind(advertiser_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
