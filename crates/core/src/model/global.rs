use chrono::{DateTime, NaiveDate, Utc};
use std::collections::BTreeMap;

use crate::model::progress::StoredTimestamp;

/// Aggregate counters kept across sessions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalProgress {
    pub total_questions_seen: u64,
    pub total_reviews: u64,
    pub first_use: Option<NaiveDate>,
    pub last_session: Option<StoredTimestamp>,
    pub daily_log: BTreeMap<NaiveDate, u64>,
}

impl GlobalProgress {
    /// Fold one finished session into the totals.
    ///
    /// `newly_seen` counts questions answered for the first time ever.
    pub fn record_session(
        &mut self,
        questions_reviewed: u32,
        newly_seen: u32,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) {
        if self.first_use.is_none() {
            self.first_use = Some(today);
        }
        self.last_session = Some(StoredTimestamp::At(now));
        self.total_reviews = self
            .total_reviews
            .saturating_add(u64::from(questions_reviewed));
        self.total_questions_seen = self
            .total_questions_seen
            .saturating_add(u64::from(newly_seen));

        let entry = self.daily_log.entry(today).or_insert(0);
        *entry = entry.saturating_add(u64::from(questions_reviewed));
    }

    /// Most recent `limit` days of activity, newest first.
    #[must_use]
    pub fn recent_activity(&self, limit: usize) -> Vec<(NaiveDate, u64)> {
        self.daily_log
            .iter()
            .rev()
            .take(limit)
            .map(|(day, count)| (*day, *count))
            .collect()
    }
}
