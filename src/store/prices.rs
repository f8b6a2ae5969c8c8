//! Price table operations: the per-tick upsert batch and the read paths the
//! query service is built on.

use rusqlite::params;
use crate::error::Result;
use crate::store::Store;
use crate::types::quote::{CombinedRecord, PriceQuote};
use crate::types::source::Source;
use crate::utils::helper::current_timestamp;

impl Store {
    /// Persist one reconciliation tick: upsert every combined record into all
    /// three source tables inside a single transaction, so a reader never
    /// observes a half-updated tick. Existing rows keep their id; price and
    /// timestamp are overwritten.
    pub fn upsert_tick(&self, records: &[CombinedRecord]) -> Result<()> {
        let now = current_timestamp() as i64;
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        for record in records {
            for source in Source::ALL {
                let sql = format!(
                    "INSERT INTO {} (currency, price, timestamp) VALUES (?1, ?2, ?3)
                     ON CONFLICT(currency) DO UPDATE SET
                        price = excluded.price,
                        timestamp = excluded.timestamp",
                    source.table()
                );
                tx.execute(&sql, params![record.currency, record.price(source), now])?;
            }
        }

        tx.commit()?;
        Ok(())
    }

    /// All rows of one source table, in priority-list insertion order.
    pub fn list_quotes(&self, source: Source) -> Result<Vec<PriceQuote>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT currency, price, timestamp FROM {} ORDER BY id",
            source.table()
        ))?;
        let rows = stmt.query_map([], |row| {
            Ok(PriceQuote {
                currency: row.get(0)?,
                price: row.get(1)?,
                timestamp: row.get(2)?,
            })
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    /// Latest quote for a currency under one source. Currency matching is
    /// case-insensitive; rows are superseded in place so "latest" is the row
    /// with the newest timestamp.
    pub fn latest_quote(&self, source: Source, currency: &str) -> Result<Option<PriceQuote>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT currency, price, timestamp FROM {}
             WHERE currency = ?1 COLLATE NOCASE
             ORDER BY timestamp DESC LIMIT 1",
            source.table()
        ))?;
        let mut rows = stmt.query_map(params![currency], |row| {
            Ok(PriceQuote {
                currency: row.get(0)?,
                price: row.get(1)?,
                timestamp: row.get(2)?,
            })
        })?;
        rows.next().transpose().map_err(Into::into)
    }

    /// (currency, price) rows of one source table with min <= price <= max.
    pub fn quotes_in_range(
        &self,
        source: Source,
        min_price: f64,
        max_price: f64,
    ) -> Result<Vec<(String, f64)>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT currency, price FROM {} WHERE price >= ?1 AND price <= ?2",
            source.table()
        ))?;
        let rows = stmt.query_map(params![min_price, max_price], |row| {
            Ok((row.get(0)?, row.get(1)?))
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    /// The `limit` highest-priced rows across all three tables combined. A
    /// currency can appear once per source; no deduplication.
    pub fn top_quotes(&self, limit: usize) -> Result<Vec<(String, f64, Source)>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT currency, price, 'vbr' AS source FROM vbr_prices
             UNION ALL
             SELECT currency, price, 'investing' AS source FROM investing_prices
             UNION ALL
             SELECT currency, price, 'bitinfo' AS source FROM bitinfo_prices
             ORDER BY price DESC LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok((row.get::<_, String>(0)?, row.get(1)?, row.get::<_, String>(2)?))
        })?;
        let mut quotes = Vec::new();
        for row in rows {
            let (currency, price, key) = row?;
            // The key column is one of our own literals, so the parse cannot
            // fail unless the SQL above changes.
            let source: Source = key.parse().expect("source literal");
            quotes.push((currency, price, source));
        }
        Ok(quotes)
    }
}
