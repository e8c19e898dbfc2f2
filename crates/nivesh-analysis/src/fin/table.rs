//! Time-indexed financial statement tables
//!
//! A [`FinancialTable`] is a small table with one row per line item and one
//! column per reporting period, most recent period first (the order financial
//! data providers report statements in). All shaping the pipeline needs lives
//! here: truncation to recent periods, dropping incomplete rows, forward-fill
//! along the period axis, and unit conversion to crores.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Divisor from raw currency units to crores (1 crore = 1e7)
pub const CRORE_FACTOR: f64 = 1e-7;

/// One line item and its values per period, most recent first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Row {
    label: String,
    values: Vec<Option<f64>>,
}

/// A financial statement table (row = line item, column = period)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancialTable {
    /// Period labels, most recent first
    periods: Vec<String>,
    rows: Vec<Row>,
}

impl FinancialTable {
    /// Create an empty table with the given period labels, most recent first
    pub fn new(periods: Vec<String>) -> Self {
        Self {
            periods,
            rows: Vec::new(),
        }
    }

    /// Append a line item
    ///
    /// Values are per period, most recent first; shorter rows are padded with
    /// missing values.
    pub fn push_row(&mut self, label: impl Into<String>, mut values: Vec<Option<f64>>) {
        values.resize(self.periods.len(), None);
        self.rows.push(Row {
            label: label.into(),
            values,
        });
    }

    /// Period labels, most recent first
    pub fn periods(&self) -> &[String] {
        &self.periods
    }

    /// Line item labels in insertion order
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|r| r.label.as_str())
    }

    /// Values of the named line item, most recent first
    pub fn row(&self, label: &str) -> Option<&[Option<f64>]> {
        self.rows
            .iter()
            .find(|r| r.label == label)
            .map(|r| r.values.as_slice())
    }

    /// Most recent value of the named line item
    pub fn latest(&self, label: &str) -> Option<f64> {
        self.row(label).and_then(|values| *values.first()?)
    }

    /// True when the table has no rows or no periods
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.periods.is_empty()
    }

    /// Keep only the `n` most recent periods
    pub fn keep_recent(&mut self, n: usize) {
        if self.periods.len() > n {
            self.periods.truncate(n);
            for row in &mut self.rows {
                row.values.truncate(n);
            }
        }
    }

    /// Drop every row that has any missing value
    pub fn drop_incomplete_rows(&mut self) {
        self.rows.retain(|row| row.values.iter().all(Option::is_some));
    }

    /// Forward-fill missing values along the period axis
    ///
    /// Fills chronologically forward only: a gap takes the nearest preceding
    /// (older) value, never a following one, and a leading gap with no older
    /// value stays missing.
    pub fn forward_fill(&mut self) {
        for row in &mut self.rows {
            let mut carried: Option<f64> = None;
            // Columns are most-recent-first, so chronological order is reversed
            for value in row.values.iter_mut().rev() {
                match value {
                    Some(v) => carried = Some(*v),
                    None => *value = carried,
                }
            }
        }
    }

    /// Convert raw currency values to crores, annotating each row label
    pub fn to_crores(&mut self) {
        for row in &mut self.rows {
            for value in row.values.iter_mut().flatten() {
                *value *= CRORE_FACTOR;
            }
            row.label = format!("{} (in Crores.)", row.label);
        }
    }

    /// Period-over-period growth of the named line item
    ///
    /// Compares the most recent period to the immediately prior one. With a
    /// single period (or a missing/zero prior value) growth is not available.
    pub fn growth_rate(&self, label: &str) -> Option<f64> {
        let values = self.row(label)?;
        if values.len() < 2 {
            return None;
        }
        let latest = values[0]?;
        let prior = values[1]?;
        if prior == 0.0 {
            return None;
        }
        Some((latest - prior) / prior)
    }
}

impl fmt::Display for FinancialTable {
    /// Render as a plain-text table, aligned pandas-style
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label_width = self
            .rows
            .iter()
            .map(|r| r.label.len())
            .max()
            .unwrap_or(0);
        let value_width = 18;

        write!(f, "{:label_width$}", "")?;
        for period in &self.periods {
            write!(f, "{period:>value_width$}")?;
        }
        for row in &self.rows {
            write!(f, "\n{:<label_width$}", row.label)?;
            for value in &row.values {
                match value {
                    Some(v) => write!(f, "{v:>value_width$.2}")?,
                    None => write!(f, "{:>value_width$}", "NaN")?,
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> FinancialTable {
        FinancialTable::new(vec![
            "2024-03-31".to_string(),
            "2023-03-31".to_string(),
            "2022-03-31".to_string(),
        ])
    }

    #[test]
    fn test_keep_recent_truncates_older_periods() {
        let mut t = FinancialTable::new(
            (0..5).map(|i| format!("period-{i}")).collect(),
        );
        t.push_row("Total Revenue", vec![Some(5.0), Some(4.0), Some(3.0), Some(2.0), Some(1.0)]);

        t.keep_recent(3);
        assert_eq!(t.periods().len(), 3);
        assert_eq!(t.row("Total Revenue").unwrap(), &[Some(5.0), Some(4.0), Some(3.0)]);
    }

    #[test]
    fn test_drop_incomplete_rows() {
        let mut t = table();
        t.push_row("Complete", vec![Some(1.0), Some(2.0), Some(3.0)]);
        t.push_row("Gappy", vec![Some(1.0), None, Some(3.0)]);

        t.drop_incomplete_rows();
        assert!(t.row("Complete").is_some());
        assert!(t.row("Gappy").is_none());
    }

    #[test]
    fn test_forward_fill_propagates_preceding_value() {
        let mut t = table();
        // Chronologically: 2022 = 3.0, 2023 = missing, 2024 = missing
        t.push_row("Item", vec![None, None, Some(3.0)]);

        t.forward_fill();
        // The 2022 value carries forward into 2023 and 2024
        assert_eq!(t.row("Item").unwrap(), &[Some(3.0), Some(3.0), Some(3.0)]);
    }

    #[test]
    fn test_forward_fill_internal_gap_uses_older_value() {
        let mut t = table();
        // Chronologically: 2022 = 1.0, 2023 = missing, 2024 = 9.0
        t.push_row("Item", vec![Some(9.0), None, Some(1.0)]);

        t.forward_fill();
        // The gap takes the preceding (2022) value, not the following one
        assert_eq!(t.row("Item").unwrap(), &[Some(9.0), Some(1.0), Some(1.0)]);
    }

    #[test]
    fn test_forward_fill_never_fills_leading_gap() {
        let mut t = table();
        // Chronologically: 2022 = missing, 2023 = missing, 2024 = 7.0
        t.push_row("Item", vec![Some(7.0), None, None]);

        t.forward_fill();
        assert_eq!(t.row("Item").unwrap(), &[Some(7.0), None, None]);
    }

    #[test]
    fn test_to_crores_scales_and_relabels() {
        let mut t = table();
        t.push_row("Total Assets", vec![Some(2.5e10), Some(1.0e10), Some(5.0e9)]);

        t.to_crores();
        assert!(t.row("Total Assets").is_none());
        let values = t.row("Total Assets (in Crores.)").unwrap();
        assert!((values[0].unwrap() - 2500.0).abs() < 1e-9);
        assert!((values[2].unwrap() - 500.0).abs() < 1e-9);
    }

    #[test]
    fn test_growth_rate_two_periods() {
        let mut t = table();
        t.push_row("Total Revenue", vec![Some(120.0), Some(100.0), Some(80.0)]);

        let growth = t.growth_rate("Total Revenue").unwrap();
        assert!((growth - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_growth_rate_single_period_not_available() {
        let mut t = FinancialTable::new(vec!["2024-03-31".to_string()]);
        t.push_row("Total Revenue", vec![Some(120.0)]);

        assert!(t.growth_rate("Total Revenue").is_none());
    }

    #[test]
    fn test_growth_rate_missing_row() {
        let t = table();
        assert!(t.growth_rate("Net Income").is_none());
    }

    #[test]
    fn test_display_renders_aligned_rows() {
        let mut t = FinancialTable::new(vec!["2024-03-31".to_string()]);
        t.push_row("Total Assets (in Crores.)", vec![Some(1234.5)]);

        let rendered = t.to_string();
        assert!(rendered.contains("Total Assets (in Crores.)"));
        assert!(rendered.contains("1234.50"));
        assert!(rendered.contains("2024-03-31"));
    }

    #[test]
    fn test_short_rows_padded() {
        let mut t = table();
        t.push_row("Short", vec![Some(1.0)]);
        assert_eq!(t.row("Short").unwrap().len(), 3);
    }
}
