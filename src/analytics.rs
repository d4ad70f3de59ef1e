//! Analytics - Serie giornaliere su finestra mobile
//!
//! Le query aggregate restituiscono solo i giorni che hanno righe; qui le
//! riallineiamo su una finestra continua di N giorni che termina oggi,
//! dal più vecchio al più recente, riempiendo con zero i giorni mancanti.

use chrono::{Days, NaiveDate};
use std::collections::HashMap;

pub const DEFAULT_WINDOW_DAYS: u32 = 30;
pub const MAX_WINDOW_DAYS: u32 = 365;

#[derive(Debug, Clone, PartialEq)]
pub struct TrailingWindow {
    days: Vec<NaiveDate>,
}

impl TrailingWindow {
    /// Finestra di `len` giorni che termina `today` (incluso).
    /// `len` viene forzato almeno a 1.
    pub fn ending_on(today: NaiveDate, len: u32) -> Self {
        let len = len.max(1) as u64;
        let days = (0..len)
            .rev()
            .filter_map(|offset| today.checked_sub_days(Days::new(offset)))
            .collect();
        Self { days }
    }

    pub fn days(&self) -> &[NaiveDate] {
        &self.days
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Primo giorno della finestra, da usare come limite inferiore nelle query
    pub fn start(&self) -> Option<NaiveDate> {
        self.days.first().copied()
    }

    pub fn end(&self) -> Option<NaiveDate> {
        self.days.last().copied()
    }

    /// Etichette del grafico nel formato `MM-DD`
    pub fn labels(&self) -> Vec<String> {
        self.days
            .iter()
            .map(|d| d.format("%m-%d").to_string())
            .collect()
    }

    pub fn iso_dates(&self) -> Vec<String> {
        self.days
            .iter()
            .map(|d| d.format("%Y-%m-%d").to_string())
            .collect()
    }

    /// Allinea le coppie (giorno, valore) alla finestra: i giorni senza righe
    /// valgono 0, le righe fuori finestra vengono scartate, righe duplicate
    /// per lo stesso giorno vengono sommate.
    pub fn fill<I>(&self, rows: I) -> Vec<i64>
    where
        I: IntoIterator<Item = (NaiveDate, i64)>,
    {
        let mut by_day: HashMap<NaiveDate, i64> = HashMap::with_capacity(self.days.len());
        for (day, amount) in rows {
            *by_day.entry(day).or_insert(0) += amount;
        }
        self.days
            .iter()
            .map(|d| by_day.get(d).copied().unwrap_or(0))
            .collect()
    }
}

/// Media arrotondata a due decimali, 0 se non ci sono tentativi
pub fn rounded_average(total: i64, count: i64) -> f64 {
    if count <= 0 {
        return 0.0;
    }
    let avg = total as f64 / count as f64;
    (avg * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_window_is_oldest_first_and_ends_today() {
        let today = day(2025, 3, 10);
        let window = TrailingWindow::ending_on(today, 30);
        assert_eq!(window.len(), 30);
        assert_eq!(window.end(), Some(today));
        assert_eq!(window.start(), Some(day(2025, 2, 9)));
        assert!(window.days().windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_window_crosses_year_boundary() {
        let window = TrailingWindow::ending_on(day(2025, 1, 2), 4);
        assert_eq!(window.labels(), vec!["12-30", "12-31", "01-01", "01-02"]);
        assert_eq!(window.iso_dates()[0], "2024-12-30");
    }

    #[test]
    fn test_zero_length_becomes_single_day() {
        let window = TrailingWindow::ending_on(day(2025, 3, 10), 0);
        assert_eq!(window.len(), 1);
        assert_eq!(window.start(), window.end());
    }

    #[test]
    fn test_fill_zeroes_missing_and_ignores_outside() {
        let window = TrailingWindow::ending_on(day(2025, 3, 10), 5);
        let series = window.fill(vec![
            (day(2025, 3, 10), 12),
            (day(2025, 3, 7), 3),
            (day(2025, 3, 7), 2),
            (day(2025, 1, 1), 100),
            (day(2025, 3, 11), 50),
        ]);
        assert_eq!(series, vec![0, 5, 0, 0, 12]);
    }

    #[test]
    fn test_fill_empty_rows() {
        let window = TrailingWindow::ending_on(day(2025, 3, 10), 3);
        assert_eq!(window.fill(Vec::new()), vec![0, 0, 0]);
    }

    #[test]
    fn test_rounded_average() {
        assert_eq!(rounded_average(145, 2), 72.5);
        assert_eq!(rounded_average(100, 3), 33.33);
        assert_eq!(rounded_average(0, 0), 0.0);
    }
}
