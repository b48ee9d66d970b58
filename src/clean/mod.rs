//! One-shot hygiene pass over a raw (company, round, price) table.
//!
//! Run offline before the dashboard: trims company names, extracts the integer round
//! from however the spreadsheet spelled it ("Round 3", "r3", "3"), coerces prices to
//! numeric, sorts by (round, company), reports missing (company, round) combinations,
//! and writes the table back in place.

use std::collections::HashSet;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

#[derive(Debug)]
pub enum CleanError {
    Csv(csv::Error),
    Io(std::io::Error),
    MissingColumn(String),
    InvalidRound(String),
    InvalidPrice(String),
}

impl std::error::Error for CleanError {}

impl core::fmt::Display for CleanError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            CleanError::Csv(err) => write!(f, "{err}"),
            CleanError::Io(err) => write!(f, "{err}"),
            CleanError::MissingColumn(column) => write!(f, "missing column {column}"),
            CleanError::InvalidRound(value) => write!(f, "no round number in {value:?}"),
            CleanError::InvalidPrice(value) => write!(f, "price {value:?} is not numeric"),
        }
    }
}

impl From<csv::Error> for CleanError {
    fn from(value: csv::Error) -> Self {
        CleanError::Csv(value)
    }
}

impl From<std::io::Error> for CleanError {
    fn from(value: std::io::Error) -> Self {
        CleanError::Io(value)
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct CleanRow {
    pub company: String,
    pub round: u32,
    pub price: f64,
}

#[derive(Clone, Debug)]
pub struct CleanReport {
    pub rows_in: usize,
    pub rows_out: usize,
    pub missing: Vec<(String, u32)>,
}

/// First run of digits in the field, wherever it sits.
fn leading_int(raw: &str) -> Option<u32> {
    let digits: String = raw
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

/// Reads the raw table, normalizes every row, and returns the rows sorted by
/// (round, company) along with the raw row count.
pub fn clean_reader<R: Read>(reader: R) -> Result<(Vec<CleanRow>, usize), CleanError> {
    let mut rdr = csv::Reader::from_reader(reader);
    let headers: Vec<String> = rdr
        .headers()?
        .iter()
        .map(|h| h.trim().to_lowercase())
        .collect();

    let company_col = headers
        .iter()
        .position(|h| h == "company")
        .ok_or_else(|| CleanError::MissingColumn("company".to_string()))?;
    let round_col = headers
        .iter()
        .position(|h| h == "round")
        .ok_or_else(|| CleanError::MissingColumn("round".to_string()))?;
    let price_col = headers
        .iter()
        .position(|h| h == "price")
        .ok_or_else(|| CleanError::MissingColumn("price".to_string()))?;

    let mut rows = Vec::new();
    let mut rows_in = 0;
    for record in rdr.records() {
        let record = record?;
        rows_in += 1;

        let company = record.get(company_col).unwrap_or("").trim().to_string();
        let raw_round = record.get(round_col).unwrap_or("").trim();
        let raw_price = record.get(price_col).unwrap_or("").trim();

        let round = leading_int(raw_round)
            .ok_or_else(|| CleanError::InvalidRound(raw_round.to_string()))?;
        let price = raw_price
            .parse::<f64>()
            .map_err(|_| CleanError::InvalidPrice(raw_price.to_string()))?;

        rows.push(CleanRow {
            company,
            round,
            price,
        });
    }

    rows.sort_by(|a, b| a.round.cmp(&b.round).then_with(|| a.company.cmp(&b.company)));
    Ok((rows, rows_in))
}

/// Every (company, round) combination absent from the cross product of observed
/// companies and observed rounds. Companies keep first-seen order, rounds are sorted.
pub fn missing_pairs(rows: &[CleanRow]) -> Vec<(String, u32)> {
    let mut companies = Vec::new();
    let mut rounds = Vec::new();
    let mut present = HashSet::new();
    for row in rows {
        if !companies.contains(&row.company) {
            companies.push(row.company.clone());
        }
        if !rounds.contains(&row.round) {
            rounds.push(row.round);
        }
        present.insert((row.company.as_str(), row.round));
    }
    rounds.sort_unstable();

    let mut missing = Vec::new();
    for company in &companies {
        for round in &rounds {
            if !present.contains(&(company.as_str(), *round)) {
                missing.push((company.clone(), *round));
            }
        }
    }
    missing
}

pub fn write_rows<W: Write>(writer: W, rows: &[CleanRow]) -> Result<(), CleanError> {
    let mut wtr = csv::Writer::from_writer(writer);
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Cleans the file in place and reports what happened.
pub fn clean_file(path: &Path) -> Result<CleanReport, CleanError> {
    let file = File::open(path)?;
    let (rows, rows_in) = clean_reader(file)?;
    let missing = missing_pairs(&rows);

    let out = File::create(path)?;
    write_rows(out, &rows)?;

    Ok(CleanReport {
        rows_in,
        rows_out: rows.len(),
        missing,
    })
}
