//! Loads the master price table and the team roster from CSV.
//!
//! Both loaders are fatal at startup: the session never runs with an unset price table
//! or an empty ledger. Column lookup is by trimmed, lowercased header name so the files
//! survive the usual spreadsheet-export whitespace.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::input::price_table::{PriceTable, PriceTableBuilder};
use crate::input::roster::Roster;

#[derive(Debug)]
pub enum SourceError {
    Csv(csv::Error),
    Io(std::io::Error),
    MissingColumn(String),
    InvalidValue { column: String, value: String },
    EmptySource,
}

impl std::error::Error for SourceError {}

impl core::fmt::Display for SourceError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            SourceError::Csv(err) => write!(f, "{err}"),
            SourceError::Io(err) => write!(f, "{err}"),
            SourceError::MissingColumn(column) => write!(f, "missing column {column}"),
            SourceError::InvalidValue { column, value } => {
                write!(f, "invalid value {value:?} in column {column}")
            }
            SourceError::EmptySource => write!(f, "source contains no rows"),
        }
    }
}

impl From<csv::Error> for SourceError {
    fn from(value: csv::Error) -> Self {
        SourceError::Csv(value)
    }
}

impl From<std::io::Error> for SourceError {
    fn from(value: std::io::Error) -> Self {
        SourceError::Io(value)
    }
}

fn column_position(headers: &[String], name: &str) -> Result<usize, SourceError> {
    headers
        .iter()
        .position(|h| h == name)
        .ok_or_else(|| SourceError::MissingColumn(name.to_string()))
}

fn parse_int(record: &csv::StringRecord, idx: usize, column: &str) -> Result<i64, SourceError> {
    let raw = record.get(idx).unwrap_or("").trim();
    raw.parse::<i64>().map_err(|_| SourceError::InvalidValue {
        column: column.to_string(),
        value: raw.to_string(),
    })
}

/// Master table format: a `company` column, a `base_price` column, and one `rN` column
/// per round, one row per company. Missing round columns are not an error here; lookups
/// for them fail later with a price error.
pub fn from_master_reader<R: Read>(reader: R) -> Result<PriceTable, SourceError> {
    let mut rdr = csv::Reader::from_reader(reader);
    let headers: Vec<String> = rdr
        .headers()?
        .iter()
        .map(|h| h.trim().to_lowercase())
        .collect();

    let company_col = column_position(&headers, "company")?;
    let base_col = column_position(&headers, "base_price")?;

    let mut round_cols = Vec::new();
    for (idx, header) in headers.iter().enumerate() {
        if let Some(rest) = header.strip_prefix('r') {
            if let Ok(round) = rest.parse::<u8>() {
                round_cols.push((idx, round));
            }
        }
    }

    let mut builder = PriceTableBuilder::new();
    let mut rows = 0;
    for record in rdr.records() {
        let record = record?;
        let company = record.get(company_col).unwrap_or("").trim().to_string();
        if company.is_empty() {
            continue;
        }
        builder.add_base_price(company.as_str(), parse_int(&record, base_col, "base_price")?);
        for (idx, round) in &round_cols {
            let price = parse_int(&record, *idx, &headers[*idx])?;
            builder.add_price(company.as_str(), *round, price);
        }
        rows += 1;
    }

    if rows == 0 {
        return Err(SourceError::EmptySource);
    }
    Ok(builder.build())
}

pub fn from_master_csv(path: &Path) -> Result<PriceTable, SourceError> {
    let file = File::open(path)?;
    from_master_reader(file)
}

/// Roster format: `team_id` and `cash` columns, one row per team.
pub fn from_teams_reader<R: Read>(reader: R) -> Result<Roster, SourceError> {
    let mut rdr = csv::Reader::from_reader(reader);
    let headers: Vec<String> = rdr
        .headers()?
        .iter()
        .map(|h| h.trim().to_lowercase())
        .collect();

    let team_col = column_position(&headers, "team_id")?;
    let cash_col = column_position(&headers, "cash")?;

    let mut roster = Roster::new();
    for record in rdr.records() {
        let record = record?;
        let team_id = record.get(team_col).unwrap_or("").trim().to_string();
        if team_id.is_empty() {
            continue;
        }
        roster.add_team(team_id, parse_int(&record, cash_col, "cash")?);
    }

    if roster.is_empty() {
        return Err(SourceError::EmptySource);
    }
    Ok(roster)
}

pub fn from_teams_csv(path: &Path) -> Result<Roster, SourceError> {
    let file = File::open(path)?;
    from_teams_reader(file)
}

#[cfg(test)]
mod tests {
    use super::{from_master_reader, from_teams_reader, SourceError};

    #[test]
    fn test_that_master_csv_loads_base_and_round_prices() {
        let csv = "company,base_price,r1,r2\nAcme,100,110,120\nBolt,50,55,60\n";

        let table = from_master_reader(csv.as_bytes()).unwrap();

        assert_eq!(table.companies(), &["Acme".to_string(), "Bolt".to_string()]);
        assert_eq!(table.price_at("Acme", 0).unwrap(), 100);
        assert_eq!(table.price_at("Bolt", 2).unwrap(), 60);
    }

    #[test]
    fn test_that_headers_and_company_names_are_trimmed() {
        let csv = " Company , base_price , R1 \n  Acme  ,100,110\n";

        let table = from_master_reader(csv.as_bytes()).unwrap();

        assert!(table.has_company("Acme"));
        assert_eq!(table.price_at("Acme", 1).unwrap(), 110);
    }

    #[test]
    fn test_that_missing_company_column_fails() {
        let csv = "name,base_price\nAcme,100\n";

        assert!(matches!(
            from_master_reader(csv.as_bytes()),
            Err(SourceError::MissingColumn(_))
        ));
    }

    #[test]
    fn test_that_garbage_price_fails_loudly() {
        let csv = "company,base_price,r1\nAcme,100,oops\n";

        assert!(matches!(
            from_master_reader(csv.as_bytes()),
            Err(SourceError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_that_empty_master_table_is_fatal() {
        let csv = "company,base_price\n";

        assert!(matches!(
            from_master_reader(csv.as_bytes()),
            Err(SourceError::EmptySource)
        ));
    }

    #[test]
    fn test_that_roster_loads_teams_in_order() {
        let csv = "team_id,cash\nT1,10000\nT2,10000\n";

        let roster = from_teams_reader(csv.as_bytes()).unwrap();

        assert_eq!(roster.len(), 2);
        assert_eq!(roster.entries()[0].team_id, "T1");
        assert_eq!(roster.entries()[0].cash, 10_000);
    }

    #[test]
    fn test_that_empty_roster_is_fatal() {
        let csv = "team_id,cash\n";

        assert!(matches!(
            from_teams_reader(csv.as_bytes()),
            Err(SourceError::EmptySource)
        ));
    }
}
