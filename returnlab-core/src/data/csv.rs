//! Wide-CSV ingestion and export.
//!
//! Input tables look like `Date,VWCE.MI,SWDA.MI` with ISO dates. The loader
//! is deliberately lenient: unparsable or empty date cells become missing
//! dates (the resampler discards those rows) and empty price cells become
//! missing values. Structural validation — including the presence of the
//! `Date` column — belongs to the resampler.

use std::io::{Read, Write};

use chrono::NaiveDate;

use crate::data::DataError;
use crate::domain::{DailyPriceTable, RawRow, RawTable, ReturnObservation, DATE_COLUMN};

/// Load a wide price table. The header row becomes the column list.
///
/// # Errors
/// [`DataError::Csv`] on malformed CSV framing or I/O failure.
pub fn load_csv<R: Read>(reader: R) -> Result<RawTable, DataError> {
    let mut rdr = csv::Reader::from_reader(reader);
    let columns: Vec<String> = rdr
        .headers()
        .map_err(|e| DataError::Csv(e.to_string()))?
        .iter()
        .map(str::to_string)
        .collect();
    let date_index = columns.iter().position(|c| c == DATE_COLUMN);

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record.map_err(|e| DataError::Csv(e.to_string()))?;
        let mut row = RawRow::default();
        for (i, field) in record.iter().enumerate() {
            let field = field.trim();
            if Some(i) == date_index {
                row.date = NaiveDate::parse_from_str(field, "%Y-%m-%d").ok();
            } else if let (Some(name), Ok(value)) = (columns.get(i), field.parse::<f64>()) {
                row.values.insert(name.clone(), value);
            }
        }
        rows.push(row);
    }

    Ok(RawTable { columns, rows })
}

/// Write a dense table as `Date,SYM,...` CSV. Non-finite values become
/// empty cells.
///
/// # Errors
/// [`DataError::Csv`] on write failure.
pub fn write_table_csv<W: Write>(writer: W, table: &DailyPriceTable) -> Result<(), DataError> {
    let csv_err = |e: csv::Error| DataError::Csv(e.to_string());
    let mut wtr = csv::Writer::from_writer(writer);

    let mut header = vec![DATE_COLUMN.to_string()];
    header.extend(table.symbols().iter().cloned());
    wtr.write_record(&header).map_err(csv_err)?;

    for (i, date) in table.dates().iter().enumerate() {
        let mut record = vec![date.format("%Y-%m-%d").to_string()];
        for symbol in table.symbols() {
            let value = table
                .column(symbol)
                .and_then(|column| column.get(i))
                .copied()
                .unwrap_or(f64::NAN);
            record.push(if value.is_finite() {
                value.to_string()
            } else {
                String::new()
            });
        }
        wtr.write_record(&record).map_err(csv_err)?;
    }

    wtr.flush().map_err(|e| DataError::Csv(e.to_string()))
}

/// Write rolling returns as `Date,Symbol,Return` CSV.
///
/// # Errors
/// [`DataError::Csv`] on write failure.
pub fn write_returns_csv<W: Write>(
    writer: W,
    returns: &[ReturnObservation],
) -> Result<(), DataError> {
    let csv_err = |e: csv::Error| DataError::Csv(e.to_string());
    let mut wtr = csv::Writer::from_writer(writer);

    wtr.write_record([DATE_COLUMN, "Symbol", "Return"])
        .map_err(csv_err)?;
    for obs in returns {
        wtr.write_record([
            obs.date.format("%Y-%m-%d").to_string(),
            obs.symbol.clone(),
            if obs.ret.is_finite() {
                obs.ret.to_string()
            } else {
                String::new()
            },
        ])
        .map_err(csv_err)?;
    }

    wtr.flush().map_err(|e| DataError::Csv(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeseries::resample;

    #[test]
    fn loads_a_wide_table() {
        let input = "Date,A,B\n2020-01-01,100,200\n2020-01-03,110,220\n";
        let table = load_csv(input.as_bytes()).unwrap();

        assert_eq!(table.columns, ["Date", "A", "B"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(
            table.rows[0].date,
            NaiveDate::from_ymd_opt(2020, 1, 1)
        );
        assert_eq!(table.rows[1].values["B"], 220.0);
    }

    #[test]
    fn empty_cells_become_missing_values() {
        let input = "Date,A,B\n2020-01-01,100,\n,5,6\n";
        let table = load_csv(input.as_bytes()).unwrap();

        assert!(!table.rows[0].values.contains_key("B"));
        assert_eq!(table.rows[1].date, None);
    }

    #[test]
    fn table_without_date_column_loads_but_fails_resampling() {
        let input = "A,B\n100,200\n";
        let table = load_csv(input.as_bytes()).unwrap();
        assert!(resample(&table).is_err());
    }

    #[test]
    fn table_roundtrips_through_export() {
        let input = "Date,A,B\n2020-01-01,100,200\n2020-01-02,110,220\n";
        let dense = resample(&load_csv(input.as_bytes()).unwrap()).unwrap();

        let mut out = Vec::new();
        write_table_csv(&mut out, &dense).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), input);
    }

    #[test]
    fn returns_export_has_one_row_per_observation() {
        let returns = vec![ReturnObservation {
            date: NaiveDate::from_ymd_opt(2020, 1, 3).unwrap(),
            symbol: "A".to_string(),
            ret: 0.1,
        }];
        let mut out = Vec::new();
        write_returns_csv(&mut out, &returns).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Date,Symbol,Return\n2020-01-03,A,0.1\n"
        );
    }
}
