// Job market dataset - records, columns and CSV export
//
// The table is a fixed literal: built once at startup, never mutated.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use std::path::Path;
use tracing::debug;

/// Default file name offered for the CSV download
pub const EXPORT_FILE_NAME: &str = "job_market_data.csv";

/// MIME type of the CSV download
pub const EXPORT_MIME: &str = "text/csv";

/// One row of the job market table
///
/// Field order is the CSV column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub year: i32,
    pub salary_min_cny: f64,
    pub salary_median_cny: f64,
    pub salary_max_cny: f64,
    pub experience_years: u32,
    pub demand_index: f64,
    pub job_openings: u32,
}

/// Column of the job market table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Column {
    #[serde(rename = "year")]
    Year,
    #[serde(rename = "salary_min_cny")]
    SalaryMin,
    #[serde(rename = "salary_median_cny")]
    SalaryMedian,
    #[serde(rename = "salary_max_cny")]
    SalaryMax,
    #[serde(rename = "experience_years")]
    ExperienceYears,
    #[serde(rename = "demand_index")]
    DemandIndex,
    #[serde(rename = "job_openings")]
    JobOpenings,
}

impl Column {
    pub const ALL: [Column; 7] = [
        Column::Year,
        Column::SalaryMin,
        Column::SalaryMedian,
        Column::SalaryMax,
        Column::ExperienceYears,
        Column::DemandIndex,
        Column::JobOpenings,
    ];

    /// Header name used in CSV output and chart bindings
    pub fn name(&self) -> &'static str {
        match self {
            Column::Year => "year",
            Column::SalaryMin => "salary_min_cny",
            Column::SalaryMedian => "salary_median_cny",
            Column::SalaryMax => "salary_max_cny",
            Column::ExperienceYears => "experience_years",
            Column::DemandIndex => "demand_index",
            Column::JobOpenings => "job_openings",
        }
    }

    /// Human readable axis label
    pub fn label(&self) -> &'static str {
        match self {
            Column::Year => "Year",
            Column::SalaryMin => "Minimum Salary (CNY)",
            Column::SalaryMedian => "Median Salary (CNY)",
            Column::SalaryMax => "Maximum Salary (CNY)",
            Column::ExperienceYears => "Experience (Years)",
            Column::DemandIndex => "Demand Index",
            Column::JobOpenings => "Job Openings",
        }
    }

    pub fn value(&self, record: &Record) -> f64 {
        match self {
            Column::Year => record.year as f64,
            Column::SalaryMin => record.salary_min_cny,
            Column::SalaryMedian => record.salary_median_cny,
            Column::SalaryMax => record.salary_max_cny,
            Column::ExperienceYears => record.experience_years as f64,
            Column::DemandIndex => record.demand_index,
            Column::JobOpenings => record.job_openings as f64,
        }
    }

    /// All values of this column, in row order
    pub fn values(&self, records: &[Record]) -> Vec<f64> {
        records.iter().map(|r| self.value(r)).collect()
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// SAMPLE DATA
// ============================================================================

/// The five-year cycle the sample table repeats
static SAMPLE_CYCLE: [Record; 5] = [
    Record {
        year: 2019,
        salary_min_cny: 6000.0,
        salary_median_cny: 9000.0,
        salary_max_cny: 14000.0,
        experience_years: 0,
        demand_index: 60.0,
        job_openings: 120,
    },
    Record {
        year: 2020,
        salary_min_cny: 6500.0,
        salary_median_cny: 9500.0,
        salary_max_cny: 15000.0,
        experience_years: 1,
        demand_index: 65.0,
        job_openings: 150,
    },
    Record {
        year: 2021,
        salary_min_cny: 7000.0,
        salary_median_cny: 10000.0,
        salary_max_cny: 16000.0,
        experience_years: 2,
        demand_index: 70.0,
        job_openings: 180,
    },
    Record {
        year: 2022,
        salary_min_cny: 7500.0,
        salary_median_cny: 11000.0,
        salary_max_cny: 17000.0,
        experience_years: 3,
        demand_index: 75.0,
        job_openings: 210,
    },
    Record {
        year: 2023,
        salary_min_cny: 8000.0,
        salary_median_cny: 12000.0,
        salary_max_cny: 18000.0,
        experience_years: 5,
        demand_index: 80.0,
        job_openings: 250,
    },
];

const SAMPLE_REPEATS: usize = 10;

/// Build the fixed 50-row sample table
pub fn sample_records() -> Vec<Record> {
    let records: Vec<Record> = (0..SAMPLE_REPEATS)
        .flat_map(|_| SAMPLE_CYCLE.iter().cloned())
        .collect();
    debug!(rows = records.len(), "sample table built");
    records
}

// ============================================================================
// CSV EXPORT
// ============================================================================

/// Serialize records as CSV with a header row
pub fn write_csv<W: io::Write>(writer: W, records: &[Record]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Serialize records to CSV bytes (the download payload)
pub fn to_csv(records: &[Record]) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    write_csv(&mut buf, records)?;
    Ok(buf)
}

/// Write the CSV export to a file
pub fn export_csv(path: &Path, records: &[Record]) -> Result<usize> {
    let file = std::fs::File::create(path)?;
    write_csv(io::BufWriter::new(file), records)?;
    debug!(path = %path.display(), rows = records.len(), "CSV export written");
    Ok(records.len())
}

/// Parse CSV text produced by `write_csv`
pub fn parse_csv<R: io::Read>(reader: R) -> Result<Vec<Record>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut records = Vec::new();
    for result in rdr.deserialize() {
        let record: Record = result?;
        records.push(record);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_table_shape() {
        let records = sample_records();
        assert_eq!(records.len(), 50);

        let years: Vec<i32> = records.iter().take(6).map(|r| r.year).collect();
        assert_eq!(years, vec![2019, 2020, 2021, 2022, 2023, 2019]);

        assert_eq!(records[4].experience_years, 5);
        assert_eq!(records[49], records[4]);
    }

    #[test]
    fn test_csv_header_in_field_order() {
        let csv = to_csv(&sample_records()).unwrap();
        let text = String::from_utf8(csv).unwrap();
        let header = text.lines().next().unwrap();

        let expected: Vec<&str> = Column::ALL.iter().map(|c| c.name()).collect();
        assert_eq!(header, expected.join(","));
        assert_eq!(text.lines().count(), 51);
    }

    #[test]
    fn test_csv_round_trip() {
        let records = sample_records();
        let csv = to_csv(&records).unwrap();

        let parsed = parse_csv(csv.as_slice()).unwrap();

        assert_eq!(parsed.len(), records.len());
        assert_eq!(parsed, records);
    }

    #[test]
    fn test_export_csv_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(EXPORT_FILE_NAME);

        let written = export_csv(&path, &sample_records()).unwrap();
        assert_eq!(written, 50);

        let file = std::fs::File::open(&path).unwrap();
        let parsed = parse_csv(file).unwrap();
        assert_eq!(parsed, sample_records());
    }

    #[test]
    fn test_parse_csv_rejects_malformed_rows() {
        let text = "year,salary_min_cny,salary_median_cny,salary_max_cny,experience_years,demand_index,job_openings\n\
                    2019,abc,9000,14000,0,60,120\n";
        assert!(parse_csv(text.as_bytes()).is_err());
    }

    #[test]
    fn test_column_access() {
        let record = &sample_records()[3];
        assert_eq!(Column::Year.value(record), 2022.0);
        assert_eq!(Column::SalaryMedian.value(record), 11000.0);
        assert_eq!(Column::JobOpenings.value(record), 210.0);
        assert_eq!(Column::DemandIndex.to_string(), "demand_index");
    }

    #[test]
    fn test_column_serializes_as_record_key() {
        let record = serde_json::to_value(&sample_records()[0]).unwrap();
        for column in Column::ALL {
            let json = serde_json::to_value(column).unwrap();
            assert_eq!(json, column.name());
            assert!(record.get(column.name()).is_some(), "{} is not a record key", column);
            assert_eq!(serde_json::from_value::<Column>(json).unwrap(), column);
        }
    }
}
