//! CSV security universe adapter.
//!
//! Expected header:
//! `code,name,industry,mcap_yi,pe,turnover_pct,price,change_pct,ma5_up,break_20d,rsi_rebound,region,concepts`
//! with concepts separated by `|`.

use crate::domain::error::StockdeskError;
use crate::domain::security::{self, Profile, Security, TechFlags};
use crate::ports::security_port::SecurityPort;
use std::fs;
use std::path::Path;

const COLUMNS: [&str; 13] = [
    "code",
    "name",
    "industry",
    "mcap_yi",
    "pe",
    "turnover_pct",
    "price",
    "change_pct",
    "ma5_up",
    "break_20d",
    "rsi_rebound",
    "region",
    "concepts",
];

pub struct CsvSecurityAdapter {
    securities: Vec<Security>,
}

impl CsvSecurityAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, StockdeskError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| StockdeskError::Csv {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;
        Self::from_reader(content.as_bytes())
    }

    pub fn from_reader<R: std::io::Read>(reader: R) -> Result<Self, StockdeskError> {
        let mut rdr = csv::Reader::from_reader(reader);
        let mut securities = Vec::new();

        for (line, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| StockdeskError::Csv {
                reason: format!("CSV parse error: {}", e),
            })?;
            // header is row 1
            securities.push(parse_record(&record, line + 2)?);
        }

        Ok(Self { securities })
    }

    pub fn len(&self) -> usize {
        self.securities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.securities.is_empty()
    }
}

fn text<'r>(record: &'r csv::StringRecord, idx: usize, row: usize) -> Result<&'r str, StockdeskError> {
    record
        .get(idx)
        .map(str::trim)
        .ok_or_else(|| StockdeskError::Csv {
            reason: format!("row {}: missing {} column", row, COLUMNS[idx]),
        })
}

fn number(record: &csv::StringRecord, idx: usize, row: usize) -> Result<f64, StockdeskError> {
    let raw = text(record, idx, row)?;
    raw.parse().map_err(|e| StockdeskError::Csv {
        reason: format!("row {}: invalid {} value {:?}: {}", row, COLUMNS[idx], raw, e),
    })
}

fn flag(record: &csv::StringRecord, idx: usize, row: usize) -> Result<bool, StockdeskError> {
    match text(record, idx, row)?.to_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" | "" => Ok(false),
        other => Err(StockdeskError::Csv {
            reason: format!("row {}: invalid {} flag {:?}", row, COLUMNS[idx], other),
        }),
    }
}

fn parse_record(record: &csv::StringRecord, row: usize) -> Result<Security, StockdeskError> {
    let code = text(record, 0, row)?;
    if code.is_empty() {
        return Err(StockdeskError::Csv {
            reason: format!("row {}: empty code", row),
        });
    }
    let concepts = record
        .get(12)
        .map(|c| {
            c.split('|')
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    Ok(Security {
        code: code.to_string(),
        name: text(record, 1, row)?.to_string(),
        industry: text(record, 2, row)?.to_string(),
        mcap_yi: number(record, 3, row)?,
        pe: number(record, 4, row)?,
        turnover_pct: number(record, 5, row)?,
        price: number(record, 6, row)?,
        change_pct: number(record, 7, row)?,
        tech: TechFlags {
            ma5_up: flag(record, 8, row)?,
            break_20d: flag(record, 9, row)?,
            rsi_rebound: flag(record, 10, row)?,
        },
        profile: Profile {
            region: record.get(11).map(str::trim).unwrap_or_default().to_string(),
            concepts,
        },
    })
}

impl SecurityPort for CsvSecurityAdapter {
    fn list_securities(&self) -> Result<Vec<Security>, StockdeskError> {
        Ok(self.securities.clone())
    }

    fn search(&self, query: &str) -> Result<Vec<Security>, StockdeskError> {
        Ok(security::search(&self.securities, query)
            .into_iter()
            .cloned()
            .collect())
    }

    fn get_security(&self, code: &str) -> Result<Option<Security>, StockdeskError> {
        Ok(security::find_by_code(&self.securities, code).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const HEADER: &str = "code,name,industry,mcap_yi,pe,turnover_pct,price,change_pct,ma5_up,break_20d,rsi_rebound,region,concepts\n";

    fn write_csv(body: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}{}", HEADER, body).unwrap();
        file
    }

    #[test]
    fn loads_rows() {
        let file = write_csv(
            "600519,贵州茅台,白酒,22000,30.5,0.8,1688.2,1.12,1,0,0,贵州,消费|高端\n\
             300750,宁德时代,新能源,7200,21.8,2.3,178.6,-0.85,false,false,true,福建,电池|储能\n",
        );
        let adapter = CsvSecurityAdapter::from_file(file.path()).unwrap();
        assert_eq!(adapter.len(), 2);

        let moutai = adapter.get_security("600519").unwrap().unwrap();
        assert_eq!(moutai.name, "贵州茅台");
        assert!(moutai.tech.ma5_up);
        assert_eq!(moutai.profile.concepts, vec!["消费", "高端"]);

        let catl = adapter.get_security("300750").unwrap().unwrap();
        assert!(catl.tech.rsi_rebound);
        assert_eq!(catl.change_pct, -0.85);
    }

    #[test]
    fn search_uses_concepts() {
        let file = write_csv("300750,宁德时代,新能源,7200,21.8,2.3,178.6,-0.85,0,0,1,福建,电池|储能\n");
        let adapter = CsvSecurityAdapter::from_file(file.path()).unwrap();
        assert_eq!(adapter.search("储能").unwrap().len(), 1);
        assert!(adapter.search("白酒").unwrap().is_empty());
    }

    #[test]
    fn empty_concepts_column() {
        let file = write_csv("601318,中国平安,保险,7400,8.6,1.4,41.22,0.32,0,0,0,深圳,\n");
        let adapter = CsvSecurityAdapter::from_file(file.path()).unwrap();
        let s = adapter.get_security("601318").unwrap().unwrap();
        assert!(s.profile.concepts.is_empty());
    }

    #[test]
    fn bad_number_reports_row_and_column() {
        let file = write_csv("601318,中国平安,保险,7400,n/a,1.4,41.22,0.32,0,0,0,深圳,金融\n");
        let err = CsvSecurityAdapter::from_file(file.path()).err().unwrap();
        match err {
            StockdeskError::Csv { reason } => {
                assert!(reason.contains("row 2"), "{reason}");
                assert!(reason.contains("pe"), "{reason}");
            }
            other => panic!("expected Csv error, got {other}"),
        }
    }

    #[test]
    fn bad_flag_fails() {
        let file = write_csv("601318,中国平安,保险,7400,8.6,1.4,41.22,0.32,maybe,0,0,深圳,金融\n");
        assert!(matches!(
            CsvSecurityAdapter::from_file(file.path()),
            Err(StockdeskError::Csv { .. })
        ));
    }

    #[test]
    fn missing_file_is_csv_error() {
        let result = CsvSecurityAdapter::from_file("/nonexistent/stocks.csv");
        assert!(matches!(result, Err(StockdeskError::Csv { .. })));
    }
}
