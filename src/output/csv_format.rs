//! CSV output formatting.

use crate::scanner::ScanReport;
use std::io::{self, Write};

/// Write one row per result: `port,status,banner`.
pub fn write_csv<W: Write>(out: &mut W, report: &ScanReport) -> io::Result<()> {
    let mut wtr = csv::Writer::from_writer(out);

    wtr.write_record(["port", "status", "banner"])?;

    for result in &report.results {
        let banner = result
            .banner
            .as_ref()
            .map(|b| b.to_lossy_string())
            .unwrap_or_default();
        wtr.write_record([result.port.to_string(), result.status.to_string(), banner])?;
    }

    wtr.flush()?;
    Ok(())
}
