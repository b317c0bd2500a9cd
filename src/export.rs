use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use log::info;
use serde::Serialize;

/// Write `report` as JSON to `path`, or to stdout when no path is given.
pub fn write_json<T: Serialize>(report: &T, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            let mut w = BufWriter::new(file);
            serde_json::to_writer(&mut w, report).context("failed to serialize report")?;
            w.flush()?;
            info!("report written to {}", path.display());
        }
        None => {
            let stdout = io::stdout();
            let mut w = BufWriter::new(stdout.lock());
            serde_json::to_writer(&mut w, report).context("failed to serialize report")?;
            writeln!(w)?;
            w.flush()?;
        }
    }
    Ok(())
}

/// CSV with one row per sensor: `sensor,t0,t1,...`.
pub fn write_signal_csv<W: Write>(w: &mut W, rows: &[Vec<f64>]) -> Result<()> {
    let n_times = rows.first().map(|r| r.len()).unwrap_or(0);
    write!(w, "sensor")?;
    for t in 0..n_times {
        write!(w, ",t{t}")?;
    }
    writeln!(w)?;
    for (sensor, row) in rows.iter().enumerate() {
        write!(w, "{sensor}")?;
        for v in row {
            write!(w, ",{v:e}")?;
        }
        writeln!(w)?;
    }
    Ok(())
}

pub fn save_signal_csv(path: &Path, rows: &[Vec<f64>]) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut w = BufWriter::new(file);
    write_signal_csv(&mut w, rows)?;
    w.flush()?;
    info!("signal csv written to {} ({} sensors)", path.display(), rows.len());
    Ok(())
}
