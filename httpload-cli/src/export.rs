use httpload_common::{RatePoint, Sample, Summary};
use httpload_engine::{RunReport, TestConfig};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Everything an external plotter needs: the run's latency-over-time data and
/// the requested rate curve.
#[derive(Serialize)]
pub struct Export<'a> {
    pub config: &'a TestConfig,
    pub summary: &'a Summary,
    pub samples: &'a [Sample],
    pub rate_curve: &'a [RatePoint],
}

impl<'a> Export<'a> {
    pub fn new(config: &'a TestConfig, report: &'a RunReport) -> Self {
        Self {
            config,
            summary: &report.summary,
            samples: &report.samples,
            rate_curve: &report.rate_curve,
        }
    }
}

/// Write `report` to `path` as pretty-printed JSON.
pub fn write_json(path: &Path, config: &TestConfig, report: &RunReport) -> std::io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, &Export::new(config, report))?;
    writer.write_all(b"\n")?;
    writer.flush()
}
