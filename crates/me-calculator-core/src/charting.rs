//! Hand-off to the charting collaborator.
//!
//! Rendering lives outside this crate. A [`ChartSink`] receives only numeric
//! data and string labels; the sinks shipped here serialise that data for an
//! external plotting tool.

use serde::Serialize;
use std::io::Write;

use crate::sweep::{Grid, Series};
use crate::MortgageResult;

pub trait ChartSink {
    /// Line chart: one line per series over a shared x axis.
    fn plot_1d(&mut self, series: &[Series], x_label: &str, x_unit: &str) -> MortgageResult<()>;

    /// Surface chart over an `x` by `y` grid.
    fn plot_2d(
        &mut self,
        grid: &Grid,
        x_label: &str,
        y_label: &str,
        z_label: &str,
    ) -> MortgageResult<()>;
}

// ---------------------------------------------------------------------------
// JSON
// ---------------------------------------------------------------------------

#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum ChartDocument<'a> {
    Line {
        x_label: &'a str,
        x_unit: &'a str,
        series: &'a [Series],
    },
    Surface {
        x_label: &'a str,
        y_label: &'a str,
        z_label: &'a str,
        grid: &'a Grid,
    },
}

/// Writes one pretty-printed JSON document per chart. Gaps become `null`.
pub struct JsonChartWriter<W: Write> {
    writer: W,
}

impl<W: Write> JsonChartWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write(&mut self, document: &ChartDocument<'_>) -> MortgageResult<()> {
        serde_json::to_writer_pretty(&mut self.writer, document)?;
        writeln!(self.writer)?;
        Ok(())
    }
}

impl<W: Write> ChartSink for JsonChartWriter<W> {
    fn plot_1d(&mut self, series: &[Series], x_label: &str, x_unit: &str) -> MortgageResult<()> {
        self.write(&ChartDocument::Line {
            x_label,
            x_unit,
            series,
        })
    }

    fn plot_2d(
        &mut self,
        grid: &Grid,
        x_label: &str,
        y_label: &str,
        z_label: &str,
    ) -> MortgageResult<()> {
        self.write(&ChartDocument::Surface {
            x_label,
            y_label,
            z_label,
            grid,
        })
    }
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

/// Writes long-format CSV: `x, series, y` rows for lines and `x, y, z` rows
/// for surfaces. Gaps become empty fields.
pub struct CsvChartWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> CsvChartWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: csv::WriterBuilder::new().flexible(true).from_writer(writer),
        }
    }

    pub fn into_inner(self) -> MortgageResult<W> {
        self.writer
            .into_inner()
            .map_err(|e| crate::error::MortgageError::Io(e.error().to_string()))
    }
}

fn format_csv_value(value: f64) -> String {
    if value.is_finite() {
        value.to_string()
    } else {
        String::new()
    }
}

impl<W: Write> ChartSink for CsvChartWriter<W> {
    fn plot_1d(&mut self, series: &[Series], x_label: &str, x_unit: &str) -> MortgageResult<()> {
        let x_header = format!("{x_label} {x_unit}");
        self.writer.write_record([x_header.as_str(), "series", "value"])?;
        for line in series {
            let label = format!("{} {}", line.label, line.unit);
            for (x, y) in &line.points {
                self.writer
                    .write_record([format_csv_value(*x), label.clone(), format_csv_value(*y)])?;
            }
        }
        self.writer.flush()?;
        Ok(())
    }

    fn plot_2d(
        &mut self,
        grid: &Grid,
        x_label: &str,
        y_label: &str,
        z_label: &str,
    ) -> MortgageResult<()> {
        self.writer.write_record([x_label, y_label, z_label])?;
        for (row, y) in grid.z.iter().zip(&grid.y) {
            for (z, x) in row.iter().zip(&grid.x) {
                self.writer.write_record([
                    format_csv_value(*x),
                    format_csv_value(*y),
                    format_csv_value(*z),
                ])?;
            }
        }
        self.writer.flush()?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// In-memory
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum RecordedChart {
    Line {
        series: Vec<Series>,
        x_label: String,
        x_unit: String,
    },
    Surface {
        grid: Grid,
        x_label: String,
        y_label: String,
        z_label: String,
    },
}

/// Keeps every chart it receives.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub charts: Vec<RecordedChart>,
}

impl ChartSink for RecordingSink {
    fn plot_1d(&mut self, series: &[Series], x_label: &str, x_unit: &str) -> MortgageResult<()> {
        self.charts.push(RecordedChart::Line {
            series: series.to_vec(),
            x_label: x_label.to_string(),
            x_unit: x_unit.to_string(),
        });
        Ok(())
    }

    fn plot_2d(
        &mut self,
        grid: &Grid,
        x_label: &str,
        y_label: &str,
        z_label: &str,
    ) -> MortgageResult<()> {
        self.charts.push(RecordedChart::Surface {
            grid: grid.clone(),
            x_label: x_label.to_string(),
            y_label: y_label.to_string(),
            z_label: z_label.to_string(),
        });
        Ok(())
    }
}
