//! Rendering of computed statistics in the supported output formats

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use std::io::Write;

use ipstat_cidr::report::LABEL_WIDTH;
use ipstat_cidr::{CidrStats, FieldValue, Report};
use ipstat_core::IpStatError;

use crate::OutputFormat;

/// Example shown in usage messages
pub const EXAMPLE_CIDR: &str = "192.168.22.5/20";

/// Usage text for a failed invocation
pub fn usage_message(program: &str, err: &IpStatError) -> String {
    format!(
        "{:<8}: {}\n{:<8}: {} IP/Mask\n{:<8}: {} {}\n",
        "Error", err, "Usage", program, "Example", program, EXAMPLE_CIDR
    )
}

/// Output settings taken from the command line
#[derive(Debug, Clone, Copy)]
pub struct Printer {
    pub format: OutputFormat,
    /// Include the original CIDR text
    pub echo: bool,
    /// Append dotted binary to address fields (human only)
    pub binary: bool,
}

/// JSON value of one result, without the `cidr` echo unless requested
fn json_record(stats: &CidrStats, echo: bool) -> Result<serde_json::Value> {
    let mut value = serde_json::to_value(stats)?;
    if !echo {
        if let Some(obj) = value.as_object_mut() {
            obj.shift_remove("cidr");
        }
    }
    Ok(value)
}

impl Printer {
    /// Print one result; JSON formats emit a single object
    pub fn print_single<W: Write>(&self, mut out: W, stats: &CidrStats) -> Result<()> {
        match self.format {
            OutputFormat::Json | OutputFormat::JsonCompact => {
                self.write_json(&mut out, &json_record(stats, self.echo)?)
            }
            _ => self.print_batch(out, std::slice::from_ref(stats)),
        }
    }

    /// Print many results; JSON formats emit an array
    pub fn print_batch<W: Write>(&self, mut out: W, stats: &[CidrStats]) -> Result<()> {
        match self.format {
            OutputFormat::Human => self.write_human(&mut out, stats),
            OutputFormat::Json | OutputFormat::JsonCompact => {
                let records = stats
                    .iter()
                    .map(|s| json_record(s, self.echo))
                    .collect::<Result<Vec<_>>>()?;
                self.write_json(&mut out, &records)
            }
            OutputFormat::Csv => self.write_csv(out, stats),
        }
    }

    fn write_human<W: Write>(&self, out: &mut W, stats: &[CidrStats]) -> Result<()> {
        for (i, s) in stats.iter().enumerate() {
            if i > 0 {
                writeln!(out)?;
            }
            for field in Report::new(s, self.echo).fields() {
                let label = format!("{:<width$}", field.label, width = LABEL_WIDTH).bold();
                let value = match &field.value {
                    FieldValue::Input(text) => text.cyan(),
                    FieldValue::Address(addr) => addr.to_string().green(),
                    FieldValue::Count(count) => count.to_string().yellow(),
                };
                write!(out, "{} :{}", label, value)?;
                if self.binary {
                    if let Some(bits) = field.value.binary() {
                        write!(out, "  {}", bits.dimmed())?;
                    }
                }
                writeln!(out)?;
            }
        }
        Ok(())
    }

    fn write_json<W: Write, T: Serialize>(&self, out: &mut W, value: &T) -> Result<()> {
        if self.format == OutputFormat::Json {
            serde_json::to_writer_pretty(&mut *out, value)?;
        } else {
            serde_json::to_writer(&mut *out, value)?;
        }
        writeln!(out)?;
        Ok(())
    }

    fn write_csv<W: Write>(&self, out: W, stats: &[CidrStats]) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(out);
        for (i, s) in stats.iter().enumerate() {
            let report = Report::new(s, self.echo);
            if i == 0 {
                wtr.write_record(report.keys())?;
            }
            wtr.write_record(report.values())?;
        }
        wtr.flush()?;
        Ok(())
    }
}
