//! Ordered (label, value) view of [`CidrStats`]
//!
//! Fields always appear in the same order: CIDR, Network Mask, Network
//! Address, First IP, Last IP, Broadcast Address, No. of Addresses. The
//! CIDR echo can be left out.
//!
//! ```
//! use ipstat_cidr::{resolve, Report};
//!
//! let stats = resolve("10.1.2.3/24").unwrap();
//! let report = Report::new(&stats, true);
//! let lines: Vec<String> = report.lines().collect();
//! assert_eq!(lines[0], "CIDR                 :10.1.2.3/24");
//! assert_eq!(lines[2], "Network Address      :10.1.2.0");
//! ```

use std::fmt;

use crate::{CidrStats, Ipv4Address};

/// Width the labels are padded to in text output
pub const LABEL_WIDTH: usize = 20;

/// Value of a single report field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// The original input text
    Input(String),
    /// A derived address
    Address(Ipv4Address),
    /// The address count
    Count(u64),
}

impl FieldValue {
    /// Dotted binary form for address values
    pub fn binary(&self) -> Option<String> {
        match self {
            FieldValue::Address(addr) => Some(addr.to_binary_string()),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Input(text) => f.write_str(text),
            FieldValue::Address(addr) => write!(f, "{}", addr),
            FieldValue::Count(count) => write!(f, "{}", count),
        }
    }
}

/// One labelled report field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Machine-readable name, used as the CSV column header
    pub key: &'static str,
    /// Human-readable label
    pub label: &'static str,
    pub value: FieldValue,
}

/// Ordered report fields for one set of statistics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    fields: Vec<Field>,
}

impl Report {
    /// Assemble the report, optionally leading with the original input
    pub fn new(stats: &CidrStats, include_input: bool) -> Self {
        let mut fields = Vec::with_capacity(7);
        if include_input {
            fields.push(Field {
                key: "cidr",
                label: "CIDR",
                value: FieldValue::Input(stats.input.clone()),
            });
        }

        let addresses = [
            ("network_mask", "Network Mask", stats.network_mask),
            ("network_address", "Network Address", stats.network_address),
            ("first_ip", "First IP", stats.first_usable_address),
            ("last_ip", "Last IP", stats.last_usable_address),
            ("broadcast_address", "Broadcast Address", stats.broadcast_address),
        ];
        fields.extend(addresses.into_iter().map(|(key, label, addr)| Field {
            key,
            label,
            value: FieldValue::Address(addr),
        }));

        fields.push(Field {
            key: "address_count",
            label: "No. of Addresses",
            value: FieldValue::Count(stats.address_count),
        });

        Self { fields }
    }

    /// Fields in display order
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Column names in display order
    pub fn keys(&self) -> Vec<&'static str> {
        self.fields.iter().map(|f| f.key).collect()
    }

    /// Rendered values in display order
    pub fn values(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.value.to_string()).collect()
    }

    /// Text lines, label left-justified to [`LABEL_WIDTH`]
    pub fn lines(&self) -> impl Iterator<Item = String> + '_ {
        self.fields
            .iter()
            .map(|f| format!("{:<width$} :{}", f.label, f.value, width = LABEL_WIDTH))
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in self.lines() {
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}
