// 📊 Reference datasets - JUS, IPC, RIPTE, Pisos, Tasa Activa
// Plain tabular store over the CSV files the calculators read.
//
// Every cell stays a String: the formatters decide what a cell means, so a
// load → save cycle never rewrites a value the user did not touch.

use crate::formatters::{
    format_currency, format_date_ar, format_month_year, format_percentage, month_from_name,
    parse_date, try_parse_date, try_parse_monetary_string, DateStyle,
};
use anyhow::{anyhow, bail, Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::fmt;
use std::io::{Read, Write};
use std::path::Path;
use std::str::FromStr;

// ============================================================================
// CATALOGUE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DatasetKind {
    Jus,
    Ipc,
    Ripte,
    Pisos,
    TasaActiva,
}

impl DatasetKind {
    /// Catalogue order, as listed in the admin screen
    pub const ALL: [DatasetKind; 5] = [
        DatasetKind::Jus,
        DatasetKind::Ipc,
        DatasetKind::Ripte,
        DatasetKind::Pisos,
        DatasetKind::TasaActiva,
    ];

    /// Human-readable name for display
    pub fn label(&self) -> &'static str {
        match self {
            DatasetKind::Jus => "JUS",
            DatasetKind::Ipc => "IPC",
            DatasetKind::Ripte => "RIPTE",
            DatasetKind::Pisos => "Pisos Salariales",
            DatasetKind::TasaActiva => "Tasa Activa",
        }
    }

    /// Short key for the command line
    pub fn key(&self) -> &'static str {
        match self {
            DatasetKind::Jus => "jus",
            DatasetKind::Ipc => "ipc",
            DatasetKind::Ripte => "ripte",
            DatasetKind::Pisos => "pisos",
            DatasetKind::TasaActiva => "tasa",
        }
    }

    pub fn file_name(&self) -> &'static str {
        match self {
            DatasetKind::Jus => "Dataset_JUS.csv",
            DatasetKind::Ipc => "dataset_ipc.csv",
            DatasetKind::Ripte => "dataset_ripte.csv",
            DatasetKind::Pisos => "dataset_pisos.csv",
            DatasetKind::TasaActiva => "dataset_tasa.csv",
        }
    }

    /// Match a key ("tasa") or a label ("Tasa Activa"), ignoring case
    pub fn from_key(name: &str) -> Option<DatasetKind> {
        let name = name.trim();
        DatasetKind::ALL
            .into_iter()
            .find(|kind| kind.key().eq_ignore_ascii_case(name) || kind.label().eq_ignore_ascii_case(name))
    }

    pub fn next(&self) -> DatasetKind {
        let i = DatasetKind::ALL.iter().position(|k| k == self).unwrap_or(0);
        DatasetKind::ALL[(i + 1) % DatasetKind::ALL.len()]
    }

    pub fn previous(&self) -> DatasetKind {
        let i = DatasetKind::ALL.iter().position(|k| k == self).unwrap_or(0);
        DatasetKind::ALL[(i + DatasetKind::ALL.len() - 1) % DatasetKind::ALL.len()]
    }
}

impl FromStr for DatasetKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        DatasetKind::from_key(s).ok_or_else(|| {
            anyhow!(
                "Unknown dataset: {} (expected one of: jus, ipc, ripte, pisos, tasa)",
                s
            )
        })
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// DATASET
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    pub kind: DatasetKind,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Dataset {
    pub fn new(kind: DatasetKind, headers: Vec<String>) -> Self {
        Dataset {
            kind,
            headers,
            rows: Vec::new(),
        }
    }

    pub fn load(kind: DatasetKind, path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)
            .with_context(|| format!("Failed to open dataset: {}", path.display()))?;
        Self::from_reader(kind, file)
            .with_context(|| format!("Failed to read dataset: {}", path.display()))
    }

    pub fn from_reader<R: Read>(kind: DatasetKind, reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let mut headers: Vec<String> = rdr
            .headers()
            .context("Failed to read CSV header row")?
            .iter()
            .map(str::to_string)
            .collect();
        if let Some(first) = headers.first_mut() {
            *first = first.trim_start_matches('\u{feff}').to_string();
        }

        let mut rows = Vec::new();
        for (line_num, result) in rdr.records().enumerate() {
            let record = result.with_context(|| {
                format!("Failed to parse CSV line {}", line_num + 2)
            })?;

            let mut row: Vec<String> = record.iter().map(str::to_string).collect();
            if row.len() < headers.len() {
                row.resize(headers.len(), String::new());
            }
            rows.push(row);
        }

        tracing::debug!(dataset = kind.key(), rows = rows.len(), "dataset loaded");

        Ok(Dataset { kind, headers, rows })
    }

    /// Sort for storage, then write the whole file
    pub fn save(&mut self, path: &Path) -> Result<()> {
        self.sort_for_storage();

        let file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create dataset file: {}", path.display()))?;
        self.to_writer(file)?;

        tracing::info!(dataset = self.kind.key(), rows = self.rows.len(), path = %path.display(), "dataset saved");
        Ok(())
    }

    pub fn to_writer<W: Write>(&self, writer: W) -> Result<()> {
        let mut wtr = csv::WriterBuilder::new().flexible(true).from_writer(writer);

        wtr.write_record(&self.headers)?;
        for row in &self.rows {
            wtr.write_record(row)?;
        }
        wtr.flush().context("Failed to flush dataset")?;

        Ok(())
    }

    /// Tasa Activa is kept newest-first by its "Desde" column; rows whose
    /// date does not parse go to the bottom in their original order.
    pub fn sort_for_storage(&mut self) {
        if self.kind != DatasetKind::TasaActiva {
            return;
        }
        let Some(col) = self.column_index("Desde") else {
            return;
        };

        self.rows
            .sort_by_cached_key(|row| Reverse(row.get(col).and_then(|v| parse_date(v.as_str()))));
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Exact header match first, then trimmed and case-insensitive
    /// (source files carry headers like "FECHA ENTRADA EN VIGENCIA ")
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers
            .iter()
            .position(|h| h == name)
            .or_else(|| {
                let wanted = name.trim().to_lowercase();
                self.headers
                    .iter()
                    .position(|h| h.trim().to_lowercase() == wanted)
            })
    }

    pub fn field(&self, row: usize, column: &str) -> Option<&str> {
        let col = self.column_index(column)?;
        self.rows.get(row)?.get(col).map(String::as_str)
    }

    /// New empty row at the top, where the newest entries live
    pub fn insert_blank_row(&mut self) {
        self.rows.insert(0, vec![String::new(); self.headers.len()]);
    }

    pub fn update_row(&mut self, index: usize, values: Vec<String>) -> Result<()> {
        if values.len() != self.headers.len() {
            bail!(
                "Row has {} fields, {} expects {}",
                values.len(),
                self.kind.label(),
                self.headers.len()
            );
        }
        let len = self.rows.len();
        let row = self
            .rows
            .get_mut(index)
            .ok_or_else(|| anyhow!("Row {} out of range ({} rows)", index, len))?;
        *row = values;

        Ok(())
    }

    pub fn delete_row(&mut self, index: usize) -> Result<Vec<String>> {
        if index >= self.rows.len() {
            bail!("Row {} out of range ({} rows)", index, self.rows.len());
        }
        Ok(self.rows.remove(index))
    }

    /// Index of the most recent record: files are stored newest-first,
    /// except Pisos which is chronological.
    pub fn latest_index(&self) -> Option<usize> {
        if self.rows.is_empty() {
            return None;
        }
        match self.kind {
            DatasetKind::Pisos => Some(self.rows.len() - 1),
            _ => Some(0),
        }
    }

    pub fn latest(&self) -> Option<&[String]> {
        self.latest_index().map(|i| self.rows[i].as_slice())
    }

    /// Banner entry for the most recent record
    pub fn latest_entry(&self) -> Option<LatestEntry> {
        let row = self.latest_index()?;
        let columns = LatestColumns::for_kind(self.kind);

        let value = self
            .first_field(row, columns.value)
            .or_else(|| {
                // RIPTE files without a recognisable header: value is the third column
                (self.kind == DatasetKind::Ripte)
                    .then(|| self.rows[row].get(2).map(String::as_str))
                    .flatten()
            })
            .map(|raw| columns.value_style.render(raw))
            .unwrap_or_else(|| NOT_AVAILABLE.to_string());

        let period = self
            .period_date(row, &columns)
            .map(|(raw, date)| match date {
                Some(date) => columns.period_style.render(date),
                None => raw.to_string(),
            })
            .unwrap_or_else(|| NOT_AVAILABLE.to_string());

        let detail = self
            .first_field(row, columns.detail)
            .map(|raw| raw.trim())
            .filter(|raw| !raw.is_empty())
            .map(|raw| match self.kind {
                DatasetKind::Jus => format!("Ac. {}", strip_agreement_prefix(raw)),
                _ => raw.to_string(),
            });

        Some(LatestEntry {
            kind: self.kind,
            period,
            value,
            detail,
        })
    }

    fn first_field(&self, row: usize, candidates: &[&str]) -> Option<&str> {
        candidates.iter().find_map(|name| self.field(row, name))
    }

    /// Raw period text and its parsed date, if any
    fn period_date(&self, row: usize, columns: &LatestColumns) -> Option<(String, Option<NaiveDate>)> {
        if self.kind == DatasetKind::Ripte {
            if let (Some(year), Some(month)) = (self.field(row, "año"), self.field(row, "mes")) {
                let raw = format!("{} {}", month.trim(), year.trim());
                let date = year.trim().parse::<i32>().ok().and_then(|y| {
                    let month = month.trim();
                    month_from_name(month)
                        .or_else(|| month.get(..3).and_then(month_from_name))
                        .or_else(|| month.parse().ok())
                        .and_then(|m| NaiveDate::from_ymd_opt(y, m, 1))
                });
                return Some((raw, date));
            }
        }

        let raw = self.first_field(row, columns.period)?;
        Some((raw.trim().to_string(), try_parse_date(raw).ok()))
    }
}

fn strip_agreement_prefix(raw: &str) -> &str {
    ["Acuerdo ", "acuerdo ", "ACUERDO "]
        .iter()
        .find_map(|prefix| raw.strip_prefix(prefix))
        .unwrap_or(raw)
        .trim()
}

// ============================================================================
// LATEST DATA SUMMARY
// ============================================================================

pub const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Clone, Copy)]
enum ValueStyle {
    /// "$ 1.234,56"
    Currency,
    /// Argentine grouping without the "$"
    Number,
    /// Cell holds percentage points: 2.7 → "2,70%"
    Percent,
}

impl ValueStyle {
    fn render(&self, raw: &str) -> String {
        let Ok(value) = try_parse_monetary_string(raw) else {
            return raw.trim().to_string();
        };
        match self {
            ValueStyle::Currency => format_currency(value),
            ValueStyle::Number => format_currency(value).trim_start_matches("$ ").to_string(),
            ValueStyle::Percent => format_percentage(value / 100.0),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum PeriodStyle {
    /// "12/2024"
    MonthYear,
    /// "31/12/2024"
    FullDate,
}

impl PeriodStyle {
    fn render(&self, date: NaiveDate) -> String {
        match self {
            PeriodStyle::MonthYear => format_month_year(date),
            PeriodStyle::FullDate => format_date_ar(date, DateStyle::Long),
        }
    }
}

/// Candidate column names per dataset, first present wins
struct LatestColumns {
    value: &'static [&'static str],
    period: &'static [&'static str],
    detail: &'static [&'static str],
    value_style: ValueStyle,
    period_style: PeriodStyle,
}

impl LatestColumns {
    fn for_kind(kind: DatasetKind) -> Self {
        match kind {
            DatasetKind::Ripte => LatestColumns {
                value: &["índice RIPTE", "indice_ripte", "ripte"],
                period: &["fecha"],
                detail: &[],
                value_style: ValueStyle::Number,
                period_style: PeriodStyle::MonthYear,
            },
            DatasetKind::Ipc => LatestColumns {
                value: &["variacion_mensual", "ipc"],
                period: &["periodo", "fecha"],
                detail: &[],
                value_style: ValueStyle::Percent,
                period_style: PeriodStyle::MonthYear,
            },
            DatasetKind::TasaActiva => LatestColumns {
                value: &["Valor", "tasa"],
                period: &["Hasta", "Desde"],
                detail: &[],
                value_style: ValueStyle::Percent,
                period_style: PeriodStyle::FullDate,
            },
            DatasetKind::Jus => LatestColumns {
                value: &["VALOR IUS", "valor"],
                period: &["FECHA ENTRADA EN VIGENCIA", "fecha"],
                detail: &["ACUERDO", "acuerdo"],
                value_style: ValueStyle::Currency,
                period_style: PeriodStyle::MonthYear,
            },
            DatasetKind::Pisos => LatestColumns {
                value: &["monto_minimo", "piso"],
                period: &["fecha_inicio", "desde"],
                detail: &["norma", "resol"],
                value_style: ValueStyle::Currency,
                period_style: PeriodStyle::FullDate,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LatestEntry {
    pub kind: DatasetKind,
    pub period: String,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl fmt::Display for LatestEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.kind.label(), self.period, self.value)?;
        if let Some(detail) = &self.detail {
            write!(f, " ({})", detail)?;
        }
        Ok(())
    }
}

/// Load every dataset under `data_dir` and collect its latest entry.
/// Datasets that fail to load are skipped.
pub fn latest_summary(data_dir: &Path) -> Vec<LatestEntry> {
    DatasetKind::ALL
        .into_iter()
        .filter_map(|kind| {
            let path = data_dir.join(kind.file_name());
            match Dataset::load(kind, &path) {
                Ok(dataset) => dataset.latest_entry(),
                Err(err) => {
                    tracing::warn!(dataset = kind.key(), error = %format!("{:#}", err), "skipping dataset");
                    None
                }
            }
        })
        .collect()
}

/// One-line banner: entries joined with " | "
pub fn summary_line(entries: &[LatestEntry]) -> String {
    entries
        .iter()
        .map(LatestEntry::to_string)
        .collect::<Vec<_>>()
        .join(" | ")
}
