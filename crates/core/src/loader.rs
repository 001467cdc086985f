//! Bulk creation of data elements from CSV.

use crate::config::LoaderConfig;
use crate::creator;
use crate::models::{CreateOutcome, CreateRequest};
use crate::pipeline::Services;
use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

/// A data row of the input, numbered from 1.
#[derive(Debug, Clone)]
pub struct ParsedRow {
    pub row: usize,
    pub request: Result<CreateRequest, String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RowFailure {
    pub row: usize,
    pub external_id: Option<String>,
    pub error: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoadSummary {
    pub total: usize,
    pub created: usize,
    pub failed: usize,
    pub failures: Vec<RowFailure>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Reads rows using the configured column names. A missing required column
/// fails the whole read; a malformed row becomes a failed [`ParsedRow`].
pub fn read_rows<R: std::io::Read>(reader: R, cfg: &LoaderConfig) -> anyhow::Result<Vec<ParsedRow>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = rdr.headers().context("reading CSV header")?.clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .with_context(|| format!("column {name} not found in CSV header"))
    };
    let name_idx = column(&cfg.name_column)?;
    let id_idx = column(&cfg.id_column)?;
    let source_idx = column(&cfg.source_column)?;
    let category_idx = cfg
        .category_column
        .as_deref()
        .and_then(|c| headers.iter().position(|h| h == c));

    let rows = rdr
        .records()
        .enumerate()
        .map(|(i, record)| {
            let request = record.map_err(|e| e.to_string()).and_then(|rec| {
                let field = |idx: usize| rec.get(idx).unwrap_or_default().to_string();
                let name = field(name_idx);
                if name.is_empty() {
                    return Err(format!("empty {} field", cfg.name_column));
                }
                Ok(CreateRequest {
                    external_id: field(id_idx),
                    data_source: field(source_idx),
                    category: category_idx.map(field).filter(|c| !c.is_empty()),
                    name,
                })
            });
            ParsedRow { row: i + 1, request }
        })
        .collect();
    Ok(rows)
}

pub async fn load_csv(
    services: &Services,
    path: &Path,
    cfg: &LoaderConfig,
) -> anyhow::Result<LoadSummary> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("opening {}", path.display()))?;
    let rows = read_rows(file, cfg)?;
    info!(path = %path.display(), rows = rows.len(), "loading data elements");
    Ok(load_rows(services, rows, cfg.delay()).await)
}

/// Runs the create pipeline for every row, pausing `delay` after each call.
/// A failed row is recorded and loading continues.
pub async fn load_rows(services: &Services, rows: Vec<ParsedRow>, delay: Duration) -> LoadSummary {
    let started_at = Utc::now();
    let total = rows.len();
    let mut created = 0;
    let mut failures = Vec::new();

    for ParsedRow { row, request } in rows {
        let req = match request {
            Ok(req) => req,
            Err(error) => {
                warn!(row, %error, "skipping unreadable row");
                failures.push(RowFailure {
                    row,
                    external_id: None,
                    error,
                });
                continue;
            }
        };

        match creator::create(services, &req).await {
            CreateOutcome::Created { .. } => {
                created += 1;
                info!(row, external_id = %req.external_id, "row loaded");
            }
            CreateOutcome::Failed { error } => failures.push(RowFailure {
                row,
                external_id: Some(req.external_id),
                error,
            }),
        }

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    let summary = LoadSummary {
        total,
        created,
        failed: failures.len(),
        failures,
        started_at,
        finished_at: Utc::now(),
    };
    info!(
        total = summary.total,
        created = summary.created,
        failed = summary.failed,
        "load complete"
    );
    summary
}
