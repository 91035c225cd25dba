//! Musician dataset loading
//!
//! The dataset is a CSV table with one row per musician. The first column
//! holds the musician's name; every other column is a boolean fact. Columns
//! whose header starts with [`CATEGORY_PREFIX`] are Wikipedia categories,
//! the rest are generic attributes.

use anyhow::Context;
use ndarray::{Array2, ArrayView2, Axis};
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

use wikicat_rl_core::{RLError, Result};

/// Header prefix marking Wikipedia category columns
pub const CATEGORY_PREFIX: &str = "category:";

/// Name of the extra action that ends a session
pub const END_ACTION_NAME: &str = "end_session_now";

/// Rows with this many positive facts or fewer are dropped
pub const DEFAULT_MIN_OCCURRENCES: usize = 15;

/// Boolean facts about a set of musicians, split into attributes and categories
#[derive(Debug, Clone)]
pub struct Dataset {
    labels: Vec<String>,
    attribute_names: Vec<String>,
    category_names: Vec<String>,
    attributes: Array2<u8>,
    categories: Array2<u8>,
}

impl Dataset {
    /// Build a dataset from in-memory tables.
    ///
    /// Row counts must agree with `labels` and column counts with the names.
    pub fn new(
        labels: Vec<String>,
        attribute_names: Vec<String>,
        category_names: Vec<String>,
        attributes: Array2<u8>,
        categories: Array2<u8>,
    ) -> Result<Self> {
        for (expected, actual) in [
            (labels.len(), attributes.nrows()),
            (labels.len(), categories.nrows()),
            (attribute_names.len(), attributes.ncols()),
            (category_names.len(), categories.ncols()),
        ] {
            if expected != actual {
                return Err(RLError::DimensionMismatch { expected, actual });
            }
        }

        Ok(Self {
            labels,
            attribute_names,
            category_names,
            attributes,
            categories,
        })
    }

    /// Read a CSV file, keeping rows with more than `min_occurrences` positive facts
    pub async fn load(path: impl AsRef<Path>, min_occurrences: usize) -> Result<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read dataset {}", path.display()))?;

        debug!(path = %path.display(), bytes = content.len(), "read dataset file");
        Self::from_reader(content.as_slice(), min_occurrences)
    }

    /// Parse CSV from any reader, keeping rows with more than `min_occurrences` positive facts
    pub fn from_reader<R: Read>(reader: R, min_occurrences: usize) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = reader
            .headers()
            .context("Failed to read dataset header")?
            .clone();
        if headers.len() < 2 {
            return Err(RLError::Dataset(
                "expected a label column followed by at least one fact column".to_string(),
            ));
        }

        let feature_names: Vec<&str> = headers.iter().skip(1).collect();
        let (category_columns, attribute_columns): (Vec<usize>, Vec<usize>) =
            (0..feature_names.len()).partition(|&i| feature_names[i].starts_with(CATEGORY_PREFIX));

        let mut labels = Vec::new();
        let mut attribute_values = Vec::new();
        let mut category_values = Vec::new();
        let mut dropped = 0usize;

        for (row, record) in reader.records().enumerate() {
            // Header is line 1.
            let line = row + 2;
            let record = record.map_err(|e| record_error(e, line))?;

            let values = record
                .iter()
                .skip(1)
                .zip(&feature_names)
                .map(|(cell, column)| {
                    parse_flag(cell).ok_or_else(|| {
                        RLError::Dataset(format!(
                            "line {line}, column '{column}': expected a boolean, got '{cell}'"
                        ))
                    })
                })
                .collect::<Result<Vec<u8>>>()?;

            let occurrences: usize = values.iter().map(|&v| usize::from(v)).sum();
            if occurrences <= min_occurrences {
                dropped += 1;
                continue;
            }

            labels.push(record.get(0).unwrap_or_default().to_string());
            attribute_values.extend(attribute_columns.iter().map(|&i| values[i]));
            category_values.extend(category_columns.iter().map(|&i| values[i]));
        }

        let rows = labels.len();
        let attributes = Array2::from_shape_vec((rows, attribute_columns.len()), attribute_values)
            .map_err(|e| RLError::Dataset(e.to_string()))?;
        let categories = Array2::from_shape_vec((rows, category_columns.len()), category_values)
            .map_err(|e| RLError::Dataset(e.to_string()))?;

        let pick = |columns: &[usize]| -> Vec<String> {
            columns.iter().map(|&i| feature_names[i].to_string()).collect()
        };

        info!(
            kept = rows,
            dropped,
            attributes = attribute_columns.len(),
            categories = category_columns.len(),
            "loaded musician dataset"
        );

        Self::new(
            labels,
            pick(&attribute_columns),
            pick(&category_columns),
            attributes,
            categories,
        )
    }

    /// Number of musicians
    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Whether no musician survived filtering
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Musician names, one per row
    #[must_use]
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Attribute column names
    #[must_use]
    pub fn attribute_names(&self) -> &[String] {
        &self.attribute_names
    }

    /// Category column names, prefix included
    #[must_use]
    pub fn category_names(&self) -> &[String] {
        &self.category_names
    }

    /// Attribute table `[rows, attributes]`
    #[must_use]
    pub fn attributes(&self) -> ArrayView2<'_, u8> {
        self.attributes.view()
    }

    /// Category table `[rows, categories]`
    #[must_use]
    pub fn categories(&self) -> ArrayView2<'_, u8> {
        self.categories.view()
    }

    /// Action names in action-id order: attributes, categories, then the end action
    #[must_use]
    pub fn action_names(&self) -> Vec<String> {
        self.attribute_names
            .iter()
            .chain(&self.category_names)
            .cloned()
            .chain(std::iter::once(END_ACTION_NAME.to_string()))
            .collect()
    }

    /// Copy the given rows out as `(attributes, categories)`
    pub fn batch(&self, row_ids: &[usize]) -> Result<(Array2<u8>, Array2<u8>)> {
        if let Some(&bad) = row_ids.iter().find(|&&i| i >= self.len()) {
            return Err(RLError::InvalidState(format!(
                "row {bad} out of range for dataset of {} rows",
                self.len()
            )));
        }

        Ok((
            self.attributes.select(Axis(0), row_ids),
            self.categories.select(Axis(0), row_ids),
        ))
    }
}

fn record_error(error: csv::Error, line: usize) -> RLError {
    if let csv::ErrorKind::UnequalLengths {
        expected_len, len, ..
    } = *error.kind()
    {
        return RLError::Dataset(format!(
            "line {line}: expected {expected_len} fields, got {len}"
        ));
    }
    anyhow::Error::new(error)
        .context(format!("Failed to read dataset line {line}"))
        .into()
}

fn parse_flag(cell: &str) -> Option<u8> {
    match cell.to_ascii_lowercase().as_str() {
        "1" | "1.0" | "true" => Some(1),
        "0" | "0.0" | "false" => Some(0),
        _ => None,
    }
}
