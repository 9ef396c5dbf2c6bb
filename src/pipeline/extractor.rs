use crate::error::{Result, TapeSieveError};
use crate::pipeline::{Normalizer, TapeRecord};
use crate::sheet::{ColumnRef, Sheet};

/// Reads the configured columns out of a [`Sheet`] and zips them into
/// [`TapeRecord`]s.
///
/// The first three selectors are read positionally as (name, returnDate,
/// description). Further selectors are still validated and read, but do not
/// feed the record constructor.
pub struct Extractor {
    selectors: Vec<ColumnRef>,
    normalizer: Normalizer,
}

impl Extractor {
    pub fn from_selectors(tokens: &[String]) -> Result<Self> {
        if tokens.len() < 3 {
            return Err(TapeSieveError::Config {
                message: format!(
                    "At least 3 column selectors are required (name, return date, description); got {}",
                    tokens.len()
                ),
            });
        }

        let selectors = tokens
            .iter()
            .map(|token| ColumnRef::parse(token))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            selectors,
            normalizer: Normalizer::new()?,
        })
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    /// Extracts one record per aligned row, in source row order.
    ///
    /// Each selected column is filtered of blank cells independently before
    /// zipping. The first three columns must then line up exactly; a length
    /// mismatch means the sheet has stray values in one column and aborts
    /// the extraction rather than guessing at alignment.
    pub fn extract(&self, sheet: &Sheet) -> Result<Vec<TapeRecord>> {
        let mut columns = Vec::with_capacity(self.selectors.len());
        for selector in &self.selectors {
            columns.push(self.usable_column(sheet, selector)?);
        }

        let expected = columns[0].len();
        for (selector, column) in self.selectors.iter().zip(&columns).take(3) {
            if column.len() != expected {
                return Err(TapeSieveError::ColumnMismatch {
                    column: selector.label().to_string(),
                    expected,
                    found: column.len(),
                });
            }
        }

        if expected == 0 {
            return Err(TapeSieveError::EmptySource);
        }

        let mut records = Vec::with_capacity(expected);
        for i in 0..expected {
            records.push(TapeRecord::new(
                columns[0][i].clone(),
                columns[1][i].clone(),
                columns[2][i].clone(),
            ));
        }

        Ok(records)
    }

    /// One column's worth of normalized values, blanks dropped.
    ///
    /// A hidden column is a hard failure: it means the sheet's visible
    /// layout no longer matches the configured schema.
    fn usable_column(&self, sheet: &Sheet, selector: &ColumnRef) -> Result<Vec<String>> {
        if !sheet.has_column(selector) {
            return Err(TapeSieveError::MissingColumn {
                column: selector.label().to_string(),
            });
        }
        if sheet.is_hidden(selector) {
            return Err(TapeSieveError::HiddenColumn {
                column: selector.label().to_string(),
            });
        }

        Ok(sheet
            .column_values(selector)
            .iter()
            .map(|value| self.normalizer.normalize(value))
            .filter(|value| !value.is_empty())
            .collect())
    }
}
