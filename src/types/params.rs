use std::collections::BTreeMap;

use crate::error::{DbError, Result};
use crate::types::SqlValue;

/// Values bound to a statement's placeholders for one execution.
///
/// Positional and named binding are separate variants, so a single
/// execution can never mix the two styles.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Params {
    #[default]
    None,
    Positional(Vec<SqlValue>),
    Named(BTreeMap<String, SqlValue>),
}

impl Params {
    /// Bind by position.
    pub fn positional<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<SqlValue>,
    {
        Params::Positional(values.into_iter().map(Into::into).collect())
    }

    /// Bind by name. Later duplicates replace earlier ones.
    pub fn named<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<SqlValue>,
    {
        Params::Named(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Number of bound values.
    pub fn len(&self) -> usize {
        match self {
            Params::None => 0,
            Params::Positional(values) => values.len(),
            Params::Named(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Parameter collections for a batched execution.
///
/// Collections are columnar: the statement runs once per index `i`, binding
/// the `i`-th element of every collection. All collections must have the
/// same length.
#[derive(Debug, Clone, PartialEq)]
pub enum Batch {
    Positional(Vec<Vec<SqlValue>>),
    Named(BTreeMap<String, Vec<SqlValue>>),
}

impl Default for Batch {
    fn default() -> Self {
        Batch::Positional(Vec::new())
    }
}

impl Batch {
    pub fn positional<I, C, V>(collections: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: IntoIterator<Item = V>,
        V: Into<SqlValue>,
    {
        Batch::Positional(
            collections
                .into_iter()
                .map(|c| c.into_iter().map(Into::into).collect())
                .collect(),
        )
    }

    /// Fails with [`DbError::Parameter`] if a name is supplied more than once.
    pub fn named<I, K, C, V>(collections: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, C)>,
        K: Into<String>,
        C: IntoIterator<Item = V>,
        V: Into<SqlValue>,
    {
        collections
            .into_iter()
            .fold(BatchBuilder::new(), |builder, (name, values)| {
                builder.named(name, values)
            })
            .build()
    }

    /// Number of supplied parameter collections.
    pub fn collection_count(&self) -> usize {
        match self {
            Batch::Positional(cols) => cols.len(),
            Batch::Named(cols) => cols.len(),
        }
    }

    /// Checks that all collections share the first collection's length and
    /// returns that length, or `None` when no collections were supplied.
    pub fn validate(&self) -> Result<Option<usize>> {
        match self {
            Batch::Positional(cols) => {
                let Some(expected) = cols.first().map(Vec::len) else {
                    return Ok(None);
                };
                match cols.iter().position(|c| c.len() != expected) {
                    Some(i) => Err(length_mismatch(
                        &format!("#{}", i),
                        cols[i].len(),
                        "#0",
                        expected,
                    )),
                    None => Ok(Some(expected)),
                }
            }
            Batch::Named(cols) => {
                let mut iter = cols.iter();
                let Some((first, values)) = iter.next() else {
                    return Ok(None);
                };
                let expected = values.len();
                match iter.find(|(_, c)| c.len() != expected) {
                    Some((name, c)) => Err(length_mismatch(name, c.len(), first, expected)),
                    None => Ok(Some(expected)),
                }
            }
        }
    }

    /// Validates the batch and returns the parameters of each execution,
    /// in index order.
    ///
    /// A malformed batch fails here, before anything runs. With no
    /// collections the iterator yields a single `Params::None`.
    pub fn runs(&self) -> Result<BatchRuns<'_>> {
        let len = self.validate()?;
        Ok(BatchRuns {
            batch: self,
            index: 0,
            len: len.unwrap_or(1),
            unbound: len.is_none(),
        })
    }

    fn params_at(&self, i: usize) -> Params {
        match self {
            Batch::Positional(cols) => {
                Params::Positional(cols.iter().map(|c| c[i].clone()).collect())
            }
            Batch::Named(cols) => Params::Named(
                cols.iter()
                    .map(|(k, c)| (k.clone(), c[i].clone()))
                    .collect(),
            ),
        }
    }
}

fn length_mismatch(name: &str, len: usize, first: &str, expected: usize) -> DbError {
    DbError::Parameter(format!(
        "parameter collection {} has {} value(s), but {} has {}",
        name, len, first, expected
    ))
}

/// Per-execution parameters of a validated [`Batch`], built one at a time.
#[derive(Debug)]
pub struct BatchRuns<'a> {
    batch: &'a Batch,
    index: usize,
    len: usize,
    unbound: bool,
}

impl Iterator for BatchRuns<'_> {
    type Item = Params;

    fn next(&mut self) -> Option<Params> {
        if self.index >= self.len {
            return None;
        }
        let i = self.index;
        self.index += 1;
        if self.unbound {
            return Some(Params::None);
        }
        Some(self.batch.params_at(i))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.len - self.index;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for BatchRuns<'_> {}

/// Incremental construction of a [`Batch`].
///
/// Rejects mixing positional and named collections, and repeated names.
#[derive(Debug, Default)]
pub struct BatchBuilder {
    positional: Vec<Vec<SqlValue>>,
    named: BTreeMap<String, Vec<SqlValue>>,
    duplicate: Option<String>,
}

impl BatchBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a positional collection.
    pub fn column<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<SqlValue>,
    {
        self.positional
            .push(values.into_iter().map(Into::into).collect());
        self
    }

    /// Add a named collection.
    pub fn named<I, V>(mut self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<SqlValue>,
    {
        let name = name.into();
        if self.named.contains_key(&name) {
            self.duplicate.get_or_insert(name);
            return self;
        }
        self.named
            .insert(name, values.into_iter().map(Into::into).collect());
        self
    }

    pub fn build(self) -> Result<Batch> {
        if let Some(name) = self.duplicate {
            return Err(DbError::Parameter(format!(
                "parameter collection {} supplied more than once",
                name
            )));
        }
        match (self.positional.is_empty(), self.named.is_empty()) {
            (false, false) => Err(DbError::Parameter(
                "positional and named parameter collections cannot be mixed".to_string(),
            )),
            (true, false) => Ok(Batch::Named(self.named)),
            _ => Ok(Batch::Positional(self.positional)),
        }
    }
}
