//! Tabular input records grouped by period.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{DataError, Result};

/// Category assigned to meshes whose region has no record in a period.
pub const NO_PARTY: &str = "NO_PARTY";

/// Numeric region code (a county FIPS code in election tables).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegionId(pub u32);

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:05}", self.0)
    }
}

/// Period key (an election year).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Period(pub i32);

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One row of input data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(alias = "county_fips", alias = "fips")]
    pub region_id: RegionId,
    #[serde(alias = "party")]
    pub category: String,
    #[serde(alias = "candidatevotes", alias = "votes")]
    pub magnitude: f64,
    #[serde(alias = "year")]
    pub period: Period,
}

/// All records of one period, at most one per region.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    period: Option<Period>,
    records: HashMap<RegionId, Record>,
}

impl Dataset {
    /// Returns the record for `region`, if any.
    #[must_use]
    pub fn get(&self, region: RegionId) -> Option<&Record> {
        self.records.get(&region)
    }

    #[must_use]
    pub fn period(&self) -> Option<Period> {
        self.period
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.records.values()
    }

    /// Inserts a record, keeping the larger magnitude on a region collision.
    fn insert(&mut self, record: Record) {
        match self.records.get(&record.region_id) {
            Some(existing) if existing.magnitude >= record.magnitude => {
                tracing::warn!(
                    region = %record.region_id,
                    period = %record.period,
                    kept = %existing.category,
                    dropped = %record.category,
                    "duplicate record for region"
                );
            }
            Some(existing) => {
                tracing::warn!(
                    region = %record.region_id,
                    period = %record.period,
                    kept = %record.category,
                    dropped = %existing.category,
                    "duplicate record for region"
                );
                self.records.insert(record.region_id, record);
            }
            None => {
                self.records.insert(record.region_id, record);
            }
        }
    }
}

/// Records grouped by period into disjoint datasets.
#[derive(Debug, Clone, Default)]
pub struct DatasetIndex {
    datasets: BTreeMap<Period, Dataset>,
}

impl DatasetIndex {
    /// Groups `records` by period.
    ///
    /// Where a period holds several rows for one region (one row per
    /// candidate), the row with the largest magnitude wins.
    #[must_use]
    pub fn from_records(records: impl IntoIterator<Item = Record>) -> Self {
        let mut datasets: BTreeMap<Period, Dataset> = BTreeMap::new();
        for record in records {
            let dataset = datasets.entry(record.period).or_insert_with(|| Dataset {
                period: Some(record.period),
                records: HashMap::new(),
            });
            dataset.insert(record);
        }
        Self { datasets }
    }

    /// Parses a JSON array of records.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::Malformed`] if the document is not an array of records.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let records: Vec<Record> = serde_json::from_str(json).map_err(DataError::from)?;
        Ok(Self::from_records(records))
    }

    /// Returns the dataset for `period`, if loaded.
    #[must_use]
    pub fn dataset(&self, period: Period) -> Option<&Dataset> {
        self.datasets.get(&period)
    }

    /// Loaded periods in ascending order.
    pub fn periods(&self) -> impl Iterator<Item = Period> + '_ {
        self.datasets.keys().copied()
    }

    /// Largest magnitude over every period, or `None` when empty.
    #[must_use]
    pub fn max_magnitude(&self) -> Option<f64> {
        self.datasets
            .values()
            .flat_map(Dataset::records)
            .map(|r| r.magnitude)
            .filter(|m| m.is_finite())
            .reduce(f64::max)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }
}
