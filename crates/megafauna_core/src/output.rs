//! Collection of per-day output across simulation units and time.

use crate::error::{Result, SimError};
use megafauna_data::{CombinedData, Date, DateInterval, Datapoint};

/// Sink for aggregated datapoints, implemented by the output crate.
pub trait OutputWriter: Send {
    fn write_datapoint(&mut self, datapoint: &Datapoint) -> Result<()>;
}

/// A writer that keeps all datapoints in memory; for tests and for hosts
/// that consume output programmatically.
///
/// Cloning yields another handle onto the same storage, so a caller can
/// keep one handle while the world owns the other.
#[derive(Debug, Clone, Default)]
pub struct MemoryWriter {
    datapoints: std::sync::Arc<std::sync::Mutex<Vec<Datapoint>>>,
}

impl MemoryWriter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A snapshot of everything written so far.
    #[must_use]
    pub fn datapoints(&self) -> Vec<Datapoint> {
        self.datapoints.lock().expect("writer lock poisoned").clone()
    }
}

impl OutputWriter for MemoryWriter {
    fn write_datapoint(&mut self, datapoint: &Datapoint) -> Result<()> {
        self.datapoints
            .lock()
            .expect("writer lock poisoned")
            .push(datapoint.clone());
        Ok(())
    }
}

/// Aggregates daily output from all simulation units until one output
/// interval is complete and the data can be handed to the writer.
///
/// All datapoints held at a time share the same date interval, so that
/// one consistent set is emitted per flush.
#[derive(Debug, Default)]
pub struct Aggregator {
    datapoints: Vec<Datapoint>,
    interval: Option<DateInterval>,
}

impl Aggregator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the output of one simulation unit for a completed day.
    pub fn add(&mut self, today: Date, aggregation_unit: &str, data: CombinedData) {
        match &mut self.interval {
            None => self.interval = Some(DateInterval::new(today, today)),
            Some(interval) => interval.extend(today),
        }
        match self
            .datapoints
            .iter_mut()
            .find(|datapoint| datapoint.aggregation_unit == aggregation_unit)
        {
            Some(datapoint) => datapoint.data.merge(&data),
            None => self.datapoints.push(Datapoint {
                aggregation_unit: aggregation_unit.to_string(),
                interval: DateInterval::new(today, today),
                data,
            }),
        }
    }

    /// Whether any data have been added since the last retrieval.
    #[must_use]
    pub fn has_data(&self) -> bool {
        !self.datapoints.is_empty()
    }

    /// The time span covered by the currently held data.
    pub fn interval(&self) -> Result<&DateInterval> {
        self.interval
            .as_ref()
            .ok_or_else(|| SimError::logic("no output data have been added yet"))
    }

    /// Hand out the aggregated data, one datapoint per aggregation unit,
    /// all with the same date interval, and reset.
    pub fn retrieve(&mut self) -> Vec<Datapoint> {
        let interval = self.interval.take();
        let mut result = std::mem::take(&mut self.datapoints);
        if let Some(interval) = interval {
            for datapoint in &mut result {
                datapoint.interval = interval;
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(day: u16, year: i32) -> Date {
        Date::new(day, year).unwrap()
    }

    #[test]
    fn test_empty_aggregator() {
        let mut agg = Aggregator::new();
        assert!(!agg.has_data());
        assert!(agg.interval().is_err());
        assert!(agg.retrieve().is_empty());
    }

    #[test]
    fn test_single_datapoint() {
        let mut agg = Aggregator::new();
        agg.add(date(1, 1), "unit1", CombinedData::default());
        assert_eq!(agg.interval().unwrap().first(), date(1, 1));

        let retrieved = agg.retrieve();
        assert_eq!(retrieved.len(), 1);
        assert_eq!(retrieved[0].interval.first(), date(1, 1));
        assert_eq!(retrieved[0].interval.last(), date(1, 1));
        assert!(!agg.has_data());
        assert!(agg.interval().is_err());
    }

    #[test]
    fn test_interval_extends() {
        let mut agg = Aggregator::new();
        agg.add(date(1, 1), "unit1", CombinedData::default());
        agg.add(date(10, 1), "unit1", CombinedData::default());
        let retrieved = agg.retrieve();
        assert_eq!(retrieved.len(), 1);
        assert_eq!(retrieved[0].interval.first(), date(1, 1));
        assert_eq!(retrieved[0].interval.last(), date(10, 1));
        assert_eq!(retrieved[0].data.datapoint_count, 2);
    }

    #[test]
    fn test_multiple_units_share_interval() {
        let mut agg = Aggregator::new();
        for day in [1, 10] {
            agg.add(date(day, 1), "unit1", CombinedData::default());
            agg.add(date(day, 1), "unit2", CombinedData::default());
        }
        agg.add(date(11, 1), "unit2", CombinedData::default());

        let retrieved = agg.retrieve();
        assert_eq!(retrieved.len(), 2);
        for datapoint in &retrieved {
            assert_eq!(datapoint.interval.first(), date(1, 1));
            assert_eq!(datapoint.interval.last(), date(11, 1));
        }
    }
}
