//! Spatial density/velocity profiles: per-cell means over a [`Grid`].
//!
//! Empty cells hold `0.0`, which is indistinguishable from a measured zero unless the caller
//! looks at [`Field::count`]. Samples outside every cell are dropped and only counted.

use crate::grid::Grid;
use crate::sample::Sample;
use serde::Serialize;

/// Row-major grid of cell values; rows follow the y bins, columns the x bins.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
    pub rows: usize,
    pub columns: usize,
    values: Vec<f64>,
    counts: Vec<u32>,
}

impl Field {
    fn from_contributions(rows: usize, columns: usize, mut entries: Vec<(usize, f64)>) -> Self {
        let cells = rows * columns;
        let mut values = vec![0.0; cells];
        let mut counts = vec![0u32; cells];

        // Summing each cell in sorted order makes the mean independent of input order.
        entries.sort_unstable_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.total_cmp(&b.1)));
        let mut i = 0;
        while i < entries.len() {
            let cell = entries[i].0;
            let mut sum = 0.0;
            let mut n = 0u32;
            while i < entries.len() && entries[i].0 == cell {
                sum += entries[i].1;
                n += 1;
                i += 1;
            }
            values[cell] = sum / f64::from(n);
            counts[cell] = n;
        }

        Self {
            rows,
            columns,
            values,
            counts,
        }
    }

    /// # Panics
    ///
    /// Panics if `row >= self.rows` or `column >= self.columns`; see [`Field::get`].
    pub fn value(&self, row: usize, column: usize) -> f64 {
        self.values[self.index(row, column)]
    }

    /// Number of samples that contributed to the cell.
    ///
    /// # Panics
    ///
    /// Panics if the cell lies outside the field, like [`Field::value`].
    pub fn count(&self, row: usize, column: usize) -> u32 {
        self.counts[self.index(row, column)]
    }

    /// Cell value and sample count, or `None` outside the field.
    pub fn get(&self, row: usize, column: usize) -> Option<(f64, u32)> {
        let i = self.checked_index(row, column)?;
        Some((self.values[i], self.counts[i]))
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn counts(&self) -> &[u32] {
        &self.counts
    }

    /// Rows from the lowest y bin upwards.
    pub fn rows_iter(&self) -> impl Iterator<Item = &[f64]> + '_ {
        self.values.chunks(self.columns.max(1))
    }

    pub fn occupied_cells(&self) -> usize {
        self.counts.iter().filter(|&&c| c > 0).count()
    }

    /// Statistics over every cell, empty cells included as zero.
    pub fn summary(&self) -> FieldSummary {
        if self.values.is_empty() {
            return FieldSummary::default();
        }
        let n = self.values.len() as f64;
        let mean = self.values.iter().sum::<f64>() / n;
        let var = self.values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
        let (min, max) = self
            .values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        FieldSummary {
            mean,
            std: var.sqrt(),
            max,
            min,
        }
    }

    fn checked_index(&self, row: usize, column: usize) -> Option<usize> {
        (row < self.rows && column < self.columns).then(|| row * self.columns + column)
    }

    fn index(&self, row: usize, column: usize) -> usize {
        match self.checked_index(row, column) {
            Some(i) => i,
            None => panic!(
                "cell ({row}, {column}) outside {}x{} field",
                self.rows, self.columns
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct FieldSummary {
    pub mean: f64,
    /// Population standard deviation.
    pub std: f64,
    pub max: f64,
    pub min: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileFields {
    pub density: Field,
    pub velocity: Field,
    /// Samples whose position fell outside every cell.
    pub dropped: usize,
}

pub fn aggregate_fields(samples: &[Sample], grid: &Grid) -> ProfileFields {
    let (rows, columns) = (grid.rows(), grid.columns());
    let mut density = Vec::with_capacity(samples.len());
    let mut velocity = Vec::with_capacity(samples.len());
    let mut dropped = 0usize;

    for s in samples {
        match grid.locate(s.x, s.y) {
            Some((row, column)) => {
                let cell = row * columns + column;
                density.push((cell, s.density));
                velocity.push((cell, s.velocity));
            }
            None => dropped += 1,
        }
    }

    tracing::debug!(
        samples = samples.len(),
        dropped,
        rows,
        columns,
        "aggregated profile fields"
    );

    ProfileFields {
        density: Field::from_contributions(rows, columns, density),
        velocity: Field::from_contributions(rows, columns, velocity),
        dropped,
    }
}
