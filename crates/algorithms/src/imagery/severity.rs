//! Severity classification of index rasters
//!
//! Maps continuous NDVI, VCI and dNBR values onto ordinal classes using
//! fixed threshold tables. Each table is an ascending list of upper bounds
//! checked top to bottom; the first bound a value satisfies decides its
//! class, and anything above the last bound gets the table's overflow
//! class.

use crate::maybe_rayon::*;
use burnmap_core::raster::Raster;
use burnmap_core::{Error, Result};
use serde::Serialize;

use super::indices::build_output;

/// One row of a threshold table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassBreak {
    /// Upper bound of the class
    pub upper: f64,
    /// `true` for `value <= upper`, `false` for `value < upper`
    pub inclusive: bool,
    /// Class assigned when the bound is satisfied
    pub class: u8,
    /// Human-readable description
    pub label: &'static str,
}

impl ClassBreak {
    /// Class for values `<= upper`
    pub const fn at_most(upper: f64, class: u8, label: &'static str) -> Self {
        Self {
            upper,
            inclusive: true,
            class,
            label,
        }
    }

    /// Class for values `< upper`
    pub const fn below(upper: f64, class: u8, label: &'static str) -> Self {
        Self {
            upper,
            inclusive: false,
            class,
            label,
        }
    }

    fn contains(&self, value: f64) -> bool {
        if self.inclusive {
            value <= self.upper
        } else {
            value < self.upper
        }
    }
}

/// What a table does with NaN input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NanPolicy {
    /// NaN in, NaN out
    Propagate,
    /// NaN fails every comparison and lands in the overflow class
    FallThrough,
}

/// An ordered threshold table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdTable {
    /// Short name of the index the table applies to
    pub name: &'static str,
    /// Breaks in ascending order of `upper`
    pub breaks: &'static [ClassBreak],
    /// Class for values above every break
    pub overflow_class: u8,
    /// Label of the overflow class
    pub overflow_label: &'static str,
    /// Handling of NaN input
    pub nan: NanPolicy,
}

/// NDVI classes 1..=13, NaN propagates.
pub const NDVI_CLASSES: ThresholdTable = ThresholdTable {
    name: "ndvi",
    breaks: &[
        ClassBreak::at_most(-0.2, 1, "<= -0.2"),
        ClassBreak::at_most(0.0, 2, "-0.2 to 0.0"),
        ClassBreak::at_most(0.1, 3, "0.0 to 0.1"),
        ClassBreak::at_most(0.2, 4, "0.1 to 0.2"),
        ClassBreak::at_most(0.3, 5, "0.2 to 0.3"),
        ClassBreak::at_most(0.4, 6, "0.3 to 0.4"),
        ClassBreak::at_most(0.5, 7, "0.4 to 0.5"),
        ClassBreak::at_most(0.6, 8, "0.5 to 0.6"),
        ClassBreak::at_most(0.7, 9, "0.6 to 0.7"),
        ClassBreak::at_most(0.8, 10, "0.7 to 0.8"),
        ClassBreak::at_most(0.9, 11, "0.8 to 0.9"),
        ClassBreak::at_most(1.0, 12, "0.9 to 1.0"),
    ],
    overflow_class: 13,
    overflow_label: "> 1.0",
    nan: NanPolicy::Propagate,
};

/// VCI drought classes 1..=3.
///
/// NaN input is classified 3 ("no drought"). `vci` never produces NaN, so
/// this only matters for rasters built elsewhere.
pub const VCI_CLASSES: ThresholdTable = ThresholdTable {
    name: "vci",
    breaks: &[
        ClassBreak::below(0.35, 1, "severe drought"),
        ClassBreak::at_most(0.50, 2, "moderate drought"),
    ],
    overflow_class: 3,
    overflow_label: "no drought",
    nan: NanPolicy::FallThrough,
};

/// dNBR burn severity classes 1..=8, NaN propagates.
pub const DNBR_CLASSES: ThresholdTable = ThresholdTable {
    name: "dnbr",
    breaks: &[
        ClassBreak::at_most(-0.251, 1, "enhanced regrowth, high"),
        ClassBreak::at_most(-0.101, 2, "enhanced regrowth, low"),
        ClassBreak::at_most(0.099, 3, "unburned"),
        ClassBreak::at_most(0.269, 4, "low severity"),
        ClassBreak::at_most(0.439, 5, "moderate-low severity"),
        ClassBreak::at_most(0.659, 6, "moderate-high severity"),
        ClassBreak::at_most(1.3, 7, "high severity"),
    ],
    overflow_class: 8,
    overflow_label: "extreme severity",
    nan: NanPolicy::Propagate,
};

impl ThresholdTable {
    /// Class of a single value, as f64 so NaN can be returned.
    pub fn classify_value(&self, value: f64) -> f64 {
        if value.is_nan() && self.nan == NanPolicy::Propagate {
            return f64::NAN;
        }
        self.breaks
            .iter()
            .find(|b| b.contains(value))
            .map_or(self.overflow_class, |b| b.class) as f64
    }

    /// Number of classes, overflow included.
    pub fn class_count(&self) -> usize {
        self.breaks.len() + 1
    }

    /// All `(class, label)` pairs in ascending order.
    pub fn classes(&self) -> impl Iterator<Item = (u8, &'static str)> + '_ {
        self.breaks
            .iter()
            .map(|b| (b.class, b.label))
            .chain(std::iter::once((self.overflow_class, self.overflow_label)))
    }

    /// Label of a class, if the table defines it.
    pub fn label(&self, class: u8) -> Option<&'static str> {
        self.classes().find(|&(c, _)| c == class).map(|(_, l)| l)
    }

    /// Check that bounds and classes are strictly ascending.
    pub fn validate(&self) -> Result<()> {
        for pair in self.breaks.windows(2) {
            if !(pair[0].upper < pair[1].upper) {
                return Err(Error::InvalidParameter {
                    name: "breaks",
                    value: format!("{} then {}", pair[0].upper, pair[1].upper),
                    reason: format!("{} bounds must be strictly ascending", self.name),
                });
            }
        }
        let classes: Vec<u8> = self.classes().map(|(c, _)| c).collect();
        if classes.windows(2).any(|w| w[0] >= w[1]) {
            return Err(Error::InvalidParameter {
                name: "classes",
                value: format!("{:?}", classes),
                reason: format!("{} classes must be strictly increasing", self.name),
            });
        }
        Ok(())
    }
}

/// A raster of ordinal classes produced by [`classify`].
///
/// Kept apart from index rasters so that a class raster cannot be fed back
/// into the classifier:
///
/// ```compile_fail
/// use burnmap_algorithms::imagery::{classify, ClassRaster, NDVI_CLASSES};
///
/// fn classify_twice(classes: &ClassRaster) {
///     let _ = classify(classes, &NDVI_CLASSES);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ClassRaster {
    raster: Raster<f64>,
    table: &'static ThresholdTable,
}

impl ClassRaster {
    /// The classes as a float raster (NaN where unclassified)
    pub fn raster(&self) -> &Raster<f64> {
        &self.raster
    }

    /// Consume and return the underlying raster
    pub fn into_raster(self) -> Raster<f64> {
        self.raster
    }

    /// Table that produced the classes
    pub fn table(&self) -> &'static ThresholdTable {
        self.table
    }

    /// Dimensions as (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        self.raster.shape()
    }

    /// Class at (row, col); `None` where unclassified
    pub fn class_at(&self, row: usize, col: usize) -> Result<Option<u8>> {
        let v = self.raster.get(row, col)?;
        Ok((!v.is_nan()).then_some(v as u8))
    }

    /// Pixel counts per class
    pub fn summary(&self) -> ClassSummary {
        let mut counts = vec![0usize; self.table.class_count()];
        let classes: Vec<u8> = self.table.classes().map(|(c, _)| c).collect();
        let mut unclassified = 0;

        for &v in self.raster.data().iter() {
            if v.is_nan() {
                unclassified += 1;
                continue;
            }
            if let Some(i) = classes.iter().position(|&c| c as f64 == v) {
                counts[i] += 1;
            }
        }

        let classified: usize = counts.iter().sum();
        let classes = self
            .table
            .classes()
            .zip(counts)
            .map(|((class, label), count)| ClassCount {
                class,
                label,
                count,
                fraction: if classified > 0 {
                    count as f64 / classified as f64
                } else {
                    0.0
                },
            })
            .collect();

        ClassSummary {
            index: self.table.name,
            total_pixels: self.raster.len(),
            unclassified,
            classes,
        }
    }
}

/// Per-class pixel counts of a [`ClassRaster`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassSummary {
    pub index: &'static str,
    pub total_pixels: usize,
    pub unclassified: usize,
    pub classes: Vec<ClassCount>,
}

/// Count for one class; `fraction` is relative to classified pixels.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassCount {
    pub class: u8,
    pub label: &'static str,
    pub count: usize,
    pub fraction: f64,
}

/// Classify every pixel of an index raster with `table`.
///
/// # Errors
/// [`Error::InvalidParameter`] if the table is not strictly ascending.
pub fn classify(index: &Raster<f64>, table: &'static ThresholdTable) -> Result<ClassRaster> {
    table.validate()?;

    let (rows, cols) = index.shape();

    let data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = Vec::with_capacity(cols);
            for col in 0..cols {
                let val = unsafe { index.get_unchecked(row, col) };
                row_data.push(table.classify_value(val));
            }
            row_data
        })
        .collect();

    Ok(ClassRaster {
        raster: build_output(rows, cols, data)?,
        table,
    })
}

/// Class of a single value under `table`; see [`ThresholdTable::classify_value`].
pub fn classify_value(value: f64, table: &ThresholdTable) -> f64 {
    table.classify_value(value)
}

/// Classify an NDVI raster with [`NDVI_CLASSES`].
pub fn classify_ndvi(ndvi: &Raster<f64>) -> Result<ClassRaster> {
    classify(ndvi, &NDVI_CLASSES)
}

/// Classify a VCI raster with [`VCI_CLASSES`].
pub fn classify_vci(vci: &Raster<f64>) -> Result<ClassRaster> {
    classify(vci, &VCI_CLASSES)
}

/// Classify a dNBR raster with [`DNBR_CLASSES`].
pub fn classify_dnbr(dnbr: &Raster<f64>) -> Result<ClassRaster> {
    classify(dnbr, &DNBR_CLASSES)
}
