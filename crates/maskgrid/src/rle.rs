//! Run-length codec over label grids.
//!
//! A grid flattens in scan order into runs of equal-valued cells. Runs
//! coalesce freely across row boundaries within one grid, but never across
//! the layer boundaries of [`encode_stack`]. The wire form of a stream is a
//! flat `u32` sequence alternating `length, value`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::debug;

use crate::error::{Error, Result};
use crate::grid::Grid;

/// One run: `length` consecutive scan-order cells holding `value`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Run {
    pub length: u32,
    pub value: u32,
}

impl Run {
    pub const fn new(length: u32, value: u32) -> Self {
        Run { length, value }
    }
}

/// An ordered stream of runs.
///
/// Wire contract: the serialized form is the flat even-length `u32`
/// sequence `[length, value, length, value, ...]`, lengths first. There is
/// no header and no shape; the decoder takes the shape as arguments.
/// Adjacent equal-valued runs are legal (the encoder emits them at layer
/// boundaries and when a run overflows `u32::MAX`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RleStream {
    runs: Vec<Run>,
}

impl RleStream {
    pub fn new() -> Self {
        RleStream::default()
    }

    /// Builds a stream from `(length, value)` pairs.
    pub fn from_pairs(pairs: &[(u32, u32)]) -> Self {
        RleStream {
            runs: pairs.iter().map(|&(l, v)| Run::new(l, v)).collect(),
        }
    }

    /// Appends a run without coalescing.
    pub fn push(&mut self, length: u32, value: u32) {
        self.runs.push(Run::new(length, value));
    }

    pub fn runs(&self) -> &[Run] {
        &self.runs
    }

    /// Number of runs in the stream.
    pub fn len(&self) -> usize {
        self.runs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Total number of cells the stream covers.
    pub fn total_len(&self) -> u64 {
        self.runs.iter().map(|r| r.length as u64).sum()
    }

    /// The flat wire form, `[length, value, ...]`.
    pub fn to_flat(&self) -> Vec<u32> {
        let mut flat = Vec::with_capacity(self.runs.len() * 2);
        for run in &self.runs {
            flat.push(run.length);
            flat.push(run.value);
        }
        flat
    }

    /// Parses the flat wire form.
    ///
    /// Fails with `InvalidRun` on an odd element count (the index names the
    /// truncated pair) or on a zero length.
    pub fn from_flat(flat: &[u32]) -> Result<Self> {
        if flat.len() % 2 != 0 {
            return Err(Error::InvalidRun {
                index: flat.len() / 2,
            });
        }
        let mut runs = Vec::with_capacity(flat.len() / 2);
        for (i, pair) in flat.chunks_exact(2).enumerate() {
            if pair[0] == 0 {
                return Err(Error::InvalidRun { index: i });
            }
            runs.push(Run::new(pair[0], pair[1]));
        }
        Ok(RleStream { runs })
    }
}

impl Serialize for RleStream {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(self.runs.iter().flat_map(|r| [r.length, r.value]))
    }
}

impl<'de> Deserialize<'de> for RleStream {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let flat = Vec::<u32>::deserialize(deserializer)?;
        RleStream::from_flat(&flat).map_err(serde::de::Error::custom)
    }
}

/// Encode a grid into a run stream.
///
/// Walks the cells once in scan order, closing a run whenever the value
/// changes. A run that would exceed `u32::MAX` cells is split into adjacent
/// equal-valued runs. A degenerate grid encodes to the empty stream.
pub fn encode(grid: &Grid) -> RleStream {
    let mut stream = RleStream::new();
    encode_into(&mut stream, grid);
    debug!(
        height = grid.height(),
        width = grid.width(),
        runs = stream.len(),
        "encoded grid"
    );
    stream
}

/// Encode a stack of same-shaped grids into one run stream.
///
/// Each layer is flattened independently and the runs appended in layer
/// order, so a run never crosses a layer boundary even when the adjacent
/// cells hold the same value. Layers whose dimensions differ from the first
/// layer's fail with `ShapeMismatch`; no runs are produced on failure.
pub fn encode_stack(layers: &[Grid]) -> Result<RleStream> {
    let mut stream = RleStream::new();
    if let Some(first) = layers.first() {
        for layer in layers {
            if layer.height() != first.height() || layer.width() != first.width() {
                return Err(Error::ShapeMismatch {
                    expected: first.area(),
                    actual: layer.area(),
                });
            }
        }
        for layer in layers {
            encode_into(&mut stream, layer);
        }
    }
    debug!(
        layers = layers.len(),
        runs = stream.len(),
        "encoded layer stack"
    );
    Ok(stream)
}

fn encode_into(stream: &mut RleStream, grid: &Grid) {
    let data = grid.data();
    let Some(&first) = data.first() else {
        return;
    };

    let mut value = first;
    let mut length: u32 = 0;
    for &cell in data {
        if cell == value && length < u32::MAX {
            length += 1;
        } else {
            stream.push(length, value);
            value = cell;
            length = 1;
        }
    }
    stream.push(length, value);
}

/// Decode a run stream into a `height x width` grid.
///
/// The stream must cover exactly `height * width` cells, else
/// `ShapeMismatch { expected, actual }`. A zero-length run fails with
/// `InvalidRun` before the totals are compared.
pub fn decode(stream: &RleStream, height: usize, width: usize) -> Result<Grid> {
    let actual = validate_lengths(stream)?;
    let expected = height.checked_mul(width).ok_or(Error::ShapeMismatch {
        expected: u64::MAX,
        actual,
    })?;
    if actual != expected as u64 {
        return Err(Error::ShapeMismatch {
            expected: expected as u64,
            actual,
        });
    }

    let mut data = Vec::with_capacity(expected);
    for run in stream.runs() {
        data.resize(data.len() + run.length as usize, run.value);
    }
    debug!(height, width, runs = stream.len(), "decoded grid");
    Grid::from_vec(height, width, data)
}

/// Decode a run stream into a flat cell sequence, with no reshape.
///
/// The result holds `total_len()` cells in stream order.
pub fn decode_flat(stream: &RleStream) -> Result<Vec<u32>> {
    let total = validate_lengths(stream)?;
    let mut data = Vec::with_capacity(total as usize);
    for run in stream.runs() {
        data.resize(data.len() + run.length as usize, run.value);
    }
    Ok(data)
}

/// Total cells covered by foreground runs.
///
/// Only sums runs whose value is nonzero.
pub fn area(stream: &RleStream) -> u64 {
    stream
        .runs()
        .iter()
        .filter(|r| r.value != 0)
        .map(|r| r.length as u64)
        .sum()
}

fn validate_lengths(stream: &RleStream) -> Result<u64> {
    let mut total = 0u64;
    for (i, run) in stream.runs().iter().enumerate() {
        if run.length == 0 {
            return Err(Error::InvalidRun { index: i });
        }
        total += run.length as u64;
    }
    Ok(total)
}
