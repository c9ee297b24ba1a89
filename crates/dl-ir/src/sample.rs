//! Sample tables and the sample library.

use alloc::vec::Vec;
use arrayvec::ArrayString;

/// An immutable mono PCM sample table.
///
/// Element 0 of every table is silence. A voice reads element 0 while it is
/// idle, so the constructor prepends a silent head to the supplied data.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sample {
    /// Sample name
    pub name: ArrayString<16>,
    data: Vec<i16>,
}

impl Sample {
    /// Create a sample from raw PCM, prepending the silent head element.
    ///
    /// Empty input still yields a two-element table so that a triggered
    /// voice (which starts reading at index 1) stays in range.
    pub fn new(name: &str, pcm: &[i16]) -> Self {
        let mut data = Vec::with_capacity(pcm.len() + 2);
        data.push(0);
        data.extend_from_slice(pcm);
        if data.len() < 2 {
            data.push(0);
        }

        Self {
            name: truncated(name),
            data,
        }
    }

    /// Length of the table, including the silent head.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Always false: every table holds at least the head and one frame.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Value at `pos`, or silence past the end.
    #[inline]
    pub fn get(&self, pos: usize) -> i16 {
        self.data.get(pos).copied().unwrap_or(0)
    }

    /// The whole table, head included.
    pub fn data(&self) -> &[i16] {
        &self.data
    }

    /// Largest absolute amplitude in the table.
    pub fn peak(&self) -> u16 {
        self.data
            .iter()
            .map(|s| s.unsigned_abs())
            .max()
            .unwrap_or(0)
    }
}

/// Copy as much of `s` as fits, cut at a char boundary.
pub(crate) fn truncated<const CAP: usize>(s: &str) -> ArrayString<CAP> {
    let mut end = s.len().min(CAP);
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    let mut out = ArrayString::new();
    out.push_str(&s[..end]);
    out
}

/// Ordered collection of sample tables, addressed by index.
#[derive(Clone, Debug, Default)]
pub struct SampleLibrary {
    samples: Vec<Sample>,
}

impl SampleLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a sample and return its index.
    pub fn push(&mut self, sample: Sample) -> usize {
        self.samples.push(sample);
        self.samples.len() - 1
    }

    pub fn get(&self, index: usize) -> Option<&Sample> {
        self.samples.get(index)
    }

    /// Find a sample index by name.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.samples.iter().position(|s| s.name.as_str() == name)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sample> {
        self.samples.iter()
    }
}
