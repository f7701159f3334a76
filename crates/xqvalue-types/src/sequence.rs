//! Sequence encoding
//!
//! A sequence payload is a `u32` item count followed by each item as a
//! `u32` length and its tagged encoding. The value layer only needs to
//! recognize sequences, unwrap single items and produce the empty sequence.

use crate::sink::ValueSink;
use crate::tag::ValueTag;
use crate::view::{self, TaggedValue, ValueView};
use crate::writer::write_tag;
use xqvalue_diagnostics::{Result, XqError};

/// Zero-copy view over a sequence payload
#[derive(Debug, Clone, Copy)]
pub struct SequenceView<'a> {
    count: u32,
    items: &'a [u8],
}

impl<'a> SequenceView<'a> {
    /// Number of items
    pub fn len(&self) -> usize {
        self.count as usize
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn iter(&self) -> SequenceIter<'a> {
        SequenceIter {
            remaining: self.count,
            rest: self.items,
        }
    }

    /// The only item of a one-item sequence
    pub fn single(&self) -> Result<Option<TaggedValue<'a>>> {
        match self.count {
            0 => Ok(None),
            1 => self.iter().next().transpose(),
            n => Err(XqError::internal(format!("expected at most one item, found {n}"))),
        }
    }
}

impl<'a> ValueView<'a> for SequenceView<'a> {
    const KIND: &'static str = "sequence";

    fn accepts(tag: ValueTag) -> bool {
        tag == ValueTag::Sequence
    }

    fn bind_payload(_tag: ValueTag, payload: &'a [u8]) -> Result<Self> {
        if payload.len() < 4 {
            return Err(XqError::malformed("sequence item count is truncated"));
        }
        let view = Self {
            count: view::read_count(payload),
            items: &payload[4..],
        };
        // Walk once so iteration can never hit a truncated item.
        let mut rest = view.items;
        for _ in 0..view.count {
            let (item, tail) = view::split_length_prefixed("sequence item", rest)?;
            TaggedValue::new(item)?;
            rest = tail;
        }
        if !rest.is_empty() {
            return Err(XqError::malformed(format!("sequence has {} trailing bytes", rest.len())));
        }
        Ok(view)
    }
}

/// Iterator over the items of a sequence
#[derive(Debug, Clone)]
pub struct SequenceIter<'a> {
    remaining: u32,
    rest: &'a [u8],
}

impl<'a> Iterator for SequenceIter<'a> {
    type Item = Result<TaggedValue<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let item = view::split_length_prefixed("sequence item", self.rest).and_then(|(item, tail)| {
            self.rest = tail;
            TaggedValue::new(item)
        });
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining as usize, Some(self.remaining as usize))
    }
}

/// Write the empty sequence
pub fn write_empty_sequence(sink: &mut (impl ValueSink + ?Sized)) {
    write_tag(sink, ValueTag::Sequence);
    sink.write_u32(0);
}

/// Incrementally writes a sequence, patching the item count on `finish`
pub struct SequenceBuilder<'s, S: ValueSink + ?Sized> {
    sink: &'s mut S,
    count_offset: usize,
    count: u32,
}

impl<'s, S: ValueSink + ?Sized> SequenceBuilder<'s, S> {
    pub fn new(sink: &'s mut S) -> Self {
        write_tag(sink, ValueTag::Sequence);
        let count_offset = sink.len();
        sink.write_u32(0);
        Self {
            sink,
            count_offset,
            count: 0,
        }
    }

    /// Append one tagged value
    pub fn push(&mut self, item: &[u8]) -> Result<()> {
        TaggedValue::new(item)?;
        let len = u32::try_from(item.len())
            .map_err(|_| XqError::internal("sequence item exceeds the encodable length"))?;
        self.sink.write_u32(len);
        self.sink.write_bytes(item);
        self.count += 1;
        Ok(())
    }

    /// Patch the item count and release the sink
    pub fn finish(self) -> Result<usize> {
        self.sink.patch(self.count_offset, &self.count.to_be_bytes())?;
        Ok(self.count as usize)
    }
}
