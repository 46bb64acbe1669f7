use crate::foundation::error::{SlicecastError, SlicecastResult};

/// Handle to a block allocated from a [`FrameArena`].
///
/// Handles are only valid against the arena that issued them, and only until
/// that arena's next [`FrameArena::reset`]. Using a stale handle is a
/// programming error and panics on access.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArenaRange {
    start: usize,
    len: usize,
}

impl ArenaRange {
    /// Number of bytes in the block.
    pub fn len(self) -> usize {
        self.len
    }

    /// Return `true` when the block has zero length.
    pub fn is_empty(self) -> bool {
        self.len == 0
    }
}

/// Saturating allocation counters for one arena.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ArenaStats {
    /// Total `alloc` calls over the arena's lifetime.
    pub alloc_calls: u64,
    /// Total bytes handed out over the arena's lifetime.
    pub alloc_bytes: u64,
    /// Largest in-frame usage observed so far.
    pub high_water_bytes: usize,
    /// Number of frame resets.
    pub resets: u64,
}

/// Growable, resettable scratch region for transient per-frame allocations.
///
/// All pipeline stages of one worker allocate from the same arena (visible
/// sprite records, plane spans, clip-segment lists). The arena is reset at the
/// start of every frame; nothing allocated from it may be read after the
/// frame's drain completes. Allocations are zero-filled, so data from a
/// previous frame can never be observed through a fresh handle.
///
/// The backing store grows on demand up to a hard byte cap. Exceeding the cap
/// is a fatal [`SlicecastError::Resource`] for the frame; the arena never
/// silently truncates an allocation.
pub struct FrameArena {
    data: Vec<u8>,
    used: usize,
    cap_bytes: usize,
    stats: ArenaStats,
}

impl FrameArena {
    /// Create an empty arena bounded by `cap_bytes`.
    pub fn new(cap_bytes: usize) -> Self {
        Self {
            data: Vec::new(),
            used: 0,
            cap_bytes,
            stats: ArenaStats::default(),
        }
    }

    /// Allocate `len` zero-filled bytes, growing the backing store if needed.
    pub fn alloc(&mut self, len: usize) -> SlicecastResult<ArenaRange> {
        let end = self.used.checked_add(len).ok_or_else(|| {
            SlicecastError::resource("frame arena allocation size overflows usize")
        })?;
        if end > self.cap_bytes {
            return Err(SlicecastError::resource(format!(
                "frame arena exhausted: need {end} bytes, cap is {} bytes",
                self.cap_bytes
            )));
        }
        if end > self.data.len() {
            let grown = (self.data.len().saturating_mul(2)).clamp(end, self.cap_bytes);
            self.data.resize(grown, 0);
        }

        let range = ArenaRange {
            start: self.used,
            len,
        };
        self.data[range.start..end].fill(0);
        self.used = end;

        self.stats.alloc_calls = self.stats.alloc_calls.saturating_add(1);
        self.stats.alloc_bytes = self.stats.alloc_bytes.saturating_add(len as u64);
        self.stats.high_water_bytes = self.stats.high_water_bytes.max(self.used);
        Ok(range)
    }

    /// Read access to an allocated block.
    pub fn get(&self, range: ArenaRange) -> &[u8] {
        &self.data[range.start..range.start + range.len]
    }

    /// Write access to an allocated block.
    pub fn get_mut(&mut self, range: ArenaRange) -> &mut [u8] {
        &mut self.data[range.start..range.start + range.len]
    }

    /// Drop every in-frame allocation, keeping the backing capacity.
    ///
    /// Idempotent; calling it twice before the next allocation leaks nothing.
    pub fn reset(&mut self) {
        self.used = 0;
        self.stats.resets = self.stats.resets.saturating_add(1);
    }

    /// Bytes currently allocated in this frame.
    pub fn used_bytes(&self) -> usize {
        self.used
    }

    /// Hard byte cap configured at construction.
    pub fn cap_bytes(&self) -> usize {
        self.cap_bytes
    }

    /// Lifetime allocation counters.
    pub fn stats(&self) -> ArenaStats {
        self.stats
    }
}
