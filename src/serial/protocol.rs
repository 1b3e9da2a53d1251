// Block geometry for clone-mode transfers
// The radio image moves in fixed-size blocks starting at offset 0

use crate::drivers::traits::{Status, StatusCallback};

/// Block-based transfer plan over `total_size` bytes
#[derive(Debug, Clone, Copy)]
pub struct BlockProtocol {
    block_size: usize,
    total_size: usize,
}

impl BlockProtocol {
    /// Create a new block protocol
    pub fn new(block_size: usize, total_size: usize) -> Self {
        Self {
            block_size,
            total_size,
        }
    }

    pub fn total_size(&self) -> usize {
        self.total_size
    }

    /// Calculate number of blocks needed
    pub fn num_blocks(&self) -> usize {
        self.total_size.div_ceil(self.block_size)
    }

    /// Get the size of a specific block (last block may be smaller)
    pub fn block_size(&self, block_index: usize) -> usize {
        let remaining = self.total_size - self.block_offset(block_index);
        remaining.min(self.block_size)
    }

    /// Byte offset where a block starts
    pub fn block_offset(&self, block_index: usize) -> usize {
        block_index * self.block_size
    }

    /// Iterate `(offset, len)` for each block in ascending order
    pub fn blocks(&self) -> impl Iterator<Item = (usize, usize)> {
        let plan = *self;
        (0..plan.num_blocks()).map(move |i| (plan.block_offset(i), plan.block_size(i)))
    }

    /// Calculate progress percentage
    pub fn progress_percent(&self, bytes_transferred: usize) -> f32 {
        if self.total_size == 0 {
            return 100.0;
        }
        (bytes_transferred as f32 / self.total_size as f32) * 100.0
    }

    /// Build the status for a finished block and hand it to the callback
    pub fn report(
        &self,
        status_fn: Option<&StatusCallback>,
        verb: &str,
        block_index: usize,
    ) -> Status {
        let done = self.block_offset(block_index) + self.block_size(block_index);
        let status = Status::new(
            done,
            self.total_size,
            format!(
                "{} block {}/{} ({:.1}%)",
                verb,
                block_index + 1,
                self.num_blocks(),
                self.progress_percent(done)
            ),
        );

        if let Some(callback) = status_fn {
            callback(status.current, status.max, &status.message);
        }
        status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_block_protocol() {
        let protocol = BlockProtocol::new(64, 256);
        assert_eq!(protocol.num_blocks(), 4);
        assert_eq!(protocol.block_size(0), 64);
        assert_eq!(protocol.block_size(3), 64);

        // Test with non-aligned size
        let protocol = BlockProtocol::new(64, 200);
        assert_eq!(protocol.num_blocks(), 4);
        assert_eq!(protocol.block_size(0), 64);
        assert_eq!(protocol.block_size(3), 8); // Last block is smaller
    }

    #[test]
    fn test_uvk5_geometry() {
        let download = BlockProtocol::new(0x80, 0x2000);
        assert_eq!(download.num_blocks(), 64);
        let offsets: Vec<usize> = download.blocks().map(|(o, _)| o).collect();
        assert_eq!(offsets.first(), Some(&0));
        assert_eq!(offsets.last(), Some(&8064));

        let upload = BlockProtocol::new(0x80, 0x1D00);
        assert_eq!(upload.num_blocks(), 58);
        assert!(upload.blocks().all(|(_, len)| len == 0x80));
    }

    #[test]
    fn test_progress_calculation() {
        let protocol = BlockProtocol::new(64, 256);
        assert_eq!(protocol.progress_percent(0), 0.0);
        assert_eq!(protocol.progress_percent(128), 50.0);
        assert_eq!(protocol.progress_percent(256), 100.0);
    }

    #[test]
    fn test_report_invokes_callback() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let callback: StatusCallback = Box::new(move |cur, max, msg| {
            sink.lock().unwrap().push((cur, max, msg.to_string()));
        });

        let protocol = BlockProtocol::new(64, 256);
        let status = protocol.report(Some(&callback), "Cloning from radio", 1);
        assert_eq!(status.current, 128);

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, 128);
        assert_eq!(seen[0].1, 256);
        assert!(seen[0].2.contains("block 2/4"));
    }
}
