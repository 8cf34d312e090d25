use crate::constants::console::INPUT_BUF;

/// Ring of accepted input bytes with three free-running counters.
///
/// `read <= ready <= edit`, each taken modulo `INPUT_BUF` to index `buf`.
/// Bytes in `read..ready` are published lines waiting for a reader; bytes in
/// `ready..edit` are the line still being edited. The counters wrap, which is
/// harmless because `INPUT_BUF` divides the counter range.
pub struct LineBuffer {
    buf: [u8; INPUT_BUF],
    read: usize,
    ready: usize,
    edit: usize,
}

impl LineBuffer {
    pub const fn new() -> LineBuffer {
        LineBuffer {
            buf: [0; INPUT_BUF],
            read: 0,
            ready: 0,
            edit: 0,
        }
    }

    fn slot(index: usize) -> usize {
        index % INPUT_BUF
    }

    pub fn has_room(&self) -> bool {
        self.edit.wrapping_sub(self.read) < INPUT_BUF
    }

    pub fn is_full(&self) -> bool {
        self.edit == self.read.wrapping_add(INPUT_BUF)
    }

    /// Appends to the line being edited. Callers check `has_room` first.
    pub fn push(&mut self, byte: u8) {
        debug_assert!(self.has_room());
        self.buf[Self::slot(self.edit)] = byte;
        self.edit = self.edit.wrapping_add(1);
    }

    /// Publishes everything typed so far to readers.
    pub fn commit(&mut self) {
        self.ready = self.edit;
    }

    /// Drops the last unpublished byte. False when nothing is being edited.
    pub fn erase(&mut self) -> bool {
        if self.edit == self.ready {
            return false;
        }
        self.edit = self.edit.wrapping_sub(1);
        true
    }

    /// One step of kill-line: drops the last unpublished byte unless it is a
    /// newline. Called until it returns false.
    pub fn kill_one(&mut self) -> bool {
        if self.edit == self.ready || self.buf[Self::slot(self.edit.wrapping_sub(1))] == b'\n' {
            return false;
        }
        self.edit = self.edit.wrapping_sub(1);
        true
    }

    pub fn has_ready(&self) -> bool {
        self.read != self.ready
    }

    pub fn pop(&mut self) -> Option<u8> {
        if !self.has_ready() {
            return None;
        }
        let byte = self.buf[Self::slot(self.read)];
        self.read = self.read.wrapping_add(1);
        Some(byte)
    }

    /// Puts the byte returned by the last `pop` back in front of the reader.
    pub fn unread(&mut self) {
        self.read = self.read.wrapping_sub(1);
    }

    /// Bytes typed but not yet published.
    pub fn pending(&self) -> usize {
        self.edit.wrapping_sub(self.ready)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(bytes: &[u8]) -> LineBuffer {
        let mut lb = LineBuffer::new();
        for &b in bytes {
            lb.push(b);
        }
        lb
    }

    #[test]
    fn nothing_ready_until_commit() {
        let mut lb = typed(b"ab");
        assert!(!lb.has_ready());
        assert_eq!(lb.pop(), None);
        lb.commit();
        assert_eq!(lb.pop(), Some(b'a'));
        assert_eq!(lb.pop(), Some(b'b'));
        assert_eq!(lb.pop(), None);
    }

    #[test]
    fn erase_stops_at_published_bytes() {
        let mut lb = typed(b"a\n");
        lb.commit();
        lb.push(b'x');
        assert!(lb.erase());
        assert!(!lb.erase());
        assert_eq!(lb.pending(), 0);
    }

    #[test]
    fn kill_line_empties_pending_line() {
        let mut lb = typed(b"abc");
        let mut killed = 0;
        while lb.kill_one() {
            killed += 1;
        }
        assert_eq!(killed, 3);
        assert_eq!(lb.pending(), 0);

        lb.push(b'z');
        lb.push(b'\n');
        lb.commit();
        assert_eq!(lb.pop(), Some(b'z'));
    }

    #[test]
    fn kill_line_on_empty_line_is_noop() {
        let mut lb = LineBuffer::new();
        assert!(!lb.kill_one());
        assert!(!lb.erase());
    }

    #[test]
    fn fills_to_capacity_and_no_further() {
        let mut lb = LineBuffer::new();
        for _ in 0..INPUT_BUF {
            assert!(lb.has_room());
            lb.push(b'x');
        }
        assert!(lb.is_full());
        assert!(!lb.has_room());
        lb.commit();
        lb.pop();
        assert!(lb.has_room());
    }

    #[test]
    fn unread_returns_last_byte() {
        let mut lb = typed(b"q");
        lb.commit();
        assert_eq!(lb.pop(), Some(b'q'));
        lb.unread();
        assert_eq!(lb.pop(), Some(b'q'));
    }

    #[test]
    fn counters_survive_wraparound() {
        let mut lb = LineBuffer {
            buf: [0; INPUT_BUF],
            read: usize::MAX - 1,
            ready: usize::MAX - 1,
            edit: usize::MAX - 1,
        };
        for &b in b"wrap\n" {
            lb.push(b);
        }
        lb.commit();
        let mut out = [0u8; 5];
        for slot in out.iter_mut() {
            *slot = lb.pop().unwrap();
        }
        assert_eq!(&out, b"wrap\n");
        assert!(lb.has_room());
    }
}
