use crate::constants::console::BACKTRACE_DEPTH;

/// Follows a chain of saved frame pointers starting at `frame`, storing each
/// frame's return address into `pcs`. Slots past the end of the chain are
/// zeroed.
///
/// Each frame holds the caller's frame pointer at `frame` and the return
/// address one word above it. The walk stops at a null or misaligned frame,
/// or at one that does not lie above the previous frame on the stack.
pub fn caller_pcs(
    mut frame: usize,
    pcs: &mut [usize; BACKTRACE_DEPTH],
    read_word: impl Fn(usize) -> usize,
) {
    const WORD: usize = core::mem::size_of::<usize>();
    let mut depth = 0;
    while depth < BACKTRACE_DEPTH {
        if frame == 0 || frame % WORD != 0 || frame > usize::MAX - WORD {
            break;
        }
        pcs[depth] = read_word(frame + WORD);
        depth += 1;
        let next = read_word(frame);
        if next <= frame {
            break;
        }
        frame = next;
    }
    pcs[depth..].fill(0);
}

/// Local APIC id of the executing core, as reported by CPUID.
pub fn cpu_id() -> u32 {
    // SAFETY: CPUID leaf 1 exists on every x86_64 processor
    let leaf = unsafe { core::arch::x86_64::__cpuid(1) };
    leaf.ebx >> 24
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn stack(frames: &[(usize, usize, usize)]) -> HashMap<usize, usize> {
        let mut words = HashMap::new();
        for &(frame, next, ret) in frames {
            words.insert(frame, next);
            words.insert(frame + 8, ret);
        }
        words
    }

    #[test]
    fn walks_until_chain_ends() {
        let words = stack(&[(0x1000, 0x1040, 0xa1), (0x1040, 0x1100, 0xa2), (0x1100, 0, 0xa3)]);
        let mut pcs = [0xdead; BACKTRACE_DEPTH];
        caller_pcs(0x1000, &mut pcs, |addr| words.get(&addr).copied().unwrap_or(0));
        assert_eq!(&pcs[..3], &[0xa1, 0xa2, 0xa3]);
        assert!(pcs[3..].iter().all(|&pc| pc == 0));
    }

    #[test]
    fn stops_at_depth_limit() {
        let frames: Vec<_> = (0..20).map(|i| (0x1000 + i * 0x20, 0x1000 + (i + 1) * 0x20, i + 1)).collect();
        let words = stack(&frames);
        let mut pcs = [0; BACKTRACE_DEPTH];
        caller_pcs(0x1000, &mut pcs, |addr| words.get(&addr).copied().unwrap_or(0));
        assert_eq!(pcs, [1, 2, 3, 4, 5, 6, 7, 8, 9, 10]);
    }

    #[test]
    fn null_or_looping_frames_end_the_walk() {
        let mut pcs = [7; BACKTRACE_DEPTH];
        caller_pcs(0, &mut pcs, |_| 0);
        assert_eq!(pcs, [0; BACKTRACE_DEPTH]);

        let words = stack(&[(0x2000, 0x2000, 0xb1)]);
        caller_pcs(0x2000, &mut pcs, |addr| words.get(&addr).copied().unwrap_or(0));
        assert_eq!(pcs[0], 0xb1);
        assert!(pcs[1..].iter().all(|&pc| pc == 0));
    }
}
