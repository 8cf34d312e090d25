use core::sync::atomic::{AtomicU8, Ordering};
use spin::{Mutex, MutexGuard};
use x86_64::instructions::interrupts;
use crate::println;

/// What the console needs from the rest of the kernel to block and wake tasks.
pub trait Scheduler {
    /// Parks the current task until `wakeup`, releasing `guard` while parked
    /// and holding the re-acquired lock on return. May return spuriously.
    fn sleep<'a, T>(&self, lock: &'a Mutex<T>, guard: MutexGuard<'a, T>) -> MutexGuard<'a, T>;

    /// Makes every task parked in `sleep` runnable.
    fn wakeup(&self);

    /// Whether the current task has been asked to terminate.
    fn killed(&self) -> bool;

    /// Prints the task table. Never called with the console lock held.
    fn procdump(&self);

    /// Runs `f` with the interrupt that feeds the console masked.
    fn without_interrupts<R>(&self, f: impl FnOnce() -> R) -> R {
        f()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
enum TaskState {
    Running = 0,
    Sleeping = 1,
    Runnable = 2,
}

impl TaskState {
    fn from_u8(raw: u8) -> TaskState {
        match raw {
            1 => TaskState::Sleeping,
            2 => TaskState::Runnable,
            _ => TaskState::Running,
        }
    }

    fn name(self) -> &'static str {
        match self {
            TaskState::Running => "run",
            TaskState::Sleeping => "sleep",
            TaskState::Runnable => "runble",
        }
    }
}

/// The boot task, the only task this kernel runs. Sleeping halts the CPU
/// with interrupts enabled until the next interrupt arrives.
pub struct KernelTasks {
    state: AtomicU8,
}

impl KernelTasks {
    pub const fn new() -> KernelTasks {
        KernelTasks { state: AtomicU8::new(TaskState::Running as u8) }
    }

    fn set(&self, state: TaskState) {
        self.state.store(state as u8, Ordering::SeqCst);
    }
}

impl Scheduler for KernelTasks {
    fn sleep<'a, T>(&self, lock: &'a Mutex<T>, guard: MutexGuard<'a, T>) -> MutexGuard<'a, T> {
        self.set(TaskState::Sleeping);
        drop(guard);
        // sti; hlt is atomic, so a wakeup cannot slip in between
        interrupts::enable_and_hlt();
        interrupts::disable();
        self.set(TaskState::Running);
        lock.lock()
    }

    fn wakeup(&self) {
        let _ = self.state.compare_exchange(
            TaskState::Sleeping as u8,
            TaskState::Runnable as u8,
            Ordering::SeqCst,
            Ordering::SeqCst,
        );
    }

    fn killed(&self) -> bool {
        false
    }

    fn procdump(&self) {
        let state = TaskState::from_u8(self.state.load(Ordering::SeqCst));
        println!("1 {} init", state.name());
    }

    fn without_interrupts<R>(&self, f: impl FnOnce() -> R) -> R {
        interrupts::without_interrupts(f)
    }
}
