//! Leading/trailing debouncer
//!
//! Generic call coalescing: the first call of a burst invokes the callback
//! immediately, every further call inside the quiescence window re-arms
//! the timer, and once the window finally lapses one trailing invocation
//! covers everything that arrived after the leading edge. Any burst, no
//! matter how long, costs at most two invocations. The owner decides what
//! the callback does; this type only handles the timing.

use crossbeam_channel::{unbounded, RecvTimeoutError, Sender};
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::warn;

enum Command {
    Call,
    Cancel,
    Shutdown,
}

/// Debounced invoker of a fixed callback, backed by a timer thread.
pub struct Debouncer {
    commands: Sender<Command>,
    handle: Option<JoinHandle<()>>,
}

impl Debouncer {
    /// Spawns the timer thread around `callback`.
    pub fn new<F>(quiescence: Duration, mut callback: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        let (commands, receiver) = unbounded();
        let handle = std::thread::spawn(move || loop {
            // Idle: wait for the call that opens a burst.
            match receiver.recv() {
                Ok(Command::Call) => {}
                Ok(Command::Cancel) => continue,
                Ok(Command::Shutdown) | Err(_) => return,
            }
            callback();
            // Cooldown: coalesce further calls until the window lapses.
            let mut pending = false;
            loop {
                match receiver.recv_timeout(quiescence) {
                    Ok(Command::Call) => pending = true,
                    Ok(Command::Cancel) => break,
                    Ok(Command::Shutdown) => return,
                    Err(RecvTimeoutError::Timeout) => {
                        if pending {
                            callback();
                        }
                        break;
                    }
                    Err(RecvTimeoutError::Disconnected) => return,
                }
            }
        });
        Self {
            commands,
            handle: Some(handle),
        }
    }

    /// Schedules a debounced invocation.
    pub fn call(&self) {
        let _ = self.commands.send(Command::Call);
    }

    /// Drops the burst in progress; a pending trailing invocation is
    /// skipped.
    pub fn cancel(&self) {
        let _ = self.commands.send(Command::Cancel);
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        let _ = self.commands.send(Command::Shutdown);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("debouncer thread panicked");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    const WINDOW: Duration = Duration::from_millis(100);

    fn counting_debouncer() -> (Debouncer, Arc<AtomicUsize>) {
        let count = Arc::new(AtomicUsize::new(0));
        let inner = count.clone();
        let debouncer = Debouncer::new(WINDOW, move || {
            inner.fetch_add(1, Ordering::SeqCst);
        });
        (debouncer, count)
    }

    #[test]
    fn test_single_call_fires_once_immediately() {
        let (debouncer, count) = counting_debouncer();
        debouncer.call();

        std::thread::sleep(Duration::from_millis(10));
        assert_eq!(count.load(Ordering::SeqCst), 1);

        // The window lapses with nothing pending; no trailing call.
        std::thread::sleep(WINDOW * 3);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_burst_of_three_fires_at_most_twice() {
        let (debouncer, count) = counting_debouncer();
        debouncer.call();
        debouncer.call();
        debouncer.call();

        std::thread::sleep(WINDOW * 4);
        let fired = count.load(Ordering::SeqCst);
        assert!(fired <= 2, "expected leading plus one trailing, got {fired}");
        assert_eq!(fired, 2);
    }

    #[test]
    fn test_cancel_skips_pending_trailing_call() {
        let (debouncer, count) = counting_debouncer();
        debouncer.call();
        debouncer.call();
        debouncer.cancel();

        std::thread::sleep(WINDOW * 3);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_cancel_while_idle_is_harmless() {
        let (debouncer, count) = counting_debouncer();
        debouncer.cancel();
        debouncer.call();

        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_separated_bursts_each_get_a_leading_call() {
        let (debouncer, count) = counting_debouncer();
        debouncer.call();
        std::thread::sleep(WINDOW * 3);
        debouncer.call();
        std::thread::sleep(WINDOW * 3);

        assert_eq!(count.load(Ordering::SeqCst), 2);
    }
}
