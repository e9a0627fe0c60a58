//! Bounded worker pool for file-parse tasks.
//!
//! `N` workers drain a channel of capacity `2·N`. Every submission carries a
//! cancellation token checked between dequeue and execution, a submission
//! counter supports ordered completion waiting, and closing the pool drains
//! workers without dropping queued tasks.

use crossbeam_channel::{bounded, Receiver, Sender};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::JoinHandle;
use std::time::Instant;

/// Shared cancellation flag with an optional deadline.
#[derive(Clone, Default)]
pub struct CancelToken {
    canceled: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            canceled: Arc::new(AtomicBool::new(false)),
            deadline: Some(deadline),
        }
    }

    pub fn cancel(&self) {
        self.canceled.store(true, Ordering::SeqCst);
    }

    pub fn is_canceled(&self) -> bool {
        if self.canceled.load(Ordering::SeqCst) {
            return true;
        }
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }
}

/// Handed to every task on execution.
pub struct TaskContext {
    pub task_id: u64,
    pub token: CancelToken,
}

type Task = Box<dyn FnOnce(&TaskContext) + Send + 'static>;

struct Job {
    id: u64,
    token: CancelToken,
    run: Task,
}

#[derive(Debug, thiserror::Error)]
#[error("task pool is closed")]
pub struct PoolClosed;

pub struct TaskPool {
    sender: Mutex<Option<Sender<Job>>>,
    pending: Arc<(Mutex<usize>, Condvar)>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    closed: AtomicBool,
    next_id: AtomicU64,
}

impl TaskPool {
    pub fn new(workers: usize) -> Self {
        let workers = workers.max(1);
        let (tx, rx) = bounded::<Job>(workers * 2);
        let pending = Arc::new((Mutex::new(0usize), Condvar::new()));

        let handles = (0..workers)
            .map(|_| {
                let rx: Receiver<Job> = rx.clone();
                let pending = Arc::clone(&pending);
                std::thread::spawn(move || {
                    for job in rx.iter() {
                        // A token canceled between submission and dequeue
                        // skips the task cleanly.
                        if !job.token.is_canceled() {
                            let ctx = TaskContext {
                                task_id: job.id,
                                token: job.token.clone(),
                            };
                            (job.run)(&ctx);
                        }
                        let (lock, cvar) = &*pending;
                        let mut count = lock.lock().expect("pending counter poisoned");
                        *count -= 1;
                        cvar.notify_all();
                    }
                })
            })
            .collect();

        Self {
            sender: Mutex::new(Some(tx)),
            pending,
            workers: Mutex::new(handles),
            closed: AtomicBool::new(false),
            next_id: AtomicU64::new(1),
        }
    }

    /// Enqueue a task, blocking when the channel is full. The counter is
    /// incremented before the enqueue so `wait` observes the submission.
    pub fn submit<F>(&self, token: CancelToken, task: F) -> Result<u64, PoolClosed>
    where
        F: FnOnce(&TaskContext) + Send + 'static,
    {
        if self.closed.load(Ordering::SeqCst) {
            return Err(PoolClosed);
        }
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);

        {
            let (lock, _) = &*self.pending;
            *lock.lock().expect("pending counter poisoned") += 1;
        }

        let sender = self.sender.lock().expect("sender poisoned");
        let Some(tx) = sender.as_ref() else {
            let (lock, cvar) = &*self.pending;
            *lock.lock().expect("pending counter poisoned") -= 1;
            cvar.notify_all();
            return Err(PoolClosed);
        };
        if tx
            .send(Job {
                id,
                token,
                run: Box::new(task),
            })
            .is_err()
        {
            let (lock, cvar) = &*self.pending;
            *lock.lock().expect("pending counter poisoned") -= 1;
            cvar.notify_all();
            return Err(PoolClosed);
        }
        Ok(id)
    }

    /// Block until every submitted task has completed.
    pub fn wait(&self) {
        let (lock, cvar) = &*self.pending;
        let mut count = lock.lock().expect("pending counter poisoned");
        while *count > 0 {
            count = cvar.wait(count).expect("pending counter poisoned");
        }
    }

    /// Idempotent: marks the pool closed, closes the channel, and joins the
    /// workers after they drain.
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.sender.lock().expect("sender poisoned").take();
        let handles: Vec<JoinHandle<()>> =
            std::mem::take(&mut *self.workers.lock().expect("workers poisoned"));
        for handle in handles {
            let _ = handle.join();
        }
    }
}

impl Drop for TaskPool {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    #[test]
    fn tasks_run_and_wait_blocks_until_done() {
        let pool = TaskPool::new(4);
        let counter = Arc::new(AtomicUsize::new(0));
        for _ in 0..32 {
            let counter = Arc::clone(&counter);
            pool.submit(CancelToken::new(), move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();
        }
        pool.wait();
        assert_eq!(counter.load(Ordering::SeqCst), 32);
    }

    #[test]
    fn canceled_before_dequeue_never_runs() {
        let pool = TaskPool::new(1);
        let ran = Arc::new(AtomicUsize::new(0));

        // Occupy the single worker so later submissions sit in the queue.
        let gate = Arc::new((Mutex::new(false), Condvar::new()));
        {
            let gate = Arc::clone(&gate);
            pool.submit(CancelToken::new(), move |_| {
                let (lock, cvar) = &*gate;
                let mut open = lock.lock().unwrap();
                while !*open {
                    open = cvar.wait(open).unwrap();
                }
            })
            .unwrap();
        }

        let token = CancelToken::new();
        {
            let ran = Arc::clone(&ran);
            pool.submit(token.clone(), move |_| {
                ran.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();
        }
        token.cancel();

        // Release the worker.
        {
            let (lock, cvar) = &*gate;
            *lock.lock().unwrap() = true;
            cvar.notify_all();
        }
        pool.wait();
        assert_eq!(ran.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn close_is_idempotent_and_rejects_new_work() {
        let pool = TaskPool::new(2);
        pool.submit(CancelToken::new(), |_| {}).unwrap();
        pool.wait();
        pool.close();
        pool.close();
        assert!(pool.submit(CancelToken::new(), |_| {}).is_err());
    }

    #[test]
    fn deadline_tokens_expire() {
        let token = CancelToken::with_deadline(Instant::now() - Duration::from_millis(1));
        assert!(token.is_canceled());
        let live = CancelToken::with_deadline(Instant::now() + Duration::from_secs(60));
        assert!(!live.is_canceled());
    }
}
