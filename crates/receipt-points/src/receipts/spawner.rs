/// Unit of background work handed to a [`TaskSpawner`].
pub type ScoreJob = Box<dyn FnOnce() + Send + 'static>;

/// Runs scoring jobs independently of the submitting caller.
///
/// Implementations must not run the job on the caller's stack; `submit` relies on this to
/// return before scoring finishes.
pub trait TaskSpawner: Send + Sync {
    fn spawn(&self, job: ScoreJob);
}

/// Spawns each job as its own task on the ambient tokio runtime.
///
/// Must be used from within a runtime context; `tokio::spawn` panics otherwise.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSpawner;

impl TaskSpawner for TokioSpawner {
    fn spawn(&self, job: ScoreJob) {
        tokio::spawn(async move { job() });
    }
}
