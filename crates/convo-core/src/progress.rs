/// Receives human-readable progress while a conversation loads.
///
/// Calls are fire-and-forget: implementations must not block the loader.
pub trait ProgressPublisher {
    fn publish(&self, progress: &str);
}

impl<F> ProgressPublisher for F
where
    F: Fn(&str),
{
    fn publish(&self, progress: &str) {
        self(progress)
    }
}

/// Publisher that drops everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressPublisher for NoProgress {
    fn publish(&self, _progress: &str) {}
}
