use std::sync::Arc;

/// A progress event emitted during a conversion.
///
/// Phase banners have a weight of zero, the start of the conversion of a single document has a
/// weight of one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConversionProgress {
    pub message: String,
    pub weight: u32,
}

impl ConversionProgress {
    pub fn new(message: impl Into<String>) -> Self {
        ConversionProgress {
            message: message.into(),
            weight: 0,
        }
    }

    pub fn with_weight(mut self, weight: u32) -> Self {
        self.weight = weight;
        self
    }
}

/// Receives progress events. Events may be reported from any worker thread.
pub trait ReportProgress: Send + Sync {
    fn report(&self, progress: ConversionProgress);
}

impl<F> ReportProgress for F
where
    F: Fn(ConversionProgress) + Send + Sync,
{
    fn report(&self, progress: ConversionProgress) {
        self(progress);
    }
}

/// Discards all progress events.
#[derive(Debug, Clone, Copy, Default)]
pub struct IgnoreProgress;

impl ReportProgress for IgnoreProgress {
    fn report(&self, _progress: ConversionProgress) {}
}

/// A shared handle to the receiver of progress events.
pub type ProgressSink = Arc<dyn ReportProgress>;
