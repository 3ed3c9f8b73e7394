use std::{
    panic::{self, AssertUnwindSafe},
    sync::Arc,
};

use crossbeam_channel::unbounded;

use crate::{ConversionProgress, ProgressSink};

/// The maximum number of items that are processed concurrently within a phase.
pub fn max_degree_of_parallelism() -> usize {
    num_cpus::get() * 2
}

/// An item to process in a phase.
pub(crate) struct PhaseItem<T> {
    /// Reported when processing of the item starts
    pub label: Option<String>,
    /// Larger items are started first
    pub size: usize,
    pub value: T,
}

/// Runs `op` for every item on a pool of worker threads and returns the results in the order
/// of `items`.
///
/// Items are started in order of descending size. `op` is expected to capture its own failures
/// in its result; a panic that escapes `op` or the progress sink is resumed on the calling thread
/// once every other item has been processed.
pub(crate) fn execute_phase<T, R, F>(
    title: &str,
    items: Vec<PhaseItem<T>>,
    progress: &ProgressSink,
    op: F,
) -> Vec<R>
where
    T: Send + 'static,
    R: Send + 'static,
    F: Fn(T) -> R + Send + Sync + 'static,
{
    progress.report(ConversionProgress::new(title));

    let count = items.len();
    if count == 0 {
        return Vec::new();
    }

    let mut items = items.into_iter().enumerate().collect::<Vec<_>>();
    items.sort_by(|(_, a), (_, b)| b.size.cmp(&a.size));

    let pool = threadpool::Builder::new()
        .num_threads(max_degree_of_parallelism().min(count).max(1))
        .thread_name(String::from("convey-worker"))
        .build();
    let (sender, receiver) = unbounded();
    let op = Arc::new(op);
    for (index, item) in items {
        let sender = sender.clone();
        let progress = progress.clone();
        let op = op.clone();
        pool.execute(move || {
            let result = panic::catch_unwind(AssertUnwindSafe(|| {
                if let Some(label) = item.label {
                    progress.report(ConversionProgress::new(label).with_weight(1));
                }
                op(item.value)
            }));
            // The receiver outlives all jobs
            let _ = sender.send((index, result));
        });
    }
    drop(sender);

    let mut results = (0..count).map(|_| None).collect::<Vec<_>>();
    let mut escaped_panic = None;
    for (index, result) in receiver {
        match result {
            Ok(result) => results[index] = Some(result),
            Err(payload) => {
                escaped_panic.get_or_insert(payload);
            }
        }
    }
    if let Some(payload) = escaped_panic {
        panic::resume_unwind(payload);
    }

    results.into_iter().flatten().collect()
}

#[cfg(test)]
mod tests {
    use std::{
        panic::{self, AssertUnwindSafe},
        sync::Arc,
    };

    use parking_lot::Mutex;

    use super::{execute_phase, PhaseItem};
    use crate::{ConversionProgress, CrashGuard, ProgressSink};

    #[test]
    fn preserves_input_order_and_reports_progress() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink: ProgressSink = {
            let events = events.clone();
            Arc::new(move |progress: ConversionProgress| events.lock().push(progress))
        };

        let items = (0..20usize)
            .map(|value| PhaseItem {
                label: Some(format!("item {value}")),
                size: value % 7,
                value,
            })
            .collect();
        let results = execute_phase("Phase:", items, &sink, |value| value * 10);

        assert_eq!(results, (0..20).map(|value| value * 10).collect::<Vec<_>>());

        let events = events.lock();
        assert_eq!(events[0], ConversionProgress::new("Phase:"));
        assert_eq!(events.len(), 21);
        assert!(events[1..].iter().all(|event| event.weight == 1));
    }

    #[test]
    fn empty_phase_still_reports_title() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink: ProgressSink = {
            let events = events.clone();
            Arc::new(move |progress: ConversionProgress| events.lock().push(progress))
        };
        let results: Vec<()> = execute_phase("Empty:", Vec::<PhaseItem<()>>::new(), &sink, |_| ());
        assert!(results.is_empty());
        assert_eq!(events.lock().len(), 1);
    }

    #[test]
    fn unlabeled_items_are_not_reported() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink: ProgressSink = {
            let events = events.clone();
            Arc::new(move |progress: ConversionProgress| events.lock().push(progress))
        };
        let items = vec![
            PhaseItem {
                label: None,
                size: 0,
                value: 1,
            },
            PhaseItem {
                label: Some("two".to_owned()),
                size: 0,
                value: 2,
            },
        ];
        assert_eq!(execute_phase("Phase:", items, &sink, |value| value), vec![1, 2]);
        assert_eq!(
            events.lock().last(),
            Some(&ConversionProgress::new("two").with_weight(1))
        );
    }

    #[test]
    fn panicking_progress_sink_is_resumed_on_caller() {
        let sink: ProgressSink = Arc::new(|progress: ConversionProgress| {
            if progress.message == "broken" {
                panic!("the sink is broken");
            }
        });
        let items = ["fine", "broken", "also fine"]
            .into_iter()
            .map(|label| PhaseItem {
                label: Some(label.to_owned()),
                size: 0,
                value: label,
            })
            .collect();

        let guard = CrashGuard::acquire(&[], Arc::new(|_: ConversionProgress| {}));
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            execute_phase("Phase:", items, &sink, |label| label.len())
        }));
        drop(guard);
        let payload = result.unwrap_err();
        assert_eq!(payload.downcast_ref::<&str>(), Some(&"the sink is broken"));
    }
}
