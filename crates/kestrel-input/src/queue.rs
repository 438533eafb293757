use std::sync::atomic::{AtomicU64, Ordering};

use kestrel_core::profiling::profile_function;
use kestrel_core::{QueueError, ThreadOwner};
use parking_lot::Mutex;

use crate::event::InputEvent;
use crate::processor::InputProcessor;

/// Append-only buffer of input events, drained once per frame.
///
/// Producers (native callbacks, possibly on a poll thread) only ever take the
/// buffer lock for a push. The consumer swaps the whole buffer out under the
/// lock and replays it afterwards, so a slow processor never blocks a
/// producer, and anything pushed during a replay waits for the next drain.
#[derive(Debug, Default)]
pub struct InputEventQueue {
    pending: Mutex<Vec<InputEvent>>,
    current_event_time: AtomicU64,
    owner: ThreadOwner,
}

impl InputEventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event. Never blocks on consumer work and never drops.
    pub fn push(&self, event: InputEvent) {
        self.pending.lock().push(event);
    }

    /// Replay every event pushed since the previous drain, in push order.
    ///
    /// With no processor the events are discarded. Returns how many events
    /// were replayed. Only the owning thread (the first one to drain) may call
    /// this.
    pub fn drain(&self, mut processor: Option<&mut dyn InputProcessor>) -> Result<usize, QueueError> {
        profile_function!();
        self.owner.check("input event")?;

        let events = std::mem::take(&mut *self.pending.lock());
        if events.is_empty() {
            return Ok(0);
        }

        for event in &events {
            self.current_event_time.store(event.timestamp, Ordering::Release);
            if let Some(processor) = processor.as_deref_mut() {
                event.dispatch(processor);
            }
        }

        tracing::trace!(count = events.len(), "drained input events");
        Ok(events.len())
    }

    /// Timestamp of the event currently (or most recently) being replayed.
    pub fn current_event_time(&self) -> u64 {
        self.current_event_time.load(Ordering::Acquire)
    }

    pub fn len(&self) -> usize {
        self.pending.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.lock().is_empty()
    }

    /// Bind the consumer side to the calling thread ahead of the first drain.
    pub fn bind_to_current_thread(&self) -> Result<(), QueueError> {
        self.owner.bind_current("input event")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::InputEventKind;
    use crate::key::Key;
    use std::sync::Arc;
    use std::thread;

    #[derive(Default)]
    struct Collect {
        keys: Vec<Key>,
        times: Vec<u64>,
        queue: Option<Arc<InputEventQueue>>,
    }

    impl InputProcessor for Collect {
        fn key_down(&mut self, key: Key) -> bool {
            self.keys.push(key);
            if let Some(queue) = &self.queue {
                self.times.push(queue.current_event_time());
                // Lands in the next drain, not this one.
                queue.push(key_down(Key::Z, 99));
            }
            true
        }
    }

    fn key_down(key: Key, timestamp: u64) -> InputEvent {
        InputEvent::new(InputEventKind::KeyDown { key }, timestamp)
    }

    #[test]
    fn test_drain_replays_in_push_order() {
        let queue = InputEventQueue::new();
        queue.push(key_down(Key::A, 1));
        queue.push(key_down(Key::B, 2));
        queue.push(key_down(Key::C, 3));

        let mut sink = Collect::default();
        assert_eq!(queue.drain(Some(&mut sink)).unwrap(), 3);
        assert_eq!(sink.keys, vec![Key::A, Key::B, Key::C]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_empty_drain_is_noop() {
        let queue = InputEventQueue::new();
        let mut sink = Collect::default();
        assert_eq!(queue.drain(Some(&mut sink)).unwrap(), 0);
        assert!(sink.keys.is_empty());
        assert_eq!(queue.current_event_time(), 0);
    }

    #[test]
    fn test_drain_without_processor_discards() {
        let queue = InputEventQueue::new();
        queue.push(key_down(Key::A, 1));
        assert_eq!(queue.drain(None).unwrap(), 1);

        let mut sink = Collect::default();
        assert_eq!(queue.drain(Some(&mut sink)).unwrap(), 0);
        assert!(sink.keys.is_empty());
    }

    #[test]
    fn test_push_during_drain_lands_in_next_drain() {
        let queue = Arc::new(InputEventQueue::new());
        queue.push(key_down(Key::A, 10));
        queue.push(key_down(Key::B, 20));

        let mut sink = Collect {
            queue: Some(queue.clone()),
            ..Default::default()
        };
        assert_eq!(queue.drain(Some(&mut sink)).unwrap(), 2);
        assert_eq!(sink.keys, vec![Key::A, Key::B]);
        assert_eq!(sink.times, vec![10, 20]);
        assert_eq!(queue.len(), 2);

        sink.queue = None;
        assert_eq!(queue.drain(Some(&mut sink)).unwrap(), 2);
        assert_eq!(&sink.keys[2..], &[Key::Z, Key::Z]);
        assert_eq!(queue.current_event_time(), 99);
    }

    #[test]
    fn test_concurrent_pushes_land_exactly_once() {
        let queue = Arc::new(InputEventQueue::new());
        let producers: Vec<_> = (0..4u64)
            .map(|thread_index| {
                let queue = queue.clone();
                thread::spawn(move || {
                    for i in 0..250u64 {
                        queue.push(key_down(Key::A, thread_index * 1000 + i));
                    }
                })
            })
            .collect();

        let mut seen = Vec::new();
        struct Stamps<'a>(&'a mut Vec<u64>, &'a InputEventQueue);
        impl InputProcessor for Stamps<'_> {
            fn key_down(&mut self, _key: Key) -> bool {
                self.0.push(self.1.current_event_time());
                false
            }
        }

        while producers.iter().any(|p| !p.is_finished()) {
            queue.drain(Some(&mut Stamps(&mut seen, &queue))).unwrap();
        }
        for producer in producers {
            producer.join().unwrap();
        }
        queue.drain(Some(&mut Stamps(&mut seen, &queue))).unwrap();

        assert_eq!(seen.len(), 1000);
        // Per-producer order is preserved.
        for thread_index in 0..4u64 {
            let from_thread: Vec<u64> = seen
                .iter()
                .copied()
                .filter(|t| t / 1000 == thread_index)
                .collect();
            let expected: Vec<u64> = (0..250).map(|i| thread_index * 1000 + i).collect();
            assert_eq!(from_thread, expected);
        }
    }

    #[test]
    fn test_drain_from_other_thread_is_rejected() {
        let queue = Arc::new(InputEventQueue::new());
        queue.bind_to_current_thread().unwrap();

        let remote = queue.clone();
        let result = thread::spawn(move || remote.drain(None)).join().unwrap();
        assert!(matches!(result, Err(QueueError::WrongThread { .. })));
    }
}
