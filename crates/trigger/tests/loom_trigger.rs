//! Model-checked interleavings of concurrent writers on one session.
//!
//! Run with `RUSTFLAGS="--cfg loom" cargo test -p condlog-trigger --test loom_trigger --release`.

#![cfg(loom)]

use condlog_ports::{Downstream, Level, LevelSink};
use condlog_trigger::{BufferPool, TriggerBuffer};
use loom::sync::Mutex;
use loom::thread;
use std::io;
use std::sync::Arc;

#[derive(Default)]
struct Recorder {
    entries: Mutex<Vec<Vec<u8>>>,
}

impl Recorder {
    fn entries(&self) -> Vec<Vec<u8>> {
        self.entries.lock().expect("recorder lock").clone()
    }
}

impl LevelSink for Recorder {
    fn write_level(&self, _level: Level, entry: &[u8]) -> io::Result<()> {
        self.entries.lock().expect("recorder lock").push(entry.to_vec());
        Ok(())
    }
}

fn session(recorder: &Arc<Recorder>) -> TriggerBuffer {
    let sink: Arc<dyn LevelSink> = recorder.clone();
    TriggerBuffer::with_pool(
        Arc::new(BufferPool::with_limits(1, 1024)),
        Downstream::Leveled(sink),
        Level::Debug,
        Level::Error,
    )
}

#[test]
fn held_and_triggering_entries_each_arrive_once() {
    loom::model(|| {
        let recorder = Arc::new(Recorder::default());
        let buffer = Arc::new(session(&recorder));

        let writer = {
            let buffer = Arc::clone(&buffer);
            thread::spawn(move || {
                let _ = buffer.write_entry(Level::Debug, b"held\n");
            })
        };
        let trigger = {
            let buffer = Arc::clone(&buffer);
            thread::spawn(move || {
                let _ = buffer.write_entry(Level::Error, b"boom\n");
            })
        };
        writer.join().expect("writer thread");
        trigger.join().expect("trigger thread");

        let entries = recorder.entries();
        assert_eq!(entries.len(), 2);
        let boom = entries.iter().position(|entry| entry == b"boom\n");
        let held = entries.iter().position(|entry| entry == b"held\n");
        assert!(boom.is_some() && held.is_some());
        assert!(buffer.is_triggered());
    });
}

#[test]
fn close_racing_writes_never_leaks_entries_after_close() {
    loom::model(|| {
        let recorder = Arc::new(Recorder::default());
        let buffer = Arc::new(session(&recorder));

        let writer = {
            let buffer = Arc::clone(&buffer);
            thread::spawn(move || buffer.write_entry(Level::Warn, b"maybe\n").is_ok())
        };
        buffer.close();
        let accepted = writer.join().expect("writer thread");

        assert_eq!(recorder.entries().len(), usize::from(accepted));
        assert!(buffer.is_closed());
    });
}
