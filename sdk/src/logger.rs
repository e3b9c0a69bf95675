//! Structured logging helpers.
use std::sync::RwLock;

use once_cell::sync::Lazy;
use slog::{o, Discard, Logger};

static ROOT_LOGGER: Lazy<RwLock<Logger>> = Lazy::new(|| RwLock::new(Logger::root(Discard, o!())));

/// Configure the root logger that all SDK loggers derive from.
///
/// Until this is called, log records are discarded. Loggers obtained through `get_logger` before
/// the call keep using the previous root.
pub fn set_root_logger(logger: Logger) {
    let mut guard = match ROOT_LOGGER.write() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    *guard = logger;
}

/// Return a logger for the given SDK module.
pub fn get_logger(module: &'static str) -> Logger {
    let guard = match ROOT_LOGGER.read() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    guard.new(o!("module" => module))
}

#[cfg(test)]
mod test {
    use std::sync::{Arc, Mutex};

    use slog::{Drain, OwnedKVList, Record};

    use super::*;

    struct Collect(Arc<Mutex<Vec<String>>>);

    impl Drain for Collect {
        type Ok = ();
        type Err = slog::Never;

        fn log(&self, record: &Record<'_>, _values: &OwnedKVList) -> Result<(), slog::Never> {
            self.0.lock().unwrap().push(record.msg().to_string());
            Ok(())
        }
    }

    #[test]
    fn test_root_logger() {
        let records = Arc::new(Mutex::new(Vec::new()));
        set_root_logger(Logger::root(Collect(records.clone()).fuse(), o!()));

        let logger = get_logger("logger/test");
        slog::info!(logger, "hello"; "answer" => 42);

        assert!(records
            .lock()
            .unwrap()
            .iter()
            .any(|msg| msg == "hello"));

        set_root_logger(Logger::root(Discard, o!()));
    }
}
