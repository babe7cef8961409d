#[cfg(feature = "logger")]
use chrono::Utc;
#[cfg(feature = "logger")]
use once_cell::sync::OnceCell;
#[cfg(feature = "logger")]
use std::{
    fs::File,
    io::{self, BufWriter, Write},
    sync::Mutex,
    time::Instant,
};

#[cfg(feature = "logger")]
static LOGGER: OnceCell<Logger> = OnceCell::new();

/// Where log lines end up: the console, or a file in the temp directory.
#[derive(Copy, Clone, PartialEq, Eq)]
pub enum LogKind {
    /// Log to stdout, the default choice.
    Stdout,

    /// Log to /tmp/tandem-<timestamp>.log
    File,
}

#[cfg(feature = "logger")]
struct Sink {
    writer: Box<dyn Write + Send>,
    started: Instant,
}

#[cfg(feature = "logger")]
impl Sink {
    fn new(kind: LogKind) -> Self {
        let started = Instant::now();
        let writer: Box<dyn Write + Send> = match kind {
            LogKind::Stdout => Box::new(io::stdout()),
            LogKind::File => {
                let filename = format!("tandem-{}.log", Utc::now().timestamp());
                let path = std::env::temp_dir().join(filename);
                eprintln!("Logging to file: {path:?}");
                // BufWriter batches writes, the emulator can log from hot paths
                Box::new(BufWriter::new(File::create(path).unwrap()))
            }
        };

        Self { writer, started }
    }

    fn log<T>(&mut self, data: T)
    where
        T: std::fmt::Display,
    {
        let elapsed = self.started.elapsed();
        let seconds = elapsed.as_secs();
        let hours = seconds / 3600;
        let minutes = (seconds / 60) % 60;
        let seconds = seconds % 60;
        let millis = elapsed.subsec_millis();

        writeln!(
            self.writer,
            "[{hours:02}:{minutes:02}:{seconds:02}.{millis:03}] {data}"
        )
        .unwrap();
    }

    fn flush(&mut self) {
        self.writer.flush().ok();
    }
}

#[cfg(feature = "logger")]
struct Logger {
    sink: Mutex<Sink>,
}

#[cfg(feature = "logger")]
impl Logger {
    fn new(kind: LogKind) -> Self {
        Self {
            sink: Mutex::new(Sink::new(kind)),
        }
    }

    fn log<T>(&self, data: T)
    where
        T: std::fmt::Display,
    {
        if let Ok(ref mut sink) = self.sink.lock() {
            sink.log(data);
        }
    }

    fn flush(&self) {
        if let Ok(ref mut sink) = self.sink.lock() {
            sink.flush();
        }
    }
}

/// Installs the global logger. Calling it twice is a no-op.
pub fn init_logger(kind: LogKind) {
    let _ = kind;
    #[cfg(feature = "logger")]
    LOGGER.set(Logger::new(kind)).ok();
}

/// Logs a line through the global logger. Compiles to nothing unless the
/// `logger` feature is enabled and [`init_logger`] was called.
pub fn log<T>(data: T)
where
    T: std::fmt::Display,
{
    let _ = data;
    #[cfg(feature = "logger")]
    if let Some(logger) = LOGGER.get() {
        logger.log(data);
    }
}

/// Flushes any buffered log lines to the sink. Useful before a potential
/// crash or at checkpoints; the file sink buffers aggressively.
pub fn flush() {
    #[cfg(feature = "logger")]
    if let Some(logger) = LOGGER.get() {
        logger.flush();
    }
}
