/// Multiview GL driver - process-wide registry of contexts and the logger
///
/// Contexts are usable on their own (`Context::new`); the driver gives them
/// names and shares them as `Arc<Mutex<Context>>` across threads. The global
/// logger lives here too and is consulted by every logging macro.

use std::sync::{OnceLock, RwLock, Arc, Mutex};
use std::time::SystemTime;
use rustc_hash::FxHashMap;
use crate::context::{Context, ContextConfig};
use crate::error::{Result, Error};
use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};

// ===== INTERNAL STATE =====

/// Global driver state storage
static DRIVER_STATE: OnceLock<DriverState> = OnceLock::new();

/// Global logger (initialized with DefaultLogger)
static LOGGER: OnceLock<RwLock<Box<dyn Logger>>> = OnceLock::new();

/// Internal state structure holding the named contexts
struct DriverState {
    contexts: RwLock<FxHashMap<String, Arc<Mutex<Context>>>>,
}

impl DriverState {
    fn new() -> Self {
        Self {
            contexts: RwLock::new(FxHashMap::default()),
        }
    }
}

fn logger_lock() -> &'static RwLock<Box<dyn Logger>> {
    LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger::default())))
}

// ===== PUBLIC API =====

/// Driver singleton manager
///
/// # Example
///
/// ```no_run
/// use multiview_gl::mvgl::{Driver, ContextConfig};
///
/// Driver::initialize()?;
/// let context = Driver::create_context("main", ContextConfig::default())?;
/// {
///     let mut context = context.lock().unwrap();
///     context.request_extension("GL_ANGLE_multiview")?;
/// }
/// Driver::shutdown();
/// # Ok::<(), multiview_gl::mvgl::Error>(())
/// ```
pub struct Driver;

impl Driver {
    /// Log driver errors before returning them
    fn log_and_return_error(error: Error) -> Error {
        match &error {
            Error::InitializationFailed(msg) => {
                crate::mvgl_error!("mvgl::Driver", "Initialization failed: {}", msg);
            }
            _ => {
                crate::mvgl_error!("mvgl::Driver", "Driver error: {}", error);
            }
        }
        error
    }

    fn state() -> Result<&'static DriverState> {
        DRIVER_STATE.get().ok_or_else(|| Self::log_and_return_error(
            Error::InitializationFailed("Driver not initialized. Call Driver::initialize() first.".to_string())
        ))
    }

    /// Initialize the driver registry (idempotent)
    pub fn initialize() -> Result<()> {
        DRIVER_STATE.get_or_init(DriverState::new);
        Ok(())
    }

    /// Drop every registered context
    ///
    /// Handles already given out stay valid until dropped.
    pub fn shutdown() {
        if let Some(state) = DRIVER_STATE.get() {
            if let Ok(mut contexts) = state.contexts.write() {
                contexts.clear();
            }
        }
    }

    // ===== CONTEXT API =====

    /// Create a context and register it under `name`
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The driver is not initialized
    /// - A context with this name already exists
    /// - The context cannot be created from `config`
    pub fn create_context(name: &str, config: ContextConfig) -> Result<Arc<Mutex<Context>>> {
        let state = Self::state()?;

        let mut contexts = state.contexts.write()
            .map_err(|_| Self::log_and_return_error(
                Error::InitializationFailed("Context registry lock poisoned".to_string())
            ))?;

        if contexts.contains_key(name) {
            return Err(Self::log_and_return_error(Error::InitializationFailed(format!(
                "Context '{}' already exists. Call Driver::destroy_context() first.", name
            ))));
        }

        let context = Arc::new(Mutex::new(Context::new(config)?));
        contexts.insert(name.to_string(), context.clone());

        crate::mvgl_info!("mvgl::Driver", "Context '{}' created", name);

        Ok(context)
    }

    /// Get a registered context
    ///
    /// # Errors
    ///
    /// Returns an error if the driver is not initialized or `name` is unknown.
    pub fn context(name: &str) -> Result<Arc<Mutex<Context>>> {
        let state = Self::state()?;

        let contexts = state.contexts.read()
            .map_err(|_| Self::log_and_return_error(
                Error::InitializationFailed("Context registry lock poisoned".to_string())
            ))?;

        contexts.get(name).cloned().ok_or_else(|| Self::log_and_return_error(
            Error::InitializationFailed(format!("Context '{}' not found", name))
        ))
    }

    /// Unregister a context; unknown names are ignored
    pub fn destroy_context(name: &str) -> Result<()> {
        let state = Self::state()?;

        let mut contexts = state.contexts.write()
            .map_err(|_| Self::log_and_return_error(
                Error::InitializationFailed("Context registry lock poisoned".to_string())
            ))?;

        if contexts.remove(name).is_some() {
            crate::mvgl_info!("mvgl::Driver", "Context '{}' destroyed", name);
        }

        Ok(())
    }

    /// Names of all registered contexts, sorted
    pub fn context_names() -> Vec<String> {
        let Some(state) = DRIVER_STATE.get() else {
            return Vec::new();
        };
        let Ok(contexts) = state.contexts.read() else {
            return Vec::new();
        };
        let mut names: Vec<String> = contexts.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn context_count() -> usize {
        DRIVER_STATE.get()
            .and_then(|state| state.contexts.read().ok().map(|contexts| contexts.len()))
            .unwrap_or(0)
    }

    /// Reset the registry for testing (only available in test builds)
    #[cfg(test)]
    pub fn reset_for_testing() {
        Self::shutdown();
    }

    // ===== LOGGING API =====

    /// Replace the global logger
    ///
    /// # Example
    ///
    /// ```no_run
    /// use multiview_gl::mvgl::{Driver, log::{Logger, LogEntry}};
    ///
    /// struct FileLogger;
    /// impl Logger for FileLogger {
    ///     fn log(&self, entry: &LogEntry) {
    ///         // Write to file...
    ///     }
    /// }
    ///
    /// Driver::set_logger(FileLogger);
    /// ```
    pub fn set_logger<L: Logger + 'static>(logger: L) {
        if let Ok(mut lock) = logger_lock().write() {
            *lock = Box::new(logger);
        }
    }

    /// Reset logger to `DefaultLogger` (Info and above)
    pub fn reset_logger() {
        if let Ok(mut lock) = logger_lock().write() {
            *lock = Box::new(DefaultLogger::default());
        }
    }

    /// Logging entry used by `mvgl_trace!` .. `mvgl_warn!`
    pub fn log(severity: LogSeverity, source: &str, message: String) {
        if let Ok(lock) = logger_lock().read() {
            lock.log(&LogEntry {
                severity,
                timestamp: SystemTime::now(),
                source: source.to_string(),
                message,
                file: None,
                line: None,
            });
        }
    }

    /// Logging entry with file:line, used by `mvgl_error!` and `mvgl_err!`
    pub fn log_detailed(
        severity: LogSeverity,
        source: &str,
        message: String,
        file: &'static str,
        line: u32,
    ) {
        if let Ok(lock) = logger_lock().read() {
            lock.log(&LogEntry {
                severity,
                timestamp: SystemTime::now(),
                source: source.to_string(),
                message,
                file: Some(file),
                line: Some(line),
            });
        }
    }
}

#[cfg(test)]
#[path = "driver_tests.rs"]
mod tests;
