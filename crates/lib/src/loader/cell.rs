use std::sync::{Mutex, OnceLock, PoisonError};

/// A value initialized at most once, by a fallible initializer.
///
/// Exactly one caller at a time runs the initializer; everyone else waits on
/// the lock and then observes the published value. A failed initializer
/// publishes nothing, so the next caller tries again. Once set, the value is
/// never replaced or removed.
#[derive(Debug)]
pub struct LoadCell<T> {
  value: OnceLock<T>,
  init: Mutex<()>,
}

impl<T> LoadCell<T> {
  pub const fn new() -> Self {
    Self {
      value: OnceLock::new(),
      init: Mutex::new(()),
    }
  }

  /// The value, if initialization has completed
  pub fn get(&self) -> Option<&T> {
    self.value.get()
  }

  pub fn get_or_try_init<E, F>(&self, f: F) -> Result<&T, E>
  where
    F: FnOnce() -> Result<T, E>,
  {
    if let Some(value) = self.value.get() {
      return Ok(value);
    }

    // A panicking initializer leaves nothing published, so the lock's
    // poison flag carries no information.
    let _guard = self.init.lock().unwrap_or_else(PoisonError::into_inner);

    if let Some(value) = self.value.get() {
      return Ok(value);
    }

    let value = f()?;
    Ok(self.value.get_or_init(|| value))
  }
}

impl<T> Default for LoadCell<T> {
  fn default() -> Self {
    Self::new()
  }
}
