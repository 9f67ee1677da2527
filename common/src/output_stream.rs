use std::sync::Arc;

use parking_lot::Mutex;

/// Shared append-only log of values, drained by the reader.
#[derive(Debug)]
pub struct OutputStream<T = String>(Arc<Mutex<Vec<T>>>);

impl<T> Clone for OutputStream<T> {
    fn clone(&self) -> Self {
        OutputStream(Arc::clone(&self.0))
    }
}

impl<T> Default for OutputStream<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> OutputStream<T> {
    pub fn new() -> Self {
        OutputStream(Arc::new(Mutex::new(Vec::new())))
    }

    pub fn write<S: Into<T>>(&self, s: S) {
        self.0.lock().push(s.into());
    }

    pub fn take(&self) -> Vec<T> {
        std::mem::take(&mut self.0.lock())
    }

    pub fn len(&self) -> usize {
        self.0.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.lock().is_empty()
    }
}

impl<T: Clone> OutputStream<T> {
    /// Copies the current contents without draining them.
    pub fn snapshot(&self) -> Vec<T> {
        self.0.lock().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_drains_in_write_order() {
        let stream: OutputStream = OutputStream::new();
        let writer = stream.clone();
        writer.write("a");
        writer.write(String::from("b"));

        assert_eq!(stream.len(), 2);
        assert_eq!(stream.snapshot(), ["a", "b"]);
        assert_eq!(stream.take(), ["a", "b"]);
        assert!(stream.is_empty());
    }
}
