//! Submission sinks.
//!
//! A sink receives the typed values of an accepted submit. Any `FnMut(&T)`
//! closure is a sink; [`PrettyJsonSink`] renders the values as indented
//! JSON text for display.

use serde::Serialize;

/// Receives validated values when a submit is accepted.
pub trait SubmissionSink<T> {
    fn accept(&mut self, values: &T);
}

impl<T, F> SubmissionSink<T> for F
where
    F: FnMut(&T),
{
    fn accept(&mut self, values: &T) {
        self(values)
    }
}

/// Renders each accepted submission as pretty-printed JSON.
///
/// Keeps only the latest rendering, like an output area that is redrawn on
/// every submit.
///
/// ```rust
/// use serde::Serialize;
/// use userform::{PrettyJsonSink, SubmissionSink};
///
/// #[derive(Serialize)]
/// struct Greeting {
///     name: &'static str,
/// }
///
/// let mut sink = PrettyJsonSink::new();
/// sink.accept(&Greeting { name: "Ana" });
/// assert_eq!(sink.output(), "{\n  \"name\": \"Ana\"\n}");
/// ```
#[derive(Debug, Default, Clone)]
pub struct PrettyJsonSink {
    output: String,
    accepted: usize,
}

impl PrettyJsonSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// The latest rendering, or an empty string before the first submit.
    pub fn output(&self) -> &str {
        &self.output
    }

    /// Number of submissions received.
    pub fn accepted(&self) -> usize {
        self.accepted
    }
}

impl<T: Serialize> SubmissionSink<T> for PrettyJsonSink {
    fn accept(&mut self, values: &T) {
        self.accepted += 1;
        match serde_json::to_string_pretty(values) {
            Ok(text) => self.output = text,
            Err(error) => {
                tracing::error!(%error, "failed to render submitted values");
                self.output.clear();
            }
        }
    }
}
