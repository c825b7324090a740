//! Streamed process output

/// Which stream a line of output arrived on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputType {
    /// Standard output
    Out,
    /// Standard error
    Err,
}

/// Receives process output one line at a time.
///
/// Lines arrive on the thread that started the process, in arrival order
/// within each stream. Ordering between the two streams is best effort.
/// Line terminators are stripped.
pub trait OutputCallback {
    fn on_output(&mut self, kind: OutputType, line: &str);
}

impl<F> OutputCallback for F
where
    F: FnMut(OutputType, &str),
{
    fn on_output(&mut self, kind: OutputType, line: &str) {
        self(kind, line)
    }
}

/// Keeps every line it receives.
#[derive(Debug, Clone, Default)]
pub struct BufferedOutputCallback {
    lines: Vec<(OutputType, String)>,
}

impl BufferedOutputCallback {
    pub fn new() -> Self {
        Self::default()
    }

    /// All lines in arrival order.
    pub fn lines(&self) -> &[(OutputType, String)] {
        &self.lines
    }

    /// Standard output lines only.
    pub fn output(&self) -> Vec<&str> {
        self.of(OutputType::Out)
    }

    /// Standard error lines only.
    pub fn error_output(&self) -> Vec<&str> {
        self.of(OutputType::Err)
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    fn of(&self, kind: OutputType) -> Vec<&str> {
        self.lines
            .iter()
            .filter(|(k, _)| *k == kind)
            .map(|(_, line)| line.as_str())
            .collect()
    }
}

impl OutputCallback for BufferedOutputCallback {
    fn on_output(&mut self, kind: OutputType, line: &str) {
        self.lines.push((kind, line.to_string()));
    }
}
