use std::time::{Duration, Instant};

/// Receives a mark at the end of each named pipeline phase.
pub trait PhaseTimer {
    fn mark(&mut self, phase: &str);
}

/// Discards every mark. Used where no clock is available (wasm).
impl PhaseTimer for () {
    fn mark(&mut self, _phase: &str) {}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub label: String,
    pub elapsed: Duration,
}

/// Collects the time spent between consecutive marks.
#[derive(Debug, Clone)]
pub struct Stopwatch {
    start: Instant,
    last: Instant,
    events: Vec<Event>,
}

impl Stopwatch {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last: now,
            events: Vec::new(),
        }
    }

    /// Record the time since the previous tick under `label`.
    pub fn tick(&mut self, label: impl Into<String>) -> Duration {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last);
        self.last = now;
        self.events.push(Event {
            label: label.into(),
            elapsed,
        });
        elapsed
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn total(&self) -> Duration {
        self.last.duration_since(self.start)
    }

    /// `[TIMING] load=3ms prep=1ms total=4ms`
    pub fn summary(&self) -> String {
        let parts: Vec<String> = self
            .events
            .iter()
            .map(|e| format!("{}={}ms", e.label, e.elapsed.as_millis()))
            .collect();
        format!("[TIMING] {} total={}ms", parts.join(" "), self.total().as_millis())
    }
}

impl Default for Stopwatch {
    fn default() -> Self {
        Self::new()
    }
}

impl PhaseTimer for Stopwatch {
    fn mark(&mut self, phase: &str) {
        self.tick(phase);
    }
}
