//! Diagnostics sink interface.
//!
//! The engine emits lifecycle and error lines to an injected sink in
//! addition to its `tracing` output. The sink is consumed fire-and-forget:
//! implementations must never block the caller or fail; a file logger
//! would enqueue the line and return immediately. The engine only
//! depends on this one call shape; the actual logger lives in the host
//! process and is passed to [`ClientBuilder::diagnostics`](crate::ClientBuilder::diagnostics).

/// Fire-and-forget text diagnostics.
pub trait DiagnosticsSink: Send + Sync {
    /// Record one diagnostic line. Timestamping is the sink's concern.
    ///
    /// Must not block and must not fail.
    fn write_line(&self, line: &str);
}

/// Default sink: discards every line.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullDiagnostics;

impl DiagnosticsSink for NullDiagnostics {
    fn write_line(&self, _line: &str) {}
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[test]
    fn test_null_sink_discards() {
        NullDiagnostics.write_line("nothing happens");
    }

    #[test]
    fn test_custom_sink_receives_lines() {
        #[derive(Default)]
        struct MemorySink {
            lines: Mutex<Vec<String>>,
        }

        impl DiagnosticsSink for MemorySink {
            fn write_line(&self, line: &str) {
                self.lines.lock().unwrap().push(line.to_string());
            }
        }

        let sink = MemorySink::default();
        sink.write_line("connected to 127.0.0.1:9000");
        sink.write_line("disconnected");

        let lines = sink.lines.lock().unwrap();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("connected"));
    }
}
