use serde::Deserialize;
use tracing::debug;

/// Reassembles newline-delimited JSON chunks into text.
///
/// Parsing is lenient: a line that is not a JSON object is skipped and the
/// stream continues. A chunk without `message.content` contributes nothing.
#[derive(Debug, Default)]
pub(crate) struct StreamAccumulator {
    pending: Vec<u8>,
    text: String,
    skipped: usize,
}

#[derive(Debug, Deserialize)]
struct ChatChunk {
    #[serde(default)]
    message: Option<ChunkMessage>,
}

#[derive(Debug, Deserialize)]
struct ChunkMessage {
    #[serde(default)]
    content: Option<String>,
}

impl StreamAccumulator {
    /// Chunk boundaries need not align with line boundaries.
    pub(crate) fn push(&mut self, bytes: &[u8]) {
        self.pending.extend_from_slice(bytes);
        while let Some(newline) = self.pending.iter().position(|byte| *byte == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=newline).collect();
            self.consume_line(&line);
        }
    }

    pub(crate) fn finish(mut self) -> String {
        let rest = std::mem::take(&mut self.pending);
        self.consume_line(&rest);
        if self.skipped > 0 {
            debug!(skipped = self.skipped, "ignored unparseable stream lines");
        }
        self.text
    }

    fn consume_line(&mut self, line: &[u8]) {
        let line = line.trim_ascii();
        if line.is_empty() {
            return;
        }
        match serde_json::from_slice::<ChatChunk>(line) {
            Ok(chunk) => {
                if let Some(content) = chunk.message.and_then(|message| message.content) {
                    self.text.push_str(&content);
                }
            }
            Err(_) => self.skipped += 1,
        }
    }
}
