//! Prompt-search buffer over raw session output.
//!
//! Only the last `search_depth` bytes are searched for the prompt, so large
//! outputs (full ONT autofind tables) stay cheap to poll on every read.

use regex::bytes::Regex;

use crate::error::{Error, Result};

/// Matches the resting CLI prompt of the supported OLT shells
/// (`MA5800#`, `MA5800(config)#`, `ZXAN>`, `ZXAN(config)#`).
pub const DEFAULT_PROMPT_PATTERN: &str = r"[>#\$]\s*$";

/// Default prompt search depth in bytes.
pub const DEFAULT_SEARCH_DEPTH: usize = 1000;

/// Compile a prompt pattern, surfacing bad overrides before any I/O.
pub fn compile_prompt(pattern: &str) -> Result<Regex> {
    Regex::new(pattern)
        .map_err(|e| Error::invalid_argument(format!("invalid prompt pattern '{pattern}': {e}")))
}

/// Buffer accumulating session output, with tail-limited prompt search.
#[derive(Debug)]
pub struct PromptBuffer {
    buffer: Vec<u8>,
    search_depth: usize,
}

impl PromptBuffer {
    pub fn new(search_depth: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(4096),
            search_depth,
        }
    }

    /// Append output, stripping ANSI escape sequences first.
    pub fn extend(&mut self, data: &[u8]) {
        let cleaned = strip_ansi_escapes::strip(data);
        self.buffer.extend_from_slice(&cleaned);
    }

    /// Search only the last `search_depth` bytes for the pattern.
    pub fn search_tail(&self, pattern: &Regex) -> Option<regex::bytes::Match<'_>> {
        let start = self.buffer.len().saturating_sub(self.search_depth);
        pattern.find(&self.buffer[start..])
    }

    /// Whether the tail currently matches the pattern.
    pub fn tail_contains(&self, pattern: &Regex) -> bool {
        self.search_tail(pattern).is_some()
    }

    /// Take ownership of the buffer contents and reset.
    pub fn take(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.buffer)
    }

    /// Drain the buffer into a cleaned response: echoed command line,
    /// leading blank lines, and the trailing prompt removed.
    pub fn take_response(&mut self, command: &str, prompt: &Regex) -> String {
        let raw = String::from_utf8_lossy(&self.take()).into_owned();
        clean_response(&raw, command, prompt)
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

impl Default for PromptBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_SEARCH_DEPTH)
    }
}

/// Reduce a raw transcript to the command's output alone.
fn clean_response(raw: &str, command: &str, prompt: &Regex) -> String {
    let mut lines: Vec<&str> = raw.lines().collect();

    // The device echoes the command back as the first line.
    if let Some(first) = lines.first() {
        if !command.trim().is_empty() && first.contains(command.trim()) {
            lines.remove(0);
        }
    }

    while matches!(lines.first(), Some(line) if line.trim().is_empty()) {
        lines.remove(0);
    }

    // Drop trailing blanks and the resting prompt line.
    while let Some(last) = lines.last() {
        let trimmed = last.trim();
        if trimmed.is_empty() || prompt.is_match(trimmed.as_bytes()) {
            lines.pop();
        } else {
            break;
        }
    }

    lines.join("\n").trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extend_strips_ansi() {
        let mut buffer = PromptBuffer::new(100);
        buffer.extend(b"\x1b[32mdisplay ont info\x1b[0m");
        assert_eq!(buffer.take(), b"display ont info");
    }

    #[test]
    fn test_tail_search_limited_to_depth() {
        let mut buffer = PromptBuffer::new(20);
        buffer.extend(&[b'x'; 100]);
        buffer.extend(b"\nMA5800#");

        let pattern = Regex::new(r"MA5800#").unwrap();
        assert!(buffer.tail_contains(&pattern));

        let mut buried = PromptBuffer::new(10);
        buried.extend(b"MA5800#");
        buried.extend(&[b'x'; 100]);
        assert!(!buried.tail_contains(&pattern));
    }

    #[test]
    fn test_take_response_removes_echo_and_prompt() {
        let prompt = Regex::new(DEFAULT_PROMPT_PATTERN).unwrap();
        let mut buffer = PromptBuffer::default();
        buffer.extend(b"display sysman service state\r\n");
        buffer.extend(b"  Service : ssh\r\n  State   : enable\r\n");
        buffer.extend(b"MA5800(config)# ");

        let response = buffer.take_response("display sysman service state", &prompt);
        assert_eq!(response, "  Service : ssh\n  State   : enable");
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_take_response_prompt_only() {
        let prompt = Regex::new(DEFAULT_PROMPT_PATTERN).unwrap();
        let mut buffer = PromptBuffer::default();
        buffer.extend(b"scroll\r\nMA5800(config)# ");
        assert_eq!(buffer.take_response("scroll", &prompt), "");
    }
}
