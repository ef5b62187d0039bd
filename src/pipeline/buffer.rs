/// Bounded rolling transcript context for summarization.
///
/// Keeps the most recent suffix of everything appended, capped at
/// `max_len` bytes. When the cap would split a UTF-8 character the cut
/// moves forward to the next boundary, so the kept text is always valid
/// and never over the cap.
#[derive(Debug)]
pub struct RollingBuffer {
    text: String,
    max_len: usize,
}

impl RollingBuffer {
    pub fn new(max_len: usize) -> Self {
        Self {
            text: String::new(),
            max_len,
        }
    }

    /// Appends `new_text`, space-separated from what came before, then
    /// trims the front down to the cap.
    pub fn append(&mut self, new_text: &str) {
        if new_text.is_empty() {
            return;
        }
        if !self.text.is_empty() {
            self.text.push(' ');
        }
        self.text.push_str(new_text);
        if self.text.len() > self.max_len {
            let mut cut = self.text.len() - self.max_len;
            while !self.text.is_char_boundary(cut) {
                cut += 1;
            }
            self.text.drain(..cut);
        }
    }

    /// The current window of context.
    pub fn snapshot(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}
