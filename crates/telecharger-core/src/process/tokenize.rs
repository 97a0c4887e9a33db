//! Incremental whitespace tokenizer for process output.

/// Splits a byte stream into whitespace-delimited tokens.
///
/// A token cut in half by a read boundary is held back until the next chunk
/// (or `finish`). Splitting on ASCII whitespace bytes never lands inside a
/// multi-byte UTF-8 sequence; `\r` counts as whitespace, so carriage-return
/// progress redraws yield one token per field.
#[derive(Debug, Default)]
pub struct Tokenizer {
    pending: Vec<u8>,
}

impl Tokenizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk; returns the tokens completed by it.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        let mut out = Vec::new();
        for &b in chunk {
            if b.is_ascii_whitespace() {
                self.flush_into(&mut out);
            } else {
                self.pending.push(b);
            }
        }
        out
    }

    /// End of stream: returns the trailing token, if any.
    pub fn finish(&mut self) -> Option<String> {
        let mut out = Vec::with_capacity(1);
        self.flush_into(&mut out);
        out.pop()
    }

    fn flush_into(&mut self, out: &mut Vec<String>) {
        if !self.pending.is_empty() {
            out.push(String::from_utf8_lossy(&self.pending).into_owned());
            self.pending.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_spaces_newlines_and_carriage_returns() {
        let mut t = Tokenizer::new();
        let tokens = t.push(b"[download]  10.0% of 3.2MiB\r[download]  55.5% ");
        assert_eq!(
            tokens,
            vec!["[download]", "10.0%", "of", "3.2MiB", "[download]", "55.5%"]
        );
        assert_eq!(t.finish(), None);
    }

    #[test]
    fn reassembles_tokens_across_chunks() {
        let mut t = Tokenizer::new();
        assert_eq!(t.push(b"ETA 00:0"), vec!["ETA"]);
        assert_eq!(t.push(b"3 100"), vec!["00:03"]);
        assert_eq!(t.push(b"%"), Vec::<String>::new());
        assert_eq!(t.finish().as_deref(), Some("100%"));
    }

    #[test]
    fn keeps_multibyte_text_intact() {
        let mut t = Tokenizer::new();
        let bytes = "Téléchargement fini".as_bytes();
        let (a, b) = bytes.split_at(3);
        let mut tokens = t.push(a);
        tokens.extend(t.push(b));
        tokens.extend(t.finish());
        assert_eq!(tokens, vec!["Téléchargement", "fini"]);
    }
}
