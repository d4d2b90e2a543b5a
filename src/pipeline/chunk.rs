//! Text chunking: pack unstructured text into slide-sized segments.
//!
//! Used only when a document exposes no structural or semantic containers.
//! The packer is greedy over whitespace-delimited tokens and never splits a
//! token, so a chunk boundary always falls between two words.

/// Split `text` into at most `max_chunks` chunks of at most `max_len`
/// characters each.
///
/// Tokens are joined with single spaces. A token longer than `max_len` is
/// emitted as a chunk of its own rather than cut. Pass `usize::MAX` as
/// `max_chunks` for no limit.
pub fn chunk(text: &str, max_len: usize, max_chunks: usize) -> Vec<String> {
    let mut chunks: Vec<String> = Vec::new();
    let mut buf = String::new();
    let mut buf_len = 0usize;

    for token in text.split_whitespace() {
        if chunks.len() >= max_chunks {
            break;
        }
        let token_len = token.chars().count();

        if buf_len > 0 && buf_len + 1 + token_len > max_len {
            chunks.push(std::mem::take(&mut buf));
            buf_len = 0;
            if chunks.len() >= max_chunks {
                break;
            }
        }

        if buf_len > 0 {
            buf.push(' ');
            buf_len += 1;
        }
        buf.push_str(token);
        buf_len += token_len;
    }

    if buf_len > 0 && chunks.len() < max_chunks {
        chunks.push(buf);
    }
    chunks
}
