/// Splits `content` into chunks of at most `max_len` characters, breaking only at newlines.
///
/// Lines are packed greedily; joining the result with `\n` gives back `content`.
/// A single line longer than `max_len` is not broken up and becomes its own
/// oversized chunk.
pub fn split_message(content: &str, max_len: usize) -> Vec<String> {
    if char_len(content) <= max_len {
        return vec![content.to_owned()];
    }

    let mut chunks = Vec::new();
    let mut current: Option<(String, usize)> = None;

    for line in content.split('\n') {
        let line_len = char_len(line);
        current = match current.take() {
            Some((chunk, chunk_len)) if chunk_len + line_len + 1 > max_len => {
                chunks.push(chunk);
                Some((line.to_owned(), line_len))
            }
            Some((mut chunk, chunk_len)) => {
                chunk.push('\n');
                chunk.push_str(line);
                Some((chunk, chunk_len + line_len + 1))
            }
            None => Some((line.to_owned(), line_len)),
        };
    }

    if let Some((chunk, _)) = current {
        chunks.push(chunk);
    }
    chunks
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

#[cfg(test)]
mod tests {
    use super::split_message;

    #[test]
    fn short_content_is_returned_unchanged() {
        assert_eq!(split_message("hello\nworld", 20), vec!["hello\nworld"]);
        assert_eq!(split_message("", 5), vec![""]);
        assert_eq!(split_message("exact", 5), vec!["exact"]);
    }

    #[test]
    fn packs_lines_greedily_under_the_limit() {
        let chunks = split_message("aaaa\nbbbb\ncccc\ndddd", 10);
        assert_eq!(chunks, vec!["aaaa\nbbbb", "cccc\ndddd"]);
        assert!(chunks.iter().all(|chunk| chunk.chars().count() <= 10));
    }

    #[test]
    fn oversized_line_becomes_its_own_chunk() {
        let long_line = "x".repeat(25);
        let content = format!("short\n{long_line}\ntail");
        let chunks = split_message(&content, 10);

        assert_eq!(chunks, vec!["short".to_owned(), long_line, "tail".to_owned()]);
    }

    #[test]
    fn joining_chunks_reconstructs_content() {
        let content = "# Title\n\nFirst paragraph line.\nSecond line here.\n\n\nAfter gap.\nEnd";
        for max_len in 21..40 {
            let chunks = split_message(content, max_len);
            assert_eq!(chunks.join("\n"), content, "max_len={max_len}");
            assert!(
                chunks.iter().all(|chunk| chunk.chars().count() <= max_len),
                "max_len={max_len}"
            );
        }
    }

    #[test]
    fn blank_line_at_chunk_boundary_is_preserved() {
        let content = "abcd\n\nefgh";
        let chunks = split_message(content, 5);
        assert_eq!(chunks.join("\n"), content);
    }

    #[test]
    fn limit_counts_characters_not_bytes() {
        let content = "ééé\nüüü";
        assert_eq!(split_message(content, 7), vec![content]);
        assert_eq!(split_message(content, 6), vec!["ééé", "üüü"]);
    }
}
