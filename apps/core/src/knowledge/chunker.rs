/// Splits `text` into word-bounded chunks.
///
/// Whitespace-delimited words are accumulated, each counting its character
/// length plus one separator, until the running count reaches `chunk_size`;
/// the chunk is then emitted and the count reset. Any remainder becomes the
/// final chunk. Words are never split, so a chunk may exceed `chunk_size`.
pub fn chunk_text(text: &str, chunk_size: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut size = 0usize;

    for word in text.split_whitespace() {
        current.push(word);
        size += word.chars().count() + 1;
        if size >= chunk_size {
            chunks.push(current.join(" "));
            current.clear();
            size = 0;
        }
    }

    if !current.is_empty() {
        chunks.push(current.join(" "));
    }
    chunks
}
