use crate::crawler::models::Listing;

/// Per-message limit of the chat transport, in characters.
pub const CHUNK_BUDGET: usize = 4000;

#[derive(Debug, PartialEq, Eq)]
pub enum Digest {
    NoOffers,
    Chunks(Vec<String>),
}

pub fn format_digest(listings: &[Listing]) -> Digest {
    if listings.is_empty() {
        return Digest::NoOffers;
    }

    let lines = listings
        .iter()
        .enumerate()
        .map(|(idx, l)| format!("{}. {} - Price: {}\n", idx + 1, l.title, l.price));

    Digest::Chunks(chunk_lines(lines, CHUNK_BUDGET))
}

/// Packs lines into chunks of at most `budget` characters. A line that
/// would overflow the current chunk starts the next one; a line that is
/// longer than the whole budget is cut down to it.
pub fn chunk_lines<I>(lines: I, budget: usize) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for line in lines {
        let line = truncate_chars(line, budget);
        let line_len = line.chars().count();

        if current_len + line_len > budget && !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }

        current.push_str(&line);
        current_len += line_len;
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

fn truncate_chars(line: String, max: usize) -> String {
    match line.char_indices().nth(max) {
        Some((cut, _)) => line[..cut].to_string(),
        None => line,
    }
}
