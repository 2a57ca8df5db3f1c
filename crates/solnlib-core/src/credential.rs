//! Naming and chunking rules for passwords kept in `storage/passwords`.
//!
//! splunkd caps a stored secret at 255 characters.  Longer secrets are split
//! into numbered chunks stored under `<user>``splunk_cred_sep``<n>`, and one
//! extra chunk holding [`END_MARK`] terminates the sequence.

/// Separator between a user name and its chunk index.
pub const SEP: &str = "``splunk_cred_sep``";

/// Value of the chunk that follows the last real chunk.
pub const END_MARK: &str = "``splunk_cred_sep``S``splunk_cred_sep``P``splunk_cred_sep``L``splunk_cred_sep``K``splunk_cred_sep``";

/// Maximum characters splunkd stores per secret.
pub const CHUNK_LEN: usize = 255;

/// Escapes `:` as `\:` for use inside an entity name.
fn escape(part: &str) -> String {
    part.replace(':', "\\:")
}

/// The splunkd entity name of a stored password: `realm:username:`.
///
/// ```rust
/// use solnlib_core::credential::entity_name;
///
/// assert_eq!(entity_name("", "admin"), ":admin:");
/// assert_eq!(entity_name("https://x:8089", "bob"), "https\\://x\\:8089:bob:");
/// ```
pub fn entity_name(realm: &str, username: &str) -> String {
    format!("{}:{}:", escape(realm), escape(username))
}

/// Username under which chunk `index` (1-based) of `user`'s secret is stored.
pub fn chunk_username(user: &str, index: usize) -> String {
    format!("{user}{SEP}{index}")
}

/// If `username` is a chunk name, returns `(user, index)`.
pub fn split_chunk_username(username: &str) -> Option<(&str, usize)> {
    let pos = username.rfind(SEP)?;
    let index = username[pos + SEP.len()..].parse().ok()?;
    Some((&username[..pos], index))
}

/// Splits `password` into the chunk sequence written by `set_password`,
/// including the trailing [`END_MARK`].  Chunks are cut on character
/// boundaries.
pub fn split_into_chunks(password: &str) -> Vec<String> {
    let chars: Vec<char> = password.chars().collect();
    let mut chunks: Vec<String> = chars
        .chunks(CHUNK_LEN)
        .map(|c| c.iter().collect())
        .collect();
    chunks.push(END_MARK.to_string());
    chunks
}

/// Joins `(index, chunk)` pairs back into a secret, stopping at the end mark.
pub fn join_chunks(mut chunks: Vec<(usize, String)>) -> String {
    chunks.sort_by_key(|(index, _)| *index);
    let mut password = String::new();
    for (_, chunk) in chunks {
        if chunk == END_MARK {
            break;
        }
        password.push_str(&chunk);
    }
    password
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_name_escapes_colons() {
        assert_eq!(entity_name("realm", "user"), "realm:user:");
        assert_eq!(entity_name("a:b", "c"), "a\\:b:c:");
    }

    #[test]
    fn test_chunk_username_round_trips() {
        let name = chunk_username("svc_account", 3);
        assert_eq!(split_chunk_username(&name), Some(("svc_account", 3)));
    }

    #[test]
    fn test_plain_username_is_not_a_chunk() {
        assert_eq!(split_chunk_username("svc_account"), None);
        assert_eq!(split_chunk_username(&format!("svc{SEP}abc")), None);
    }

    #[test]
    fn test_short_password_is_one_chunk_plus_end_mark() {
        let chunks = split_into_chunks("s3cret");
        assert_eq!(chunks, vec!["s3cret".to_string(), END_MARK.to_string()]);
    }

    #[test]
    fn test_long_password_splits_at_chunk_len() {
        let password = "x".repeat(CHUNK_LEN * 2 + 10);
        let chunks = split_into_chunks(&password);

        assert_eq!(chunks.len(), 4);
        assert_eq!(chunks[0].len(), CHUNK_LEN);
        assert_eq!(chunks[2].len(), 10);
        assert_eq!(chunks[3], END_MARK);
    }

    #[test]
    fn test_join_chunks_orders_by_index_and_stops_at_end_mark() {
        let joined = join_chunks(vec![
            (2, "world".to_string()),
            (3, END_MARK.to_string()),
            (1, "hello ".to_string()),
            (4, "stale".to_string()),
        ]);
        assert_eq!(joined, "hello world");
    }

    #[test]
    fn test_multibyte_password_splits_on_char_boundaries() {
        let password = "é".repeat(CHUNK_LEN + 1);
        let chunks = split_into_chunks(&password);
        assert_eq!(chunks[0].chars().count(), CHUNK_LEN);
        assert_eq!(chunks[1], "é");
    }
}
