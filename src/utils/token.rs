use rand::{distributions::Alphanumeric, thread_rng, Rng};

/// Random alphanumeric token, used to keep stored file names unique.
pub fn generate_token(length: usize) -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}
