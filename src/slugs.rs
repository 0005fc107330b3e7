use std::future::Future;

use rand::Rng;

use crate::error::{AppError, AppResult};

const SHORT_CODE_CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
const MAX_ATTEMPTS: usize = 10;

pub fn slugify(text: &str) -> String {
    ::slug::slugify(text)
}

pub fn short_code(len: usize) -> String {
    let mut rng = rand::rng();
    (0..len)
        .map(|_| SHORT_CODE_CHARS[rng.random_range(0..SHORT_CODE_CHARS.len())] as char)
        .collect()
}

pub fn with_short_code(base: &str, code: &str) -> String {
    if base.is_empty() {
        code.to_string()
    } else {
        format!("{base}-{code}")
    }
}

/// Slug for `name` that `taken` reports as free.
///
/// Falls back to `<slug>-<shortcode>` when the plain slug is empty or used.
pub async fn unique_slug<F, Fut>(name: &str, mut taken: F) -> AppResult<String>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = AppResult<bool>>,
{
    let base = slugify(name);
    if !base.is_empty() && !taken(base.clone()).await? {
        return Ok(base);
    }

    for _ in 0..MAX_ATTEMPTS {
        let candidate = with_short_code(&base, &short_code(6));
        if !taken(candidate.clone()).await? {
            return Ok(candidate);
        }
    }

    Err(AppError::Internal(anyhow::anyhow!(
        "could not allocate a unique slug for {name}"
    )))
}
