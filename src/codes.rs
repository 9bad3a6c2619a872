use rand::Rng;

use crate::backend::{BackendError, ListBackend};
use crate::constants::{LIST_CODE_ALPHABET, LIST_CODE_ATTEMPTS, LIST_CODE_LENGTH};

/// Random shareable list code: six uppercase alphanumeric characters.
pub fn generate_list_code() -> String {
    let mut rng = rand::rng();
    (0..LIST_CODE_LENGTH)
        .map(|_| {
            let idx = rng.random_range(0..LIST_CODE_ALPHABET.len());
            LIST_CODE_ALPHABET[idx] as char
        })
        .collect()
}

/// A fresh code that differs from `avoid` and is not taken on the remote.
pub async fn unique_list_code<B>(backend: &B, avoid: Option<&str>) -> Result<String, BackendError>
where
    B: ListBackend + ?Sized,
{
    for _ in 0..LIST_CODE_ATTEMPTS {
        let code = generate_list_code();
        if avoid == Some(code.as_str()) {
            continue;
        }
        if backend.list_by_code(&code).await?.is_none() {
            return Ok(code);
        }
        tracing::debug!(code = %code, "generated list code already taken");
    }
    Err(BackendError::Conflict(
        "could not generate an unused list code".to_string(),
    ))
}
