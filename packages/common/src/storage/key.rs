use super::error::StorageError;

const MAX_KEY_LEN: usize = 1024;

/// Validates an object key: non-empty `/`-separated segments, no traversal.
pub fn validate_key(key: &str) -> Result<&str, StorageError> {
    if key.is_empty() {
        return Err(StorageError::InvalidKey("key cannot be empty"));
    }

    if key.len() > MAX_KEY_LEN {
        return Err(StorageError::InvalidKey("key exceeds 1024 bytes"));
    }

    if key.chars().any(|c| c.is_control()) {
        return Err(StorageError::InvalidKey(
            "key must not contain control characters",
        ));
    }

    if key.contains('\\') {
        return Err(StorageError::InvalidKey("key must not contain backslashes"));
    }

    for segment in key.split('/') {
        if segment.is_empty() {
            return Err(StorageError::InvalidKey("key must not contain empty segments"));
        }
        if segment.starts_with('.') {
            return Err(StorageError::InvalidKey(
                "key segments must not start with '.'",
            ));
        }
    }

    Ok(key)
}
