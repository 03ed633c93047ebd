//! Chirp content policy: length limit and profanity masking

/// Maximum chirp length in characters
pub const MAX_CHIRP_LENGTH: usize = 140;

/// Words replaced by [`MASK`], compared case-insensitively
const DENYLIST: [&str; 3] = ["kerfuffle", "sharbert", "fornax"];

const MASK: &str = "****";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Chirp is too long")]
    TooLong,
}

/// Validate a chirp body and return it with denylisted words masked
pub fn clean_body(body: &str) -> Result<String, ValidationError> {
    if body.chars().count() > MAX_CHIRP_LENGTH {
        return Err(ValidationError::TooLong);
    }

    Ok(mask_profanity(body))
}

/// Replace whole denylisted words. Splits on single spaces only, so a word
/// with attached punctuation ("kerfuffle!") is left alone.
pub fn mask_profanity(body: &str) -> String {
    body.split(' ')
        .map(|word| {
            let lowered = word.to_lowercase();
            if DENYLIST.contains(&lowered.as_str()) {
                MASK
            } else {
                word
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
