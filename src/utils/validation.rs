use regex::Regex;
use std::sync::OnceLock;
use validator::Validate;
use crate::errors::AppError;

pub fn validate_payload<T: Validate>(payload: &T) -> Result<(), AppError> {
    payload.validate()
        .map_err(|err| AppError::BadRequest(err.to_string()))
}

fn url_regex() -> &'static Regex {
    static URL: OnceLock<Regex> = OnceLock::new();
    URL.get_or_init(|| {
        Regex::new(r"^https?://[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}(:[0-9]{1,5})?(/[^\s]*)?$")
            .expect("photo url pattern is valid")
    })
}

// Regex validation for progress photo references
pub fn validate_photo_url(uri: &str) -> Result<(), AppError> {
    if !url_regex().is_match(uri) {
        return Err(AppError::BadRequest("Invalid photo URL. It should be an http(s) URL".to_string()));
    }
    Ok(())
}

pub fn validate_gender(gender: &str) -> Result<(), AppError> {
    if gender.trim().is_empty() {
        return Err(AppError::BadRequest("Gender is required".to_string()));
    }
    Ok(())
}
