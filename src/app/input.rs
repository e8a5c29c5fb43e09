use super::state::GenerateError;

/// Longest text the server accepts, in characters.
pub const MAX_TEXT_CHARS: usize = 500;

/// Counter turns amber above this.
pub const WARNING_ABOVE: usize = 400;

/// Counter turns red above this.
pub const DANGER_ABOVE: usize = 450;

/// Visual tier of the character counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountTier {
    Normal,
    Warning,
    Danger,
}

impl CountTier {
    pub fn for_count(count: usize) -> Self {
        if count > DANGER_ABOVE {
            Self::Danger
        } else if count > WARNING_ABOVE {
            Self::Warning
        } else {
            Self::Normal
        }
    }

    /// CSS class applied to the counter label (libadwaita palette).
    pub fn css_class(self) -> &'static str {
        match self {
            Self::Normal => "dim-label",
            Self::Warning => "warning",
            Self::Danger => "error",
        }
    }
}

/// Number of characters as shown by the counter.
pub fn char_count(text: &str) -> usize {
    text.chars().count()
}

/// Trim `raw` and check it can be sent. Returns the trimmed text.
pub fn validate(raw: &str) -> Result<&str, GenerateError> {
    let text = raw.trim();
    if text.is_empty() {
        return Err(GenerateError::EmptyInput);
    }
    if char_count(text) > MAX_TEXT_CHARS {
        return Err(GenerateError::TooLong);
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_boundaries_are_exact() {
        assert_eq!(CountTier::for_count(0), CountTier::Normal);
        assert_eq!(CountTier::for_count(400), CountTier::Normal);
        assert_eq!(CountTier::for_count(401), CountTier::Warning);
        assert_eq!(CountTier::for_count(450), CountTier::Warning);
        assert_eq!(CountTier::for_count(451), CountTier::Danger);
        assert_eq!(CountTier::for_count(10_000), CountTier::Danger);
    }

    #[test]
    fn counts_characters_not_bytes() {
        assert_eq!(char_count("语音生成"), 4);
        assert_eq!(char_count("héllo"), 5);
    }

    #[test]
    fn empty_or_blank_text_is_rejected() {
        assert_eq!(validate(""), Err(GenerateError::EmptyInput));
        assert_eq!(validate("   \n\t "), Err(GenerateError::EmptyInput));
    }

    #[test]
    fn length_limit_applies_after_trimming() {
        let at_limit = "a".repeat(MAX_TEXT_CHARS);
        assert_eq!(validate(&at_limit), Ok(at_limit.as_str()));

        let padded = format!("   {at_limit}   ");
        assert_eq!(validate(&padded), Ok(at_limit.as_str()));

        let over = "a".repeat(MAX_TEXT_CHARS + 1);
        assert_eq!(validate(&over), Err(GenerateError::TooLong));
    }

    #[test]
    fn multibyte_text_at_limit_is_accepted() {
        let text = "语".repeat(MAX_TEXT_CHARS);
        assert!(validate(&text).is_ok());
        assert_eq!(validate(&format!("{text}语")), Err(GenerateError::TooLong));
    }
}
