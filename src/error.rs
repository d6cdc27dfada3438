// Copyright (c) 2026 rezky_nightky

pub type Result<T> = std::result::Result<T, GlyphfallError>;

#[derive(thiserror::Error, Debug)]
pub enum GlyphfallError {
    #[error("failed to apply {name} {value} ({reason})")]
    InvalidOption {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("unsupported charset: {0} (see --list-charsets)")]
    UnknownCharset(String),

    #[error("invalid color: {0} (see --list-colors)")]
    UnknownColor(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl GlyphfallError {
    pub fn invalid(name: &'static str, value: impl ToString, reason: impl Into<String>) -> Self {
        Self::InvalidOption {
            name,
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_option_reads_like_a_cli_diagnostic() {
        let e = GlyphfallError::invalid("--fps", 0.5, "min 1 max 240");
        assert_eq!(e.to_string(), "failed to apply --fps 0.5 (min 1 max 240)");
    }

    #[test]
    fn io_errors_pass_through() {
        let e: GlyphfallError = std::io::Error::other("tty gone").into();
        assert!(e.to_string().contains("tty gone"));
    }
}
