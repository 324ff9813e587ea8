use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::template::MaskTemplate;

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("static regex compiles"));

/// Formatting mode selected per field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatKind {
    #[default]
    None,
    Tel,
    Email,
    Url,
}

/// Stateless formatter applied to text values.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum InputFormat {
    #[default]
    None,
    Tel(MaskTemplate),
    Email,
    Url,
}

impl InputFormat {
    /// `tel_pattern` only matters for [`FormatKind::Tel`]; without one the
    /// default 3-3-4 grouping applies.
    pub fn from_kind(kind: FormatKind, tel_pattern: Option<&str>) -> Self {
        match kind {
            FormatKind::None => InputFormat::None,
            FormatKind::Tel => InputFormat::Tel(
                tel_pattern
                    .map(MaskTemplate::parse)
                    .unwrap_or_default(),
            ),
            FormatKind::Email => InputFormat::Email,
            FormatKind::Url => InputFormat::Url,
        }
    }

    pub fn format_value(&self, raw: &str) -> String {
        match self {
            InputFormat::None => raw.to_string(),
            InputFormat::Tel(template) => template.format(&template.extract(raw)),
            InputFormat::Email => WHITESPACE.replace_all(raw, "").to_lowercase(),
            InputFormat::Url => raw.trim().to_string(),
        }
    }

    pub fn template(&self) -> Option<&MaskTemplate> {
        match self {
            InputFormat::Tel(template) => Some(template),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_strips_whitespace_and_lowercases() {
        let format = InputFormat::Email;
        assert_eq!(format.format_value(" Jane.Doe @Example.COM "), "jane.doe@example.com");
    }

    #[test]
    fn url_trims_only_the_ends() {
        let format = InputFormat::Url;
        assert_eq!(format.format_value("  https://a.io/x y  "), "https://a.io/x y");
    }

    #[test]
    fn tel_without_pattern_uses_default_grouping() {
        let format = InputFormat::from_kind(FormatKind::Tel, None);
        assert_eq!(format.format_value("555-123-4567"), "(555) 123-4567");
    }

    #[test]
    fn tel_with_pattern() {
        let format = InputFormat::from_kind(FormatKind::Tel, Some("+91 xxxx xxx"));
        assert_eq!(format.format_value("98765 43210"), "+91 9876 543");
    }

    #[test]
    fn none_is_identity() {
        assert_eq!(InputFormat::None.format_value("  Keep Me "), "  Keep Me ");
    }
}
