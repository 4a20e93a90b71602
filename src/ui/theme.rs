use ratatui::style::Color;

/// Theme color palette defining all colors used in the application.
///
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Theme {
    pub name: String,
    // Primary colors
    pub primary: ColorSpec,
    pub accent: ColorSpec,
    pub banner: ColorSpec,

    // Text colors
    pub text: ColorSpec,
    pub text_muted: ColorSpec,

    // Status colors
    pub success: ColorSpec,
    pub warning: ColorSpec,
    pub error: ColorSpec,

    // UI element colors
    pub border_active: ColorSpec,
    pub border_normal: ColorSpec,
    pub highlight_bg: ColorSpec,
    pub highlight_fg: ColorSpec,

    // Footer mode colors
    pub footer_normal: ColorSpec,
    pub footer_search: ColorSpec,
    pub footer_form: ColorSpec,
    pub footer_delete: ColorSpec,
}

/// Color specification as an RGB triple.
///
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColorSpec {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl ColorSpec {
    pub fn to_color(&self) -> Color {
        Color::Rgb(self.r, self.g, self.b)
    }
}

const fn rgb(r: u8, g: u8, b: u8) -> ColorSpec {
    ColorSpec { r, g, b }
}

impl Theme {
    /// Dark blue palette.
    ///
    pub fn midnight() -> Self {
        Theme {
            name: "midnight".to_string(),
            primary: rgb(122, 162, 247),
            accent: rgb(187, 154, 247),
            banner: rgb(125, 207, 255),
            text: rgb(192, 202, 245),
            text_muted: rgb(86, 95, 137),
            success: rgb(158, 206, 106),
            warning: rgb(224, 175, 104),
            error: rgb(247, 118, 142),
            border_active: rgb(122, 162, 247),
            border_normal: rgb(59, 66, 97),
            highlight_bg: rgb(41, 46, 66),
            highlight_fg: rgb(192, 202, 245),
            footer_normal: rgb(122, 162, 247),
            footer_search: rgb(224, 175, 104),
            footer_form: rgb(158, 206, 106),
            footer_delete: rgb(247, 118, 142),
        }
    }

    /// Light palette for bright terminals.
    ///
    pub fn daylight() -> Self {
        Theme {
            name: "daylight".to_string(),
            primary: rgb(46, 126, 233),
            accent: rgb(152, 84, 241),
            banner: rgb(0, 113, 151),
            text: rgb(52, 59, 88),
            text_muted: rgb(132, 140, 181),
            success: rgb(72, 94, 48),
            warning: rgb(143, 94, 21),
            error: rgb(245, 42, 101),
            border_active: rgb(46, 126, 233),
            border_normal: rgb(168, 174, 203),
            highlight_bg: rgb(196, 200, 218),
            highlight_fg: rgb(52, 59, 88),
            footer_normal: rgb(46, 126, 233),
            footer_search: rgb(143, 94, 21),
            footer_form: rgb(72, 94, 48),
            footer_delete: rgb(245, 42, 101),
        }
    }

    /// Get theme by name.
    ///
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "midnight" => Some(Self::midnight()),
            "daylight" => Some(Self::daylight()),
            _ => None,
        }
    }

    /// Get list of available theme names.
    ///
    pub fn available_themes() -> Vec<String> {
        vec!["midnight".to_string(), "daylight".to_string()]
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::midnight()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_available_theme_resolves() {
        for name in Theme::available_themes() {
            let theme = Theme::from_name(&name).unwrap();
            assert_eq!(theme.name, name);
        }
        assert!(Theme::from_name("neon").is_none());
    }

    #[test]
    fn test_color_spec_to_color() {
        assert_eq!(rgb(1, 2, 3).to_color(), Color::Rgb(1, 2, 3));
    }
}
