//! Color palette - dark background with a single sea-green accent

use ratatui::style::Color;

#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub bg_highlight: Color,
    pub fg_primary: Color,
    pub fg_secondary: Color,
    pub accent: Color,
    pub accent_alt: Color,
    pub border: Color,
    pub playing: Color,
    pub error: Color,
}

impl Palette {
    pub const TIDE: Self = Self {
        bg_highlight: Color::Rgb(38, 50, 56),    // #263238
        fg_primary: Color::Rgb(236, 239, 241),   // #eceff1
        fg_secondary: Color::Rgb(144, 164, 174), // #90a4ae
        accent: Color::Rgb(77, 182, 172),        // #4db6ac
        accent_alt: Color::Rgb(128, 203, 196),   // #80cbc4
        border: Color::Rgb(69, 90, 100),         // #455a64
        playing: Color::Rgb(105, 240, 174),      // #69f0ae
        error: Color::Rgb(239, 83, 80),          // #ef5350
    };
}

impl Default for Palette {
    fn default() -> Self {
        Self::TIDE
    }
}
