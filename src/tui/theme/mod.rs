//! Theme: palette, glyphs and border set shared by every widget

pub mod icons;
pub mod palette;

pub use icons::Icons;
pub use palette::Palette;

use ratatui::symbols::border;

#[derive(Debug, Clone, Default)]
pub struct Theme {
    pub palette: Palette,
    pub icons: Icons,
}

impl Theme {
    pub fn border_set(&self) -> border::Set<'static> {
        border::ROUNDED
    }
}

pub fn get_theme() -> Theme {
    Theme::default()
}
