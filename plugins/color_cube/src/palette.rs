use std::str::FromStr;

use colorcube_common::Color4;

use crate::config::ConfigError;

/// Ordered, non-empty list of selectable colors. Immutable for the session.
#[derive(Clone, Debug, PartialEq)]
pub struct Palette(Vec<Color4>);

impl Palette {
    pub fn new(colors: Vec<Color4>) -> Result<Self, ConfigError> {
        if colors.is_empty() {
            return Err(ConfigError::EmptyPalette);
        }
        Ok(Self(colors))
    }

    /// Number of colors
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Bring any index into `[0, len)`
    pub fn wrap(&self, index: usize) -> usize {
        index % self.len()
    }

    /// The index after `index`, wrapping around
    pub fn next(&self, index: usize) -> usize {
        self.wrap(index.wrapping_add(1))
    }

    /// Color at `index`, wrapped into range
    pub fn color(&self, index: usize) -> Color4 {
        self.0[self.wrap(index)]
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self(vec![
            Color4::BLACK,
            Color4::WHITE,
            Color4::RED,
            Color4::GREEN,
            Color4::BLUE,
            Color4::YELLOW,
            Color4::MAGENTA,
            Color4::BLUE,
            // Orange, #FF6B35
            Color4::rgb(1., 107. / 255., 53. / 255.),
            // Purple, #8B5CF6
            Color4::rgb(139. / 255., 92. / 255., 246. / 255.),
        ])
    }
}

/// Comma-separated hex colors, e.g. `#000000,#FFFFFF,#FF0000`
impl FromStr for Palette {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let colors = s
            .split(',')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(Color4::from_hex)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(colors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_palette_matches_scene() {
        let palette = Palette::default();
        assert_eq!(palette.len(), 10);
        assert_eq!(palette.color(4), palette.color(7));
        assert_eq!(palette.color(8).to_hex(), "#FF6B35FF");
        assert_eq!(palette.color(9).to_hex(), "#8B5CF6FF");
    }

    #[test]
    fn next_wraps() {
        let palette: Palette = "#000000, #FFFFFF, #FF0000".parse().unwrap();
        assert_eq!(palette.next(0), 1);
        assert_eq!(palette.next(2), 0);
        assert_eq!(palette.color(4), Color4::WHITE);
    }

    #[test]
    fn empty_is_rejected() {
        assert_eq!(Palette::new(vec![]), Err(ConfigError::EmptyPalette));
        assert_eq!(" , ".parse::<Palette>(), Err(ConfigError::EmptyPalette));
        assert!(matches!(
            "#12345".parse::<Palette>(),
            Err(ConfigError::InvalidColor(_))
        ));
    }
}
