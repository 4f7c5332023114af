//! Typed home document nodes.

use sh3d_math::{Vec3, Vec4};

/// A parsed home document.
#[derive(Clone, Debug, Default)]
pub struct HomeDocument {
    /// `name` attribute of the root
    pub name: Option<String>,

    /// Path of the structure mesh inside the archive
    pub structure: Option<String>,

    /// Children of the root, in document order
    pub nodes: Vec<HomeNode>,
}

impl HomeDocument {
    /// Every piece in the document, depth first.
    pub fn pieces(&self) -> Vec<&Piece> {
        fn collect<'a>(nodes: &'a [HomeNode], out: &mut Vec<&'a Piece>) {
            for node in nodes {
                match node {
                    HomeNode::Piece(piece) => out.push(piece),
                    HomeNode::FurnitureGroup(group) => collect(&group.children, out),
                    _ => {}
                }
            }
        }

        let mut out = Vec::new();
        collect(&self.nodes, &mut out);
        out
    }

    pub fn levels(&self) -> impl Iterator<Item = &Level> {
        self.nodes.iter().filter_map(|n| match n {
            HomeNode::Level(level) => Some(level),
            _ => None,
        })
    }
}

/// One child of the home or of a furniture group.
#[derive(Clone, Debug)]
pub enum HomeNode {
    Level(Level),
    FurnitureGroup(FurnitureGroup),
    Piece(Piece),
    ObserverCamera(ObserverCamera),

    /// Element the importer does not handle, by tag
    Other(String),
}

/// A floor plane.
#[derive(Clone, Debug, PartialEq)]
pub struct Level {
    pub id: String,
    pub name: Option<String>,

    /// Elevation in centimeters
    pub elevation: f32,
    pub floor_thickness: f32,
}

/// A named group of pieces.
#[derive(Clone, Debug)]
pub struct FurnitureGroup {
    pub name: String,
    pub visible: bool,
    pub children: Vec<HomeNode>,
}

/// Structural category of a piece, from its element tag.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PieceCategory {
    Furniture,
    DoorOrWindow,
    Light,
    Other(String),
}

impl PieceCategory {
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "pieceOfFurniture" => Self::Furniture,
            "doorOrWindow" => Self::DoorOrWindow,
            "light" => Self::Light,
            other => Self::Other(other.to_string()),
        }
    }
}

/// A model-bearing element: furniture, door, window or light.
///
/// Lengths are in centimeters and angles in radians, as in the document.
#[derive(Clone, Debug)]
pub struct Piece {
    pub id: Option<String>,
    pub name: String,
    pub category: PieceCategory,

    /// Model path inside the archive, percent-decoded
    pub model: String,

    pub x: f32,
    pub y: f32,
    pub elevation: Option<f32>,
    pub width: f32,
    pub depth: f32,
    pub height: f32,

    /// Yaw around the vertical axis
    pub angle: Option<f32>,
    pub pitch: Option<f32>,

    pub color: Option<Color>,
    pub model_mirrored: bool,

    /// Row-major 3x3 matrix
    pub model_rotation: Option<[f32; 9]>,

    pub level: Option<String>,
    pub visible: bool,
    pub materials: Vec<PieceMaterial>,

    /// Present on `light` elements
    pub light: Option<LightInfo>,
}

/// A material override on a piece.
#[derive(Clone, Debug, PartialEq)]
pub struct PieceMaterial {
    /// Matched against the model's material names
    pub name: String,
    pub color: Option<Color>,

    /// Image path inside the archive
    pub texture: Option<String>,
}

/// Light emission of a `light` element.
#[derive(Clone, Debug, PartialEq)]
pub struct LightInfo {
    pub power: f32,
    pub sources: Vec<LightSource>,
}

/// A point light, positioned relative to the piece's box (0..1 per axis).
#[derive(Clone, Debug, PartialEq)]
pub struct LightSource {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub color: Option<Color>,
    pub diameter: Option<f32>,
}

/// The walkthrough camera.
#[derive(Clone, Debug, PartialEq)]
pub struct ObserverCamera {
    pub attribute: Option<String>,
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub yaw: f32,
    pub pitch: f32,
}

/// An opaque RGB color from an `AARRGGBB` hex attribute.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color(pub Vec3);

impl Color {
    /// Parse 8 hex digits; the alpha byte is ignored.
    pub fn parse_argb(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.len() != 8 || !value.is_ascii() {
            return None;
        }

        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&value[range], 16)
                .ok()
                .map(|c| c as f32 / 255.0)
        };

        // Validate the alpha digits even though they are discarded
        u8::from_str_radix(&value[0..2], 16).ok()?;

        Some(Self(Vec3::new(channel(2..4)?, channel(4..6)?, channel(6..8)?)))
    }

    /// Always opaque, for piece colors and material overrides alike.
    /// A fully transparent override would hide the surface.
    pub fn rgba(&self) -> Vec4 {
        self.0.extend(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_argb() {
        let color = Color::parse_argb("FF8000FF").unwrap();
        assert!((color.0.x - 128.0 / 255.0).abs() < 1e-6);
        assert_eq!(color.0.y, 0.0);
        assert_eq!(color.0.z, 1.0);
        assert_eq!(color.rgba().w, 1.0);
    }

    #[test]
    fn test_parse_argb_ignores_alpha() {
        assert_eq!(Color::parse_argb("00FFFFFF"), Color::parse_argb("FFFFFFFF"));
    }

    #[test]
    fn test_parse_argb_rejects_garbage() {
        assert!(Color::parse_argb("FFFFFF").is_none());
        assert!(Color::parse_argb("GGFFFFFF").is_none());
        assert!(Color::parse_argb("FFFFFFFZ").is_none());
        assert!(Color::parse_argb("FFé0FFF").is_none());
    }

    #[test]
    fn test_category_from_tag() {
        assert_eq!(PieceCategory::from_tag("doorOrWindow"), PieceCategory::DoorOrWindow);
        assert_eq!(
            PieceCategory::from_tag("shelf"),
            PieceCategory::Other("shelf".to_string())
        );
    }
}
