//! Geometry attributes and geometry kinds.
//!
//! Every value the evaluator produces is addressed by a `(geometry, attribute,
//! frame)` triple. [`Attr`] is the dense attribute enumeration used in the
//! flattened index; [`GeometryKind`] decides which attributes a geometry carries.
//!
//! Attributes fall into three groups:
//!
//! - **Layout inputs**: [`Attr::RelX`], [`Attr::RelY`], [`Attr::Width`],
//!   [`Attr::Height`]: authored offsets and sizes, keyframable.
//! - **Layout outputs**: positions and bounds derived by the relation builder.
//!   These are never keyframed directly.
//! - **Visual**: opacity, rotation, colour channels and friends. Which of these a
//!   geometry supports depends on its kind.

use core::fmt;
use core::str::FromStr;

/// Error returned when a name does not match any known attribute or geometry kind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} name '{name}'")]
pub struct ParseNameError {
    /// What was being parsed ("attribute" or "geometry kind").
    pub kind: &'static str,
    /// The rejected input.
    pub name: String,
}

/// A geometry attribute.
///
/// Discriminants are dense and start at zero so an attribute can be used
/// directly as the middle coordinate of a flattened index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Attr {
    /// Horizontal offset relative to the parent.
    RelX,
    /// Vertical offset relative to the parent.
    RelY,
    /// Width in pixels.
    Width,
    /// Height in pixels.
    Height,
    /// Absolute horizontal position (derived).
    PosX,
    /// Absolute vertical position (derived).
    PosY,
    /// Left layout bound (derived).
    LowerX,
    /// Right layout bound (derived).
    UpperX,
    /// Top layout bound (derived).
    LowerY,
    /// Bottom layout bound (derived).
    UpperY,
    /// Opacity, 0..=255.
    Opacity,
    /// Rotation in degrees.
    Rotate,
    /// Corner or circle radius.
    Radius,
    /// Red channel, 0..=255.
    ColorR,
    /// Green channel, 0..=255.
    ColorG,
    /// Blue channel, 0..=255.
    ColorB,
    /// Alpha channel, 0..=255.
    ColorA,
    /// Text size in points.
    FontSize,
    /// Text scroll offset (tickers, crawls).
    Scroll,
}

impl Attr {
    /// Number of attributes.
    pub const COUNT: usize = 19;

    /// All attributes in index order.
    pub const ALL: [Attr; Self::COUNT] = [
        Attr::RelX,
        Attr::RelY,
        Attr::Width,
        Attr::Height,
        Attr::PosX,
        Attr::PosY,
        Attr::LowerX,
        Attr::UpperX,
        Attr::LowerY,
        Attr::UpperY,
        Attr::Opacity,
        Attr::Rotate,
        Attr::Radius,
        Attr::ColorR,
        Attr::ColorG,
        Attr::ColorB,
        Attr::ColorA,
        Attr::FontSize,
        Attr::Scroll,
    ];

    /// Attributes the renderer needs for placement. These are blended every
    /// tick for every geometry, whether or not a keyframe touches them.
    pub const LAYOUT_OUTPUTS: [Attr; 8] = [
        Attr::PosX,
        Attr::PosY,
        Attr::Width,
        Attr::Height,
        Attr::LowerX,
        Attr::UpperX,
        Attr::LowerY,
        Attr::UpperY,
    ];

    /// Returns the dense index of this attribute.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Returns the attribute with the given dense index.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Returns the snake_case name used in template files and diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            Attr::RelX => "rel_x",
            Attr::RelY => "rel_y",
            Attr::Width => "width",
            Attr::Height => "height",
            Attr::PosX => "pos_x",
            Attr::PosY => "pos_y",
            Attr::LowerX => "lower_x",
            Attr::UpperX => "upper_x",
            Attr::LowerY => "lower_y",
            Attr::UpperY => "upper_y",
            Attr::Opacity => "opacity",
            Attr::Rotate => "rotate",
            Attr::Radius => "radius",
            Attr::ColorR => "color_r",
            Attr::ColorG => "color_g",
            Attr::ColorB => "color_b",
            Attr::ColorA => "color_a",
            Attr::FontSize => "font_size",
            Attr::Scroll => "scroll",
        }
    }

    /// Returns true for attributes computed by the relation builder.
    pub fn is_derived(self) -> bool {
        matches!(
            self,
            Attr::PosX | Attr::PosY | Attr::LowerX | Attr::UpperX | Attr::LowerY | Attr::UpperY
        )
    }

    /// Returns true for the layout outputs blended on every tick.
    pub fn is_layout_output(self) -> bool {
        Self::LAYOUT_OUTPUTS.contains(&self)
    }
}

impl fmt::Display for Attr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Attr {
    type Err = ParseNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|attr| attr.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseNameError {
                kind: "attribute",
                name: s.to_string(),
            })
    }
}

/// The kind of a visual primitive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GeometryKind {
    /// The page root. Exactly one per template, always geometry 0.
    Page,
    /// Filled or outlined rectangle.
    Rectangle,
    /// Circle or ellipse.
    Circle,
    /// Text run.
    Text,
    /// Still image or video surface.
    Image,
    /// Data graph (bars, lines).
    Graph,
    /// Arbitrary polygon.
    Polygon,
}

impl GeometryKind {
    /// All geometry kinds.
    pub const ALL: [GeometryKind; 7] = [
        GeometryKind::Page,
        GeometryKind::Rectangle,
        GeometryKind::Circle,
        GeometryKind::Text,
        GeometryKind::Image,
        GeometryKind::Graph,
        GeometryKind::Polygon,
    ];

    /// Returns the lowercase name used in template files.
    pub fn name(self) -> &'static str {
        match self {
            GeometryKind::Page => "page",
            GeometryKind::Rectangle => "rectangle",
            GeometryKind::Circle => "circle",
            GeometryKind::Text => "text",
            GeometryKind::Image => "image",
            GeometryKind::Graph => "graph",
            GeometryKind::Polygon => "polygon",
        }
    }

    /// Returns whether geometries of this kind carry `attr`.
    pub fn supports(self, attr: Attr) -> bool {
        match attr {
            Attr::RelX
            | Attr::RelY
            | Attr::Width
            | Attr::Height
            | Attr::PosX
            | Attr::PosY
            | Attr::LowerX
            | Attr::UpperX
            | Attr::LowerY
            | Attr::UpperY => true,
            Attr::Opacity | Attr::Rotate => self != GeometryKind::Page,
            Attr::Radius => matches!(self, GeometryKind::Rectangle | GeometryKind::Circle),
            Attr::ColorR | Attr::ColorG | Attr::ColorB | Attr::ColorA => matches!(
                self,
                GeometryKind::Rectangle
                    | GeometryKind::Circle
                    | GeometryKind::Text
                    | GeometryKind::Graph
                    | GeometryKind::Polygon
            ),
            Attr::FontSize | Attr::Scroll => self == GeometryKind::Text,
        }
    }

    /// Returns whether a keyframe may target `attr` on this kind.
    ///
    /// The page root is seeded from the engine's page size and never
    /// animates.
    pub fn is_keyframable(self, attr: Attr) -> bool {
        self != GeometryKind::Page && self.supports(attr) && !attr.is_derived()
    }
}

impl fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for GeometryKind {
    type Err = ParseNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseNameError {
                kind: "geometry kind",
                name: s.to_string(),
            })
    }
}
