//! Template declarations handed over by the ingestion layer.
//!
//! A [`TemplateDecl`] is the decoded form of one authored template: its
//! geometries (with parent links and live attribute values) and three keyframe
//! lists. Nothing here is validated; [`compile_template`](crate::compile_template)
//! rejects malformed input.

use core::fmt;

use crate::attr::{Attr, GeometryKind};

/// Geometry identifier. Geometry ids are dense and equal their position in
/// [`TemplateDecl::geometries`].
pub type GeoId = usize;

/// Identifier of an authored template.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TemplateId(pub u32);

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Page dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageSize {
    /// Page width.
    pub width: i32,
    /// Page height.
    pub height: i32,
}

impl PageSize {
    /// Creates a page size.
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

impl Default for PageSize {
    fn default() -> Self {
        Self::new(1920, 1080)
    }
}

/// One value per attribute.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttrValues([i32; Attr::COUNT]);

impl Default for AttrValues {
    fn default() -> Self {
        Self([0; Attr::COUNT])
    }
}

impl AttrValues {
    /// Creates a set of all-zero values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value of `attr`.
    #[inline]
    pub fn get(&self, attr: Attr) -> i32 {
        self.0[attr.index()]
    }

    /// Sets the value of `attr`.
    #[inline]
    pub fn set(&mut self, attr: Attr, value: i32) {
        self.0[attr.index()] = value;
    }

    /// Builder form of [`set()`](Self::set).
    pub fn with(mut self, attr: Attr, value: i32) -> Self {
        self.set(attr, value);
        self
    }
}

/// An authored value for one attribute at one frame, overriding the live value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameValue {
    /// Keyframe index.
    pub frame: usize,
    /// Attribute being overridden.
    pub attr: Attr,
    /// Authored value.
    pub value: i32,
}

/// A geometry as delivered by ingestion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeometryDecl {
    /// Dense geometry id.
    pub id: GeoId,
    /// Parent geometry. `None` only for the page root; other parentless
    /// geometries hang off the root.
    pub parent: Option<GeoId>,
    /// Primitive kind.
    pub kind: GeometryKind,
    /// Current live attribute values.
    pub live: AttrValues,
    /// Per-frame overrides of `live`.
    pub frames: Vec<FrameValue>,
}

impl GeometryDecl {
    /// Creates a geometry with zeroed live values.
    pub fn new(id: GeoId, kind: GeometryKind) -> Self {
        Self {
            id,
            parent: None,
            kind,
            live: AttrValues::new(),
            frames: Vec::new(),
        }
    }

    /// Creates the page root (geometry 0).
    pub fn page() -> Self {
        Self::new(0, GeometryKind::Page)
    }

    /// Sets the parent geometry.
    pub fn with_parent(mut self, parent: GeoId) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Sets a live attribute value.
    pub fn with_live(mut self, attr: Attr, value: i32) -> Self {
        self.live.set(attr, value);
        self
    }

    /// Adds a per-frame override.
    pub fn with_frame_value(mut self, frame: usize, attr: Attr, value: i32) -> Self {
        self.frames.push(FrameValue { frame, attr, value });
        self
    }

    /// Returns the authored value of `attr` at `frame`: the last matching
    /// override, or the live value.
    pub fn value_at(&self, frame: usize, attr: Attr) -> i32 {
        self.frames
            .iter()
            .rev()
            .find(|fv| fv.frame == frame && fv.attr == attr)
            .map_or_else(|| self.live.get(attr), |fv| fv.value)
    }
}

/// Reference to one evaluated value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AttrRef {
    /// Geometry.
    pub geo: GeoId,
    /// Attribute.
    pub attr: Attr,
    /// Keyframe index.
    pub frame: usize,
}

impl AttrRef {
    /// Creates a reference.
    pub const fn new(geo: GeoId, attr: Attr, frame: usize) -> Self {
        Self { geo, attr, frame }
    }
}

impl fmt::Display for AttrRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "geo {} {} @{}", self.geo, self.attr, self.frame)
    }
}

/// What a keyframe declaration pins its attribute to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyframeKind {
    /// Snapshot of the geometry's live value at load time.
    User,
    /// A literal authored value.
    Set {
        /// The literal.
        value: i32,
    },
    /// The evaluated value of another attribute at another frame.
    Bind {
        /// Bound source.
        target: AttrRef,
    },
}

impl KeyframeKind {
    /// Returns the list name this kind is delivered in.
    pub fn name(&self) -> &'static str {
        match self {
            KeyframeKind::User => "user",
            KeyframeKind::Set { .. } => "set",
            KeyframeKind::Bind { .. } => "bind",
        }
    }
}

/// One authored keyframe.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyframeDecl {
    /// Keyframe index.
    pub frame: usize,
    /// Target geometry.
    pub geo: GeoId,
    /// Target attribute.
    pub attr: Attr,
    /// Payload.
    pub kind: KeyframeKind,
    /// Propagate a size change to the children's layout bounds.
    pub expand: bool,
}

impl KeyframeDecl {
    /// A `user` keyframe.
    pub fn user(geo: GeoId, attr: Attr, frame: usize) -> Self {
        Self {
            frame,
            geo,
            attr,
            kind: KeyframeKind::User,
            expand: false,
        }
    }

    /// A `set` keyframe.
    pub fn set(geo: GeoId, attr: Attr, frame: usize, value: i32) -> Self {
        Self {
            frame,
            geo,
            attr,
            kind: KeyframeKind::Set { value },
            expand: false,
        }
    }

    /// A `bind` keyframe.
    pub fn bind(geo: GeoId, attr: Attr, frame: usize, target: AttrRef) -> Self {
        Self {
            frame,
            geo,
            attr,
            kind: KeyframeKind::Bind { target },
            expand: false,
        }
    }

    /// Marks the keyframe as expanding.
    pub fn expanding(mut self) -> Self {
        self.expand = true;
        self
    }

    /// Returns the (geo, attr, frame) this keyframe writes.
    pub fn slot(&self) -> AttrRef {
        AttrRef::new(self.geo, self.attr, self.frame)
    }
}

/// A decoded template.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TemplateDecl {
    /// Template identifier.
    pub id: TemplateId,
    /// Number of keyframes (frames `0..max_keyframe`).
    pub max_keyframe: usize,
    /// Page size override; the engine default is used when absent.
    pub page: Option<PageSize>,
    /// Geometries, indexed by id. Geometry 0 is the page root.
    pub geometries: Vec<GeometryDecl>,
    /// Live-value snapshot keyframes.
    pub user: Vec<KeyframeDecl>,
    /// Literal keyframes.
    pub set: Vec<KeyframeDecl>,
    /// Binding keyframes.
    pub bind: Vec<KeyframeDecl>,
}

impl TemplateDecl {
    /// Creates a template containing only the page root.
    pub fn new(id: TemplateId, max_keyframe: usize) -> Self {
        Self {
            id,
            max_keyframe,
            page: None,
            geometries: vec![GeometryDecl::page()],
            user: Vec::new(),
            set: Vec::new(),
            bind: Vec::new(),
        }
    }

    /// Sets the page size.
    pub fn with_page(mut self, page: PageSize) -> Self {
        self.page = Some(page);
        self
    }

    /// Appends a geometry. Its id must equal its position.
    pub fn with_geometry(mut self, geometry: GeometryDecl) -> Self {
        self.geometries.push(geometry);
        self
    }

    /// Appends a keyframe to the list matching its kind.
    pub fn with_keyframe(mut self, keyframe: KeyframeDecl) -> Self {
        self.push_keyframe(keyframe);
        self
    }

    /// Appends a keyframe to the list matching its kind.
    pub fn push_keyframe(&mut self, keyframe: KeyframeDecl) {
        match keyframe.kind {
            KeyframeKind::User => self.user.push(keyframe),
            KeyframeKind::Set { .. } => self.set.push(keyframe),
            KeyframeKind::Bind { .. } => self.bind.push(keyframe),
        }
    }

    /// Iterates every keyframe in load order: user, then set, then bind.
    pub fn keyframes(&self) -> impl Iterator<Item = &KeyframeDecl> {
        self.user.iter().chain(&self.set).chain(&self.bind)
    }

    /// Returns the ids of the direct children of `geo`, in declaration order.
    ///
    /// Parentless non-root geometries count as children of the root.
    pub fn children_of(&self, geo: GeoId) -> impl Iterator<Item = GeoId> + '_ {
        self.geometries
            .iter()
            .filter(move |g| g.id != 0 && g.parent.unwrap_or(0) == geo)
            .map(|g| g.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_at_prefers_latest_override() {
        let g = GeometryDecl::new(1, GeometryKind::Rectangle)
            .with_live(Attr::RelX, 10)
            .with_frame_value(1, Attr::RelX, 20)
            .with_frame_value(1, Attr::RelX, 30);
        assert_eq!(g.value_at(0, Attr::RelX), 10);
        assert_eq!(g.value_at(1, Attr::RelX), 30);
        assert_eq!(g.value_at(1, Attr::Width), 0);
    }

    #[test]
    fn test_push_keyframe_routes_by_kind() {
        let t = TemplateDecl::new(TemplateId(1), 2)
            .with_keyframe(KeyframeDecl::user(0, Attr::Width, 0))
            .with_keyframe(KeyframeDecl::set(0, Attr::Width, 1, 5))
            .with_keyframe(KeyframeDecl::bind(
                0,
                Attr::Height,
                1,
                AttrRef::new(0, Attr::Width, 1),
            ));
        assert_eq!(t.user.len(), 1);
        assert_eq!(t.set.len(), 1);
        assert_eq!(t.bind.len(), 1);
        let order: Vec<&str> = t.keyframes().map(|k| k.kind.name()).collect();
        assert_eq!(order, ["user", "set", "bind"]);
    }

    #[test]
    fn test_children_of_includes_parentless() {
        let t = TemplateDecl::new(TemplateId(1), 1)
            .with_geometry(GeometryDecl::new(1, GeometryKind::Rectangle))
            .with_geometry(GeometryDecl::new(2, GeometryKind::Text).with_parent(1))
            .with_geometry(GeometryDecl::new(3, GeometryKind::Text).with_parent(0));
        assert_eq!(t.children_of(0).collect::<Vec<_>>(), [1, 3]);
        assert_eq!(t.children_of(1).collect::<Vec<_>>(), [2]);
        assert_eq!(t.children_of(2).count(), 0);
    }
}
