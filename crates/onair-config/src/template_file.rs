//! TOML template files.
//!
//! A template file is a human-editable fixture describing one template: its
//! geometries (the page root is implicit) and its three keyframe lists. It
//! converts into the core's [`TemplateDecl`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use onair_core::{
    Attr, AttrRef, GeometryDecl, GeometryKind, KeyframeDecl, KeyframeKind, PageSize,
    TemplateDecl, TemplateId,
};

use crate::error::ConfigError;
use crate::validation::{ValidationError, validate_template_file};

/// Template file format.
///
/// # TOML Format
///
/// ```toml
/// name = "lower_third"
/// description = "Name strap"
/// id = 100
/// max_keyframe = 2
///
/// [page]
/// width = 1920
/// height = 1080
///
/// [[geometries]]
/// id = 1
/// kind = "rectangle"
/// [geometries.live]
/// rel_x = 80
/// width = 600
///
/// [[geometries.frames]]
/// frame = 1
/// attr = "rel_x"
/// value = 120
///
/// [[set]]
/// geo = 1
/// attr = "opacity"
/// frame = 0
/// value = 0
///
/// [[bind]]
/// geo = 1
/// attr = "height"
/// frame = 1
/// target = { geo = 1, attr = "height", frame = 0 }
/// ```
///
/// Geometry ids start at 1 and follow declaration order; a geometry without
/// `parent` hangs off the page root (geometry 0).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TemplateFile {
    /// Template name.
    pub name: String,

    /// Optional description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Numeric template id.
    #[serde(default)]
    pub id: u32,

    /// Number of keyframes.
    pub max_keyframe: usize,

    /// Page size; the engine default applies when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<PageEntry>,

    /// Non-root geometries.
    #[serde(default)]
    pub geometries: Vec<GeometryEntry>,

    /// Live-value snapshot keyframes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub user: Vec<KeyframeEntry>,

    /// Literal keyframes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub set: Vec<KeyframeEntry>,

    /// Binding keyframes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bind: Vec<KeyframeEntry>,
}

/// `[page]` table.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageEntry {
    /// Width in pixels.
    pub width: i32,
    /// Height in pixels.
    pub height: i32,
}

/// One `[[geometries]]` entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GeometryEntry {
    /// Geometry id (1-based).
    pub id: usize,
    /// Parent geometry id; the page root when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<usize>,
    /// Geometry kind name.
    pub kind: String,
    /// Live attribute values by attribute name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub live: BTreeMap<String, i32>,
    /// Per-frame overrides.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub frames: Vec<FrameEntry>,
}

impl GeometryEntry {
    /// Create a geometry entry with no values.
    pub fn new(id: usize, kind: impl Into<String>) -> Self {
        Self {
            id,
            parent: None,
            kind: kind.into(),
            live: BTreeMap::new(),
            frames: Vec::new(),
        }
    }

    /// Set the parent.
    pub fn with_parent(mut self, parent: usize) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Set a live value.
    pub fn with_live(mut self, attr: impl Into<String>, value: i32) -> Self {
        self.live.insert(attr.into(), value);
        self
    }

    /// Add a per-frame override.
    pub fn with_frame(mut self, frame: usize, attr: impl Into<String>, value: i32) -> Self {
        self.frames.push(FrameEntry {
            frame,
            attr: attr.into(),
            value,
        });
        self
    }
}

/// One `[[geometries.frames]]` entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FrameEntry {
    /// Keyframe index.
    pub frame: usize,
    /// Attribute name.
    pub attr: String,
    /// Authored value.
    pub value: i32,
}

/// One `[[user]]`, `[[set]]` or `[[bind]]` entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct KeyframeEntry {
    /// Target geometry.
    pub geo: usize,
    /// Target attribute name.
    pub attr: String,
    /// Keyframe index.
    pub frame: usize,
    /// Literal value (`set` only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<i32>,
    /// Propagate to children's bounds.
    #[serde(default, skip_serializing_if = "is_false")]
    pub expand: bool,
    /// Bound source (`bind` only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<BindTarget>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl KeyframeEntry {
    /// Create an entry with no payload.
    pub fn new(geo: usize, attr: impl Into<String>, frame: usize) -> Self {
        Self {
            geo,
            attr: attr.into(),
            frame,
            value: None,
            expand: false,
            target: None,
        }
    }

    fn to_decl(&self, list: &str, index: usize) -> Result<KeyframeDecl, ConfigError> {
        let attr: Attr = self.attr.parse()?;
        let kind = match list {
            "set" => KeyframeKind::Set {
                value: self.value.ok_or(ValidationError::MissingValue { index })?,
            },
            "bind" => {
                let target = self
                    .target
                    .as_ref()
                    .ok_or(ValidationError::MissingTarget { index })?;
                KeyframeKind::Bind {
                    target: AttrRef::new(target.geo, target.attr.parse()?, target.frame),
                }
            }
            _ => KeyframeKind::User,
        };
        Ok(KeyframeDecl {
            frame: self.frame,
            geo: self.geo,
            attr,
            kind,
            expand: self.expand,
        })
    }

    fn from_decl(decl: &KeyframeDecl) -> Self {
        let mut entry = Self::new(decl.geo, decl.attr.name(), decl.frame);
        entry.expand = decl.expand;
        match decl.kind {
            KeyframeKind::User => {}
            KeyframeKind::Set { value } => entry.value = Some(value),
            KeyframeKind::Bind { target } => {
                entry.target = Some(BindTarget {
                    geo: target.geo,
                    attr: target.attr.name().to_string(),
                    frame: target.frame,
                });
            }
        }
        entry
    }
}

/// Source of a `bind` keyframe.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BindTarget {
    /// Source geometry.
    pub geo: usize,
    /// Source attribute name.
    pub attr: String,
    /// Source keyframe index.
    pub frame: usize,
}

impl TemplateFile {
    /// Create an empty template file.
    pub fn new(name: impl Into<String>, max_keyframe: usize) -> Self {
        Self {
            name: name.into(),
            description: None,
            id: 0,
            max_keyframe,
            page: None,
            geometries: Vec::new(),
            user: Vec::new(),
            set: Vec::new(),
            bind: Vec::new(),
        }
    }

    /// Load a template file from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Self::from_toml(&content)
    }

    /// Parse a template file from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Save the template file, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }
        std::fs::write(path, self.to_toml()?).map_err(|e| ConfigError::write_file(path, e))
    }

    /// Convert to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Validate the file and convert it into a template declaration.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Validation`] for structural problems and
    /// [`ConfigError::UnknownName`] for unknown kind or attribute names in a
    /// geometry. A keyframe entry naming an unknown attribute is dropped with a
    /// warning instead, like a keyframe on an unsupported attribute.
    pub fn to_decl(&self) -> Result<TemplateDecl, ConfigError> {
        validate_template_file(self)?;

        let mut decl = TemplateDecl::new(TemplateId(self.id), self.max_keyframe);
        decl.page = self.page.map(|p| PageSize::new(p.width, p.height));

        for entry in &self.geometries {
            let kind: GeometryKind = entry.kind.parse()?;
            let mut geometry = GeometryDecl::new(entry.id, kind);
            geometry.parent = entry.parent;
            for (name, &value) in &entry.live {
                geometry.live.set(name.parse()?, value);
            }
            for frame in &entry.frames {
                geometry = geometry.with_frame_value(frame.frame, frame.attr.parse()?, frame.value);
            }
            decl.geometries.push(geometry);
        }

        for (list, entries) in [("user", &self.user), ("set", &self.set), ("bind", &self.bind)] {
            for (index, entry) in entries.iter().enumerate() {
                match entry.to_decl(list, index) {
                    Ok(keyframe) => decl.push_keyframe(keyframe),
                    Err(ConfigError::UnknownName(err)) => {
                        tracing::warn!("template_file: {list} keyframe {index} dropped: {err}");
                    }
                    Err(err) => return Err(err),
                }
            }
        }
        Ok(decl)
    }

    /// Describe an existing declaration as a template file.
    ///
    /// Only non-zero live values are written.
    pub fn from_decl(name: impl Into<String>, decl: &TemplateDecl) -> Self {
        let mut file = Self::new(name, decl.max_keyframe);
        file.id = decl.id.0;
        file.page = decl.page.map(|p| PageEntry {
            width: p.width,
            height: p.height,
        });

        for geometry in decl.geometries.iter().skip(1) {
            let mut entry = GeometryEntry::new(geometry.id, geometry.kind.name());
            entry.parent = geometry.parent;
            for attr in Attr::ALL {
                let value = geometry.live.get(attr);
                if value != 0 {
                    entry.live.insert(attr.name().to_string(), value);
                }
            }
            for fv in &geometry.frames {
                entry = entry.with_frame(fv.frame, fv.attr.name(), fv.value);
            }
            file.geometries.push(entry);
        }

        file.user = decl.user.iter().map(KeyframeEntry::from_decl).collect();
        file.set = decl.set.iter().map(KeyframeEntry::from_decl).collect();
        file.bind = decl.bind.iter().map(KeyframeEntry::from_decl).collect();
        file
    }
}
