//! Factory templates bundled with the library.
//!
//! Small but complete templates that exercise every keyframe kind. They are
//! embedded at compile time and serve as fixtures for the CLI and tests.

use crate::TemplateFile;

/// Names of the factory templates.
pub static FACTORY_TEMPLATE_NAMES: &[&str] = &["lower_third", "ticker", "expand_box"];

static FACTORY_TEMPLATES_TOML: &[(&str, &str)] = &[
    ("lower_third", LOWER_THIRD),
    ("ticker", TICKER),
    ("expand_box", EXPAND_BOX),
];

/// Name strap: a bar wipes open, then name and title fade in.
const LOWER_THIRD: &str = r#"
name = "lower_third"
description = "Name strap: bar wipes open, name and title fade in"
id = 100
max_keyframe = 3

[[geometries]]
id = 1
kind = "rectangle"
[geometries.live]
rel_x = 80
rel_y = 860
width = 900
height = 120
radius = 8
opacity = 230
color_r = 16
color_g = 32
color_b = 96
color_a = 255

[[geometries.frames]]
frame = 0
attr = "width"
value = 0

[[geometries]]
id = 2
parent = 1
kind = "text"
[geometries.live]
rel_x = 24
rel_y = 16
width = 600
height = 56
opacity = 255
font_size = 48
color_r = 255
color_g = 255
color_b = 255
color_a = 255

[[geometries]]
id = 3
parent = 1
kind = "text"
[geometries.live]
rel_x = 24
rel_y = 76
width = 600
height = 32
font_size = 26
color_r = 200
color_g = 200
color_b = 200
color_a = 255

[[user]]
geo = 2
attr = "opacity"
frame = 2

[[set]]
geo = 2
attr = "opacity"
frame = 0
value = 0

[[set]]
geo = 2
attr = "opacity"
frame = 1
value = 0

[[set]]
geo = 3
attr = "opacity"
frame = 0
value = 0

[[set]]
geo = 3
attr = "opacity"
frame = 1
value = 0

[[bind]]
geo = 3
attr = "opacity"
frame = 2
target = { geo = 2, attr = "opacity", frame = 2 }
"#;

/// News crawl: text scrolls across a full-width band.
const TICKER: &str = r#"
name = "ticker"
description = "News crawl scrolling across a full-width band"
id = 200
max_keyframe = 2

[[geometries]]
id = 1
kind = "rectangle"
[geometries.live]
rel_y = 1000
width = 1920
height = 80
opacity = 255
color_r = 180
color_a = 255

[[geometries]]
id = 2
parent = 1
kind = "text"
[geometries.live]
rel_x = 1920
width = 4000
height = 80
opacity = 255
font_size = 40
color_r = 255
color_g = 255
color_b = 255

[[geometries.frames]]
frame = 1
attr = "rel_x"
value = -4000

[[user]]
geo = 2
attr = "scroll"
frame = 0

[[set]]
geo = 2
attr = "scroll"
frame = 1
value = 5920

[[bind]]
geo = 2
attr = "color_a"
frame = 0
target = { geo = 1, attr = "color_a", frame = 0 }

[[bind]]
geo = 2
attr = "color_a"
frame = 1
target = { geo = 2, attr = "color_a", frame = 0 }
"#;

/// A box that grows and pushes its content's bounds with it.
const EXPAND_BOX: &str = r#"
name = "expand_box"
description = "Box grows on the second keyframe and expands its child's bounds"
id = 300
max_keyframe = 2

[[geometries]]
id = 1
kind = "rectangle"
[geometries.live]
rel_x = 100
rel_y = 100
width = 120
height = 60
opacity = 255

[[geometries]]
id = 2
parent = 1
kind = "text"
[geometries.live]
width = 80
height = 40
opacity = 255
font_size = 24

[[set]]
geo = 1
attr = "width"
frame = 1
value = 300
expand = true

[[set]]
geo = 1
attr = "height"
frame = 1
value = 150
expand = true
"#;

/// Get all factory templates.
///
/// Entries that fail to parse are skipped.
pub fn factory_templates() -> Vec<TemplateFile> {
    FACTORY_TEMPLATES_TOML
        .iter()
        .filter_map(|(_, toml)| TemplateFile::from_toml(toml).ok())
        .collect()
}

/// Get a factory template by name (case-insensitive).
pub fn get_factory_template(name: &str) -> Option<TemplateFile> {
    FACTORY_TEMPLATES_TOML
        .iter()
        .find(|(template_name, _)| template_name.eq_ignore_ascii_case(name))
        .and_then(|(_, toml)| TemplateFile::from_toml(toml).ok())
}

/// Get the raw TOML of a factory template by name (case-insensitive).
pub fn factory_template_toml(name: &str) -> Option<&'static str> {
    FACTORY_TEMPLATES_TOML
        .iter()
        .find(|(template_name, _)| template_name.eq_ignore_ascii_case(name))
        .map(|(_, toml)| toml.trim_start())
}

/// Get the names of all factory templates.
pub fn factory_template_names() -> Vec<&'static str> {
    FACTORY_TEMPLATES_TOML.iter().map(|(name, _)| *name).collect()
}

/// Check if a name is a factory template (case-insensitive).
pub fn is_factory_template(name: &str) -> bool {
    FACTORY_TEMPLATE_NAMES
        .iter()
        .any(|n| n.eq_ignore_ascii_case(name))
}
