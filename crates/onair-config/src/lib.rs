//! Configuration and template files for onair.
//!
//! # Features
//!
//! - **Engine config**: page size, interpolation resolution and arena limits
//!   from `engine.toml`
//! - **Template files**: TOML fixtures that convert into
//!   [`onair_core::TemplateDecl`]
//! - **Validation**: range and structure checks before anything reaches the core
//! - **Factory templates**: built-in templates covering every keyframe kind
//! - **Paths**: platform-specific config and template directories
//!
//! # Example
//!
//! ```rust,no_run
//! use onair_config::{EngineConfig, TemplateFile};
//! use onair_core::compile_template;
//!
//! let config = EngineConfig::load_or_default(None).unwrap();
//! let template = TemplateFile::load("card.toml").unwrap().to_decl().unwrap();
//! let published = compile_template(&template, &config.compile_options()).unwrap();
//! println!("{} keyframes", published.max_keyframe());
//! ```

mod engine;
mod error;
mod template_file;

/// Platform-specific paths for config and templates.
pub mod paths;

/// Config and template validation.
pub mod validation;

/// Factory templates bundled with the library.
pub mod factory_templates;

pub use engine::EngineConfig;
pub use error::ConfigError;
pub use factory_templates::{
    FACTORY_TEMPLATE_NAMES, factory_template_names, factory_template_toml, factory_templates,
    get_factory_template, is_factory_template,
};
pub use paths::{
    engine_config_path, ensure_user_templates_dir, find_template, list_user_templates,
    template_name_from_path, user_config_dir, user_templates_dir,
};
pub use template_file::{BindTarget, FrameEntry, GeometryEntry, KeyframeEntry, PageEntry, TemplateFile};
pub use validation::{ValidationError, ValidationResult, validate_engine_config, validate_template_file};
