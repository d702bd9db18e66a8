//! Engine config and template file validation.
//!
//! Checks what serde cannot: value ranges, dense geometry ids, and that every
//! keyframe entry carries the payload its list requires. Name resolution
//! (attributes, geometry kinds) happens when a template file is converted.
//! Graph-level problems such as cycles are left to the core.

use thiserror::Error;

use crate::engine::EngineConfig;
use crate::template_file::TemplateFile;

/// Validation error types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Page dimensions must be positive.
    #[error("page size {width}x{height} must be positive")]
    InvalidPage {
        /// Configured width.
        width: i32,
        /// Configured height.
        height: i32,
    },

    /// Segment width must be non-zero.
    #[error("segment_width must be at least 1")]
    ZeroSegmentWidth,

    /// An arena limit is zero.
    #[error("{0} must be at least 1")]
    ZeroLimit(&'static str),

    /// The template has an empty name.
    #[error("template name is empty")]
    EmptyName,

    /// The template declares no keyframes.
    #[error("max_keyframe must be at least 1")]
    NoKeyframes,

    /// Geometry ids must run 1, 2, 3, ... in declaration order.
    #[error("geometry at position {position} has id {id}, expected {expected}")]
    GeometryId {
        /// Position in the `[[geometries]]` list.
        position: usize,
        /// Declared id.
        id: usize,
        /// Id required at that position.
        expected: usize,
    },

    /// A `set` entry has no value.
    #[error("set keyframe #{index} has no value")]
    MissingValue {
        /// Position in the `[[set]]` list.
        index: usize,
    },

    /// A `bind` entry has no target.
    #[error("bind keyframe #{index} has no target")]
    MissingTarget {
        /// Position in the `[[bind]]` list.
        index: usize,
    },

    /// Multiple validation errors.
    #[error("multiple validation errors: {}", .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; "))]
    Multiple(Vec<ValidationError>),
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

fn collect(mut errors: Vec<ValidationError>) -> ValidationResult<()> {
    match errors.len() {
        0 => Ok(()),
        1 => Err(errors.remove(0)),
        _ => Err(ValidationError::Multiple(errors)),
    }
}

/// Validate an engine config.
pub fn validate_engine_config(config: &EngineConfig) -> ValidationResult<()> {
    let mut errors = Vec::new();
    if config.page_width <= 0 || config.page_height <= 0 {
        errors.push(ValidationError::InvalidPage {
            width: config.page_width,
            height: config.page_height,
        });
    }
    if config.segment_width == 0 {
        errors.push(ValidationError::ZeroSegmentWidth);
    }
    if config.max_nodes == 0 {
        errors.push(ValidationError::ZeroLimit("max_nodes"));
    }
    if config.max_edges == 0 {
        errors.push(ValidationError::ZeroLimit("max_edges"));
    }
    collect(errors)
}

/// Validate a template file before conversion.
pub fn validate_template_file(file: &TemplateFile) -> ValidationResult<()> {
    let mut errors = Vec::new();

    if file.name.trim().is_empty() {
        errors.push(ValidationError::EmptyName);
    }
    if file.max_keyframe == 0 {
        errors.push(ValidationError::NoKeyframes);
    }
    if let Some(page) = &file.page
        && (page.width <= 0 || page.height <= 0)
    {
        errors.push(ValidationError::InvalidPage {
            width: page.width,
            height: page.height,
        });
    }

    for (position, geometry) in file.geometries.iter().enumerate() {
        let expected = position + 1;
        if geometry.id != expected {
            errors.push(ValidationError::GeometryId {
                position,
                id: geometry.id,
                expected,
            });
        }
    }

    errors.extend(
        file.set
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.value.is_none())
            .map(|(index, _)| ValidationError::MissingValue { index }),
    );
    errors.extend(
        file.bind
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.target.is_none())
            .map(|(index, _)| ValidationError::MissingTarget { index }),
    );

    collect(errors)
}
