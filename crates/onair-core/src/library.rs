//! Published templates, keyed by id.
//!
//! Loading swaps the `Arc` for a template id only when compilation succeeds,
//! so renderers holding the previous publication are never disturbed and a
//! rejected reload leaves the old one in place.

use std::collections::HashMap;
use std::sync::Arc;

use crate::compile::{CompileOptions, PublishedTemplate, compile_template};
use crate::error::TemplateError;
use crate::template::{TemplateDecl, TemplateId};

/// The set of templates currently on air or ready to go.
#[derive(Debug, Default)]
pub struct TemplateLibrary {
    options: CompileOptions,
    templates: HashMap<TemplateId, Arc<PublishedTemplate>>,
}

impl TemplateLibrary {
    /// Creates an empty library that compiles with `options`.
    pub fn new(options: CompileOptions) -> Self {
        Self {
            options,
            templates: HashMap::new(),
        }
    }

    /// Compile options applied to every load.
    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// Compiles `template` and publishes it under its id, replacing any
    /// previous publication.
    ///
    /// On failure the previous publication, if any, stays current.
    pub fn load(&mut self, template: &TemplateDecl) -> Result<Arc<PublishedTemplate>, TemplateError> {
        let published = Arc::new(compile_template(template, &self.options)?);
        if self
            .templates
            .insert(template.id, Arc::clone(&published))
            .is_some()
        {
            tracing::debug!("template_swap: template {} replaced", template.id);
        }
        Ok(published)
    }

    /// Returns the current publication of a template.
    pub fn get(&self, id: TemplateId) -> Option<Arc<PublishedTemplate>> {
        self.templates.get(&id).cloned()
    }

    /// Withdraws a template. Layers still holding it keep their reference.
    pub fn remove(&mut self, id: TemplateId) -> Option<Arc<PublishedTemplate>> {
        self.templates.remove(&id)
    }

    /// Number of published templates.
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Returns true if nothing is published.
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Published template ids, sorted.
    pub fn ids(&self) -> Vec<TemplateId> {
        let mut ids: Vec<_> = self.templates.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attr::{Attr, GeometryKind};
    use crate::template::{AttrRef, GeometryDecl, KeyframeDecl};

    fn template(width: i32) -> TemplateDecl {
        TemplateDecl::new(TemplateId(4), 2)
            .with_geometry(GeometryDecl::new(1, GeometryKind::Rectangle))
            .with_keyframe(KeyframeDecl::set(1, Attr::Width, 1, width))
    }

    #[test]
    fn test_load_publishes() {
        let mut lib = TemplateLibrary::default();
        let published = lib.load(&template(100)).unwrap();
        assert_eq!(lib.len(), 1);
        assert!(Arc::ptr_eq(&published, &lib.get(TemplateId(4)).unwrap()));
    }

    #[test]
    fn test_reload_swaps_without_touching_readers() {
        let mut lib = TemplateLibrary::default();
        let first = lib.load(&template(100)).unwrap();
        lib.load(&template(200)).unwrap();
        assert_eq!(first.value(1, Attr::Width, 1), Some(100));
        assert_eq!(
            lib.get(TemplateId(4)).unwrap().value(1, Attr::Width, 1),
            Some(200)
        );
    }

    #[test]
    fn test_failed_reload_keeps_previous() {
        let mut lib = TemplateLibrary::default();
        lib.load(&template(100)).unwrap();
        let broken = template(300).with_keyframe(KeyframeDecl::bind(
            1,
            Attr::Height,
            0,
            AttrRef::new(8, Attr::Height, 0),
        ));
        assert!(lib.load(&broken).is_err());
        assert_eq!(
            lib.get(TemplateId(4)).unwrap().value(1, Attr::Width, 1),
            Some(100)
        );
    }

    #[test]
    fn test_remove_and_ids() {
        let mut lib = TemplateLibrary::default();
        lib.load(&template(1)).unwrap();
        let mut other = template(1);
        other.id = TemplateId(2);
        lib.load(&other).unwrap();
        assert_eq!(lib.ids(), [TemplateId(2), TemplateId(4)]);
        assert!(lib.remove(TemplateId(2)).is_some());
        assert_eq!(lib.ids(), [TemplateId(4)]);
    }
}
