//! Per-tick interpolation between published keyframes.
//!
//! A layer's progress through its page maps onto a pair of bracketing
//! keyframes and an integer offset into the segment between them. Every blended
//! pair is then linearly interpolated and written to the layer's live values.
//!
//! Nothing here allocates once a page is shown; [`Layer::tick`] is safe to call
//! from the render loop.

use std::sync::Arc;

use crate::attr::Attr;
use crate::compile::PublishedTemplate;
use crate::template::{AttrValues, GeoId};

/// Default number of ticks per keyframe segment.
pub const DEFAULT_SEGMENT_WIDTH: u32 = 1000;

/// Position within a keyframe sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyframeCursor {
    /// Keyframe at or before the position.
    pub keyframe: usize,
    /// Ticks past `keyframe`, in `0..segment_width`.
    pub offset: u32,
    /// Ticks per segment.
    pub segment_width: u32,
}

impl KeyframeCursor {
    /// Maps `progress` (fraction of the whole animation) onto a sequence of
    /// `max_keyframe` keyframes.
    ///
    /// Progress is clamped to `[0, 1]`; NaN counts as 0. A zero segment width
    /// is treated as 1.
    pub fn locate(progress: f64, max_keyframe: usize, segment_width: u32) -> Self {
        let segment_width = segment_width.max(1);
        let progress = if progress.is_nan() {
            0.0
        } else {
            progress.clamp(0.0, 1.0)
        };

        let segments = max_keyframe.saturating_sub(1) as u64;
        let total = segments * u64::from(segment_width);
        let ticks = ((progress * total as f64).round() as u64).min(total);

        Self {
            keyframe: (ticks / u64::from(segment_width)) as usize,
            offset: (ticks % u64::from(segment_width)) as u32,
            segment_width,
        }
    }

    /// Returns true if the cursor sits on the final keyframe.
    pub fn is_last(&self, max_keyframe: usize) -> bool {
        self.keyframe + 1 >= max_keyframe
    }
}

/// Integer linear interpolation, truncating toward zero.
///
/// `offset` is clamped to `segment_width`, so the result always lies between
/// `start` and `end`.
#[inline]
pub fn lerp(start: i32, end: i32, offset: u32, segment_width: u32) -> i32 {
    if segment_width == 0 {
        return start;
    }
    let offset = i64::from(offset.min(segment_width));
    let delta = i64::from(end) - i64::from(start);
    (i64::from(start) + delta * offset / i64::from(segment_width)) as i32
}

/// Interpolated value of one pair at `cursor`, or `None` outside the template.
pub fn sample(
    template: &PublishedTemplate,
    geo: GeoId,
    attr: Attr,
    cursor: KeyframeCursor,
) -> Option<i32> {
    let start = template.value(geo, attr, cursor.keyframe)?;
    if cursor.is_last(template.max_keyframe()) {
        return Some(start);
    }
    let end = template.value(geo, attr, cursor.keyframe + 1)?;
    Some(lerp(start, end, cursor.offset, cursor.segment_width))
}

/// Writes every blended pair of `template` at `cursor` into `live`.
pub fn interpolate(template: &PublishedTemplate, cursor: KeyframeCursor, live: &mut LiveAttributes) {
    for &(geo, attr) in template.blend_pairs() {
        if let Some(value) = sample(template, geo, attr, cursor) {
            live.set(geo, attr, value);
        }
    }
}

/// Current attribute values of every geometry on a layer, read by the renderer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LiveAttributes {
    geometries: Vec<AttrValues>,
}

impl LiveAttributes {
    /// Creates zeroed values for `geometries` geometries.
    pub fn new(geometries: usize) -> Self {
        Self {
            geometries: vec![AttrValues::new(); geometries],
        }
    }

    /// Number of geometries.
    pub fn len(&self) -> usize {
        self.geometries.len()
    }

    /// Returns true if there are no geometries.
    pub fn is_empty(&self) -> bool {
        self.geometries.is_empty()
    }

    /// Returns one value, or `None` for an unknown geometry.
    pub fn get(&self, geo: GeoId, attr: Attr) -> Option<i32> {
        self.geometries.get(geo).map(|values| values.get(attr))
    }

    /// Sets one value. Unknown geometries are ignored.
    pub fn set(&mut self, geo: GeoId, attr: Attr, value: i32) {
        if let Some(values) = self.geometries.get_mut(geo) {
            values.set(attr, value);
        }
    }

    /// All values of one geometry.
    pub fn geometry(&self, geo: GeoId) -> Option<&AttrValues> {
        self.geometries.get(geo)
    }

    /// Replaces every value with the published value of `template` at
    /// `frame`, resizing to the template's geometry count.
    pub fn seed(&mut self, template: &PublishedTemplate, frame: usize) {
        self.geometries.clear();
        self.geometries.extend((0..template.geometries()).map(|geo| {
            let mut values = AttrValues::new();
            for attr in Attr::ALL {
                if let Some(value) = template.value(geo, attr, frame) {
                    values.set(attr, value);
                }
            }
            values
        }));
    }
}

/// One compositing layer: a page being played out at some progress.
#[derive(Debug)]
pub struct Layer {
    page: Option<Arc<PublishedTemplate>>,
    progress: f64,
    segment_width: u32,
    live: LiveAttributes,
}

impl Default for Layer {
    fn default() -> Self {
        Self::new(DEFAULT_SEGMENT_WIDTH)
    }
}

impl Layer {
    /// Creates an empty layer.
    pub fn new(segment_width: u32) -> Self {
        Self {
            page: None,
            progress: 0.0,
            segment_width,
            live: LiveAttributes::default(),
        }
    }

    /// Puts a published template on the layer and rewinds to the start.
    ///
    /// Every attribute starts at its keyframe 0 value; ticks then blend only
    /// the template's blend pairs.
    pub fn show(&mut self, page: Arc<PublishedTemplate>) {
        self.live.seed(&page, 0);
        self.page = Some(page);
        self.progress = 0.0;
    }

    /// Takes the page off the layer.
    pub fn clear(&mut self) -> Option<Arc<PublishedTemplate>> {
        self.page.take()
    }

    /// The active page.
    pub fn page(&self) -> Option<&Arc<PublishedTemplate>> {
        self.page.as_ref()
    }

    /// Sets progress through the animation, a fraction in `[0, 1]`.
    pub fn set_progress(&mut self, progress: f64) {
        self.progress = progress;
    }

    /// Current progress.
    pub fn progress(&self) -> f64 {
        self.progress
    }

    /// Ticks per keyframe segment.
    pub fn segment_width(&self) -> u32 {
        self.segment_width
    }

    /// Values written by the last tick.
    pub fn live(&self) -> &LiveAttributes {
        &self.live
    }

    /// Interpolates the active page at the current progress into the live
    /// values. Does nothing and returns `None` when no page is shown.
    pub fn tick(&mut self) -> Option<KeyframeCursor> {
        let page = self.page.as_ref()?;
        let cursor = KeyframeCursor::locate(self.progress, page.max_keyframe(), self.segment_width);
        interpolate(page, cursor, &mut self.live);
        Some(cursor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attr::GeometryKind;
    use crate::compile::{CompileOptions, compile_template};
    use crate::template::{GeometryDecl, KeyframeDecl, TemplateDecl, TemplateId};

    #[test]
    fn test_locate_boundaries() {
        let start = KeyframeCursor::locate(0.0, 3, 1000);
        assert_eq!((start.keyframe, start.offset), (0, 0));
        let mid = KeyframeCursor::locate(0.5, 3, 1000);
        assert_eq!((mid.keyframe, mid.offset), (1, 0));
        let end = KeyframeCursor::locate(1.0, 3, 1000);
        assert_eq!((end.keyframe, end.offset), (2, 0));
        assert!(end.is_last(3));
        let quarter = KeyframeCursor::locate(0.25, 3, 1000);
        assert_eq!((quarter.keyframe, quarter.offset), (0, 500));
    }

    #[test]
    fn test_locate_clamps() {
        assert_eq!(KeyframeCursor::locate(-1.0, 4, 10).keyframe, 0);
        assert_eq!(KeyframeCursor::locate(7.0, 4, 10).keyframe, 3);
        assert_eq!(KeyframeCursor::locate(f64::NAN, 4, 10).keyframe, 0);
        assert_eq!(KeyframeCursor::locate(0.5, 1, 10).keyframe, 0);
        assert_eq!(KeyframeCursor::locate(0.5, 2, 0).segment_width, 1);
    }

    #[test]
    fn test_lerp() {
        assert_eq!(lerp(50, 150, 0, 1000), 50);
        assert_eq!(lerp(50, 150, 500, 1000), 100);
        assert_eq!(lerp(50, 150, 1000, 1000), 150);
        assert_eq!(lerp(0, 10, 1, 3), 3);
        assert_eq!(lerp(0, -10, 1, 3), -3);
        assert_eq!(lerp(i32::MIN, i32::MAX, 1000, 1000), i32::MAX);
        assert_eq!(lerp(7, 9, 3, 0), 7);
    }

    fn slide() -> Arc<PublishedTemplate> {
        let t = TemplateDecl::new(TemplateId(6), 2)
            .with_geometry(
                GeometryDecl::new(1, GeometryKind::Rectangle)
                    .with_live(Attr::Opacity, 255)
                    .with_frame_value(0, Attr::RelX, -400)
                    .with_frame_value(1, Attr::RelX, 0),
            )
            .with_keyframe(KeyframeDecl::set(1, Attr::Opacity, 0, 0))
            .with_keyframe(KeyframeDecl::user(1, Attr::Opacity, 1));
        Arc::new(compile_template(&t, &CompileOptions::default()).unwrap())
    }

    #[test]
    fn test_layer_without_page_is_idle() {
        let mut layer = Layer::default();
        layer.set_progress(0.5);
        assert_eq!(layer.tick(), None);
        assert!(layer.live().is_empty());
    }

    #[test]
    fn test_layer_tick_blends_tracked_and_layout() {
        let mut layer = Layer::default();
        layer.show(slide());
        layer.set_progress(0.5);
        layer.tick().unwrap();
        assert_eq!(layer.live().get(1, Attr::PosX), Some(-200));
        assert_eq!(layer.live().get(1, Attr::Opacity), Some(127));

        layer.set_progress(1.0);
        layer.tick().unwrap();
        assert_eq!(layer.live().get(1, Attr::PosX), Some(0));
        assert_eq!(layer.live().get(1, Attr::Opacity), Some(255));
    }

    #[test]
    fn test_untracked_attributes_hold_first_keyframe() {
        let t = TemplateDecl::new(TemplateId(7), 2)
            .with_geometry(
                GeometryDecl::new(1, GeometryKind::Rectangle)
                    .with_live(Attr::Opacity, 255)
                    .with_live(Attr::ColorR, 200)
                    .with_live(Attr::Rotate, 15),
            )
            .with_keyframe(KeyframeDecl::set(1, Attr::RelX, 1, 40));
        let page = Arc::new(compile_template(&t, &CompileOptions::default()).unwrap());
        assert!(!page.is_tracked(1, Attr::Opacity));

        let mut layer = Layer::default();
        layer.show(page);
        layer.set_progress(0.5);
        layer.tick().unwrap();
        assert_eq!(layer.live().get(1, Attr::Opacity), Some(255));
        assert_eq!(layer.live().get(1, Attr::ColorR), Some(200));
        assert_eq!(layer.live().get(1, Attr::Rotate), Some(15));
        assert_eq!(layer.live().get(1, Attr::RelX), Some(20));
        assert_eq!(layer.live().get(0, Attr::Width), Some(1920));
    }

    #[test]
    fn test_show_reseeds_for_new_page() {
        let mut layer = Layer::default();
        layer.show(slide());
        assert_eq!(layer.live().len(), 2);
        assert_eq!(layer.live().get(1, Attr::Opacity), Some(0));
        assert_eq!(layer.live().get(1, Attr::RelX), Some(-400));
    }
}
