//! Editable glyph outlines
//!
//! Outlines are held in an owned, mutable form so the importer and the
//! centering passes can scale and translate them in place. Every
//! geometry-mutating method starts with [`SimpleOutline::ensure_bounds`] and
//! leaves the cached bounding box recomputed.

use kurbo::{Affine, Point};
use read_fonts::tables::glyf::CurvePoint;
use write_fonts::tables::glyf::{Anchor, Bbox, ComponentFlags, Contour, SimpleGlyph, Transform};

use crate::glyph_order::GlyphName;

/// A glyph outline
#[derive(Debug, Clone)]
pub enum Outline {
    /// No geometry (e.g. space)
    Empty,
    Simple(SimpleOutline),
    Composite(CompositeOutline),
}

impl Outline {
    /// Number of contours; composites carry none of their own
    pub fn contour_count(&self) -> usize {
        match self {
            Outline::Simple(simple) => simple.contours.len(),
            Outline::Empty | Outline::Composite(_) => 0,
        }
    }

    pub fn has_contours(&self) -> bool {
        self.contour_count() > 0
    }

    /// The simple outline, if this glyph has at least one contour
    pub fn contours_mut(&mut self) -> Option<&mut SimpleOutline> {
        match self {
            Outline::Simple(simple) if !simple.contours.is_empty() => Some(simple),
            _ => None,
        }
    }

    /// Bounding box of the glyph, computed on the fly if not cached
    pub fn bounds(&self) -> Option<Bbox> {
        match self {
            Outline::Empty => None,
            Outline::Simple(simple) => simple.bounds.or_else(|| simple.compute_bounds()),
            Outline::Composite(composite) => Some(composite.bbox),
        }
    }
}

/// A contour-based outline with a lazily computed bounding box
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SimpleOutline {
    contours: Vec<Vec<CurvePoint>>,
    instructions: Vec<u8>,
    bounds: Option<Bbox>,
}

impl SimpleOutline {
    /// Create an outline whose bounds are computed on first use
    pub fn new(contours: Vec<Vec<CurvePoint>>) -> Self {
        Self { contours, instructions: Vec::new(), bounds: None }
    }

    /// Create an outline with bounds and hinting as stored in a font
    pub fn from_parts(contours: Vec<Vec<CurvePoint>>, instructions: Vec<u8>, bounds: Bbox) -> Self {
        Self { contours, instructions, bounds: Some(bounds) }
    }

    /// A closed rectangle, mostly useful for building test fonts
    pub fn rect(x_min: i16, y_min: i16, x_max: i16, y_max: i16) -> Self {
        Self::new(vec![vec![
            CurvePoint::on_curve(x_min, y_min),
            CurvePoint::on_curve(x_min, y_max),
            CurvePoint::on_curve(x_max, y_max),
            CurvePoint::on_curve(x_max, y_min),
        ]])
    }

    pub fn contours(&self) -> &[Vec<CurvePoint>] {
        &self.contours
    }

    pub fn point_count(&self) -> usize {
        self.contours.iter().map(Vec::len).sum()
    }

    pub fn instructions(&self) -> &[u8] {
        &self.instructions
    }

    pub fn clear_instructions(&mut self) {
        self.instructions.clear();
    }

    /// The cached bounding box, which may not be computed yet
    pub fn bounds(&self) -> Option<Bbox> {
        self.bounds
    }

    /// Return the bounding box, computing it if it is not cached
    pub fn ensure_bounds(&mut self) -> Option<Bbox> {
        if self.bounds.is_none() {
            self.recalc_bounds();
        }
        self.bounds
    }

    /// Recompute the bounding box from the control points
    pub fn recalc_bounds(&mut self) -> Option<Bbox> {
        self.bounds = self.compute_bounds();
        self.bounds
    }

    fn compute_bounds(&self) -> Option<Bbox> {
        let mut points = self.contours.iter().flatten();
        points.next().map(|first| {
            points.fold(
                Bbox { x_min: first.x, y_min: first.y, x_max: first.x, y_max: first.y },
                |bbox, p| Bbox {
                    x_min: bbox.x_min.min(p.x),
                    y_min: bbox.y_min.min(p.y),
                    x_max: bbox.x_max.max(p.x),
                    y_max: bbox.y_max.max(p.y),
                },
            )
        })
    }

    /// Scale every coordinate uniformly about the origin
    pub fn scale(&mut self, factor: f64) {
        self.transform(Affine::scale(factor));
    }

    /// Move every point by `(dx, dy)`
    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.transform(Affine::translate((dx, dy)));
    }

    /// Apply an affine transform to every point, rounding the way
    /// OpenType compilers do
    pub fn transform(&mut self, affine: Affine) {
        self.ensure_bounds();
        for point in self.contours.iter_mut().flatten() {
            *point = transform_point(*point, affine);
        }
        self.recalc_bounds();
    }

    pub(crate) fn to_write(&self) -> SimpleGlyph {
        let mut glyph = SimpleGlyph {
            bbox: self.bounds.unwrap_or_default(),
            contours: self.contours.iter().cloned().map(Contour::from).collect(),
            instructions: self.instructions.clone(),
        };
        if self.bounds.is_none() {
            glyph.recompute_bounding_box();
        }
        glyph
    }
}

/// A glyph built from references to other glyphs
#[derive(Debug, Clone)]
pub struct CompositeOutline {
    pub bbox: Bbox,
    pub components: Vec<ComponentRef>,
}

/// One component of a composite, referencing its glyph by name
#[derive(Debug, Clone)]
pub struct ComponentRef {
    pub glyph: GlyphName,
    pub anchor: Anchor,
    pub flags: ComponentFlags,
    pub transform: Transform,
}

impl ComponentRef {
    /// The 2x2 part of the component transform as an affine map
    pub(crate) fn affine(&self) -> Affine {
        let t = &self.transform;
        Affine::new([
            t.xx.to_f32() as f64,
            t.yx.to_f32() as f64,
            t.xy.to_f32() as f64,
            t.yy.to_f32() as f64,
            0.0,
            0.0,
        ])
    }
}

pub(crate) fn transform_point(point: CurvePoint, affine: Affine) -> CurvePoint {
    let p = affine * Point::new(point.x as f64, point.y as f64);
    CurvePoint::new(ot_round(p.x), ot_round(p.y), point.on_curve)
}

/// Round half up and saturate into the i16 coordinate space
pub(crate) fn ot_round(value: f64) -> i16 {
    (value + 0.5).floor().clamp(i16::MIN as f64, i16::MAX as f64) as i16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_are_lazy() {
        let mut outline = SimpleOutline::rect(10, -20, 110, 680);
        assert_eq!(outline.bounds(), None);

        let bbox = outline.ensure_bounds().unwrap();
        assert_eq!(bbox, Bbox { x_min: 10, y_min: -20, x_max: 110, y_max: 680 });
        assert_eq!(outline.bounds(), Some(bbox));
    }

    #[test]
    fn test_scale_recomputes_bounds() {
        let mut outline = SimpleOutline::rect(0, 0, 100, 200);
        outline.scale(1.5);
        assert_eq!(outline.bounds(), Some(Bbox { x_min: 0, y_min: 0, x_max: 150, y_max: 300 }));
    }

    #[test]
    fn test_translate_rounds_half_up() {
        let mut outline = SimpleOutline::rect(0, 0, 10, 10);
        outline.translate(3.0, -2.5);
        assert_eq!(outline.bounds(), Some(Bbox { x_min: 3, y_min: -2, x_max: 13, y_max: 8 }));
    }

    #[test]
    fn test_empty_outline_has_no_bounds() {
        let mut outline = SimpleOutline::new(vec![]);
        assert_eq!(outline.ensure_bounds(), None);
        assert!(!Outline::Simple(outline).has_contours());
        assert_eq!(Outline::Empty.contour_count(), 0);
    }

    #[test]
    fn test_to_write_fills_missing_bbox() {
        let outline = SimpleOutline::rect(5, 5, 50, 60);
        let glyph = outline.to_write();
        assert_eq!(glyph.bbox, Bbox { x_min: 5, y_min: 5, x_max: 50, y_max: 60 });
        assert_eq!(glyph.contours.len(), 1);
    }
}
