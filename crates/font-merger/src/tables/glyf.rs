//! glyf/loca conversion (TrueType outlines)
//!
//! Reading turns every glyph into an owned [`Outline`]; composite components
//! are resolved from glyph ids to glyph names so that appending glyphs to the
//! glyph order never invalidates them. Writing resolves the names back to the
//! final glyph ids.

use std::collections::HashMap;

use kurbo::Affine;
use log::{debug, warn};
use read_fonts::{
    FontRef, TableProvider,
    tables::glyf::{Anchor as ReadAnchor, CurvePoint, Glyph as ReadGlyph},
    types::{GlyphId, Tag},
};
use write_fonts::tables::{
    glyf::{Anchor, Bbox, Component, CompositeGlyph, Glyf, GlyfLocaBuilder, Glyph, Transform},
    loca::{Loca, LocaFormat},
};

use crate::{
    MergeError, Result,
    glyph_order::{GlyphName, GlyphOrder},
    outline::{ComponentRef, CompositeOutline, Outline, SimpleOutline, transform_point},
};

/// Composite nesting deeper than this is treated as malformed
const MAX_COMPONENT_DEPTH: usize = 32;

/// Outlines of a font, plus the glyphs whose data could not be decoded
pub(crate) struct ReadOutlines {
    pub outlines: HashMap<GlyphName, Outline>,
    pub undecodable: Vec<GlyphName>,
}

/// Read every decodable glyph of the font
///
/// Glyphs whose data fails to decode, or whose point data does not cover
/// their contour end points, are left out of the map and listed in
/// `undecodable`; the importer treats them as having no outline data.
pub(crate) fn read_outlines(font: &FontRef, order: &GlyphOrder) -> Result<ReadOutlines> {
    let glyf = font.glyf().map_err(|_| {
        if font.cff().is_ok() || font.cff2().is_ok() {
            MergeError::UnsupportedOutlines
        } else {
            MergeError::MissingTable(Tag::new(b"glyf"))
        }
    })?;
    let loca = font.loca(None).map_err(|_| MergeError::MissingTable(Tag::new(b"loca")))?;

    let mut outlines = HashMap::with_capacity(order.len());
    let mut undecodable = Vec::new();

    for (gid, name) in order.iter().enumerate() {
        let outline = match loca.get_glyf(GlyphId::new(gid as u32), &glyf) {
            Ok(Some(glyph)) => {
                let outline = convert_glyph(&glyph, order);
                if outline.is_none() {
                    debug!("{name}: glyph data does not match its contours");
                }
                outline
            }
            Ok(None) => Some(Outline::Empty),
            Err(e) => {
                debug!("{name}: failed to decode glyph data: {e}");
                None
            }
        };
        match outline {
            Some(outline) => {
                outlines.insert(name.clone(), outline);
            }
            None => undecodable.push(name.clone()),
        }
    }

    Ok(ReadOutlines { outlines, undecodable })
}

fn convert_glyph(glyph: &ReadGlyph, order: &GlyphOrder) -> Option<Outline> {
    match glyph {
        ReadGlyph::Simple(simple) => {
            let end_pts = simple.end_pts_of_contours();
            // Malformed flags or coordinates yield no points at all
            let points: Vec<CurvePoint> = simple.points().collect();
            let expected = end_pts.last().map_or(0, |end| end.get() as usize + 1);
            if points.len() != expected {
                return None;
            }

            let mut contours: Vec<Vec<CurvePoint>> = Vec::with_capacity(end_pts.len());
            let mut start = 0usize;
            for end_pt in end_pts {
                let end = end_pt.get() as usize + 1;
                contours.push(points.get(start..end)?.to_vec());
                start = end;
            }

            let bbox = Bbox {
                x_min: simple.x_min(),
                y_min: simple.y_min(),
                x_max: simple.x_max(),
                y_max: simple.y_max(),
            };

            Some(Outline::Simple(SimpleOutline::from_parts(
                contours,
                simple.instructions().to_vec(),
                bbox,
            )))
        }
        ReadGlyph::Composite(composite) => {
            let components = composite
                .components()
                .map(|comp| {
                    let glyph = order.get(comp.glyph.to_u32() as usize)?.clone();
                    let anchor = match comp.anchor {
                        ReadAnchor::Offset { x, y } => Anchor::Offset { x, y },
                        ReadAnchor::Point { base, component } => Anchor::Point { base, component },
                    };
                    let transform = Transform {
                        xx: comp.transform.xx,
                        yx: comp.transform.yx,
                        xy: comp.transform.xy,
                        yy: comp.transform.yy,
                    };
                    Some(ComponentRef { glyph, anchor, flags: comp.flags.into(), transform })
                })
                .collect::<Option<Vec<_>>>()?;

            if components.is_empty() {
                return Some(Outline::Empty);
            }

            let bbox = Bbox {
                x_min: composite.x_min(),
                y_min: composite.y_min(),
                x_max: composite.x_max(),
                y_max: composite.y_max(),
            };

            Some(Outline::Composite(CompositeOutline { bbox, components }))
        }
    }
}

/// Resolve a glyph into plain contours, expanding composites recursively
///
/// Returns `None` when a component is missing, nesting is too deep, or a
/// point-matched anchor refers to a point that does not exist.
pub(crate) fn flatten_outline(
    outlines: &HashMap<GlyphName, Outline>,
    name: &str,
) -> Option<SimpleOutline> {
    let mut contours = Vec::new();
    flatten_into(outlines, name, Affine::IDENTITY, 0, &mut contours)?;
    Some(SimpleOutline::new(contours))
}

fn flatten_into(
    outlines: &HashMap<GlyphName, Outline>,
    name: &str,
    affine: Affine,
    depth: usize,
    out: &mut Vec<Vec<CurvePoint>>,
) -> Option<()> {
    if depth > MAX_COMPONENT_DEPTH {
        return None;
    }

    match outlines.get(name)? {
        Outline::Empty => Some(()),
        Outline::Simple(simple) => {
            out.extend(
                simple
                    .contours()
                    .iter()
                    .map(|c| c.iter().map(|p| transform_point(*p, affine)).collect()),
            );
            Some(())
        }
        Outline::Composite(composite) => {
            let mut local: Vec<Vec<CurvePoint>> = Vec::new();

            for component in &composite.components {
                let mut resolved = Vec::new();
                flatten_into(
                    outlines,
                    &component.glyph,
                    component.affine(),
                    depth + 1,
                    &mut resolved,
                )?;

                let (dx, dy) = match component.anchor {
                    Anchor::Offset { x, y } => (x as f64, y as f64),
                    Anchor::Point { base, component } => {
                        let base_pt = *local.iter().flatten().nth(base as usize)?;
                        let comp_pt = *resolved.iter().flatten().nth(component as usize)?;
                        (
                            base_pt.x as f64 - comp_pt.x as f64,
                            base_pt.y as f64 - comp_pt.y as f64,
                        )
                    }
                };

                let offset = Affine::translate((dx, dy));
                local.extend(
                    resolved
                        .into_iter()
                        .map(|c| c.into_iter().map(|p| transform_point(p, offset)).collect()),
                );
            }

            out.extend(
                local
                    .into_iter()
                    .map(|c| c.into_iter().map(|p| transform_point(p, affine)).collect()),
            );
            Some(())
        }
    }
}

/// Build glyf and loca tables in glyph order
pub(crate) fn build_glyf(
    order: &GlyphOrder,
    outlines: &HashMap<GlyphName, Outline>,
) -> Result<(Glyf, Loca, LocaFormat)> {
    let mut builder = GlyfLocaBuilder::new();

    for name in order.iter() {
        let glyph = match outlines.get(name) {
            Some(Outline::Simple(simple)) if !simple.contours().is_empty() => {
                Glyph::Simple(simple.to_write())
            }
            Some(Outline::Composite(composite)) => {
                build_composite(name, composite, order, outlines)
            }
            _ => Glyph::Empty,
        };
        builder.add_glyph(&glyph)?;
    }

    Ok(builder.build())
}

fn build_composite(
    name: &GlyphName,
    composite: &CompositeOutline,
    order: &GlyphOrder,
    outlines: &HashMap<GlyphName, Outline>,
) -> Glyph {
    let components: Option<Vec<Component>> = composite
        .components
        .iter()
        .map(|comp| {
            let gid = order.id_of(&comp.glyph)?;
            Some(Component {
                glyph: font_types::GlyphId16::new(gid as u16),
                anchor: comp.anchor,
                flags: comp.flags,
                transform: comp.transform.clone(),
            })
        })
        .collect();

    let Some(mut components) = components.filter(|c| !c.is_empty()) else {
        warn!("{name}: composite references a glyph that is not in the font, writing it empty");
        return Glyph::Empty;
    };

    // OTS rejects composites that reference empty glyphs; kept as the base had it
    let references_empty = composite.components.iter().any(|comp| match outlines.get(&comp.glyph) {
        Some(Outline::Composite(_)) => false,
        Some(outline) => !outline.has_contours(),
        None => true,
    });
    if references_empty {
        warn!("{name}: composite references an empty glyph");
    }

    let first = components.remove(0);
    let mut glyph = CompositeGlyph::new(first, composite.bbox);
    for comp in components {
        glyph.add_component(comp, composite.bbox);
    }
    Glyph::Composite(glyph)
}
