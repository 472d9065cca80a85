//! hmtx and hhea tables

use std::collections::HashMap;

use font_types::{FWord, UfWord};
use read_fonts::{FontRef, TableProvider};
use write_fonts::{
    from_obj::ToOwnedTable,
    tables::{
        hhea::Hhea,
        hmtx::{Hmtx, LongMetric},
    },
};

use crate::{
    Result,
    font::Metric,
    glyph_order::{GlyphName, GlyphOrder},
    outline::Outline,
};

/// Read the advance width and left side bearing of every glyph
pub(crate) fn read_metrics(
    font: &FontRef,
    order: &GlyphOrder,
) -> Result<HashMap<GlyphName, Metric>> {
    let hhea = font.hhea()?;
    let hmtx = font.hmtx()?;
    let num_h_metrics = hhea.number_of_h_metrics() as usize;
    let long_metrics = hmtx.h_metrics();
    let last_advance = num_h_metrics
        .checked_sub(1)
        .and_then(|last| long_metrics.get(last))
        .map(|lm| lm.advance.get())
        .unwrap_or(0);

    let metrics = order
        .iter()
        .enumerate()
        .map(|(gid, name)| {
            let metric = match long_metrics.get(gid).filter(|_| gid < num_h_metrics) {
                Some(lm) => Metric::new(lm.advance.get(), lm.side_bearing.get()),
                None => {
                    // Glyphs past numberOfHMetrics repeat the last advance
                    let lsb = hmtx
                        .left_side_bearings()
                        .get(gid.saturating_sub(num_h_metrics))
                        .map(|b| b.get())
                        .unwrap_or(0);
                    Metric::new(last_advance, lsb)
                }
            };
            (name.clone(), metric)
        })
        .collect();

    Ok(metrics)
}

/// Build hmtx with one long metric per glyph
pub(crate) fn build_hmtx(order: &GlyphOrder, metrics: &HashMap<GlyphName, Metric>) -> Hmtx {
    let h_metrics = order
        .iter()
        .map(|name| {
            let metric = metrics.get(name).copied().unwrap_or_default();
            LongMetric { advance: metric.advance, side_bearing: metric.lsb }
        })
        .collect();

    Hmtx { h_metrics, left_side_bearings: Vec::new() }
}

/// Rebuild hhea from the source table with recomputed extremes
pub(crate) fn build_hhea(
    font: &FontRef,
    order: &GlyphOrder,
    metrics: &HashMap<GlyphName, Metric>,
    outlines: &HashMap<GlyphName, Outline>,
) -> Result<Hhea> {
    let mut hhea: Hhea = font.hhea()?.to_owned_table();

    let mut advance_width_max = 0u16;
    let mut min_lsb: Option<i16> = None;
    let mut min_rsb: Option<i16> = None;
    let mut x_max_extent: Option<i16> = None;

    for name in order.iter() {
        let metric = metrics.get(name).copied().unwrap_or_default();
        advance_width_max = advance_width_max.max(metric.advance);

        let Some(bbox) = outlines.get(name).and_then(Outline::bounds) else {
            continue;
        };
        let extent = metric.lsb as i32 + (bbox.x_max as i32 - bbox.x_min as i32);
        let rsb = metric.advance as i32 - extent;

        min_lsb = Some(min_lsb.map_or(metric.lsb, |v| v.min(metric.lsb)));
        min_rsb = Some(min_rsb.map_or(clamp_i16(rsb), |v| v.min(clamp_i16(rsb))));
        x_max_extent = Some(x_max_extent.map_or(clamp_i16(extent), |v| v.max(clamp_i16(extent))));
    }

    hhea.advance_width_max = UfWord::new(advance_width_max);
    hhea.min_left_side_bearing = FWord::new(min_lsb.unwrap_or(0));
    hhea.min_right_side_bearing = FWord::new(min_rsb.unwrap_or(0));
    hhea.x_max_extent = FWord::new(x_max_extent.unwrap_or(0));
    hhea.number_of_h_metrics = order.len() as u16;

    Ok(hhea)
}

fn clamp_i16(value: i32) -> i16 {
    value.clamp(i16::MIN as i32, i16::MAX as i32) as i16
}
