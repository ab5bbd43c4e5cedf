//! Line rasterization
//!
//! Lines are drawn as bands of constant thickness along the secondary axis of the
//! line. Every pixel written here must stay inside of [`Line::affected_area`], the
//! scheduler relies on it to run commands concurrently.
use crate::{
    geometry::{thickness_offsets, SkewedLine},
    utils::saturate_i32,
    DrawingMut, Gradient, Line, LineKind, Rect,
};

/// Draw line on the drawing using gradient (or plain color) as a color source
///
/// Only the part of the line intersecting drawing bounds is rendered, lines with
/// non-positive thickness or without any marks in the gradient do not draw anything.
pub fn draw_line<D>(drawing: &mut D, line: Line, gradient: &Gradient)
where
    D: DrawingMut + ?Sized,
{
    if line.thickness <= 0 || gradient.is_empty() {
        return;
    }
    let bounds = drawing.bounds();
    if !line.affected_area().intersects(bounds) {
        return;
    }
    let skewed = line.skewed();
    match line.kind() {
        // horizontal and vertical lines only differ by the primary axis
        LineKind::Horizontal | LineKind::Vertical => {
            draw_straight(drawing, skewed, gradient, bounds)
        }
        LineKind::Diagonal => draw_diagonal(drawing, skewed, gradient, bounds),
    }
}

/// Inclusive `(min, max)` range of the rectangle along `x` or `y` axis
fn axis_range(rect: Rect, is_x: bool) -> (i32, i32) {
    if is_x {
        (rect.min().x(), rect.max().x().saturating_sub(1))
    } else {
        (rect.min().y(), rect.max().y().saturating_sub(1))
    }
}

/// Fill axis aligned band of the horizontal or vertical line
fn draw_straight<D>(drawing: &mut D, skewed: SkewedLine, gradient: &Gradient, bounds: Rect)
where
    D: DrawingMut + ?Sized,
{
    let (primary_min, primary_max) = axis_range(bounds, skewed.is_skewed_x);
    let (secondary_min, secondary_max) = axis_range(bounds, !skewed.is_skewed_x);

    // cut off parts outside of the drawing
    let start = skewed.primary_start.max(primary_min);
    let end = skewed.primary_end.min(primary_max);
    let (start_offset, end_offset) = thickness_offsets(skewed.thickness);
    let band_start = skewed
        .secondary_start
        .saturating_add(start_offset)
        .max(secondary_min);
    let band_end = skewed
        .secondary_start
        .saturating_add(end_offset)
        .min(secondary_max);
    if start > end || band_start > band_end {
        return;
    }

    match gradient.to_plain_color() {
        Some(color) => drawing.fill_rect(
            Rect::from_pixels(
                skewed.to_point(start, band_start),
                skewed.to_point(end, band_end),
            ),
            color,
        ),
        None => {
            for primary in start..=end {
                let color = gradient.mark_at(start, end, primary).color;
                drawing.fill_rect(
                    Rect::from_pixels(
                        skewed.to_point(primary, band_start),
                        skewed.to_point(primary, band_end),
                    ),
                    color,
                );
            }
        }
    }
}

/// Walk diagonal line along its primary axis filling secondary axis band at each step
fn draw_diagonal<D>(drawing: &mut D, skewed: SkewedLine, gradient: &Gradient, bounds: Rect)
where
    D: DrawingMut + ?Sized,
{
    let (primary_min, primary_max) = axis_range(bounds, skewed.is_skewed_x);
    let (secondary_min, secondary_max) = axis_range(bounds, !skewed.is_skewed_x);

    let start = skewed.primary_start.max(primary_min);
    let end = skewed.primary_end.min(primary_max);
    if start > end {
        return;
    }
    let (start_offset, end_offset) = thickness_offsets(skewed.thickness);
    let plain = gradient.to_plain_color();

    // Gradient follows `primary + secondary` (or `primary - secondary` when the
    // secondary axis decreases), which grows monotonically along the line.
    let step = skewed.secondary_step() as i64;
    let band_low = (step * start_offset as i64).min(step * end_offset as i64);
    let band_high = (step * start_offset as i64).max(step * end_offset as i64);
    let progress_start = saturate_i32(
        skewed.primary_start as i64 + step * skewed.secondary_start as i64 + band_low,
    );
    let progress_end =
        saturate_i32(skewed.primary_end as i64 + step * skewed.secondary_end as i64 + band_high);

    for primary in start..=end {
        let middle = skewed.secondary_at(primary);
        let band_start = middle.saturating_add(start_offset).max(secondary_min);
        let band_end = middle.saturating_add(end_offset).min(secondary_max);
        for secondary in band_start..=band_end {
            let color = match plain {
                Some(color) => color,
                None => {
                    let progress = saturate_i32(primary as i64 + step * secondary as i64);
                    gradient
                        .mark_at(progress_start, progress_end, progress)
                        .color
                }
            };
            drawing.set_pixel(skewed.to_point(primary, secondary), color);
        }
    }
}
