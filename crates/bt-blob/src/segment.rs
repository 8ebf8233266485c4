use crate::object::Segment;

/// `mask[i] = blurred[i] < threshold`: dark samples are "on".
pub fn threshold_mask(blurred: &[f32], threshold: f32, mask: &mut Vec<bool>) {
    mask.clear();
    mask.extend(blurred.iter().map(|&v| v < threshold));
}

/// Append the maximal "on" runs of `mask` as segments of `column`.
///
/// `mask[i]` describes image row `top_row + i`.
pub fn segments_from_mask(column: usize, top_row: usize, mask: &[bool], out: &mut Vec<Segment>) {
    let mut start: Option<usize> = None;
    for (i, &on) in mask.iter().enumerate() {
        match (on, start) {
            (true, None) => start = Some(i),
            (false, Some(s)) => {
                out.push(Segment::new(column, top_row + s, top_row + i - 1));
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        out.push(Segment::new(column, top_row + s, top_row + mask.len() - 1));
    }
}

/// Threshold `blurred` and extract its segments in one go.
pub fn column_segments(
    column: usize,
    top_row: usize,
    blurred: &[f32],
    threshold: f32,
) -> Vec<Segment> {
    let mut mask = Vec::with_capacity(blurred.len());
    threshold_mask(blurred, threshold, &mut mask);
    let mut out = Vec::new();
    segments_from_mask(column, top_row, &mask, &mut out);
    out
}
