use shelfscan::OcrResult;

/// Axis-aligned 4-point polygon centered on (cx, cy).
pub fn box_at(cx: f32, cy: f32, half_w: f32, half_h: f32) -> Vec<(f32, f32)> {
    vec![
        (cx - half_w, cy - half_h),
        (cx + half_w, cy - half_h),
        (cx + half_w, cy + half_h),
        (cx - half_w, cy + half_h),
    ]
}

/// Recognizer output for a fragment centered on (cx, cy).
pub fn fragment(text: &str, cx: f32, cy: f32, confidence: f32) -> OcrResult {
    OcrResult::new(text, box_at(cx, cy, 6.0, 18.0), confidence)
}

/// Deterministic pseudo-random fragments spread over a `width` x `height` photo.
///
/// Confidences range over [0, 1) so roughly 40% fall below the default filter.
pub fn scattered_fragments(seed: u64, count: usize, width: f32, height: f32) -> Vec<OcrResult> {
    let mut state = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
    let mut next = move || {
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        ((state >> 33) as f32) / ((1u64 << 31) as f32)
    };

    (0..count)
        .map(|i| {
            let cx = next() * width;
            let cy = next() * height;
            let confidence = next();
            fragment(&format!("frag-{i}"), cx, cy, confidence)
        })
        .collect()
}
