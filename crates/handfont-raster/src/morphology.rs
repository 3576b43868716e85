//! Binary morphology with rectangular structuring elements.

use handfont_core::BinaryMask;

#[derive(Clone, Copy)]
enum Op {
    Dilate,
    Erode,
}

/// Close (dilate, then erode) with a `size x size` rectangle, `iterations`
/// times each.
///
/// The element's anchor is `size / 2`. Erosion uses the reflected element,
/// so even sizes do not shift strokes. Outside the image, dilation sees
/// background and erosion ignores the missing samples.
pub fn close_rect(mask: &BinaryMask, size: u32, iterations: u32) -> BinaryMask {
    if size <= 1 || iterations == 0 || mask.is_empty() {
        return mask.clone();
    }
    let (w, h) = (mask.width() as usize, mask.height() as usize);
    let mut data: Vec<bool> = mask.as_raw().iter().map(|&v| v != 0).collect();
    for _ in 0..iterations {
        data = apply(&data, w, h, size as usize, Op::Dilate);
    }
    for _ in 0..iterations {
        data = apply(&data, w, h, size as usize, Op::Erode);
    }
    BinaryMask::from_fn(mask.width(), mask.height(), |x, y| {
        data[y as usize * w + x as usize]
    })
}

/// A rectangle is separable: sweep rows, then columns.
fn apply(data: &[bool], w: usize, h: usize, size: usize, op: Op) -> Vec<bool> {
    let rows = sweep(data, w, h, size, op, true);
    sweep(&rows, w, h, size, op, false)
}

fn sweep(data: &[bool], w: usize, h: usize, size: usize, op: Op, horizontal: bool) -> Vec<bool> {
    let anchor = (size / 2) as isize;
    // Window of source offsets relative to the destination pixel.
    let (lo, hi) = match op {
        Op::Dilate => (-(size as isize - 1 - anchor), anchor),
        Op::Erode => (-anchor, size as isize - 1 - anchor),
    };
    let (len, lines) = if horizontal { (w, h) } else { (h, w) };
    let at = |line: usize, i: usize| {
        if horizontal {
            line * w + i
        } else {
            i * w + line
        }
    };

    let mut out = vec![false; data.len()];
    for line in 0..lines {
        for i in 0..len {
            let start = (i as isize + lo).max(0) as usize;
            let end = ((i as isize + hi).min(len as isize - 1)) as usize;
            let mut window = (start..=end).map(|j| data[at(line, j)]);
            out[at(line, i)] = match op {
                Op::Dilate => window.any(|v| v),
                Op::Erode => window.all(|v| v),
            };
        }
    }
    out
}
