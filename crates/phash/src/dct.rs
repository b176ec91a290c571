//! Discrete cosine transform over the downscaled luma plane.

use std::sync::OnceLock;

/// Side length of the downscaled luma plane fed into the DCT.
pub(crate) const PLANE_SIZE: usize = 32;

/// Cosine basis table for a DCT-II of length [`PLANE_SIZE`].
///
/// `table[k][n] = cos(PI * (2n + 1) * k / (2 * PLANE_SIZE))`
fn basis_table() -> &'static [[f64; PLANE_SIZE]; PLANE_SIZE] {
    static TABLE: OnceLock<[[f64; PLANE_SIZE]; PLANE_SIZE]> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut table = [[0.0f64; PLANE_SIZE]; PLANE_SIZE];
        for (k, row) in table.iter_mut().enumerate() {
            for (n, value) in row.iter_mut().enumerate() {
                *value = (std::f64::consts::PI * (2 * n + 1) as f64 * k as f64
                    / (2.0 * PLANE_SIZE as f64))
                    .cos();
            }
        }
        table
    })
}

/// One-dimensional DCT-II of a [`PLANE_SIZE`]-length signal.
///
/// Uniform scale factors are omitted: the caller only compares
/// coefficients against each other, so a global scale is irrelevant.
fn dct_1d(input: &[f64; PLANE_SIZE]) -> [f64; PLANE_SIZE] {
    let table = basis_table();
    let mut output = [0.0f64; PLANE_SIZE];
    for (k, out) in output.iter_mut().enumerate() {
        let mut acc = 0.0f64;
        for (n, x) in input.iter().enumerate() {
            acc += x * table[k][n];
        }
        *out = acc;
    }
    output
}

/// Two-dimensional DCT-II (rows, then columns) of a
/// [`PLANE_SIZE`] x [`PLANE_SIZE`] luma plane in row-major order.
pub(crate) fn dct_2d(plane: &[f64]) -> Vec<f64> {
    debug_assert_eq!(plane.len(), PLANE_SIZE * PLANE_SIZE);

    let mut rows = vec![0.0f64; PLANE_SIZE * PLANE_SIZE];
    let mut buf = [0.0f64; PLANE_SIZE];

    for y in 0..PLANE_SIZE {
        buf.copy_from_slice(&plane[y * PLANE_SIZE..(y + 1) * PLANE_SIZE]);
        let transformed = dct_1d(&buf);
        rows[y * PLANE_SIZE..(y + 1) * PLANE_SIZE].copy_from_slice(&transformed);
    }

    let mut out = vec![0.0f64; PLANE_SIZE * PLANE_SIZE];
    for x in 0..PLANE_SIZE {
        for (y, value) in buf.iter_mut().enumerate() {
            *value = rows[y * PLANE_SIZE + x];
        }
        let transformed = dct_1d(&buf);
        for y in 0..PLANE_SIZE {
            out[y * PLANE_SIZE + x] = transformed[y];
        }
    }

    out
}
