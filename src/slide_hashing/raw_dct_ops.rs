use ndarray::{prelude::*, s};
use rustdct::DctPlanner;

/// Unnormalized two dimensional DCT-II of a square matrix. Only the relative
/// magnitudes of the coefficients are used for hashing, so no scaling is applied.
pub fn dct_2d(matrix: &Array2<f64>) -> Array2<f64> {
    //first check that the supplied matrix is square
    assert!(matrix.is_square());
    let (x_len, _y_len) = matrix.dim();

    //setup the DCT.....
    let mut planner = DctPlanner::new();
    let dct = planner.plan_dct2(x_len);

    //rustdct requires contiguous rows.
    let mut matrix = matrix.as_standard_layout().into_owned();

    //perform round 1 of the DCT (on rows):
    matrix.rows_mut().into_iter().for_each(|mut row| {
        dct.process_dct2(row.as_slice_mut().expect("unreachable"));
    });

    //now tranpose...
    matrix = transpose_2d(matrix);

    //perform round 2 of the DCT (on cols):
    matrix.rows_mut().into_iter().for_each(|mut row| {
        dct.process_dct2(row.as_slice_mut().expect("unreachable"));
    });

    //now tranpose back.
    transpose_2d(matrix)
}

//ndarray's transposition only swaps strides, but rustdct needs the data itself
//shuffled in memory.
fn transpose_2d(matrix: Array2<f64>) -> Array2<f64> {
    matrix.reversed_axes().as_standard_layout().into_owned()
}

/// The `size x size` block of lowest frequencies (top-left corner).
pub fn lowfreq_block(matrix: &Array2<f64>, size: usize) -> ArrayView2<'_, f64> {
    matrix.slice(s![..size, ..size])
}

/// Median as numpy computes it: the mean of the two middle values for even lengths.
pub fn median(values: impl IntoIterator<Item = f64>) -> f64 {
    let mut values = values.into_iter().collect::<Vec<_>>();
    values.sort_by(f64::total_cmp);

    match values.len() {
        0 => 0.0,
        len if len % 2 == 1 => values[len / 2],
        len => (values[len / 2 - 1] + values[len / 2]) / 2.0,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_constant_matrix_has_only_dc_energy() {
        let matrix = Array2::from_elem((8, 8), 10.0);
        let dct = dct_2d(&matrix);

        assert!(dct[[0, 0]] > 0.0);
        for ((y, x), val) in dct.indexed_iter() {
            if (y, x) != (0, 0) {
                assert!(val.abs() < 1e-9, "bin ({y}, {x}) = {val}");
            }
        }
    }

    #[test]
    fn test_horizontal_ramp_only_has_horizontal_frequencies() {
        let matrix = Array2::from_shape_fn((8, 8), |(_y, x)| x as f64);
        let dct = dct_2d(&matrix);

        //nothing changes from row to row, so every row below the first is empty.
        for y in 1..8 {
            for x in 0..8 {
                assert!(dct[[y, x]].abs() < 1e-9);
            }
        }
        //and a ramp is dominated by the first cosine.
        assert!(dct[[0, 1]].abs() > 1.0);
    }

    #[test]
    fn test_lowfreq_block_is_top_left() {
        let matrix = Array2::from_shape_fn((4, 4), |(y, x)| (y * 4 + x) as f64);
        let block = lowfreq_block(&matrix, 2);
        assert_eq!(block.iter().copied().collect::<Vec<_>>(), vec![0.0, 1.0, 4.0, 5.0]);
    }

    #[test]
    fn test_median() {
        assert_eq!(median([3.0, 1.0, 2.0]), 2.0);
        assert_eq!(median([4.0, 1.0, 3.0, 2.0]), 2.5);
        assert_eq!(median(std::iter::empty()), 0.0);
    }
}
