//! Shared numeric helpers.

mod matrix;

pub use matrix::{
    detect_constant_columns, invert_square, mean_and_sd, solve_least_squares, with_intercept,
};
