pub mod matrix;
pub mod npy;

pub use matrix::Matrix;
