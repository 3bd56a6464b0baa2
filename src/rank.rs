use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

/// The arithmetic a rank value needs. `Default::default()` is treated as zero.
///
/// This is implemented for every type with the right operators so `i32`, `i64`, `f64`, etc. all
/// work out of the box.
pub trait Rank:
    Copy
    + Default
    + Add<Output = Self>
    + Sub<Output = Self>
    + Neg<Output = Self>
    + AddAssign
    + SubAssign
{
}

impl<T> Rank for T where
    T: Copy
        + Default
        + Add<Output = T>
        + Sub<Output = T>
        + Neg<Output = T>
        + AddAssign
        + SubAssign
{
}
