use std::ops::Range;

use crate::prelude::*;

use super::trainer::Slicing;

/// Splits `0..total` into one contiguous range per worker.
///
/// Every range is `total / workers` long. With [`Slicing::Truncate`] the
/// remainder past `workers * slice` is left out, with [`Slicing::Inclusive`]
/// it is appended to the last range.
pub fn partition(total: usize, workers: usize, slicing: Slicing) -> Result<Vec<Range<usize>>> {
    if workers == 0 {
        return Err(Error::ConfigErr("at least one worker is required".to_string()));
    }

    let slice = total / workers;
    let mut ranges: Vec<_> = (0..workers).map(|k| k * slice..(k + 1) * slice).collect();

    if slicing == Slicing::Inclusive {
        if let Some(last) = ranges.last_mut() {
            last.end = total;
        }
    }
    Ok(ranges)
}
