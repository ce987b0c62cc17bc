//! ICU single-quote escape resolution.
//!
//! A single quote `'` toggles escaping on and off; a doubled quote `''`
//! stands for one literal quote and does not toggle. The resolver partitions
//! a parsed message string into its maximal unescaped regions; only text in
//! those regions participates in bracket matching. Ending the string while
//! still inside an escaped region is the recoverable "unbalanced escape
//! quotes" error.

use crate::error::Error;

/// A `[start, end)` byte range of the parsed string.
pub type Region = (usize, usize);

/// Splits `text` into its maximal unescaped regions, in order.
///
/// With `use_escaping` disabled (the `use-escaping: false` configuration),
/// quotes are ordinary characters and the whole string is one region.
pub fn unescaped_regions(text: &str, use_escaping: bool) -> Result<Vec<Region>, Error> {
    if !use_escaping {
        return Ok(vec![(0, text.len())]);
    }

    let bytes = text.as_bytes();
    let mut regions = Vec::new();
    // Start offset of the unescaped region currently open, if any.
    let mut edge: Option<usize> = Some(0);
    let mut index = 0;
    while index < bytes.len() {
        if bytes[index] == b'\'' {
            if index + 1 < bytes.len() && bytes[index + 1] == b'\'' {
                // Literal escaped quote; consume both.
                index += 1;
            } else {
                match edge {
                    None => {
                        // Just exiting an escaped region.
                        edge = Some(index + 1);
                    }
                    Some(start) => {
                        // Just entering an escaped region.
                        if start < index {
                            regions.push((start, index));
                        }
                        edge = None;
                    }
                }
            }
        }
        index += 1;
    }

    match edge {
        Some(start) => {
            if start < bytes.len() {
                regions.push((start, bytes.len()));
            }
            Ok(regions)
        }
        None => Err(Error::UnbalancedQuotes),
    }
}

/// True if `index` falls inside one of the (sorted, disjoint) regions.
pub fn in_regions(regions: &[Region], index: usize) -> bool {
    regions
        .iter()
        .any(|&(start, end)| start <= index && index < end)
}
