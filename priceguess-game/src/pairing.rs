//! Sampling product pairs whose prices differ.
use rand::Rng;

use crate::catalog::Product;
use crate::constants::PAIR_RETRIES_PER_PRODUCT;
use crate::error::GameError;
use crate::selector::{RecencyWindow, select_index};

/// Pick an index other than `exclude`, preferring indices outside `recent`.
fn select_other<R>(
    len: usize,
    exclude: usize,
    recent: &mut RecencyWindow,
    rng: &mut R,
) -> Option<usize>
where
    R: Rng + ?Sized,
{
    let fresh = (0..len)
        .filter(|index| *index != exclude && !recent.contains(*index))
        .collect::<Vec<_>>();
    let candidates = if fresh.is_empty() {
        recent.clear();
        (0..len).filter(|index| *index != exclude).collect::<Vec<_>>()
    } else {
        fresh
    };
    if candidates.is_empty() {
        return None;
    }
    let picked = candidates[rng.gen_range(0..candidates.len())];
    recent.push(picked);
    Some(picked)
}

fn first_distinct_pair(products: &[Product]) -> Option<(usize, usize)> {
    products.iter().enumerate().find_map(|(i, left)| {
        products
            .iter()
            .enumerate()
            .skip(i + 1)
            .find(|(_, right)| right.price != left.price)
            .map(|(j, _)| (i, j))
    })
}

/// Two distinct indices into `products` with different prices.
///
/// Draws go through the recency window first. After `2 * len` tied draws the
/// first differing pair in catalog order is used instead.
///
/// # Errors
///
/// Returns `EmptyCatalog` for an empty slice and `NoDistinctPrices` when
/// every product shares one price.
pub fn sample_distinct_pair<R>(
    products: &[Product],
    recent: &mut RecencyWindow,
    rng: &mut R,
) -> Result<(usize, usize), GameError>
where
    R: Rng + ?Sized,
{
    let len = products.len();
    if len == 0 {
        return Err(GameError::EmptyCatalog);
    }
    let retries = len.saturating_mul(PAIR_RETRIES_PER_PRODUCT);
    for _ in 0..=retries {
        let first = select_index(len, recent, rng)?;
        let Some(second) = select_other(len, first, recent, rng) else {
            break;
        };
        if products[first].price != products[second].price {
            return Ok((first, second));
        }
    }
    log::debug!("pair sampling exhausted {retries} retries; scanning catalog");
    first_distinct_pair(products).ok_or(GameError::NoDistinctPrices)
}

/// An index that differs from `anchor` in both position and price.
///
/// # Errors
///
/// Returns `EmptyCatalog` for an empty slice and `NoDistinctPrices` when no
/// product is priced differently from the anchor.
pub fn sample_distinct_from<R>(
    products: &[Product],
    anchor: usize,
    recent: &mut RecencyWindow,
    rng: &mut R,
) -> Result<usize, GameError>
where
    R: Rng + ?Sized,
{
    let len = products.len();
    let Some(anchor_product) = products.get(anchor) else {
        return Err(GameError::EmptyCatalog);
    };
    let retries = len.saturating_mul(PAIR_RETRIES_PER_PRODUCT);
    for _ in 0..=retries {
        let Some(candidate) = select_other(len, anchor, recent, rng) else {
            break;
        };
        if products[candidate].price != anchor_product.price {
            return Ok(candidate);
        }
    }
    log::debug!("no sampled match for anchor {anchor}; scanning catalog");
    products
        .iter()
        .position(|product| product.price != anchor_product.price)
        .ok_or(GameError::NoDistinctPrices)
}
