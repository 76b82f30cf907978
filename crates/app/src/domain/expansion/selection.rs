//! Card selection and price splitting.

use rand::{Rng, seq::SliceRandom};
use rustc_hash::FxHashSet;

use crate::domain::catalog::models::{COMPLETE_SET_SIZE, Product, ProductUuid};

/// Pick the members granted for `quantity` units of a collection.
///
/// A complete set takes the first [`COMPLETE_SET_SIZE`] members in collection
/// order. Smaller purchases draw unique members the buyer does not own yet;
/// when everything is owned, `quantity` members are drawn with replacement.
pub fn select_unique<'a, R>(
    pool: &[&'a Product],
    owned: &FxHashSet<ProductUuid>,
    quantity: u32,
    rng: &mut R,
) -> Vec<&'a Product>
where
    R: Rng + ?Sized,
{
    let wanted = usize::try_from(quantity).unwrap_or(usize::MAX);

    if wanted >= COMPLETE_SET_SIZE {
        return pool.iter().take(COMPLETE_SET_SIZE).copied().collect();
    }

    let available: Vec<&Product> = pool
        .iter()
        .filter(|product| !owned.contains(&product.uuid))
        .copied()
        .collect();

    if available.is_empty() {
        return (0..wanted)
            .filter_map(|_| pool.choose(rng).copied())
            .collect();
    }

    available
        .choose_multiple(rng, wanted.min(available.len()))
        .copied()
        .collect()
}

/// Split `total` into `parts` shares that sum back to `total` exactly.
///
/// Shares differ by at most one minor unit; the leading shares carry the
/// remainder.
#[must_use]
pub fn split_price(total: u64, parts: usize) -> Vec<u64> {
    let Ok(divisor) = u64::try_from(parts) else {
        return Vec::new();
    };

    if divisor == 0 {
        return Vec::new();
    }

    let share = total / divisor;
    let remainder = total % divisor;

    (0..divisor)
        .map(|index| if index < remainder { share + 1 } else { share })
        .collect()
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use crate::domain::catalog::models::ProductKind;

    use super::*;

    fn card(level: u32) -> Product {
        Product {
            uuid: ProductUuid::new(),
            name: format!("Card {level}"),
            kind: ProductKind::Gaming,
            level: Some(level),
            price: 100,
            image: None,
            stock: None,
        }
    }

    fn deck(size: u32) -> Vec<Product> {
        (1..=size).map(card).collect()
    }

    #[test]
    fn full_set_is_first_five_in_order() {
        let products = deck(7);
        let pool: Vec<&Product> = products.iter().collect();
        let mut rng = StdRng::seed_from_u64(7);

        for quantity in [5, 6, 12] {
            let selected = select_unique(&pool, &FxHashSet::default(), quantity, &mut rng);

            let levels: Vec<Option<u32>> = selected.iter().map(|p| p.level).collect();

            assert_eq!(levels, vec![Some(1), Some(2), Some(3), Some(4), Some(5)]);
        }
    }

    #[test]
    fn partial_purchase_draws_unique_unowned_members() {
        let products = deck(6);
        let pool: Vec<&Product> = products.iter().collect();
        let owned: FxHashSet<ProductUuid> = products.iter().take(2).map(|p| p.uuid).collect();

        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);

            let selected = select_unique(&pool, &owned, 3, &mut rng);
            let unique: FxHashSet<ProductUuid> = selected.iter().map(|p| p.uuid).collect();

            assert_eq!(selected.len(), 3);
            assert_eq!(unique.len(), 3);
            assert!(unique.is_disjoint(&owned));
        }
    }

    #[test]
    fn partial_purchase_is_capped_by_what_is_left() {
        let products = deck(4);
        let pool: Vec<&Product> = products.iter().collect();
        let owned: FxHashSet<ProductUuid> = products.iter().take(3).map(|p| p.uuid).collect();
        let mut rng = StdRng::seed_from_u64(1);

        let selected = select_unique(&pool, &owned, 4, &mut rng);

        assert_eq!(selected.len(), 1);
        assert_eq!(selected.first().map(|p| p.uuid), products.get(3).map(|p| p.uuid));
    }

    #[test]
    fn fully_owned_collection_draws_with_replacement() {
        let products = deck(2);
        let pool: Vec<&Product> = products.iter().collect();
        let owned: FxHashSet<ProductUuid> = products.iter().map(|p| p.uuid).collect();
        let mut rng = StdRng::seed_from_u64(3);

        let selected = select_unique(&pool, &owned, 4, &mut rng);

        assert_eq!(selected.len(), 4);
        assert!(selected.iter().all(|p| owned.contains(&p.uuid)));
    }

    #[test]
    fn empty_pool_selects_nothing() {
        let mut rng = StdRng::seed_from_u64(0);

        assert!(select_unique(&[], &FxHashSet::default(), 2, &mut rng).is_empty());
    }

    #[test]
    fn split_shares_sum_to_total() {
        assert_eq!(split_price(200, 2), vec![100, 100]);
        assert_eq!(split_price(1000, 3), vec![334, 333, 333]);
        assert_eq!(split_price(2, 5), vec![1, 1, 0, 0, 0]);
        assert!(split_price(100, 0).is_empty());

        for parts in 1..=5 {
            assert_eq!(split_price(999, parts).iter().sum::<u64>(), 999);
        }
    }
}
