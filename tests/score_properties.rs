use proptest::prelude::*;
use repository_usage::core::types::ItemId;
use repository_usage::model::{AttractivityBounds, EngagementFunnel, Item, ScoreWeights};
use repository_usage::simulation::cycle::rank_items;

const BOUNDS: AttractivityBounds = AttractivityBounds { floor: 0.05, cap: 0.95 };

prop_compose! {
    fn arb_weights()(
        view in 0.0f64..100.0,
        download in 0.0f64..100.0,
        rate in 0.0f64..100.0,
        like in 0.1f64..100.0
    ) -> ScoreWeights {
        ScoreWeights { view, download, rate, like }
    }
}

prop_compose! {
    fn arb_item(id: u32)(
        views in 0u64..10_000,
        downloads in 0u64..10_000,
        rates in 0u64..10_000,
        likes in 0u64..10_000,
        intrinsic in 0.1f64..0.9
    ) -> Item {
        let mut item = Item::new(ItemId(id), intrinsic, BOUNDS);
        item.views = views;
        item.downloads = downloads;
        item.rates = rates;
        item.likes = likes;
        item
    }
}

fn arb_items() -> impl Strategy<Value = Vec<Item>> {
    prop::collection::vec(arb_item(0), 1..30).prop_map(|mut items| {
        for (i, item) in items.iter_mut().enumerate() {
            item.id = ItemId(i as u32);
        }
        items
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn score_is_convex_combination(item in arb_item(0), weights in arb_weights()) {
        let score = item.compute_score(&weights);
        let counters = [item.views, item.downloads, item.rates, item.likes];
        let min = *counters.iter().min().unwrap() as f64;
        let max = *counters.iter().max().unwrap() as f64;
        prop_assert!(score >= min - 1e-9);
        prop_assert!(score <= max + 1e-9);
    }

    #[test]
    fn ranking_is_sorted_and_repeatable(items in arb_items(), weights in arb_weights()) {
        let ranking = rank_items(&items, &weights);
        prop_assert_eq!(ranking.len(), items.len());
        for pair in ranking.windows(2) {
            prop_assert!(pair[0].score >= pair[1].score);
            if pair[0].score == pair[1].score {
                prop_assert!(pair[0].id < pair[1].id);
            }
        }
        prop_assert_eq!(rank_items(&items, &weights), ranking);
    }

    #[test]
    fn attractivity_clamped_for_any_bonus(
        intrinsic in 0.1f64..0.9,
        main_page in -1.0f64..1.0,
        social in -1.0f64..1.0,
        refactored in -1.0f64..1.0
    ) {
        let mut item = Item::new(ItemId(0), intrinsic, BOUNDS);
        item.main_page_bonus = main_page;
        item.social_network_bonus = social;
        item.refactored_bonus = refactored;
        let attractivity = item.recompute_attractivity(BOUNDS);
        prop_assert!(BOUNDS.contains(attractivity));
    }

    #[test]
    fn gate_threshold_is_a_probability(base in 0.0f64..=1.0, attractivity in 0.05f64..0.95) {
        let threshold = EngagementFunnel::threshold(base, attractivity);
        prop_assert!((0.0..=1.0).contains(&threshold));
        prop_assert!(threshold >= base - 1e-12);
    }
}
