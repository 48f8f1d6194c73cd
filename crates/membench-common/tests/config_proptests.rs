//! Property-based tests for `membench-common` configuration.
//!
//! Covers:
//! - footprint accounting against a direct byte count
//! - `normalize` always leaves at least two repetitions
//! - validation of indexed configurations

use membench_common::{BenchConfig, ElementType, IndexedKernels, DEFAULT_NTIMES, INDEX_BYTES};
use proptest::prelude::*;

fn element_type() -> impl Strategy<Value = ElementType> {
    prop_oneof![Just(ElementType::F32), Just(ElementType::F64)]
}

fn kernels() -> impl Strategy<Value = IndexedKernels> {
    (any::<bool>(), any::<bool>(), any::<bool>())
        .prop_map(|(gather, scatter, indirect_dot)| IndexedKernels { gather, scatter, indirect_dot })
}

proptest! {
    #[test]
    fn prop_footprint_matches_direct_count(
        n in 1usize..10_000_000,
        ni in 1usize..10_000_000,
        offset in 0usize..64,
        ty in element_type(),
        kernels in kernels(),
    ) {
        let config = BenchConfig {
            array_size: n,
            index_array_size: ni,
            offset,
            element_type: ty,
            kernels,
            ..Default::default()
        };
        let elem = ty.size_bytes();
        let mut expected = 3 * (n + offset) * elem;
        if kernels.any() {
            expected += (ni + offset) * (elem + INDEX_BYTES);
        }
        if kernels.indirect_dot {
            expected += ni.div_ceil(membench_common::DOT_CHUNK) * elem;
        }
        if kernels.scatter {
            expected += (n + offset) * elem;
        }
        prop_assert_eq!(config.footprint_bytes(), Some(expected));
    }

    #[test]
    fn prop_normalize_leaves_two_repetitions(ntimes in 0usize..50) {
        let mut config = BenchConfig { ntimes, ..Default::default() };
        let notes = config.normalize();
        prop_assert!(config.ntimes >= 2);
        if ntimes <= 1 {
            prop_assert_eq!(config.ntimes, DEFAULT_NTIMES);
            prop_assert_eq!(notes.len(), 1);
        } else {
            prop_assert_eq!(config.ntimes, ntimes);
            prop_assert!(notes.is_empty());
        }
    }

    #[test]
    fn prop_indexed_configs_need_index_array(n in 1usize..1_000_000, kernels in kernels()) {
        let config = BenchConfig { array_size: n, index_array_size: 0, kernels, ..Default::default() };
        prop_assert_eq!(config.validate().is_ok(), !kernels.any());
    }

    #[test]
    fn prop_toml_round_trip(
        n in 1usize..1_000_000,
        offset in 0usize..100,
        ty in element_type(),
        seed in proptest::option::of(0u64..i64::MAX as u64),
    ) {
        let config = BenchConfig { array_size: n, offset, element_type: ty, seed, ..Default::default() };
        let parsed: BenchConfig = toml::from_str(&config.to_toml().unwrap()).unwrap();
        prop_assert_eq!(parsed, config);
    }
}
