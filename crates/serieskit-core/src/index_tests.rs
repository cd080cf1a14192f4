//! Tests for `index` module

#[cfg(test)]
mod tests {
    use crate::error::Error;
    use crate::index::*;
    use crate::series::Series;
    use proptest::prelude::*;

    // =========================================================================
    // Construction
    // =========================================================================

    #[test]
    fn test_uniform_covers_whole_base() {
        let index = Index::uniform(5);
        assert_eq!(index.len(), 5);
        assert!(index.is_bijective_with_base());
        assert_eq!(index.iter().collect::<Vec<_>>(), vec![0, 1, 2, 3, 4]);
        assert_eq!(index.max(), Some(4));
    }

    #[test]
    fn test_sliced_rejects_reversed_bounds() {
        let err = Index::sliced(10, 5, 2).unwrap_err();
        assert!(matches!(err, Error::IllegalIndex(_)));
    }

    #[test]
    fn test_sliced_rejects_end_outside_base() {
        let err = Index::sliced(10, 2, 10).unwrap_err();
        assert_eq!(err, Error::IndexBounds { position: 10, base: 10 });
    }

    #[test]
    fn test_sequential_rejects_duplicates_and_out_of_range() {
        assert!(matches!(
            Index::sequential(4, vec![1, 3, 1]),
            Err(Error::IllegalIndex(_))
        ));
        assert!(matches!(
            Index::sequential(4, vec![0, 4]),
            Err(Error::IllegalIndex(_))
        ));
    }

    #[test]
    fn test_sequential_keeps_list_order() {
        // Arrange
        let index = Index::sequential(8, vec![6, 1, 3]).expect("valid");

        // Act
        let positions: Vec<_> = index.iter().collect();

        // Assert
        assert_eq!(positions, vec![6, 1, 3]);
        assert_eq!(index.max(), Some(6));
        assert_eq!(index.position_at(1), Some(1));
        assert_eq!(index.position_at(3), None);
    }

    #[test]
    fn test_unchecked_sequential_builds_membership_lazily() {
        // Arrange
        let seq = SequentialIndex::new_unchecked(6, vec![4, 2]);
        assert!(!seq.is_membership_built());

        // Act
        let covered = seq.covers(2);

        // Assert
        assert!(covered);
        assert!(!seq.covers(3));
        assert!(seq.is_membership_built());
    }

    #[test]
    fn test_membership_is_safe_under_concurrent_first_read() {
        let seq = std::sync::Arc::new(SequentialIndex::new_unchecked(1000, (0..1000).step_by(2).collect()));

        std::thread::scope(|scope| {
            for _ in 0..4 {
                let seq = std::sync::Arc::clone(&seq);
                scope.spawn(move || {
                    assert!(seq.covers(998));
                    assert!(!seq.covers(999));
                });
            }
        });
    }

    // =========================================================================
    // Containment
    // =========================================================================

    #[test]
    fn test_contains_checks_bounds() {
        let index = Index::sliced(10, 2, 5).expect("valid");

        assert!(index.contains(2).expect("in bounds"));
        assert!(!index.contains(6).expect("in bounds"));
        assert_eq!(
            index.contains(10).unwrap_err(),
            Error::IndexBounds { position: 10, base: 10 }
        );
    }

    // =========================================================================
    // Slicing
    // =========================================================================

    #[test]
    fn test_slice_range_of_uniform_is_sliced() {
        // Arrange
        let index = Index::uniform(10);

        // Act
        let sliced = index.slice_range(3..=6).expect("in bounds");

        // Assert
        assert!(matches!(sliced, Index::Sliced(_)));
        assert_eq!(sliced.iter().collect::<Vec<_>>(), vec![3, 4, 5, 6]);
        assert_eq!(sliced.base_len(), 10);
    }

    #[test]
    fn test_full_slice_range_normalizes_to_uniform() {
        let sliced = Index::uniform(4).slice_range(0..=3).expect("in bounds");
        assert!(matches!(sliced, Index::Uniform(_)));
    }

    #[test]
    fn test_slice_range_intersects_sliced() {
        let index = Index::sliced(10, 2, 5).expect("valid");
        let sliced = index.slice_range(4..=8).expect("in bounds");
        assert_eq!(sliced.iter().collect::<Vec<_>>(), vec![4, 5]);
    }

    #[test]
    fn test_slice_range_disjoint_is_empty() {
        let index = Index::sliced(10, 2, 3).expect("valid");
        let sliced = index.slice_range(6..=9).expect("in bounds");
        assert!(sliced.is_empty());
        assert_eq!(sliced.base_len(), 10);
    }

    #[test]
    #[allow(clippy::reversed_empty_ranges)]
    fn test_slice_range_empty_range_is_empty_index() {
        let sliced = Index::uniform(4).slice_range(3..=1).expect("empty range");
        assert!(sliced.is_empty());
    }

    #[test]
    fn test_slice_range_end_outside_base_fails() {
        let err = Index::uniform(4).slice_range(1..=4).unwrap_err();
        assert_eq!(err, Error::IndexBounds { position: 4, base: 4 });
    }

    #[test]
    fn test_slice_range_filters_sequential_in_list_order() {
        let index = Index::sequential(10, vec![9, 2, 5, 7]).expect("valid");
        let sliced = index.slice_range(2..=7).expect("in bounds");
        assert_eq!(sliced.iter().collect::<Vec<_>>(), vec![2, 5, 7]);
    }

    #[test]
    fn test_slice_positions_keeps_contained_first_occurrences() {
        // Arrange
        let index = Index::sliced(10, 2, 6).expect("valid");

        // Act
        let sliced = index.slice_positions(&[6, 1, 3, 6, 2]).expect("in bounds");

        // Assert
        assert_eq!(sliced.iter().collect::<Vec<_>>(), vec![6, 3, 2]);
    }

    #[test]
    fn test_slice_positions_out_of_base_fails() {
        let err = Index::uniform(3).slice_positions(&[0, 3]).unwrap_err();
        assert_eq!(err, Error::IndexBounds { position: 3, base: 3 });
    }

    #[test]
    fn test_slice_mask_keeps_true_positions() {
        // Arrange
        let index = Index::uniform(5);
        let mask = Series::from_options("m", [Some(true), Some(false), None, Some(true), Some(true)]);

        // Act
        let sliced = index.slice_mask(&mask).expect("same base");

        // Assert
        assert_eq!(sliced.iter().collect::<Vec<_>>(), vec![0, 3, 4]);
    }

    #[test]
    fn test_slice_mask_with_other_base_fails() {
        let mask = Series::from_values("m", vec![true; 3]);
        let err = Index::uniform(5).slice_mask(&mask).unwrap_err();
        assert_eq!(err, Error::BaseIndex { expected: 5, actual: 3 });
    }

    #[test]
    fn test_head_and_tail() {
        let uniform = Index::uniform(6);
        assert_eq!(uniform.head(2).iter().collect::<Vec<_>>(), vec![0, 1]);
        assert_eq!(uniform.tail(2).iter().collect::<Vec<_>>(), vec![4, 5]);
        assert_eq!(uniform.head(10).len(), 6);

        let seq = Index::sequential(6, vec![5, 0, 3]).expect("valid");
        assert_eq!(seq.head(2).iter().collect::<Vec<_>>(), vec![5, 0]);
        assert_eq!(seq.tail(1).iter().collect::<Vec<_>>(), vec![3]);
    }

    #[test]
    fn test_sorted_ascending() {
        let seq = Index::sequential(6, vec![5, 0, 3]).expect("valid");
        assert_eq!(seq.sorted_ascending().iter().collect::<Vec<_>>(), vec![0, 3, 5]);
    }

    // =========================================================================
    // Relations and equality
    // =========================================================================

    #[test]
    fn test_relation_to() {
        // Arrange
        let uniform = Index::uniform(8);
        let sliced = Index::sliced(8, 2, 5).expect("valid");
        let seq = Index::sequential(8, vec![4, 3]).expect("valid");

        // Act & Assert
        assert_eq!(uniform.relation_to(&sliced), IndexRelation::StrictSubset);
        assert_eq!(sliced.relation_to(&seq), IndexRelation::StrictSubset);
        assert_eq!(seq.relation_to(&sliced), IndexRelation::NotSubset);
        assert_eq!(sliced.relation_to(&sliced), IndexRelation::Same);
        assert_eq!(uniform.relation_to(&Index::uniform(9)), IndexRelation::NotSubset);
        assert_eq!(IndexRelation::NotSubset.as_i8(), -1);
    }

    #[test]
    fn test_equality_ignores_shape() {
        let full_slice = Index::sliced(4, 0, 3).expect("valid");
        let shuffled = Index::sequential(4, vec![3, 1, 0, 2]).expect("valid");

        assert_eq!(Index::uniform(4), full_slice);
        assert_eq!(Index::uniform(4), shuffled);
        assert_ne!(Index::uniform(4), Index::uniform(5));
    }

    // =========================================================================
    // Partitioning
    // =========================================================================

    #[test]
    fn test_partition_bounds_examples() {
        assert_eq!(partition_bounds(12, 3), vec![(0, 3), (4, 7), (8, 11)]);
        assert_eq!(partition_bounds(14, 3), vec![(0, 3), (4, 7), (8, 13)]);
        assert_eq!(partition_bounds(2, 8), vec![(0, 0), (1, 1)]);
        assert!(partition_bounds(0, 4).is_empty());
    }

    #[test]
    fn test_partitions_of_sliced_are_offset() {
        let index = Index::sliced(20, 10, 15).expect("valid");
        assert_eq!(
            index.partitions(2),
            vec![
                Chunk::Range { start: 10, end: 12 },
                Chunk::Range { start: 13, end: 15 }
            ]
        );
    }

    #[test]
    fn test_partitions_of_sequential_are_sublists() {
        let index = Index::sequential(10, vec![9, 1, 4, 2, 7]).expect("valid");
        let chunks = index.partitions(2);
        assert_eq!(chunks, vec![Chunk::Positions(&[9, 1]), Chunk::Positions(&[4, 2, 7])]);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(50))]

        #[test]
        fn prop_partitions_are_disjoint_and_cover(len in 0usize..500, parallelism in 1usize..16) {
            let bounds = partition_bounds(len, parallelism);
            let mut next = 0;
            for &(start, end) in &bounds {
                prop_assert_eq!(start, next);
                prop_assert!(start <= end);
                next = end + 1;
            }
            prop_assert_eq!(next, len);
            prop_assert!(bounds.len() <= parallelism);
        }

        #[test]
        fn prop_chunks_reassemble_index(positions in proptest::collection::hash_set(0usize..200, 0..60), parallelism in 1usize..8) {
            let positions: Vec<usize> = positions.into_iter().collect();
            let index = Index::sequential(200, positions.clone()).expect("valid");
            let rebuilt: Vec<usize> = index.partitions(parallelism).iter().flat_map(Chunk::iter).collect();
            prop_assert_eq!(rebuilt, positions);
        }
    }
}
