//! Tests for `engine` module

#[cfg(test)]
mod tests {
    use crate::config::EngineConfig;
    use crate::engine::*;
    use crate::error::Error;
    use crate::index::Index;
    use crate::series::Series;
    use proptest::prelude::*;

    /// Engine that partitions anything longer than one position over three
    /// workers.
    fn partitioned() -> Engine {
        Engine::new(
            EngineConfig::new()
                .with_fixed_threads(3)
                .with_min_parallel_len(1),
        )
        .expect("valid config")
    }

    fn engines() -> [Engine; 2] {
        [Engine::sequential(), partitioned()]
    }

    fn a() -> Series<i64> {
        Series::from_options("A", [Some(3), None, Some(-1), Some(7)])
    }

    fn b() -> Series<i64> {
        Series::from_options("B", [Some(2), Some(3), Some(2), None])
    }

    // =========================================================================
    // Engine construction and routing
    // =========================================================================

    #[test]
    fn test_engine_rejects_invalid_config() {
        let err = Engine::new(EngineConfig::new().with_fixed_threads(0)).unwrap_err();
        assert_eq!(err.code(), "SERIES-009");
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_sequential_engine_has_no_pool() {
        let engine = Engine::sequential();
        assert!(engine.partitioned_executor().is_none());
        assert!(!engine.config().parallel);
    }

    #[test]
    fn test_partitioned_engine_uses_fixed_threads() {
        let engine = partitioned();
        let executor = engine.partitioned_executor().expect("parallel enabled");
        assert_eq!(executor.threads(), 3);
        assert_eq!(executor.label(), "partitioned");
        assert_eq!(engine.sequential_executor().label(), "sequential");
    }

    #[test]
    fn test_short_inputs_stay_on_calling_thread() {
        // Arrange
        let engine = Engine::new(
            EngineConfig::new()
                .with_fixed_threads(2)
                .with_min_parallel_len(100),
        )
        .expect("valid config");
        let caller = std::thread::current().id();
        let series = Series::from_values("x", (0..100_i64).collect());

        // Act
        let threads = engine
            .run_chunks("probe", series.index(), |_, _| Ok(std::thread::current().id()))
            .expect("no failure");

        // Assert
        assert_eq!(threads, vec![caller]);
    }

    #[test]
    fn test_long_inputs_are_partitioned() {
        let engine = partitioned();
        let series = Series::from_values("x", (0..12_i64).collect());

        let lens = engine
            .run_chunks("probe", series.index(), |partition, chunk| Ok((partition, chunk.len())))
            .expect("no failure");

        assert_eq!(lens, vec![(0, 4), (1, 4), (2, 4)]);
    }

    // =========================================================================
    // map / map2
    // =========================================================================

    #[test]
    fn test_map_keeps_undefined_positions() {
        for engine in engines() {
            let doubled = engine.map(&a(), |v| Some(v * 2)).expect("map");
            assert_eq!(doubled.to_options(), vec![Some(6), None, Some(-2), Some(14)]);
            assert_eq!(doubled.name(), "A");
        }
    }

    #[test]
    fn test_map_changes_element_type() {
        for engine in engines() {
            let positive = engine.map(&a(), |v| Some(*v > 0)).expect("map");
            assert_eq!(positive.to_options(), vec![Some(true), None, Some(false), Some(true)]);
        }
    }

    #[test]
    fn test_map_to_null_fails_under_both_executors() {
        for engine in engines() {
            // Act
            let err = engine
                .map(&a(), |v| (*v != 7).then_some(*v))
                .unwrap_err();

            // Assert
            assert_eq!(err.root_cause(), &Error::MapToNull { position: 3 });
            assert!(err.is_recoverable());
        }
    }

    #[test]
    fn test_partitioned_failure_is_wrapped_with_partition() {
        let err = partitioned()
            .map(&a(), |v| (*v != 7).then_some(*v))
            .unwrap_err();

        // 4 positions over 3 workers: partition 2 holds positions 2 and 3.
        assert!(matches!(err, Error::ThreadFailed { partition: 2, .. }));
    }

    #[test]
    fn test_first_failing_partition_wins() {
        let series = Series::from_values("x", (0..12_i64).collect());

        let err = partitioned()
            .map(&series, |v| (*v % 4 != 1).then_some(*v))
            .unwrap_err();

        assert_eq!(
            err,
            Error::ThreadFailed {
                partition: 0,
                source: Box::new(Error::MapToNull { position: 1 }),
            }
        );
    }

    #[test]
    fn test_map2_eligibility() {
        for engine in engines() {
            let sums = engine.map2(&a(), &b(), |x, y| Some(x + y)).expect("map2");
            assert_eq!(sums.to_options(), vec![Some(5), None, Some(1), None]);
            assert_eq!(sums.name(), "A");
        }
    }

    #[test]
    fn test_map2_honors_right_index_containment() {
        // Arrange
        let right = b().slice_range(0..=1).expect("in bounds");

        // Act
        let sums = Engine::sequential()
            .map2(&a(), &right, |x, y| Some(x + y))
            .expect("map2");

        // Assert
        assert_eq!(sums.to_options(), vec![Some(5), None, None, None]);
    }

    #[test]
    fn test_map2_base_mismatch_fails_fast() {
        let short = Series::from_values("s", vec![1_i64, 2]);
        let err = Engine::sequential()
            .map2(&a(), &short, |x, y| Some(x + y))
            .unwrap_err();
        assert_eq!(err, Error::BaseIndex { expected: 4, actual: 2 });
    }

    #[test]
    fn test_map_over_sequential_index_scatters_results() {
        for engine in engines() {
            // Arrange
            let view = a()
                .with_index(Index::sequential(4, vec![3, 0, 2]).expect("valid"))
                .expect("same base");

            // Act
            let out = engine.map(&view, |v| Some(v + 1)).expect("map");

            // Assert
            assert_eq!(out.to_options(), vec![Some(8), Some(4), Some(0)]);
            assert_eq!(out.get(1).expect("in bounds"), None);
        }
    }

    // =========================================================================
    // Reductions and searches
    // =========================================================================

    #[test]
    fn test_aggregate_and_reduce() {
        for engine in engines() {
            assert_eq!(engine.aggregate(&a(), 100, |acc, v| acc + v).expect("agg"), 109);
            assert_eq!(engine.reduce(&a(), |acc, v| acc.max(*v)).expect("reduce"), Some(7));
        }
    }

    #[test]
    fn test_aggregate_of_empty_is_start() {
        let empty = a().head(0);
        for engine in engines() {
            assert_eq!(engine.aggregate(&empty, 5, |acc, v| acc + v).expect("agg"), 5);
            assert_eq!(engine.reduce(&empty, |acc, v| acc + v).expect("reduce"), None);
        }
    }

    #[test]
    fn test_aggregate_applies_start_once_when_partitioned() {
        let series = Series::from_values("x", vec![1_i64; 12]);
        assert_eq!(partitioned().aggregate(&series, 10, |acc, v| acc + v).expect("agg"), 22);
    }

    #[test]
    fn test_counts() {
        let floats = Series::from_storage(
            "f",
            crate::storage::MaskedStorage::from_values(vec![1.0_f64, f64::NAN, 2.0]),
        );
        let flags = Series::from_options("b", [Some(true), None, Some(false), Some(true)]);

        for engine in engines() {
            assert_eq!(engine.count(&a()).expect("count"), 3);
            assert_eq!(engine.count(&floats).expect("count"), 3);
            assert_eq!(engine.count_defined_excluding_nan(&floats).expect("count"), 2);
            assert_eq!(engine.count_true(&flags).expect("count"), 2);
            assert_eq!(engine.count_false(&flags).expect("count"), 1);
        }
    }

    #[test]
    fn test_find_first_last() {
        let series = Series::from_options("x", [Some(1_i32), Some(4), None, Some(4), Some(9)]);
        let flags = Series::from_options("b", [Some(false), Some(true), None, Some(true), Some(false)]);

        for engine in engines() {
            assert_eq!(engine.find(&series, |v| *v > 3).expect("find"), Some(1));
            assert_eq!(engine.find_last(&series, |v| *v < 5).expect("find"), Some(3));
            assert_eq!(engine.first(&series, &4).expect("first"), Some(1));
            assert_eq!(engine.last(&series, &4).expect("last"), Some(3));
            assert_eq!(engine.first(&series, &5).expect("first"), None);
            assert_eq!(engine.first_true(&flags).expect("first"), Some(1));
            assert_eq!(engine.last_true(&flags).expect("last"), Some(3));
        }
    }

    #[test]
    fn test_find_follows_index_order() {
        let view = Series::from_values("x", vec![5_i32, 5, 5])
            .with_index(Index::sequential(3, vec![2, 0, 1]).expect("valid"))
            .expect("same base");

        assert_eq!(Engine::sequential().first(&view, &5).expect("first"), Some(2));
        assert_eq!(Engine::sequential().last(&view, &5).expect("last"), Some(1));
    }

    // =========================================================================
    // dense / fill / update
    // =========================================================================

    #[test]
    fn test_dense_marks_positions_outside_index() {
        for engine in engines() {
            // Arrange
            let view = a().slice_range(2..=3).expect("in bounds");

            // Act
            let dense = engine.dense(&view).expect("dense");

            // Assert
            assert!(dense.index().is_bijective_with_base());
            assert_eq!(dense.to_options(), vec![None, None, Some(-1), Some(7)]);
            assert_eq!(engine.dense(&dense).expect("dense"), dense);
        }
    }

    #[test]
    fn test_dense_of_full_series_shares_storage() {
        let series = a();
        let dense = Engine::sequential().dense(&series).expect("dense");
        assert!(std::ptr::eq(series.storage(), dense.storage()));
    }

    #[test]
    fn test_fill_coalesces() {
        let primary = Series::from_options("p", [None, Some(5_i32), None]);
        let secondary = Series::from_options("s", [Some(1_i32), None, Some(3)]);

        for engine in engines() {
            let filled = engine.fill(&primary, &secondary).expect("fill");
            assert_eq!(filled.to_options(), vec![Some(1), Some(5), Some(3)]);
            assert_eq!(filled.name(), "p");
        }
    }

    #[test]
    fn test_fill_keeps_primary_index() {
        let primary = Series::from_options("p", [None, Some(5_i32), None]).head(2);
        let secondary = Series::from_options("s", [Some(1_i32), None, Some(3)]);

        let filled = Engine::sequential().fill(&primary, &secondary).expect("fill");

        assert_eq!(filled.len(), 2);
        assert_eq!(filled.to_options(), vec![Some(1), Some(5)]);
    }

    #[test]
    fn test_fill_with_constant_and_fill_all() {
        let view = a().slice_range(1..=2).expect("in bounds");

        for engine in engines() {
            let constant = engine.fill_with_constant(&view, 0).expect("fill");
            assert_eq!(constant.to_options(), vec![Some(0), Some(-1)]);
            assert_eq!(constant.len(), 2);

            let all = engine.fill_all(&view, 0).expect("fill");
            assert!(all.is_fully_defined());
            assert_eq!(all.to_options(), vec![Some(0), Some(0), Some(-1), Some(0)]);
        }
    }

    #[test]
    fn test_update_keeps_override_shape() {
        // Arrange
        let base = Series::from_options("base", [Some(1_i32), None, Some(3), None]);
        let overrides = Series::from_values("ov", vec![10_i32, 20, 30, 40])
            .with_index(Index::sequential(4, vec![3, 1, 2]).expect("valid"))
            .expect("same base");

        for engine in engines() {
            // Act
            let updated = engine.update(&base, &overrides).expect("update");

            // Assert
            assert_eq!(updated.name(), "base");
            assert_eq!(updated.to_options(), vec![Some(40), Some(20), Some(3)]);
            assert_eq!(updated.get(0).expect("in bounds"), None);
        }
    }

    // =========================================================================
    // union / extract
    // =========================================================================

    #[test]
    fn test_union_concatenates_in_index_order() {
        // Arrange
        let first = a().with_index(Index::sequential(4, vec![3, 1]).expect("valid")).expect("same base");
        let second = Series::from_options("C", [Some(8_i64), None]);
        let empty = Series::from_values("E", Vec::<i64>::new());

        for engine in engines() {
            // Act
            let joined = engine.union(&[&first, &empty, &second]).expect("union");

            // Assert
            assert_eq!(joined.len(), 4);
            assert_eq!(joined.name(), "A");
            assert!(matches!(joined.index(), Index::Uniform(_)));
            assert_eq!(joined.to_options(), vec![Some(7), None, Some(8), None]);
        }
    }

    #[test]
    fn test_union_of_nothing_is_empty() {
        let joined = Engine::sequential().union::<i32>(&[]).expect("union");
        assert!(joined.is_empty());
    }

    #[test]
    fn test_extract_gathers_positions() {
        for engine in engines() {
            let picked = engine
                .extract(&a(), &[Some(3), None, Some(1), Some(0), Some(3)])
                .expect("extract");
            assert_eq!(picked.to_options(), vec![Some(7), None, None, Some(3), Some(7)]);
        }
    }

    #[test]
    fn test_extract_rejects_out_of_base() {
        let err = Engine::sequential().extract(&a(), &[Some(0), Some(4)]).unwrap_err();
        assert_eq!(err, Error::IndexBounds { position: 4, base: 4 });
    }

    // =========================================================================
    // Numeric operators
    // =========================================================================

    #[test]
    fn test_add_masks_and_names() {
        for engine in engines() {
            let total = engine.add(&a(), &b()).expect("add");
            assert_eq!(total.to_options(), vec![Some(5), None, Some(1), None]);
            assert_eq!(total.name(), "A+B");
        }
    }

    #[test]
    fn test_operator_name_kept_when_one_side_unnamed() {
        let unnamed = b().renamed("");
        let diff = Engine::sequential().sub(&a(), &unnamed).expect("sub");
        assert_eq!(diff.name(), "A");
        assert_eq!(diff.to_options(), vec![Some(1), None, Some(-3), None]);
    }

    #[test]
    fn test_integer_arithmetic_wraps_and_div_by_zero_is_undefined() {
        let left = Series::from_values("l", vec![i32::MAX, 7, 9]);
        let right = Series::from_values("r", vec![1_i32, 0, 3]);

        for engine in engines() {
            assert_eq!(engine.add(&left, &right).expect("add").to_options()[0], Some(i32::MIN));
            assert_eq!(engine.mul(&left, &right).expect("mul").to_options()[2], Some(27));
            assert_eq!(
                engine.div(&left, &right).expect("div").to_options(),
                vec![Some(i32::MAX), None, Some(3)]
            );
        }
    }

    #[test]
    fn test_float_division_follows_ieee() {
        let left = Series::from_values("l", vec![1.0_f64, 1.0]);
        let right = Series::from_values("r", vec![0.0_f64, 4.0]);
        let quotient = Engine::sequential().div(&left, &right).expect("div");
        assert_eq!(quotient.to_options(), vec![Some(f64::INFINITY), Some(0.25)]);
    }

    #[test]
    fn test_numeric_reductions() {
        for engine in engines() {
            assert_eq!(engine.sum(&a()).expect("sum"), 9);
            assert_eq!(engine.min(&a()).expect("min"), Some(-1));
            assert_eq!(engine.max(&a()).expect("max"), Some(7));
            assert_eq!(engine.mean(&a()).expect("mean"), Some(3.0));
            assert_eq!(engine.mean(&a().head(0)).expect("mean"), None);
        }
    }

    // =========================================================================
    // Executor parity
    // =========================================================================

    fn nullable_column() -> impl Strategy<Value = Vec<Option<i64>>> {
        proptest::collection::vec(proptest::option::of(-1000_i64..1000), 0..200)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(50))]

        #[test]
        fn prop_executors_agree_on_map2_and_fill(left in nullable_column(), right in nullable_column()) {
            let len = left.len().min(right.len());
            let left = Series::from_options("l", left.into_iter().take(len));
            let right = Series::from_options("r", right.into_iter().take(len));
            let sequential = Engine::sequential();
            let parallel = partitioned();

            prop_assert_eq!(
                sequential.add(&left, &right).expect("add").to_options(),
                parallel.add(&left, &right).expect("add").to_options()
            );
            prop_assert_eq!(
                sequential.fill(&left, &right).expect("fill").to_options(),
                parallel.fill(&left, &right).expect("fill").to_options()
            );
            prop_assert_eq!(sequential.sum(&left).expect("sum"), parallel.sum(&left).expect("sum"));
            prop_assert_eq!(sequential.count(&left).expect("count"), parallel.count(&left).expect("count"));
            prop_assert_eq!(
                sequential.find(&left, |v| *v > 500).expect("find"),
                parallel.find(&left, |v| *v > 500).expect("find")
            );
        }

        #[test]
        fn prop_dense_is_idempotent(values in nullable_column(), cut in 0usize..200) {
            let series = Series::from_options("v", values);
            let view = series.head(cut.min(series.len()));
            let engine = partitioned();

            let once = engine.dense(&view).expect("dense");
            let twice = engine.dense(&once).expect("dense");

            prop_assert_eq!(once.to_options(), twice.to_options());
            prop_assert!(once.index().is_bijective_with_base());
        }

        #[test]
        fn prop_union_length_is_sum(a in nullable_column(), b in nullable_column()) {
            let a = Series::from_options("a", a);
            let b = Series::from_options("b", b);

            let joined = partitioned().union(&[&a, &b]).expect("union");

            prop_assert_eq!(joined.len(), a.len() + b.len());
            let mut expected = a.to_options();
            expected.extend(b.to_options());
            prop_assert_eq!(joined.to_options(), expected);
        }
    }
}
