//! End-to-end behavior of combinator pipelines.

mod common;

use common::{drain, init_tracing};
use strand::{
    Error, GLOBAL, Indexed, Pair, chain, enumerate, filter, range, repeat, skip, slice, slice_rev,
    take, transform, zip,
};

#[test]
fn range_filter_transform_yields_doubled_evens() {
    init_tracing();
    let it = range(0, 5, 1, &GLOBAL);
    let it = filter(it, |v| v % 2 == 0).expect("filter should succeed");
    let it = transform(it, |v| v * 2).expect("transform should succeed");
    assert_eq!(drain(it), vec![0, 4, 8]);
}

#[test]
fn repeat_zipped_with_range_yields_pairs() {
    init_tracing();
    let v = String::from("v");
    let it = zip(repeat(&v, 3, &GLOBAL), range(1, 4, 1, &GLOBAL)).expect("zip should succeed");
    let pairs: Vec<(String, i64)> = drain(it).into_iter().map(Pair::into_tuple).collect();
    assert_eq!(
        pairs,
        vec![
            ("v".to_string(), 1),
            ("v".to_string(), 2),
            ("v".to_string(), 3)
        ]
    );
}

#[test]
fn range_length_matches_ceiling_division() {
    init_tracing();
    for start in -7..=7 {
        for end in -7..=7 {
            for step in [-5, -3, -2, -1, 1, 2, 3, 5] {
                let it = range(start, end, step, &GLOBAL);
                let span = end - start;
                if span != 0 && span.signum() != step.signum() {
                    assert!(!it.is_valid(), "range({start}, {end}, {step})");
                    continue;
                }
                let expected = (span.abs() + step.abs() - 1) / step.abs();
                let count = it.count().expect("count should succeed");
                assert_eq!(count as i64, expected, "range({start}, {end}, {step})");
            }
        }
    }
}

#[test]
fn range_next_then_prev_returns_to_the_same_value() {
    init_tracing();
    let mut it = range(-10, 11, 3, &GLOBAL);
    loop {
        let before = it.get().copied();
        if it.next().is_err() {
            break;
        }
        it.prev().expect("prev should succeed");
        assert_eq!(it.get().copied(), before);
        it.next().expect("next should succeed");
    }
    // Walk all the way back.
    let mut seen = Vec::new();
    while it.has_prev() {
        it.prev().expect("prev should succeed");
        seen.push(*it.get().expect("element should be present"));
    }
    assert_eq!(seen, vec![8, 5, 2, -1, -4, -7, -10]);
}

#[test]
fn take_yields_min_of_limit_and_length() {
    init_tracing();
    for len in 0..6 {
        for n in 0..8 {
            let it = take(range(0, len, 1, &GLOBAL), n).expect("take should succeed");
            let items = drain(it);
            assert_eq!(items.len(), n.min(len as usize));
            assert_eq!(items, (0..len).take(n).collect::<Vec<_>>());
        }
    }
}

#[test]
fn skip_yields_what_is_left_after_n() {
    init_tracing();
    for len in 0..6 {
        for n in 0..8 {
            let it = skip(range(0, len, 1, &GLOBAL), n).expect("skip should succeed");
            let items = drain(it);
            assert_eq!(items.len(), (len as usize).saturating_sub(n));
            assert_eq!(items, (0..len).skip(n).collect::<Vec<_>>());
        }
    }
}

#[test]
fn zip_yields_min_length_positional_pairs() {
    init_tracing();
    let left = [1, 2, 3, 4, 5];
    let right = ['a', 'b', 'c'];
    for (a, b) in [(5, 3), (2, 3), (0, 3), (5, 0)] {
        let it = zip(slice(&left[..a], &GLOBAL), slice(&right[..b], &GLOBAL))
            .expect("zip should succeed");
        let pairs = drain(it);
        assert_eq!(pairs.len(), a.min(b));
        for (i, pair) in pairs.iter().enumerate() {
            assert_eq!(*pair, Pair::new(left[i], right[i]));
        }
    }
}

#[test]
fn filter_keeps_exactly_the_matching_subsequence() {
    init_tracing();
    let data = [5, 12, 7, 8, 1, 30, 2];
    let it = filter(slice(&data, &GLOBAL), |v| *v > 6).expect("filter should succeed");
    assert_eq!(drain(it), vec![12, 7, 8, 30]);

    let it = filter(slice(&data, &GLOBAL), |_| false).expect("filter should succeed");
    assert_eq!(drain(it), Vec::<i32>::new());
}

#[test]
fn cached_elements_are_pointer_stable() {
    init_tracing();
    let words = ["x", "y"];
    let mut mapped = transform(slice(&words, &GLOBAL), |w| w.to_uppercase())
        .expect("transform should succeed");
    let a = mapped.get().map(|s| s as *const String);
    let b = mapped.get().map(|s| s as *const String);
    assert_eq!(a, b);
    assert_eq!(mapped.get().map(String::as_str), Some("X"));

    let mut indexed = enumerate(slice(&words, &GLOBAL), 0).expect("enumerate should succeed");
    let a = indexed.get().map(|r| r as *const Indexed<&str>);
    let b = indexed.get().map(|r| r as *const Indexed<&str>);
    assert_eq!(a, b);
}

#[test]
fn reverse_slice_feeds_forward_combinators() {
    init_tracing();
    let data = [1, 2, 3, 4, 5, 6];
    let it = slice_rev(&data, &GLOBAL)
        .skip(1)
        .and_then(|it| it.filter(|v| v % 2 == 1))
        .expect("pipeline should build");
    let it = it.enumerate(1).expect("enumerate should succeed");
    let rows: Vec<(usize, i32)> = drain(it).into_iter().map(|r| (r.index, r.value)).collect();
    assert_eq!(rows, vec![(1, 5), (2, 3), (3, 1)]);
}

#[test]
fn chain_of_pipelines_runs_each_in_turn() {
    init_tracing();
    let head = take(range(0, 100, 10, &GLOBAL), 2).expect("take should succeed");
    let tail = transform(range(0, 3, 1, &GLOBAL), |v| -v).expect("transform should succeed");
    let it = chain([head, range(0, 0, 1, &GLOBAL), tail], &GLOBAL).expect("chain should succeed");
    assert_eq!(drain(it), vec![0, 10, 0, -1, -2]);
}

#[test]
fn exhausted_pipelines_report_exhaustion() {
    init_tracing();
    let mut it = range(0, 1, 1, &GLOBAL)
        .transform(|v| v + 1)
        .and_then(|it| it.take(5))
        .expect("pipeline should build");
    it.next().expect("next should succeed");
    assert!(!it.has_next());
    assert_eq!(it.get(), None);
    assert_eq!(it.next(), Err(Error::Exhausted));
    // Forward-only layers do not pretend to step back.
    assert!(!it.has_prev());
    assert_eq!(it.prev(), Err(Error::Unsupported("prev")));
}
