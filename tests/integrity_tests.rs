use mseed_graph::decimation::BucketGrid;
use mseed_graph::{
    create_min_max_list, downsample, downsample_parallel, GapIndex, GapSegment, Sample, SampleSeries,
    SampleSource, TimeRange,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_series(rng: &mut StdRng, n: usize) -> Vec<Sample> {
    let mut ts = rng.random_range(-1_000_000i64..1_000_000);
    (0..n)
        .map(|_| {
            ts += rng.random_range(0i64..500);
            Sample::new(ts, rng.random_range(-1.0e6..1.0e6))
        })
        .collect()
}

#[test]
fn test_bucket_count_matches_width() {
    let mut rng = StdRng::seed_from_u64(7);
    for width in [1usize, 2, 3, 50, 777, 1000] {
        let samples = random_series(&mut rng, 5_000);
        let range = TimeRange::new(samples[0].timestamp, samples[4_999].timestamp + 1).unwrap();
        let list = downsample(samples.iter().copied(), width, range, None).unwrap();
        assert_eq!(list.width(), width);
        assert_eq!(list.buckets().len(), width);
    }
}

#[test]
fn test_extrema_are_exact() {
    let mut rng = StdRng::seed_from_u64(42);
    let samples = random_series(&mut rng, 20_000);
    let range = TimeRange::new(samples[0].timestamp, samples[19_999].timestamp + 1).unwrap();
    let width = 333;

    let list = downsample(samples.iter().copied(), width, range, None).unwrap();
    let grid = BucketGrid::new(range, width).unwrap();

    let mut expected = vec![(f64::INFINITY, f64::NEG_INFINITY); width];
    for s in &samples {
        let idx = grid.index_of(s.timestamp).unwrap();
        expected[idx].0 = expected[idx].0.min(s.value);
        expected[idx].1 = expected[idx].1.max(s.value);
    }

    for (i, bucket) in list.iter().enumerate() {
        if expected[i].0.is_finite() {
            assert!(bucket.has_data, "bucket {i} should hold data");
            assert_eq!((bucket.min, bucket.max), expected[i], "bucket {i}");
        } else {
            assert!(!bucket.has_data, "bucket {i} should be a gap");
        }
    }

    for s in &samples {
        let b = list.buckets()[grid.index_of(s.timestamp).unwrap()];
        assert!(b.min <= s.value && s.value <= b.max);
    }
}

#[test]
fn test_peaks_survive_heavy_compression() {
    let n = 100_000i64;
    let mut samples: Vec<Sample> = (0..n)
        .map(|i| Sample::new(i * 10, (i as f64 * 0.01).cos()))
        .collect();
    samples[456].value = 5000.0;
    samples[78_901].value = -5000.0;

    let range = TimeRange::new(0, n * 10).unwrap();
    let list = downsample(samples, 100, range, None).unwrap();
    assert_eq!(list.value_range(), Some((-5000.0, 5000.0)), "peaks lost during downsampling");
}

#[test]
fn test_downsampling_is_idempotent() {
    let mut rng = StdRng::seed_from_u64(3);
    let samples = random_series(&mut rng, 10_000);
    let range = TimeRange::new(samples[0].timestamp - 10, samples[9_999].timestamp + 10).unwrap();

    let a = downsample(samples.iter().copied(), 640, range, None).unwrap();
    let b = downsample(samples.iter().copied(), 640, range, None).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_parallel_matches_sequential() {
    let mut rng = StdRng::seed_from_u64(99);
    let samples = random_series(&mut rng, 300_000);
    let range = TimeRange::new(samples[0].timestamp, samples[299_999].timestamp + 1).unwrap();

    for width in [1usize, 50, 777] {
        let seq = downsample(samples.iter().copied(), width, range, None).unwrap();
        let par = downsample_parallel(&samples, width, range, None).unwrap();
        assert_eq!(seq, par, "width {width}");
    }
}

#[test]
fn test_parallel_matches_sequential_with_gaps_and_window() {
    let mut rng = StdRng::seed_from_u64(2024);
    for round in 0..8 {
        let series = SampleSeries::new(random_series(&mut rng, 200_000));
        let samples = series.as_slice();
        let first = samples[0].timestamp;
        let last = samples[samples.len() - 1].timestamp;

        // A window that cuts samples off on both sides.
        let span = last - first;
        let t0 = first + rng.random_range(0..span / 4);
        let t1 = last - rng.random_range(0..span / 4);
        let range = TimeRange::new(t0, t1).unwrap();

        let gaps = GapIndex::new(
            (0..rng.random_range(1..6))
                .map(|_| {
                    let start = rng.random_range(t0..t1);
                    GapSegment::new(start, start + rng.random_range(1..span / 10))
                })
                .collect(),
        );
        let width = rng.random_range(1usize..1500);

        let seq = downsample(samples.iter().copied(), width, range, Some(&gaps)).unwrap();
        let par = downsample_parallel(samples, width, range, Some(&gaps)).unwrap();
        assert_eq!(seq, par, "round {round}: width {width}, range {range:?}");
        assert!(seq
            .iter()
            .filter(|b| gaps.covers(b.start, b.end))
            .all(|b| !b.has_data));
    }
}

#[test]
fn test_single_sample_default_extent() {
    let series = SampleSeries::new(vec![Sample::new(1_000_000, 7.0)]);
    for width in [1usize, 10, 800] {
        let list = create_min_max_list(&series, width, None).unwrap();
        assert_eq!(list.width(), width);
        assert_eq!(list.data_buckets(), 1, "width {width}");
        let b = list.buckets()[0];
        assert!(b.has_data);
        assert_eq!((b.min, b.max), (7.0, 7.0));
    }
}

#[test]
fn test_short_series_default_extent() {
    let series = SampleSeries::new((0..20).map(|i| Sample::new(i, (i % 5) as f64)).collect());
    assert_eq!(series.extent().unwrap().duration(), 20);
    let list = create_min_max_list(&series, 50, None).unwrap();
    assert_eq!(list.width(), 50);
    assert_eq!(list.data_buckets(), 20);
    assert_eq!(list.value_range(), Some((0.0, 4.0)));
}

#[test]
fn test_single_sample() {
    let list = downsample(
        vec![Sample::new(5_500, -3.0)],
        10,
        TimeRange::new(0, 10_000).unwrap(),
        None,
    )
    .unwrap();
    assert_eq!(list.data_buckets(), 1);
    let b = list.buckets()[5];
    assert!(b.has_data);
    assert_eq!((b.min, b.max), (-3.0, -3.0));
}

#[test]
fn test_invalid_arguments() {
    use mseed_graph::GraphError;

    let samples = vec![Sample::new(0, 1.0)];
    let range = TimeRange::new(0, 100).unwrap();
    assert!(matches!(
        downsample(samples.clone(), 0, range, None),
        Err(GraphError::InvalidArgument(_))
    ));
    assert!(TimeRange::new(100, 0).is_err());

    // More columns than microseconds is not an error: the extra columns are gaps.
    let list = downsample(samples, 200, range, None).unwrap();
    assert_eq!(list.width(), 200);
    assert_eq!(list.data_buckets(), 1);
}
