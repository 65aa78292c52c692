use mseed_graph::{GraphError, SampleSeries, SampleSource, Trace, TraceData, TraceList};

#[test]
fn test_trace_timestamps() {
    let trace = Trace::new(1_000_000, 200.0, TraceData::Float64(vec![0.0; 5]));
    assert_eq!(trace.period(), 5_000.0);
    assert_eq!(trace.timestamp_at(0), 1_000_000);
    assert_eq!(trace.timestamp_at(4), 1_020_000);
    assert_eq!(trace.last_sample_time(), 1_020_000);
    assert_eq!(trace.end_time(), 1_025_000);
}

#[test]
fn test_json_document_round_trip() {
    let json = r#"{
        "traces": [
            {
                "network": "BW", "station": "BGLD", "location": "", "channel": "EHE",
                "start_time": 1199145600000000,
                "sampling_rate": 200.0,
                "data": { "encoding": "int32", "samples": [1, -2, 3, -4] }
            },
            {
                "network": "BW", "station": "BGLD", "location": "", "channel": "EHE",
                "start_time": 1199145601000000,
                "sampling_rate": 200.0,
                "data": { "encoding": "float32", "samples": [0.5, 1.5] }
            }
        ],
        "gaps": [ { "start": 1199145602000000, "end": 1199145603000000 } ]
    }"#;

    let traces = TraceList::from_json_slice(json.as_bytes()).unwrap();
    assert_eq!(traces.id(), "BW.BGLD..EHE");
    assert_eq!(traces.len(), 6);
    // One derived gap between the traces and the declared one.
    assert_eq!(traces.gaps().segments().len(), 2);

    let values: Vec<f64> = traces.samples().map(|s| s.value).collect();
    assert_eq!(values, vec![1.0, -2.0, 3.0, -4.0, 0.5, 1.5]);

    let doc = serde_json::to_vec(&traces.to_document()).unwrap();
    let again = TraceList::from_json_slice(&doc).unwrap();
    assert_eq!(again.traces(), traces.traces());
    assert_eq!(again.gaps(), traces.gaps());
}

#[test]
fn test_malformed_document_is_format_error() {
    let err = TraceList::from_json_slice(b"{ \"traces\": [ { \"start_time\": 0 } ] }").unwrap_err();
    assert!(matches!(err, GraphError::DataFormat(_)), "{err}");

    let err = TraceList::from_json_slice(b"not json").unwrap_err();
    assert!(matches!(err, GraphError::DataFormat(_)));
}

#[test]
fn test_unreadable_source_is_invalid_argument() {
    let err = TraceList::from_path("/nonexistent/BW.BGLD..EHE.D.2008.001").unwrap_err();
    assert!(matches!(err, GraphError::InvalidArgument(_)), "{err}");
}

#[test]
fn test_trace_list_validation() {
    assert!(matches!(TraceList::new(vec![]), Err(GraphError::DataFormat(_))));

    let bad_rate = Trace::new(0, 0.0, TraceData::Int32(vec![1]));
    assert!(matches!(TraceList::new(vec![bad_rate]), Err(GraphError::DataFormat(_))));

    let empty = Trace::new(0, 100.0, TraceData::Int32(vec![]));
    assert!(matches!(TraceList::new(vec![empty]), Err(GraphError::DataFormat(_))));

    let a = Trace::new(0, 100.0, TraceData::Int32(vec![0; 100])).with_id("BW", "A", "", "EHZ");
    let b = Trace::new(500_000, 100.0, TraceData::Int32(vec![0; 100])).with_id("BW", "A", "", "EHZ");
    assert!(matches!(TraceList::new(vec![a.clone(), b]), Err(GraphError::DataFormat(_))));

    let other = Trace::new(2_000_000, 100.0, TraceData::Int32(vec![0; 10])).with_id("BW", "B", "", "EHZ");
    assert!(matches!(TraceList::new(vec![a, other]), Err(GraphError::DataFormat(_))));
}

#[test]
fn test_traces_are_sorted_and_jitter_tolerated() {
    // The second trace starts 2us late: well within half a period.
    let later = Trace::new(1_000_002, 100.0, TraceData::Int32(vec![2; 100]));
    let earlier = Trace::new(0, 100.0, TraceData::Int32(vec![1; 100]));
    let traces = TraceList::new(vec![later, earlier]).unwrap();
    assert_eq!(traces.start_time(), 0);
    assert!(traces.gaps().is_empty());

    let ts: Vec<i64> = traces.samples().map(|s| s.timestamp).collect();
    assert!(ts.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn test_sample_series_extent() {
    let series = SampleSeries::regular(100, 1.0, &[1.0, 2.0, 3.0]);
    let extent = series.extent().unwrap();
    assert_eq!(extent.start, 100);
    assert_eq!(extent.end, 2_000_101);
    assert!(SampleSeries::default().extent().is_none());
}

#[test]
fn test_trace_end_past_representable_time() {
    let json = r#"{ "traces": [ {
        "start_time": 9223372036854775000,
        "sampling_rate": 200.0,
        "data": { "encoding": "int32", "samples": [1, 2, 3, 4, 5, 6, 7, 8, 9, 10] }
    } ] }"#;
    let err = TraceList::from_json_slice(json.as_bytes()).unwrap_err();
    assert!(matches!(err, GraphError::DataFormat(_)), "{err}");

    let slow = Trace::new(0, 1e-13, TraceData::Int32(vec![1, 2]));
    assert!(matches!(TraceList::new(vec![slow]), Err(GraphError::DataFormat(_))));

    let late = SampleSeries::new(vec![
        mseed_graph::Sample::new(i64::MAX - 1, 1.0),
        mseed_graph::Sample::new(i64::MAX, 2.0),
    ]);
    assert_eq!(late.extent().unwrap().end, i64::MAX);
}

#[test]
fn test_trace_document_from_file() {
    let traces = TraceList::new(vec![
        Trace::new(0, 50.0, TraceData::Float64(vec![0.25; 50])).with_id("BW", "RJOB", "", "EHZ"),
    ])
    .unwrap();
    let path = std::env::temp_dir().join(format!("mseed_graph_doc_{}.json", std::process::id()));
    std::fs::write(&path, serde_json::to_vec(&traces.to_document()).unwrap()).unwrap();

    let loaded = TraceList::from_path(&path).unwrap();
    assert_eq!(loaded.traces(), traces.traces());
    assert_eq!(loaded.end_time(), 1_000_000);

    std::fs::write(&path, b"{ \"traces\": ").unwrap();
    assert!(matches!(TraceList::from_path(&path), Err(GraphError::DataFormat(_))));
    let _ = std::fs::remove_file(&path);
}
