//! # Integration Tests
//!
//! End-to-end tests for the full pipeline.
//!
//! Covers:
//! - Raw telegram logs -> archival block -> segmenter -> normalizer -> sinks
//! - Manifest loading against the crates that consume it

#[cfg(test)]
mod contract_tests {
    #[test]
    fn test_contracts_compile() {
        let _ = contracts::ConfigVersion::V1;
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::collections::HashMap;
    use std::fs;

    use archive::{derive_batch_id, ArchiveReader, ArchiveWriter};
    use contracts::{
        MeasurementBlock, MeasurementSource, NormalizedSample, NormalizerConfig, SampleNormalizer,
        SinkConfig, SinkType, TelegramConfig,
    };
    use dispatcher::create_dispatcher;
    use ingestion::{IngestPipeline, LogScanner};
    use segmenter::{ResampleNormalizer, Segmenter, SingleBeamDetector, SyntheticScene};
    use tokio::sync::mpsc;

    /// Single-beam grammar: 3 header fields, 1 data point, 2 trailer fields
    fn single_beam_grammar() -> TelegramConfig {
        TelegramConfig {
            expected_fields: 6,
            header_fields: 3,
            trailer_fields: 2,
        }
    }

    fn ingest_config(root: &std::path::Path) -> contracts::IngestConfig {
        contracts::IngestConfig {
            raw_dir: root.join("raw_data"),
            archive_dir: root.join("compressed_data"),
            file_stem: "raw_data".into(),
            settle_secs: 0,
            delete_consumed: false,
        }
    }

    /// End-to-end: raw logs -> block -> spans -> samples -> file sink
    #[tokio::test]
    async fn test_e2e_compress_then_extract() {
        let root = tempfile::tempdir().unwrap();
        let config = ingest_config(root.path());
        fs::create_dir_all(&config.raw_dir).unwrap();

        // Two raw files; the second carries the vehicle pass
        let telegram = single_beam_grammar();
        let empty = SyntheticScene::single_beam(20, 3000, 800);
        let with_vehicle = SyntheticScene::single_beam(30, 3000, 800).with_pass(10, 8);
        fs::write(
            config.raw_dir.join("raw_data_1.log"),
            empty.raw_log(&telegram, "2019-06-12 13:45:01.123"),
        )
        .unwrap();
        fs::write(
            config.raw_dir.join("raw_data_2.log"),
            with_vehicle.raw_log(&telegram, "2019-06-12 13:46:01.123"),
        )
        .unwrap();

        // ==== Compression stage ====
        let mut scanner = LogScanner::new(&config);
        let files = scanner.scan().unwrap();
        assert_eq!(files.len(), 2);

        let mut pipeline = IngestPipeline::new(telegram, 4);
        let rx = pipeline.take_receiver().unwrap();
        let reader = pipeline.spawn_reader(files);
        pipeline.finish();

        let mut rows = Vec::new();
        let mut clock_digits = None;
        while let Ok(raw_file) = rx.recv().await {
            if clock_digits.is_none() {
                clock_digits = raw_file.clock_digits.clone();
            }
            assert_eq!(raw_file.skipped_lines, 0);
            rows.extend(raw_file.measurements);
        }
        reader.await.unwrap();
        assert_eq!(rows.len(), 50);

        let block = MeasurementBlock::new(derive_batch_id(clock_digits.as_deref()), rows);
        assert_eq!(block.batch_id, "20190612134501123");

        let writer = ArchiveWriter::new(&config.archive_dir).unwrap();
        writer.write_block(&block, vec![], 0).unwrap();

        // ==== Extraction stage ====
        let mut source = ArchiveReader::open(&config.archive_dir).unwrap();
        let block = source.next_block().unwrap().unwrap();
        assert!(source.next_block().unwrap().is_none());

        let mut seg = Segmenter::new(3, SingleBeamDetector::new(1500));
        let spans = seg.process(&block).unwrap();

        // One vehicle: occupied rows 30..=37 of the concatenated block,
        // entry confirmed with 3 frames of lead context
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].meta.strict_start(), 30);
        assert_eq!(spans[0].meta.start_index, 27);
        assert_eq!(spans[0].meta.end_index, 37);

        let normalizer = ResampleNormalizer::new(&NormalizerConfig {
            rows: 16,
            cols: 1,
            full_scale: 4000,
        });

        // Dispatch into a file sink
        let out_dir = root.path().join("processed_data");
        let mut params = HashMap::new();
        params.insert("base_path".to_string(), out_dir.display().to_string());
        let sink_configs = vec![SinkConfig {
            name: "samples".to_string(),
            sink_type: SinkType::File,
            queue_capacity: 16,
            params,
        }];

        let (tx, rx) = mpsc::channel::<NormalizedSample>(16);
        let dispatcher = create_dispatcher(sink_configs, rx).await.unwrap();
        let handle = dispatcher.spawn();

        for span in &spans {
            let sample = normalizer.normalize(span).unwrap();
            assert_eq!(sample.shape(), (16, 1));
            // Vehicle rows sit well below the background after scaling
            assert!(sample.values.iter().any(|v| *v < 0.5));
            tx.send(sample).await.unwrap();
        }
        drop(tx);
        handle.await.unwrap();

        let written = out_dir
            .join("samples")
            .join(block.batch_id.as_str())
            .join("0.bin");
        assert!(written.exists(), "sample file missing: {written:?}");

        let meta_file = out_dir
            .join("meta")
            .join(block.batch_id.as_str())
            .join("0.json");
        let meta: contracts::SpanMeta =
            serde_json::from_str(&fs::read_to_string(meta_file).unwrap()).unwrap();
        assert_eq!(meta.start_index, 27);
        assert_eq!(meta.end_index, 37);
    }

    /// Manifest TOML drives the same types the pipeline consumes
    #[test]
    fn test_manifest_loads_for_pipeline() {
        let toml = r#"
[station]
id = "a9-km41-north"
description = "test rig"

[ingest]
raw_dir = "raw_data"
archive_dir = "compressed_data"
settle_secs = 0
delete_consumed = false

[telegram]
expected_fields = 6
header_fields = 3
trailer_fields = 2

[segmenter]
detection_threshold = 3

[segmenter.detector]
mode = "single_beam"
range_threshold = 1500

[normalizer]
rows = 16
cols = 1
full_scale = 4000

[[sinks]]
name = "samples"
sink_type = "file"
[sinks.params]
base_path = "processed_data"

[[sinks]]
name = "debug"
sink_type = "log"
queue_capacity = 8
"#;
        let manifest =
            config_loader::ConfigLoader::load_from_str(toml, config_loader::ConfigFormat::Toml)
                .unwrap();

        assert_eq!(manifest.telegram.data_points(), 1);
        assert_eq!(manifest.sinks.len(), 2);

        // The manifest's detector and normalizer construct directly
        let _detector = segmenter::build_detector(&manifest.segmenter.detector);
        let normalizer = ResampleNormalizer::new(&manifest.normalizer);
        assert_eq!(normalizer.output_shape(), (16, 1));
    }

    /// A corrupted line costs one frame, not the batch
    #[tokio::test]
    async fn test_e2e_bad_lines_skipped() {
        let root = tempfile::tempdir().unwrap();
        let config = ingest_config(root.path());
        fs::create_dir_all(&config.raw_dir).unwrap();

        let telegram = single_beam_grammar();
        let scene = SyntheticScene::single_beam(10, 3000, 800);
        let mut log = scene.raw_log(&telegram, "2019-06-12 13:45:01.123");
        log.push_str("this line is garbage\n");
        log.push_str("<ZZZZ>\n");
        fs::write(config.raw_dir.join("raw_data_1.log"), log).unwrap();

        let mut scanner = LogScanner::new(&config);
        let files = scanner.scan().unwrap();

        let mut pipeline = IngestPipeline::new(telegram, 4);
        let rx = pipeline.take_receiver().unwrap();
        let reader = pipeline.spawn_reader(files);
        pipeline.finish();

        let raw_file = rx.recv().await.unwrap();
        reader.await.unwrap();

        assert_eq!(raw_file.measurements.len(), 10);
        assert_eq!(raw_file.skipped_lines, 2);
    }
}
