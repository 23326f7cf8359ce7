//! Full Pipeline Demo
//!
//! Generates a synthetic telegram log, compresses it into an archival block,
//! extracts the vehicle transits, and fans the normalized samples out to a
//! log sink and a file sink.
//!
//! Run with: cargo run --bin full_pipeline

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use archive::{derive_batch_id, ArchiveReader, ArchiveWriter};
use contracts::{
    MeasurementBlock, MeasurementSource, NormalizedSample, NormalizerConfig, SampleNormalizer,
    SinkConfig, SinkType, TelegramConfig,
};
use dispatcher::create_dispatcher;
use ingestion::{IngestPipeline, LogScanner};
use observability::{record_block_metrics, record_span_metrics, ExtractionAggregator};
use segmenter::{ScanningDetector, Segmenter, SyntheticScene};
use tokio::sync::mpsc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

const DEMO_ROOT: &str = "demo_data";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting Full Pipeline Demo");

    let root = Path::new(DEMO_ROOT);
    let raw_dir = root.join("raw_data");
    let archive_dir = root.join("compressed_data");
    let out_dir = root.join("processed_data");
    fs::create_dir_all(&raw_dir)?;

    // ==== Stage 0: Generate a synthetic raw log ====
    // Scanning sensor with 8 beams, three vehicle passes
    let telegram = TelegramConfig {
        expected_fields: 13,
        header_fields: 3,
        trailer_fields: 2,
    };
    let scene = SyntheticScene::scanning(400, 8, 3200, 750)
        .with_pass(60, 14)
        .with_pass(150, 35)
        .with_pass(330, 9);
    fs::write(
        raw_dir.join("raw_data_1.log"),
        scene.raw_log(&telegram, "2019-06-12 13:45:01.123"),
    )?;
    info!(frames = 400, "Synthetic raw log written");

    // ==== Stage 1: Compress raw logs into an archival block ====
    let ingest_config = contracts::IngestConfig {
        raw_dir: raw_dir.clone(),
        archive_dir: archive_dir.clone(),
        file_stem: "raw_data".into(),
        settle_secs: 0,
        delete_consumed: true,
    };

    let mut scanner = LogScanner::new(&ingest_config);
    let files = scanner.scan()?;
    info!(files = files.len(), "Raw files discovered");

    let mut ingest = IngestPipeline::new(telegram, 8);
    let rx = ingest.take_receiver().expect("fresh pipeline");
    let reader = ingest.spawn_reader(files);
    ingest.finish();

    let mut rows = Vec::new();
    let mut consumed = Vec::new();
    let mut clock_digits = None;
    while let Ok(raw_file) = rx.recv().await {
        if clock_digits.is_none() {
            clock_digits = raw_file.clock_digits.clone();
        }
        rows.extend(raw_file.measurements);
        consumed.push(raw_file.path);
    }
    reader.await?;

    let block = MeasurementBlock::new(derive_batch_id(clock_digits.as_deref()), rows);
    let writer = ArchiveWriter::new(&archive_dir)?;
    writer.write_block(&block, vec!["raw_data_1.log".into()], 0)?;
    for path in &consumed {
        fs::remove_file(path)?;
    }
    info!(batch_id = %block.batch_id, rows = block.len(), "Block archived");

    // ==== Stage 2: Extract vehicles and dispatch samples ====
    let mut source = ArchiveReader::open(&archive_dir)?;
    let mut seg = Segmenter::new(3, ScanningDetector::new(1500, 3));
    let normalizer = segmenter::ResampleNormalizer::new(&NormalizerConfig {
        rows: 32,
        cols: 8,
        full_scale: 4000,
    });

    let mut params = HashMap::new();
    params.insert("base_path".to_string(), out_dir.display().to_string());
    let sink_configs = vec![
        SinkConfig {
            name: "debug".to_string(),
            sink_type: SinkType::Log,
            queue_capacity: 32,
            params: HashMap::new(),
        },
        SinkConfig {
            name: "samples".to_string(),
            sink_type: SinkType::File,
            queue_capacity: 32,
            params,
        },
    ];

    let (tx, sample_rx) = mpsc::channel::<NormalizedSample>(32);
    let dispatcher = create_dispatcher(sink_configs, sample_rx).await?;
    let dispatcher_handle = dispatcher.spawn();

    let mut aggregator = ExtractionAggregator::new();
    while let Some(block) = source.next_block()? {
        let spans = seg.process(&block)?;
        record_block_metrics(block.len(), spans.len());
        aggregator.note_block(block.len());

        for span in spans {
            record_span_metrics(&span.meta, span.len());
            aggregator.note_span(&span.meta, span.len());
            info!(
                span = span.meta.span_seq,
                start = span.meta.start_index,
                end = span.meta.end_index,
                partial = span.is_partial(),
                "Vehicle extracted"
            );
            tx.send(normalizer.normalize(&span)?).await?;
        }
    }
    drop(tx);
    dispatcher_handle.await?;

    println!("\n{}", aggregator.summary());
    info!(output = %out_dir.display(), "Demo complete");
    Ok(())
}
