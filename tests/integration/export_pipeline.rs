//! Integration tests for frame export.

use automuse::export::{ExportFormat, ExportPipeline, is_ffmpeg_on_path};
use tempfile::TempDir;

use crate::common::fixtures::{png_frame, rgb_sequence};

fn store_entries(dir: &std::path::Path) -> Vec<String> {
    std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect()
}

#[test]
fn test_zero_frames_fails_without_artifact() {
    let tmp = TempDir::new().unwrap();
    let pipeline = ExportPipeline::new(tmp.path().to_path_buf());

    for format in [ExportFormat::Png, ExportFormat::Gif, ExportFormat::Mp4] {
        let err = pipeline.export(&[], format, "seed", None).unwrap_err();
        assert_eq!(err.kind(), "invalid_input");
    }
    assert!(store_entries(tmp.path()).is_empty());
}

#[test]
fn test_unknown_format_rejected_before_materialization() {
    assert_eq!(
        ExportFormat::parse("tiff").unwrap_err().kind(),
        "invalid_input"
    );
}

#[test]
fn test_single_still_lands_in_store() {
    let tmp = TempDir::new().unwrap();
    let pipeline = ExportPipeline::new(tmp.path().to_path_buf());
    let frame = png_frame(4, [200, 100, 50]);

    let artifact = pipeline
        .export(&[frame.clone()], ExportFormat::Png, "v1", None)
        .unwrap();

    assert!(artifact.starts_with("v1-"));
    assert!(artifact.ends_with(".png"));
    assert_eq!(std::fs::read(tmp.path().join(&artifact)).unwrap(), frame);
}

#[test]
fn test_archive_contains_every_frame_in_order() {
    let tmp = TempDir::new().unwrap();
    let pipeline = ExportPipeline::new(tmp.path().to_path_buf());
    let frames = rgb_sequence(4);

    let artifact = pipeline
        .export(&frames, ExportFormat::Png, "v1", None)
        .unwrap();
    assert!(artifact.ends_with(".zip"));

    let file = std::fs::File::open(tmp.path().join(&artifact)).unwrap();
    let mut archive = zip::ZipArchive::new(file).unwrap();
    assert_eq!(archive.len(), frames.len());

    // Sorted entry names reproduce input order, and each entry holds the
    // exact bytes that went in.
    use std::io::Read;
    let mut names: Vec<String> = archive.file_names().map(String::from).collect();
    names.sort();
    for (i, name) in names.iter().enumerate() {
        let mut bytes = Vec::new();
        archive.by_name(name).unwrap().read_to_end(&mut bytes).unwrap();
        assert_eq!(bytes, frames[i], "entry {name} does not match frame {i}");
    }
}

#[test]
fn test_gif_preserves_playback_order() {
    if !is_ffmpeg_on_path() {
        eprintln!("skipping: ffmpeg not on PATH");
        return;
    }

    let tmp = TempDir::new().unwrap();
    let pipeline = ExportPipeline::new(tmp.path().to_path_buf());
    let frames = rgb_sequence(8);

    let artifact = pipeline
        .export(&frames, ExportFormat::Gif, "v1", Some(5))
        .unwrap();

    use image::AnimationDecoder;
    let file = std::fs::File::open(tmp.path().join(&artifact)).unwrap();
    let decoder = image::codecs::gif::GifDecoder::new(std::io::BufReader::new(file)).unwrap();
    let decoded: Vec<_> = decoder.into_frames().collect_frames().unwrap();
    assert_eq!(decoded.len(), 3);

    // Red, then green, then blue: the dominant channel of each decoded
    // frame must follow the input order exactly.
    for (i, frame) in decoded.iter().enumerate() {
        let px = frame.buffer().get_pixel(1, 1).0;
        let dominant = (0..3).max_by_key(|&c| px[c]).unwrap();
        assert_eq!(dominant, i, "frame {i} decoded as {px:?}");
    }
}

#[test]
fn test_mp4_export_succeeds_with_even_dimensions() {
    if !is_ffmpeg_on_path() {
        eprintln!("skipping: ffmpeg not on PATH");
        return;
    }

    let tmp = TempDir::new().unwrap();
    let pipeline = ExportPipeline::new(tmp.path().to_path_buf());
    let frames = rgb_sequence(16);

    let artifact = pipeline
        .export(&frames, ExportFormat::Mp4, "v1", Some(12))
        .unwrap();
    assert!(artifact.ends_with(".mp4"));
    assert!(std::fs::metadata(tmp.path().join(&artifact)).unwrap().len() > 0);

    // Only the artifact lands in the store; scratch files never leak in.
    let entries = store_entries(tmp.path());
    assert_eq!(entries, vec![artifact]);
}

#[test]
fn test_concurrent_exports_do_not_collide() {
    let tmp = TempDir::new().unwrap();
    let pipeline = std::sync::Arc::new(ExportPipeline::new(tmp.path().to_path_buf()));

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let pipeline = std::sync::Arc::clone(&pipeline);
            std::thread::spawn(move || {
                let frame = png_frame(4, [i as u8 * 60, 0, 0]);
                pipeline.export(&[frame], ExportFormat::Png, &format!("job{i}"), None)
            })
        })
        .collect();

    let mut artifacts: Vec<String> = handles
        .into_iter()
        .map(|h| h.join().unwrap().unwrap())
        .collect();
    artifacts.sort();
    artifacts.dedup();
    assert_eq!(artifacts.len(), 4);
}
