//! Reconcile demo: load cameras, print per-camera pose differences, simulate
//! a click and export a report.
//!
//! Run with: cargo run --example reconcile_demo -- [cameras.json] [validation.json]
//! Without arguments a small built-in data set is used.

use posediff::*;

const SAMPLE_CAMERAS: &str = r#"{
    "status": "success",
    "data": [
        {
            "file_path": "images/frame_0001.png",
            "transform_matrix": [[1,0,0,0],[0,1,0,0],[0,0,1,0],[0,0,0,1]],
            "colmap_transform": [[1,0,0,1],[0,1,0,0],[0,0,1,0],[0,0,0,1]],
            "colmap_id": 1
        },
        {
            "file_path": "images/frame_0002.png",
            "transform_matrix": [[0,0,1,2],[0,1,0,0],[-1,0,0,0],[0,0,0,1]],
            "colmap_transform": [[0,0,1,2.05],[0,1,0,0.01],[-1,0,0,0],[0,0,0,1]],
            "colmap_id": 2
        },
        {
            "file_path": "images/frame_0003.png",
            "transform_matrix": [[1,0,0,-2],[0,1,0,0],[0,0,1,0],[0,0,0,1]],
            "colmap_transform": null
        }
    ]
}"#;

const SAMPLE_VALIDATION: &str = r#"{
    "status": "success",
    "results": [
        {"title": "Image count", "message": "3 images found", "status": "success"},
        {"title": "COLMAP registration", "message": "1 image not registered", "status": "warning",
         "details": {"unregistered": ["images/frame_0003.png"]}}
    ]
}"#;

/// Reference pose for the frame the cameras payload left unregistered.
fn sample_colmap_images() -> Vec<ColmapImage> {
    vec![ColmapImage {
        image_id: 3,
        name: "frame_0003.png".into(),
        qvec: [0.9998, 0.0, 0.0175, 0.0],
        tvec: [-2.02, 0.0, 0.01],
    }]
}

fn main() -> Result<()> {
    init_logging();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let options = Options::default();
    let source = match args.as_slice() {
        [] => JsonDataSource::new(SAMPLE_CAMERAS, Some(SAMPLE_VALIDATION.to_string())),
        [cameras] => JsonDataSource::from_files(cameras, None)?,
        [cameras, validation, ..] => {
            JsonDataSource::from_files(cameras, Some(std::path::Path::new(validation)))?
        }
    }
    .with_options(&options)
    .with_colmap_images(sample_colmap_images());

    let mut engine = ReconciliationEngine::new(options);
    let summary = engine.load_cameras(&source)?;
    println!(
        "{} cameras, {} markers ({} malformed)",
        engine.records().len(),
        summary.created,
        summary.malformed
    );

    if let Err(e) = engine.load_validation(&source) {
        println!("validation unavailable: {e}");
    }

    println!();
    for record in engine.records() {
        let row = CameraSummary::from_record(record);
        println!("{}", row.file_path);
        println!("  reference {} {}", row.reference_position, row.reference_rotation);
        println!("  candidate {} {}", row.candidate_position, row.candidate_rotation);
        match ReconciliationEngine::compute_diff(record) {
            Some(diff) => println!("  {diff}"),
            None => println!("  distance {}", row.distance),
        }
    }

    // Click the middle of an 800x600 viewport after framing the scene.
    engine.resize(800, 600);
    engine.fit_view_to_scene();
    match engine.handle_click(Vec2::new(400.0, 300.0), 800, 600) {
        Some(hit) => println!(
            "\nclicked {} marker of {}",
            hit.coordinate_system, hit.camera_id
        ),
        None => println!("\nclick hit nothing"),
    }
    if let Some(url) = engine.selected_image_url(&source) {
        println!("image: {url}");
    }

    for finding in engine.validation_results() {
        println!(
            "[{}] {}: {}",
            finding.status.alert_level().css_class(),
            finding.title,
            finding.message
        );
    }

    let report = engine.report_snapshot();
    println!("\n{REPORT_FILE_NAME}:\n{}", report.to_json_pretty()?);
    Ok(())
}
