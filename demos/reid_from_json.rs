use indicatif::{ProgressBar, ProgressStyle};
use reidtrack_rs::{
    Detector, IdentityEvent, Object, PassThrough, Pipeline, Rect, ReidConfig,
    ReidTracker, TrackError,
};
use serde::Deserialize;
use std::{
    env,
    error::Error,
    ffi::OsStr,
    fs,
    path::{Path, PathBuf},
};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Deserialize)]
struct Detection {
    x1: f32,
    y1: f32,
    x2: f32,
    y2: f32,
    score: f32,
    class_id: Option<usize>,
}

/// Detector that replays one json file of detections per frame.
struct JsonReplay {
    files: Vec<PathBuf>,
    cursor: usize,
}

impl Detector for JsonReplay {
    fn detect(&mut self, _frame: &image::RgbImage) -> Result<Vec<Object>, TrackError> {
        let path = self
            .files
            .get(self.cursor)
            .ok_or_else(|| TrackError::Detector("ran out of detection files".to_string()))?;
        self.cursor += 1;

        let data = fs::read_to_string(path)?;
        let detections: Vec<Detection> = serde_json::from_str(&data)
            .map_err(|e| TrackError::Detector(format!("{}: {}", path.display(), e)))?;
        Ok(detections_to_objects(detections))
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().collect();
    if args.iter().any(|arg| arg == "-h" || arg == "--help") {
        print_usage();
        return Ok(());
    }

    let inputs_dir = args
        .get(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data/frames"));
    let detections_dir = args
        .get(2)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data/detections"));
    let config = match args.get(3) {
        Some(path) => ReidConfig::from_json_file(path)?,
        None => ReidConfig::default(),
    };
    let max_frames = args
        .get(4)
        .and_then(|value| value.parse::<usize>().ok())
        .unwrap_or(0);

    let mut json_files = list_json_files(&detections_dir)?;
    if json_files.is_empty() {
        return Err(format!(
            "No json files found in {}",
            detections_dir.display()
        )
        .into());
    }
    if max_frames > 0 && max_frames < json_files.len() {
        json_files.truncate(max_frames);
    }

    let total_frames = json_files.len();
    let detector = JsonReplay {
        files: json_files.clone(),
        cursor: 0,
    };
    let mut pipeline = Pipeline::new(detector, PassThrough, ReidTracker::new(config)?);

    let progress = ProgressBar::new(total_frames as u64);
    let style = ProgressStyle::with_template(
        "[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}",
    )?
    .progress_chars("=>-");
    progress.set_style(style);
    progress.set_message("tracking");

    let mut reidentified = 0usize;
    for json_path in json_files.iter() {
        let stem = json_path
            .file_stem()
            .and_then(OsStr::to_str)
            .ok_or("Invalid json filename")?;
        let image_path = inputs_dir.join(format!("{stem}.jpg"));
        if !image_path.exists() {
            return Err(format!(
                "Missing image for {stem}: {}",
                image_path.display()
            )
            .into());
        }

        let frame = image::open(&image_path)?.into_rgb8();
        let output = pipeline.process_frame(&frame)?;

        for event in output.events.iter() {
            if let IdentityEvent::Reidentified { id, score, frames_lost } = event {
                reidentified += 1;
                progress.println(format!(
                    "frame {}: id {} re-identified after {} frames (score {:.3})",
                    output.frame_id, id, frames_lost, score
                ));
            }
        }
        progress.inc(1);
    }

    progress.finish_with_message("done");
    let tracker = pipeline.tracker();
    println!("Frames processed:    {}", tracker.frame_count());
    println!("Identities created:  {}", tracker.next_id());
    println!("Re-identifications:  {}", reidentified);
    println!("Active at end:       {:?}", tracker.active_ids());
    println!("Lost at end:         {:?}", tracker.lost_ids());

    Ok(())
}

fn print_usage() {
    println!(
        "Usage: cargo run --example reid_from_json [inputs_dir] [detections_dir] [config_json] [max_frames]\n\
Defaults:\n\
  inputs_dir: data/frames (one <stem>.jpg per frame)\n\
  detections_dir: data/detections (one <stem>.json per frame)\n\
  config_json: built-in defaults\n\
  max_frames: 0 (all)\n\
Set RUST_LOG=reidtrack_rs=debug to see per-detection decisions."
    );
}

fn list_json_files(dir: &Path) -> Result<Vec<PathBuf>, Box<dyn Error>> {
    let mut jsons = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().and_then(OsStr::to_str) == Some("json") {
            jsons.push(path);
        }
    }
    jsons.sort();
    Ok(jsons)
}

fn detections_to_objects(detections: Vec<Detection>) -> Vec<Object> {
    detections
        .into_iter()
        .map(|det| {
            let rect = Rect::from_xyxy(det.x1, det.y1, det.x2, det.y2);
            let object = Object::new(rect, Some(det.score), None);
            match det.class_id {
                Some(class_id) => object.with_class(class_id),
                None => object,
            }
        })
        .collect()
}
