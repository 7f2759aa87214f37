//! OpenCV Haar cascade provider.

use std::path::Path;
use std::sync::Mutex;

use opencv::core::{Mat, Rect, Size, Vector};
use opencv::imgcodecs::{imdecode, IMREAD_COLOR};
use opencv::imgproc::{cvt_color, COLOR_BGR2GRAY};
use opencv::objdetect::CascadeClassifier;
use opencv::prelude::*;
use smartsession_models::BoundingBox;
use tracing::{debug, info};

use super::FaceProvider;
use crate::config::VisionConfig;
use crate::error::{VisionError, VisionResult};
use crate::frame::Frame;

const SCALE_FACTOR: f64 = 1.1;
const MIN_NEIGHBORS: i32 = 5;
const MIN_FACE_SIZE: i32 = 60;
const MIN_EYE_SIZE: i32 = 20;

/// Haar cascade face and eye detector.
///
/// `CascadeClassifier::detect_multi_scale` takes `&mut self`, so each
/// classifier sits behind its own mutex.
pub struct HaarCascadeProvider {
    face_cascade: Mutex<CascadeClassifier>,
    eye_cascade: Mutex<CascadeClassifier>,
}

impl HaarCascadeProvider {
    /// Load both cascades. Fails if the face cascade is missing or empty.
    pub fn new(config: &VisionConfig) -> VisionResult<Self> {
        let face_cascade = load_cascade(&config.face_cascade_path)?;
        let eye_cascade = load_cascade(&config.eye_cascade_path)?;

        info!(
            face = %config.face_cascade_path,
            eye = %config.eye_cascade_path,
            "Haar cascades loaded"
        );

        Ok(Self {
            face_cascade: Mutex::new(face_cascade),
            eye_cascade: Mutex::new(eye_cascade),
        })
    }

    fn decode_gray(frame: &Frame) -> VisionResult<Mat> {
        let buf = Vector::<u8>::from_slice(frame.as_bytes());
        let color = imdecode(&buf, IMREAD_COLOR)?;
        if color.rows() == 0 || color.cols() == 0 {
            return Err(VisionError::invalid_frame("image could not be decoded"));
        }
        let mut gray = Mat::default();
        cvt_color(&color, &mut gray, COLOR_BGR2GRAY, 0)?;
        Ok(gray)
    }

    fn try_detect_faces(&self, frame: &Frame) -> VisionResult<Vec<BoundingBox>> {
        let gray = Self::decode_gray(frame)?;
        let mut cascade = self.face_cascade.lock().unwrap_or_else(|e| e.into_inner());
        detect(&mut cascade, &gray, MIN_FACE_SIZE)
    }

    fn try_detect_eyes(&self, frame: &Frame, face: &BoundingBox) -> VisionResult<Vec<BoundingBox>> {
        let gray = Self::decode_gray(frame)?;
        let Some(rect) = clamp_rect(face, gray.cols(), gray.rows()) else {
            return Ok(Vec::new());
        };
        let roi = Mat::roi(&gray, rect)?.try_clone()?;
        let mut cascade = self.eye_cascade.lock().unwrap_or_else(|e| e.into_inner());
        detect(&mut cascade, &roi, MIN_EYE_SIZE)
    }
}

impl FaceProvider for HaarCascadeProvider {
    fn detect_faces(&self, frame: &Frame) -> Vec<BoundingBox> {
        self.try_detect_faces(frame).unwrap_or_else(|e| {
            debug!("Face detection returned nothing: {}", e);
            Vec::new()
        })
    }

    fn detect_eyes(&self, frame: &Frame, face: &BoundingBox) -> Vec<BoundingBox> {
        self.try_detect_eyes(frame, face).unwrap_or_else(|e| {
            debug!("Eye detection returned nothing: {}", e);
            Vec::new()
        })
    }

    fn name(&self) -> &'static str {
        "haar_cascade"
    }
}

fn load_cascade(path: &str) -> VisionResult<CascadeClassifier> {
    if !Path::new(path).exists() {
        return Err(VisionError::model_not_found(path));
    }
    let cascade = CascadeClassifier::new(path)?;
    if cascade.empty()? {
        return Err(VisionError::backend(format!("failed to load cascade classifier: {}", path)));
    }
    Ok(cascade)
}

fn detect(cascade: &mut CascadeClassifier, gray: &Mat, min_size: i32) -> VisionResult<Vec<BoundingBox>> {
    let mut objects = Vector::<Rect>::new();
    cascade.detect_multi_scale(
        gray,
        &mut objects,
        SCALE_FACTOR,
        MIN_NEIGHBORS,
        0,
        Size::new(min_size, min_size),
        Size::new(0, 0),
    )?;

    Ok(objects
        .iter()
        .map(|r| BoundingBox::new(r.x as f64, r.y as f64, r.width as f64, r.height as f64))
        .collect())
}

/// Integer rect for `face`, clipped to the frame; `None` if nothing is left.
fn clamp_rect(face: &BoundingBox, cols: i32, rows: i32) -> Option<Rect> {
    let x = (face.x.max(0.0) as i32).min(cols);
    let y = (face.y.max(0.0) as i32).min(rows);
    let w = ((face.x + face.width) as i32).min(cols) - x;
    let h = ((face.y + face.height) as i32).min(rows) - y;
    (w > 0 && h > 0).then(|| Rect::new(x, y, w, h))
}
