use crate::error::AppError;
use crate::models::classify_types::{round2, Prediction};
use crate::models::fruit_types::FruitClass;
use crate::services::classifier::model_manager::OnnxSession;
use image::ImageReader;
use ndarray::Array4;
use ort::value::Value;
use std::collections::BTreeMap;
use std::io::Cursor;

/// Side length the network was trained on.
pub const INPUT_SIZE: u32 = 224;

// Tolerance when deciding whether the model already emits a distribution.
const DISTRIBUTION_TOLERANCE: f32 = 1e-3;

/// Decodes uploaded bytes into a `[1, size, size, 3]` tensor with values in `[0, 1]`.
pub fn preprocess_bytes(bytes: &[u8], size: u32) -> Result<Array4<f32>, AppError> {
    let img = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| AppError {
            message: format!("Failed to read image: {}", e),
        })?
        .decode()
        .map_err(|e| AppError {
            message: format!("Failed to decode image: {}", e),
        })?;

    let rgb = img.to_rgb8();
    let resized = image::imageops::resize(&rgb, size, size, image::imageops::FilterType::Triangle);

    // NHWC layout, the interleaved RGB buffer maps onto it directly.
    let data: Vec<f32> = resized
        .into_raw()
        .into_iter()
        .map(|v| v as f32 / 255.0)
        .collect();

    let tensor = Array4::from_shape_vec((1, size as usize, size as usize, 3), data).map_err(|e| {
        AppError {
            message: format!("Failed to create tensor: {}", e),
        }
    })?;

    Ok(tensor)
}

/// Runs one forward pass and returns the raw output scores.
pub fn run_inference_with_model(
    model: &mut OnnxSession,
    input: Array4<f32>,
) -> Result<Vec<f32>, AppError> {
    let input_name = model.inputs()[0].name().to_string();

    let input_tensor = Value::from_array(input)
        .map_err(|e| AppError { message: format!("Failed to create tensor value: {}", e) })?;

    let outputs = model
        .run(ort::inputs![input_name.as_str() => input_tensor])
        .map_err(|e| AppError {
            message: format!("Inference failed: {}", e),
        })?;

    let output_value = outputs
        .values()
        .next()
        .ok_or_else(|| AppError {
            message: "Model produced no outputs".to_string(),
        })?;

    let (_, data) = output_value
        .try_extract_tensor::<f32>()
        .map_err(|e| AppError {
            message: format!("Failed to extract output tensor: {}", e),
        })?;

    Ok(data.to_vec())
}

/// Returns `scores` unchanged when they already form a probability
/// distribution, otherwise their softmax.
pub fn to_probabilities(scores: &[f32]) -> Vec<f32> {
    let in_range = scores.iter().all(|&x| (0.0..=1.0).contains(&x));
    let sum: f32 = scores.iter().sum();
    if in_range && (sum - 1.0).abs() <= DISTRIBUTION_TOLERANCE {
        return scores.to_vec();
    }

    let max_logit = scores.iter().fold(f32::NEG_INFINITY, |a, &b| a.max(b));
    let exp_sum: f32 = scores.iter().map(|&x| (x - max_logit).exp()).sum();
    scores
        .iter()
        .map(|&x| (x - max_logit).exp() / exp_sum)
        .collect()
}

/// Highest-probability class. Ties resolve to the lower index.
pub fn top_prediction(probabilities: &[f32], labels: &[FruitClass]) -> Option<Prediction> {
    let mut best: Option<(usize, f32)> = None;
    for (idx, &p) in probabilities.iter().enumerate() {
        if best.map_or(true, |(_, b)| p > b) {
            best = Some((idx, p));
        }
    }
    let (idx, probability) = best?;
    labels.get(idx).map(|&class| Prediction { class, probability })
}

/// Prediction plus per-class percentages, each rounded to two decimals.
#[derive(Debug, Clone)]
pub struct Scored {
    pub predicted: FruitClass,
    pub confidence: f64,
    pub all_probabilities: BTreeMap<String, f64>,
}

pub fn score(probabilities: &[f32], labels: &[FruitClass]) -> Result<Scored, AppError> {
    if probabilities.len() != labels.len() {
        return Err(format!(
            "Model produced {} scores for {} labels",
            probabilities.len(),
            labels.len()
        )
        .into());
    }

    let top = top_prediction(probabilities, labels).ok_or("Model produced no scores")?;

    let all_probabilities = labels
        .iter()
        .zip(probabilities)
        .map(|(class, &p)| (class.label().to_string(), round2(p as f64 * 100.0)))
        .collect();

    Ok(Scored {
        predicted: top.class,
        confidence: round2(top.probability as f64 * 100.0),
        all_probabilities,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage, Rgba, RgbaImage};

    fn encode_png(img: &image::DynamicImage) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, image::ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    #[test]
    fn preprocess_shape_and_range() {
        let img = image::DynamicImage::ImageRgb8(RgbImage::from_pixel(640, 480, Rgb([255, 0, 51])));
        let tensor = preprocess_bytes(&encode_png(&img), INPUT_SIZE).unwrap();
        assert_eq!(tensor.shape(), &[1, 224, 224, 3]);
        assert!((tensor[[0, 10, 10, 0]] - 1.0).abs() < 1e-6);
        assert!(tensor[[0, 10, 10, 1]].abs() < 1e-6);
        assert!((tensor[[0, 100, 200, 2]] - 0.2).abs() < 1e-6);
    }

    #[test]
    fn preprocess_drops_alpha_channel() {
        let img = image::DynamicImage::ImageRgba8(RgbaImage::from_pixel(50, 50, Rgba([0, 255, 0, 10])));
        let tensor = preprocess_bytes(&encode_png(&img), INPUT_SIZE).unwrap();
        assert_eq!(tensor.shape()[3], 3);
        assert!((tensor[[0, 0, 0, 1]] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn preprocess_rejects_garbage() {
        assert!(preprocess_bytes(b"plain text, not pixels", INPUT_SIZE).is_err());
    }

    #[test]
    fn distribution_passes_through() {
        let p = to_probabilities(&[0.1, 0.7, 0.2]);
        assert_eq!(p, vec![0.1, 0.7, 0.2]);
    }

    #[test]
    fn logits_get_softmax() {
        let p = to_probabilities(&[2.0, 1.0, -3.0]);
        let sum: f32 = p.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);
        assert!(p[0] > p[1] && p[1] > p[2]);
    }

    #[test]
    fn score_picks_argmax_and_rounds() {
        let scored = score(&[0.05, 0.123456, 0.826544], &FruitClass::ALL).unwrap();
        assert_eq!(scored.predicted, FruitClass::Namnam);
        assert_eq!(scored.confidence, 82.65);
        assert_eq!(scored.all_probabilities.len(), 3);
        assert_eq!(scored.all_probabilities["Kupa"], 5.0);
        assert_eq!(scored.all_probabilities["Matoa"], 12.35);
    }

    #[test]
    fn score_rejects_length_mismatch() {
        assert!(score(&[0.5, 0.5], &FruitClass::ALL).is_err());
    }

    #[test]
    fn ties_resolve_to_first_label() {
        let top = top_prediction(&[0.4, 0.4, 0.2], &FruitClass::ALL).unwrap();
        assert_eq!(top.class, FruitClass::Kupa);
    }
}
