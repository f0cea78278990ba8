use std::io::Cursor;

use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb, RgbImage};
use imgc::{
    KMeansConfig, PointSet, QuantizeError, Seeding, Stopwatch, cluster, materialize, quantize_bytes,
    quantize_image, to_image, to_samples,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn scenario_image() -> RgbImage {
    let pixels = [[10, 20, 30], [40, 50, 60], [70, 80, 90], [100, 110, 120]];
    ImageBuffer::from_fn(2, 2, |x, y| Rgb(pixels[(y * 2 + x) as usize]))
}

fn striped_image(colours: &[[u8; 3]], w: u32, h: u32) -> RgbImage {
    ImageBuffer::from_fn(w, h, |x, y| Rgb(colours[((x + 3 * y) as usize) % colours.len()]))
}

fn gradient_image(w: u32, h: u32) -> RgbImage {
    ImageBuffer::from_fn(w, h, |x, y| {
        Rgb([(x * 255 / w) as u8, (y * 255 / h) as u8, ((x + y) * 127 / (w + h)) as u8])
    })
}

#[test]
fn two_by_two_scenario_restores_every_pixel() {
    let img = scenario_image();
    let samples = to_samples(&DynamicImage::ImageRgb8(img.clone())).unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(2024);
    let res = cluster(&samples, 4, &KMeansConfig::default(), &mut rng).unwrap();

    let mut centroids = res.centroids.clone();
    centroids.sort_by(|a, b| a[0].total_cmp(&b[0]));
    for (c, px) in centroids.iter().zip(img.pixels()) {
        for ch in 0..3 {
            assert!((c[ch] - px[ch] as f32).abs() < 1e-3);
        }
    }

    let restored = to_image(&materialize(&samples, &res).unwrap(), 2, 2).unwrap();
    assert_eq!(restored, img);
}

#[test]
fn few_colours_survive_quantization_unchanged() {
    let colours = [[255, 0, 0], [0, 255, 0], [0, 0, 255], [17, 17, 17], [250, 240, 230]];
    let img = striped_image(&colours, 24, 16);

    for k in [5, 8, 32] {
        let mut rng = ChaCha8Rng::seed_from_u64(k as u64);
        let out = quantize_image(
            &DynamicImage::ImageRgb8(img.clone()),
            k,
            &KMeansConfig::default(),
            &mut rng,
            &mut (),
        )
        .unwrap();
        assert_eq!(out.image, img, "k = {k}");
        assert_eq!(out.result.compactness, 0.0);
    }
}

#[test]
fn output_uses_at_most_k_colours() {
    let img = gradient_image(40, 30);
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    let out = quantize_image(
        &DynamicImage::ImageRgb8(img.clone()),
        6,
        &KMeansConfig::default(),
        &mut rng,
        &mut (),
    )
    .unwrap();

    assert_eq!(out.image.dimensions(), img.dimensions());
    assert_eq!(out.result.assignments.len(), 40 * 30);
    assert_eq!(out.result.centroids.len(), 6);

    let mut distinct: Vec<[u8; 3]> = out.image.pixels().map(|p| p.0).collect();
    distinct.sort_unstable();
    distinct.dedup();
    assert!(distinct.len() <= 6);
    assert!(out.result.compactness > 0.0);
}

#[test]
fn seeded_runs_are_identical() {
    let img = DynamicImage::ImageRgb8(gradient_image(32, 32));
    let config = KMeansConfig::default().with_attempts(4);

    let a = quantize_image(&img, 8, &config, &mut ChaCha8Rng::seed_from_u64(1), &mut ()).unwrap();
    let b = quantize_image(&img, 8, &config, &mut ChaCha8Rng::seed_from_u64(1), &mut ()).unwrap();
    assert_eq!(a.result, b.result);
    assert_eq!(a.image, b.image);
}

#[test]
fn uniform_seeding_still_produces_valid_result() {
    let samples = to_samples(&DynamicImage::ImageRgb8(gradient_image(20, 20))).unwrap();
    let config = KMeansConfig::default().with_seeding(Seeding::Uniform);
    let res = cluster(&samples, 10, &config, &mut ChaCha8Rng::seed_from_u64(3)).unwrap();
    assert_eq!(res.assignments.len(), samples.len());
    assert!(res.assignments.iter().all(|&a| a < 10));
}

#[test]
fn boundary_inputs_are_rejected() {
    let samples = to_samples(&DynamicImage::ImageRgb8(scenario_image())).unwrap();
    let config = KMeansConfig::default();
    let mut rng = ChaCha8Rng::seed_from_u64(0);

    for k in [1, 257] {
        assert!(matches!(
            cluster(&samples, k, &config, &mut rng),
            Err(QuantizeError::InvalidInput(_))
        ));
    }
    assert!(matches!(
        cluster(&PointSet::new(Vec::new()), 2, &config, &mut rng),
        Err(QuantizeError::InvalidInput(_))
    ));
    assert!(matches!(to_image(&samples, 3, 2), Err(QuantizeError::InvalidInput(_))));
}

#[test]
fn timer_sees_core_phases() {
    let mut sw = Stopwatch::new();
    quantize_image(
        &DynamicImage::ImageRgb8(gradient_image(8, 8)),
        3,
        &KMeansConfig::default(),
        &mut ChaCha8Rng::seed_from_u64(0),
        &mut sw,
    )
    .unwrap();
    assert_eq!(sw.events().len(), 3);
}

#[test]
fn bytes_round_trip_with_fixed_seed() {
    let img = gradient_image(16, 12);
    let mut png = Vec::new();
    img.write_to(&mut Cursor::new(&mut png), ImageFormat::Png).unwrap();

    let config = KMeansConfig::default();
    let a = quantize_bytes(&png, 4, &config, 90, Some(11)).unwrap();
    let b = quantize_bytes(&png, 4, &config, 90, Some(11)).unwrap();

    assert_eq!(a.seed, 11);
    assert_eq!(a.jpeg, b.jpeg);
    assert_eq!(a.palette, b.palette);
    assert_eq!(a.palette.len(), 4);

    let decoded = image::load_from_memory(&a.jpeg).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (16, 12));
}

#[test]
fn undecodable_bytes_are_a_resource_failure() {
    let err = quantize_bytes(b"nope", 4, &KMeansConfig::default(), 90, Some(1)).unwrap_err();
    assert!(matches!(err, QuantizeError::ResourceFailure(_)));
}
