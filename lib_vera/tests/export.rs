mod common;

use std::fs;

use common::{gray_palette, sample_image, tile_numbers};
use lib_vera::codec::palette::PaletteError;
use lib_vera::{
    AssetWriter, BitDepth, ExportConfig, ExportError, ExportMode, ExportPlan, PackOptions,
    RasterImage, Rgb, Traversal,
};

fn attribute<'a>(xml: &'a str, name: &str) -> &'a str {
    let key = format!(" {}=\"", name);
    let start = xml.find(&key).expect("attribute present") + key.len();
    let end = start + xml[start..].find('"').expect("closing quote");
    &xml[start..end]
}

fn descriptor_plan() -> ExportPlan {
    ExportPlan {
        emit_descriptor: true,
        ..ExportPlan::default()
    }
}

#[test]
fn test_tile_sheet_with_banked_descriptors() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().join("tiles.bin");
    let image = sample_image(16, 16);

    let report = AssetWriter::default()
        .export(&image, &PackOptions::default(), &descriptor_plan(), &base)
        .unwrap();

    assert_eq!(fs::read(&base).unwrap().len(), 2 + 16 * 16 / 2);
    assert_eq!(fs::read(base.with_extension("bin.PAL")).unwrap().len(), 2 + 256 * 2);

    for bank in 0..16 {
        let tsx = dir.path().join(format!("tiles.bin.{}.tsx", bank));
        let xml = fs::read_to_string(&tsx).unwrap();
        assert_eq!(attribute(&xml, "tilecount"), "4");
        assert_eq!(attribute(&xml, "columns"), "2");
        assert_eq!(attribute(&xml, "tilewidth"), "8");
        assert_eq!(attribute(&xml, "source"), format!("tiles.bin.{}.png", bank));
        assert_eq!(attribute(&xml, "trans"), "000000");
        assert!(dir.path().join(format!("tiles.bin.{}.png", bank)).exists());
        assert!(dir.path().join(format!("tiles.bin.{}.PAL", bank)).exists());
    }

    let geometry = report.geometry.unwrap();
    assert_eq!((geometry.tile_count, geometry.columns), (4, 2));
}

#[test]
fn test_banks_are_written_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().join("font");
    let plan = ExportPlan {
        emit_palette: false,
        emit_descriptor: true,
        ..ExportPlan::default()
    };

    let report = AssetWriter::default()
        .export(&sample_image(16, 16), &PackOptions::default(), &plan, &base)
        .unwrap();

    let names: Vec<String> = report
        .written
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names.len(), 1 + 16 * 2);
    assert_eq!(names[0], "font");
    for bank in 0..16 {
        assert_eq!(names[1 + bank * 2], format!("font.{}.png", bank));
        assert_eq!(names[2 + bank * 2], format!("font.{}.tsx", bank));
    }
}

#[test]
fn test_bank_palettes_are_rotated() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().join("tiles");
    let palette: Vec<Rgb> = (0..32).map(|i| Rgb::new(i * 8, 0, 0)).collect();
    let image = RasterImage::new(8, 8, vec![1; 64], Some(palette));
    let config = ExportConfig {
        bank_count: 2,
        ..ExportConfig::default()
    };

    AssetWriter::new(config)
        .export(&image, &PackOptions::default(), &descriptor_plan(), &base)
        .unwrap();

    let bank0 = fs::read(dir.path().join("tiles.0.PAL")).unwrap();
    let bank1 = fs::read(dir.path().join("tiles.1.PAL")).unwrap();
    assert_eq!(&bank0[..2], &[0, 0]);
    // Entry 0 of bank 1 is color 16: r = 128 -> 0x08.
    assert_eq!(&bank1[2..4], &[0x00, 0x08]);
    assert_eq!(&bank0[2..4], &[0x00, 0x00]);
    assert!(!dir.path().join("tiles.2.tsx").exists());
}

#[test]
fn test_single_descriptor_for_other_depths() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().join("sprites");
    let image = RasterImage::new(16, 8, tile_numbers(16, 8, 8), Some(gray_palette(4)));
    let options = PackOptions::new(2, 8, 8, Traversal::TileMajor).unwrap();

    let report = AssetWriter::default()
        .export(&image, &options, &descriptor_plan(), &base)
        .unwrap();

    assert_eq!(report.written.len(), 4);
    assert_eq!(fs::read(&base).unwrap().len(), 2 + 16 * 8 / 4);
    let xml = fs::read_to_string(dir.path().join("sprites.tsx")).unwrap();
    assert_eq!(attribute(&xml, "name"), "sprites");
    assert_eq!(attribute(&xml, "source"), "sprites.png");
    assert_eq!(attribute(&xml, "tilecount"), "2");
    assert_eq!(attribute(&xml, "width"), "16");
    assert_eq!(attribute(&xml, "height"), "8");
    assert!(dir.path().join("sprites.png").exists());
    assert!(!dir.path().join("sprites.0.tsx").exists());
}

#[test]
fn test_bitmap_mode_needs_no_alignment() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().join("splash");
    let image = RasterImage::new(10, 3, vec![1; 30], Some(gray_palette(2)));
    let options = PackOptions {
        bit_depth: BitDepth::One,
        ..PackOptions::default()
    };
    let plan = ExportPlan {
        mode: ExportMode::Bitmap,
        ..ExportPlan::default()
    };

    let report = AssetWriter::default()
        .export(&image, &options, &plan, &base)
        .unwrap();

    let bytes = fs::read(&base).unwrap();
    assert_eq!(bytes.len(), 2 + 4);
    assert_eq!(bytes, vec![0x00, 0x00, 0xFF, 0xFF, 0xFF, 0xFC]);
    assert!(report.geometry.is_none());
    assert_eq!(fs::read(dir.path().join("splash.PAL")).unwrap().len(), 2 + 4);
}

#[test]
fn test_bitmap_mode_descriptor_still_needs_whole_tiles() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().join("splash");
    let image = RasterImage::new(10, 8, vec![0; 80], None);
    let plan = ExportPlan {
        mode: ExportMode::Bitmap,
        emit_descriptor: true,
        ..ExportPlan::default()
    };

    let result = AssetWriter::default().export(&image, &PackOptions::default(), &plan, &base);
    assert!(matches!(result, Err(ExportError::Geometry(_))));
    assert!(!base.exists());
}

#[test]
fn test_missing_palette_skips_palette_files() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().join("mask");
    let image = RasterImage::new(8, 8, vec![1; 64], None);
    let options = PackOptions {
        bit_depth: BitDepth::One,
        ..PackOptions::default()
    };

    let report = AssetWriter::default()
        .export(&image, &options, &descriptor_plan(), &base)
        .unwrap();

    assert_eq!(report.written, vec![base.clone(), dir.path().join("mask.tsx")]);
    assert!(!dir.path().join("mask.PAL").exists());
}

#[test]
fn test_banked_export_without_palette_fails_after_binary() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().join("tiles");
    let image = RasterImage::new(8, 8, vec![0; 64], None);

    let result =
        AssetWriter::default().export(&image, &PackOptions::default(), &descriptor_plan(), &base);

    assert!(matches!(
        result,
        Err(ExportError::Palette(PaletteError::EmptyPalette))
    ));
    // Already written artifacts are left in place.
    assert!(base.exists());
    assert!(!dir.path().join("tiles.0.tsx").exists());
}

#[test]
fn test_unwritable_path_stops_export() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().join("no-such-dir").join("tiles");

    let result = AssetWriter::default().export(
        &sample_image(16, 16),
        &PackOptions::default(),
        &descriptor_plan(),
        &base,
    );

    match result {
        Err(ExportError::Io { path, .. }) => assert_eq!(path, base),
        other => panic!("expected an io error, got {:?}", other),
    }
    assert!(!dir.path().join("no-such-dir").exists());
}

#[test]
fn test_indices_must_fit_depth() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().join("tiles");
    let mut pixels = vec![0u8; 64];
    pixels[10] = 4;
    let image = RasterImage::new(8, 8, pixels, Some(gray_palette(16)));
    let options = PackOptions {
        bit_depth: BitDepth::Two,
        ..PackOptions::default()
    };

    let result = AssetWriter::default().export(&image, &options, &ExportPlan::default(), &base);

    assert!(matches!(
        result,
        Err(ExportError::IndexOutOfRange {
            position: 10,
            index: 4,
            bits: 2
        })
    ));
    assert!(!base.exists());
}

#[test]
fn test_indices_must_exist_in_palette() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().join("tiles");
    let image = RasterImage::new(8, 8, vec![3; 64], Some(gray_palette(2)));

    let result = AssetWriter::default().export(
        &image,
        &PackOptions::default(),
        &ExportPlan::default(),
        &base,
    );

    assert!(matches!(
        result,
        Err(ExportError::UnmappedIndex {
            index: 3,
            palette_size: 2,
            ..
        })
    ));
}

#[test]
fn test_bitmap_extension_selects_encoder() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().join("sprites");
    let image = RasterImage::new(16, 8, tile_numbers(16, 8, 8), Some(gray_palette(4)));
    let options = PackOptions::new(2, 8, 8, Traversal::TileMajor).unwrap();
    let config = ExportConfig {
        bitmap_extension: "bmp".to_string(),
        ..ExportConfig::default()
    };

    AssetWriter::new(config)
        .export(&image, &options, &descriptor_plan(), &base)
        .unwrap();

    let bitmap = fs::read(dir.path().join("sprites.bmp")).unwrap();
    assert_eq!(&bitmap[..2], b"BM");
    let xml = fs::read_to_string(dir.path().join("sprites.tsx")).unwrap();
    assert_eq!(attribute(&xml, "source"), "sprites.bmp");
}

#[test]
fn test_unknown_bitmap_extension_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().join("tiles");
    let config = ExportConfig {
        bitmap_extension: "xyz".to_string(),
        ..ExportConfig::default()
    };

    let result = AssetWriter::new(config).export(
        &sample_image(16, 16),
        &PackOptions::default(),
        &descriptor_plan(),
        &base,
    );

    match result {
        Err(ExportError::Render { path, .. }) => assert_eq!(path, base.with_extension("xyz")),
        other => panic!("expected a render error, got {:?}", other),
    }
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}
