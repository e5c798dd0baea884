//! Tests for catalogue lookup and missing-asset reporting

use super::*;
use crate::capture::{Fingerprint, Rect};
use image::{Rgb, RgbImage};

const CATALOGUE: &str = r#"
[Main.Button_AnchorAweigh]
rect = [[1600, 900], [1800, 1000]]
eigen = [[1650, 950, 0xF8D858], [1700, 930, 0xFFFFFF]]

[Main.Icon_Resources.Icon_Oil]
eigen = [[100, 20, 0x303030]]

[Campaign.Button_Automation]
image = "auto_on.png"
image_rect = [[10, 10], [30, 20]]

[Campaign.Enemy.Scale.Small]
images = { small_1 = "small_1.png", small_2 = "small_2.png" }
"#;

#[test]
fn test_rect_and_eigens() {
    let catalogue = AssetCatalogue::from_toml_str(CATALOGUE, ".").unwrap();

    assert_eq!(
        catalogue.rect("Main.Button_AnchorAweigh").unwrap(),
        Rect::new(1600, 900, 200, 100)
    );
    let eigens = catalogue
        .eigens(&["Main.Icon_Resources.Icon_Oil", "Main.Button_AnchorAweigh"])
        .unwrap();
    assert_eq!(
        eigens,
        vec![
            Fingerprint::from_hex(100, 20, 0x303030),
            Fingerprint::from_hex(1650, 950, 0xF8D858),
            Fingerprint::from_hex(1700, 930, 0xFFFFFF),
        ]
    );
    assert!(catalogue.contains("Main.Icon_Resources"));
    assert!(!catalogue.contains("Main.Icon_Resources.Icon_Gold"));
}

#[test]
fn test_missing_attribute_is_reported() {
    let catalogue = AssetCatalogue::from_toml_str(CATALOGUE, ".").unwrap();
    let err = catalogue.rect("Main.Icon_Resources.Icon_Oil").unwrap_err();
    assert!(err.is_missing());
    assert!(matches!(
        err,
        AssetError::Missing {
            kind: AssetKind::Rect,
            ..
        }
    ));
}

#[test]
fn test_malformed_rect() {
    let catalogue = AssetCatalogue::from_toml_str("[A]\nrect = [[1, 2]]\n", ".").unwrap();
    assert!(matches!(
        catalogue.rect("A"),
        Err(AssetError::Malformed { .. })
    ));
}

#[test]
fn test_templates_load_and_cache() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["auto_on.png", "small_1.png", "small_2.png"] {
        RgbImage::from_pixel(4, 3, Rgb([1, 2, 3]))
            .save(dir.path().join(name))
            .unwrap();
    }
    let catalogue = AssetCatalogue::from_toml_str(CATALOGUE, dir.path()).unwrap();

    let first = catalogue.template("Campaign.Button_Automation").unwrap();
    let second = catalogue.template("Campaign.Button_Automation").unwrap();
    assert_eq!(first.dimensions(), (4, 3));
    assert!(std::sync::Arc::ptr_eq(&first, &second));

    let small = catalogue
        .templates_under("Campaign.Enemy.Scale.Small")
        .unwrap();
    assert_eq!(small.len(), 2);
}

#[test]
fn test_resolver_collects_every_missing_asset() {
    let catalogue = AssetCatalogue::from_toml_str(CATALOGUE, ".").unwrap();
    let resolver = AssetResolver::new(&catalogue);

    let found = resolver.rect("Main.Button_AnchorAweigh");
    let _ = resolver.rect("Login.Button_Start");
    let _ = resolver.eigens(&["Login", "Main.Icon_Resources.Icon_Oil"]);

    assert_eq!(found, Rect::new(1600, 900, 200, 100));
    assert_eq!(
        resolver.missing(),
        vec![
            ("Login.Button_Start".to_string(), AssetKind::Rect),
            ("Login".to_string(), AssetKind::Eigen),
        ]
    );
    match resolver.finish() {
        Err(AssetError::MissingMany { missing }) => assert_eq!(missing.len(), 2),
        other => panic!("expected MissingMany, got {other:?}"),
    }
}
