use std::path::PathBuf;

use super::*;

fn frame(id: &str, category: FrameCategory) -> FrameDescriptor {
    FrameDescriptor {
        id: id.to_string(),
        name: id.to_uppercase(),
        category,
        url: format!("frames/{id}.png"),
    }
}

#[test]
fn builtin_catalog_matches_shipped_frames() {
    let cat = FrameCatalog::builtin();
    assert_eq!(cat.len(), 5);
    assert_eq!(cat.get("default-3").unwrap().name, "Party Vibes");
    assert_eq!(
        cat.get("default-1").unwrap().url,
        "public/frames/default-1.png"
    );
    // Builtin ids satisfy the same checks as user catalogs.
    FrameCatalog::new(cat.frames().to_vec()).unwrap();
}

#[test]
fn filter_by_label() {
    let cat = FrameCatalog::builtin();
    let all = CategoryFilter::from_label("All Frames");
    assert_eq!(cat.filter(&all).count(), 5);

    let events = CategoryFilter::from_label("Events");
    let ids: Vec<_> = cat.filter(&events).map(|f| f.id.as_str()).collect();
    assert_eq!(ids, vec!["default-4", "default-5"]);

    let fun = CategoryFilter::from_label("fun");
    assert_eq!(cat.filter(&fun).count(), 1);

    let none = CategoryFilter::from_label("Weddings");
    assert_eq!(cat.filter(&none).count(), 0);
}

#[test]
fn every_label_parses_to_a_filter() {
    for label in CATEGORY_LABELS {
        let f = CategoryFilter::from_label(label);
        if label == "All Frames" {
            assert_eq!(f, CategoryFilter::All);
        } else {
            assert!(matches!(f, CategoryFilter::Only(_)));
        }
    }
}

#[test]
fn rejects_duplicate_and_empty_ids() {
    let dup = vec![
        frame("a", FrameCategory::Fun),
        frame("a", FrameCategory::Minimal),
    ];
    assert!(FrameCatalog::new(dup).is_err());
    assert!(FrameCatalog::new(vec![frame("", FrameCategory::Fun)]).is_err());
}

#[test]
fn json_round_trips_categories_as_lowercase_strings() {
    let json = r#"[
        {"id": "x", "name": "X", "category": "Minimal", "url": "x.png"},
        {"id": "y", "name": "Y", "category": "seasonal", "url": "https://cdn.example.com/y.png"}
    ]"#;
    let cat = FrameCatalog::from_json_str(json).unwrap();
    assert_eq!(cat.get("x").unwrap().category, FrameCategory::Minimal);
    assert_eq!(
        cat.get("y").unwrap().category,
        FrameCategory::Other("seasonal".to_string())
    );

    let out = serde_json::to_value(&cat).unwrap();
    assert_eq!(out[0]["category"], "minimal");
    assert_eq!(out[1]["category"], "seasonal");
}

#[test]
fn image_ref_joins_relative_paths_only() {
    let local = frame("a", FrameCategory::Fun);
    assert_eq!(
        local.image_ref(Some(std::path::Path::new("/srv/app"))).unwrap(),
        ImageRef::File(PathBuf::from("/srv/app/frames/a.png"))
    );

    let remote = FrameDescriptor {
        url: "https://cdn.example.com/a.png".to_string(),
        ..local
    };
    assert!(
        remote
            .image_ref(Some(std::path::Path::new("/srv/app")))
            .unwrap()
            .is_remote()
    );
}
