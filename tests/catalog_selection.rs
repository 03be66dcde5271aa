//! End-to-end tests: catalog construction from disk and manifests, coverage
//! selection and fetch delegation

mod common;

use std::fs;
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use tempfile::TempDir;

use common::{touch, write_raw_extract};
use geodata_catalog::app::{
    ensure_available, BoundingBox, Catalog, CatalogConfig, CoverageSelector, DatasetKind,
    DownloadOrchestrator, FetchRequest, SourceConfig,
};
use geodata_catalog::errors::{FetchResult, SelectionError};

const MANIFEST: &str = r#"{
    "name": "graphhopper",
    "base_url": "https://example.org/graphs/",
    "files": [
        {
            "uri": "europe.zip",
            "size": 5,
            "bounding_box": {
                "north_east": { "longitude": 20.0, "latitude": 60.0 },
                "south_west": { "longitude": -10.0, "latitude": 40.0 }
            }
        },
        {
            "uri": "germany.zip",
            "size": 5,
            "bounding_box": {
                "north_east": { "longitude": 15.0, "latitude": 55.0 },
                "south_west": { "longitude": 5.0, "latitude": 47.0 }
            }
        },
        { "uri": "unknown-region.zip" },
        {
            "uri": "alaska-latest.osm.pbf",
            "bounding_box": {
                "north_east": { "longitude": 179.99995, "latitude": 72.0 },
                "south_west": { "longitude": -179.99995, "latitude": 51.0 }
            }
        }
    ]
}"#;

fn hamburg() -> BoundingBox {
    BoundingBox::from_coordinates(10.1, 53.7, 9.9, 53.5)
}

fn config_with_manifest(temp_dir: &TempDir) -> CatalogConfig {
    let manifest = temp_dir.path().join("graphhopper.json");
    fs::write(&manifest, MANIFEST).unwrap();
    CatalogConfig::new(temp_dir.path().join("graphs"))
        .with_source(SourceConfig::new("graphhopper", manifest))
}

/// Writes a placeholder file to every requested target
#[derive(Default)]
struct FakeOrchestrator {
    fetched: Mutex<Vec<String>>,
}

#[async_trait]
impl DownloadOrchestrator for FakeOrchestrator {
    async fn fetch(&self, request: &FetchRequest) -> FetchResult<()> {
        self.fetched.lock().unwrap().push(request.source_uri.clone());
        if let Some(parent) = request.target_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&request.target_path, b"graph").await?;
        Ok(())
    }
}

#[test]
fn test_extracted_dataset_sorts_first_locally() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("graphs");
    write_raw_extract(&root.join("germany.osm.pbf"), (15.0, 55.0), (5.0, 47.0));
    write_raw_extract(&root.join("europe.osm.pbf"), (20.0, 60.0), (-10.0, 40.0));
    touch(&root.join("germany/properties"));

    let catalog = Catalog::build(CatalogConfig::new(&root)).unwrap();
    let local: Vec<_> = catalog
        .local()
        .iter()
        .map(|d| (d.kind(), d.name(), d.has_extracted_form()))
        .collect();

    assert_eq!(
        local,
        vec![
            (DatasetKind::LocalDirectory, "germany", true),
            (DatasetKind::LocalRawExtract, "germany", true),
            (DatasetKind::LocalRawExtract, "europe", false),
        ]
    );

    let raw_extracts: Vec<_> = catalog
        .local()
        .iter()
        .filter(|d| d.kind() == DatasetKind::LocalRawExtract)
        .collect();
    assert!(raw_extracts
        .iter()
        .all(|d| d.bounding_box().unwrap().contains(&hamburg())));
}

#[test]
fn test_contained_remote_box_sorts_first() {
    let temp_dir = TempDir::new().unwrap();
    let catalog = Catalog::build(config_with_manifest(&temp_dir)).unwrap();

    let uris: Vec<_> = catalog
        .remote()
        .iter()
        .map(|d| d.remote().unwrap().uri.as_str())
        .collect();
    assert_eq!(
        uris,
        vec![
            "germany.zip",
            "europe.zip",
            "unknown-region.zip",
            "alaska-latest.osm.pbf"
        ]
    );
}

#[test]
fn test_every_descriptor_matches_its_own_name() {
    let temp_dir = TempDir::new().unwrap();
    let config = config_with_manifest(&temp_dir);
    write_raw_extract(
        &config.data_root.join("europe/germany-latest.osm.pbf"),
        (15.0, 55.0),
        (5.0, 47.0),
    );
    touch(&config.data_root.join("europe/germany-latest/properties"));

    let catalog = Catalog::build(config).unwrap();
    assert_eq!(catalog.local().len(), 2);
    for descriptor in catalog.descriptors() {
        assert!(
            descriptor.matches_identifier(descriptor.name()),
            "{} does not match itself",
            descriptor
        );
    }
}

#[test]
fn test_antimeridian_dataset_never_selected() {
    let temp_dir = TempDir::new().unwrap();
    let catalog = Catalog::build(config_with_manifest(&temp_dir)).unwrap();
    let anchorage = BoundingBox::from_coordinates(-149.7, 61.3, -150.0, 61.1);

    let alaska = catalog.find_by_identifier("alaska-latest").unwrap();
    assert!(!alaska.is_valid());
    assert!(!alaska.matches(None, &anchorage));

    let selection = CoverageSelector::new(&catalog).select(&anchorage).unwrap();
    assert_ne!(selection.descriptor.name(), "alaska-latest");
}

#[test]
fn test_local_covering_dataset_avoids_fetch() {
    let temp_dir = TempDir::new().unwrap();
    let config = config_with_manifest(&temp_dir);
    write_raw_extract(
        &config.data_root.join("europe.osm.pbf"),
        (20.0, 60.0),
        (-10.0, 40.0),
    );

    let catalog = Catalog::build(config).unwrap();
    let selector = CoverageSelector::new(&catalog);
    let selection = selector.select(&hamburg()).unwrap();

    assert_eq!(selection.descriptor.kind(), DatasetKind::LocalRawExtract);
    assert_eq!(selection.descriptor.name(), "europe");
    assert!(!selection.requires_fetch);

    // repeated selection over the same snapshot is stable
    for _ in 0..5 {
        assert_eq!(
            selector.select(&hamburg()).unwrap().descriptor,
            selection.descriptor
        );
    }
}

#[test]
fn test_empty_catalog_has_no_candidate() {
    let temp_dir = TempDir::new().unwrap();
    let catalog = Catalog::build(CatalogConfig::new(temp_dir.path())).unwrap();

    assert!(matches!(
        CoverageSelector::new(&catalog).select(&hamburg()),
        Err(SelectionError::NoCandidate)
    ));
}

#[test]
fn test_corrupt_extract_degrades_to_no_box() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    fs::write(root.join("broken.osm.pbf"), [0u8, 0, 0, 200, 1, 2, 3]).unwrap();
    write_raw_extract(&root.join("germany.osm.pbf"), (15.0, 55.0), (5.0, 47.0));

    let catalog = Catalog::build(CatalogConfig::new(root)).unwrap();
    let broken = catalog.find_by_identifier("broken").unwrap();
    assert_eq!(broken.bounding_box(), None);

    let selection = CoverageSelector::new(&catalog).select(&hamburg()).unwrap();
    assert_eq!(selection.descriptor.name(), "germany");
}

#[test]
fn test_bounding_box_shared_across_threads() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    let file = root.join("germany.osm.pbf");
    write_raw_extract(&file, (15.0, 55.0), (5.0, 47.0));

    let catalog = Catalog::build(CatalogConfig::new(root)).unwrap();
    let descriptor = &catalog.local()[0];

    let boxes: Vec<_> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| scope.spawn(|| descriptor.bounding_box()))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    let expected = BoundingBox::from_coordinates(15.0, 55.0, 5.0, 47.0);
    assert!(boxes.iter().all(|bbox| *bbox == Some(expected)));

    // the cached box survives the file being replaced
    fs::remove_file(&file).unwrap();
    assert_eq!(descriptor.bounding_box(), Some(expected));
}

#[tokio::test]
async fn test_fetch_then_refresh_finds_dataset_locally() {
    let temp_dir = TempDir::new().unwrap();
    let catalog = Catalog::build(config_with_manifest(&temp_dir)).unwrap();

    let path = {
        let selector = CoverageSelector::new(&catalog);
        let selection = selector.select(&hamburg()).unwrap();
        assert_eq!(selection.descriptor.name(), "germany");
        assert!(selection.requires_fetch);

        let orchestrator = FakeOrchestrator::default();
        let path = ensure_available(&selection, &orchestrator).await.unwrap();
        assert_eq!(
            *orchestrator.fetched.lock().unwrap(),
            vec!["https://example.org/graphs/germany.zip".to_string()]
        );
        path
    };
    assert!(Path::new(&path).exists());

    let refreshed = catalog.refresh().unwrap();
    let selection = CoverageSelector::new(&refreshed).select(&hamburg()).unwrap();
    assert_eq!(selection.descriptor.name(), "germany");
    assert!(!selection.requires_fetch);
}

#[test]
fn test_candidates_listing() {
    let temp_dir = TempDir::new().unwrap();
    let catalog = Catalog::build(config_with_manifest(&temp_dir)).unwrap();
    let selector = CoverageSelector::new(&catalog);

    let names: Vec<_> = selector
        .candidates_for(Some("maps/unknown-region.map"), &hamburg())
        .iter()
        .map(|d| d.name())
        .collect();
    assert_eq!(names, vec!["germany", "europe"]);

    let names: Vec<_> = selector
        .candidates_for(Some("unknown-region"), &BoundingBox::from_coordinates(1.0, 1.0, 0.0, 0.0))
        .iter()
        .map(|d| d.name())
        .collect();
    assert_eq!(names, vec!["unknown-region"]);
}
