use std::path::PathBuf;

use serde_json::{json, Value};

use sidebar_recon::canonical::{CanonicalRecord, MemoryStore};
use sidebar_recon::model::PreparedSource;
use sidebar_recon::{build_index, run, AdapterRegistry, RecordCache, ReconResult, SidebarConfig, SourceIndex};

const P1: &str = "https://pleiades.stoa.org/places/1";
const P2: &str = "https://pleiades.stoa.org/places/2";
const P9: &str = "https://pleiades.stoa.org/places/9";

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn store() -> MemoryStore {
    let text = std::fs::read_to_string(fixtures_dir().join("places.json")).unwrap();
    let places: Vec<CanonicalRecord> = serde_json::from_str(&text).unwrap();
    places.into_iter().fold(MemoryStore::new(), MemoryStore::with)
}

fn itinere_records() -> Vec<Value> {
    std::fs::read_to_string(fixtures_dir().join("itinere.ndjson"))
        .unwrap()
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| serde_json::from_str(l).unwrap())
        .collect()
}

fn ports_records() -> Vec<Value> {
    vec![
        json!({"Id": "7", "NAME": "Thessaloniki harbour", "NAME_MOD": "", "COUNTRY": "Greece", "Pleiades_id": "1"}),
        json!({"Id": "8", "NAME": "Portus", "NAME_MOD": "", "COUNTRY": "Italy", "Pleiades_id": "2"}),
    ]
}

fn prepare(config: &SidebarConfig) -> Vec<PreparedSource> {
    let registry = AdapterRegistry::builtin();
    let table = config.namespace_table();
    config
        .sources
        .iter()
        .map(|(name, source)| {
            let adapter = config.adapter_for(&registry, name).unwrap();
            let records = match name.as_str() {
                "itinere" => itinere_records(),
                "ports" => ports_records(),
                other => panic!("no fixture for {other}"),
            };
            let index = build_index(name, adapter, &records, &table, &config.canonical.domain).unwrap();
            PreparedSource {
                index,
                omit_ambiguous: source.omit_ambiguous,
            }
        })
        .collect()
}

fn load_and_run(config_toml: &str) -> ReconResult {
    let config = SidebarConfig::from_toml(config_toml).unwrap();
    let sources = prepare(&config);
    let mut cache = RecordCache::new(store());
    run(&sources, &mut cache).unwrap()
}

fn fixture_config() -> String {
    std::fs::read_to_string(fixtures_dir().join("sidebar.toml")).unwrap()
}

// -------------------------------------------------------------------------
// Reciprocity
// -------------------------------------------------------------------------

#[test]
fn reciprocal_match_is_not_unreciprocated() {
    let result = load_and_run(&fixture_config());

    let p1 = &result.sidebar[P1];
    let segment = p1
        .iter()
        .find(|f| f.id == "https://itiner-e.org/route-segment/42")
        .unwrap();
    assert_eq!(segment.properties.reciprocal, Some(true));
    assert!(result
        .unreciprocated
        .get("itinere")
        .map_or(true, |fs| fs.iter().all(|f| f.id != segment.id)));
}

#[test]
fn query_id_reference_reciprocates_chronique_item() {
    let result = load_and_run(&fixture_config());
    let port = result.sidebar[P1]
        .iter()
        .find(|f| f.id == "https://chronique.efa.gr/?r=topo_public&id=7")
        .unwrap();
    assert_eq!(port.properties.reciprocal, Some(true));
    assert_eq!(port.properties.title, "Thessaloniki harbour");
}

#[test]
fn unreciprocated_match_appears_in_both_maps() {
    let result = load_and_run(&fixture_config());

    let p2: Vec<&str> = result.sidebar[P2].iter().map(|f| f.id.as_str()).collect();
    assert_eq!(
        p2,
        vec![
            "https://chronique.efa.gr/?r=topo_public&id=8",
            "https://itiner-e.org/route-segment/43",
            "https://itiner-e.org/route-segment/44",
        ]
    );
    assert!(result.sidebar[P2].iter().all(|f| f.properties.reciprocal == Some(false)));

    let itinere: Vec<&str> = result.unreciprocated["itinere"].iter().map(|f| f.id.as_str()).collect();
    assert_eq!(
        itinere,
        vec!["https://itiner-e.org/route-segment/43", "https://itiner-e.org/route-segment/44"]
    );
    assert_eq!(result.unreciprocated["ports"].len(), 1);
}

#[test]
fn missing_canonical_record_is_skipped() {
    let result = load_and_run(&fixture_config());
    assert!(!result.sidebar.contains_key(P9));
    assert_eq!(result.summary.missing_records, 1);
    assert_eq!(result.summary.sources, 2);
    assert_eq!(result.summary.canonical_uris, 2);
}

#[test]
fn omit_ambiguous_drops_shared_canonical_uris() {
    let toml = fixture_config().replace(
        "[sources.itinere]\nfile = \"itinere.ndjson\"\n",
        "[sources.itinere]\nfile = \"itinere.ndjson\"\nomit_ambiguous = true\n",
    );
    assert!(toml.contains("omit_ambiguous = true"));
    let result = load_and_run(&toml);

    // P2 is matched by two itinere segments, so only the port remains there.
    let p2: Vec<&str> = result.sidebar[P2].iter().map(|f| f.id.as_str()).collect();
    assert_eq!(p2, vec!["https://chronique.efa.gr/?r=topo_public&id=8"]);
    assert!(!result.unreciprocated.contains_key("itinere"));
}

// -------------------------------------------------------------------------
// Determinism + shape
// -------------------------------------------------------------------------

#[test]
fn reruns_are_byte_identical() {
    let first = serde_json::to_string_pretty(&load_and_run(&fixture_config())).unwrap();
    let second = serde_json::to_string_pretty(&load_and_run(&fixture_config())).unwrap();
    assert_eq!(first, second);
}

#[test]
fn output_uses_lpf_shape() {
    let value = serde_json::to_value(load_and_run(&fixture_config())).unwrap();
    let feature = &value["sidebar"][P1][0];
    assert_eq!(feature["type"], "Feature");
    assert!(feature["@id"].is_string());
    assert!(feature["properties"]["summary"].is_null());
    assert_eq!(feature["links"][0]["identifier"], P1);
    assert!(value["unreciprocated"].is_object());
}

#[test]
fn every_link_array_is_sorted() {
    let result = load_and_run(&fixture_config());
    for features in result.sidebar.values().chain(result.unreciprocated.values()) {
        assert!(features.windows(2).all(|w| w[0].id <= w[1].id));
        for f in features {
            assert!(f.links.windows(2).all(|w| w[0].identifier < w[1].identifier));
        }
    }
}

#[test]
fn shared_cache_fetches_each_record_once() {
    let config = SidebarConfig::from_toml(&fixture_config()).unwrap();
    let sources = prepare(&config);
    let mut cache = RecordCache::new(store());
    run(&sources, &mut cache).unwrap();
    // P1, P2, P9, each fetched once although both sources match P1 and P2.
    assert_eq!(cache.lookups(), 3);
}

#[test]
fn feature_collection_export_lists_every_item() {
    let config = SidebarConfig::from_toml(&fixture_config()).unwrap();
    let sources = prepare(&config);
    let itinere: &SourceIndex = &sources.iter().find(|s| s.namespace() == "itinere").unwrap().index;
    let fc = itinere.to_feature_collection();
    assert_eq!(fc.features.len(), 3);
    assert!(fc.features.iter().all(|f| f.properties.reciprocal.is_none()));
}
