use std::path::{Path, PathBuf};

use lazymedia_core::path::{
    basename, destination_path, destination_root, public_root, public_url, source_url_public,
};
use lazymedia_core::{PathError, PipelineConfig};
use pretty_assertions::assert_eq;

fn config() -> PipelineConfig {
    PipelineConfig {
        local: PathBuf::from("/cache"),
        serve: "/assets/".to_string(),
        remote: "remote".to_string(),
        ..PipelineConfig::default()
    }
}

#[test]
fn remote_asset_lands_in_remote_bucket() {
    let config = config();
    let url = "https://example.com/a.png";

    assert_eq!(destination_root(url, &config), PathBuf::from("/cache/remote"));
    assert_eq!(
        destination_path(url, &config).unwrap(),
        PathBuf::from("/cache/remote/a.png")
    );
    assert_eq!(public_root(url, &config), "/assets/remote");
    assert_eq!(source_url_public(url, &config).unwrap(), "/assets/remote/a.png");
}

#[test]
fn served_asset_mirrors_its_subdirectory() {
    let config = config();
    let url = "/assets/guide/fig.png";

    assert_eq!(destination_root(url, &config), PathBuf::from("/cache/guide"));
    assert_eq!(
        destination_path(url, &config).unwrap(),
        PathBuf::from("/cache/guide/fig.png")
    );
    assert_eq!(public_root(url, &config), "/assets/guide");
    assert_eq!(source_url_public(url, &config).unwrap(), url);
}

#[test]
fn served_asset_without_subdirectory_uses_local_root() {
    let config = config();
    let url = "/assets/fig.png";

    assert_eq!(destination_root(url, &config), PathBuf::from("/cache"));
    assert_eq!(public_root(url, &config), "/assets");
}

#[test]
fn served_prefix_without_trailing_slash_stays_relative_to_local() {
    let config = PipelineConfig {
        serve: "/assets".to_string(),
        ..config()
    };

    assert_eq!(
        destination_path("/assets/deep/er/fig.png", &config).unwrap(),
        PathBuf::from("/cache/deep/er/fig.png")
    );
    assert_eq!(
        destination_path("/assets/fig.png", &config).unwrap(),
        PathBuf::from("/cache/fig.png")
    );
}

#[test]
fn artifacts_keep_their_own_file_names() {
    let config = config();
    let encoded = Path::new("/cache/guide/fig.avif");

    assert_eq!(
        public_url("/assets/guide/fig.png", encoded, &config).unwrap(),
        "/assets/guide/fig.avif"
    );
    assert_eq!(
        public_url("https://example.com/x/fig.png", encoded, &config).unwrap(),
        "/assets/remote/fig.avif"
    );
}

#[test]
fn destination_and_public_url_reference_the_same_file() {
    let config = config();
    for url in [
        "https://example.com/a/b/c.png",
        "/assets/guide/fig.png",
        "/assets/top.gif",
    ] {
        let stored = destination_path(url, &config).unwrap();
        let served = source_url_public(url, &config).unwrap();
        assert_eq!(
            stored.file_name().unwrap().to_str().unwrap(),
            basename(&served)
        );
        assert_eq!(basename(&served), basename(url));
    }
}

#[test]
fn reference_without_file_name_is_rejected() {
    let config = config();
    let err = destination_path("https://example.com/gallery/", &config).unwrap_err();
    assert_eq!(
        err,
        PathError::MissingFilename("https://example.com/gallery/".to_string())
    );
}

#[test]
fn parent_segments_cannot_leave_the_cache_root() {
    let config = config();
    let escaping = [
        "/assets/../../x.png",
        "/assets/guide/../../../etc/x.png",
        "https://example.com/..",
    ];
    for url in escaping {
        assert_eq!(
            destination_path(url, &config).unwrap_err(),
            PathError::ParentSegment(url.to_string())
        );
    }
    assert_eq!(
        destination_path("/assets/guide..v2/x.png", &config).unwrap(),
        Path::new("/cache/guide..v2/x.png")
    );
}
