use std::path::PathBuf;

use lazymedia_core::{AssetType, CapturedAsset, DownloadedAsset, EncodedAsset, PipelineConfig};
use pretty_assertions::assert_eq;

#[test]
fn captured_manifest_uses_type_key_and_defaults() {
    let json = r#"[
        {"sourceUrl": "https://example.com/a.png", "type": "image"},
        {"sourceUrl": "https://youtube.com/watch?v=x", "type": "youtube", "title": "Talk", "meta": {"lazy": false}}
    ]"#;
    let assets: Vec<CapturedAsset> = serde_json::from_str(json).unwrap();

    assert_eq!(
        assets[0],
        CapturedAsset::new("https://example.com/a.png", AssetType::Image)
    );
    assert_eq!(assets[1].kind, AssetType::YouTube);
    assert!(!assets[1].meta.is_lazy());
    assert!(assets[0].meta.is_lazy());
}

#[test]
fn stages_extend_earlier_records() {
    let captured = CapturedAsset::new("/media/a.png", AssetType::Image).with_title("A");
    let downloaded = DownloadedAsset::located(captured.clone(), PathBuf::from("public/media/a.png"));
    let encoded = EncodedAsset::from(downloaded.clone());

    assert_eq!(encoded.downloaded.captured, captured);
    assert_eq!(encoded.source_path(), Some(PathBuf::from("public/media/a.png").as_path()));

    let value = serde_json::to_value(&encoded).unwrap();
    assert_eq!(value["sourceUrl"], "/media/a.png");
    assert_eq!(value["type"], "image");
    assert_eq!(value["sourcePath"], "public/media/a.png");
    assert!(value.get("encodedPath").is_none());
}

#[test]
fn encoded_manifest_reads_encoder_keys() {
    let json = r#"{
        "sourceUrl": "/media/clip.mp4",
        "type": "video",
        "sourcePath": "public/media/clip.mp4",
        "encodedPath": "public/media/clip.av1.mp4",
        "encoded2xPath": "public/media/clip@2x.av1.mp4",
        "posterPath": "public/media/clip.avif",
        "sourceInfo": {"width": 1920, "height": 1080}
    }"#;
    let asset: EncodedAsset = serde_json::from_str(json).unwrap();

    assert_eq!(asset.kind(), AssetType::Video);
    assert_eq!(asset.source_path(), Some(PathBuf::from("public/media/clip.mp4").as_path()));
    assert_eq!(
        asset.encoded_2x_path,
        Some(PathBuf::from("public/media/clip@2x.av1.mp4"))
    );
    assert_eq!(asset.poster_path, Some(PathBuf::from("public/media/clip.avif")));
    assert_eq!(asset.source_info.map(|info| info.width), Some(1920));
}

#[test]
fn partial_config_falls_back_to_defaults() {
    let config: PipelineConfig =
        serde_json::from_str(r#"{"serve": "/assets/", "download": {"max_retries": 5}}"#).unwrap();

    assert_eq!(config.serve, "/assets/");
    assert_eq!(config.download.max_retries, 5);
    assert_eq!(config.download.timeout_secs, 30);
    assert_eq!(config.remote, "remote");
}
