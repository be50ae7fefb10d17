use lazymedia_core::path::destination_path;
use lazymedia_core::{CapturedAsset, DownloadedAsset, PipelineConfig};
use lazymedia_logging::{media_error, media_info};

use crate::coordinator::{FetchCoordinator, FetchTicket};
use crate::{DownloadError, FailureKind};

/// Download stage over one asset list.
///
/// Fetches are launched in input order and then run independently; the stage
/// returns only after every fetch registered with the coordinator has settled.
pub struct DownloadStage<'a> {
    coordinator: &'a FetchCoordinator,
    config: &'a PipelineConfig,
}

enum Located {
    Hosted(CapturedAsset),
    Local {
        asset: CapturedAsset,
        destination: std::path::PathBuf,
        ticket: FetchTicket,
    },
    Invalid(DownloadError),
}

impl<'a> DownloadStage<'a> {
    pub fn new(coordinator: &'a FetchCoordinator, config: &'a PipelineConfig) -> Self {
        Self {
            coordinator,
            config,
        }
    }

    /// All-or-nothing: the first failure (in input order) fails the stage.
    pub async fn run(&self, assets: Vec<CapturedAsset>) -> Result<Vec<DownloadedAsset>, DownloadError> {
        self.run_isolated(assets).await.into_iter().collect()
    }

    /// One result per input asset, in input order.
    pub async fn run_isolated(
        &self,
        assets: Vec<CapturedAsset>,
    ) -> Vec<Result<DownloadedAsset, DownloadError>> {
        media_info!("Downloading sources for {} assets", assets.len());
        let mut located = Vec::with_capacity(assets.len());
        for asset in assets {
            located.push(self.locate(asset).await);
        }

        self.coordinator.settle_all().await;

        let mut results = Vec::with_capacity(located.len());
        for entry in located {
            let result = match entry {
                Located::Hosted(asset) => Ok(DownloadedAsset::passthrough(asset)),
                Located::Local {
                    asset,
                    destination,
                    ticket,
                } => ticket
                    .wait()
                    .await
                    .map(|()| DownloadedAsset::located(asset, destination)),
                Located::Invalid(err) => Err(err),
            };
            if let Err(err) = &result {
                media_error!("Download failed: {}", err);
            }
            results.push(result);
        }
        results
    }

    async fn locate(&self, asset: CapturedAsset) -> Located {
        if asset.kind.is_hosted_externally() {
            return Located::Hosted(asset);
        }
        let destination = match destination_path(&asset.source_url, self.config) {
            Ok(path) => path,
            Err(err) => {
                return Located::Invalid(DownloadError::new(
                    FailureKind::MalformedSourceReference,
                    err.to_string(),
                ))
            }
        };
        let ticket = self.coordinator.request(&asset.source_url, &destination).await;
        Located::Local {
            asset,
            destination,
            ticket,
        }
    }
}
