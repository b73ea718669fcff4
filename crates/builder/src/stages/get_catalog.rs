use webdist_errors::{BuildError, Error};
use webdist_types::StageReport;

use super::Stage;
use crate::context::BuildContext;

/// Remote catalog download is not available; fails before touching anything
pub(super) fn run(_ctx: &BuildContext) -> Result<StageReport, Error> {
    Err(BuildError::UnimplementedFeature {
        feature: Stage::GetCatalog.name().to_string(),
    }
    .into())
}
