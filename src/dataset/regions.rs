// Which CSV holds which region's reviews.
//
// The three regions the dashboard was built for ship as defaults, each with
// the Google Drive file id the export is published under. A region can also
// be any local CSV: `Region::local` skips the download step entirely.

use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::info;

use super::{download, loader, ReviewTable};

/// A named region and where its dataset lives.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub name: String,
    /// File name inside the data directory
    pub file_name: String,
    /// Google Drive file id used to fetch the file when it isn't cached
    pub drive_id: Option<String>,
}

impl Region {
    pub fn local(name: &str, file_name: &str) -> Self {
        Self {
            name: name.to_string(),
            file_name: file_name.to_string(),
            drive_id: None,
        }
    }

    fn published(name: &str, file_name: &str, drive_id: &str) -> Self {
        Self {
            name: name.to_string(),
            file_name: file_name.to_string(),
            drive_id: Some(drive_id.to_string()),
        }
    }

    pub fn path_in(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(&self.file_name)
    }
}

/// The default regions.
pub fn default_regions() -> Vec<Region> {
    vec![
        Region::published(
            "Pusan National University",
            "IBA-DCX_Analytics_2.0_PNU.csv",
            "1jfMMwnXi5zUOGE6F34B-KjQvfH5jjKmu",
        ),
        Region::published(
            "Kyung Hee University",
            "IBA-DCX_Analytics_2.0_KHU.csv",
            "1pqbNRLg8SdsmnZgi9JnqkxjDp7VUPlb4",
        ),
        Region::published(
            "Jeju Island",
            "IBA-DCX_Analytics_2.0_Jeju.csv",
            "1OeB_VE4bWYCLFAI85ozT7DwiL8V1W7yR",
        ),
    ]
}

/// Look up a region by name (case-insensitive).
pub fn find_region<'a>(regions: &'a [Region], name: &str) -> Result<&'a Region> {
    regions
        .iter()
        .find(|r| r.name.eq_ignore_ascii_case(name.trim()))
        .ok_or_else(|| {
            let known: Vec<&str> = regions.iter().map(|r| r.name.as_str()).collect();
            anyhow::anyhow!("Unknown region '{}'. Known regions: {}", name, known.join(", "))
        })
}

/// Load a region's reviews, downloading the CSV first if it isn't cached.
pub async fn load_region(region: &Region, data_dir: &Path) -> Result<ReviewTable> {
    let path = region.path_in(data_dir);

    if !path.exists() {
        match &region.drive_id {
            Some(id) => {
                info!(region = %region.name, "Dataset not cached, downloading");
                download::fetch_drive_file(id, &path).await?;
            }
            None => anyhow::bail!(
                "Dataset for region '{}' not found at {}",
                region.name,
                path.display()
            ),
        }
    }

    loader::load_csv(&path, &region.name)
}
