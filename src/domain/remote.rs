//! Remote identifiers for JMA chart products.
//!
//! The URL and file-name formats below are consumed by other systems and must
//! stay bit-for-bit stable: date-only, date+hour, and full timestamp segments,
//! with the family code in the case the remote side expects.

use chrono::{DateTime, Utc};
use serde::Serialize;

const WXCHART_QUICK_BASE: &str = "https://www.data.jma.go.jp/yoho/data/wxchart/quick";
const NWPMAP_BASE: &str = "https://www.jma.go.jp/bosai/numericmap/data/nwpmap";
const AIRINFO_NWP_BASE: &str = "https://www.data.jma.go.jp/airinfo/data/pict/nwp";
const ASHFALL_BASE: &str = "https://www.jma.go.jp/bosai/volcano/data/ashfall/pdf";

/// How a family's remote URL (and local scratch name) is derived from an issuance instant.
///
/// All time segments are formatted in UTC, which is what the remote side keys on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RemoteName {
    /// Time-independent URL ("latest" products overwritten in place).
    Fixed { url: &'static str },
    /// Surface analysis archive: `quick/{YYYYMM}/{CODE}_COLOR_{YYYYMMDDHHMM}.pdf`.
    WxChartQuick { code: &'static str },
    /// Numerical prediction charts: `nwpmap/{chart}_{HH}.pdf`.
    NwpMap { chart: &'static str },
    /// Aviation prediction charts: `pict/nwp/{chart}_{HH}.png`.
    AirinfoNwp { chart: &'static str },
    /// Volcanic ashfall forecast for one volcano, keyed by the full issuance timestamp.
    Ashfall {
        volcano: &'static str,
        code: &'static str,
    },
}

impl RemoteName {
    pub fn url(&self, at: DateTime<Utc>) -> String {
        match *self {
            RemoteName::Fixed { url } => url.to_string(),
            RemoteName::WxChartQuick { code } => format!(
                "{WXCHART_QUICK_BASE}/{}/{code}_COLOR_{}.pdf",
                at.format("%Y%m"),
                at.format("%Y%m%d%H%M")
            ),
            RemoteName::NwpMap { chart } => format!("{NWPMAP_BASE}/{chart}_{}.pdf", at.format("%H")),
            RemoteName::AirinfoNwp { chart } => {
                format!("{AIRINFO_NWP_BASE}/{chart}_{}.png", at.format("%H"))
            }
            RemoteName::Ashfall { code, .. } => format!(
                "{ASHFALL_BASE}/Z__C_RJTD_{}_EQV_CHT_JCIashfallr_{code}_N1_image.pdf",
                at.format("%Y%m%d%H%M%S")
            ),
        }
    }

    /// Scratch name the raw payload is stored under until it is normalized.
    pub fn scratch_name(&self, at: DateTime<Utc>) -> String {
        match *self {
            RemoteName::Fixed { url } => url.rsplit('/').next().unwrap_or(url).to_string(),
            RemoteName::WxChartQuick { code } => format!("{code}_{}.pdf", at.format("%Y%m%d%H%M")),
            RemoteName::NwpMap { chart } => {
                format!("{}_{}.pdf", chart.to_uppercase(), at.format("%Y%m%d%H%M"))
            }
            RemoteName::AirinfoNwp { chart } => {
                format!("{}_{}.png", chart.to_uppercase(), at.format("%Y%m%d%H%M"))
            }
            RemoteName::Ashfall { volcano, .. } => {
                format!("ASHFALL_{volcano}_{}.pdf", at.format("%Y%m%d%H%M%S"))
            }
        }
    }
}
