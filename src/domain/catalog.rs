//! Static catalog of the JMA chart families fetched by a run.
//!
//! Families are listed in execution order. `COMBINED_ORDER` is the page order of
//! the combined document and is independent of execution order.

use crate::domain::{ChartFamily, Outputs, PayloadKind, RemoteName, Schedule};

pub const LOOKBACK_DAYS: u32 = 2;

/// Ashfall PDFs below this size are "no forecast issued" placeholders.
pub const ASHFALL_MIN_BYTES: usize = 10_240;

/// Hourly aviation chart is overwritten in place per hour slot; older than this is yesterday's.
pub const FXJP106_STALENESS_HOURS: i64 = 12;

pub const COMBINED_NAME: &str = "all_weather_charts.pdf";

pub const SYNOPTIC_HOURS: &[u32] = &[0, 6, 12, 18];
pub const NWPMAP_HOURS: &[u32] = &[0, 12];
pub const FXJP106_HOURS: &[u32] = &[0, 3, 6, 9, 12, 15, 18, 21];
pub const ASHFALL_HOURS: &[u32] = &[2, 5, 8, 11, 14, 17, 20, 23];

pub const JAPAN_OVERLAY_AUPQ: &str = "japan_overlay_aupq.png";
pub const JAPAN_OVERLAY_FXFE: &str = "japan_overlay_fxfe.png";
pub const JAPAN_OVERLAY_FXJP: &str = "japan_overlay_fxjp.png";

/// Page order of the combined briefing document.
pub const COMBINED_ORDER: [&str; 13] = [
    "ASAS_Prior.png",
    "ASAS_Latest.png",
    "FSAS_Latest.png",
    "AUPQ35_Latest.png",
    "AUPQ78_Latest.png",
    "FXFE502_Latest.png",
    "FXFE5782_Latest.png",
    "FBJP_Latest.png",
    "FBOS39_Latest.png",
    "FXJP106_Latest.png",
    "FXJP854_Latest.png",
    "Sakurajima_Ashfall_Latest.png",
    "Kirishimayama_Ashfall_Latest.png",
];

/// Every family, in the order a run resolves them.
pub fn jma_families() -> Vec<ChartFamily> {
    vec![
        ChartFamily {
            key: "asas",
            schedule: Schedule::FixedHours { hours: SYNOPTIC_HOURS },
            remote: RemoteName::WxChartQuick { code: "ASAS" },
            payload: PayloadKind::Pdf,
            outputs: Outputs::Pair {
                latest: "ASAS_Latest.png",
                prior: "ASAS_Prior.png",
            },
            ..base()
        },
        ChartFamily {
            key: "fsas24",
            schedule: Schedule::Static,
            remote: RemoteName::Fixed {
                url: "https://www.data.jma.go.jp/yoho/data/wxchart/quick/FSAS24_COLOR_ASIA.pdf",
            },
            payload: PayloadKind::Pdf,
            outputs: Outputs::Single { name: "FSAS_Latest.png" },
            ..base()
        },
        nwpmap("aupq35", JAPAN_OVERLAY_AUPQ, "AUPQ35_Latest.png"),
        nwpmap("aupq78", JAPAN_OVERLAY_AUPQ, "AUPQ78_Latest.png"),
        nwpmap("fxfe502", JAPAN_OVERLAY_FXFE, "FXFE502_Latest.png"),
        nwpmap("fxfe5782", JAPAN_OVERLAY_FXFE, "FXFE5782_Latest.png"),
        nwpmap("fxjp854", JAPAN_OVERLAY_FXJP, "FXJP854_Latest.png"),
        ChartFamily {
            key: "fxjp106",
            schedule: Schedule::HourlyList { hours: FXJP106_HOURS },
            staleness_hours: Some(FXJP106_STALENESS_HOURS),
            remote: RemoteName::AirinfoNwp { chart: "fxjp106" },
            outputs: Outputs::Single { name: "FXJP106_Latest.png" },
            ..base()
        },
        fixed_png(
            "fbjp",
            "https://www.data.jma.go.jp/airinfo/data/pict/fbjp/fbjp.png",
            "FBJP_Latest.png",
        ),
        fixed_png(
            "fbos39",
            "https://www.data.jma.go.jp/airinfo/data/pict/low-level_sigwx/fbos39.png",
            "FBOS39_Latest.png",
        ),
        ashfall("ashfall-sakurajima", "Sakurajima", "JR506X", "Sakurajima_Ashfall_Latest.png"),
        ashfall(
            "ashfall-kirishimayama",
            "Kirishimayama",
            "JR551X",
            "Kirishimayama_Ashfall_Latest.png",
        ),
    ]
}

/// Look up a family by key (case-insensitive).
pub fn find(key: &str) -> Option<ChartFamily> {
    jma_families()
        .into_iter()
        .find(|family| family.key.eq_ignore_ascii_case(key))
}

fn base() -> ChartFamily {
    ChartFamily {
        key: "",
        schedule: Schedule::Static,
        zone_offset_secs: 0,
        lookback_days: LOOKBACK_DAYS,
        min_payload_bytes: 0,
        staleness_hours: None,
        remote: RemoteName::Fixed { url: "" },
        payload: PayloadKind::Png,
        overlay: None,
        outputs: Outputs::Single { name: "" },
    }
}

fn nwpmap(chart: &'static str, overlay: &'static str, output: &'static str) -> ChartFamily {
    ChartFamily {
        key: chart,
        schedule: Schedule::NearestHours { hours: NWPMAP_HOURS },
        remote: RemoteName::NwpMap { chart },
        payload: PayloadKind::Pdf,
        overlay: Some(overlay),
        outputs: Outputs::Single { name: output },
        ..base()
    }
}

fn fixed_png(key: &'static str, url: &'static str, output: &'static str) -> ChartFamily {
    ChartFamily {
        key,
        remote: RemoteName::Fixed { url },
        outputs: Outputs::Single { name: output },
        ..base()
    }
}

fn ashfall(
    key: &'static str,
    volcano: &'static str,
    code: &'static str,
    output: &'static str,
) -> ChartFamily {
    ChartFamily {
        key,
        schedule: Schedule::WrapAround { hours: ASHFALL_HOURS },
        min_payload_bytes: ASHFALL_MIN_BYTES,
        remote: RemoteName::Ashfall { volcano, code },
        payload: PayloadKind::Pdf,
        outputs: Outputs::Single { name: output },
        ..base()
    }
}
