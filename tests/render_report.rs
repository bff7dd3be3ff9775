// tests/render_report.rs
use chrono::{TimeZone, Utc};
use market_brief::brief::{fallback_brief, Brief};
use market_brief::config::default_sources;
use market_brief::report::markdown::{classify_line, render_markdown, Block};
use market_brief::{ReportRenderer, Snapshot};

fn renderer() -> ReportRenderer {
    ReportRenderer::new(default_sources(), 6)
}

const AI_BRIEF: &str = "# 📊 Executive Summary
Markets are **cautious** ahead of CPI.

## Risk
### Stress Indicators
- Buy BTC
* Hedge with **GC=F**
1. **ACCUMULATE** - BTC above 95k
2. Stop at **91,500**

Price tested **98000** twice <before> the close & faded.
---";

#[test]
fn mapping_examples() {
    assert_eq!(
        classify_line("## Risk"),
        Some(Block::Heading {
            level: 2,
            text: "Risk".into()
        })
    );
    assert_eq!(
        classify_line("- Buy BTC"),
        Some(Block::ListItem {
            ordered: false,
            text: "Buy BTC".into()
        })
    );
    let html = render_markdown("Price tested **98000** twice");
    assert_eq!(html, "<p>Price tested <strong>98000</strong> twice</p>\n");
}

#[test]
fn ai_brief_renders_every_construct() {
    let html = render_markdown(AI_BRIEF);
    assert!(html.contains("<h1>📊 Executive Summary</h1>"));
    assert!(html.contains("<h2>Risk</h2>"));
    assert!(html.contains("<h3>Stress Indicators</h3>"));
    assert!(html.contains("<ul>\n<li>Buy BTC</li>\n<li>Hedge with <strong>GC=F</strong></li>\n</ul>"));
    assert!(html.contains("<ol>\n<li><strong>ACCUMULATE</strong> - BTC above 95k</li>"));
    assert!(html.contains(
        "<p>Price tested <strong>98000</strong> twice &lt;before&gt; the close &amp; faded.</p>"
    ));
    assert!(html.contains("<p>---</p>"));

    let non_blank = AI_BRIEF.lines().filter(|l| !l.trim().is_empty()).count();
    let constructs = ["<h1>", "<h2>", "<h3>", "<li>", "<p>"]
        .iter()
        .map(|tag| html.matches(tag).count())
        .sum::<usize>();
    assert_eq!(constructs, non_blank);
}

#[test]
fn rendering_is_byte_identical_across_runs() {
    let ts = Utc.with_ymd_and_hms(2025, 6, 2, 6, 0, 0).unwrap();
    let brief = Brief::generated(AI_BRIEF);
    let a = renderer().render(&brief, ts);
    let b = renderer().render(&brief, ts);
    assert_eq!(a, b);
    assert_eq!(a.html.as_bytes(), b.html.as_bytes());
}

#[test]
fn degenerate_snapshot_fallback_renders_full_page() {
    let ts = Utc.with_ymd_and_hms(2025, 6, 2, 6, 0, 0).unwrap();
    let brief = fallback_brief(&Snapshot::empty(ts));
    let report = renderer().render(&brief, ts);

    assert!(report.html.starts_with("<!DOCTYPE html>"));
    assert!(report.html.trim_end().ends_with("</html>"));
    assert_eq!(report.html.matches("class=\"card\"").count(), 6);
    assert_eq!(report.html.matches("class=\"stat\"").count(), 4);
    assert!(report.html.contains("<h1>📊 Executive Summary</h1>"));
    assert!(report.html.contains("<h2>Key Metrics</h2>"));
    assert!(report.html.contains("AI analysis temporarily unavailable"));
    assert_eq!(report.archive_file_name(), "brief-2025-06-02.md");
}

#[test]
fn arbitrary_brief_content_never_breaks_rendering() {
    let ts = Utc.with_ymd_and_hms(2025, 6, 2, 6, 0, 0).unwrap();
    for body in ["", "\n\n\n", "#", "- ", "**unclosed", "<script>alert(1)</script>", "1.", "####"] {
        let report = renderer().render(&Brief::generated(body), ts);
        assert!(report.html.contains("<article class=\"brief\">"));
        assert!(!report.html.contains("<script>alert"));
    }
}
