// src/report/page.rs
//! Static page shell around the rendered brief.

use chrono::{DateTime, Utc};
use html_escape::{encode_double_quoted_attribute as attr, encode_text as text};
use std::fmt::Write as _;

use crate::config::SourceDescriptor;

/// One tile in the summary band.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stat {
    pub value: String,
    pub label: String,
}

impl Stat {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

const STYLE: &str = r"
:root { --bg:#0b1020; --card:#141b33; --muted:#8b93b5; --fg:#e8ebf7; --accent:#5b8cff; }
* { box-sizing:border-box; }
body { margin:0; font-family:-apple-system,BlinkMacSystemFont,'Segoe UI',Roboto,sans-serif; background:var(--bg); color:var(--fg); line-height:1.6; }
.container { max-width:1100px; margin:0 auto; padding:32px 20px; }
header { text-align:center; margin-bottom:28px; }
header h1 { margin:0 0 8px; font-size:2.2rem; }
.badge { display:inline-block; padding:6px 14px; border-radius:999px; background:var(--card); color:var(--muted); font-size:.9rem; }
.stats { display:grid; grid-template-columns:repeat(4,1fr); gap:14px; margin:24px 0; }
.stat { background:var(--card); border-radius:12px; padding:16px; text-align:center; }
.stat .value { font-size:1.6rem; font-weight:700; color:var(--accent); }
.stat .label { color:var(--muted); font-size:.85rem; }
.cards { display:grid; grid-template-columns:repeat(auto-fill,minmax(240px,1fr)); gap:14px; margin-bottom:28px; }
.card { background:var(--card); border-radius:12px; padding:16px; }
.card a { color:var(--fg); text-decoration:none; }
.card .icon { font-size:1.6rem; }
.card .desc { color:var(--muted); font-size:.9rem; }
.card .repo { font-size:.8rem; color:var(--accent); }
.brief { background:var(--card); border-radius:12px; padding:28px; }
.brief h1 { font-size:1.5rem; border-bottom:1px solid #263056; padding-bottom:6px; }
.brief h2 { font-size:1.25rem; }
.brief h3 { font-size:1.05rem; color:var(--muted); }
.brief strong { color:#ffd166; }
footer { text-align:center; color:var(--muted); font-size:.8rem; margin-top:28px; }
@media (max-width:700px) { .stats { grid-template-columns:repeat(2,1fr); } }
";

pub fn display_date(ts: DateTime<Utc>) -> String {
    ts.format("%A, %B %-d, %Y").to_string()
}

fn nav_cards(sources: &[SourceDescriptor]) -> String {
    let mut out = String::new();
    for s in sources {
        let _ = writeln!(
            out,
            "<div class=\"card\"><a href=\"{url}\" target=\"_blank\" rel=\"noopener\">\
<div class=\"icon\">{icon}</div><h3>{name}</h3><div class=\"desc\">{desc}</div></a>\
<a class=\"repo\" href=\"{repo}\" target=\"_blank\" rel=\"noopener\">Source</a></div>",
            url = attr(&s.url),
            icon = text(&s.icon),
            name = text(&s.name),
            desc = text(&s.description),
            repo = attr(&s.repo),
        );
    }
    out
}

fn stats_band(stats: &[Stat]) -> String {
    let mut out = String::new();
    for st in stats {
        let _ = writeln!(
            out,
            "<div class=\"stat\"><div class=\"value\">{}</div><div class=\"label\">{}</div></div>",
            text(&st.value),
            text(&st.label),
        );
    }
    out
}

/// Full self-contained HTML document.
pub fn page(
    title: &str,
    sources: &[SourceDescriptor],
    stats: &[Stat],
    generated_at: DateTime<Utc>,
    brief_html: &str,
) -> String {
    let date = display_date(generated_at);
    let iso = generated_at.to_rfc3339();
    let time = generated_at.format("%H:%M UTC");
    format!(
        "<!DOCTYPE html>
<html lang=\"en\">
<head>
<meta charset=\"UTF-8\">
<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">
<title>{title_t} - {date}</title>
<style>{STYLE}</style>
</head>
<body>
<div class=\"container\">
<header>
<h1>{title_t}</h1>
<time class=\"badge\" datetime=\"{iso}\">📅 {date} · {time}</time>
</header>
<section class=\"stats\">
{stats}</section>
<nav class=\"cards\">
{cards}</nav>
<article class=\"brief\">
{brief_html}</article>
<footer>Generated {iso}. Not investment advice.</footer>
</div>
</body>
</html>
",
        title_t = text(title),
        stats = stats_band(stats),
        cards = nav_cards(sources),
    )
}
