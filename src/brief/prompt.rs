// src/brief/prompt.rs
//! Prompt assembly for the daily brief.

use std::fmt::Write as _;

use crate::ingest::types::Snapshot;

/// Section outline the model must follow. The fallback brief reuses the
/// first heading so both provenances open the same way.
pub const EXECUTIVE_SUMMARY_HEADING: &str = "# 📊 Executive Summary";

const OUTLINE: &str = r"# 📊 Executive Summary
Provide 3-4 sentences capturing the most critical market dynamics across crypto, macro, and AI/tech sectors.

# 🎯 Market Risk Assessment
**Composite Risk Score Analysis:**
- Current risk level and trajectory
- Key stress indicators (USD/JPY, MOVE Index, Treasury Yields)
- Cross-market correlation signals

# ₿ Crypto Market Deep Dive
**Bitcoin & Ethereum:**
- Price positioning vs. 20-Week SMA and Bull/Bear Bands
- Risk metrics and momentum indicators
- ETH/BTC ratio implications

**Sentiment & Technical:**
- Fear & Greed Index interpretation
- RSI levels and oversold/overbought conditions
- Support and resistance levels for next 24-48 hours

# 🌍 Macro Environment
**Dollar & Rates:**
- DXY strength/weakness and crypto correlation
- Fed Funds Rate positioning
- 10Y-2Y yield curve implications

**Traditional Markets:**
- S&P 500 momentum and risk-on/risk-off signals
- Gold price action as safe-haven indicator
- Oil and commodity trends

# 🤖 AI & Technology Intelligence
**Key Breakthroughs:**
- Notable model, robotics, quantum and materials advances
- Cross-domain applications

**Investment Implications:**
- Tech stocks with AI exposure
- Semiconductor sector opportunities

# 🇸🇦 TASI & Regional Opportunities
Analyze TASI positioning relative to:
- Oil price movements
- Global risk appetite
- Regional geopolitical factors
- Sector-specific opportunities (Ma'aden, SABIC, Aramco, ACWA Power, STC)

# 🎯 Actionable Trading Strategies
**Position Recommendations:**
1. **ACCUMULATE / HOLD / DISTRIBUTE** - with specific reasoning
2. Entry points and target levels
3. Stop-loss recommendations
4. Position sizing guidance

**Immediate Actions (Next 24 Hours):**
- Specific trades to consider
- Levels to watch
- Risk management adjustments

# ⚠️ Risk Factors & Watchlist
**Top 5 Risks:**
1. [Risk with probability estimate]
2. [Risk with probability estimate]
3. [Risk with probability estimate]
4. [Risk with probability estimate]
5. [Risk with probability estimate]

**Key Events This Week:**
- Economic data releases
- FOMC meetings or policy decisions
- Geopolitical developments
- Crypto-specific catalysts

# 📈 Probability-Weighted Scenarios
**Bullish Case (X% probability):**
- Triggers and target levels

**Base Case (X% probability):**
- Expected range and dynamics

**Bearish Case (X% probability):**
- Warning signs and downside targets

# 🔮 24-Hour Outlook
Precise predictions for:
- BTC price range
- Major crypto movements
- Macro event impacts
- Key technical levels";

const REQUIREMENTS: &str = r"**CRITICAL REQUIREMENTS:**
1. Use actual numbers and specific levels (not vague terms)
2. Provide actionable insights with clear entry/exit points
3. Include probability estimates for major scenarios
4. Cross-reference signals across dashboards
5. Highlight divergences or confirmations between data sources
6. Be concise but comprehensive - aim for 800-1200 words
7. Use markdown formatting with clear sections
8. Bold key insights and numbers
9. NO generic advice - everything must be specific to TODAY'S data";

/// One line per live quote, e.g. `- BTC-USD: 50000.00 (+1000.00, +2.04%)`.
pub fn format_quotes(snapshot: &Snapshot) -> String {
    if snapshot.quotes.is_empty() {
        return "- (no live quotes available)\n".to_string();
    }
    let mut out = String::new();
    for (symbol, q) in &snapshot.quotes {
        let _ = writeln!(
            out,
            "- {symbol}: {:.2} ({:+.2}, {:+.2}%)",
            q.price, q.change, q.change_percent
        );
    }
    out
}

pub fn build_prompt(snapshot: &Snapshot) -> String {
    let timestamp = snapshot.generated_at.to_rfc3339();
    let dashboards =
        serde_json::to_string_pretty(&snapshot.sources).unwrap_or_else(|_| "{}".to_string());

    format!(
        "You are a senior quantitative analyst and market intelligence strategist. \
Analyze the following multi-dashboard data and provide a comprehensive daily intelligence brief for {timestamp}.

LIVE MARKET QUOTES:
{quotes}
DASHBOARD DATA SUMMARY:
{dashboards}

Your analysis must be structured as follows:

{OUTLINE}

---

{REQUIREMENTS}

Begin your analysis now.",
        quotes = format_quotes(snapshot),
    )
}
