//! Integration tests over realistic model replies.
//!
//! Each test feeds a complete response, narrative plus decision array, through
//! `parse_full_decision_response()` and checks the batch or the failure that
//! comes back, including the context recovered on failure.

use cotdex_engine::test_support::{open_long, open_short, render_response};
use cotdex_engine::{
    parse_full_decision_response, ExtractionError, ParseError, ValidationError,
};
use cotdex_models::{Action, CotdexConfig, Decision, RiskLimits, ValidationConfig};

const EQUITY: f64 = 2500.0;

fn validation() -> ValidationConfig {
    let config: CotdexConfig = toml::from_str(
        r#"
[leverage]
major = 10
altcoin = 5
"#,
    )
    .unwrap();
    config.validation_for(EQUITY)
}

#[test]
fn scenario_full_cycle_reply() {
    let raw = r#"## Account
Equity 2500 USDT, margin usage 12%, one open position (SOLUSDT long).

## Positions
SOLUSDT long is +4.2% with the 4h structure intact; keep it.

## Candidates
BTCUSDT reclaimed 64k on rising open interest, funding neutral. Clean long.
DOGEUSDT rejected at the daily range high, OI falling. Short the retest.

```json
[
  {"symbol": "SOLUSDT", "action": "hold", "reasoning": "Structure intact, trail stop"},
  {"symbol": "BTCUSDT", "action": "open_long", "leverage": 10, "position_size_usd": 20000,
   "stop_loss": 62500, "take_profit": 70000, "confidence": 82, "risk_usd": 470,
   "reasoning": "Reclaim of 64k with OI expansion"},
  {"symbol": "DOGEUSDT", "action": "open_short", "leverage": 3, "position_size_usd": 3600,
   "stop_loss": 0.182, "take_profit": 0.150, "confidence": 70, "risk_usd": 90,
   "reasoning": "Range high rejection"}
]
```"#;

    let batch = parse_full_decision_response(raw, &validation()).unwrap();
    assert!(batch.narrative.starts_with("## Account"));
    assert!(batch.narrative.ends_with("```json"));
    assert_eq!(batch.decisions.len(), 3);
    assert_eq!(batch.decisions[1].action, Action::OpenLong);
    assert_eq!(batch.decisions[1].leverage, 10);
    assert_eq!(batch.decisions[2].stop_loss, 0.182);

    let actionable: Vec<&str> = batch.actionable().map(|d| d.symbol.as_str()).collect();
    assert_eq!(actionable, vec!["BTCUSDT", "DOGEUSDT"]);
}

#[test]
fn scenario_typographic_quotes_from_input_method() {
    let raw = "Shorting ETH into resistance.\n\
        [{\u{201C}symbol\u{201D}: \u{201C}ETHUSDT\u{201D}, \u{201C}action\u{201D}: \u{201C}open_short\u{201D}, \
        \u{201C}leverage\u{201D}: 5, \u{201C}position_size_usd\u{201D}: 12000, \
        \u{201C}stop_loss\u{201D}: 3450, \u{201C}take_profit\u{201D}: 3100, \
        \u{201C}reasoning\u{201D}: \u{201C}Bear flag, it\u{2019}s heavy\u{201D}}]";

    let batch = parse_full_decision_response(raw, &validation()).unwrap();
    assert_eq!(batch.narrative, "Shorting ETH into resistance.");
    assert_eq!(batch.decisions[0].reasoning, "Bear flag, it's heavy");
    assert_eq!(batch.decisions[0].action, Action::OpenShort);
}

#[test]
fn scenario_narrative_only_reply() {
    let raw = "Volatility is compressed across the board and nothing meets my criteria. \
               Waiting for the US open before committing capital.";

    let failure = parse_full_decision_response(raw, &validation()).unwrap_err();
    assert_eq!(
        failure.error,
        ParseError::Extraction(ExtractionError::MissingArrayStart)
    );
    assert_eq!(failure.narrative, raw);
    assert!(failure.decisions.is_empty());
}

#[test]
fn scenario_reply_cut_off_mid_array() {
    let raw = "Two setups today.\n[\n  {\"symbol\": \"BTCUSDT\", \"action\": \"open_long\", \"leverage\": 5,\n  {\"symbol\": \"ETH";

    let failure = parse_full_decision_response(raw, &validation()).unwrap_err();
    match failure.error {
        ParseError::Extraction(ExtractionError::UnterminatedArray { start }) => {
            assert_eq!(&raw[start..start + 1], "[");
        }
        other => panic!("expected unterminated array, got {other:?}"),
    }
    assert_eq!(failure.narrative, "Two setups today.");
}

#[test]
fn scenario_trailing_comma_is_a_decode_error() {
    let raw = "Holding everything.\n[{\"symbol\": \"BTCUSDT\", \"action\": \"hold\", \"reasoning\": \"ok\"},]";

    let failure = parse_full_decision_response(raw, &validation()).unwrap_err();
    match &failure.error {
        ParseError::Decode { json, .. } => {
            assert_eq!(
                json,
                "[{\"symbol\": \"BTCUSDT\", \"action\": \"hold\", \"reasoning\": \"ok\"},]"
            );
        }
        other => panic!("expected decode error, got {other:?}"),
    }
    assert_eq!(failure.narrative, "Holding everything.");
}

#[test]
fn scenario_second_of_three_oversized() {
    let decisions = vec![
        open_long("BTCUSDT", 8, 15_000.0, 62_000.0, 68_000.0),
        // altcoin ceiling is 1.5 x 2500 = 3750
        open_short("PEPEUSDT", 3, 5000.0, 0.000012, 0.000010),
        Decision::new("ETHUSDT", Action::Hold, "unchanged"),
    ];
    let raw = render_response("Risk-on across majors, memes overextended.", &decisions);

    let failure = parse_full_decision_response(&raw, &validation()).unwrap_err();
    assert_eq!(
        failure.error,
        ParseError::Validation(ValidationError::PositionSizeExceeded {
            position: 2,
            symbol: "PEPEUSDT".to_string(),
            position_size_usd: 5000.0,
            max_position_usd: 3750.0,
        })
    );
    assert_eq!(failure.decisions.len(), 2);
    assert_eq!(failure.decisions[0], decisions[0]);
    assert_eq!(failure.decisions[1], decisions[1]);
}

#[test]
fn scenario_invalid_action_named_in_error() {
    let raw = "Adding to the winner.\n[{\"symbol\": \"BTCUSDT\", \"action\": \"add_long\", \"reasoning\": \"pyramid\"}]";

    let failure = parse_full_decision_response(raw, &validation()).unwrap_err();
    assert_eq!(
        failure.error,
        ParseError::Validation(ValidationError::InvalidAction {
            position: 1,
            action: "add_long".to_string(),
        })
    );
    assert_eq!(failure.decisions.len(), 1);
}

#[test]
fn scenario_stricter_risk_limits_from_config() {
    let config: CotdexConfig = toml::from_str(
        r#"
[leverage]
major = 10
altcoin = 5

[limits]
assumed_entry_fraction = 0.5
"#,
    )
    .unwrap();
    let validation = config.validation_for(EQUITY);
    let raw = render_response(
        "Tight range trade.",
        &[open_long("BTCUSDT", 5, 5000.0, 100.0, 110.0)],
    );

    let failure = parse_full_decision_response(&raw, &validation).unwrap_err();
    match failure.error {
        ParseError::Validation(ValidationError::RiskRewardTooLow { ratio, .. }) => {
            assert!((ratio - 1.0).abs() < 1e-9);
        }
        other => panic!("expected RiskRewardTooLow, got {other:?}"),
    }
}

#[test]
fn scenario_custom_major_list() {
    let limits = RiskLimits {
        major_symbols: vec!["BTCUSDT".to_string(), "ETHUSDT".to_string(), "SOLUSDT".to_string()],
        ..RiskLimits::default()
    };
    let validation = validation().with_limits(limits);
    // 8x would breach the altcoin cap of 5 but SOL is now a major
    let raw = render_response(
        "SOL treated as a major.",
        &[open_long("SOLUSDT", 8, 20_000.0, 140.0, 170.0)],
    );

    assert!(parse_full_decision_response(&raw, &validation).is_ok());
}

#[test]
fn scenario_empty_array_is_a_valid_batch() {
    let batch = parse_full_decision_response("No trades.\n[]", &validation()).unwrap();
    assert_eq!(batch.narrative, "No trades.");
    assert!(batch.is_empty());
}
