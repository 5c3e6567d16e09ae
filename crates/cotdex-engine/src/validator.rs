use cotdex_models::{Action, Decision, ValidationConfig};

use crate::error::ValidationError;

/// Risk and reward of an opening decision, measured from an assumed entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskReward {
    pub entry: f64,
    /// Distance from entry to stop loss, in percent of entry.
    pub risk_pct: f64,
    /// Distance from entry to take profit, in percent of entry.
    pub reward_pct: f64,
    /// `reward_pct / risk_pct`, or 0 when there is no measurable risk.
    pub ratio: f64,
}

/// Model the entry as `entry_fraction` of the way from stop loss toward take
/// profit, then measure both legs relative to it.
pub fn assess_risk_reward(
    is_long: bool,
    stop_loss: f64,
    take_profit: f64,
    entry_fraction: f64,
) -> RiskReward {
    let (entry, risk_pct, reward_pct) = if is_long {
        let entry = stop_loss + (take_profit - stop_loss) * entry_fraction;
        (
            entry,
            (entry - stop_loss) / entry * 100.0,
            (take_profit - entry) / entry * 100.0,
        )
    } else {
        let entry = stop_loss - (stop_loss - take_profit) * entry_fraction;
        (
            entry,
            (stop_loss - entry) / entry * 100.0,
            (entry - take_profit) / entry * 100.0,
        )
    };

    let ratio = if risk_pct > 0.0 {
        reward_pct / risk_pct
    } else {
        0.0
    };

    RiskReward {
        entry,
        risk_pct,
        reward_pct,
        ratio,
    }
}

/// Validate decisions in order, stopping at the first violation.
pub fn validate_decisions(
    decisions: &[Decision],
    config: &ValidationConfig,
) -> Result<(), ValidationError> {
    decisions
        .iter()
        .enumerate()
        .try_for_each(|(i, decision)| validate_decision(decision, i + 1, config))
}

/// Validate one decision. `position` is its 1-based place in the batch and is
/// only used for error reporting.
pub fn validate_decision(
    decision: &Decision,
    position: usize,
    config: &ValidationConfig,
) -> Result<(), ValidationError> {
    if let Action::Unrecognized(raw) = &decision.action {
        return Err(ValidationError::InvalidAction {
            position,
            action: raw.clone(),
        });
    }

    if decision.symbol.trim().is_empty() {
        return Err(ValidationError::MissingField {
            position,
            field: "symbol",
        });
    }
    if decision.reasoning.trim().is_empty() {
        return Err(ValidationError::MissingField {
            position,
            field: "reasoning",
        });
    }

    if decision.action.is_open() {
        validate_open(decision, position, config)?;
    }

    Ok(())
}

fn validate_open(
    decision: &Decision,
    position: usize,
    config: &ValidationConfig,
) -> Result<(), ValidationError> {
    let symbol = decision.symbol.as_str();
    let max_leverage = config.leverage_cap(symbol);
    if decision.leverage < 1 || decision.leverage > i64::from(max_leverage) {
        return Err(ValidationError::LeverageOutOfRange {
            position,
            symbol: symbol.to_string(),
            leverage: decision.leverage,
            max: max_leverage,
        });
    }

    if decision.position_size_usd <= 0.0 {
        return Err(ValidationError::InvalidPositionSize {
            position,
            position_size_usd: decision.position_size_usd,
        });
    }

    // tolerance absorbs rounding in the model's own size arithmetic
    let max_position_usd = config.max_position_usd(symbol);
    let tolerance = max_position_usd * config.limits.position_tolerance;
    if decision.position_size_usd > max_position_usd + tolerance {
        return Err(ValidationError::PositionSizeExceeded {
            position,
            symbol: symbol.to_string(),
            position_size_usd: decision.position_size_usd,
            max_position_usd,
        });
    }

    let (stop_loss, take_profit) = (decision.stop_loss, decision.take_profit);
    if stop_loss <= 0.0 || take_profit <= 0.0 {
        return Err(ValidationError::InvalidPrice {
            position,
            stop_loss,
            take_profit,
        });
    }

    let is_long = decision.action == Action::OpenLong;
    let ordered = if is_long {
        stop_loss < take_profit
    } else {
        stop_loss > take_profit
    };
    if !ordered {
        return Err(ValidationError::InvalidPriceOrdering {
            position,
            action: decision.action.to_string(),
            stop_loss,
            take_profit,
        });
    }

    let rr = assess_risk_reward(
        is_long,
        stop_loss,
        take_profit,
        config.limits.assumed_entry_fraction,
    );
    if rr.ratio < config.limits.min_risk_reward {
        return Err(ValidationError::RiskRewardTooLow {
            position,
            ratio: rr.ratio,
            min_ratio: config.limits.min_risk_reward,
            risk_pct: rr.risk_pct,
            reward_pct: rr.reward_pct,
            stop_loss,
            take_profit,
        });
    }

    Ok(())
}
