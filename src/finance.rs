use crate::constants::{BALANCE_EPSILON, SPLIT_TOLERANCE};
use crate::error::RoteiroError;
use crate::models::{
    DistributionMethod, Participant, Payer, Position, SettlementSuggestion, SplitDetail,
    Transaction, TransactionRole,
};
use log::debug;
use std::collections::HashMap;
use uuid::Uuid;

/// Round to 2 decimal places (minor currency units), half away from zero.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Computes the per-participant split rows for one transaction.
///
/// `custom_values` maps participant id to the method-specific value: an
/// absolute amount for EXACT, percentage points for PERCENTAGE, a share
/// count for SHARES. It is ignored for EQUAL. Participants without an
/// entry get a zero, uninvolved row.
///
/// Each share is rounded to 2 decimals independently; the involved sum may
/// therefore drift from `total_amount` by up to `0.01 × involved`. No
/// remainder redistribution is applied. EXACT and PERCENTAGE values are
/// not checked against the total here — see [`validate_split_totals`].
pub fn calculate_split_breakdown(
    total_amount: f64,
    participants: &[Uuid],
    method: DistributionMethod,
    custom_values: Option<&HashMap<Uuid, f64>>,
) -> Result<Vec<SplitDetail>, RoteiroError> {
    let empty = HashMap::new();
    let values = custom_values.unwrap_or(&empty);

    let breakdown = match method {
        DistributionMethod::Equal => {
            if participants.is_empty() {
                return Err(RoteiroError::EmptySplit);
            }
            let share = round2(total_amount / participants.len() as f64);
            participants
                .iter()
                .map(|&user_id| SplitDetail {
                    user_id,
                    owed_share: share,
                    percentage: None,
                    shares: None,
                    is_involved: true,
                })
                .collect()
        }
        DistributionMethod::Exact => participants
            .iter()
            .map(|&user_id| {
                let amount = values.get(&user_id).copied().unwrap_or(0.0);
                SplitDetail {
                    user_id,
                    owed_share: round2(amount),
                    percentage: None,
                    shares: None,
                    is_involved: amount > 0.0,
                }
            })
            .collect(),
        DistributionMethod::Percentage => participants
            .iter()
            .map(|&user_id| {
                let percentage = values.get(&user_id).copied().unwrap_or(0.0);
                SplitDetail {
                    user_id,
                    owed_share: round2(total_amount * percentage / 100.0),
                    percentage: Some(percentage),
                    shares: None,
                    is_involved: percentage > 0.0,
                }
            })
            .collect(),
        DistributionMethod::Shares => {
            let total_shares: f64 = participants
                .iter()
                .map(|id| values.get(id).copied().unwrap_or(0.0))
                .sum();
            let per_share = if total_shares > 0.0 {
                total_amount / total_shares
            } else {
                0.0
            };
            participants
                .iter()
                .map(|&user_id| {
                    let shares = values.get(&user_id).copied().unwrap_or(0.0);
                    SplitDetail {
                        user_id,
                        owed_share: round2(per_share * shares),
                        percentage: None,
                        shares: Some(shares),
                        is_involved: shares > 0.0,
                    }
                })
                .collect()
        }
    };

    Ok(breakdown)
}

/// Checks that the involved shares of a breakdown add up to the total,
/// within the per-share rounding tolerance. The calculator itself trusts
/// its input; callers run this before saving EXACT or PERCENTAGE splits.
pub fn validate_split_totals(
    total_amount: f64,
    breakdown: &[SplitDetail],
) -> Result<(), RoteiroError> {
    let involved: Vec<&SplitDetail> = breakdown.iter().filter(|d| d.is_involved).collect();
    let sum: f64 = involved.iter().map(|d| d.owed_share).sum();
    let tolerance = SPLIT_TOLERANCE * involved.len().max(1) as f64;
    if (sum - total_amount).abs() > tolerance {
        return Err(RoteiroError::SplitMismatch {
            expected: total_amount,
            actual: round2(sum),
        });
    }
    Ok(())
}

/// Checks that the payer amounts of a transaction add up to the total.
pub fn validate_payer_totals(total_amount: f64, payers: &[Payer]) -> Result<(), RoteiroError> {
    let sum: f64 = payers.iter().map(|p| p.amount_paid).sum();
    let tolerance = SPLIT_TOLERANCE * payers.len().max(1) as f64;
    if (sum - total_amount).abs() > tolerance {
        return Err(RoteiroError::PayerMismatch {
            expected: total_amount,
            actual: round2(sum),
        });
    }
    Ok(())
}

/// Recomputes every participant's net balance from the full transaction
/// set. Payers are credited what they fronted; involved split rows are
/// debited what they owe. Soft-deleted transactions are skipped. Rounding
/// happens once at the end so errors do not compound across transactions.
pub fn calculate_net_balances(
    transactions: &[Transaction],
    participants: &[Participant],
) -> Vec<Participant> {
    debug!(
        "Calculating net balances over {} transactions for {} participants",
        transactions.len(),
        participants.len()
    );
    let mut balances: HashMap<Uuid, f64> =
        participants.iter().map(|p| (p.id, 0.0)).collect();

    for tx in transactions.iter().filter(|tx| tx.deleted_at.is_none()) {
        for payer in &tx.payers {
            *balances.entry(payer.user_id).or_insert(0.0) += payer.amount_paid;
        }
        for row in tx.split_breakdown.iter().filter(|r| r.is_involved) {
            *balances.entry(row.user_id).or_insert(0.0) -= row.owed_share;
        }
    }

    participants
        .iter()
        .map(|p| Participant {
            id: p.id,
            name: p.name.clone(),
            net_balance: round2(balances.get(&p.id).copied().unwrap_or(0.0)),
        })
        .collect()
}

/// A participant's side of one transaction: what they fronted minus what
/// they owe on it.
pub fn transaction_role(tx: &Transaction, user_id: Uuid) -> TransactionRole {
    let paid: f64 = tx
        .payers
        .iter()
        .filter(|p| p.user_id == user_id)
        .map(|p| p.amount_paid)
        .sum();
    let owed: f64 = tx
        .split_breakdown
        .iter()
        .filter(|r| r.is_involved && r.user_id == user_id)
        .map(|r| r.owed_share)
        .sum();

    let net = round2(paid - owed);
    if net > 0.0 {
        TransactionRole::Lent(net)
    } else if net < 0.0 {
        TransactionRole::Borrowed(-net)
    } else {
        TransactionRole::Even
    }
}

/// Classifies a net balance, treating anything within `BALANCE_EPSILON` of
/// zero as settled so floating-point residue never flips a participant
/// into creditor or debtor.
pub fn position_of(net_balance: f64) -> Position {
    if net_balance > BALANCE_EPSILON {
        Position::Creditor
    } else if net_balance < -BALANCE_EPSILON {
        Position::Debtor
    } else {
        Position::Settled
    }
}

/// Greedy creditor/debtor matching: repeatedly settles the current debtor
/// against the current creditor until one side is exhausted. Produces at
/// most `creditors + debtors - 1` transfers.
pub fn suggest_settlements(balances: &HashMap<Uuid, f64>) -> Vec<SettlementSuggestion> {
    debug!("Suggesting settlements for balances: {:?}", balances);
    let mut creditors: Vec<(Uuid, f64)> = balances
        .iter()
        .filter_map(|(&user, &bal)| {
            if bal > BALANCE_EPSILON {
                Some((user, bal))
            } else {
                None
            }
        })
        .collect();

    let mut debtors: Vec<(Uuid, f64)> = balances
        .iter()
        .filter_map(|(&user, &bal)| {
            if bal < -BALANCE_EPSILON {
                Some((user, -bal))
            } else {
                None
            }
        })
        .collect();

    // Avoid sorting for small groups; largest-first only pays off beyond that
    if creditors.len() > 10 || debtors.len() > 10 {
        creditors.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap());
        debtors.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap());
    }

    let mut suggestions = Vec::new();
    let mut i = 0;
    let mut j = 0;

    while i < debtors.len() && j < creditors.len() {
        let (debtor_id, mut debt_amt) = debtors[i];
        let (creditor_id, mut credit_amt) = creditors[j];

        let settled_amt = debt_amt.min(credit_amt);

        if settled_amt > BALANCE_EPSILON {
            suggestions.push(SettlementSuggestion {
                from_user_id: debtor_id,
                to_user_id: creditor_id,
                amount: round2(settled_amt),
            });
        }

        debt_amt -= settled_amt;
        credit_amt -= settled_amt;

        debtors[i].1 = debt_amt;
        creditors[j].1 = credit_amt;

        if debt_amt < BALANCE_EPSILON {
            i += 1;
        }
        if credit_amt < BALANCE_EPSILON {
            j += 1;
        }
    }

    debug!("Suggested settlements: {:?}", suggestions);
    suggestions
}
