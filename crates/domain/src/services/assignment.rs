//! Assignment strategy and eligibility for worked requests.
//!
//! Module settings configure how new bearer/cleaner requests reach staff:
//! either assigned directly to the next member in rotation (Round-Robin), or
//! broadcast to every eligible member with the first acceptor taking the
//! request (Notify-Accept).

use chrono::{DateTime, NaiveTime, Utc};
use uuid::Uuid;

use crate::models::account::{Account, Presence};
use crate::models::settings::{AssignmentSettings, Shift};
use crate::models::request::Assignee;

/// Configured routing strategy for new worked requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentStrategy {
    RoundRobin,
    NotifyAccept,
}

impl AssignmentStrategy {
    /// Unknown or missing algorithm names fall back to Notify-Accept, which
    /// never assigns anyone unasked.
    pub fn from_settings(settings: &AssignmentSettings) -> Self {
        match settings.selected_algo.as_deref() {
            Some("Round-Robin") => AssignmentStrategy::RoundRobin,
            _ => AssignmentStrategy::NotifyAccept,
        }
    }
}

/// Outcome of routing a new request.
#[derive(Debug, Clone, PartialEq)]
pub enum AssignmentDecision {
    /// Assign directly to this staff member.
    Direct(Assignee),
    /// Notify these staff members; the first to accept takes the request.
    Notify(Vec<Assignee>),
    /// Nobody is currently eligible.
    NoneEligible,
}

/// Accounts eligible to work a request for `role_name` at `at`.
///
/// Eligible means: holds the role, is online, and — when shifts are in use —
/// the request time falls inside a staffed shift window. Outside every
/// configured window the service is unstaffed.
pub fn eligible_assignees(
    accounts: &[Account],
    role_name: &str,
    settings: &AssignmentSettings,
    at: DateTime<Utc>,
) -> Vec<Assignee> {
    let time = at.time();
    if settings.use_shifts
        && !settings.shifts.is_empty()
        && !settings.shifts.iter().any(|shift| in_shift(shift, time))
    {
        return Vec::new();
    }

    accounts
        .iter()
        .filter(|account| account.role.name == role_name)
        .filter(|account| account.status == Presence::Online)
        .map(|account| Assignee {
            id: account.id,
            label: account.display_label(),
        })
        .collect()
}

/// Routes a request among the eligible staff. `last_assigned` feeds the
/// round-robin rotation, which walks accounts in stable id order.
pub fn decide_assignment(
    strategy: AssignmentStrategy,
    eligible: Vec<Assignee>,
    last_assigned: Option<Uuid>,
) -> AssignmentDecision {
    if eligible.is_empty() {
        return AssignmentDecision::NoneEligible;
    }

    match strategy {
        AssignmentStrategy::NotifyAccept => AssignmentDecision::Notify(eligible),
        AssignmentStrategy::RoundRobin => {
            let mut ordered = eligible;
            ordered.sort_by_key(|a| a.id);
            let next = last_assigned
                .and_then(|prev| ordered.iter().find(|a| a.id > prev))
                .or_else(|| ordered.first())
                .cloned();
            match next {
                Some(assignee) => AssignmentDecision::Direct(assignee),
                None => AssignmentDecision::NoneEligible,
            }
        }
    }
}

/// True when `at` falls inside the shift window. A `to` of `00:00` (or any
/// `to` at or before `from`) wraps past midnight. Unparseable bounds make the
/// shift never match.
fn in_shift(shift: &Shift, at: NaiveTime) -> bool {
    let (Some(from), Some(to)) = (parse_shift_time(&shift.from), parse_shift_time(&shift.to))
    else {
        return false;
    };
    if from < to {
        from <= at && at < to
    } else {
        at >= from || at < to
    }
}

fn parse_shift_time(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M").ok()
}
