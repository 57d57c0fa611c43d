//! Plain-text rendering of view state for the terminal.

use std::fmt::Write;

use chrono::{DateTime, Utc};
use likeboost_api::functions::{AlreadyClaimed, LikeOutcome, LikeSuccess};
use likeboost_api::models::AutoLike;
use likeboost_api::rpc::{AutoLikeHistoryEntry, LikeHistoryEntry};

use crate::admin::UserWithLimits;
use crate::history::PageItem;
use crate::quota::DEFAULT_DAILY_REQUESTS;

/// `Mar 1, 2025, 05:00 AM`
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.format("%b %-d, %Y, %I:%M %p").to_string()
}

/// `Mar 1, 2025`
pub fn format_date(ts: &DateTime<Utc>) -> String {
    ts.format("%b %-d, %Y").to_string()
}

/// Thousands separated with commas, `12345` as `12,345`.
pub fn group_digits(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        out.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

pub fn remaining(remaining: Option<u32>) -> String {
    match remaining {
        None => "Sign in to see your requests remaining".to_owned(),
        Some(0) => "No Requests Remaining".to_owned(),
        Some(n) => format!("Requests remaining today: {n}"),
    }
}

pub fn outcome(outcome: &LikeOutcome) -> String {
    match outcome {
        LikeOutcome::Success(s) => success(s),
        LikeOutcome::AlreadyClaimed(c) => already_claimed(c),
    }
}

fn success(s: &LikeSuccess) -> String {
    let mut out = String::from("Likes Sent Successfully!\nYour Free Fire likes were sent!\n\n");
    let _ = writeln!(out, "  Player Name    {}", s.player.as_deref().unwrap_or("Unknown"));
    if let Some(uid) = &s.uid {
        let _ = writeln!(out, "  UID            {uid}");
    }
    let _ = writeln!(
        out,
        "  Likes Journey  {} -> {}",
        group_digits(s.likes_before),
        group_digits(s.likes_after)
    );
    let _ = writeln!(out, "  Likes Added    +{}", group_digits(s.likes_added));
    out.push_str("\nCome back tomorrow for more likes!");
    out
}

fn already_claimed(c: &AlreadyClaimed) -> String {
    let mut out = String::from(
        "Already Claimed Today\nThis UID has already claimed likes today. Try again tomorrow!\n",
    );
    if let Some(next) = &c.next_available {
        let _ = writeln!(out, "Next available: {}", format_timestamp(next));
    }
    out.push_str("You can only claim likes once per day for each UID.");
    out
}

/// Page bar, `« 1 … 4 [5] 6 … 10 »`.
pub fn page_bar(items: &[PageItem], current: u32) -> String {
    if items.is_empty() {
        return String::new();
    }
    let mut parts = vec!["«".to_owned()];
    parts.extend(items.iter().map(|item| match item {
        PageItem::Page(n) if *n == current => format!("[{n}]"),
        PageItem::Page(n) => n.to_string(),
        PageItem::Ellipsis => "…".to_owned(),
    }));
    parts.push("»".to_owned());
    parts.join(" ")
}

pub fn like_history(rows: &[LikeHistoryEntry]) -> String {
    if rows.is_empty() {
        return "No like history in the last 24 hours\n\
                Successful like requests from the last 24 hours will appear here"
            .to_owned();
    }
    let mut out = String::new();
    for row in rows {
        let _ = writeln!(
            out,
            "{:<20} {:<14} {:>9} -> {:<9} +{:<6} {}",
            row.player_name.as_deref().unwrap_or("Unknown"),
            row.uid,
            group_digits(row.likes_before),
            group_digits(row.likes_after),
            row.likes_added,
            format_timestamp(&row.created_at),
        );
    }
    out
}

pub fn auto_like_history(rows: &[AutoLikeHistoryEntry]) -> String {
    if rows.is_empty() {
        return "No auto-like history in the last 24 hours\n\
                Successful auto-like requests from the last 24 hours will appear here"
            .to_owned();
    }
    let mut out = String::new();
    for row in rows {
        let status = match row.status {
            Some(1) => "SUCCESS",
            _ => "CLAIMED",
        };
        let executed = row.executed_at.as_ref().unwrap_or(&row.sent_at);
        let _ = write!(
            out,
            "{status:<8} {:<20} {:<14} {}",
            row.player_name.as_deref().unwrap_or("Unknown"),
            row.uid,
            format_date(executed),
        );
        if row.status == Some(1) {
            let _ = write!(
                out,
                "  {} -> {} (+{})",
                group_digits(row.likes_before),
                group_digits(row.likes_after),
                row.likes_added
            );
        }
        out.push('\n');
    }
    out
}

pub fn auto_likes(rows: &[AutoLike]) -> String {
    if rows.is_empty() {
        return "No auto-likes configured yet. Add your first UID!".to_owned();
    }
    let mut out = String::new();
    for row in rows {
        let _ = writeln!(
            out,
            "{}  {:<14} {:<8} next {}  last {}",
            row.id,
            row.uid,
            if row.is_active { "active" } else { "paused" },
            format_timestamp(&row.next_run_at),
            row.last_run_at
                .as_ref()
                .map(format_timestamp)
                .unwrap_or_else(|| "never".to_owned()),
        );
    }
    out
}

pub fn users(rows: &[&UserWithLimits]) -> String {
    if rows.is_empty() {
        return "No users found".to_owned();
    }
    let mut out = String::new();
    for user in rows {
        let (daily, extra, used) = user
            .limits
            .as_ref()
            .map(|l| {
                (
                    l.allowance.daily_requests,
                    l.allowance.extra_requests,
                    l.allowance.requests_used_today,
                )
            })
            .unwrap_or((i64::from(DEFAULT_DAILY_REQUESTS), 0, 0));
        let _ = writeln!(
            out,
            "{}  {:<32} daily {daily} extra {extra} used {used}  joined {}",
            user.profile.id,
            user.email(),
            format_date(&user.profile.created_at),
        );
    }
    out
}
