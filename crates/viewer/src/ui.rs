//! Latest UI side data: event log, scores, round state.
//!
//! Nothing here is drawn by the viewer itself. It is kept up to date for
//! whatever displays it.

use std::collections::VecDeque;

use crate::net::protocol::{RoundState, ScoreEntry, ServiceStat, UiUpdateMessage};

pub const EVENT_LOG_LINES: usize = 8;

/// Newest-first log of game events, as plain text.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    lines: VecDeque<String>,
}

impl EventLog {
    pub fn push(&mut self, html: &str) {
        self.lines.push_front(strip_html(html));
        self.lines.truncate(EVENT_LOG_LINES);
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Drop markup tags and decode the handful of entities the server emits.
pub fn strip_html(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for ch in html.chars() {
        match ch {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            c if !in_tag => out.push(c),
            _ => {}
        }
    }
    out.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

#[derive(Debug, Clone, Default)]
pub struct UiState {
    pub events: EventLog,
    pub player_score: Option<i64>,
    pub player_rank: Option<i64>,
    pub best_total_score: Option<i64>,
    pub best_total_rank: Option<i64>,
    pub round_scores: Vec<ScoreEntry>,
    pub stats: Vec<ServiceStat>,
    pub round_state: Option<RoundState>,
    pub game_ticks: Option<u64>,
}

impl UiState {
    /// Fold an update in. Absent fields leave the previous value alone.
    pub fn apply(&mut self, msg: &UiUpdateMessage) {
        for line in msg.new_event_html.iter().flatten() {
            self.events.push(line);
        }
        if msg.current_player_score.is_some() {
            self.player_score = msg.current_player_score;
        }
        if msg.current_player_rank.is_some() {
            self.player_rank = msg.current_player_rank;
        }
        if msg.current_player_best_total_score.is_some() {
            self.best_total_score = msg.current_player_best_total_score;
        }
        if msg.current_player_best_total_rank.is_some() {
            self.best_total_rank = msg.current_player_best_total_rank;
        }
        if let Some(scores) = &msg.current_round_scores {
            self.round_scores.clone_from(scores);
        }
        if let Some(stats) = &msg.stats {
            self.stats.clone_from(stats);
        }
        if msg.round_state.is_some() {
            self.round_state.clone_from(&msg.round_state);
        }
        // Negative ticks mean "not reported".
        if let Some(ticks) = msg.game_ticks.and_then(|t| u64::try_from(t).ok()) {
            self.game_ticks = Some(ticks);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_log_keeps_newest_eight() {
        let mut log = EventLog::default();
        for i in 0..12 {
            log.push(&format!("event {i}"));
        }
        assert_eq!(log.len(), EVENT_LOG_LINES);
        assert_eq!(log.lines().next(), Some("event 11"));
        assert_eq!(log.lines().last(), Some("event 4"));
    }

    #[test]
    fn test_strip_html() {
        assert_eq!(strip_html("<b>ann</b> hit &lt;orc&gt; &amp; ran"), "ann hit <orc> & ran");
    }

    #[test]
    fn test_apply_keeps_unreported_fields() {
        let mut ui = UiState::default();
        ui.apply(&UiUpdateMessage {
            current_player_score: Some(10),
            game_ticks: Some(5),
            ..UiUpdateMessage::default()
        });
        ui.apply(&UiUpdateMessage {
            current_player_rank: Some(2),
            game_ticks: Some(-1),
            ..UiUpdateMessage::default()
        });
        assert_eq!(ui.player_score, Some(10));
        assert_eq!(ui.player_rank, Some(2));
        assert_eq!(ui.game_ticks, Some(5));
    }
}
