//! Protocol module - JSON message types exchanged with the game server
//!
//! Line-delimited JSON: one object per line in each direction. The server
//! sends frame updates (untyped, or typed `JsonFrameUpdate`) and UI updates
//! (`JsonUpdateBrowserUI`); the viewer sends a single `JsonBrowserConnect`
//! after every (re)connect.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{
    CombatEvent, CreatureSnapshot, Frame, Rotation, TileDeltaRect, TileLayer, ViewKind, MAX_VIEW_TILES,
};

pub const UI_UPDATE_TYPE: &str = "JsonUpdateBrowserUI";
pub const FRAME_UPDATE_TYPE: &str = "JsonFrameUpdate";

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("malformed frame {seq}: {reason}")]
    MalformedFrame { seq: u64, reason: String },
}

// ============== Viewer -> Server Messages ==============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum BrowserConnectType {
    #[serde(rename = "JsonBrowserConnect")]
    #[default]
    BrowserConnect,
}

/// First (and only) message the viewer sends on an open transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrowserConnectMessage {
    #[serde(rename = "type")]
    #[serde(default)]
    pub msg_type: BrowserConnectType,
    pub uuid: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub view_type: String,
}

impl BrowserConnectMessage {
    pub fn new(uuid: String, username: Option<String>, password: Option<String>, view: ViewKind) -> Self {
        Self {
            msg_type: BrowserConnectType::BrowserConnect,
            uuid,
            username,
            password,
            view_type: view.as_wire().to_string(),
        }
    }

    /// Serialize as one protocol line, newline included.
    pub fn to_line(&self) -> Result<String, ProtocolError> {
        let mut line = serde_json::to_string(self)?;
        line.push('\n');
        Ok(line)
    }
}

// ============== Server -> Viewer Messages ==============

/// One tile layer on the wire: `[image_id]` or `[image_id, rotation]`.
pub type WireLayer = Vec<i64>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeltaRectMessage {
    pub x: i32,
    pub y: i32,
    pub w: u32,
    pub h: u32,
    #[serde(default)]
    pub data: Vec<Vec<WireLayer>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatureMessage {
    pub position: [i32; 2],
    pub hp: i64,
    pub max_hp: i64,
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameMessage {
    pub frame: u64,
    pub curr_world_pos_x: i32,
    pub curr_world_pos_y: i32,
    pub curr_view_width: u32,
    pub curr_view_height: u32,
    #[serde(default)]
    pub full_sent: bool,
    #[serde(default)]
    pub frame_data: Vec<DeltaRectMessage>,
    #[serde(default)]
    pub creatures: Vec<CreatureMessage>,
    #[serde(default)]
    pub game_ticks: Option<u64>,
}

fn decode_layer(seq: u64, raw: &[i64]) -> Result<TileLayer, ProtocolError> {
    let malformed = |reason: String| ProtocolError::MalformedFrame { seq, reason };

    let id = *raw.first().ok_or_else(|| malformed("empty layer".into()))?;
    let image_id = u32::try_from(id).map_err(|_| malformed(format!("bad image id {id}")))?;
    let rotation = match raw.get(1) {
        None => Rotation::Deg0,
        Some(&deg) => Rotation::from_degrees(deg).ok_or_else(|| malformed(format!("bad rotation {deg}")))?,
    };
    Ok(TileLayer::new(image_id, rotation))
}

impl TryFrom<FrameMessage> for Frame {
    type Error = ProtocolError;

    fn try_from(msg: FrameMessage) -> Result<Self, Self::Error> {
        let seq = msg.frame;
        let malformed = |reason: String| ProtocolError::MalformedFrame { seq, reason };

        let (view_w, view_h) = (msg.curr_view_width, msg.curr_view_height);
        if view_w > MAX_VIEW_TILES || view_h > MAX_VIEW_TILES {
            return Err(malformed(format!("view {view_w}x{view_h} too large")));
        }

        let mut deltas = Vec::with_capacity(msg.frame_data.len());
        for rect in msg.frame_data {
            if rect.w > view_w || rect.h > view_h {
                return Err(malformed(format!(
                    "rect {}x{} larger than view {view_w}x{view_h}",
                    rect.w, rect.h
                )));
            }
            let mut cells = Vec::with_capacity(rect.data.len());
            for cell in &rect.data {
                let stack = cell
                    .iter()
                    .map(|layer| decode_layer(seq, layer))
                    .collect::<Result<Vec<_>, _>>()?;
                cells.push(stack);
            }
            deltas.push(TileDeltaRect {
                x: rect.x,
                y: rect.y,
                width: rect.w,
                height: rect.h,
                cells,
            });
        }

        let creatures = msg
            .creatures
            .into_iter()
            .map(|c| CreatureSnapshot {
                x: c.position[0],
                y: c.position[1],
                hp: c.hp,
                max_hp: c.max_hp,
                username: c.username,
            })
            .collect();

        Ok(Frame {
            seq,
            view_x: msg.curr_world_pos_x,
            view_y: msg.curr_world_pos_y,
            view_width: msg.curr_view_width,
            view_height: msg.curr_view_height,
            deltas,
            creatures,
            full_redraw: msg.full_sent,
            game_ticks: msg.game_ticks,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatEventMessage {
    pub x: i32,
    pub y: i32,
    pub frame: u64,
    pub damage: i64,
}

impl From<CombatEventMessage> for CombatEvent {
    fn from(m: CombatEventMessage) -> Self {
        CombatEvent {
            x: m.x,
            y: m.y,
            frame: m.frame,
            damage: m.damage,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub username: String,
    pub score: i64,
    pub rank: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceStat {
    pub username: String,
    #[serde(default)]
    pub actions_per_second: f64,
    #[serde(default)]
    pub number_of_times_died: i64,
    #[serde(default)]
    pub average_time_between_actions: i64,
    #[serde(default = "default_true")]
    pub pass_last_health_check: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RoundState {
    #[serde(rename = "ACTIVE", rename_all = "camelCase")]
    Active {
        round_id: u64,
        #[serde(default)]
        time_left_in_seconds: i64,
    },
    #[serde(rename = "INACTIVE", rename_all = "camelCase")]
    Inactive {
        next_round_id: u64,
        #[serde(default)]
        next_round_start_in_secs: i64,
    },
}

/// Side-channel update for everything that is not the tile world.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiUpdateMessage {
    #[serde(default)]
    pub new_event_html: Option<Vec<String>>,
    #[serde(default)]
    pub current_player_score: Option<i64>,
    #[serde(default)]
    pub current_player_rank: Option<i64>,
    #[serde(default)]
    pub current_player_best_total_score: Option<i64>,
    #[serde(default)]
    pub current_player_best_total_rank: Option<i64>,
    #[serde(default)]
    pub current_round_scores: Option<Vec<ScoreEntry>>,
    #[serde(default)]
    pub stats: Option<Vec<ServiceStat>>,
    #[serde(default)]
    pub combat_events: Option<Vec<CombatEventMessage>>,
    #[serde(default)]
    pub round_state: Option<RoundState>,
    #[serde(default)]
    pub game_ticks: Option<i64>,
}

impl UiUpdateMessage {
    pub fn combat_events(&self) -> Vec<CombatEvent> {
        self.combat_events
            .iter()
            .flatten()
            .cloned()
            .map(CombatEvent::from)
            .collect()
    }
}

/// A decoded server line.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    Frame(Frame),
    Ui(Box<UiUpdateMessage>),
    /// A well-formed message of a type the viewer does not handle.
    Unknown { msg_type: String },
}

/// Parse one protocol line.
pub fn parse_message(json: &str) -> Result<Inbound, ProtocolError> {
    #[derive(Debug, Deserialize)]
    struct TypeOnly<'a> {
        #[serde(rename = "type")]
        #[serde(borrow)]
        msg_type: Option<&'a str>,
    }

    let msg_type = serde_json::from_str::<TypeOnly>(json)?.msg_type;
    match msg_type {
        Some(UI_UPDATE_TYPE) => {
            let ui = serde_json::from_str::<UiUpdateMessage>(json)?;
            Ok(Inbound::Ui(Box::new(ui)))
        }
        None | Some(FRAME_UPDATE_TYPE) => {
            let msg = serde_json::from_str::<FrameMessage>(json)?;
            Ok(Inbound::Frame(Frame::try_from(msg)?))
        }
        Some(other) => Ok(Inbound::Unknown {
            msg_type: other.to_string(),
        }),
    }
}
