//! Domain types for radio stations.
//!
//! Wire payloads (`StationStatus`, `StationSummary`) mirror the backend's
//! camelCase JSON; derived types (`ServerStatus`, `StationPhase`,
//! `StationColor`) carry the player-side interpretation of those payloads.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::protocol_constants::CURATOR_WAIT_SENTINEL;

// ─────────────────────────────────────────────────────────────────────────────
// Wire Payloads
// ─────────────────────────────────────────────────────────────────────────────

/// Raw status payload returned by `GET /{station}/radio/status`.
///
/// Every field is tolerated as missing; unknown fields are ignored. The
/// payload is interpreted, never rendered directly - see [`StationStatus::server_status`]
/// and [`StationStatus::status_line`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StationStatus {
    /// Station name as reported by the backend.
    pub name: String,
    /// Human-readable display name (directory payloads carry this too).
    pub display_name: Option<String>,
    /// Brand color as a hex string (`#RRGGBB` or `#RRGGBBAA`).
    pub color: Option<String>,
    /// Enum-like broadcast status string (`ON_LINE`, `WARMING_UP`, ...).
    pub current_status: Option<String>,
    /// Currently playing song title, or a control sentinel.
    pub current_song: Option<String>,
    /// Name of the DJ currently curating the broadcast.
    pub dj_name: Option<String>,
    /// DJ availability status.
    pub dj_status: Option<String>,
    /// Preferred language of the DJ.
    pub dj_preferred_lang: Option<String>,
    /// ISO country code of the station.
    pub country_code: Option<String>,
    /// Who runs the station (`AI_AGENT`, `MIX`, human curation, ...).
    pub managed_by: Option<String>,
}

impl StationStatus {
    /// Parses the `currentStatus` field, if present and non-blank.
    #[must_use]
    pub fn server_status(&self) -> Option<ServerStatus> {
        non_empty(self.current_status.as_deref()).map(ServerStatus::parse)
    }

    /// Returns true if `currentSong` carries the waiting-for-curator sentinel.
    #[must_use]
    pub fn is_waiting_for_curator(&self) -> bool {
        self.current_song.as_deref() == Some(CURATOR_WAIT_SENTINEL)
    }

    /// Returns the song title if it is a real title (non-blank and not a
    /// control sentinel).
    #[must_use]
    pub fn song_title(&self) -> Option<&str> {
        if self.is_waiting_for_curator() {
            return None;
        }
        non_empty(self.current_song.as_deref())
    }

    /// Preferred display title: `displayName` falling back to `name`.
    #[must_use]
    pub fn display_title(&self) -> Option<&str> {
        non_empty(self.display_name.as_deref()).or_else(|| non_empty(Some(&self.name)))
    }

    /// Composes the one-line status summary shown under the station title.
    ///
    /// Joins the present parts of mode, country, DJ (with preferred language)
    /// and the humanized broadcast status. The DJ is only surfaced for
    /// machine-curated stations (`AI_AGENT`, `MIX`) where the "DJ" is part of
    /// the product, not a private operator.
    #[must_use]
    pub fn status_line(&self) -> String {
        let mut parts: Vec<String> = Vec::new();

        if let Some(managed_by) = non_empty(self.managed_by.as_deref()) {
            parts.push(format!("Mode: {managed_by}"));
        }
        if let Some(country) = non_empty(self.country_code.as_deref()) {
            parts.push(format!("Country: {country}"));
        }
        if self.shows_dj() {
            if let Some(dj) = non_empty(self.dj_name.as_deref()) {
                match non_empty(self.dj_preferred_lang.as_deref()) {
                    Some(lang) => parts.push(format!("DJ: {dj} ({lang})")),
                    None => parts.push(format!("DJ: {dj}")),
                }
            }
        }
        if let Some(status) = non_empty(self.current_status.as_deref()) {
            parts.push(humanize_status(status));
        }

        if parts.is_empty() {
            "Status information available.".to_string()
        } else {
            parts.join(", ")
        }
    }

    fn shows_dj(&self) -> bool {
        matches!(self.managed_by.as_deref(), Some("AI_AGENT") | Some("MIX"))
    }
}

/// Directory entry returned by `GET /radio/stations`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StationSummary {
    /// Station name as reported by the backend.
    pub name: String,
    /// URL-safe identifier used in per-station endpoint paths.
    pub slug_name: String,
    /// Human-readable display name.
    pub display_name: Option<String>,
    /// Brand color as a hex string.
    pub color: Option<String>,
    /// Broadcast status at directory refresh time.
    pub current_status: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Server Status
// ─────────────────────────────────────────────────────────────────────────────

/// Parsed view of the backend's `currentStatus` string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerStatus {
    /// Station is broadcasting.
    OnLine,
    /// Station is starting its stream pipeline.
    WarmingUp,
    /// Station is live but its ingest queue is saturated.
    QueueSaturated,
    /// Station reported an internal failure.
    SystemError,
    /// Any status string this player version does not know.
    Unknown(String),
}

impl ServerStatus {
    /// Parses a raw backend status string.
    ///
    /// Note the backend spells `SYSTEM ERROR` with a space, unlike its other
    /// underscore-separated statuses.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw {
            "ON_LINE" => Self::OnLine,
            "WARMING_UP" => Self::WarmingUp,
            "QUEUE_SATURATED" => Self::QueueSaturated,
            "SYSTEM ERROR" => Self::SystemError,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// Returns true for statuses where the station is live and playable.
    ///
    /// `QUEUE_SATURATED` counts as on air: the stream keeps playing even
    /// while the ingest side is congested.
    #[must_use]
    pub fn is_on_air(&self) -> bool {
        matches!(self, Self::OnLine | Self::QueueSaturated)
    }
}

/// Lowercases a backend status string and replaces underscores with spaces
/// (`ON_LINE` -> `on line`) for display.
#[must_use]
pub fn humanize_status(raw: &str) -> String {
    raw.to_lowercase().replace('_', " ")
}

// ─────────────────────────────────────────────────────────────────────────────
// Station Color
// ─────────────────────────────────────────────────────────────────────────────

/// Validated station brand color, normalized to `#RRGGBB`.
///
/// The backend occasionally sends 8-digit hex values with an alpha channel;
/// those are accepted and truncated to their 6-digit base color. Anything
/// else is rejected so station palettes cannot inject arbitrary CSS values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct StationColor(String);

impl StationColor {
    /// Parses a hex color string, returning `None` for invalid input.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let hex = raw.strip_prefix('#')?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        match hex.len() {
            6 => Some(Self(format!("#{hex}"))),
            8 => Some(Self(format!("#{}", &hex[..6]))),
            _ => None,
        }
    }

    /// Returns the normalized `#RRGGBB` string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StationColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Classification
// ─────────────────────────────────────────────────────────────────────────────

/// Derived classification of a station, replaced wholesale on every applied
/// poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum StationPhase {
    /// Station is intentionally offline and can be woken up.
    Asleep,
    /// Station is starting its stream pipeline.
    WarmingUp,
    /// Station is on air but no curator has started the broadcast.
    WaitingForCurator,
    /// Station is live.
    Broadcasting,
    /// Status could not be determined or the station reported a failure.
    Error {
        /// Human-readable description of what went wrong.
        message: String,
    },
}

impl StationPhase {
    /// Returns true when the station is confirmed awake and responding
    /// (broadcasting, or merely waiting for its curator).
    #[must_use]
    pub fn is_on_air(&self) -> bool {
        matches!(self, Self::Broadcasting | Self::WaitingForCurator)
    }
}

impl fmt::Display for StationPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Asleep => f.write_str("asleep"),
            Self::WarmingUp => f.write_str("warming up"),
            Self::WaitingForCurator => f.write_str("waiting for curator"),
            Self::Broadcasting => f.write_str("broadcasting"),
            Self::Error { message } => write!(f, "error: {message}"),
        }
    }
}

/// Result of one status fetch, as applied to the station store.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// Backend returned a parseable status payload.
    Payload(StationStatus),
    /// Backend confirmed the station is intentionally asleep.
    Asleep,
    /// Fetch failed (transport error, unexpected HTTP status, bad payload).
    Failed {
        /// Human-readable description of the failure.
        message: String,
    },
}

/// Returns the trimmed string if it is non-empty.
pub(crate) fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    // ─────────────────────────────────────────────────────────────────────────
    // Color Parsing
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn six_digit_colors_pass_through_unchanged() {
        assert_eq!(StationColor::parse("#1a2b3c").unwrap().as_str(), "#1a2b3c");
        assert_eq!(StationColor::parse("#FFCC00").unwrap().as_str(), "#FFCC00");
    }

    #[test]
    fn eight_digit_colors_drop_the_alpha_channel() {
        assert_eq!(StationColor::parse("#1a2b3cff").unwrap().as_str(), "#1a2b3c");
        assert_eq!(StationColor::parse("#FFCC0080").unwrap().as_str(), "#FFCC00");
    }

    #[test]
    fn invalid_colors_are_rejected() {
        for raw in ["", "#", "1a2b3c", "#12345", "#1234567", "#12345g", "#zzzzzz", "#123456789"] {
            assert!(StationColor::parse(raw).is_none(), "accepted {raw:?}");
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Server Status
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn known_statuses_parse() {
        assert_eq!(ServerStatus::parse("ON_LINE"), ServerStatus::OnLine);
        assert_eq!(ServerStatus::parse("WARMING_UP"), ServerStatus::WarmingUp);
        assert_eq!(
            ServerStatus::parse("QUEUE_SATURATED"),
            ServerStatus::QueueSaturated
        );
        assert_eq!(ServerStatus::parse("SYSTEM ERROR"), ServerStatus::SystemError);
    }

    #[test]
    fn unknown_status_is_preserved() {
        assert_eq!(
            ServerStatus::parse("IDLE"),
            ServerStatus::Unknown("IDLE".to_string())
        );
    }

    #[test]
    fn on_air_includes_saturated_queue() {
        assert!(ServerStatus::OnLine.is_on_air());
        assert!(ServerStatus::QueueSaturated.is_on_air());
        assert!(!ServerStatus::WarmingUp.is_on_air());
        assert!(!ServerStatus::SystemError.is_on_air());
    }

    #[test]
    fn humanize_lowercases_and_strips_underscores() {
        assert_eq!(humanize_status("ON_LINE"), "on line");
        assert_eq!(humanize_status("QUEUE_SATURATED"), "queue saturated");
        assert_eq!(humanize_status("SYSTEM ERROR"), "system error");
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Payload Interpretation
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn status_payload_deserializes_from_backend_json() {
        let json = r##"{
            "name": "Sexta",
            "color": "#ff7700",
            "currentStatus": "ON_LINE",
            "currentSong": "Night Drive",
            "djName": "Nova",
            "djPreferredLang": "es",
            "countryCode": "PT",
            "managedBy": "AI_AGENT",
            "somethingNew": 42
        }"##;
        let status: StationStatus = serde_json::from_str(json).unwrap();
        assert_eq!(status.name, "Sexta");
        assert_eq!(status.server_status(), Some(ServerStatus::OnLine));
        assert_eq!(status.song_title(), Some("Night Drive"));
        assert_eq!(status.display_title(), Some("Sexta"));
    }

    #[test]
    fn missing_fields_deserialize_to_defaults() {
        let status: StationStatus = serde_json::from_str("{}").unwrap();
        assert!(status.name.is_empty());
        assert_eq!(status.server_status(), None);
        assert_eq!(status.song_title(), None);
    }

    #[test]
    fn curator_sentinel_is_not_a_song_title() {
        let status = StationStatus {
            current_song: Some(CURATOR_WAIT_SENTINEL.to_string()),
            ..Default::default()
        };
        assert!(status.is_waiting_for_curator());
        assert_eq!(status.song_title(), None);
    }

    #[test]
    fn blank_song_is_not_a_title() {
        let status = StationStatus {
            current_song: Some("   ".to_string()),
            ..Default::default()
        };
        assert_eq!(status.song_title(), None);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Status Line
    // ─────────────────────────────────────────────────────────────────────────

    fn full_payload() -> StationStatus {
        StationStatus {
            name: "Bratan".to_string(),
            current_status: Some("ON_LINE".to_string()),
            dj_name: Some("Nova".to_string()),
            dj_preferred_lang: Some("es".to_string()),
            country_code: Some("PT".to_string()),
            managed_by: Some("AI_AGENT".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn status_line_includes_all_parts_for_ai_station() {
        assert_eq!(
            full_payload().status_line(),
            "Mode: AI_AGENT, Country: PT, DJ: Nova (es), on line"
        );
    }

    #[test]
    fn status_line_hides_dj_for_human_curation() {
        let mut payload = full_payload();
        payload.managed_by = Some("CURATED".to_string());
        assert_eq!(payload.status_line(), "Mode: CURATED, Country: PT, on line");
    }

    #[test]
    fn status_line_omits_language_when_absent() {
        let mut payload = full_payload();
        payload.dj_preferred_lang = None;
        assert_eq!(
            payload.status_line(),
            "Mode: AI_AGENT, Country: PT, DJ: Nova, on line"
        );
    }

    #[test]
    fn status_line_falls_back_when_payload_is_bare() {
        assert_eq!(
            StationStatus::default().status_line(),
            "Status information available."
        );
    }

    #[test]
    fn summary_deserializes_directory_entry() {
        let json = r##"{
            "name": "Aizoo",
            "slugName": "aizoo",
            "displayName": "AIZOO",
            "color": "#00ff44",
            "currentStatus": "WARMING_UP"
        }"##;
        let summary: StationSummary = serde_json::from_str(json).unwrap();
        assert_eq!(summary.slug_name, "aizoo");
        assert_eq!(summary.display_name.as_deref(), Some("AIZOO"));
    }
}
