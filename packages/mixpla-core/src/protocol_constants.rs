//! Fixed protocol constants that should NOT be changed.
//!
//! These values are defined by the Mixpla backend contract (REST paths,
//! sentinel strings) or by the player's published recovery behavior, and
//! changing them would break compatibility with deployed stations.

// ─────────────────────────────────────────────────────────────────────────────
// REST Endpoints
// ─────────────────────────────────────────────────────────────────────────────

/// Path of the station directory endpoint, relative to the backend base URL.
pub const STATIONS_PATH: &str = "/radio/stations";

/// Per-station status path suffix (`GET {base}/{station}/radio/status`).
pub const STATUS_PATH_SUFFIX: &str = "/radio/status";

/// Per-station wake-up path suffix (`PUT {base}/{station}/radio/wakeup`).
pub const WAKEUP_PATH_SUFFIX: &str = "/radio/wakeup";

/// Per-station HLS playlist path suffix (`GET {base}/{station}/radio/stream.m3u8`).
pub const STREAM_PATH_SUFFIX: &str = "/radio/stream.m3u8";

/// Default backend base URL.
pub const DEFAULT_BASE_URL: &str = "https://bratan.online";

// ─────────────────────────────────────────────────────────────────────────────
// Backend Sentinels
// ─────────────────────────────────────────────────────────────────────────────

/// Substring of the 404 body a station returns while intentionally asleep.
///
/// A 404 *without* this substring is a plain HTTP error, not "asleep".
pub const ASLEEP_BODY_SENTINEL: &str = "Radio station not broadcasting";

/// Exact `currentSong` value while a station is on air but no curator
/// has started the broadcast yet.
pub const CURATOR_WAIT_SENTINEL: &str = "Waiting for curator to start the broadcast...";

// ─────────────────────────────────────────────────────────────────────────────
// Polling Cadence
// ─────────────────────────────────────────────────────────────────────────────

/// Regular status polling interval (milliseconds).
pub const REGULAR_POLL_INTERVAL_MS: u64 = 15_000;

/// Fast status polling interval used while a station wakes up (milliseconds).
pub const FAST_POLL_INTERVAL_MS: u64 = 5_000;

/// How long a wake-up may stay pending before the warming-up flag is
/// force-cleared (milliseconds).
pub const WARMUP_GUARD_MS: u64 = 10_000;

/// Station directory refresh interval (milliseconds).
pub const DIRECTORY_REFRESH_INTERVAL_MS: u64 = 60_000;

// ─────────────────────────────────────────────────────────────────────────────
// Playback Recovery
// ─────────────────────────────────────────────────────────────────────────────

/// Maximum consecutive network-level reload attempts before playback is
/// declared failed.
pub const MAX_STREAM_RETRIES: u32 = 3;

/// Base delay for the linear reload backoff (milliseconds).
///
/// Attempt `n` waits `n * RETRY_BASE_DELAY_MS` (2s, 4s, 6s).
pub const RETRY_BASE_DELAY_MS: u64 = 2_000;

// ─────────────────────────────────────────────────────────────────────────────
// Auth
// ─────────────────────────────────────────────────────────────────────────────

/// Minimum remaining token validity before a proactive refresh (seconds).
///
/// Matches the refresh margin the identity provider client uses, so a token
/// attached to a request cannot expire mid-flight.
pub const TOKEN_MIN_VALIDITY_SECS: u64 = 30;

// ─────────────────────────────────────────────────────────────────────────────
// HTTP
// ─────────────────────────────────────────────────────────────────────────────

/// Timeout for backend HTTP requests (seconds).
pub const HTTP_TIMEOUT_SECS: u64 = 10;

// ─────────────────────────────────────────────────────────────────────────────
// Channels & Windows
// ─────────────────────────────────────────────────────────────────────────────

/// Capacity of the event broadcast channel for UI/console subscribers.
pub const EVENT_CHANNEL_CAPACITY: usize = 100;

/// Rolling window of segment load times kept for averaging.
pub const SEGMENT_LOAD_TIME_WINDOW: usize = 100;

/// Maximum number of recent segment errors kept for diagnostics.
pub const SEGMENT_ERROR_LOG_CAPACITY: usize = 20;
