//! Domain value types for the hub.
//!
//! # Design
//! Each settable field gets its own validated type; the constructor is the
//! sole validation point, so a value that exists is valid for its entire
//! lifetime. All range checks happen here, before any network cost is paid.
//! `Status` mirrors whatever snapshot the hub reports — every field is
//! optional because firmware revisions differ in what they include.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::HubError;

/// Timestamp layout used by the hub, e.g. `Sat Jul 30 15:23:41 2022`.
const HUB_TIME_FORMAT: &str = "%a %b %d %H:%M:%S %Y";

/// One of the hub's built-in game levels.
///
/// The `Display` impl gives the level's friendly name as shown in the
/// companion app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Game {
    Game0,
    Game1,
    Game2,
    Game3,
    Game4,
    Game5,
    Game6,
    Game7,
    Game8,
    Game9,
    Game10,
    Game11,
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Game::Game0 => "Eating the food",
            Game::Game1 => "Exploring the Touchpads",
            Game::Game2 => "Engaging Consistently",
            Game::Game3 => "Avoiding Unlit Touchpads",
            Game::Game4 => "Learning the Lights",
            Game::Game5 => "Mastering the Lights",
            Game::Game6 => "Responding Quickly",
            Game::Game7 => "Learning Brightness",
            Game::Game8 => "Learning Double Sequences",
            Game::Game9 => "Learning Longer Sequences",
            Game::Game10 => "Matching Two Colors",
            Game::Game11 => "Matching More Colors",
        };
        f.write_str(name)
    }
}

/// Daily treat cap. Zero disables the limit (hub convention).
///
/// Deserialization routes through [`MaxKibbles::new`], so an out-of-range
/// wire value fails decode instead of minting an invalid cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct MaxKibbles(u32);

impl TryFrom<u32> for MaxKibbles {
    type Error = HubError;

    fn try_from(limit: u32) -> Result<Self, HubError> {
        Self::new(limit)
    }
}

impl From<MaxKibbles> for u32 {
    fn from(value: MaxKibbles) -> u32 {
        value.0
    }
}

impl MaxKibbles {
    /// Hopper-bound ceiling the hub accepts for a daily cap.
    pub const CEILING: u32 = 500;

    pub fn new(limit: u32) -> Result<Self, HubError> {
        if limit > Self::CEILING {
            return Err(HubError::Validation {
                field: "max_kibbles",
                lower: 0,
                upper: Self::CEILING as i64,
                found: limit as i64,
            });
        }
        Ok(Self(limit))
    }

    /// A cap of zero, meaning no daily limit.
    pub const UNLIMITED: MaxKibbles = MaxKibbles(0);

    pub fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for MaxKibbles {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == 0 {
            write!(f, "no limit")
        } else {
            write!(f, "limit: {}", self.0)
        }
    }
}

/// Rule governing when the hub is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HubMode {
    /// Hub is always off.
    StayOff,
    /// Hub is always on.
    StayOn,
    /// Hub follows the configured weekday/weekend schedule.
    Scheduled,
}

/// UTC offset in whole hours, within the real-world range [-12, 13].
///
/// Deserialization routes through [`TimezoneOffset::new`], same as
/// [`MaxKibbles`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i8", into = "i8")]
pub struct TimezoneOffset(i8);

impl TryFrom<i8> for TimezoneOffset {
    type Error = HubError;

    fn try_from(hours: i8) -> Result<Self, HubError> {
        Self::new(hours)
    }
}

impl From<TimezoneOffset> for i8 {
    fn from(value: TimezoneOffset) -> i8 {
        value.0
    }
}

impl TimezoneOffset {
    pub const MIN: i8 = -12;
    pub const MAX: i8 = 13;

    pub fn new(hours: i8) -> Result<Self, HubError> {
        if !(Self::MIN..=Self::MAX).contains(&hours) {
            return Err(HubError::Validation {
                field: "timezone",
                lower: Self::MIN as i64,
                upper: Self::MAX as i64,
                found: hours as i64,
            });
        }
        Ok(Self(hours))
    }

    pub fn hours(&self) -> i8 {
        self.0
    }
}

/// A wall-clock time within a schedule window, wire form `HH:MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleTime {
    hour: u8,
    minute: u8,
}

impl ScheduleTime {
    pub fn new(hour: u8, minute: u8) -> Result<Self, HubError> {
        if hour > 23 {
            return Err(HubError::Validation {
                field: "hour",
                lower: 0,
                upper: 23,
                found: hour as i64,
            });
        }
        if minute > 59 {
            return Err(HubError::Validation {
                field: "minute",
                lower: 0,
                upper: 59,
                found: minute as i64,
            });
        }
        Ok(Self { hour, minute })
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }
}

impl fmt::Display for ScheduleTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for ScheduleTime {
    type Err = HubError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (h, m) = s
            .split_once(':')
            .ok_or_else(|| HubError::Schema(format!("malformed schedule time: {s:?}")))?;
        let hour: u8 = h
            .parse()
            .map_err(|_| HubError::Schema(format!("malformed schedule time: {s:?}")))?;
        let minute: u8 = m
            .parse()
            .map_err(|_| HubError::Schema(format!("malformed schedule time: {s:?}")))?;
        Self::new(hour, minute)
    }
}

impl Serialize for ScheduleTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ScheduleTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// A start/end window within one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    pub from: ScheduleTime,
    pub to: ScheduleTime,
}

/// Weekday/weekend activity windows, honored while the hub mode is
/// [`HubMode::Scheduled`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub weekday: Window,
    pub weekend: Window,
}

impl Schedule {
    pub fn new(weekday: Window, weekend: Window) -> Self {
        Self { weekday, weekend }
    }
}

impl fmt::Display for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "weekdays {} - {}; weekends {} - {}",
            self.weekday.from, self.weekday.to, self.weekend.from, self.weekend.to
        )
    }
}

/// Whether the hub is currently dispensing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HubState {
    /// Not dispensing food.
    Standby,
    /// Dispensing food if any is present.
    Active,
}

/// Operational condition, derived from the hub's human-readable report line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HubReport {
    /// Food is loaded and the player can play.
    Playing,
    /// Out of food.
    Empty,
    PlatterJammed,
    PodJammed,
    DomeRemoved,
}

impl HubReport {
    /// Map the hub's report sentence to a condition. Unknown sentences map
    /// to `None` rather than failing the whole snapshot.
    pub fn from_message(message: &str) -> Option<Self> {
        if message.contains("Your hub is working") {
            Some(HubReport::Playing)
        } else if message.contains("Out of food") {
            Some(HubReport::Empty)
        } else if message.contains("Platter is jammed") {
            Some(HubReport::PlatterJammed)
        } else if message.contains("Singulator is jammed") {
            Some(HubReport::PodJammed)
        } else if message.contains("Dome is removed") {
            Some(HubReport::DomeRemoved)
        } else {
            None
        }
    }
}

/// Snapshot of the hub's current configuration and condition.
///
/// Every field is optional: the hub omits fields depending on firmware
/// revision and mode (e.g. `schedule` is only reported in scheduled mode),
/// and the decoder never fails on an absent field.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Status {
    /// Hub-local wall-clock time at the moment of the snapshot.
    #[serde(default, deserialize_with = "de_hub_time")]
    pub time: Option<NaiveDateTime>,
    pub hub_mode: Option<HubMode>,
    /// Game currently being played.
    pub game: Option<Game>,
    /// Game staged for the next round. Differs from `game` while a level
    /// change is pending.
    pub queued_game: Option<Game>,
    pub hub_state: Option<HubState>,
    /// Parsed from the hub's free-text report line; `None` when absent or
    /// unrecognized.
    #[serde(default, deserialize_with = "de_report")]
    pub report: Option<HubReport>,
    pub max_kibbles: Option<MaxKibbles>,
    pub timezone: Option<TimezoneOffset>,
    pub dst: Option<bool>,
    pub schedule: Option<Schedule>,
    pub kibbles_eaten_today: Option<u32>,
}

impl Status {
    /// True while a game change is staged but not yet in play.
    pub fn is_transitioning(&self) -> bool {
        matches!((self.game, self.queued_game), (Some(playing), Some(queued)) if playing != queued)
    }
}

fn de_hub_time<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<NaiveDateTime>, D::Error> {
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(raw) => NaiveDateTime::parse_from_str(&raw, HUB_TIME_FORMAT)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

fn de_report<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<HubReport>, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(HubReport::from_message))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_kibbles_accepts_in_range_values() {
        assert_eq!(MaxKibbles::new(0).unwrap(), MaxKibbles::UNLIMITED);
        assert_eq!(MaxKibbles::new(12).unwrap().get(), 12);
        assert_eq!(MaxKibbles::new(MaxKibbles::CEILING).unwrap().get(), 500);
    }

    #[test]
    fn max_kibbles_rejects_above_ceiling() {
        let err = MaxKibbles::new(MaxKibbles::CEILING + 1).unwrap_err();
        assert!(matches!(
            err,
            HubError::Validation {
                field: "max_kibbles",
                found: 501,
                ..
            }
        ));
    }

    #[test]
    fn max_kibbles_display_marks_unlimited() {
        assert_eq!(MaxKibbles::UNLIMITED.to_string(), "no limit");
        assert_eq!(MaxKibbles::new(3).unwrap().to_string(), "limit: 3");
    }

    #[test]
    fn timezone_bounds_are_inclusive() {
        assert_eq!(TimezoneOffset::new(-12).unwrap().hours(), -12);
        assert_eq!(TimezoneOffset::new(13).unwrap().hours(), 13);
        assert!(matches!(
            TimezoneOffset::new(-13),
            Err(HubError::Validation { field: "timezone", .. })
        ));
        assert!(matches!(
            TimezoneOffset::new(14),
            Err(HubError::Validation { field: "timezone", .. })
        ));
    }

    #[test]
    fn schedule_time_validates_components() {
        assert!(ScheduleTime::new(23, 59).is_ok());
        assert!(matches!(
            ScheduleTime::new(24, 0),
            Err(HubError::Validation { field: "hour", .. })
        ));
        assert!(matches!(
            ScheduleTime::new(12, 60),
            Err(HubError::Validation { field: "minute", .. })
        ));
    }

    #[test]
    fn schedule_time_round_trips_through_wire_form() {
        let t = ScheduleTime::new(9, 5).unwrap();
        assert_eq!(t.to_string(), "09:05");
        assert_eq!("09:05".parse::<ScheduleTime>().unwrap(), t);
        assert_eq!(serde_json::to_string(&t).unwrap(), "\"09:05\"");
        let back: ScheduleTime = serde_json::from_str("\"09:05\"").unwrap();
        assert_eq!(back, t);
    }

    #[test]
    fn schedule_time_rejects_garbage() {
        assert!("0905".parse::<ScheduleTime>().is_err());
        assert!("25:00".parse::<ScheduleTime>().is_err());
        assert!("09:xx".parse::<ScheduleTime>().is_err());
    }

    #[test]
    fn game_serializes_to_wire_name() {
        assert_eq!(serde_json::to_string(&Game::Game4).unwrap(), "\"GAME4\"");
        let back: Game = serde_json::from_str("\"GAME11\"").unwrap();
        assert_eq!(back, Game::Game11);
    }

    #[test]
    fn game_displays_friendly_name() {
        assert_eq!(Game::Game0.to_string(), "Eating the food");
        assert_eq!(Game::Game11.to_string(), "Matching More Colors");
    }

    #[test]
    fn hub_mode_wire_names() {
        assert_eq!(
            serde_json::to_string(&HubMode::Scheduled).unwrap(),
            "\"SCHEDULED\""
        );
        let back: HubMode = serde_json::from_str("\"STAY_OFF\"").unwrap();
        assert_eq!(back, HubMode::StayOff);
    }

    #[test]
    fn report_parses_known_messages() {
        assert_eq!(
            HubReport::from_message("Your hub is working."),
            Some(HubReport::Playing)
        );
        assert_eq!(
            HubReport::from_message("Out of food. Please refill."),
            Some(HubReport::Empty)
        );
        assert_eq!(HubReport::from_message("Firmware updating"), None);
    }

    #[test]
    fn status_decodes_full_snapshot() {
        let body = r#"{
            "time": "Sat Jul 30 15:23:41 2022",
            "hub_mode": "SCHEDULED",
            "game": "GAME9",
            "queued_game": "GAME9",
            "hub_state": "Active",
            "report": "Your hub is working.",
            "max_kibbles": 0,
            "timezone": -5,
            "dst": true,
            "schedule": {
                "weekday": {"from": "09:00", "to": "16:00"},
                "weekend": {"from": "10:00", "to": "17:00"}
            },
            "kibbles_eaten_today": 42
        }"#;
        let status: Status = serde_json::from_str(body).unwrap();
        assert_eq!(status.hub_mode, Some(HubMode::Scheduled));
        assert_eq!(status.game, Some(Game::Game9));
        assert!(!status.is_transitioning());
        assert_eq!(status.hub_state, Some(HubState::Active));
        assert_eq!(status.report, Some(HubReport::Playing));
        assert_eq!(status.max_kibbles, Some(MaxKibbles::UNLIMITED));
        assert_eq!(status.timezone.unwrap().hours(), -5);
        assert_eq!(status.dst, Some(true));
        assert_eq!(
            status.schedule.unwrap().weekday.from.to_string(),
            "09:00"
        );
        assert_eq!(status.kibbles_eaten_today, Some(42));
        let time = status.time.unwrap();
        assert_eq!(time.format("%Y-%m-%d %H:%M:%S").to_string(), "2022-07-30 15:23:41");
    }

    #[test]
    fn status_tolerates_absent_fields() {
        let status: Status = serde_json::from_str(r#"{"game": "GAME1"}"#).unwrap();
        assert_eq!(status.game, Some(Game::Game1));
        assert_eq!(status.hub_mode, None);
        assert_eq!(status.time, None);
        assert_eq!(status.schedule, None);
        assert!(!status.is_transitioning());
    }

    #[test]
    fn status_reports_pending_game_transition() {
        let status: Status =
            serde_json::from_str(r#"{"game": "GAME3", "queued_game": "GAME4"}"#).unwrap();
        assert!(status.is_transitioning());
    }

    #[test]
    fn status_rejects_out_of_range_wire_values() {
        // A buggy or foreign firmware must not mint values the constructors
        // would reject.
        let err = serde_json::from_str::<Status>(r#"{"timezone": 99}"#).unwrap_err();
        assert!(err.to_string().contains("timezone"));
        assert!(serde_json::from_str::<Status>(r#"{"max_kibbles": 9000}"#).is_err());
        assert!(serde_json::from_str::<TimezoneOffset>("99").is_err());
        assert!(serde_json::from_str::<MaxKibbles>("9000").is_err());
    }

    #[test]
    fn bounded_types_keep_their_wire_form() {
        assert_eq!(
            serde_json::to_string(&TimezoneOffset::new(-5).unwrap()).unwrap(),
            "-5"
        );
        assert_eq!(serde_json::to_string(&MaxKibbles::new(12).unwrap()).unwrap(), "12");
        let back: TimezoneOffset = serde_json::from_str("-5").unwrap();
        assert_eq!(back.hours(), -5);
    }

    #[test]
    fn status_unknown_report_message_is_none() {
        let status: Status =
            serde_json::from_str(r#"{"report": "Something brand new"}"#).unwrap();
        assert_eq!(status.report, None);
    }
}
